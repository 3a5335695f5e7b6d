//! Relay endpoints. Each one forwards to the backend with the caller's token.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    api::{health::HealthResponse, loans::parse_isbn_body, AuthenticatedUser},
    error::AppResult,
    models::{
        book::BookDto,
        loan::LoanDto,
        page::{BookPage, SearchParams, UserPage},
        user::UserDto,
    },
};

use super::RelayState;

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn search_books(
    State(state): State<RelayState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<BookPage>> {
    let page = state.backend.search_books(&caller.token, &params).await?;
    Ok(Json(page))
}

pub async fn get_book(
    State(state): State<RelayState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(isbn): Path<String>,
) -> AppResult<Json<BookDto>> {
    let book = state.backend.get_book(&caller.token, &isbn).await?;
    Ok(Json(book))
}

/// The caller's own profile with loan history
pub async fn me(
    State(state): State<RelayState>,
    AuthenticatedUser(caller): AuthenticatedUser,
) -> AppResult<Json<UserDto>> {
    let user = state
        .backend
        .user_with_loans(&caller.token, &caller.username)
        .await?;
    Ok(Json(user))
}

pub async fn borrow_book(
    State(state): State<RelayState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    body: String,
) -> AppResult<(StatusCode, Json<LoanDto>)> {
    let isbn = parse_isbn_body(&body)?;

    tracing::debug!("Relaying borrow of {} for {}", isbn, caller.username);
    let loan = state
        .backend
        .borrow(&caller.token, &caller.username, &isbn)
        .await?;

    Ok((StatusCode::CREATED, Json(loan)))
}

pub async fn return_book(
    State(state): State<RelayState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(loan_id): Path<i64>,
) -> AppResult<StatusCode> {
    state
        .backend
        .return_loan(&caller.token, &caller.username, loan_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn search_users(
    State(state): State<RelayState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<UserPage>> {
    let page = state.backend.search_users(&caller.token, &params).await?;
    Ok(Json(page))
}

pub async fn get_user(
    State(state): State<RelayState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(user_name): Path<String>,
) -> AppResult<Json<UserDto>> {
    let user = state
        .backend
        .user_with_loans(&caller.token, &user_name)
        .await?;
    Ok(Json(user))
}
