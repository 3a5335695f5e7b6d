//! Loan management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::{AppError, AppResult},
    models::loan::LoanDto,
};

use super::AuthenticatedUser;

/// Extract the ISBN from a borrow request body.
///
/// The body is the bare ISBN; a JSON string literal is accepted as well.
pub fn parse_isbn_body(body: &str) -> AppResult<String> {
    let trimmed = body.trim();
    let isbn = if trimmed.starts_with('"') {
        serde_json::from_str::<String>(trimmed)
            .map_err(|e| AppError::Validation(format!("Invalid ISBN body: {}", e)))?
    } else {
        trimmed.to_string()
    };

    let isbn = isbn.trim();
    if isbn.is_empty() {
        return Err(AppError::Validation("ISBN must not be empty".to_string()));
    }
    Ok(isbn.to_string())
}

/// All loans of a user, open and closed, newest first
#[utoipa::path(
    get,
    path = "/users/{user_name}/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("user_name" = String, Path, description = "Username")
    ),
    responses(
        (status = 200, description = "User's loans", body = Vec<LoanDto>),
        (status = 403, description = "Not the user and not a librarian"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(user_name): Path<String>,
) -> AppResult<Json<Vec<LoanDto>>> {
    caller.require_self_or_librarian(&user_name)?;

    let loans = state.services.loans.get_user_loans(&user_name).await?;
    Ok(Json(loans.into_iter().map(LoanDto::from).collect()))
}

/// Borrow a book (body: ISBN as plain text)
#[utoipa::path(
    post,
    path = "/users/{user_name}/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("user_name" = String, Path, description = "Username")
    ),
    request_body(content = String, content_type = "text/plain", description = "ISBN of the book"),
    responses(
        (status = 201, description = "Loan created", body = LoanDto),
        (status = 400, description = "Empty or malformed ISBN"),
        (status = 403, description = "Caller is not the user"),
        (status = 404, description = "User or book not found"),
        (status = 409, description = "Book already borrowed")
    )
)]
pub async fn borrow_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(user_name): Path<String>,
    body: String,
) -> AppResult<(StatusCode, Json<LoanDto>)> {
    caller.require_self(&user_name)?;

    let isbn = parse_isbn_body(&body)?;
    let loan = state.services.loans.borrow(&isbn, &user_name).await?;

    Ok((StatusCode::CREATED, Json(loan.into())))
}

/// Return a borrowed book
#[utoipa::path(
    delete,
    path = "/users/{user_name}/loans/{loan_id}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("user_name" = String, Path, description = "Username"),
        ("loan_id" = i64, Path, description = "Loan ID")
    ),
    responses(
        (status = 204, description = "Book returned"),
        (status = 403, description = "Caller does not own the loan"),
        (status = 404, description = "User or loan not found"),
        (status = 409, description = "Loan already returned")
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path((user_name, loan_id)): Path<(String, i64)>,
) -> AppResult<StatusCode> {
    caller.require_self(&user_name)?;

    state.services.loans.return_book(loan_id, &user_name).await?;
    Ok(StatusCode::NO_CONTENT)
}
