//! Book catalog endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::{
        book::BookDto,
        page::{BookPage, SearchParams},
    },
};

use super::AuthenticatedUser;

/// Search books by title, author or ISBN
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    params(SearchParams),
    responses(
        (status = 200, description = "Page of books with loan status", body = BookPage),
        (status = 400, description = "Invalid paging or sort parameters"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn search_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_caller): AuthenticatedUser,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<BookPage>> {
    let page = state.services.catalog.search_books(&params).await?;
    Ok(Json(page.map(BookDto::from)))
}

/// Get a single book by ISBN
#[utoipa::path(
    get,
    path = "/books/{isbn}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("isbn" = String, Path, description = "Book ISBN")
    ),
    responses(
        (status = 200, description = "Book with loan status", body = BookDto),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_caller): AuthenticatedUser,
    Path(isbn): Path<String>,
) -> AppResult<Json<BookDto>> {
    let book = state.services.catalog.find_by_isbn(&isbn).await?;
    Ok(Json(book.into()))
}
