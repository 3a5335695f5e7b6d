//! User directory endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::{
        page::{SearchParams, UserPage},
        user::UserDto,
    },
};

use super::AuthenticatedUser;

/// Search users by username, first name, last name or email
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    params(SearchParams),
    responses(
        (status = 200, description = "Page of users", body = UserPage),
        (status = 400, description = "Invalid paging or sort parameters"),
        (status = 403, description = "Librarian role required")
    )
)]
pub async fn search_users(
    State(state): State<crate::AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<UserPage>> {
    caller.require_librarian()?;

    let page = state.services.users.search_users(&params).await?;
    Ok(Json(page.map(UserDto::from)))
}

/// Get a user profile by username
#[utoipa::path(
    get,
    path = "/users/{user_name}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("user_name" = String, Path, description = "Username")
    ),
    responses(
        (status = 200, description = "User profile", body = UserDto),
        (status = 403, description = "Not the user and not a librarian"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(user_name): Path<String>,
) -> AppResult<Json<UserDto>> {
    caller.require_self_or_librarian(&user_name)?;

    let user = state.services.users.find_by_username(&user_name).await?;
    Ok(Json(user.into()))
}
