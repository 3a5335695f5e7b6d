//! User directory service

use crate::{
    config::SearchConfig,
    error::{AppError, AppResult},
    models::{
        page::{PageResponse, SearchParams, SearchRequest},
        user::{User, UserSortKey},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    limits: SearchConfig,
}

impl UsersService {
    pub fn new(repository: Repository, limits: SearchConfig) -> Self {
        Self { repository, limits }
    }

    /// Paged user search
    pub async fn search_users(&self, params: &SearchParams) -> AppResult<PageResponse<User>> {
        let request = SearchRequest::<UserSortKey>::from_params(params, &self.limits)?;
        let (users, total) = self.repository.users.search(&request).await?;
        Ok(PageResponse::new(users, request.page, total))
    }

    /// Get user by username
    pub async fn find_by_username(&self, username: &str) -> AppResult<User> {
        self.repository
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", username)))
    }
}
