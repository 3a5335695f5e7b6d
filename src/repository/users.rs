//! Users repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{
        page::SearchRequest,
        user::{User, UserSortKey},
    },
};

use super::{query, UserStore};

const FILTER: &str = r#"
    ($1::text IS NULL
     OR u.username ILIKE $1
     OR u.firstname ILIKE $1
     OR u.lastname ILIKE $1
     OR u.email ILIKE $1)
"#;

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UsersRepository {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, firstname, lastname, email FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn search(&self, request: &SearchRequest<UserSortKey>) -> AppResult<(Vec<User>, i64)> {
        let pattern = request.filter.as_deref().map(query::like_pattern);

        let select_query = format!(
            r#"
            SELECT u.id, u.username, u.firstname, u.lastname, u.email
            FROM users u
            WHERE {}
            {}
            LIMIT $2 OFFSET $3
            "#,
            FILTER,
            query::order_by(request.sort.column(), "u.id")
        );
        let count_query = format!("SELECT COUNT(*) FROM users u WHERE {}", FILTER);

        let rows = sqlx::query_as::<_, User>(&select_query)
            .bind(&pattern)
            .bind(request.page.size())
            .bind(request.page.offset())
            .fetch_all(&self.pool);

        let total = sqlx::query_scalar::<_, i64>(&count_query)
            .bind(&pattern)
            .fetch_one(&self.pool);

        let (users, total) = tokio::try_join!(rows, total)?;
        Ok((users, total))
    }
}
