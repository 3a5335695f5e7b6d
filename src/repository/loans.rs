//! Loans repository for database operations

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::loan::{Loan, LoanWithBook, LoanWithBookRow},
};

use super::{query, LoanStore};

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoanStore for LoansRepository {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Loan>> {
        let loan = sqlx::query_as::<_, Loan>(
            "SELECT id, user_id, book_id, borrowed_at, returned_at FROM loans WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(loan)
    }

    async fn create_open(
        &self,
        user_id: i64,
        book_id: i64,
        borrowed_at: DateTime<Utc>,
    ) -> AppResult<Loan> {
        // The NOT EXISTS guard handles the common case; two racing inserts
        // that both pass it are stopped by the partial unique index.
        let inserted = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (user_id, book_id, borrowed_at)
            SELECT $1, $2, $3
            WHERE NOT EXISTS (
                SELECT 1 FROM loans WHERE book_id = $2 AND returned_at IS NULL
            )
            RETURNING id, user_id, book_id, borrowed_at, returned_at
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(borrowed_at)
        .fetch_optional(&self.pool)
        .await;

        match inserted {
            Ok(Some(loan)) => Ok(loan),
            Ok(None) => Err(AppError::Conflict("Book is already borrowed".to_string())),
            Err(e) if query::is_constraint_violation(&e, query::OPEN_LOAN_INDEX) => {
                Err(AppError::Conflict("Book is already borrowed".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn close(&self, loan_id: i64, returned_at: DateTime<Utc>) -> AppResult<Loan> {
        let closed = sqlx::query_as::<_, Loan>(
            r#"
            UPDATE loans SET returned_at = $2
            WHERE id = $1 AND returned_at IS NULL
            RETURNING id, user_id, book_id, borrowed_at, returned_at
            "#,
        )
        .bind(loan_id)
        .bind(returned_at)
        .fetch_optional(&self.pool)
        .await?;

        match closed {
            Some(loan) => Ok(loan),
            None => match self.find_by_id(loan_id).await? {
                Some(_) => Err(AppError::Conflict("Loan already returned".to_string())),
                None => Err(AppError::NotFound(format!("Loan with id {} not found", loan_id))),
            },
        }
    }

    async fn list_for_user(&self, user_id: i64) -> AppResult<Vec<LoanWithBook>> {
        let rows = sqlx::query_as::<_, LoanWithBookRow>(
            r#"
            SELECT l.id AS loan_id, l.user_id, l.borrowed_at, l.returned_at,
                   b.id, b.isbn, b.title, b.author, b.published_at, b.publisher,
                   b.language, b.description, b.pages
            FROM loans l
            JOIN books b ON l.book_id = b.id
            WHERE l.user_id = $1
            ORDER BY l.borrowed_at DESC, l.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(LoanWithBook::from).collect())
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
