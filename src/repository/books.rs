//! Books repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{
        book::{BookSortKey, BookWithLoanStatus},
        page::SearchRequest,
    },
};

use super::{query, BookStore};

/// Columns of `books b` plus the open loan from `loans l`
const BOOK_WITH_LOAN_COLUMNS: &str = r#"
    b.id, b.isbn, b.title, b.author, b.published_at, b.publisher,
    b.language, b.description, b.pages,
    l.id AS loan_id, l.user_id AS borrower_id, l.borrowed_at
"#;

const FILTER: &str = r#"
    ($1::text IS NULL
     OR b.title ILIKE $1
     OR b.author ILIKE $1
     OR b.isbn ILIKE $1)
"#;

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for BooksRepository {
    async fn find_by_isbn(&self, isbn: &str) -> AppResult<Option<BookWithLoanStatus>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM books b
            LEFT JOIN loans l ON l.book_id = b.id AND l.returned_at IS NULL
            WHERE b.isbn = $1
            "#,
            BOOK_WITH_LOAN_COLUMNS
        );

        let book = sqlx::query_as::<_, BookWithLoanStatus>(&sql)
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?;

        Ok(book)
    }

    async fn search(
        &self,
        request: &SearchRequest<BookSortKey>,
    ) -> AppResult<(Vec<BookWithLoanStatus>, i64)> {
        let pattern = request.filter.as_deref().map(query::like_pattern);

        let select_query = format!(
            r#"
            SELECT {}
            FROM books b
            LEFT JOIN loans l ON l.book_id = b.id AND l.returned_at IS NULL
            WHERE {}
            {}
            LIMIT $2 OFFSET $3
            "#,
            BOOK_WITH_LOAN_COLUMNS,
            FILTER,
            query::order_by(request.sort.column(), "b.id")
        );
        let count_query = format!("SELECT COUNT(*) FROM books b WHERE {}", FILTER);

        let rows = sqlx::query_as::<_, BookWithLoanStatus>(&select_query)
            .bind(&pattern)
            .bind(request.page.size())
            .bind(request.page.offset())
            .fetch_all(&self.pool);

        let total = sqlx::query_scalar::<_, i64>(&count_query)
            .bind(&pattern)
            .fetch_one(&self.pool);

        let (books, total) = tokio::try_join!(rows, total)?;
        Ok((books, total))
    }
}
