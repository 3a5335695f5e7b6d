//! Repository layer for database operations
//!
//! Each store is a trait so services can run against PostgreSQL in
//! production and against mocks or in-memory stores in tests.

pub mod books;
pub mod loans;
pub mod query;
pub mod users;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{
        book::{BookSortKey, BookWithLoanStatus},
        loan::{Loan, LoanWithBook},
        page::SearchRequest,
        user::{User, UserSortKey},
    },
};

/// Book catalog, always read together with the current loan state
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn find_by_isbn(&self, isbn: &str) -> AppResult<Option<BookWithLoanStatus>>;

    /// One page of matching books and the total match count
    async fn search(
        &self,
        request: &SearchRequest<BookSortKey>,
    ) -> AppResult<(Vec<BookWithLoanStatus>, i64)>;
}

/// User directory
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    async fn search(&self, request: &SearchRequest<UserSortKey>) -> AppResult<(Vec<User>, i64)>;
}

/// Loan ledger
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoanStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Loan>>;

    /// Inserts an open loan unless the book already has one.
    ///
    /// Fails with `Conflict` when an open loan exists; the check and the
    /// insert must be atomic.
    async fn create_open(
        &self,
        user_id: i64,
        book_id: i64,
        borrowed_at: DateTime<Utc>,
    ) -> AppResult<Loan>;

    /// Closes an open loan. `NotFound` if missing, `Conflict` if already closed.
    async fn close(&self, loan_id: i64, returned_at: DateTime<Utc>) -> AppResult<Loan>;

    /// All loans of a user, newest first
    async fn list_for_user(&self, user_id: i64) -> AppResult<Vec<LoanWithBook>>;

    /// Store connectivity check
    async fn ping(&self) -> AppResult<()>;
}

/// Main repository struct holding the three stores
#[derive(Clone)]
pub struct Repository {
    pub books: Arc<dyn BookStore>,
    pub users: Arc<dyn UserStore>,
    pub loans: Arc<dyn LoanStore>,
}

impl Repository {
    /// Create a PostgreSQL-backed repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: Arc::new(books::BooksRepository::new(pool.clone())),
            users: Arc::new(users::UsersRepository::new(pool.clone())),
            loans: Arc::new(loans::LoansRepository::new(pool)),
        }
    }

    /// Assemble a repository from arbitrary store implementations
    pub fn from_stores(
        books: Arc<dyn BookStore>,
        users: Arc<dyn UserStore>,
        loans: Arc<dyn LoanStore>,
    ) -> Self {
        Self {
            books,
            users,
            loans,
        }
    }
}
