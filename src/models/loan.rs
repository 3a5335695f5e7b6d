//! Loan (borrow) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::book::{Book, BookDto};

/// Loan model from database. Open while `returned_at` is null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Loan {
    pub id: i64,
    pub user_id: i64,
    pub book_id: i64,
    pub borrowed_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
}

impl Loan {
    pub fn is_open(&self) -> bool {
        self.returned_at.is_none()
    }
}

/// Loan joined with the borrowed book
#[derive(Debug, Clone, PartialEq)]
pub struct LoanWithBook {
    pub loan: Loan,
    pub book: Book,
}

/// Flat row of `loans JOIN books`
#[derive(Debug, Clone, FromRow)]
pub struct LoanWithBookRow {
    pub loan_id: i64,
    pub user_id: i64,
    pub borrowed_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    #[sqlx(flatten)]
    pub book: Book,
}

impl From<LoanWithBookRow> for LoanWithBook {
    fn from(row: LoanWithBookRow) -> Self {
        LoanWithBook {
            loan: Loan {
                id: row.loan_id,
                user_id: row.user_id,
                book_id: row.book.id,
                borrowed_at: row.borrowed_at,
                returned_at: row.returned_at,
            },
            book: row.book,
        }
    }
}

/// Loan as exposed over the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoanDto {
    pub id: i64,
    pub book: BookDto,
    pub borrowed_at: DateTime<Utc>,
    /// Null while the book is still out
    pub returned_at: Option<DateTime<Utc>>,
}

impl From<LoanWithBook> for LoanDto {
    fn from(value: LoanWithBook) -> Self {
        LoanDto {
            id: value.loan.id,
            book: value.book.into(),
            borrowed_at: value.loan.borrowed_at,
            returned_at: value.loan.returned_at,
        }
    }
}
