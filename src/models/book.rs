//! Book model and catalog views

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::error::AppError;

/// Book row from the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub id: i64,
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub published_at: Option<i32>,
    pub publisher: Option<String>,
    pub language: Option<String>,
    pub description: Option<String>,
    pub pages: Option<i32>,
}

/// Book joined with its open loan, if any.
///
/// The three loan columns are either all set (borrowed) or all null (available).
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct BookWithLoanStatus {
    #[sqlx(flatten)]
    pub book: Book,
    pub loan_id: Option<i64>,
    pub borrower_id: Option<i64>,
    pub borrowed_at: Option<DateTime<Utc>>,
}

impl BookWithLoanStatus {
    pub fn available(book: Book) -> Self {
        Self {
            book,
            loan_id: None,
            borrower_id: None,
            borrowed_at: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.loan_id.is_none()
    }

    pub fn loan_status(&self) -> LoanStatus {
        if self.is_available() {
            LoanStatus {
                available: true,
                borrowed_by: None,
                borrowed_at: None,
            }
        } else {
            LoanStatus {
                available: false,
                borrowed_by: self.borrower_id,
                borrowed_at: self.borrowed_at,
            }
        }
    }
}

/// Current availability of a book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoanStatus {
    pub available: bool,
    /// Borrower's user id, only while borrowed
    pub borrowed_by: Option<i64>,
    /// Start of the open loan, only while borrowed
    pub borrowed_at: Option<DateTime<Utc>>,
}

/// Book as exposed over the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookDto {
    pub isbn: String,
    pub title: String,
    pub author: String,
    /// Year of publication
    pub published_at: Option<i32>,
    pub publisher: Option<String>,
    pub language: Option<String>,
    pub pages: Option<i32>,
    pub description: Option<String>,
    /// Absent when the book is embedded in a loan
    pub loan_status: Option<LoanStatus>,
}

impl From<Book> for BookDto {
    fn from(book: Book) -> Self {
        BookDto {
            isbn: book.isbn,
            title: book.title,
            author: book.author,
            published_at: book.published_at,
            publisher: book.publisher,
            language: book.language,
            pages: book.pages,
            description: book.description,
            loan_status: None,
        }
    }
}

impl From<BookWithLoanStatus> for BookDto {
    fn from(row: BookWithLoanStatus) -> Self {
        let status = row.loan_status();
        BookDto {
            loan_status: Some(status),
            ..BookDto::from(row.book)
        }
    }
}

/// Sortable book columns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BookSortKey {
    #[default]
    Title,
    Author,
    Isbn,
}

impl BookSortKey {
    /// Column used in ORDER BY
    pub fn column(&self) -> &'static str {
        match self {
            BookSortKey::Title => "b.title",
            BookSortKey::Author => "b.author",
            BookSortKey::Isbn => "b.isbn",
        }
    }
}

impl std::str::FromStr for BookSortKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "title" => Ok(BookSortKey::Title),
            "author" => Ok(BookSortKey::Author),
            "isbn" => Ok(BookSortKey::Isbn),
            _ => Err(AppError::Validation(format!(
                "Invalid sortBy '{}', expected one of: title, author, isbn",
                s
            ))),
        }
    }
}
