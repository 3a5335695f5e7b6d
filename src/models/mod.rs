//! Data models for the library

pub mod book;
pub mod loan;
pub mod page;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookDto, BookSortKey, BookWithLoanStatus, LoanStatus};
pub use loan::{Loan, LoanDto, LoanWithBook};
pub use page::{PageRequest, PageResponse, SearchParams, SearchRequest};
pub use user::{User, UserDto, UserSortKey};
