//! Loan workflow: borrow, return and loan history

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::BookWithLoanStatus,
        loan::{Loan, LoanWithBook},
        user::User,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
}

impl LoansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    async fn user(&self, username: &str) -> AppResult<User> {
        self.repository
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", username)))
    }

    async fn book(&self, isbn: &str) -> AppResult<BookWithLoanStatus> {
        self.repository
            .books
            .find_by_isbn(isbn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with ISBN {} not found", isbn)))
    }

    async fn loan(&self, loan_id: i64) -> AppResult<Loan> {
        self.repository
            .loans
            .find_by_id(loan_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", loan_id)))
    }

    /// Database round-trip used by the readiness check
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.loans.ping().await
    }

    /// All loans (open and closed) of a user, newest first
    pub async fn get_user_loans(&self, username: &str) -> AppResult<Vec<LoanWithBook>> {
        let user = self.user(username).await?;
        self.repository.loans.list_for_user(user.id).await
    }

    /// Borrow a book for a user
    pub async fn borrow(&self, isbn: &str, username: &str) -> AppResult<LoanWithBook> {
        let (user, book) = tokio::try_join!(self.user(username), self.book(isbn))?;

        let loan = match self
            .repository
            .loans
            .create_open(user.id, book.book.id, Utc::now())
            .await
        {
            Ok(loan) => loan,
            Err(AppError::Conflict(msg)) => {
                tracing::info!("Borrow refused: {} is already borrowed", isbn);
                return Err(AppError::Conflict(msg));
            }
            Err(e) => return Err(e),
        };

        tracing::info!("Loan {} opened: {} borrowed {}", loan.id, username, isbn);

        Ok(LoanWithBook {
            loan,
            book: book.book,
        })
    }

    /// Return a borrowed book. Only the borrower may return it, and only once.
    pub async fn return_book(&self, loan_id: i64, username: &str) -> AppResult<()> {
        let (user, loan) = tokio::try_join!(self.user(username), self.loan(loan_id))?;

        if loan.user_id != user.id {
            return Err(AppError::Authorization(format!(
                "User {} is not the owner of loan {}",
                username, loan_id
            )));
        }

        if !loan.is_open() {
            return Err(AppError::Conflict("Loan already returned".to_string()));
        }

        self.repository.loans.close(loan.id, Utc::now()).await?;

        tracing::info!("Loan {} closed by {}", loan_id, username);
        Ok(())
    }
}
