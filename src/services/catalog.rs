//! Catalog search service

use crate::{
    config::SearchConfig,
    error::{AppError, AppResult},
    models::{
        book::{BookSortKey, BookWithLoanStatus},
        page::{PageResponse, SearchParams, SearchRequest},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    limits: SearchConfig,
}

impl CatalogService {
    pub fn new(repository: Repository, limits: SearchConfig) -> Self {
        Self { repository, limits }
    }

    /// Paged book search, each book annotated with its loan status
    pub async fn search_books(
        &self,
        params: &SearchParams,
    ) -> AppResult<PageResponse<BookWithLoanStatus>> {
        let request = SearchRequest::<BookSortKey>::from_params(params, &self.limits)?;
        let (books, total) = self.repository.books.search(&request).await?;
        Ok(PageResponse::new(books, request.page, total))
    }

    /// Get a single book by ISBN
    pub async fn find_by_isbn(&self, isbn: &str) -> AppResult<BookWithLoanStatus> {
        self.repository
            .books
            .find_by_isbn(isbn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with ISBN {} not found", isbn)))
    }
}
