//! Paging, sorting and filtering shared by the book and user searches

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    config::SearchConfig,
    error::{AppError, AppResult},
};

use super::{book::BookDto, user::UserDto};

/// Query string accepted by the search endpoints
#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Free-text filter (case-insensitive substring)
    pub search_string: Option<String>,
    /// Zero-based page index
    #[validate(range(min = 0, message = "page must not be negative"))]
    pub page: Option<i64>,
    /// Page length
    #[validate(range(min = 1, message = "size must be at least 1"))]
    pub size: Option<i64>,
    /// Sort column
    pub sort_by: Option<String>,
}

/// Validated zero-based page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    size: i64,
}

impl PageRequest {
    /// Builds a page window, capping `size` at `max_size`.
    pub fn new(page: i64, size: i64, max_size: i64) -> AppResult<Self> {
        if page < 0 {
            return Err(AppError::Validation("page must not be negative".to_string()));
        }
        if size < 1 {
            return Err(AppError::Validation("size must be at least 1".to_string()));
        }
        Ok(Self {
            page,
            size: size.min(max_size.max(1)),
        })
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn size(&self) -> i64 {
        self.size
    }

    pub fn offset(&self) -> i64 {
        self.page.saturating_mul(self.size)
    }
}

/// A fully validated search: normalized filter, page window and sort key
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest<S> {
    pub filter: Option<String>,
    pub page: PageRequest,
    pub sort: S,
}

impl<S> SearchRequest<S>
where
    S: std::str::FromStr<Err = AppError> + Default,
{
    /// Validate raw query parameters against the configured limits
    pub fn from_params(params: &SearchParams, limits: &SearchConfig) -> AppResult<Self> {
        validator::Validate::validate(params)?;

        let sort = match params.sort_by.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => key.parse()?,
            _ => S::default(),
        };

        let page = PageRequest::new(
            params.page.unwrap_or(0),
            params.size.unwrap_or(limits.default_page_size),
            limits.max_page_size,
        )?;

        Ok(Self {
            filter: normalize_filter(params.search_string.as_deref()),
            page,
            sort,
        })
    }
}

/// Blank filters mean "no filter"
pub fn normalize_filter(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// One page of results plus totals, in the shape the UI consumes
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[aliases(BookPage = PageResponse<BookDto>, UserPage = PageResponse<UserDto>)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub content: Vec<T>,
    /// Zero-based page index
    pub number: i64,
    pub size: i64,
    pub total_pages: i64,
    pub total_elements: i64,
    pub first: bool,
    pub last: bool,
    pub number_of_elements: i64,
    pub empty: bool,
}

impl<T> PageResponse<T> {
    pub fn new(content: Vec<T>, request: PageRequest, total_elements: i64) -> Self {
        let size = request.size();
        let total_pages = if total_elements <= 0 {
            0
        } else {
            (total_elements - 1) / size + 1
        };

        Self {
            number: request.page(),
            size,
            total_pages,
            total_elements,
            first: request.page() == 0,
            last: request.page().saturating_add(1) >= total_pages,
            number_of_elements: content.len() as i64,
            empty: content.is_empty(),
            content,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResponse<U> {
        PageResponse {
            content: self.content.into_iter().map(f).collect(),
            number: self.number,
            size: self.size,
            total_pages: self.total_pages,
            total_elements: self.total_elements,
            first: self.first,
            last: self.last,
            number_of_elements: self.number_of_elements,
            empty: self.empty,
        }
    }
}
