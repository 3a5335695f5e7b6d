//! HTTP client for the downstream library backend

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::{
    config::BackendConfig,
    error::{AppError, AppResult, ErrorResponse},
    models::{
        book::BookDto,
        loan::LoanDto,
        page::{BookPage, SearchParams, UserPage},
        user::UserDto,
    },
};

/// Forwards calls to the backend with the caller's bearer token attached
#[derive(Clone)]
pub struct BackendClient {
    base_url: Url,
    client: reqwest::Client,
}

fn transport_error(e: reqwest::Error) -> AppError {
    tracing::warn!("Backend request failed: {}", e);
    AppError::Upstream(format!("Backend unreachable: {}", e))
}

/// Map a backend response to the relay's result, keeping the backend's
/// status and message for the statuses the backend itself produces.
pub(crate) async fn handle_response<T: DeserializeOwned>(response: Response) -> AppResult<T> {
    let status = response.status();

    if status.is_success() {
        return response.json::<T>().await.map_err(transport_error);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| e.message)
        .unwrap_or(body);

    let error = match status {
        StatusCode::BAD_REQUEST => AppError::Validation(message),
        StatusCode::UNAUTHORIZED => AppError::Authentication(message),
        StatusCode::FORBIDDEN => AppError::Authorization(message),
        StatusCode::NOT_FOUND => AppError::NotFound(message),
        StatusCode::CONFLICT => AppError::Conflict(message),
        _ => AppError::Upstream(format!("Backend returned {}: {}", status, message)),
    };

    Err(error)
}

/// Like `handle_response` for endpoints answering with an empty body
async fn handle_empty(response: Response) -> AppResult<()> {
    if response.status().is_success() {
        return Ok(());
    }
    handle_response::<serde_json::Value>(response).await.map(|_| ())
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> AppResult<Self> {
        let base_url = Url::parse(config.base_url.trim_end_matches('/'))
            .map_err(|e| AppError::Internal(format!("Invalid backend URL: {}", e)))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Cannot build HTTP client: {}", e)))?;

        Ok(Self { base_url, client })
    }

    /// Builds `{base}/api/v1/{segments...}` with each segment percent-encoded
    fn url(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Internal("Backend URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["api", "v1"])
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, token: &str, segments: &[&str]) -> AppResult<RequestBuilder> {
        Ok(self
            .client
            .request(method, self.url(segments)?)
            .bearer_auth(token))
    }

    async fn send(builder: RequestBuilder) -> AppResult<Response> {
        builder.send().await.map_err(transport_error)
    }

    pub async fn search_books(&self, token: &str, params: &SearchParams) -> AppResult<BookPage> {
        let request = self.request(Method::GET, token, &["books"])?.query(params);
        handle_response(Self::send(request).await?).await
    }

    pub async fn get_book(&self, token: &str, isbn: &str) -> AppResult<BookDto> {
        let request = self.request(Method::GET, token, &["books", isbn])?;
        handle_response(Self::send(request).await?).await
    }

    pub async fn search_users(&self, token: &str, params: &SearchParams) -> AppResult<UserPage> {
        let request = self.request(Method::GET, token, &["users"])?.query(params);
        handle_response(Self::send(request).await?).await
    }

    pub async fn get_user(&self, token: &str, user_name: &str) -> AppResult<UserDto> {
        let request = self.request(Method::GET, token, &["users", user_name])?;
        handle_response(Self::send(request).await?).await
    }

    pub async fn get_user_loans(&self, token: &str, user_name: &str) -> AppResult<Vec<LoanDto>> {
        let request = self.request(Method::GET, token, &["users", user_name, "loans"])?;
        handle_response(Self::send(request).await?).await
    }

    pub async fn borrow(&self, token: &str, user_name: &str, isbn: &str) -> AppResult<LoanDto> {
        let request = self
            .request(Method::POST, token, &["users", user_name, "loans"])?
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(isbn.to_string());
        handle_response(Self::send(request).await?).await
    }

    pub async fn return_loan(&self, token: &str, user_name: &str, loan_id: i64) -> AppResult<()> {
        let loan_id = loan_id.to_string();
        let request =
            self.request(Method::DELETE, token, &["users", user_name, "loans", &loan_id])?;
        handle_empty(Self::send(request).await?).await
    }

    /// A user record with its loan history, fetched concurrently
    pub async fn user_with_loans(&self, token: &str, user_name: &str) -> AppResult<UserDto> {
        let (mut user, loans) = tokio::try_join!(
            self.get_user(token, user_name),
            self.get_user_loans(token, user_name)
        )?;
        user.loans = Some(loans);
        Ok(user)
    }
}
