//! API handlers for the library REST endpoints

pub mod books;
pub mod health;
pub mod loans;
pub mod openapi;
pub mod users;

use std::{sync::Arc, time::Duration};

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    routing::get,
    RequestPartsExt, Router,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    auth::{Caller, TokenVerifier},
    error::AppError,
    AppState,
};

/// Extractor for the caller identity from the bearer token
pub struct AuthenticatedUser(pub Caller);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    Arc<TokenVerifier>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| {
                AppError::Authentication("Missing or invalid authorization header".to_string())
            })?;

        let verifier = Arc::<TokenVerifier>::from_ref(state);
        let caller = verifier.verify(bearer.token())?;

        Ok(AuthenticatedUser(caller))
    }
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Books
        .route("/books", get(books::search_books))
        .route("/books/:isbn", get(books::get_book))
        // Users
        .route("/users", get(users::search_users))
        .route("/users/:user_name", get(users::get_user))
        // Loans
        .route(
            "/users/:user_name/loans",
            get(loans::get_user_loans).post(loans::borrow_book),
        )
        .route(
            "/users/:user_name/loans/:loan_id",
            axum::routing::delete(loans::return_book),
        )
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
