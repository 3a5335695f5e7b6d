//! Client-facing relay in front of the library backend
//!
//! Exposes a `/me`-scoped surface plus librarian routes. Tokens are verified
//! here only to learn the caller's username; authorization stays with the
//! backend, whose status codes pass through unchanged.

pub mod client;
pub mod handlers;

use std::{sync::Arc, time::Duration};

use axum::{
    extract::FromRef,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{auth::TokenVerifier, config::RelayConfig};

pub use client::BackendClient;

/// Relay state shared across handlers
#[derive(Clone)]
pub struct RelayState {
    pub config: Arc<RelayConfig>,
    pub verifier: Arc<TokenVerifier>,
    pub backend: BackendClient,
}

impl FromRef<RelayState> for Arc<TokenVerifier> {
    fn from_ref(state: &RelayState) -> Self {
        state.verifier.clone()
    }
}

/// Create the relay router
pub fn router(state: RelayState) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        .route("/health", get(handlers::health_check))
        // Catalog
        .route("/books", get(handlers::search_books))
        .route("/books/:isbn", get(handlers::get_book))
        // Current user
        .route("/me", get(handlers::me))
        .route("/me/loans", post(handlers::borrow_book))
        .route("/me/loans/:loan_id", delete(handlers::return_book))
        // Librarian
        .route("/admin/users", get(handlers::search_users))
        .route("/admin/users/:user_name", get(handlers::get_user))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
