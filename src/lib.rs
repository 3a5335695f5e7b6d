//! Library management server
//!
//! REST JSON backend for a small library: book catalog search, a user
//! directory and the borrow/return workflow. The `relay` module holds the
//! client-facing gateway that forwards to this backend.

use std::sync::Arc;

use axum::extract::FromRef;

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod relay;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
    pub verifier: Arc<auth::TokenVerifier>,
}

impl FromRef<AppState> for Arc<auth::TokenVerifier> {
    fn from_ref(state: &AppState) -> Self {
        state.verifier.clone()
    }
}
