//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /health`      - Health check: rule count, access log queue (public)
//! - `/api/*`            - Rule management (Bearer token when configured)
//! - anything else       - Redirect lookup by `Host` and path
//!
//! Paths are matched exactly; no trailing slash normalization is applied.
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Authentication** - Optional Bearer token on the API

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::{auth, tracing};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> Router {
    let api_router = api::routes::protected_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));

    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api_router)
        .fallback(redirect_handler)
        .with_state(state)
        .layer(tracing::layer())
}
