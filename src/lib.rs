//! # jumpgate
//!
//! A host and path based HTTP redirect service built with Axum.
//!
//! Incoming requests are matched by `Host` and path against an in-memory rule
//! set and answered with a 301, 302 or 307 redirect, or with a small HTML page
//! that redirects in the browser. Every redirect is appended to a buffered,
//! newline-delimited JSON access log.
//!
//! ## Architecture
//!
//! - **Domain Layer** ([`domain`]) - Rules, conflict detection and the repository trait
//! - **Application Layer** ([`application`]) - Rule management and redirect resolution
//! - **Infrastructure Layer** ([`infrastructure`]) - Rule store with JSON snapshots, access logger
//! - **API Layer** ([`api`]) - Management API, redirect handler and middleware
//! - **Web Layer** ([`web`]) - Script redirect page
//!
//! ## Features
//!
//! - Exact path rules with a per-domain fallback rule
//! - Conflict detection between overlapping rules
//! - Lazy rule expiry
//! - Atomic rules file snapshots after every change
//! - Access log batching by size and time
//!
//! ## Quick Start
//!
//! ```bash
//! export RULES_FILE="rules.json"
//! export ADMIN_TOKEN="change-me"   # Optional
//!
//! cargo run
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod utils;

pub mod config;
pub mod server;

pub mod routes;
pub mod web;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{RedirectService, RuleService};
    pub use crate::domain::entities::{NewRule, RedirectKind, RedirectRule};
    pub use crate::error::AppError;
    pub use crate::infrastructure::access_log::AccessLogger;
    pub use crate::infrastructure::persistence::InMemoryRuleStore;
    pub use crate::state::AppState;
}
