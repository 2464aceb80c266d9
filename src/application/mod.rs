//! Application layer services implementing business logic.
//!
//! Services consume repository traits and provide a clean API for HTTP
//! handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::rule_service::RuleService`] - Rule CRUD, conflict checks, reload and save
//! - [`services::redirect_service::RedirectService`] - Request to rule resolution

pub mod services;
