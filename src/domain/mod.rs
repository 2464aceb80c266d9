//! Domain layer containing business entities and logic.
//!
//! # Architecture
//!
//! - [`entities`] - Core data structures (rules, log entries, redirect actions)
//! - [`repositories`] - Data access trait definitions
//! - [`conflict`] - Advisory conflict classification of candidate rules
//!
//! # Request Flow
//!
//! 1. HTTP handler extracts `(domain, path)` from the request
//! 2. [`crate::application::services::RedirectService`] resolves the rule
//! 3. A [`entities::RedirectAction`] decides the response
//! 4. An [`entities::AccessLogEntry`] is queued for the background log worker

pub mod conflict;
pub mod entities;
pub mod repositories;
