//! Helpers used across the application:
//!
//! - [`extract_domain`] - Domain extraction from the `Host` header
//! - [`client_ip`] - Client address resolution behind proxies
//! - [`rule_id`] - Rule identifier generation

pub mod client_ip;
pub mod extract_domain;
pub mod rule_id;
