//! Core domain entities.
//!
//! - [`RedirectRule`] - A stored redirect rule keyed by [`RuleKey`]
//! - [`NewRule`] - Draft of a rule before id and creation time are assigned
//! - [`RedirectKind`] - Redirect strategy of a rule
//! - [`RedirectAction`] - Response chosen for a matched rule
//! - [`AccessLogEntry`] - One access log record

pub mod access_log_entry;
pub mod redirect_action;
pub mod rule;

pub use access_log_entry::AccessLogEntry;
pub use redirect_action::RedirectAction;
pub use rule::{NewRule, RedirectKind, RedirectRule, RuleKey};
