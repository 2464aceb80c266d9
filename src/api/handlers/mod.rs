//! HTTP request handlers.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod health;
pub mod persistence;
pub mod redirect;
pub mod rules;

pub use health::health_handler;
pub use persistence::{reload_handler, save_handler};
pub use redirect::redirect_handler;
pub use rules::{
    check_rule_handler, create_rule_handler, delete_rule_handler, get_rule_handler,
    list_rules_handler, update_rule_handler,
};
