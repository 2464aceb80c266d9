//! Business logic services for the application layer.

pub mod redirect_service;
pub mod rule_service;

pub use redirect_service::RedirectService;
pub use rule_service::RuleService;
