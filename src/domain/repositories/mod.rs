//! Repository trait definitions for the domain layer.
//!
//! Traits define the contract for data operations; implementations live in
//! `crate::infrastructure::persistence`. Mock implementations are generated via
//! `mockall` for service tests.
//!
//! - [`RuleRepository`] - Redirect rule storage and snapshot files

pub mod rule_repository;

pub use rule_repository::RuleRepository;

#[cfg(test)]
pub use rule_repository::MockRuleRepository;
