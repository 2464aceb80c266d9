//! Rule storage implementations.
//!
//! - [`InMemoryRuleStore`] - lock-guarded map with atomic JSON snapshot files

mod rule_store;

pub use rule_store::InMemoryRuleStore;
