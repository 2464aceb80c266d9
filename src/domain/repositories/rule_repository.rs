//! Repository trait for redirect rule storage.

use std::path::Path;

use crate::domain::entities::RedirectRule;
use crate::error::StoreError;
use async_trait::async_trait;

/// Storage of redirect rules keyed by `(domain, path)`.
///
/// Expired rules are never returned by any read, but reads do not remove them;
/// they stay in storage until deleted or until a reload drops them.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::InMemoryRuleStore`] - lock-guarded map
///   with JSON snapshot files
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RuleRepository: Send + Sync {
    /// Exact-key lookup. Returns `None` if absent or expired.
    async fn get(&self, domain: &str, path: &str) -> Option<RedirectRule>;

    /// Inserts the rule or overwrites the one stored at the same key.
    async fn set(&self, rule: RedirectRule);

    /// Removes the rule at `(domain, path)`.
    ///
    /// Returns `true` if a rule was removed.
    async fn delete(&self, domain: &str, path: &str) -> bool;

    /// Returns all non-expired rules in no particular order.
    async fn list(&self) -> Vec<RedirectRule>;

    /// Replaces the whole rule set with the JSON array stored at `path`.
    ///
    /// A missing file yields an empty store. On any other failure the current
    /// rules are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file cannot be read and
    /// [`StoreError::Parse`] if it is not a valid rule array.
    async fn load_from_file(&self, path: &Path) -> Result<usize, StoreError>;

    /// Writes all non-expired rules to `path` as a JSON array.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if serialization or any file operation fails.
    async fn save_to_file(&self, path: &Path) -> Result<usize, StoreError>;
}
