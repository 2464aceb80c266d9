//! In-memory rule store backed by JSON snapshot files.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs;
use tokio::sync::RwLock;

use crate::domain::entities::{RedirectRule, RuleKey};
use crate::domain::repositories::RuleRepository;
use crate::error::StoreError;
use crate::utils::rule_id::{generate_rule_id, unique_rule_id};

/// Concurrent rule map guarded by one coarse lock.
///
/// Every operation takes the lock once, so each `get`/`set`/`delete` is atomic
/// with respect to the others. Reads filter expired rules without removing
/// them.
#[derive(Default)]
pub struct InMemoryRuleStore {
    rules: RwLock<HashMap<RuleKey, RedirectRule>>,
}

impl InMemoryRuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store pre-populated with `rules`. Later duplicates of a key win.
    pub fn with_rules(rules: impl IntoIterator<Item = RedirectRule>) -> Self {
        Self {
            rules: RwLock::new(rules.into_iter().map(|r| (r.key(), r)).collect()),
        }
    }

    /// Number of stored entries, expired ones included.
    pub async fn stored_len(&self) -> usize {
        self.rules.read().await.len()
    }

    /// Sibling path the snapshot is written to before being renamed into place.
    fn temp_path(path: &Path) -> PathBuf {
        let mut name = path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        path.with_file_name(name)
    }
}

#[async_trait]
impl RuleRepository for InMemoryRuleStore {
    async fn get(&self, domain: &str, path: &str) -> Option<RedirectRule> {
        let key = RuleKey::new(domain, path);
        self.rules
            .read()
            .await
            .get(&key)
            .filter(|r| !r.is_expired())
            .cloned()
    }

    async fn set(&self, rule: RedirectRule) {
        self.rules.write().await.insert(rule.key(), rule);
    }

    async fn delete(&self, domain: &str, path: &str) -> bool {
        let key = RuleKey::new(domain, path);
        self.rules.write().await.remove(&key).is_some()
    }

    async fn list(&self) -> Vec<RedirectRule> {
        let now = Utc::now();
        self.rules
            .read()
            .await
            .values()
            .filter(|r| !r.is_expired_at(now))
            .cloned()
            .collect()
    }

    async fn load_from_file(&self, path: &Path) -> Result<usize, StoreError> {
        let data = match fs::read(path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "Rule file not found, starting empty");
                self.rules.write().await.clear();
                return Ok(0);
            }
            Err(e) => return Err(StoreError::io(path, e)),
        };

        let rules: Vec<RedirectRule> =
            serde_json::from_slice(&data).map_err(|source| StoreError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let now = Utc::now();
        let mut fresh: HashMap<RuleKey, RedirectRule> = rules
            .into_iter()
            .filter(|r| !r.is_expired_at(now))
            .map(|mut r| {
                r.domain = r.domain.trim().to_ascii_lowercase();
                (r.key(), r)
            })
            .collect();
        assign_missing_ids(&mut fresh);
        let count = fresh.len();

        *self.rules.write().await = fresh;

        tracing::debug!(path = %path.display(), count, "Rules loaded");
        Ok(count)
    }

    async fn save_to_file(&self, path: &Path) -> Result<usize, StoreError> {
        let rules = self.list().await;
        let json = serde_json::to_vec_pretty(&rules).map_err(StoreError::Serialize)?;

        let temp_path = Self::temp_path(path);
        fs::write(&temp_path, &json)
            .await
            .map_err(|e| StoreError::io(&temp_path, e))?;
        fs::rename(&temp_path, path)
            .await
            .map_err(|e| StoreError::io(path, e))?;

        tracing::debug!(path = %path.display(), count = rules.len(), "Rules saved");
        Ok(rules.len())
    }
}

/// Gives every unnamed rule a generated id that no other rule holds.
///
/// Unnamed rules are visited in `(domain, path)` order so the suffixes are
/// stable across loads.
fn assign_missing_ids(rules: &mut HashMap<RuleKey, RedirectRule>) {
    let mut taken: HashSet<String> = rules
        .values()
        .filter(|r| !r.id.is_empty())
        .map(|r| r.id.clone())
        .collect();

    let mut unnamed: Vec<&mut RedirectRule> =
        rules.values_mut().filter(|r| r.id.is_empty()).collect();
    unnamed.sort_by(|a, b| a.domain.cmp(&b.domain).then_with(|| a.path.cmp(&b.path)));

    for rule in unnamed {
        let id = unique_rule_id(&generate_rule_id(&rule.domain, &rule.path), |id| {
            taken.contains(id)
        });
        taken.insert(id.clone());
        rule.id = id;
    }
}
