//! Rule management service.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::domain::conflict::{Conflict, check_conflict};
use crate::domain::entities::{NewRule, RedirectRule};
use crate::domain::repositories::RuleRepository;
use crate::error::AppError;
use crate::utils::rule_id::{generate_rule_id, unique_rule_id};

/// Service for creating, replacing and deleting redirect rules.
///
/// Every mutation runs the conflict check and the commit inside one critical
/// section, so two concurrent submissions for the same key cannot both pass
/// the check. After a successful mutation the rule set is saved to the rules
/// file; a failed save is logged and does not undo the in-memory change.
pub struct RuleService<R: RuleRepository> {
    repository: Arc<R>,
    rules_file: PathBuf,
    commit_lock: Mutex<()>,
}

impl<R: RuleRepository> RuleService<R> {
    /// Creates a new rule service persisting to `rules_file`.
    pub fn new(repository: Arc<R>, rules_file: impl Into<PathBuf>) -> Self {
        Self {
            repository,
            rules_file: rules_file.into(),
            commit_lock: Mutex::new(()),
        }
    }

    pub fn rules_file(&self) -> &Path {
        &self.rules_file
    }

    /// Returns all active rules.
    pub async fn list_rules(&self) -> Vec<RedirectRule> {
        self.repository.list().await
    }

    /// Retrieves an active rule by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no active rule has this id.
    pub async fn get_rule(&self, id: &str) -> Result<RedirectRule, AppError> {
        self.find_by_id(id)
            .await
            .ok_or_else(|| AppError::not_found("Rule not found", json!({ "id": id })))
    }

    /// Classifies a draft against the stored rules without committing it.
    ///
    /// `exclude_id` names a rule to ignore, typically the one being edited.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if domain or target is empty.
    pub async fn check_conflict(
        &self,
        new_rule: NewRule,
        exclude_id: &str,
    ) -> Result<Option<Conflict>, AppError> {
        let new_rule = normalize(new_rule);
        validate_new_rule(&new_rule)?;
        let candidate = into_candidate(new_rule);
        let existing = self.repository.list().await;
        Ok(check_conflict(&candidate, exclude_id, &existing))
    }

    /// Creates a rule, assigning an id if none was given.
    ///
    /// With `force`, a reported conflict is logged and the rule is committed
    /// anyway, overwriting a rule at the same key.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if domain or target is empty.
    /// Returns [`AppError::Conflict`] if the rule conflicts and `force` is off,
    /// or if its id belongs to a rule at another key.
    pub async fn create_rule(
        &self,
        new_rule: NewRule,
        force: bool,
    ) -> Result<RedirectRule, AppError> {
        let new_rule = normalize(new_rule);
        validate_new_rule(&new_rule)?;
        let id_given = has_explicit_id(&new_rule);
        let mut rule = into_candidate(new_rule);
        rule.created_at = Utc::now();

        let _guard = self.commit_lock.lock().await;
        if !id_given {
            let existing = self.repository.list().await;
            let key = rule.key();
            rule.id = unique_rule_id(&rule.id, |id| {
                existing.iter().any(|r| r.id == id && r.key() != key)
            });
        }
        self.ensure_committable(&rule, "", force).await?;
        self.repository.set(rule.clone()).await;
        self.persist().await;

        info!(id = %rule.id, domain = %rule.domain, path = %rule.path, "Rule created");
        Ok(rule)
    }

    /// Replaces the rule `id` with `new_rule`.
    ///
    /// The creation time is kept unless the draft carries one. If domain or
    /// path changed, the entry at the old key is removed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no active rule has this id, plus the
    /// errors of [`Self::create_rule`].
    pub async fn update_rule(
        &self,
        id: &str,
        new_rule: NewRule,
        force: bool,
    ) -> Result<RedirectRule, AppError> {
        let new_rule = normalize(new_rule);
        validate_new_rule(&new_rule)?;

        let _guard = self.commit_lock.lock().await;
        let existing = self
            .find_by_id(id)
            .await
            .ok_or_else(|| AppError::not_found("Rule not found", json!({ "id": id })))?;

        let created_at = new_rule.created_at.unwrap_or(existing.created_at);
        let rule = new_rule.into_rule(id.to_string(), created_at);

        self.ensure_committable(&rule, id, force).await?;
        if existing.key() != rule.key() {
            self.repository
                .delete(&existing.domain, &existing.path)
                .await;
        }
        self.repository.set(rule.clone()).await;
        self.persist().await;

        info!(id = %rule.id, domain = %rule.domain, path = %rule.path, "Rule updated");
        Ok(rule)
    }

    /// Deletes the rule `id` and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no active rule has this id.
    pub async fn delete_rule(&self, id: &str) -> Result<RedirectRule, AppError> {
        let _guard = self.commit_lock.lock().await;
        let rule = self
            .find_by_id(id)
            .await
            .ok_or_else(|| AppError::not_found("Rule not found", json!({ "id": id })))?;

        self.repository.delete(&rule.domain, &rule.path).await;
        self.persist().await;

        info!(id = %rule.id, "Rule deleted");
        Ok(rule)
    }

    /// Replaces the in-memory rules with the content of the rules file.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the file cannot be read or parsed; the
    /// current rules stay active in that case.
    pub async fn reload(&self) -> Result<usize, AppError> {
        let _guard = self.commit_lock.lock().await;
        let count = self
            .repository
            .load_from_file(&self.rules_file)
            .await
            .inspect_err(|e| warn!(error = %e, "Rule reload failed, keeping current rules"))?;

        info!(count, path = %self.rules_file.display(), "Rules reloaded");
        Ok(count)
    }

    /// Writes the active rules to the rules file.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the file cannot be written.
    pub async fn save(&self) -> Result<usize, AppError> {
        let _guard = self.commit_lock.lock().await;
        let count = self.repository.save_to_file(&self.rules_file).await?;
        Ok(count)
    }

    async fn find_by_id(&self, id: &str) -> Option<RedirectRule> {
        self.repository
            .list()
            .await
            .into_iter()
            .find(|rule| rule.id == id)
    }

    /// Must be called with `commit_lock` held.
    async fn ensure_committable(
        &self,
        rule: &RedirectRule,
        exclude_id: &str,
        force: bool,
    ) -> Result<(), AppError> {
        let existing = self.repository.list().await;

        if let Some(owner) = existing
            .iter()
            .find(|r| r.id == rule.id && r.id != exclude_id && r.key() != rule.key())
        {
            return Err(AppError::conflict(
                "Rule id already in use",
                json!({ "id": rule.id, "rule": owner }),
            ));
        }

        match check_conflict(rule, exclude_id, &existing) {
            None => Ok(()),
            Some(conflict) if force => {
                warn!(
                    id = %rule.id,
                    reason = conflict.reason(),
                    conflicting = conflict.rules.len(),
                    "Committing rule despite conflict"
                );
                Ok(())
            }
            Some(conflict) => Err(AppError::rule_conflict(&conflict)),
        }
    }

    /// Must be called with `commit_lock` held.
    async fn persist(&self) {
        if let Err(e) = self.repository.save_to_file(&self.rules_file).await {
            error!(error = %e, path = %self.rules_file.display(), "Failed to save rules");
        }
    }
}

/// Normalizes the domain the way request hosts are normalized.
fn normalize(mut new_rule: NewRule) -> NewRule {
    new_rule.domain = new_rule.domain.trim().to_ascii_lowercase();
    new_rule.target = new_rule.target.trim().to_string();
    new_rule
}

/// Rejects drafts without a domain or a target.
fn validate_new_rule(new_rule: &NewRule) -> Result<(), AppError> {
    let mut missing = Vec::new();
    if new_rule.domain.trim().is_empty() {
        missing.push("domain");
    }
    if new_rule.target.trim().is_empty() {
        missing.push("target");
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::bad_request(
            "Domain and target are required",
            json!({ "missing": missing }),
        ))
    }
}

fn has_explicit_id(new_rule: &NewRule) -> bool {
    new_rule.id.as_deref().is_some_and(|id| !id.trim().is_empty())
}

/// Builds the rule a draft would become, generating the id when absent.
fn into_candidate(new_rule: NewRule) -> RedirectRule {
    let id = match new_rule.id.as_deref() {
        Some(id) if !id.trim().is_empty() => id.trim().to_string(),
        _ => generate_rule_id(&new_rule.domain, &new_rule.path),
    };
    let created_at = new_rule.created_at.unwrap_or_else(Utc::now);
    new_rule.into_rule(id, created_at)
}
