//! Per-request rule resolution.

use std::sync::Arc;

use crate::domain::entities::{RedirectAction, RedirectRule};
use crate::domain::repositories::RuleRepository;

/// Read-only matcher used by the redirect handler.
pub struct RedirectService<R: RuleRepository> {
    repository: Arc<R>,
}

impl<R: RuleRepository> RedirectService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Finds the rule serving `domain` + `path`.
    ///
    /// A path-level rule takes precedence over the domain-level rule of the
    /// same domain; the domain-level rule covers every other path. Expired
    /// rules are skipped.
    ///
    /// Note that the conflict checker warns when a domain-level rule is added
    /// next to path rules, as if it would override them. It does not: the
    /// warning is advisory and resolution here always prefers the path rule.
    pub async fn find_rule(&self, domain: &str, path: &str) -> Option<RedirectRule> {
        if !path.is_empty()
            && let Some(rule) = self.repository.get(domain, path).await
        {
            return Some(rule);
        }
        self.repository.get(domain, "").await
    }

    /// Resolves a request to its rule and the response to send.
    pub async fn resolve(&self, domain: &str, path: &str) -> Option<(RedirectRule, RedirectAction)> {
        let rule = self.find_rule(domain, path).await?;
        let action = RedirectAction::for_rule(&rule);
        Some((rule, action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::RedirectKind;
    use crate::domain::repositories::MockRuleRepository;
    use crate::infrastructure::persistence::InMemoryRuleStore;
    use chrono::{Duration, Utc};

    fn rule(id: &str, domain: &str, path: &str, target: &str, kind: RedirectKind) -> RedirectRule {
        RedirectRule {
            id: id.to_string(),
            domain: domain.to_string(),
            path: path.to_string(),
            target: target.to_string(),
            kind,
            expires_at: None,
            created_at: Utc::now(),
            description: String::new(),
        }
    }

    fn service(rules: Vec<RedirectRule>) -> RedirectService<InMemoryRuleStore> {
        RedirectService::new(Arc::new(InMemoryRuleStore::with_rules(rules)))
    }

    #[tokio::test]
    async fn test_path_rule_beats_domain_rule() {
        let domain_rule = rule("d", "a.com", "", "https://b.com", RedirectKind::Permanent);
        let path_rule = rule("p", "a.com", "/p", "https://c.com", RedirectKind::Temporary);
        let service = service(vec![domain_rule.clone(), path_rule.clone()]);

        assert_eq!(service.find_rule("a.com", "/p").await, Some(path_rule));
        assert_eq!(service.find_rule("a.com", "/q").await, Some(domain_rule.clone()));
        assert_eq!(service.find_rule("a.com", "").await, Some(domain_rule));
        assert_eq!(service.find_rule("other.com", "/p").await, None);
    }

    #[tokio::test]
    async fn test_expired_path_rule_falls_back_to_domain() {
        let domain_rule = rule("d", "a.com", "", "https://b.com", RedirectKind::Permanent);
        let mut path_rule = rule("p", "a.com", "/p", "https://c.com", RedirectKind::Temporary);
        path_rule.expires_at = Some(Utc::now() - Duration::seconds(1));
        let service = service(vec![domain_rule.clone(), path_rule]);

        assert_eq!(service.find_rule("a.com", "/p").await, Some(domain_rule));
    }

    #[tokio::test]
    async fn test_everything_expired_is_not_found() {
        let mut domain_rule = rule("d", "a.com", "", "https://b.com", RedirectKind::Permanent);
        domain_rule.expires_at = Some(Utc::now() - Duration::seconds(1));
        let service = service(vec![domain_rule]);

        assert!(service.resolve("a.com", "/x").await.is_none());
    }

    #[tokio::test]
    async fn test_resolve_script_redirect() {
        let service = service(vec![rule(
            "p",
            "a.com",
            "/x",
            "https://c.com",
            RedirectKind::ScriptRedirect,
        )]);

        let (_, action) = service.resolve("a.com", "/x").await.unwrap();
        assert_eq!(
            action,
            RedirectAction::Script {
                target: "https://c.com".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_domain_only_request_skips_path_lookup() {
        let mut mock_repo = MockRuleRepository::new();
        mock_repo
            .expect_get()
            .withf(|domain, path| domain == "a.com" && path.is_empty())
            .times(1)
            .returning(|_, _| None);

        let service = RedirectService::new(Arc::new(mock_repo));

        assert!(service.find_rule("a.com", "").await.is_none());
    }
}
