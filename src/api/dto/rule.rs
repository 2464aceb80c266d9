//! DTOs for rule management endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::conflict::{Conflict, ConflictKind};
use crate::domain::entities::{NewRule, RedirectKind, RedirectRule};

/// Rule as submitted to `POST /api/rules`, `PUT /api/rules/{id}` and
/// `POST /api/rules/check`.
///
/// Uses the same field names as the rules file. Domain and target emptiness is
/// checked by the rule service so the API and the admin CLI agree on it.
#[derive(Debug, Deserialize, Validate)]
pub struct RuleRequest {
    /// Ignored on update, where the id comes from the path.
    #[serde(default)]
    #[validate(length(max = 300))]
    pub id: Option<String>,

    #[serde(default)]
    #[validate(length(max = 253))]
    pub domain: String,

    /// Empty for a domain-level rule.
    #[serde(default)]
    #[validate(length(max = 2048))]
    pub path: String,

    #[serde(default)]
    #[validate(length(max = 4096))]
    pub target: String,

    /// 301, 302, 307 or 4 (script redirect). Anything else behaves like 302.
    #[serde(rename = "type", default)]
    pub kind: RedirectKind,

    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    #[validate(length(max = 1024))]
    pub description: String,
}

impl From<RuleRequest> for NewRule {
    fn from(req: RuleRequest) -> Self {
        NewRule {
            id: req.id.filter(|id| !id.trim().is_empty()),
            domain: req.domain,
            path: req.path,
            target: req.target,
            kind: req.kind,
            expires_at: req.expires_at,
            created_at: req.created_at,
            description: req.description,
        }
    }
}

/// `?force=true` commits a rule even when a conflict is reported.
#[derive(Debug, Default, Deserialize)]
pub struct ForceQuery {
    #[serde(default)]
    pub force: bool,
}

/// Response for `GET /api/rules`.
#[derive(Debug, Serialize)]
pub struct RuleListResponse {
    pub total: usize,
    pub items: Vec<RedirectRule>,
}

impl From<Vec<RedirectRule>> for RuleListResponse {
    fn from(mut items: Vec<RedirectRule>) -> Self {
        items.sort_by(|a, b| a.domain.cmp(&b.domain).then_with(|| a.path.cmp(&b.path)));
        Self {
            total: items.len(),
            items,
        }
    }
}

/// Response for `POST /api/rules/check`.
#[derive(Debug, Serialize)]
pub struct ConflictCheckResponse {
    pub conflict: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ConflictKind>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,

    pub conflicts: Vec<RedirectRule>,
}

impl From<Option<Conflict>> for ConflictCheckResponse {
    fn from(conflict: Option<Conflict>) -> Self {
        match conflict {
            Some(conflict) => Self {
                conflict: true,
                kind: Some(conflict.kind),
                reason: Some(conflict.reason()),
                conflicts: conflict.rules,
            },
            None => Self {
                conflict: false,
                kind: None,
                reason: None,
                conflicts: Vec::new(),
            },
        }
    }
}

/// Response for `POST /api/reload` and `POST /api/save`.
#[derive(Debug, Serialize)]
pub struct PersistResponse {
    pub message: String,
    pub count: usize,
    pub path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_request_defaults() {
        let req: RuleRequest =
            serde_json::from_str(r#"{"domain":"a.com","target":"https://b.com"}"#).unwrap();

        assert_eq!(req.path, "");
        assert_eq!(req.kind, RedirectKind::Temporary);
        assert!(req.id.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_rule_request_type_field() {
        let req: RuleRequest = serde_json::from_str(
            r#"{"domain":"a.com","path":"/x","target":"https://c.com","type":4}"#,
        )
        .unwrap();

        assert_eq!(req.kind, RedirectKind::ScriptRedirect);
    }

    #[test]
    fn test_blank_id_becomes_none() {
        let req: RuleRequest =
            serde_json::from_str(r#"{"id":"  ","domain":"a.com","target":"https://b.com"}"#)
                .unwrap();

        let new_rule = NewRule::from(req);
        assert!(new_rule.id.is_none());
    }

    #[test]
    fn test_overlong_domain_rejected() {
        let req = RuleRequest {
            id: None,
            domain: "a".repeat(254),
            path: String::new(),
            target: "https://b.com".to_string(),
            kind: RedirectKind::default(),
            expires_at: None,
            created_at: None,
            description: String::new(),
        };

        assert!(req.validate().is_err());
    }

    #[test]
    fn test_list_response_sorted() {
        let rule = |domain: &str, path: &str| RedirectRule {
            id: String::new(),
            domain: domain.to_string(),
            path: path.to_string(),
            target: "https://t.com".to_string(),
            kind: RedirectKind::default(),
            expires_at: None,
            created_at: Utc::now(),
            description: String::new(),
        };

        let resp = RuleListResponse::from(vec![
            rule("b.com", ""),
            rule("a.com", "/x"),
            rule("a.com", ""),
        ]);

        assert_eq!(resp.total, 3);
        let keys: Vec<_> = resp
            .items
            .iter()
            .map(|r| (r.domain.as_str(), r.path.as_str()))
            .collect();
        assert_eq!(keys, vec![("a.com", ""), ("a.com", "/x"), ("b.com", "")]);
    }
}
