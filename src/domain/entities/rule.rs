//! Redirect rule entity and its storage key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a matched request is sent on to its target.
///
/// Serialized as the integer codes used in the rules file and the API:
/// `301`, `302`, `307` and `4` (script redirect). Any other code is kept
/// as [`RedirectKind::Other`] and behaves like a temporary redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum RedirectKind {
    /// `301 Moved Permanently`
    Permanent,
    /// `302 Found`
    #[default]
    Temporary,
    /// `307 Temporary Redirect`, the client keeps the request method.
    TemporaryPreserveMethod,
    /// `200 OK` with an HTML page that navigates via meta-refresh and script.
    ScriptRedirect,
    /// Unrecognized code, kept verbatim so it round-trips through the rules file.
    Other(i32),
}

impl RedirectKind {
    pub const PERMANENT_CODE: i32 = 301;
    pub const TEMPORARY_CODE: i32 = 302;
    pub const PRESERVE_METHOD_CODE: i32 = 307;
    pub const SCRIPT_CODE: i32 = 4;

    /// HTTP status the redirect handler answers with for this kind.
    pub fn status_code(self) -> u16 {
        match self {
            Self::Permanent => 301,
            Self::TemporaryPreserveMethod => 307,
            Self::ScriptRedirect => 200,
            Self::Temporary | Self::Other(_) => 302,
        }
    }

    /// Short label used for metrics.
    pub fn label(self) -> &'static str {
        match self {
            Self::Permanent => "permanent",
            Self::Temporary => "temporary",
            Self::TemporaryPreserveMethod => "temporary_preserve_method",
            Self::ScriptRedirect => "script",
            Self::Other(_) => "other",
        }
    }
}

impl From<i32> for RedirectKind {
    fn from(code: i32) -> Self {
        match code {
            Self::PERMANENT_CODE => Self::Permanent,
            Self::TEMPORARY_CODE => Self::Temporary,
            Self::PRESERVE_METHOD_CODE => Self::TemporaryPreserveMethod,
            Self::SCRIPT_CODE => Self::ScriptRedirect,
            other => Self::Other(other),
        }
    }
}

impl From<RedirectKind> for i32 {
    fn from(kind: RedirectKind) -> Self {
        match kind {
            RedirectKind::Permanent => RedirectKind::PERMANENT_CODE,
            RedirectKind::Temporary => RedirectKind::TEMPORARY_CODE,
            RedirectKind::TemporaryPreserveMethod => RedirectKind::PRESERVE_METHOD_CODE,
            RedirectKind::ScriptRedirect => RedirectKind::SCRIPT_CODE,
            RedirectKind::Other(code) => code,
        }
    }
}

/// Storage key of a rule. An empty `path` denotes a domain-level rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuleKey {
    pub domain: String,
    pub path: String,
}

impl RuleKey {
    pub fn new(domain: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            path: path.into(),
        }
    }

    /// Key of the domain-level rule for `domain`.
    pub fn domain_level(domain: impl Into<String>) -> Self {
        Self::new(domain, "")
    }
}

/// A redirect rule as stored in the rule store and the rules file.
///
/// `(domain, path)` is the unique storage key; `id` is a stable handle used by
/// the management API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedirectRule {
    #[serde(default)]
    pub id: String,
    pub domain: String,
    #[serde(default)]
    pub path: String,
    pub target: String,
    #[serde(rename = "type", default)]
    pub kind: RedirectKind,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
}

impl RedirectRule {
    /// Returns the storage key of this rule.
    pub fn key(&self) -> RuleKey {
        RuleKey::new(self.domain.clone(), self.path.clone())
    }

    /// Returns true if the rule applies to every path of its domain.
    pub fn is_domain_level(&self) -> bool {
        self.path.is_empty()
    }

    /// Returns true if the rule had expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|e| now > e)
    }

    /// Returns true if the rule has passed its expiry time.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Input data for creating or replacing a rule.
///
/// `id` and `created_at` are filled in by the rule service when absent.
#[derive(Debug, Clone, Default)]
pub struct NewRule {
    pub id: Option<String>,
    pub domain: String,
    pub path: String,
    pub target: String,
    pub kind: RedirectKind,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub description: String,
}

impl NewRule {
    /// Builds the rule to store from this draft.
    pub fn into_rule(self, id: String, created_at: DateTime<Utc>) -> RedirectRule {
        RedirectRule {
            id,
            domain: self.domain,
            path: self.path,
            target: self.target,
            kind: self.kind,
            expires_at: self.expires_at,
            created_at,
            description: self.description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn rule(path: &str) -> RedirectRule {
        RedirectRule {
            id: "a_com".to_string(),
            domain: "a.com".to_string(),
            path: path.to_string(),
            target: "https://b.com".to_string(),
            kind: RedirectKind::Permanent,
            expires_at: None,
            created_at: Utc::now(),
            description: String::new(),
        }
    }

    #[test]
    fn test_kind_codes() {
        assert_eq!(RedirectKind::from(301), RedirectKind::Permanent);
        assert_eq!(RedirectKind::from(302), RedirectKind::Temporary);
        assert_eq!(RedirectKind::from(307), RedirectKind::TemporaryPreserveMethod);
        assert_eq!(RedirectKind::from(4), RedirectKind::ScriptRedirect);
        assert_eq!(RedirectKind::from(999), RedirectKind::Other(999));
        assert_eq!(i32::from(RedirectKind::Other(999)), 999);
    }

    #[test]
    fn test_unknown_kind_behaves_as_temporary() {
        assert_eq!(RedirectKind::Other(0).status_code(), 302);
        assert_eq!(RedirectKind::ScriptRedirect.status_code(), 200);
        assert_eq!(RedirectKind::TemporaryPreserveMethod.status_code(), 307);
    }

    #[test]
    fn test_rule_json_schema() {
        let json = r#"{
            "id": "a_com",
            "domain": "a.com",
            "path": "",
            "target": "https://b.com",
            "type": 4,
            "expires_at": null,
            "created_at": "2025-01-01T00:00:00Z",
            "description": "landing"
        }"#;

        let parsed: RedirectRule = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.kind, RedirectKind::ScriptRedirect);
        assert!(parsed.is_domain_level());

        let value = serde_json::to_value(&parsed).unwrap();
        assert_eq!(value["type"], 4);
        assert!(value["expires_at"].is_null());
    }

    #[test]
    fn test_missing_type_defaults_to_temporary() {
        let parsed: RedirectRule =
            serde_json::from_str(r#"{"domain": "a.com", "target": "https://b.com"}"#).unwrap();
        assert_eq!(parsed.kind, RedirectKind::Temporary);
        assert_eq!(parsed.path, "");
    }

    #[test]
    fn test_rule_expiry() {
        let mut r = rule("/x");
        assert!(!r.is_expired());

        r.expires_at = Some(Utc::now() - Duration::seconds(1));
        assert!(r.is_expired());

        r.expires_at = Some(Utc::now() + Duration::hours(1));
        assert!(!r.is_expired());
    }

    #[test]
    fn test_rule_key() {
        assert_eq!(rule("/x").key(), RuleKey::new("a.com", "/x"));
        assert_eq!(rule("").key(), RuleKey::domain_level("a.com"));
    }
}
