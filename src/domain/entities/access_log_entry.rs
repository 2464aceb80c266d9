//! Access log record written once per served redirect.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::rule::{RedirectKind, RedirectRule};

/// One line of the access log.
///
/// Created by the redirect handler and handed to the
/// [`AccessLogger`](crate::infrastructure::access_log::AccessLogger), which owns
/// it until it is flushed to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessLogEntry {
    pub timestamp: DateTime<Utc>,
    pub ip: String,
    pub user_agent: String,
    pub method: String,
    pub domain: String,
    pub path: String,
    pub target: String,
    pub redirect_type: RedirectKind,
    pub status_code: u16,
}

impl AccessLogEntry {
    /// Creates an entry for a request answered by `rule`.
    pub fn new(
        rule: &RedirectRule,
        domain: String,
        path: String,
        method: String,
        ip: String,
        user_agent: Option<&str>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            ip,
            user_agent: user_agent.unwrap_or_default().to_string(),
            method,
            domain,
            path,
            target: rule.target.clone(),
            redirect_type: rule.kind,
            status_code: rule.kind.status_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_from_rule() {
        let rule = RedirectRule {
            id: "a_com".to_string(),
            domain: "a.com".to_string(),
            path: String::new(),
            target: "https://b.com".to_string(),
            kind: RedirectKind::ScriptRedirect,
            expires_at: None,
            created_at: Utc::now(),
            description: String::new(),
        };

        let entry = AccessLogEntry::new(
            &rule,
            "a.com".to_string(),
            "/x".to_string(),
            "GET".to_string(),
            "10.0.0.1".to_string(),
            None,
        );

        assert_eq!(entry.target, "https://b.com");
        assert_eq!(entry.status_code, 200);
        assert_eq!(entry.user_agent, "");

        let line = serde_json::to_string(&entry).unwrap();
        assert!(line.contains(r#""redirect_type":4"#));
        assert!(!line.contains('\n'));
    }
}
