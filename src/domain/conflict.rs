//! Conflict classification of a candidate rule against the stored rules.
//!
//! Conflicts are advisory. The store happily holds a domain-level rule next to
//! path-level rules of the same domain; at request time the path-level rule
//! wins (see [`crate::application::services::RedirectService::find_rule`]).
//! The checker only warns the administrator that the new rule shadows, or is
//! shadowed by, something already configured.

use serde::Serialize;

use crate::domain::entities::RedirectRule;

/// The relationship found between a candidate and the existing rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// A rule with the same domain and path already exists.
    Duplicate,
    /// The candidate is domain-level and path rules exist for the domain.
    ShadowsPathRules,
    /// The candidate is a path rule and a domain-level rule exists.
    ShadowedByDomainRule,
}

impl ConflictKind {
    pub fn reason(self) -> &'static str {
        match self {
            Self::Duplicate => "identical rule exists",
            Self::ShadowsPathRules => {
                "a domain-level rule would take precedence over and shadow these path rules"
            }
            Self::ShadowedByDomainRule => {
                "an existing domain-level rule already takes precedence over this path"
            }
        }
    }
}

/// A reported conflict with every rule involved.
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub rules: Vec<RedirectRule>,
}

impl Conflict {
    pub fn reason(&self) -> &'static str {
        self.kind.reason()
    }
}

/// Classifies `candidate` against `existing`, ignoring any rule whose id equals
/// `exclude_id` (the rule being updated).
///
/// Branches are checked in order and the first match wins:
///
/// 1. an existing rule with the same `(domain, path)`
/// 2. `candidate` is domain-level: all path rules of the domain
/// 3. `candidate` is a path rule: the domain-level rule of the domain
///
/// `existing` is expected to hold non-expired rules only.
pub fn check_conflict(
    candidate: &RedirectRule,
    exclude_id: &str,
    existing: &[RedirectRule],
) -> Option<Conflict> {
    let others = || {
        existing
            .iter()
            .filter(move |r| r.id != exclude_id && r.domain == candidate.domain)
    };

    if let Some(same) = others().find(|r| r.path == candidate.path) {
        return Some(Conflict {
            kind: ConflictKind::Duplicate,
            rules: vec![same.clone()],
        });
    }

    if candidate.is_domain_level() {
        let shadowed: Vec<RedirectRule> = others()
            .filter(|r| !r.is_domain_level())
            .cloned()
            .collect();
        if !shadowed.is_empty() {
            return Some(Conflict {
                kind: ConflictKind::ShadowsPathRules,
                rules: shadowed,
            });
        }
        return None;
    }

    others()
        .find(|r| r.is_domain_level())
        .map(|domain_rule| Conflict {
            kind: ConflictKind::ShadowedByDomainRule,
            rules: vec![domain_rule.clone()],
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::RedirectKind;
    use chrono::Utc;

    fn rule(id: &str, domain: &str, path: &str) -> RedirectRule {
        RedirectRule {
            id: id.to_string(),
            domain: domain.to_string(),
            path: path.to_string(),
            target: "https://target.example".to_string(),
            kind: RedirectKind::Permanent,
            expires_at: None,
            created_at: Utc::now(),
            description: String::new(),
        }
    }

    #[test]
    fn test_no_conflict_on_empty_store() {
        assert!(check_conflict(&rule("n", "a.com", ""), "", &[]).is_none());
    }

    #[test]
    fn test_duplicate_with_different_id() {
        let existing = vec![rule("old", "a.com", "/x"), rule("other", "a.com", "/y")];

        let conflict = check_conflict(&rule("new", "a.com", "/x"), "", &existing).unwrap();

        assert_eq!(conflict.kind, ConflictKind::Duplicate);
        assert_eq!(conflict.reason(), "identical rule exists");
        assert_eq!(conflict.rules.len(), 1);
        assert_eq!(conflict.rules[0].id, "old");
    }

    #[test]
    fn test_duplicate_ignores_excluded_id() {
        let existing = vec![rule("same", "a.com", "/x")];
        assert!(check_conflict(&rule("same", "a.com", "/x"), "same", &existing).is_none());
    }

    #[test]
    fn test_domain_rule_reports_every_path_rule() {
        let existing = vec![
            rule("p1", "a.com", "/x"),
            rule("p2", "a.com", "/y"),
            rule("p3", "a.com", "/z"),
            rule("other", "b.com", "/x"),
        ];

        let conflict = check_conflict(&rule("d", "a.com", ""), "", &existing).unwrap();

        assert_eq!(conflict.kind, ConflictKind::ShadowsPathRules);
        let mut ids: Vec<_> = conflict.rules.iter().map(|r| r.id.as_str()).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec!["p1", "p2", "p3"]);
    }

    #[test]
    fn test_duplicate_domain_rule_wins_over_shadowing() {
        let existing = vec![rule("d", "a.com", ""), rule("p1", "a.com", "/x")];

        let conflict = check_conflict(&rule("d2", "a.com", ""), "", &existing).unwrap();

        assert_eq!(conflict.kind, ConflictKind::Duplicate);
        assert_eq!(conflict.rules.len(), 1);
        assert_eq!(conflict.rules[0].id, "d");
    }

    #[test]
    fn test_shadowing_skips_excluded_path_rule() {
        let existing = vec![rule("p1", "a.com", "/x"), rule("p2", "a.com", "/y")];

        let conflict = check_conflict(&rule("p1", "a.com", ""), "p1", &existing).unwrap();

        assert_eq!(conflict.rules.len(), 1);
        assert_eq!(conflict.rules[0].id, "p2");
    }

    #[test]
    fn test_path_rule_shadowed_by_domain_rule() {
        let existing = vec![rule("d", "a.com", "")];

        let conflict = check_conflict(&rule("p", "a.com", "/x"), "", &existing).unwrap();

        assert_eq!(conflict.kind, ConflictKind::ShadowedByDomainRule);
        assert_eq!(
            conflict.reason(),
            "an existing domain-level rule already takes precedence over this path"
        );
        assert_eq!(conflict.rules[0].id, "d");
    }

    #[test]
    fn test_other_domains_do_not_conflict() {
        let existing = vec![rule("d", "b.com", ""), rule("p", "b.com", "/x")];

        assert!(check_conflict(&rule("n", "a.com", ""), "", &existing).is_none());
        assert!(check_conflict(&rule("n", "a.com", "/x"), "", &existing).is_none());
    }
}
