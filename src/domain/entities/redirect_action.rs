//! Response decision for a matched rule.

use super::rule::{RedirectKind, RedirectRule};

/// What the redirect handler must send back for a resolved rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectAction {
    /// Redirect status with a `Location` header.
    Redirect { status: u16, location: String },
    /// `200 OK` HTML page navigating to `target` by meta-refresh and script.
    Script { target: String },
}

impl RedirectAction {
    /// Chooses the response for `rule`. Unknown kinds fall back to `302`.
    pub fn for_rule(rule: &RedirectRule) -> Self {
        match rule.kind {
            RedirectKind::ScriptRedirect => Self::Script {
                target: rule.target.clone(),
            },
            kind => Self::Redirect {
                status: kind.status_code(),
                location: rule.target.clone(),
            },
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            Self::Redirect { status, .. } => *status,
            Self::Script { .. } => 200,
        }
    }
}
