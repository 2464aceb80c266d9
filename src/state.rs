use std::path::PathBuf;
use std::sync::Arc;

use crate::application::services::{RedirectService, RuleService};
use crate::infrastructure::access_log::AccessLogger;
use crate::infrastructure::persistence::InMemoryRuleStore;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub rule_service: Arc<RuleService<InMemoryRuleStore>>,
    pub redirect_service: Arc<RedirectService<InMemoryRuleStore>>,
    pub access_logger: AccessLogger,
    pub admin_token: Option<Arc<str>>,
}

impl AppState {
    /// Wires both services to the same rule store.
    pub fn new(
        store: Arc<InMemoryRuleStore>,
        rules_file: impl Into<PathBuf>,
        access_logger: AccessLogger,
        admin_token: Option<String>,
    ) -> Self {
        Self {
            rule_service: Arc::new(RuleService::new(store.clone(), rules_file)),
            redirect_service: Arc::new(RedirectService::new(store)),
            access_logger,
            admin_token: admin_token.map(Arc::from),
        }
    }
}
