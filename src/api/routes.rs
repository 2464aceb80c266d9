//! API route configuration.
//!
//! All API endpoints go through [`crate::api::middleware::auth`], which only
//! enforces a token when one is configured.

use crate::api::handlers::{
    check_rule_handler, create_rule_handler, delete_rule_handler, get_rule_handler,
    list_rules_handler, reload_handler, save_handler, update_rule_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Rule management routes.
///
/// # Endpoints
///
/// - `GET    /rules`          - List active rules
/// - `POST   /rules`          - Create a rule (`?force=true` to override conflicts)
/// - `POST   /rules/check`    - Report conflicts without storing
/// - `GET    /rules/{id}`     - Fetch one rule
/// - `PUT    /rules/{id}`     - Replace a rule (`?force=true` to override conflicts)
/// - `DELETE /rules/{id}`     - Delete a rule
/// - `POST   /reload`         - Reload rules from the rules file
/// - `POST   /save`           - Write rules to the rules file
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/rules", get(list_rules_handler).post(create_rule_handler))
        .route("/rules/check", post(check_rule_handler))
        .route(
            "/rules/{id}",
            get(get_rule_handler)
                .put(update_rule_handler)
                .delete(delete_rule_handler),
        )
        .route("/reload", post(reload_handler))
        .route("/save", post(save_handler))
}
