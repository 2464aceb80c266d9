//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: The access logger has stopped
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "rules": { "status": "ok", "message": "12 active rules" },
///     "access_log": { "status": "ok", "message": "Free queue slots: 10000" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let rules_check = check_rules(&state).await;
    let log_check = check_access_log(&state);

    let all_healthy = rules_check.is_ok() && log_check.is_ok();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            rules: rules_check,
            access_log: log_check,
        },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

async fn check_rules(state: &AppState) -> CheckStatus {
    let count = state.rule_service.list_rules().await.len();
    CheckStatus::ok(format!("{count} active rules"))
}

/// Checks that the access log worker is still accepting entries.
fn check_access_log(state: &AppState) -> CheckStatus {
    if state.access_logger.is_closed() {
        CheckStatus::error("Access logger is closed")
    } else {
        CheckStatus::ok(format!(
            "Free queue slots: {}",
            state.access_logger.free_queue_slots()
        ))
    }
}
