//! Handlers for reloading and saving the rules file.

use axum::{Json, extract::State};

use crate::api::dto::rule::PersistResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Replaces the active rules with the content of the rules file.
///
/// # Endpoint
///
/// `POST /api/reload`
///
/// A missing file yields an empty rule set.
///
/// # Errors
///
/// Returns 500 Internal Server Error if the file cannot be read or parsed.
/// The previous rules stay active in that case.
pub async fn reload_handler(
    State(state): State<AppState>,
) -> Result<Json<PersistResponse>, AppError> {
    let count = state.rule_service.reload().await?;

    Ok(Json(PersistResponse {
        message: "Rules reloaded".to_string(),
        count,
        path: state.rule_service.rules_file().display().to_string(),
    }))
}

/// Writes the active rules to the rules file.
///
/// # Endpoint
///
/// `POST /api/save`
///
/// # Errors
///
/// Returns 500 Internal Server Error if the file cannot be written.
pub async fn save_handler(
    State(state): State<AppState>,
) -> Result<Json<PersistResponse>, AppError> {
    let count = state.rule_service.save().await?;

    Ok(Json(PersistResponse {
        message: "Rules saved".to_string(),
        count,
        path: state.rule_service.rules_file().display().to_string(),
    }))
}
