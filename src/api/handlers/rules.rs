//! Handlers for rule management endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::rule::{ConflictCheckResponse, ForceQuery, RuleListResponse, RuleRequest};
use crate::domain::entities::RedirectRule;
use crate::error::AppError;
use crate::state::AppState;

/// Lists all active rules, ordered by domain then path.
///
/// # Endpoint
///
/// `GET /api/rules`
pub async fn list_rules_handler(State(state): State<AppState>) -> Json<RuleListResponse> {
    Json(state.rule_service.list_rules().await.into())
}

/// Creates a rule.
///
/// # Endpoint
///
/// `POST /api/rules[?force=true]`
///
/// # Request Body
///
/// ```json
/// {
///   "domain": "go.example.com",
///   "path": "/docs",
///   "target": "https://docs.example.com",
///   "type": 301,
///   "expires_at": null,
///   "description": "Docs shortcut"
/// }
/// ```
///
/// The id defaults to the domain and path with `.` replaced by `_`
/// (`go_example_com__docs`).
///
/// # Errors
///
/// Returns 400 Bad Request if domain or target is missing.
/// Returns 409 Conflict with the conflicting rules unless `force=true`.
pub async fn create_rule_handler(
    State(state): State<AppState>,
    Query(query): Query<ForceQuery>,
    Json(payload): Json<RuleRequest>,
) -> Result<(StatusCode, Json<RedirectRule>), AppError> {
    payload.validate()?;

    let rule = state
        .rule_service
        .create_rule(payload.into(), query.force)
        .await?;

    Ok((StatusCode::CREATED, Json(rule)))
}

/// Returns one active rule.
///
/// # Endpoint
///
/// `GET /api/rules/{id}`
///
/// # Errors
///
/// Returns 404 Not Found if no active rule has this id.
pub async fn get_rule_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<RedirectRule>, AppError> {
    Ok(Json(state.rule_service.get_rule(&id).await?))
}

/// Replaces a rule.
///
/// # Endpoint
///
/// `PUT /api/rules/{id}[?force=true]`
///
/// The body has the same shape as for creation. `created_at` is kept when
/// omitted. Moving a rule to another domain or path removes the old entry.
///
/// # Errors
///
/// Returns 404 Not Found if no active rule has this id.
/// Returns 400 Bad Request if domain or target is missing.
/// Returns 409 Conflict with the conflicting rules unless `force=true`.
pub async fn update_rule_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Query(query): Query<ForceQuery>,
    Json(payload): Json<RuleRequest>,
) -> Result<Json<RedirectRule>, AppError> {
    payload.validate()?;

    let rule = state
        .rule_service
        .update_rule(&id, payload.into(), query.force)
        .await?;

    Ok(Json(rule))
}

/// Deletes a rule.
///
/// # Endpoint
///
/// `DELETE /api/rules/{id}`
///
/// # Errors
///
/// Returns 404 Not Found if no active rule has this id.
pub async fn delete_rule_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.rule_service.delete_rule(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Reports whether a rule would conflict, without storing it.
///
/// # Endpoint
///
/// `POST /api/rules/check`
///
/// When the body carries an `id`, the rule with that id is left out of the
/// comparison so an edit is not reported against itself.
///
/// # Response
///
/// ```json
/// {
///   "conflict": true,
///   "kind": "shadows_path_rules",
///   "reason": "a domain-level rule would take precedence over and shadow these path rules",
///   "conflicts": [ { "id": "a_com__x", "domain": "a.com", "path": "/x", ... } ]
/// }
/// ```
pub async fn check_rule_handler(
    State(state): State<AppState>,
    Json(payload): Json<RuleRequest>,
) -> Result<Json<ConflictCheckResponse>, AppError> {
    payload.validate()?;

    let exclude_id = payload.id.clone().unwrap_or_default();
    let conflict = state
        .rule_service
        .check_conflict(payload.into(), &exclude_id)
        .await?;

    Ok(Json(conflict.into()))
}
