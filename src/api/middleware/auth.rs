//! Bearer token authentication middleware for the management API.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;
use tracing::warn;

use crate::{error::AppError, state::AppState};

/// Checks the `Authorization: Bearer <token>` header against the configured
/// admin token.
///
/// When no admin token is configured the request passes through unchanged.
///
/// # Errors
///
/// Returns `401 Unauthorized` if:
/// - Authorization header is missing or not a bearer token
/// - The token does not match
///
/// Adds `WWW-Authenticate: Bearer` header to 401 responses per RFC 6750.
///
/// # Example
///
/// ```rust,ignore
/// use axum::{Router, routing::get, middleware};
/// use crate::api::middleware::auth;
///
/// let protected = Router::new()
///     .route("/rules", get(list_rules_handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));
/// ```
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(expected) = st.admin_token.as_deref() else {
        return Ok(next.run(req).await);
    };

    let (mut parts, body) = req.into_parts();

    let AuthBearer(token) = AuthBearer::from_request_parts(&mut parts, &())
        .await
        .map_err(|_| {
            AppError::unauthorized(
                "Unauthorized",
                serde_json::json!({"reason": "Authorization header is missing or invalid"}),
            )
        })?;

    if !tokens_match(token.as_bytes(), expected.as_bytes()) {
        warn!(uri = %parts.uri, "Rejected API request with invalid token");
        return Err(AppError::unauthorized(
            "Unauthorized",
            serde_json::json!({"reason": "Invalid token"}),
        ));
    }

    let req = Request::from_parts(parts, body);

    Ok(next.run(req).await)
}

/// Compares two tokens in time independent of where they first differ.
fn tokens_match(given: &[u8], expected: &[u8]) -> bool {
    if given.len() != expected.len() {
        return false;
    }

    given
        .iter()
        .zip(expected)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
