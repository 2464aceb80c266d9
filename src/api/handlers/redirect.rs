//! Handler for redirect requests.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::debug;

use crate::domain::entities::{AccessLogEntry, RedirectAction};
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;
use crate::utils::extract_domain::extract_domain_from_headers;
use crate::web::ScriptRedirectPage;

/// Answers any request that is not an API route.
///
/// # Request Flow
///
/// 1. Extract domain from the `Host` header (port stripped)
/// 2. Look up the rule for `(domain, path)`, then the domain-level rule
/// 3. Hand an access log entry to the background logger
/// 4. Respond according to the rule type
///
/// # Responses
///
/// - `301` / `302` / `307` with `Location` set to the target
/// - `200` with an HTML page that redirects in the browser (type 4)
/// - Unknown types behave like `302`
///
/// Query strings are not part of the match and are not forwarded.
///
/// # Errors
///
/// Returns 404 Not Found if no active rule matches.
/// Returns 400 Bad Request if the Host header is missing or invalid.
pub async fn redirect_handler(
    State(state): State<AppState>,
    request: Request,
) -> Result<Response, AppError> {
    let (parts, _body) = request.into_parts();
    let headers = &parts.headers;
    let domain = extract_domain_from_headers(headers)?;
    let path = parts.uri.path().to_string();

    let Some((rule, action)) = state.redirect_service.resolve(&domain, &path).await else {
        debug!(%domain, %path, "No redirect rule matched");
        return Err(AppError::not_found(
            "No redirect rule matches this request",
            json!({ "domain": domain, "path": path }),
        ));
    };

    let peer = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    let entry = AccessLogEntry::new(
        &rule,
        domain,
        path,
        parts.method.to_string(),
        client_ip(headers, peer),
        headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok()),
    );

    metrics::counter!("jumpgate_redirects_total", "kind" => rule.kind.label()).increment(1);
    state.access_logger.log(entry);

    let response = match action {
        RedirectAction::Redirect { status, location } => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::FOUND);
            (status, [(header::LOCATION, location)]).into_response()
        }
        RedirectAction::Script { target } => ScriptRedirectPage::new(&target).into_response(),
    };

    Ok(response)
}
