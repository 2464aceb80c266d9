//! Domain extraction from HTTP request headers.

use crate::AppError;
use axum::http::{HeaderMap, header};

/// Extracts the rule domain from the `Host` header.
///
/// Handles:
/// - IPv4 addresses (e.g., `192.168.1.1`)
/// - IPv6 addresses (e.g., `[::1]`)
/// - Hostnames with ports (e.g., `example.com:3000`)
/// - Plain hostnames (e.g., `example.com`)
///
/// The port is stripped and the name lowercased, since host names are
/// case-insensitive and rules are stored in lowercase form.
///
/// # Errors
///
/// Returns [`AppError::Validation`] if:
/// - The `Host` header is missing or empty
/// - The header value contains invalid UTF-8
pub fn extract_domain_from_headers(headers: &HeaderMap) -> Result<String, AppError> {
    let host = headers
        .get(header::HOST)
        .ok_or_else(|| AppError::bad_request("Missing Host header", serde_json::json!({})))?
        .to_str()
        .map_err(|_| AppError::bad_request("Invalid Host header", serde_json::json!({})))?
        .trim();

    let domain = if host.starts_with('[') {
        match host.find(']') {
            Some(end_bracket) => &host[..=end_bracket],
            None => host,
        }
    } else {
        host.split(':').next().unwrap_or(host)
    };

    if domain.is_empty() {
        return Err(AppError::bad_request(
            "Empty Host header",
            serde_json::json!({}),
        ));
    }

    Ok(domain.to_ascii_lowercase())
}
