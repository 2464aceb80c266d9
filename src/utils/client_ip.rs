//! Client address resolution for access logging.

use std::net::SocketAddr;

use axum::http::HeaderMap;

/// Returns the address of the client that issued the request.
///
/// Checks, in order: the first `X-Forwarded-For` entry, `X-Real-IP`, then the
/// socket peer. Returns an empty string when none is available.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    if let Some(first) = header_value(headers, "x-forwarded-for")
        .and_then(|forwarded| forwarded.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
    {
        return first.to_string();
    }

    if let Some(real_ip) = header_value(headers, "x-real-ip") {
        return real_ip.to_string();
    }

    peer.map(|addr| addr.ip().to_string()).unwrap_or_default()
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
