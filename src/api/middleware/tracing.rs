//! HTTP request/response tracing middleware.

use tower_http::LatencyUnit;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Creates a tracing middleware for HTTP requests.
///
/// Every request, redirects included, gets an `INFO` span with method, URI and
/// HTTP version. The response is logged at `INFO` with status and latency in
/// milliseconds; the request start is logged at `DEBUG`.
///
/// # Example Logs
///
/// ```text
/// INFO request{method=GET uri=/docs version=HTTP/1.1}: finished processing request latency=0 ms status=301
/// INFO request{method=POST uri=/api/rules version=HTTP/1.1}: finished processing request latency=2 ms status=201
/// ```
pub fn layer()
-> TraceLayer<tower_http::classify::SharedClassifier<tower_http::classify::ServerErrorsAsFailures>>
{
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        )
}
