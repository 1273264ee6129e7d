//! Request-tracking middleware.
//!
//! Counts every inbound request on entry and, once the inner handlers have
//! produced a response, emits one HTTP-transaction log event with the
//! buffered request and response bodies. The response the client sees is
//! reassembled from the original parts and bytes — same status, same body
//! — no matter what the telemetry calls do.

use axum::body::{Body, to_bytes};
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::debug;

use crate::Telemetry;

/// Mount with `axum::middleware::from_fn_with_state(telemetry, track_requests)`.
pub async fn track_requests(
    State(telemetry): State<Telemetry>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let has_auth_header = request.headers().contains_key(AUTHORIZATION);

    telemetry.on_request_start(&method, &path);

    // Buffer the request body so it can be both logged and replayed for
    // the inner handler.
    let (parts, body) = request.into_parts();
    let request_bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            // The client aborted mid-body; there is no request left to run.
            debug!(error = %e, %path, "failed to buffer request body");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };
    let request = Request::from_parts(parts, Body::from(request_bytes.clone()));

    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let response_bytes = to_bytes(body, usize::MAX).await.unwrap_or_default();

    telemetry.on_request_complete(
        parts.status.as_u16(),
        has_auth_header,
        &method,
        &path,
        &String::from_utf8_lossy(&request_bytes),
        &String::from_utf8_lossy(&response_bytes),
    );

    Response::from_parts(parts, Body::from(response_bytes))
}
