//! Request-id scope for handler code.

use axum::{extract::Request, middleware::Next, response::Response};
use photorelay_telemetry::{HEADER_REQUEST_ID, with_request_id};

/// Run the rest of the stack with the request id visible to `current_request_id`.
pub(crate) async fn request_scope(req: Request, next: Next) -> Response {
    let request_id = req
        .headers()
        .get(HEADER_REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    with_request_id(request_id, next.run(req)).await
}
