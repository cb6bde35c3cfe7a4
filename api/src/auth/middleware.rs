use axum::{body::Body, http::Request, middleware::Next, response::Response};
use std::time::Instant;

/// Logs every request with method, path, status and latency.
pub async fn log_request(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let start = Instant::now();

    let response = next.run(req).await;

    tracing::info!(
        %method,
        %uri,
        status = %response.status(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "handled request"
    );

    response
}
