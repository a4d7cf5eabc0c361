//! Request timing middleware.
//!
//! Move requests include an engine search, so a request is only reported as
//! slow once it runs well past the longest think time plus grace.

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use std::time::{Duration, Instant};

/// Requests taking longer than this are logged at `warn`.
pub const SLOW_REQUEST: Duration = Duration::from_millis(1000);

/// Logs method, path, status and elapsed time for every request.
pub async fn timing_layer(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    let elapsed = start.elapsed();
    let status = response.status().as_u16();
    let elapsed_ms = elapsed.as_millis() as u64;

    if elapsed > SLOW_REQUEST {
        tracing::warn!(%method, %path, status, elapsed_ms, "Slow request");
    } else {
        tracing::debug!(%method, %path, status, elapsed_ms, "Request completed");
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::StatusCode,
        middleware,
        routing::{get, post},
        Router,
    };
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/ping", get(|| async { "pong" }))
            .route(
                "/fail",
                post(|| async { (StatusCode::UNPROCESSABLE_ENTITY, "nope") }),
            )
            .layer(middleware::from_fn(timing_layer))
    }

    #[tokio::test]
    async fn passes_body_through() {
        let response = app()
            .oneshot(Request::builder().uri("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"pong");
    }

    #[tokio::test]
    async fn keeps_error_status() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/fail")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let missing = app()
            .oneshot(Request::builder().uri("/nowhere").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }
}
