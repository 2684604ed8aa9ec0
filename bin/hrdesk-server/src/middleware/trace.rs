use crate::error::ServerError;
use crate::state::AppState;
use axum::{
    body::{Body, HttpBody},
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::BodyExt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

pub static X_TRACE_ID: &str = "x-trace-id";

/// Bodies above this size are never buffered for logging.
const MAX_LOGGED_BODY: u64 = 1024;

pub async fn trace_middleware(
    State(_state): State<Arc<AppState>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let start_time = Instant::now();

    let trace_id = req
        .headers()
        .get(X_TRACE_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);

    let span = info_span!(
        "http_request",
        trace_id = %trace_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        info!("→ request started");
        let header_value = HeaderValue::from_str(&trace_id.to_string()).ok();

        let (parts, body) = req.into_parts();
        let body = match log_small_body("request", &parts.headers, body).await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "failed to read request body");
                return ServerError::BadRequest("unreadable request body".into()).into_response();
            }
        };
        let mut req = Request::from_parts(parts, body);
        if let Some(v) = &header_value {
            req.headers_mut().insert(X_TRACE_ID, v.clone());
        }

        let response = next.run(req).await;

        let (parts, body) = response.into_parts();
        let mut response = match log_small_body("response", &parts.headers, body).await {
            Ok(body) => Response::from_parts(parts, body),
            Err(e) => {
                error!(error = %e, "failed to read response body");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        };
        if let Some(v) = header_value {
            response.headers_mut().insert(X_TRACE_ID, v);
        }

        info!(
            status = response.status().as_u16(),
            latency_ms = start_time.elapsed().as_millis(),
            "← response finished"
        );
        response
    }
    .instrument(span)
    .await
}

fn is_loggable(headers: &HeaderMap, exact_len: Option<u64>) -> bool {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    content_type.starts_with("application/json")
        && exact_len.is_some_and(|len| len <= MAX_LOGGED_BODY)
}

/// Logs small JSON bodies; everything else streams through untouched.
async fn log_small_body(
    direction: &str,
    headers: &HeaderMap,
    body: Body,
) -> Result<Body, axum::Error> {
    if !is_loggable(headers, body.size_hint().exact()) {
        return Ok(body);
    }
    let bytes = body.collect().await?.to_bytes();
    if let Ok(text) = std::str::from_utf8(&bytes) {
        info!("{direction} body: {text}");
    }
    Ok(Body::from(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(content_type: &'static str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        h
    }

    #[test]
    fn only_small_textual_bodies_are_logged() {
        assert!(is_loggable(&headers("application/json"), Some(120)));
        assert!(!is_loggable(&headers("application/x-www-form-urlencoded"), Some(40)));
        assert!(!is_loggable(&headers("application/json"), Some(4096)));
        assert!(!is_loggable(&headers("application/json"), None));
        assert!(!is_loggable(&headers("multipart/form-data; boundary=x"), Some(10)));
        assert!(!is_loggable(&HeaderMap::new(), Some(10)));
    }

    #[tokio::test]
    async fn skipped_bodies_pass_through() {
        let body = log_small_body("request", &headers("text/html"), Body::from("<p>hi</p>"))
            .await
            .unwrap();
        let bytes = body.collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"<p>hi</p>");
    }

    /// A body that claims four bytes but fails once it runs past them.
    fn truncated_json_body() -> Body {
        let full = http_body_util::Full::new(axum::body::Bytes::from_static(b"{\"content\":\"hi\"}"));
        Body::new(http_body_util::Limited::new(full, 4))
    }

    #[tokio::test]
    async fn unreadable_body_is_an_error() {
        let body = truncated_json_body();
        assert_eq!(body.size_hint().exact(), Some(4));
        assert!(log_small_body("request", &headers("application/json"), body).await.is_err());
    }
}
