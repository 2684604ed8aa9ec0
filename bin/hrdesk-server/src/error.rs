//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors are converted to a JSON-body
//! HTTP response with an appropriate status code.
//!
//! Internal errors (retrieval, database, filesystem, templates) are logged
//! with full detail but only a generic message is returned to the caller.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// All errors that can occur in the hrdesk-server request lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Propagated from the retrieval / generation library.
    #[error("rag error: {0}")]
    Rag(#[from] hrdesk_rag::RagError),

    /// Propagated from the SQLite (or other) store.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Reading or writing an uploaded file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    /// The caller referenced a resource that does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The caller sent an invalid or malformed request.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// No valid credentials were presented.
    #[error("unauthorised")]
    Unauthorized,

    /// Authenticated, but not allowed to manage documents.
    #[error("forbidden")]
    Forbidden,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, client_message) = match &self {
            // Client-facing errors: expose the message directly.
            ServerError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
            ServerError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
            ServerError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorised".to_owned()),
            ServerError::Forbidden => (StatusCode::FORBIDDEN, "forbidden".to_owned()),

            // Internal errors: log the detail, return a generic message.
            ServerError::Rag(e) => {
                error!(error = %e, "retrieval pipeline error");
                (StatusCode::BAD_GATEWAY, "upstream model error".to_owned())
            }
            ServerError::Database(e) => {
                error!(error = %e, "database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_owned())
            }
            ServerError::Io(e) => {
                error!(error = %e, "filesystem error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_owned())
            }
            ServerError::Template(e) => {
                error!(error = %e, "template render error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_owned())
            }
        };
        (status, Json(json!({ "error": client_message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_keep_their_status() {
        assert_eq!(ServerError::Unauthorized.into_response().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ServerError::Forbidden.into_response().status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ServerError::NotFound("document 7".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn internal_errors_are_masked() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "media/documents/secret.pdf");
        let resp = ServerError::Io(io).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
