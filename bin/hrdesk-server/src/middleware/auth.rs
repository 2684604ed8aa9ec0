//! Token authentication.
//!
//! A caller presents its token either as `Authorization: Bearer <token>` or in
//! the `hrdesk_token` cookie set by `POST /login`. Tokens are never stored;
//! users are looked up by the hex SHA-256 digest.
//!
//! JSON endpoints answer anonymous callers with 401. Browser pages send them
//! to the sign-in form instead.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::entities::{User, UserStore};
use crate::error::ServerError;
use crate::state::AppState;

pub const TOKEN_COOKIE: &str = "hrdesk_token";

pub const LOGIN_PATH: &str = "/login";

/// Hex-encoded SHA-256 of `token`.
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// A fresh random 64-hex-char token.
pub fn generate_token() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

/// Bearer header first, then the session cookie.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_owned());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == TOKEN_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_owned())
}

pub async fn resolve_user(state: &AppState, headers: &HeaderMap) -> Result<User, ServerError> {
    let token = token_from_headers(headers).ok_or(ServerError::Unauthorized)?;
    state
        .store
        .find_user_by_token(&hash_token(&token))
        .await?
        .ok_or(ServerError::Unauthorized)
}

/// Rejects anonymous callers with 401 and exposes the [`User`] as a request
/// extension.
pub async fn require_user(
    State(state): State<Arc<AppState>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match resolve_user(&state, req.headers()).await {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(e) => e.into_response(),
    }
}

/// Like [`require_user`], but anonymous browsers are sent to the sign-in page.
pub async fn require_page_user(
    State(state): State<Arc<AppState>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match resolve_user(&state, req.headers()).await {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(e) => redirect_anonymous(e),
    }
}

/// Document pages: anonymous browsers go to sign-in, non-admins get 403.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match resolve_user(&state, req.headers()).await {
        Ok(user) if user.is_admin() => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Ok(user) => {
            tracing::warn!(user = %user.username, path = %req.uri().path(), "non-admin denied");
            ServerError::Forbidden.into_response()
        }
        Err(e) => redirect_anonymous(e),
    }
}

fn redirect_anonymous(err: ServerError) -> Response {
    match err {
        ServerError::Unauthorized => Redirect::to(LOGIN_PATH).into_response(),
        other => other.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn hash_is_hex_sha256() {
        assert_eq!(
            hash_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn only_missing_credentials_redirect() {
        let resp = redirect_anonymous(ServerError::Unauthorized);
        assert_eq!(resp.status(), axum::http::StatusCode::SEE_OTHER);
        assert_eq!(resp.headers()[header::LOCATION], LOGIN_PATH);

        let resp = redirect_anonymous(ServerError::NotFound("x".into()));
        assert_eq!(resp.status(), axum::http::StatusCode::NOT_FOUND);
    }

    #[test]
    fn generated_tokens_are_unique() {
        let a = generate_token();
        assert_eq!(a.len(), 64);
        assert_ne!(a, generate_token());
    }

    #[test]
    fn bearer_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; hrdesk_token=from-cookie"));
        assert_eq!(token_from_headers(&headers).as_deref(), Some("from-cookie"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        assert_eq!(token_from_headers(&headers).as_deref(), Some("from-header"));
    }

    #[test]
    fn missing_token_is_none() {
        let mut headers = HeaderMap::new();
        assert!(token_from_headers(&headers).is_none());
        headers.insert(header::COOKIE, HeaderValue::from_static("hrdesk_token="));
        assert!(token_from_headers(&headers).is_none());
    }
}
