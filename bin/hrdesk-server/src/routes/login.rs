//! Token sign-in for browsers.
//!
//! `POST /login` checks the token and stores it in an HttpOnly cookie; API
//! clients can skip this and send `Authorization: Bearer` instead.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use minijinja::context;
use serde::Deserialize;
use tracing::{info, warn};

use crate::entities::UserStore;
use crate::error::ServerError;
use crate::middleware::auth::{LOGIN_PATH, TOKEN_COOKIE, hash_token};
use crate::state::AppState;
use crate::views;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub token: String,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", get(login_page).post(login))
        .route("/logout", post(logout))
}

fn render_login(state: &AppState, error: Option<&str>) -> Result<Html<String>, ServerError> {
    views::render(&state.templates, "login.html", context! { error })
}

pub async fn login_page(State(state): State<Arc<AppState>>) -> Result<Html<String>, ServerError> {
    render_login(&state, None)
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Result<Response, ServerError> {
    let token = form.token.trim();
    let user = if token.is_empty() {
        None
    } else {
        state.store.find_user_by_token(&hash_token(token)).await?
    };

    let Some(user) = user else {
        warn!("sign-in with unknown token");
        let page = render_login(&state, Some("Invalid access token."))?;
        return Ok((StatusCode::UNAUTHORIZED, page).into_response());
    };

    let cookie = HeaderValue::from_str(&token_cookie(token, state.config.secure_cookies))
        .map_err(|_| ServerError::BadRequest("token contains invalid characters".into()))?;
    info!(user = %user.username, "signed in");
    Ok(([(header::SET_COOKIE, cookie)], Redirect::to("/")).into_response())
}

pub async fn logout(State(state): State<Arc<AppState>>) -> Result<Response, ServerError> {
    let expired = HeaderValue::from_str(&format!(
        "{}; Max-Age=0",
        token_cookie("", state.config.secure_cookies)
    ))
    .map_err(|_| ServerError::BadRequest("invalid cookie".into()))?;
    Ok(([(header::SET_COOKIE, expired)], Redirect::to(LOGIN_PATH)).into_response())
}

fn token_cookie(token: &str, secure: bool) -> String {
    let mut cookie = format!("{TOKEN_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secure_flag_follows_config() {
        assert_eq!(token_cookie("abc", false), "hrdesk_token=abc; Path=/; HttpOnly; SameSite=Lax");
        assert!(token_cookie("abc", true).ends_with("; Secure"));
    }
}
