use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::{Extension, Router};
use minijinja::context;

use crate::entities::{ChatStore, SessionStore, User};
use crate::error::ServerError;
use crate::schemas::chat::HistoryEntry;
use crate::state::AppState;
use crate::views;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(home))
}

/// Chat page with the caller's full history. First visit creates the session.
pub async fn home(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Html<String>, ServerError> {
    let session = state.store.get_or_create_session(user.id).await?;
    let messages: Vec<HistoryEntry> = state
        .store
        .list_messages(session.id)
        .await?
        .iter()
        .map(|m| m.to_history())
        .collect();
    views::render(
        &state.templates,
        "home.html",
        context! {
            user => views::user_context(&user),
            messages,
        },
    )
}
