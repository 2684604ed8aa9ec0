use std::sync::Arc;

use axum::extract::State;
use axum::response::Redirect;
use axum::routing::{get, post};
use axum::{Extension, Form, Json, Router};
use tracing::{error, info};
use utoipa::OpenApi;
use validator::Validate;

use crate::entities::{ChatStore, DocumentStore, MessageType, SessionStore, User};
use crate::error::ServerError;
use crate::media;
use crate::schemas::chat::{ChatForm, ChatReply, HistoryEntry, MessagePayload, ReplyStatus};
use crate::schemas::field_errors;
use crate::state::AppState;

pub const NO_DOCUMENTS_MESSAGE: &str = "I'm sorry, there are no HR policy documents uploaded yet. \
     Please contact an administrator to upload the necessary documents.";

pub const APOLOGY_MESSAGE: &str = "I'm sorry, I encountered an error processing your request.";

#[derive(OpenApi)]
#[openapi(
    paths(post_chat, get_history),
    components(schemas(ChatForm, ChatReply, MessagePayload, ReplyStatus, HistoryEntry))
)]
pub struct ChatApi;

/// JSON endpoints used by the chat script.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/chat/", post(post_chat))
        .route("/chat/history/", get(get_history))
}

/// Browser form targets that answer with redirects.
pub fn pages() -> Router<Arc<AppState>> {
    Router::new().route("/clear-chat/", post(clear_chat).get(back_home))
}

// ── Chat handlers ─────────────────────────────────────────────────────────────

/// Ask a question about the HR policies.
///
/// Every accepted question stores one user message and one bot message, even
/// when answering fails; the bot message then carries the apology and
/// `status` is `"error"`.
#[utoipa::path(
    post,
    path = "/chat/",
    tag = "chat",
    request_body(content = ChatForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Answer, pipeline failure or validation errors", body = ChatReply),
        (status = 401, description = "Not signed in"),
    )
)]
pub async fn post_chat(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Form(form): Form<ChatForm>,
) -> Result<Json<ChatReply>, ServerError> {
    if let Err(errors) = form.validate() {
        return Ok(Json(ChatReply::invalid(field_errors(&errors))));
    }
    let question = form.content.trim();

    let session = state.store.get_or_create_session(user.id).await?;
    let user_message = state
        .store
        .append_message(session.id, MessageType::User, question)
        .await?;

    let (status, answer) = match answer_question(&state, question).await {
        Ok(answer) => (ReplyStatus::Success, answer),
        Err(e) => {
            error!(error = %e, user = %user.username, "failed to answer question");
            (ReplyStatus::Error, APOLOGY_MESSAGE.to_owned())
        }
    };

    let bot_message = state
        .store
        .append_message(session.id, MessageType::Bot, &answer)
        .await?;
    Ok(Json(ChatReply::turn(status, &user_message, &bot_message)))
}

async fn answer_question(state: &AppState, question: &str) -> Result<String, ServerError> {
    let documents = state.store.list_documents().await?;
    if documents.is_empty() {
        info!("no documents uploaded; answering without retrieval");
        return Ok(NO_DOCUMENTS_MESSAGE.to_owned());
    }
    let sources = media::load_sources(&state.config, &documents).await?;
    Ok(state.rag.respond(&sources, question).await?)
}

/// The caller's messages, oldest first.
#[utoipa::path(
    get,
    path = "/chat/history/",
    tag = "chat",
    responses(
        (status = 200, description = "Chat history", body = Vec<HistoryEntry>),
        (status = 401, description = "Not signed in"),
    )
)]
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<HistoryEntry>>, ServerError> {
    let Some(session) = state.store.find_session_by_user(user.id).await? else {
        return Ok(Json(Vec::new()));
    };
    let messages = state.store.list_messages(session.id).await?;
    Ok(Json(messages.iter().map(|m| m.to_history()).collect()))
}

pub async fn clear_chat(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Redirect, ServerError> {
    if let Some(session) = state.store.find_session_by_user(user.id).await? {
        let removed = state.store.clear_messages(session.id).await?;
        info!(user = %user.username, removed, "chat cleared");
    }
    Ok(Redirect::to("/"))
}

async fn back_home() -> Redirect {
    Redirect::to("/")
}
