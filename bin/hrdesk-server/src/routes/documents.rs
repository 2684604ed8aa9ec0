use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Extension, Router};
use bytes::Bytes;
use minijinja::context;
use tracing::info;
use validator::Validate;

use crate::entities::{DocumentRecord, DocumentStore, NewDocument, User};
use crate::error::ServerError;
use crate::media;
use crate::schemas::document::{DocumentView, UploadForm};
use crate::schemas::{FieldErrors, field_errors};
use crate::state::AppState;
use crate::views;

/// Document management; mounted behind the admin check.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/documents/", get(list_documents))
        .route("/documents/upload/", get(upload_form).post(upload_document))
        .route("/documents/delete/{id}/", get(confirm_delete).post(delete_document))
}

pub async fn list_documents(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Html<String>, ServerError> {
    let documents: Vec<DocumentView> = state
        .store
        .list_documents()
        .await?
        .iter()
        .map(DocumentRecord::to_view)
        .collect();
    views::render(
        &state.templates,
        "document_list.html",
        context! { user => views::user_context(&user), documents },
    )
}

// ── Upload ────────────────────────────────────────────────────────────────────

fn render_upload(
    state: &AppState,
    user: &User,
    title: &str,
    errors: &FieldErrors,
) -> Result<Html<String>, ServerError> {
    views::render(
        &state.templates,
        "upload_document.html",
        context! { user => views::user_context(user), title, errors },
    )
}

pub async fn upload_form(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Html<String>, ServerError> {
    render_upload(&state, &user, "", &FieldErrors::new())
}

/// Multipart `title` + `file`. Invalid input re-renders the form with 400.
pub async fn upload_document(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    mut multipart: Multipart,
) -> Result<Response, ServerError> {
    let mut form = UploadForm::default();
    let mut bytes = Bytes::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_owned();
        match name.as_str() {
            "title" => {
                form.title = field
                    .text()
                    .await
                    .map_err(|e| ServerError::BadRequest(e.body_text()))?;
            }
            "file" => {
                form.file.name = field.file_name().unwrap_or_default().to_owned();
                bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ServerError::BadRequest(e.body_text()))?;
                form.file.size = bytes.len();
            }
            _ => {}
        }
    }

    if let Err(errors) = form.validate() {
        let errors = field_errors(&errors);
        info!(user = %user.username, ?errors, "upload rejected");
        let page = render_upload(&state, &user, &form.title, &errors)?;
        return Ok((StatusCode::BAD_REQUEST, page).into_response());
    }
    let document_type = form
        .document_type()
        .ok_or_else(|| ServerError::BadRequest("unsupported file type".into()))?;

    let file_path = media::save_document(&state.config, &form.file.name, &bytes).await?;
    let new_document = NewDocument {
        title: form.title.trim().to_owned(),
        file_name: form.file.name.clone(),
        file_path: file_path.clone(),
        document_type,
        uploaded_by: user.id,
    };
    let id = match state.store.insert_document(new_document).await {
        Ok(id) => id,
        Err(e) => {
            media::remove_document(&state.config, &file_path).await;
            return Err(e.into());
        }
    };
    info!(id, %document_type, size = bytes.len(), user = %user.username, "document uploaded");
    Ok(Redirect::to("/documents/").into_response())
}

// ── Delete ────────────────────────────────────────────────────────────────────

async fn find_document(state: &AppState, id: i64) -> Result<DocumentRecord, ServerError> {
    state
        .store
        .get_document(id)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("document {id} not found")))
}

pub async fn confirm_delete(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<i64>,
) -> Result<Html<String>, ServerError> {
    let document = find_document(&state, id).await?.to_view();
    views::render(
        &state.templates,
        "delete_document.html",
        context! { user => views::user_context(&user), document },
    )
}

pub async fn delete_document(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<i64>,
) -> Result<Redirect, ServerError> {
    let document = find_document(&state, id).await?;
    if !state.store.delete_document(id).await? {
        return Err(ServerError::NotFound(format!("document {id} not found")));
    }
    media::remove_document(&state.config, &document.file_path).await;
    info!(id, title = %document.title, user = %user.username, "document deleted");
    Ok(Redirect::to("/documents/"))
}
