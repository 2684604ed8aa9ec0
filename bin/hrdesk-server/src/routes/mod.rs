//! Axum router construction.
//!
//! [`build`] assembles the complete application router, including:
//! - Middleware layers (CORS, per-request trace-ID injection)
//! - Optional Swagger UI / OpenAPI spec endpoint (disable with `HRDESK_ENABLE_SWAGGER=false`)
//! - Public routes: health, login, static assets
//! - Chat API and chat page for any signed-in user
//! - Document management for staff and superusers

mod assets;
mod chat;
pub mod doc;
mod documents;
mod health;
mod home;
mod login;

use axum::{Router, extract::DefaultBodyLimit, middleware};
use crate::middleware::{auth, cors, trace};
use crate::state::AppState;
use std::sync::Arc;
use tower::ServiceBuilder;
use utoipa_swagger_ui::SwaggerUi;

#[cfg(test)]
pub use chat::{APOLOGY_MESSAGE, NO_DOCUMENTS_MESSAGE};

// ── Router builder ────────────────────────────────────────────────────────────

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let public = Router::new()
        .merge(health::router())
        .merge(login::router())
        .merge(assets::router());

    let signed_in = chat::router()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_user));

    let pages = Router::new()
        .merge(home::router())
        .merge(chat::pages())
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_page_user));

    let upload_limit = state.config.max_upload_size_mb.saturating_mul(1024 * 1024);
    let admin = documents::router()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_admin))
        .layer(DefaultBodyLimit::max(upload_limit));

    let mut app = Router::new()
        .merge(public)
        .merge(signed_in)
        .merge(pages)
        .merge(admin);

    // ── Swagger UI ────────────────────────────────────────────────────────────
    if state.config.enable_swagger {
        app = app.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", doc::get_docs()));
    }

    app
        // Outermost layers execute first on the way in.
        .layer(ServiceBuilder::new().layer(cors::cors_layer(state.clone())))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            trace::trace_middleware,
        ))
        .with_state(state)
}
