use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

const CHAT_JS: &str = include_str!("../../static/js/chat.js");

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/static/js/chat.js", get(chat_js))
}

async fn chat_js() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/javascript; charset=utf-8"),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        CHAT_JS,
    )
}
