//! Health check that also queries the store.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

use crate::entities::DocumentStore;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(get_health), components(schemas(HealthReport)))]
pub struct HealthApi;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthReport {
    /// `ok`, or `degraded` when the store cannot be queried.
    pub status: String,
    pub version: String,
    /// Policy documents currently available to the assistant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documents: Option<i64>,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(get_health))
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Server and store are reachable", body = HealthReport),
        (status = 503, description = "The store could not be queried", body = HealthReport)
    )
)]
pub async fn get_health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthReport>) {
    match state.store.count_documents().await {
        Ok(count) => (StatusCode::OK, Json(report("ok", Some(count)))),
        Err(e) => {
            tracing::error!(error = %e, "health check could not reach the store");
            (StatusCode::SERVICE_UNAVAILABLE, Json(report("degraded", None)))
        }
    }
}

fn report(status: &'static str, documents: Option<i64>) -> HealthReport {
    HealthReport {
        status: status.to_owned(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
        documents,
    }
}
