use axum::{Router, extract::State, response::IntoResponse, routing::get};
use serde::Serialize;

use app::{lifecycle::CleanupTier, state::AppState};

use crate::{ApiResponse, extractor::Json};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ServiceStatus {
    cleanup_initialized: bool,
    cleanup_tiers: Vec<CleanupTier>,
}

async fn root_get(state: State<AppState>) -> impl IntoResponse {
    let status = ServiceStatus {
        cleanup_initialized: state.cleanup.is_initialized(),
        cleanup_tiers: state.cleanup.running_tiers(),
    };
    Json(ApiResponse::success("Service is up", Some(status)))
}

pub fn create_root_router() -> Router<AppState> {
    Router::new().route("/", get(root_get))
}
