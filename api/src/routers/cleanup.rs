use axum::{
    Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
};
use serde::Serialize;

use app::{lifecycle::CleanupTier, state::AppState};

use crate::extractor::Json;
use crate::{ApiResponse, error::ApiError};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TierStatus {
    started: bool,
    running_tiers: Vec<CleanupTier>,
}

async fn expired_get(state: State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let probe = state.cleanup.check_for_expired_tournaments().await?;
    Ok(Json(ApiResponse::success(
        "Expired tournaments retrieved Successfully",
        Some(probe),
    )))
}

async fn run_post(state: State<AppState>) -> impl IntoResponse {
    // The outcome carries its own success flag, so failures still return 200.
    Json(state.cleanup.delete_expired_tournaments().await)
}

async fn tiers_post(
    state: State<AppState>,
    Path(tier): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let tier = CleanupTier::parse(&tier)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown cleanup tier: {tier}")))?;

    let started = state.cleanup.enable(tier);
    let status = TierStatus {
        started,
        running_tiers: state.cleanup.running_tiers(),
    };
    let message = if started {
        "Cleanup tier started"
    } else {
        "Cleanup tier already running"
    };

    Ok(Json(ApiResponse::success(message, Some(status))))
}

pub fn create_cleanup_router() -> Router<AppState> {
    Router::new()
        .route("/expired", get(expired_get))
        .route("/run", post(run_post))
        .route("/tiers/{tier}", post(tiers_post))
}
