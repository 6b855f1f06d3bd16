use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Serialize;

use app::persistence::tournaments::{create_tournament, get_tournament, get_tournament_state};
use app::state::AppState;
use models::params::tournament::CreateTournamentParams;
use models::schemas::{lifecycle::LifecycleState, tournament::TournamentSchema};

use crate::extractor::{Json, Valid};
use crate::{ApiResponse, error::ApiError};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TournamentWithState {
    tournament: TournamentSchema,
    state: LifecycleState,
}

async fn tournaments_post(
    state: State<AppState>,
    Valid(Json(params)): Valid<Json<CreateTournamentParams>>,
) -> Result<impl IntoResponse, ApiError> {
    if params.start_time.to_utc() <= state.clock.now() {
        return Err(ApiError::BadRequest(
            "Start time must be in the future".to_string(),
        ));
    }

    let tournament = create_tournament(state.store.as_ref(), params).await?;

    let result = ApiResponse::success("Tournament created successfully", Some(tournament));

    Ok((StatusCode::CREATED, Json(result)))
}

async fn tournaments_id_get(
    state: State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let result = get_tournament(state.store.as_ref(), &id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Tournament not found".to_string()))?;

    let response = ApiResponse::success("Tournament retrieved Successfully", Some(result));

    Ok(Json(response))
}

async fn tournaments_id_state_get(
    state: State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let (tournament, lifecycle) = get_tournament_state(state.store.as_ref(), &id, state.clock.now())
        .await?
        .ok_or_else(|| ApiError::NotFound("Tournament not found".to_string()))?;

    let response = ApiResponse::success(
        "Tournament state retrieved Successfully",
        Some(TournamentWithState {
            tournament,
            state: lifecycle,
        }),
    );

    Ok(Json(response))
}

pub fn create_tournament_router() -> Router<AppState> {
    Router::new()
        .route("/", post(tournaments_post))
        .route("/{id}", get(tournaments_id_get))
        .route("/{id}/state", get(tournaments_id_state_get))
}
