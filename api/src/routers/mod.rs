use axum::Router;

pub mod cleanup;
pub mod root;
pub mod tournament;

use app::state::AppState;
use cleanup::create_cleanup_router;
use root::create_root_router;
use tournament::create_tournament_router;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(create_root_router())
        .nest("/tournaments", create_tournament_router())
        .nest("/cleanup", create_cleanup_router())
        .with_state(state)
}
