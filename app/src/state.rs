use std::sync::Arc;

use crate::{
    clock::Clock, config::LifecycleConfig, lifecycle::CleanupAgent, store::TournamentStore,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TournamentStore>,
    pub clock: Arc<dyn Clock>,
    pub cleanup: Arc<CleanupAgent>,
    pub lifecycle: LifecycleConfig,
}

impl AppState {
    /// Builds the shared state with a cleanup agent bound to `store`.
    pub fn new(store: Arc<dyn TournamentStore>, clock: Arc<dyn Clock>, lifecycle: LifecycleConfig) -> Self {
        let cleanup = Arc::new(CleanupAgent::new(
            Arc::clone(&store),
            Arc::clone(&clock),
            lifecycle.clone(),
        ));
        Self {
            store,
            clock,
            cleanup,
            lifecycle,
        }
    }
}
