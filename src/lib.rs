use std::sync::Arc;

use api::{setup_config, setup_db, setup_router};
use app::{
    clock::{Clock, SystemClock},
    lifecycle::{ExpiryTagger, NotificationTrigger},
    notifier::EmailNotifier,
    scheduler::TriggerScheduler,
    state::AppState,
    store::{DbStore, HostDirectory, TournamentStore},
};
use tracing::info;
use utils::migrate;

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Wires the store, the cron triggers, one cleanup agent and the HTTP surface,
/// then serves until ctrl-c.
pub async fn run() -> anyhow::Result<()> {
    let config = setup_config()?;
    let lifecycle = config.lifecycle.clone();

    let conn = setup_db(&config.db_url).await?;
    migrate(&conn).await?;

    let db = DbStore::new(conn);
    let store: Arc<dyn TournamentStore> = Arc::new(db.clone());
    let directory: Arc<dyn HostDirectory> = Arc::new(db);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let mut triggers = TriggerScheduler::new().await?;
    triggers
        .register_notification_trigger(
            &lifecycle.trigger_cron,
            NotificationTrigger::new(
                Arc::clone(&store),
                directory,
                Arc::new(EmailNotifier::new(config.clone())),
                lifecycle.clone(),
            ),
            Arc::clone(&clock),
        )
        .await?;
    triggers
        .register_expiry_tagger(
            &lifecycle.trigger_cron,
            ExpiryTagger::new(Arc::clone(&store), lifecycle.clone()),
            Arc::clone(&clock),
        )
        .await?;
    triggers.start().await?;

    let state = AppState::new(store, clock, lifecycle);
    state.cleanup.initialize_cleanup();

    let listener = tokio::net::TcpListener::bind(config.get_server_url()).await?;
    info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, setup_router(state.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down");
    state.cleanup.stop();
    triggers.shutdown().await?;
    Ok(())
}
