use chrono::{DateTime, Utc};
use models::schemas::{lifecycle::RunSummary, tournament::TournamentSchema};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::{
    config::LifecycleConfig,
    error::{LifecycleError, Result},
    notifier::Notifier,
    store::{HostDirectory, TournamentStore},
    utils::email::render_starting_soon,
};

enum Delivery {
    Sent,
    Skipped,
    Failed,
}

/// Sends one "starting soon" notice per tournament to its host.
///
/// The flag is written only after the transport accepts the message. A crash
/// between the two means the next run in the same window sends again; a send
/// that fails is not retried once the tournament leaves the window.
#[derive(Clone)]
pub struct NotificationTrigger {
    store: Arc<dyn TournamentStore>,
    directory: Arc<dyn HostDirectory>,
    notifier: Arc<dyn Notifier>,
    config: LifecycleConfig,
}

impl NotificationTrigger {
    pub fn new(
        store: Arc<dyn TournamentStore>,
        directory: Arc<dyn HostDirectory>,
        notifier: Arc<dyn Notifier>,
        config: LifecycleConfig,
    ) -> Self {
        Self {
            store,
            directory,
            notifier,
            config,
        }
    }

    /// `[now + lead, now + lead + buffer]`, both ends inclusive.
    pub fn window(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let from = now + self.config.notify_lead;
        (from, from + self.config.notify_buffer)
    }

    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<RunSummary> {
        let (from, to) = self.window(now);
        let candidates = self
            .store
            .find_notification_candidates(from, to, self.config.notify_batch)
            .await?;

        let mut summary = RunSummary {
            matched: candidates.len(),
            ..Default::default()
        };

        let mut deliveries = JoinSet::new();
        for tournament in candidates {
            deliveries.spawn(deliver(
                Arc::clone(&self.store),
                Arc::clone(&self.directory),
                Arc::clone(&self.notifier),
                tournament,
                now,
            ));
        }

        while let Some(joined) = deliveries.join_next().await {
            match joined {
                Ok(Delivery::Sent) => summary.applied += 1,
                Ok(Delivery::Skipped) => summary.skipped += 1,
                Ok(Delivery::Failed) => summary.errors += 1,
                Err(e) => {
                    error!("Notification task aborted: {}", e);
                    summary.errors += 1;
                }
            }
        }

        info!(
            matched = summary.matched,
            notified = summary.applied,
            skipped = summary.skipped,
            errors = summary.errors,
            "Notification trigger run finished"
        );
        Ok(summary)
    }
}

async fn deliver(
    store: Arc<dyn TournamentStore>,
    directory: Arc<dyn HostDirectory>,
    notifier: Arc<dyn Notifier>,
    tournament: TournamentSchema,
    now: DateTime<Utc>,
) -> Delivery {
    let id = tournament.id.as_str();

    let Some(host_id) = tournament.host_id.as_deref() else {
        warn!(tournament = id, "Skipping notification: tournament has no host");
        return Delivery::Skipped;
    };

    let address = match directory.contact_address(host_id).await {
        Ok(Some(address)) => address,
        Ok(None) => {
            warn!(tournament = id, host = host_id, "Skipping notification: host has no contact address");
            return Delivery::Skipped;
        }
        Err(e) => {
            warn!(tournament = id, "{}", LifecycleError::Directory(e));
            return Delivery::Failed;
        }
    };

    let minutes_left = (tournament.start_time - now).num_minutes();
    let notification = render_starting_soon(&tournament, minutes_left);
    if let Err(e) = notifier.send(&address, &notification).await {
        warn!(tournament = id, "{}", LifecycleError::Notify(e));
        return Delivery::Failed;
    }

    match store.mark_notification_sent(id).await {
        Ok(true) => Delivery::Sent,
        Ok(false) => {
            info!(tournament = id, "Notification flag already set or tournament removed");
            Delivery::Sent
        }
        Err(e) => {
            error!(
                tournament = id,
                "Notification sent but not recorded, it may be sent again: {}", e
            );
            Delivery::Failed
        }
    }
}
