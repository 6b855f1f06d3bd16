use chrono::{DateTime, Utc};
use models::schemas::lifecycle::RunSummary;
use std::sync::Arc;
use tracing::{error, info};

use crate::{
    config::LifecycleConfig,
    error::Result,
    store::{TournamentStore, TtlUpdate},
};

/// Gives every started, untagged tournament its deletion deadline.
///
/// The only writer of `ttl`. Since it only selects rows whose `ttl` is null,
/// a row tagged by one run is invisible to the next, and a failed batch leaves
/// the same rows to be picked up again.
#[derive(Clone)]
pub struct ExpiryTagger {
    store: Arc<dyn TournamentStore>,
    config: LifecycleConfig,
}

impl ExpiryTagger {
    pub fn new(store: Arc<dyn TournamentStore>, config: LifecycleConfig) -> Self {
        Self { store, config }
    }

    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<RunSummary> {
        let started = self
            .store
            .find_untagged_started(now, self.config.tag_batch)
            .await?;

        let updates: Vec<TtlUpdate> = started
            .iter()
            .map(|t| TtlUpdate {
                id: t.id.clone(),
                ttl: t.start_time + self.config.ttl_after_start,
            })
            .collect();

        let matched = updates.len();
        let applied = match self.store.commit_ttl_batch(updates).await {
            Ok(applied) => applied,
            Err(e) => {
                error!(matched, "Expiry batch not applied: {}", e);
                return Err(e);
            }
        };

        let summary = RunSummary {
            matched,
            applied,
            // Rows tagged or removed by someone else between the read and the commit.
            skipped: matched.saturating_sub(applied),
            errors: 0,
        };
        info!(
            matched = summary.matched,
            tagged = summary.applied,
            skipped = summary.skipped,
            "Expiry tagging run finished"
        );
        Ok(summary)
    }
}
