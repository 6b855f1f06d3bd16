use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::{
    clock::Clock,
    error::Result,
    lifecycle::{ExpiryTagger, NotificationTrigger},
};

/// Runs the server-side triggers on a cron schedule.
///
/// Each invocation is independent: the jobs share nothing but the store, and
/// a failed run is logged and left for the next tick.
pub struct TriggerScheduler {
    scheduler: JobScheduler,
}

impl TriggerScheduler {
    pub async fn new() -> Result<Self> {
        Ok(Self {
            scheduler: JobScheduler::new().await?,
        })
    }

    pub async fn register_notification_trigger(
        &self,
        cron: &str,
        trigger: NotificationTrigger,
        clock: Arc<dyn Clock>,
    ) -> Result<()> {
        let job = Job::new_async(cron, move |_uuid, _l| {
            let trigger = trigger.clone();
            let clock = Arc::clone(&clock);
            Box::pin(async move {
                if let Err(e) = trigger.run_once(clock.now()).await {
                    error!("Notification trigger run failed: {}", e);
                }
            })
        })?;
        self.scheduler.add(job).await?;
        info!(cron, "Registered notification trigger");
        Ok(())
    }

    pub async fn register_expiry_tagger(
        &self,
        cron: &str,
        tagger: ExpiryTagger,
        clock: Arc<dyn Clock>,
    ) -> Result<()> {
        let job = Job::new_async(cron, move |_uuid, _l| {
            let tagger = tagger.clone();
            let clock = Arc::clone(&clock);
            Box::pin(async move {
                if let Err(e) = tagger.run_once(clock.now()).await {
                    error!("Expiry tagging run failed: {}", e);
                }
            })
        })?;
        self.scheduler.add(job).await?;
        info!(cron, "Registered expiry tagging trigger");
        Ok(())
    }

    pub async fn start(&self) -> Result<()> {
        self.scheduler.start().await?;
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<()> {
        self.scheduler.shutdown().await?;
        Ok(())
    }
}
