use sea_orm::DbErr;
use thiserror::Error;
use tokio_cron_scheduler::JobSchedulerError;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("store error: {0}")]
    Store(#[from] DbErr),

    #[error("notification failed: {0:#}")]
    Notify(anyhow::Error),

    #[error("host lookup failed: {0:#}")]
    Directory(anyhow::Error),

    #[error("unknown host: {0}")]
    UnknownHost(String),

    #[error("store call timed out")]
    Timeout,

    #[error("scheduler error: {0}")]
    Scheduler(#[from] JobSchedulerError),
}

pub type Result<T, E = LifecycleError> = std::result::Result<T, E>;
