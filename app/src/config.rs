use anyhow::{Context, Result};
use chrono::TimeDelta;
use lettre::{AsyncSmtpTransport, Tokio1Executor, transport::smtp::authentication::Credentials};
use std::{ops::Deref, str::FromStr, sync::Arc, time::Duration};

pub struct ConfigInner {
    pub db_url: String,
    pub host: String,
    pub port: u16,
    pub emailer: String,
    pub transponder: AsyncSmtpTransport<Tokio1Executor>,
    pub lifecycle: LifecycleConfig,
}

#[derive(Clone)]
pub struct Config(Arc<ConfigInner>);

fn required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("{key} is not set in .env file"))
}

fn parsed<T>(key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    required(key)?
        .parse()
        .with_context(|| format!("{key} is not a valid value"))
}

fn optional<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{key} is not a valid value")),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Config> {
        let transponder = AsyncSmtpTransport::<Tokio1Executor>::relay(&required("SMTP_HOST")?)
            .context("Failed to create SMTP transport")?
            .port(parsed("SMTP_PORT")?)
            .credentials(Credentials::new(required("SMTP_USER")?, required("SMTP_PASS")?))
            .build();

        let v = ConfigInner {
            db_url: required("DATABASE_URL")?,
            host: required("HOST")?,
            port: parsed("PORT")?,
            emailer: required("EMAILER")?,
            transponder,
            lifecycle: LifecycleConfig::from_env()?,
        };

        Ok(Self(Arc::new(v)))
    }

    pub fn get_server_url(&self) -> String {
        format!("{}:{}", self.0.host, self.0.port)
    }
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Timing and batch knobs for the lifecycle jobs.
#[derive(Clone, Debug)]
pub struct LifecycleConfig {
    /// Six-field cron expression (with seconds) driving both server triggers.
    pub trigger_cron: String,
    /// How far ahead of `start_time` the "starting soon" notice goes out.
    pub notify_lead: TimeDelta,
    /// Trailing slack on the notification window to absorb tick jitter.
    pub notify_buffer: TimeDelta,
    pub notify_batch: u64,
    pub tag_batch: u64,
    /// Deletion deadline offset from `start_time`.
    pub ttl_after_start: TimeDelta,
    pub cleanup_interval: Duration,
    pub aggressive_interval: Duration,
    pub ultra_interval: Duration,
    pub backstop_interval: Duration,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            trigger_cron: "0 0/5 * * * *".to_string(),
            notify_lead: TimeDelta::minutes(20),
            notify_buffer: TimeDelta::seconds(30),
            notify_batch: 50,
            tag_batch: 100,
            ttl_after_start: TimeDelta::hours(2),
            cleanup_interval: Duration::from_secs(300),
            aggressive_interval: Duration::from_secs(60),
            ultra_interval: Duration::from_secs(15),
            backstop_interval: Duration::from_secs(1800),
        }
    }
}

impl LifecycleConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let secs = |key: &str, default: Duration| -> Result<Duration> {
            match optional(key, default.as_secs())? {
                0 => anyhow::bail!("{key} must be greater than zero"),
                secs => Ok(Duration::from_secs(secs)),
            }
        };

        Ok(Self {
            trigger_cron: optional("TRIGGER_CRON", defaults.trigger_cron.clone())?,
            cleanup_interval: secs("CLEANUP_INTERVAL_SECS", defaults.cleanup_interval)?,
            aggressive_interval: secs("CLEANUP_AGGRESSIVE_SECS", defaults.aggressive_interval)?,
            ultra_interval: secs("CLEANUP_ULTRA_SECS", defaults.ultra_interval)?,
            backstop_interval: secs("BACKSTOP_INTERVAL_SECS", defaults.backstop_interval)?,
            ..defaults
        })
    }
}
