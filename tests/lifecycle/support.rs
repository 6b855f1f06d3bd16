use std::{
    collections::HashSet,
    time::Duration,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use app::{
    error::Result,
    notifier::{Notification, Notifier},
    store::{MemoryStore, TournamentStore, TtlUpdate},
};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use models::schemas::tournament::TournamentSchema;
use sea_orm::DbErr;

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap()
}

pub fn tournament(id: &str, start: DateTime<Utc>, host: Option<&str>) -> TournamentSchema {
    TournamentSchema::new(id.into(), format!("Cup {id}"), start, host.map(Into::into))
}

pub async fn seed(store: &dyn TournamentStore, tournaments: Vec<TournamentSchema>) {
    for t in tournaments {
        store.insert(t).await.expect("insert tournament");
    }
}

/// Remembers every message and fails for chosen addresses.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, Notification)>>,
    failing: Mutex<HashSet<String>>,
}

impl RecordingNotifier {
    pub fn fail_for(&self, address: &str) {
        self.failing.lock().unwrap().insert(address.to_string());
    }

    pub fn sent_to(&self) -> Vec<String> {
        let mut to: Vec<_> = self.sent.lock().unwrap().iter().map(|(a, _)| a.clone()).collect();
        to.sort();
        to
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, to: &str, notification: &Notification) -> anyhow::Result<()> {
        if self.failing.lock().unwrap().contains(to) {
            anyhow::bail!("mailbox {to} unavailable");
        }
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), notification.clone()));
        Ok(())
    }
}

/// Memory store whose batch commits can be made to fail and whose expiry
/// scans can be made slow.
#[derive(Clone, Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    fail_commits: Arc<AtomicBool>,
    expired_scan_delay: Arc<Mutex<Duration>>,
}

impl FlakyStore {
    pub fn fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    pub fn slow_expired_scans(&self, delay: Duration) {
        *self.expired_scan_delay.lock().unwrap() = delay;
    }
}

#[async_trait]
impl TournamentStore for FlakyStore {
    async fn insert(&self, tournament: TournamentSchema) -> Result<()> {
        self.inner.insert(tournament).await
    }

    async fn get(&self, id: &str) -> Result<Option<TournamentSchema>> {
        self.inner.get(id).await
    }

    async fn find_notification_candidates(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<TournamentSchema>> {
        self.inner.find_notification_candidates(from, to, limit).await
    }

    async fn mark_notification_sent(&self, id: &str) -> Result<bool> {
        self.inner.mark_notification_sent(id).await
    }

    async fn find_untagged_started(
        &self,
        now: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<TournamentSchema>> {
        self.inner.find_untagged_started(now, limit).await
    }

    async fn commit_ttl_batch(&self, updates: Vec<TtlUpdate>) -> Result<usize> {
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(DbErr::Custom("connection reset during commit".into()).into());
        }
        self.inner.commit_ttl_batch(updates).await
    }

    async fn find_expired(&self, now: DateTime<Utc>) -> Result<Vec<TournamentSchema>> {
        let delay = *self.expired_scan_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.inner.find_expired(now).await
    }

    async fn find_stale_untagged(&self, cutoff: DateTime<Utc>) -> Result<Vec<TournamentSchema>> {
        self.inner.find_stale_untagged(cutoff).await
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        self.inner.delete(id).await
    }
}
