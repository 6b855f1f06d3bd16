use async_trait::async_trait;
use chrono::{DateTime, Utc};
use models::schemas::tournament::TournamentSchema;

use super::{HostDirectory, TournamentStore, TtlUpdate};
use crate::{cache::Cache, error::Result};

/// In-process store. Each call takes the map lock once, so a ttl batch is
/// applied atomically with respect to every other caller.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tournaments: Cache<TournamentSchema>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tournaments.count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn select<F>(&self, keep: F, limit: Option<u64>) -> Vec<TournamentSchema>
    where
        F: Fn(&TournamentSchema) -> bool,
    {
        let mut rows: Vec<_> = self.tournaments.values().into_iter().filter(keep).collect();
        rows.sort_by(|a, b| a.start_time.cmp(&b.start_time).then_with(|| a.id.cmp(&b.id)));
        if let Some(limit) = limit {
            rows.truncate(limit as usize);
        }
        rows
    }
}

#[async_trait]
impl TournamentStore for MemoryStore {
    async fn insert(&self, tournament: TournamentSchema) -> Result<()> {
        let id = tournament.id.clone();
        self.tournaments.set_data(&id, tournament);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<TournamentSchema>> {
        Ok(self.tournaments.get_data(id))
    }

    async fn find_notification_candidates(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<TournamentSchema>> {
        Ok(self.select(
            |t| t.is_active() && !t.notification_sent && t.start_time >= from && t.start_time <= to,
            Some(limit),
        ))
    }

    async fn mark_notification_sent(&self, id: &str) -> Result<bool> {
        let changed = self.tournaments.update_data(id, |t| {
            let changed = !t.notification_sent;
            t.notification_sent = true;
            changed
        });
        Ok(changed.unwrap_or(false))
    }

    async fn find_untagged_started(
        &self,
        now: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<TournamentSchema>> {
        Ok(self.select(
            |t| t.is_active() && t.ttl.is_none() && t.start_time <= now,
            Some(limit),
        ))
    }

    async fn commit_ttl_batch(&self, updates: Vec<TtlUpdate>) -> Result<usize> {
        Ok(self.tournaments.with_entries(|entries| {
            let mut applied = 0;
            for update in updates {
                if let Some(t) = entries.get_mut(&update.id) {
                    if t.ttl.is_none() {
                        t.ttl = Some(update.ttl);
                        applied += 1;
                    }
                }
            }
            applied
        }))
    }

    async fn find_expired(&self, now: DateTime<Utc>) -> Result<Vec<TournamentSchema>> {
        Ok(self.select(|t| t.ttl.is_some_and(|ttl| ttl <= now), None))
    }

    async fn find_stale_untagged(&self, cutoff: DateTime<Utc>) -> Result<Vec<TournamentSchema>> {
        Ok(self.select(
            |t| t.is_active() && t.ttl.is_none() && t.start_time <= cutoff,
            None,
        ))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.tournaments.delete_data(id).is_some())
    }
}

/// Host id to contact address map.
#[derive(Clone, Default)]
pub struct MemoryDirectory {
    addresses: Cache<String>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, host_id: &str, address: &str) {
        self.addresses.set_data(host_id, address.to_string());
    }
}

#[async_trait]
impl HostDirectory for MemoryDirectory {
    async fn contact_address(&self, host_id: &str) -> anyhow::Result<Option<String>> {
        Ok(self.addresses.get_data(host_id))
    }
}
