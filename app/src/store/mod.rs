//! The tournament store and the host directory seams.
//!
//! The store is the only thing the lifecycle jobs share. There are no locks
//! and no leader: every writer filters on the field it is about to set, which
//! is what makes overlapping runs safe.
//!
//! - `notification_sent` only ever goes `false -> true`
//!   ([`TournamentStore::mark_notification_sent`] filters on `false`).
//! - `ttl` is written once, while it is still null
//!   ([`TournamentStore::commit_ttl_batch`] filters on `IS NULL`), so the
//!   deadline never moves and there is never more than one.
//! - Deletes are idempotent: removing a missing id reports `false`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use models::schemas::tournament::TournamentSchema;

use crate::error::Result;

mod db;
mod memory;

pub use db::DbStore;
pub use memory::{MemoryDirectory, MemoryStore};

/// A staged deadline for one tournament.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TtlUpdate {
    pub id: String,
    pub ttl: DateTime<Utc>,
}

#[async_trait]
pub trait TournamentStore: Send + Sync {
    async fn insert(&self, tournament: TournamentSchema) -> Result<()>;

    async fn get(&self, id: &str) -> Result<Option<TournamentSchema>>;

    /// Active, unannounced tournaments with `start_time` in `[from, to]`.
    async fn find_notification_candidates(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<TournamentSchema>>;

    /// Returns `false` when the flag was already set or the record is gone.
    async fn mark_notification_sent(&self, id: &str) -> Result<bool>;

    /// Active tournaments that have started but carry no `ttl` yet.
    async fn find_untagged_started(
        &self,
        now: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<TournamentSchema>>;

    /// All-or-nothing. Rows that already have a `ttl` are left alone; returns
    /// the number of rows that took the new deadline.
    async fn commit_ttl_batch(&self, updates: Vec<TtlUpdate>) -> Result<usize>;

    /// Tournaments whose `ttl` is set and not after `now`.
    async fn find_expired(&self, now: DateTime<Utc>) -> Result<Vec<TournamentSchema>>;

    /// Active tournaments that started at or before `cutoff` and were never tagged.
    async fn find_stale_untagged(&self, cutoff: DateTime<Utc>) -> Result<Vec<TournamentSchema>>;

    /// Returns `false` when there was nothing to delete.
    async fn delete(&self, id: &str) -> Result<bool>;
}

/// Resolves a host id to a contact address.
#[async_trait]
pub trait HostDirectory: Send + Sync {
    async fn contact_address(&self, host_id: &str) -> anyhow::Result<Option<String>>;
}
