use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domains::{sea_orm_active_enums::TournamentStatus, tournaments};

/// Store-agnostic view of a tournament record.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TournamentSchema {
    pub id: String,
    pub title: String,
    pub status: TournamentStatus,
    pub start_time: DateTime<Utc>,
    pub ttl: Option<DateTime<Utc>>,
    pub notification_sent: bool,
    pub host_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TournamentSchema {
    /// A freshly created tournament: active, untagged and not yet announced.
    pub fn new(id: String, title: String, start_time: DateTime<Utc>, host_id: Option<String>) -> Self {
        Self {
            id,
            title,
            status: TournamentStatus::Active,
            start_time,
            ttl: None,
            notification_sent: false,
            host_id,
            created_at: Utc::now(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == TournamentStatus::Active
    }
}

impl From<tournaments::Model> for TournamentSchema {
    fn from(tournament: tournaments::Model) -> Self {
        Self {
            id: tournament.id,
            title: tournament.title,
            status: tournament.status,
            start_time: tournament.start_time.to_utc(),
            ttl: tournament.ttl.map(|v| v.to_utc()),
            notification_sent: tournament.notification_sent,
            host_id: tournament.host_id,
            created_at: tournament.created_at.to_utc(),
        }
    }
}

impl From<TournamentSchema> for tournaments::Model {
    fn from(tournament: TournamentSchema) -> Self {
        Self {
            id: tournament.id,
            title: tournament.title,
            status: tournament.status,
            start_time: tournament.start_time.fixed_offset(),
            ttl: tournament.ttl.map(|v| v.fixed_offset()),
            notification_sent: tournament.notification_sent,
            host_id: tournament.host_id,
            created_at: tournament.created_at.fixed_offset(),
        }
    }
}
