use chrono::TimeDelta;
use serde::{Serialize, Serializer};

/// Derived, never stored.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LifecyclePhase {
    Scheduled,
    InProgress,
    Expiring,
    Expired,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleState {
    pub phase: LifecyclePhase,
    #[serde(serialize_with = "serialize_seconds")]
    pub time_remaining: Option<TimeDelta>,
    pub countdown: Option<String>,
    pub warning_message: Option<String>,
}

fn serialize_seconds<S: Serializer>(value: &Option<TimeDelta>, s: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(delta) => s.serialize_some(&delta.num_seconds()),
        None => s.serialize_none(),
    }
}

/// Outcome of a single trigger run, reported to the operational log.
#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub matched: usize,
    pub applied: usize,
    pub skipped: usize,
    pub errors: usize,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CleanupOutcome {
    pub success: bool,
    pub deleted_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CleanupOutcome {
    pub fn deleted(deleted_count: usize) -> Self {
        let message = match deleted_count {
            0 => "No expired tournaments found".to_string(),
            1 => "Deleted 1 expired tournament".to_string(),
            n => format!("Deleted {n} expired tournaments"),
        };
        Self {
            success: true,
            deleted_count,
            message: Some(message),
            error: None,
        }
    }

    pub fn failed(deleted_count: usize, error: String) -> Self {
        Self {
            success: false,
            deleted_count,
            message: None,
            error: Some(error),
        }
    }
}

/// Read-only view of what a cleanup pass would remove.
#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExpiryProbe {
    /// Past their ttl.
    pub expired: Vec<String>,
    /// Started long ago but never given a ttl.
    pub stale_untagged: Vec<String>,
}
