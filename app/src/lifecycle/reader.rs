use chrono::{DateTime, TimeDelta, Utc};
use models::schemas::{
    lifecycle::{LifecyclePhase, LifecycleState},
    tournament::TournamentSchema,
};

use super::WARNING_THRESHOLD;

/// Derives where `tournament` is in its lifecycle at `now`.
///
/// Observation only: an `Expired` result is a deletion candidate, but removing
/// it is left to the cleanup agent.
pub fn derive_state(tournament: &TournamentSchema, now: DateTime<Utc>) -> LifecycleState {
    match tournament.ttl {
        None if now < tournament.start_time => LifecycleState {
            phase: LifecyclePhase::Scheduled,
            time_remaining: None,
            countdown: Some(format_remaining(tournament.start_time - now)),
            warning_message: None,
        },
        None => LifecycleState {
            phase: LifecyclePhase::InProgress,
            time_remaining: None,
            countdown: None,
            warning_message: None,
        },
        Some(ttl) if now < ttl => {
            let remaining = ttl - now;
            let countdown = format_remaining(remaining);
            let warning_message = (remaining < WARNING_THRESHOLD)
                .then(|| format!("This tournament will be deleted in {countdown}"));
            LifecycleState {
                phase: LifecyclePhase::Expiring,
                time_remaining: Some(remaining),
                countdown: Some(countdown),
                warning_message,
            }
        }
        Some(_) => LifecycleState {
            phase: LifecyclePhase::Expired,
            time_remaining: None,
            countdown: None,
            warning_message: None,
        },
    }
}

/// Whole hours, minutes and seconds, rounded down, without zero leading units.
///
/// `1h 0m 5s`, `4m 10s`, `9s`. Anything under a second reads `0s`.
pub fn format_remaining(remaining: TimeDelta) -> String {
    let total = remaining.num_seconds().max(0);
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);

    if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}
