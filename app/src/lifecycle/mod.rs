//! Time-based tournament lifecycle.
//!
//! `scheduled -> starting-soon notice -> in progress -> tagged with a ttl ->
//! deleted`. Three independent actors move records along:
//!
//! - [`NotificationTrigger`] announces tournaments that are about to start.
//! - [`ExpiryTagger`] stamps `ttl = start_time + 2h` on started tournaments.
//! - [`CleanupAgent`] deletes records past their `ttl`, and directly deletes
//!   tournaments that were never tagged well after their start.
//!
//! None of them talk to each other. See [`crate::store`] for the field rules
//! that keep them from stepping on each other.

use chrono::TimeDelta;

mod cleanup;
mod expiry;
mod notify;
mod reader;

pub use cleanup::{CleanupAgent, CleanupTier};
pub use expiry::ExpiryTagger;
pub use notify::NotificationTrigger;
pub use reader::{derive_state, format_remaining};

/// The reader warns once less than this is left before deletion.
pub const WARNING_THRESHOLD: TimeDelta = TimeDelta::minutes(30);
