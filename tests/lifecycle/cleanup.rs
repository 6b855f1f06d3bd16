use std::{sync::Arc, time::Duration};

use app::{
    clock::ManualClock,
    config::LifecycleConfig,
    lifecycle::{CleanupAgent, CleanupTier},
    store::{MemoryStore, TournamentStore},
};
use chrono::TimeDelta;

use crate::support::{FlakyStore, now, seed, tournament};

fn agent(store: &MemoryStore, clock: &Arc<ManualClock>) -> CleanupAgent {
    CleanupAgent::new(
        Arc::new(store.clone()),
        clock.clone(),
        LifecycleConfig::default(),
    )
}

fn tagged(id: &str, ttl: chrono::DateTime<chrono::Utc>) -> models::schemas::tournament::TournamentSchema {
    let mut t = tournament(id, ttl - TimeDelta::hours(2), None);
    t.ttl = Some(ttl);
    t
}

#[tokio::test]
async fn manual_pass_deletes_expired_and_reports_count() {
    let store = MemoryStore::new();
    let clock = Arc::new(ManualClock::new(now()));
    seed(
        &store,
        vec![
            tagged("expired", now() - TimeDelta::seconds(1)),
            tagged("on-the-dot", now()),
            tagged("alive", now() + TimeDelta::minutes(10)),
        ],
    )
    .await;
    let agent = agent(&store, &clock);

    let outcome = agent.delete_expired_tournaments().await;

    assert!(outcome.success);
    assert_eq!(outcome.deleted_count, 2);
    assert_eq!(outcome.message.as_deref(), Some("Deleted 2 expired tournaments"));
    assert!(store.get("expired").await.unwrap().is_none());
    assert!(store.get("alive").await.unwrap().is_some());
}

#[tokio::test]
async fn second_pass_succeeds_with_nothing_to_do() {
    let store = MemoryStore::new();
    let clock = Arc::new(ManualClock::new(now()));
    seed(&store, vec![tagged("expired", now() - TimeDelta::seconds(1))]).await;
    let agent = agent(&store, &clock);

    assert_eq!(agent.delete_expired_tournaments().await.deleted_count, 1);
    let again = agent.delete_expired_tournaments().await;

    assert!(again.success);
    assert_eq!(again.deleted_count, 0);
    assert_eq!(again.message.as_deref(), Some("No expired tournaments found"));
}

#[tokio::test]
async fn concurrent_agents_delete_each_record_once() {
    let store = MemoryStore::new();
    let clock = Arc::new(ManualClock::new(now()));
    seed(
        &store,
        vec![
            tagged("a", now() - TimeDelta::seconds(5)),
            tagged("b", now() - TimeDelta::seconds(5)),
        ],
    )
    .await;
    let first = agent(&store, &clock);
    let second = agent(&store, &clock);

    let (x, y) = tokio::join!(
        first.delete_expired_tournaments(),
        second.delete_expired_tournaments()
    );

    assert!(x.success && y.success);
    assert_eq!(x.deleted_count + y.deleted_count, 2);
    assert!(store.is_empty());
}

#[tokio::test]
async fn backstop_removes_stale_untagged_tournaments() {
    let store = MemoryStore::new();
    let clock = Arc::new(ManualClock::new(now()));
    seed(
        &store,
        vec![
            tournament("stale", now() - TimeDelta::hours(3), None),
            tournament("recent", now() - TimeDelta::minutes(30), None),
        ],
    )
    .await;
    let agent = agent(&store, &clock);

    // The regular pass only looks at ttl.
    assert_eq!(agent.delete_expired_tournaments().await.deleted_count, 0);

    assert_eq!(agent.run_backstop().await.unwrap(), 1);
    assert!(store.get("stale").await.unwrap().is_none());
    assert!(store.get("recent").await.unwrap().is_some());
}

#[tokio::test]
async fn probe_reports_without_deleting() {
    let store = MemoryStore::new();
    let clock = Arc::new(ManualClock::new(now()));
    seed(
        &store,
        vec![
            tagged("expired", now() - TimeDelta::minutes(1)),
            tournament("stale", now() - TimeDelta::hours(3), None),
            tournament("upcoming", now() + TimeDelta::hours(1), None),
        ],
    )
    .await;
    let agent = agent(&store, &clock);

    let probe = agent.check_for_expired_tournaments().await.unwrap();

    assert_eq!(probe.expired, ["expired"]);
    assert_eq!(probe.stale_untagged, ["stale"]);
    assert_eq!(store.len(), 3);
}

#[tokio::test]
async fn initialize_and_tiers_are_idempotent() {
    let store = MemoryStore::new();
    let clock = Arc::new(ManualClock::new(now()));
    let agent = agent(&store, &clock);

    assert!(!agent.is_initialized());
    assert!(agent.initialize_cleanup());
    assert!(!agent.initialize_cleanup());
    assert_eq!(agent.running_tiers(), [CleanupTier::Normal]);

    assert!(agent.start_aggressive_cleanup());
    assert!(!agent.start_aggressive_cleanup());
    assert!(agent.start_ultra_aggressive_cleanup());
    assert_eq!(
        agent.running_tiers(),
        [
            CleanupTier::Normal,
            CleanupTier::Aggressive,
            CleanupTier::UltraAggressive
        ]
    );

    agent.stop();
    assert!(!agent.is_initialized());
    assert!(agent.running_tiers().is_empty());
    assert!(agent.initialize_cleanup());
}

#[tokio::test(start_paused = true)]
async fn normal_poller_sweeps_on_every_tick() {
    let store = MemoryStore::new();
    let clock = Arc::new(ManualClock::new(now()));
    seed(&store, vec![tagged("first", now() - TimeDelta::seconds(1))]).await;
    let agent = agent(&store, &clock);

    agent.initialize_cleanup();
    // The first tick fires immediately.
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(store.get("first").await.unwrap().is_none());

    seed(&store, vec![tagged("second", now() + TimeDelta::minutes(4))]).await;
    clock.advance(TimeDelta::minutes(5));
    tokio::time::sleep(Duration::from_secs(300)).await;
    assert!(store.is_empty());

    agent.stop();
}

#[tokio::test(start_paused = true)]
async fn stopped_agent_no_longer_sweeps() {
    let store = MemoryStore::new();
    let clock = Arc::new(ManualClock::new(now()));
    let agent = agent(&store, &clock);

    agent.initialize_cleanup();
    tokio::time::sleep(Duration::from_millis(10)).await;
    agent.stop();

    seed(&store, vec![tagged("late", now() - TimeDelta::seconds(1))]).await;
    tokio::time::sleep(Duration::from_secs(3600)).await;

    assert_eq!(store.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn slow_sweep_is_abandoned_before_the_next_tick() {
    let store = FlakyStore::default();
    let clock = Arc::new(ManualClock::new(now()));
    seed(&store, vec![tagged("expired", now() - TimeDelta::seconds(1))]).await;
    // Longer than half the 300 s normal period, shorter than the period.
    store.slow_expired_scans(Duration::from_secs(200));
    let agent = CleanupAgent::new(
        Arc::new(store.clone()),
        clock.clone(),
        LifecycleConfig::default(),
    );

    agent.initialize_cleanup();
    tokio::time::sleep(Duration::from_secs(250)).await;

    assert_eq!(store.inner.len(), 1);
    agent.stop();
}
