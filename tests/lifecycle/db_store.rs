use app::{
    error::LifecycleError,
    persistence::tournaments::create_tournament,
    store::{DbStore, HostDirectory, TournamentStore, TtlUpdate},
};
use chrono::{TimeDelta, Utc};
use models::{domains::users, params::tournament::CreateTournamentParams};
use sea_orm::{ConnectionTrait, EntityTrait, Set};
use utils::testing::setup_test_db;

use crate::support::{now, seed, tournament};

async fn store() -> DbStore {
    let conn = setup_test_db("sqlite::memory:")
        .await
        .expect("Failed to set up test db");
    DbStore::new(conn)
}

async fn add_user(store: &DbStore, id: &str, email: Option<&str>) {
    let user = users::ActiveModel {
        id: Set(id.to_string()),
        username: Set(format!("user-{id}")),
        email: Set(email.map(Into::into)),
        created_at: Set(Utc::now().fixed_offset()),
    };
    users::Entity::insert(user)
        .exec_without_returning(store.conn())
        .await
        .expect("insert user");
}

#[tokio::test]
async fn insert_and_get_round_trip_the_lifecycle_fields() {
    let store = store().await;
    add_user(&store, "host", Some("host@example.com")).await;
    let start = now() + TimeDelta::minutes(20);
    seed(&store, vec![tournament("t", start, Some("host"))]).await;

    let t = store.get("t").await.unwrap().unwrap();

    assert_eq!(t.start_time, start);
    assert_eq!(t.ttl, None);
    assert!(!t.notification_sent);
    assert_eq!(t.host_id.as_deref(), Some("host"));
    assert!(store.get("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn candidates_and_flag_follow_the_window() {
    let store = store().await;
    seed(
        &store,
        vec![
            tournament("in", now() + TimeDelta::seconds(10), None),
            tournament("out", now() + TimeDelta::seconds(40), None),
        ],
    )
    .await;
    let to = now() + TimeDelta::seconds(30);

    let rows = store.find_notification_candidates(now(), to, 50).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, "in");

    assert!(store.mark_notification_sent("in").await.unwrap());
    assert!(!store.mark_notification_sent("in").await.unwrap());
    let rows = store.find_notification_candidates(now(), to, 50).await.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn ttl_batch_only_fills_empty_deadlines() {
    let store = store().await;
    let start = now() - TimeDelta::minutes(5);
    seed(
        &store,
        vec![
            tournament("a", start, None),
            tournament("b", start, None),
            tournament("upcoming", now() + TimeDelta::hours(1), None),
        ],
    )
    .await;

    let untagged = store.find_untagged_started(now(), 100).await.unwrap();
    let ids: Vec<_> = untagged.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, ["a", "b"]);

    let ttl = start + TimeDelta::hours(2);
    let applied = store
        .commit_ttl_batch(vec![TtlUpdate { id: "a".into(), ttl }])
        .await
        .unwrap();
    assert_eq!(applied, 1);

    let rewrite = store
        .commit_ttl_batch(vec![
            TtlUpdate { id: "a".into(), ttl: now() },
            TtlUpdate { id: "b".into(), ttl },
            TtlUpdate { id: "gone".into(), ttl },
        ])
        .await
        .unwrap();
    assert_eq!(rewrite, 1);
    assert_eq!(store.get("a").await.unwrap().unwrap().ttl, Some(ttl));
    assert_eq!(store.get("b").await.unwrap().unwrap().ttl, Some(ttl));
}

#[tokio::test]
async fn expired_and_stale_queries_and_idempotent_delete() {
    let store = store().await;
    let mut expired = tournament("expired", now() - TimeDelta::hours(2), None);
    expired.ttl = Some(now() - TimeDelta::seconds(1));
    seed(
        &store,
        vec![expired, tournament("stale", now() - TimeDelta::hours(3), None)],
    )
    .await;

    let expired = store.find_expired(now()).await.unwrap();
    assert_eq!(expired.len(), 1);
    assert_eq!(expired[0].id, "expired");

    let stale = store
        .find_stale_untagged(now() - TimeDelta::hours(2))
        .await
        .unwrap();
    assert_eq!(stale.len(), 1);
    assert_eq!(stale[0].id, "stale");

    assert!(store.delete("expired").await.unwrap());
    assert!(!store.delete("expired").await.unwrap());
}

#[tokio::test]
async fn directory_reads_host_email() {
    let store = store().await;
    add_user(&store, "with-mail", Some("host@example.com")).await;
    add_user(&store, "blank", Some("  ")).await;
    add_user(&store, "silent", None).await;

    assert_eq!(
        store.contact_address("with-mail").await.unwrap().as_deref(),
        Some("host@example.com")
    );
    assert_eq!(store.contact_address("blank").await.unwrap(), None);
    assert_eq!(store.contact_address("silent").await.unwrap(), None);
    assert_eq!(store.contact_address("nobody").await.unwrap(), None);
}

#[tokio::test]
async fn ttl_batch_failing_midway_writes_nothing() {
    let store = store().await;
    let start = now() - TimeDelta::minutes(5);
    seed(
        &store,
        vec![tournament("a", start, None), tournament("b", start, None)],
    )
    .await;
    store
        .conn()
        .execute_unprepared(
            "CREATE TRIGGER reject_b BEFORE UPDATE ON tournaments \
             WHEN NEW.id = 'b' BEGIN SELECT RAISE(ABORT, 'rejected'); END",
        )
        .await
        .unwrap();

    let ttl = start + TimeDelta::hours(2);
    let result = store
        .commit_ttl_batch(vec![
            TtlUpdate { id: "a".into(), ttl },
            TtlUpdate { id: "b".into(), ttl },
        ])
        .await;

    assert!(result.is_err());
    assert_eq!(store.get("a").await.unwrap().unwrap().ttl, None);
    assert_eq!(store.get("b").await.unwrap().unwrap().ttl, None);
}

#[tokio::test]
async fn creating_for_unknown_host_is_rejected() {
    let store = store().await;
    add_user(&store, "host", Some("host@example.com")).await;
    let params = |host: &str| CreateTournamentParams {
        title: "Night Cup".into(),
        start_time: (now() + TimeDelta::minutes(20)).fixed_offset(),
        host_id: Some(host.into()),
    };

    let err = create_tournament(&store, params("ghost")).await.unwrap_err();
    assert!(matches!(err, LifecycleError::UnknownHost(ref host) if host == "ghost"));

    let created = create_tournament(&store, params("host")).await.unwrap();
    assert!(store.get(&created.id).await.unwrap().is_some());
}
