//! Tile lifecycle tests against an in-memory SQLite store
//!
//! Time is driven by a manual clock so expiry can be simulated without sleeping.

use chrono::{Duration, TimeZone, Utc};
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};

use tileboard::{
    database::Database,
    errors::AppError,
    models::{TileUpsertRequest, UpsertAction},
    repositories::SqliteTileRepository,
    services::TileStore,
    utils::{Clock, ManualClock},
};

/// Helper to create a migrated store on a manual clock, keeping the database handle
async fn create_test_database_and_store() -> (Database, TileStore, ManualClock) {
    let database = Database::in_memory().await.expect("in-memory database");
    database.migrate().await.expect("Failed to run migrations");

    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap());
    let store = TileStore::new(
        Arc::new(SqliteTileRepository::new(&database)),
        Arc::new(clock.clone()),
    );
    (database, store, clock)
}

async fn create_test_store() -> (TileStore, ManualClock) {
    let (_database, store, clock) = create_test_database_and_store().await;
    (store, clock)
}

// =============================================================================
// UPSERT
// =============================================================================

#[tokio::test]
async fn test_upsert_new_tile_is_active_with_equal_timestamps() {
    let (store, _clock) = create_test_store().await;

    let outcome = assert_ok!(store.upsert(TileUpsertRequest::new("t1", "CPU", "85%")).await);
    assert_eq!(outcome.action, UpsertAction::Created);
    assert_eq!(outcome.tile_id, "t1");

    let tile = assert_ok!(store.get_by_id("t1").await);
    assert!(tile.is_active);
    assert_eq!(tile.created_at, tile.updated_at);
    assert_eq!(tile.expires_at, Some(tile.created_at + Duration::hours(24)));
}

#[tokio::test]
async fn test_second_upsert_updates_in_place() {
    let (store, clock) = create_test_store().await;

    assert_ok!(store.upsert(TileUpsertRequest::new("t1", "CPU", "85%")).await);
    let created = assert_ok!(store.get_by_id("t1").await);

    clock.advance(Duration::minutes(10));
    let outcome = assert_ok!(
        store
            .upsert(TileUpsertRequest::new("t1", "CPU load", "90%").with_status("warning"))
            .await
    );
    assert_eq!(outcome.action, UpsertAction::Updated);

    let updated = assert_ok!(store.get_by_id("t1").await);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > created.updated_at);
    assert_eq!(updated.title, "CPU load");
    assert_eq!(updated.value, "90%");
    assert_eq!(updated.status, "warning");
    assert_eq!(updated.expires_at, Some(updated.updated_at + Duration::hours(24)));

    assert_eq!(assert_ok!(store.get_active_tiles().await).len(), 1);
}

#[tokio::test]
async fn test_update_overwrites_omitted_fields_with_defaults() {
    let (store, clock) = create_test_store().await;

    assert_ok!(
        store
            .upsert(
                TileUpsertRequest::new("backup", "Backup", "running")
                    .with_status("warning")
                    .with_priority(5)
                    .with_progress(40.0, 200.0)
            )
            .await
    );

    clock.advance(Duration::minutes(1));
    assert_ok!(store.upsert(TileUpsertRequest::new("backup", "Backup", "done")).await);

    let tile = assert_ok!(store.get_by_id("backup").await);
    assert_eq!(tile.status, "info");
    assert_eq!(tile.priority, 50);
    assert_eq!(tile.current_value, 0.0);
    assert_eq!(tile.max_value, 100.0);
}

#[tokio::test]
async fn test_upsert_missing_required_fields_creates_nothing() {
    let (store, _clock) = create_test_store().await;

    let missing_title = TileUpsertRequest {
        tile_id: Some("t1".to_string()),
        value: Some("85%".to_string()),
        ..TileUpsertRequest::default()
    };
    let err = assert_err!(store.upsert(missing_title).await);
    assert!(err.is_validation());

    let empty_value = TileUpsertRequest::new("t1", "CPU", "");
    let err = assert_err!(store.upsert(empty_value).await);
    assert!(matches!(err, AppError::Validation { ref field, .. } if field == "value"));

    assert!(assert_ok!(store.get_active_tiles().await).is_empty());
    assert!(assert_err!(store.get_by_id("t1").await).is_not_found());
}

#[tokio::test]
async fn test_upsert_reactivates_removed_tile() {
    let (store, clock) = create_test_store().await;

    assert_ok!(store.upsert(TileUpsertRequest::new("t1", "CPU", "85%")).await);
    assert_ok!(store.remove("t1").await);

    clock.advance(Duration::minutes(5));
    let outcome = assert_ok!(store.upsert(TileUpsertRequest::new("t1", "CPU", "20%")).await);
    assert_eq!(outcome.action, UpsertAction::Updated);

    let tile = assert_ok!(store.get_by_id("t1").await);
    assert!(tile.is_active);
    assert_eq!(tile.value, "20%");
}

#[tokio::test]
async fn test_concurrent_upserts_converge_on_one_row() {
    let (store, _clock) = create_test_store().await;

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .upsert(TileUpsertRequest::new("shared", "Shared", format!("{}", i)))
                    .await
            })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        let outcome = assert_ok!(handle.await.expect("upsert task panicked"));
        if outcome.action == UpsertAction::Created {
            created += 1;
        }
    }

    assert_eq!(created, 1);
    assert_eq!(assert_ok!(store.get_active_tiles().await).len(), 1);
}

#[tokio::test]
async fn test_upsert_queued_behind_writer_stamps_time_after_acquiring_lock() {
    let (database, store, clock) = create_test_database_and_store().await;

    let write_lock = database.write_lock();
    let guard = write_lock.lock().await;

    let pending = tokio::spawn({
        let store = store.clone();
        async move { store.upsert(TileUpsertRequest::new("t1", "CPU", "85%")).await }
    });
    for _ in 0..5 {
        tokio::task::yield_now().await;
    }

    clock.advance(Duration::minutes(10));
    let released_at = clock.now();
    drop(guard);

    assert_ok!(pending.await.expect("upsert task panicked"));
    let tile = assert_ok!(store.get_by_id("t1").await);
    assert_eq!(tile.created_at, released_at);
    assert_eq!(tile.updated_at, released_at);
}

// =============================================================================
// READS AND REMOVAL
// =============================================================================

#[tokio::test]
async fn test_remove_unknown_tile_is_not_found() {
    let (store, _clock) = create_test_store().await;

    let err = assert_err!(store.remove("missing").await);
    assert!(matches!(err, AppError::NotFound { ref id, .. } if id == "missing"));
}

#[tokio::test]
async fn test_remove_twice_succeeds_and_hides_tile() {
    let (store, _clock) = create_test_store().await;
    assert_ok!(store.upsert(TileUpsertRequest::new("t1", "CPU", "85%")).await);
    assert_ok!(store.upsert(TileUpsertRequest::new("t2", "RAM", "40%")).await);

    let first = assert_ok!(store.remove("t1").await);
    assert!(first.removed);
    let second = assert_ok!(store.remove("t1").await);
    assert!(second.removed);

    assert!(assert_err!(store.get_by_id("t1").await).is_not_found());
    let active: Vec<String> = assert_ok!(store.get_active_tiles().await)
        .into_iter()
        .map(|tile| tile.tile_id)
        .collect();
    assert_eq!(active, vec!["t2"]);
}

#[tokio::test]
async fn test_expired_tile_stays_listed_until_swept() {
    let (store, clock) = create_test_store().await;
    assert_ok!(store.upsert(TileUpsertRequest::new("t1", "CPU", "85%")).await);

    clock.advance(Duration::hours(25));

    let listed = assert_ok!(store.get_active_tiles().await);
    assert_eq!(listed.len(), 1);
    assert!(listed[0].is_expired_at(clock.now()));
    assert_ok!(store.get_by_id("t1").await);
}

// =============================================================================
// SWEEP
// =============================================================================

#[tokio::test]
async fn test_sweep_deactivates_only_expired_auto_expiring_tiles() {
    let (store, clock) = create_test_store().await;

    assert_ok!(store.upsert(TileUpsertRequest::new("old", "Old", "1")).await);
    assert_ok!(
        store
            .upsert(TileUpsertRequest::new("pinned", "Pinned", "2").with_auto_expire(false))
            .await
    );

    clock.advance(Duration::hours(12));
    assert_ok!(store.upsert(TileUpsertRequest::new("fresh", "Fresh", "3")).await);

    clock.advance(Duration::hours(13));
    let outcome = assert_ok!(store.sweep().await);
    assert_eq!(outcome.expired_count, 1);

    assert!(assert_err!(store.get_by_id("old").await).is_not_found());
    assert_ok!(store.get_by_id("pinned").await);
    assert_ok!(store.get_by_id("fresh").await);

    let again = assert_ok!(store.sweep().await);
    assert_eq!(again.expired_count, 0);
}

#[tokio::test]
async fn test_sweep_on_clean_store_is_zero() {
    let (store, _clock) = create_test_store().await;
    assert_eq!(assert_ok!(store.sweep().await).expired_count, 0);
}

#[tokio::test]
async fn test_tile_exactly_at_expiry_is_not_swept() {
    let (store, clock) = create_test_store().await;
    assert_ok!(store.upsert(TileUpsertRequest::new("edge", "Edge", "0")).await);

    clock.advance(Duration::hours(24));
    assert_eq!(assert_ok!(store.sweep().await).expired_count, 0);

    clock.advance(Duration::microseconds(1));
    assert_eq!(assert_ok!(store.sweep().await).expired_count, 1);
}

#[tokio::test]
async fn test_refreshed_tile_survives_sweep() {
    let (store, clock) = create_test_store().await;
    assert_ok!(store.upsert(TileUpsertRequest::new("t1", "CPU", "85%")).await);

    clock.advance(Duration::hours(23));
    assert_ok!(store.upsert(TileUpsertRequest::new("t1", "CPU", "86%")).await);

    clock.advance(Duration::hours(2));
    assert_eq!(assert_ok!(store.sweep().await).expired_count, 0);
    assert_ok!(store.get_by_id("t1").await);
}

#[tokio::test]
async fn test_failed_upsert_and_sweep_leave_tile_unchanged() {
    let (database, store, clock) = create_test_database_and_store().await;
    assert_ok!(store.upsert(TileUpsertRequest::new("t1", "CPU", "85%")).await);
    let before = assert_ok!(store.get_by_id("t1").await);

    sqlx::query(
        "CREATE TRIGGER reject_tile_updates BEFORE UPDATE ON tiles \
         BEGIN SELECT RAISE(ABORT, 'tiles are read-only'); END",
    )
    .execute(&database.pool())
    .await
    .expect("create trigger");

    clock.advance(Duration::minutes(5));
    let err = assert_err!(store.upsert(TileUpsertRequest::new("t1", "CPU", "99%")).await);
    assert!(err.is_store());

    clock.advance(Duration::hours(25));
    let err = assert_err!(store.sweep().await);
    assert!(err.is_store());

    sqlx::query("DROP TRIGGER reject_tile_updates")
        .execute(&database.pool())
        .await
        .expect("drop trigger");

    let after = assert_ok!(store.get_by_id("t1").await);
    assert_eq!(after.value, "85%");
    assert_eq!(after.updated_at, before.updated_at);
    assert!(after.is_active);
    assert_eq!(after, before);
}

#[tokio::test]
async fn test_health_counts_active_tiles() {
    let (store, _clock) = create_test_store().await;
    assert_ok!(store.upsert(TileUpsertRequest::new("t1", "CPU", "85%")).await);
    assert_ok!(store.upsert(TileUpsertRequest::new("t2", "RAM", "40%")).await);
    assert_ok!(store.remove("t2").await);

    assert_eq!(assert_ok!(store.health().await).active_tiles, 1);
}

// =============================================================================
// SCENARIO
// =============================================================================

#[tokio::test]
async fn test_full_lifecycle_scenario() {
    let (store, clock) = create_test_store().await;

    let created = assert_ok!(store.upsert(TileUpsertRequest::new("t1", "CPU", "85%")).await);
    assert_eq!(created.action, UpsertAction::Created);
    assert!(assert_ok!(store.get_by_id("t1").await).is_active);

    clock.advance(Duration::seconds(30));
    let updated = assert_ok!(store.upsert(TileUpsertRequest::new("t1", "CPU", "90%")).await);
    assert_eq!(updated.action, UpsertAction::Updated);
    assert_eq!(updated.tile_id, "t1");
    assert_eq!(assert_ok!(store.get_by_id("t1").await).value, "90%");

    assert_eq!(assert_ok!(store.sweep().await).expired_count, 0);
    assert!(assert_ok!(store.get_by_id("t1").await).is_active);

    clock.advance(Duration::hours(24) + Duration::minutes(1));
    assert_eq!(assert_ok!(store.sweep().await).expired_count, 1);
    assert!(assert_err!(store.get_by_id("t1").await).is_not_found());
}
