//! Integration tests for the version guard against the real migrated
//! schema: success bumps by exactly 1, stale writes conflict and leave
//! the row untouched, and two real threads racing from the same observed
//! version produce exactly one winner.

use std::sync::Arc;

use gapcert_core::errors::StorageError;
use gapcert_core::types::FarmData;
use gapcert_storage::connection::writer::with_immediate_transaction;
use gapcert_storage::connection::DatabaseManager;
use gapcert_storage::queries::farms;
use gapcert_storage::{now_epoch, versioned};

fn farm_data(village: &str) -> FarmData {
    FarmData {
        village_name: village.to_string(),
        moo: Some("4".to_string()),
        road: None,
        alley: None,
        subdistrict: "Na Bon".to_string(),
        district: "Na Bon".to_string(),
        province: "Nakhon Si Thammarat".to_string(),
    }
}

fn setup() -> (DatabaseManager, i64) {
    let db = DatabaseManager::open_in_memory().unwrap();
    let id = db
        .with_writer(|conn| farms::insert(conn, 1, &farm_data("Ban Nong"), now_epoch()))
        .unwrap();
    (db, id)
}

#[test]
fn successful_update_bumps_version_by_exactly_one() {
    let (db, id) = setup();
    db.with_writer(|conn| {
        with_immediate_transaction(conn, |tx| {
            farms::update(tx, id, &farm_data("Ban Mai"), 1, now_epoch())
        })
    })
    .unwrap();

    let farm = db.with_writer(|conn| farms::get(conn, id)).unwrap();
    assert_eq!(farm.version, 2);
    assert_eq!(farm.village_name, "Ban Mai");
}

#[test]
fn stale_version_conflicts_and_leaves_row_unchanged() {
    let (db, id) = setup();
    db.with_writer(|conn| {
        with_immediate_transaction(conn, |tx| {
            farms::update(tx, id, &farm_data("Ban Mai"), 1, now_epoch())
        })
    })
    .unwrap();

    // A stale client still holding version 1 resubmits.
    let err = db
        .with_writer(|conn| {
            with_immediate_transaction(conn, |tx| {
                farms::update(tx, id, &farm_data("Ban Klang"), 1, now_epoch())
            })
        })
        .unwrap_err();
    assert!(matches!(err, StorageError::VersionConflict { .. }));

    // The losing write must not have touched any field.
    let farm = db.with_writer(|conn| farms::get(conn, id)).unwrap();
    assert_eq!(farm.version, 2);
    assert_eq!(farm.village_name, "Ban Mai");
}

#[test]
fn unknown_id_is_not_found_not_conflict() {
    let (db, _) = setup();
    let err = db
        .with_writer(|conn| {
            with_immediate_transaction(conn, |tx| {
                farms::update(tx, 999, &farm_data("Ban Mai"), 1, now_epoch())
            })
        })
        .unwrap_err();
    assert!(matches!(
        err,
        StorageError::NotFound { table: "rubber_farms", id: 999 }
    ));
}

#[test]
fn concurrent_writers_from_same_version_have_one_winner() {
    // File-backed database so both threads share it through the manager.
    let dir = tempfile::tempdir().unwrap();
    let db = Arc::new(DatabaseManager::open(&dir.path().join("race.db")).unwrap());
    let id = db
        .with_writer(|conn| farms::insert(conn, 1, &farm_data("Ban Nong"), now_epoch()))
        .unwrap();

    let mut handles = Vec::new();
    for n in 0..2 {
        let db = Arc::clone(&db);
        handles.push(std::thread::spawn(move || {
            db.with_writer(|conn| {
                with_immediate_transaction(conn, |tx| {
                    farms::update(tx, id, &farm_data(&format!("Writer {n}")), 1, now_epoch())
                })
            })
        }));
    }

    let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let wins = outcomes.iter().filter(|r| r.is_ok()).count();
    let conflicts = outcomes
        .iter()
        .filter(|r| matches!(r, Err(StorageError::VersionConflict { .. })))
        .count();
    assert_eq!(wins, 1, "exactly one writer must win");
    assert_eq!(conflicts, 1, "the loser must see a version conflict");

    let farm = db.with_writer(|conn| farms::get(conn, id)).unwrap();
    assert_eq!(farm.version, 2);
}

#[test]
fn ensure_version_matches_guarded_update_semantics() {
    let (db, id) = setup();
    db.with_writer(|conn| {
        assert!(versioned::ensure_version(conn, "rubber_farms", id, 1).is_ok());
        assert!(matches!(
            versioned::ensure_version(conn, "rubber_farms", id, 3),
            Err(StorageError::VersionConflict { .. })
        ));
        Ok::<_, StorageError>(())
    })
    .unwrap();
}
