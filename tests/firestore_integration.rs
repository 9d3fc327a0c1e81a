// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running.
//! Run with: FIRESTORE_EMULATOR_HOST=localhost:8181 cargo test --test firestore_integration
//!
//! Tests are skipped if FIRESTORE_EMULATOR_HOST is not set.

mod common;

use fitlog::db::{DocumentStore, FirestoreDb, UserCollection};
use fitlog::error::AppError;
use fitlog::models::{
    new_id, FolderDocument, FolderKind, LiftDay, RunEntry, User, WeightRecord,
};

fn unique_user() -> String {
    format!("test-user-{}", new_id())
}

fn run(name: &str) -> RunEntry {
    RunEntry {
        id: new_id(),
        date: "2024-05-01".to_string(),
        name: name.to_string(),
        distance: 5.0,
        pace: "5:00".to_string(),
        duration: "0:25:00".to_string(),
        heart_rate: Some(150),
        notes: String::new(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// OFFLINE CLIENT
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_offline_client_reports_database_error() {
    let db = FirestoreDb::new_mock();

    let err = db
        .list_folders("anyone", FolderKind::Run)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Database(_)));

    let err = db
        .delete_collection("anyone", UserCollection::WeightRecords)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Database(_)));
}

// ═══════════════════════════════════════════════════════════════════════════
// FOLDER TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_folder_roundtrip() {
    require_emulator!();
    let db = common::test_db().await;
    let user_id = unique_user();

    let folder = FolderDocument::new(
        FolderKind::Run,
        new_id(),
        "Road".to_string(),
        "2024-05-01T00:00:00Z".to_string(),
    );
    db.insert_folder(&user_id, &folder).await.unwrap();

    let listed = db.list_folders(&user_id, FolderKind::Run).await.unwrap();
    assert_eq!(listed, vec![folder.summary()]);
    assert!(db
        .list_folders(&user_id, FolderKind::Lift)
        .await
        .unwrap()
        .is_empty());

    let stored = db
        .get_run_folder(&user_id, folder.id())
        .await
        .unwrap()
        .expect("folder should exist");
    assert_eq!(stored.id, folder.id());
    assert_eq!(stored.revision, 0);

    db.delete_folder(&user_id, FolderKind::Run, folder.id())
        .await
        .unwrap();
    assert!(db
        .get_run_folder(&user_id, folder.id())
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_replace_runs_is_conditional() {
    require_emulator!();
    let db = common::test_db().await;
    let user_id = unique_user();

    let folder = FolderDocument::new(
        FolderKind::Run,
        new_id(),
        "Track".to_string(),
        "2024-05-01T00:00:00Z".to_string(),
    );
    db.insert_folder(&user_id, &folder).await.unwrap();

    let revision = db
        .replace_runs(&user_id, folder.id(), 0, &[run("A")])
        .await
        .unwrap();
    assert_eq!(revision, 1);

    let err = db
        .replace_runs(&user_id, folder.id(), 0, &[run("B")])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let stored = db.get_run_folder(&user_id, folder.id()).await.unwrap().unwrap();
    assert_eq!(stored.runs.len(), 1);
    assert_eq!(stored.runs[0].name, "A");
}

#[tokio::test]
async fn test_concurrent_replace_runs_one_wins() {
    require_emulator!();
    let db = common::test_db().await;
    let user_id = unique_user();

    let folder = FolderDocument::new(
        FolderKind::Run,
        new_id(),
        "Shared".to_string(),
        "2024-05-01T00:00:00Z".to_string(),
    );
    db.insert_folder(&user_id, &folder).await.unwrap();

    let left = [run("Left")];
    let right = [run("Right")];
    let (a, b) = tokio::join!(
        db.replace_runs(&user_id, folder.id(), 0, &left),
        db.replace_runs(&user_id, folder.id(), 0, &right),
    );

    let winner = match (&a, &b) {
        (Ok(1), Err(AppError::Conflict(msg))) if msg == AppError::STALE_REVISION => "Left",
        (Err(AppError::Conflict(msg)), Ok(1)) if msg == AppError::STALE_REVISION => "Right",
        other => panic!("expected one winner and one stale revision, got {:?}", other),
    };

    let stored = db.get_run_folder(&user_id, folder.id()).await.unwrap().unwrap();
    assert_eq!(stored.revision, 1);
    assert_eq!(stored.runs.len(), 1);
    assert_eq!(stored.runs[0].name, winner);
}

#[tokio::test]
async fn test_replace_lift_days_on_missing_folder() {
    require_emulator!();
    let db = common::test_db().await;
    let user_id = unique_user();

    let days = vec![LiftDay {
        date: "2024-05-01".to_string(),
        exercises: Vec::new(),
    }];
    let err = db
        .replace_lift_days(&user_id, "missing", 0, &days)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

// ═══════════════════════════════════════════════════════════════════════════
// WEIGHT / USER TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_weights_listed_by_date() {
    require_emulator!();
    let db = common::test_db().await;
    let user_id = unique_user();

    for (date, weight) in [("2024-02-01", 181.0), ("2024-01-01", 183.0)] {
        db.insert_weight(
            &user_id,
            &WeightRecord {
                id: new_id(),
                date: date.to_string(),
                weight,
            },
        )
        .await
        .unwrap();
    }

    let records = db.list_weights(&user_id).await.unwrap();
    let dates: Vec<&str> = records.iter().map(|r| r.date.as_str()).collect();
    assert_eq!(dates, vec!["2024-01-01", "2024-02-01"]);
    assert!(records.iter().all(|r| !r.id.is_empty()));
}

#[tokio::test]
async fn test_delete_collection_and_user() {
    require_emulator!();
    let db = common::test_db().await;
    let user_id = unique_user();

    db.upsert_user(&User {
        user_id: user_id.clone(),
        email: "purge@example.com".to_string(),
        first_name: String::new(),
        last_name: String::new(),
        created_at: "2024-05-01T00:00:00Z".to_string(),
        last_active: "2024-05-01T00:00:00Z".to_string(),
    })
    .await
    .unwrap();
    for name in ["One", "Two"] {
        let folder = FolderDocument::new(
            FolderKind::Lift,
            new_id(),
            name.to_string(),
            "2024-05-01T00:00:00Z".to_string(),
        );
        db.insert_folder(&user_id, &folder).await.unwrap();
    }

    let removed = db
        .delete_collection(&user_id, UserCollection::LiftFolders)
        .await
        .unwrap();
    assert_eq!(removed, 2);
    assert_eq!(
        db.delete_collection(&user_id, UserCollection::LiftFolders)
            .await
            .unwrap(),
        0
    );

    db.delete_user(&user_id).await.unwrap();
    assert!(db.get_user(&user_id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_collection_spans_batches() {
    require_emulator!();
    let db = common::test_db().await;
    let user_id = unique_user();

    for day in 0..450 {
        db.insert_weight(
            &user_id,
            &WeightRecord {
                id: new_id(),
                date: format!("2024-01-{:02}", day % 28 + 1),
                weight: 180.0,
            },
        )
        .await
        .unwrap();
    }

    let removed = db
        .delete_collection(&user_id, UserCollection::WeightRecords)
        .await
        .unwrap();
    assert_eq!(removed, 450);
    assert!(db.list_weights(&user_id).await.unwrap().is_empty());
}
