//! Tests for version history: snapshot creation, retention pruning, and
//! restore semantics.

use crate::test_fixtures::TestDatabase;
use crate::{CreateNoteRequest, Error, UpdateNoteRequest, RETENTION_LIMIT};
use uuid::Uuid;

fn initial_note() -> CreateNoteRequest {
    CreateNoteRequest {
        title: "v1".to_string(),
        content: "first".to_string(),
        tags: None,
    }
}

/// Applies `n` titled updates, snapshotting the pre-update state each time
/// the way the API layer does.
async fn update_n_times(test_db: &TestDatabase, note_id: Uuid, user_id: Uuid, n: usize) {
    for i in 0..n {
        let update = test_db
            .db
            .notes
            .update(
                note_id,
                user_id,
                UpdateNoteRequest {
                    title: Some(format!("v{}", i + 2)),
                    ..Default::default()
                },
            )
            .await
            .expect("update note");
        test_db
            .db
            .versions
            .snapshot_and_prune(&update.before)
            .await
            .expect("snapshot");
    }
}

#[tokio::test]
#[ignore] // requires a provisioned DATABASE_URL
async fn test_each_update_bumps_version_and_adds_snapshot() {
    let test_db = TestDatabase::new().await;
    let user = test_db.create_user("bump").await;

    let note = test_db
        .db
        .notes
        .insert(user.id, initial_note())
        .await
        .expect("insert note");

    update_n_times(&test_db, note.id, user.id, 3).await;

    let current = test_db
        .db
        .notes
        .fetch_owned(note.id, user.id)
        .await
        .expect("fetch note");
    assert_eq!(current.version, 4);

    let versions = test_db
        .db
        .versions
        .list_for_note(note.id)
        .await
        .expect("list versions");
    assert_eq!(versions.len(), 3);
    // Snapshots record the pre-update state: versions 1 through 3.
    let mut recorded: Vec<i32> = versions.iter().map(|v| v.version).collect();
    recorded.sort_unstable();
    assert_eq!(recorded, vec![1, 2, 3]);

    test_db.cleanup(user.id).await;
}

#[tokio::test]
#[ignore] // requires a provisioned DATABASE_URL
async fn test_retention_evicts_oldest_beyond_limit() {
    let test_db = TestDatabase::new().await;
    let user = test_db.create_user("retention").await;

    let note = test_db
        .db
        .notes
        .insert(user.id, initial_note())
        .await
        .expect("insert note");

    // 14 updates produce 14 snapshots; only the newest 10 survive.
    update_n_times(&test_db, note.id, user.id, 14).await;

    let versions = test_db
        .db
        .versions
        .list_for_note(note.id)
        .await
        .expect("list versions");
    assert_eq!(versions.len() as i64, RETENTION_LIMIT);

    let mut recorded: Vec<i32> = versions.iter().map(|v| v.version).collect();
    recorded.sort_unstable();
    assert_eq!(recorded, (5..=14).collect::<Vec<i32>>());

    test_db.cleanup(user.id).await;
}

#[tokio::test]
#[ignore] // requires a provisioned DATABASE_URL
async fn test_restore_rewinds_note_and_consumes_snapshot() {
    let test_db = TestDatabase::new().await;
    let user = test_db.create_user("restore").await;

    let note = test_db
        .db
        .notes
        .insert(user.id, initial_note())
        .await
        .expect("insert note");

    update_n_times(&test_db, note.id, user.id, 12).await;

    let versions = test_db
        .db
        .versions
        .list_for_note(note.id)
        .await
        .expect("list versions");
    assert_eq!(versions.len(), 10);

    let target = versions
        .iter()
        .find(|v| v.version == 5)
        .expect("version 5 retained")
        .clone();

    let restored = test_db
        .db
        .versions
        .restore(target.id, user.id)
        .await
        .expect("restore");
    assert_eq!(restored.version, 5);
    assert_eq!(restored.title, target.title);
    assert_eq!(restored.content, target.content);

    let current = test_db
        .db
        .notes
        .fetch_owned(note.id, user.id)
        .await
        .expect("fetch note");
    assert_eq!(current.version, 5);

    // The consumed snapshot is gone; nine remain.
    let remaining = test_db
        .db
        .versions
        .list_for_note(note.id)
        .await
        .expect("list versions");
    assert_eq!(remaining.len(), 9);
    assert!(remaining.iter().all(|v| v.id != target.id));

    test_db.cleanup(user.id).await;
}

#[tokio::test]
#[ignore] // requires a provisioned DATABASE_URL
async fn test_restore_denied_for_non_owner() {
    let test_db = TestDatabase::new().await;
    let owner = test_db.create_user("rowner").await;
    let intruder = test_db.create_user("rintr").await;

    let note = test_db
        .db
        .notes
        .insert(owner.id, initial_note())
        .await
        .expect("insert note");
    update_n_times(&test_db, note.id, owner.id, 1).await;

    let versions = test_db
        .db
        .versions
        .list_for_note(note.id)
        .await
        .expect("list versions");

    assert!(matches!(
        test_db.db.versions.restore(versions[0].id, intruder.id).await,
        Err(Error::NotFound(_))
    ));

    test_db.cleanup(owner.id).await;
    test_db.cleanup(intruder.id).await;
}

#[tokio::test]
#[ignore] // requires a provisioned DATABASE_URL
async fn test_list_versions_not_found_when_history_empty() {
    let test_db = TestDatabase::new().await;
    let user = test_db.create_user("empty").await;

    let note = test_db
        .db
        .notes
        .insert(user.id, initial_note())
        .await
        .expect("insert note");

    assert!(matches!(
        test_db.db.versions.list_for_note(note.id).await,
        Err(Error::NotFound(_))
    ));

    test_db.cleanup(user.id).await;
}

#[tokio::test]
#[ignore] // requires a provisioned DATABASE_URL
async fn test_delete_all_versions_clears_history() {
    let test_db = TestDatabase::new().await;
    let user = test_db.create_user("purge").await;

    let note = test_db
        .db
        .notes
        .insert(user.id, initial_note())
        .await
        .expect("insert note");
    update_n_times(&test_db, note.id, user.id, 3).await;

    let deleted = test_db
        .db
        .versions
        .delete_all_for_note(note.id)
        .await
        .expect("delete versions");
    assert_eq!(deleted, 3);

    // A second purge has nothing to remove.
    assert!(matches!(
        test_db.db.versions.delete_all_for_note(note.id).await,
        Err(Error::NotFound(_))
    ));

    test_db.cleanup(user.id).await;
}
