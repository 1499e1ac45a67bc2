//! Tests for note lifecycle operations: ownership fusing, partial update
//! merging, cascade deletion, and archive semantics.

use crate::test_fixtures::TestDatabase;
use crate::{CreateNoteRequest, Error, UpdateNoteRequest};
use uuid::Uuid;

fn sample_note() -> CreateNoteRequest {
    CreateNoteRequest {
        title: "A".to_string(),
        content: "x".to_string(),
        tags: Some(vec!["test".to_string()]),
    }
}

#[tokio::test]
#[ignore] // requires a provisioned DATABASE_URL
async fn test_create_and_fetch_roundtrip() {
    let test_db = TestDatabase::new().await;
    let user = test_db.create_user("lifecycle").await;

    let note = test_db
        .db
        .notes
        .insert(user.id, sample_note())
        .await
        .expect("insert note");
    assert_eq!(note.version, 1);
    assert!(!note.is_archived);

    // Timestamps round-trip at microsecond precision, so compare fields.
    let fetched = test_db
        .db
        .notes
        .fetch_owned(note.id, user.id)
        .await
        .expect("fetch note");
    assert_eq!(fetched.id, note.id);
    assert_eq!(fetched.title, note.title);
    assert_eq!(fetched.content, note.content);
    assert_eq!(fetched.tags, note.tags);
    assert_eq!(fetched.version, note.version);

    test_db.cleanup(user.id).await;
}

#[tokio::test]
#[ignore] // requires a provisioned DATABASE_URL
async fn test_ownership_and_existence_are_indistinguishable() {
    let test_db = TestDatabase::new().await;
    let owner = test_db.create_user("owner").await;
    let intruder = test_db.create_user("intruder").await;

    let note = test_db
        .db
        .notes
        .insert(owner.id, sample_note())
        .await
        .expect("insert note");

    // Nonexistent id and unowned id must produce the same error kind.
    let missing = test_db
        .db
        .notes
        .fetch_owned(Uuid::now_v7(), owner.id)
        .await
        .unwrap_err();
    let unowned = test_db
        .db
        .notes
        .fetch_owned(note.id, intruder.id)
        .await
        .unwrap_err();

    assert!(matches!(missing, Error::NotFound(_)));
    assert!(matches!(unowned, Error::NotFound(_)));

    // Same for update, delete, and archive.
    assert!(matches!(
        test_db
            .db
            .notes
            .update(
                note.id,
                intruder.id,
                UpdateNoteRequest {
                    title: Some("hijacked".to_string()),
                    ..Default::default()
                },
            )
            .await,
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        test_db.db.notes.delete(note.id, intruder.id).await,
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        test_db.db.notes.archive(note.id, intruder.id).await,
        Err(Error::NotFound(_))
    ));

    // None of the rejected calls touched the note.
    let unchanged = test_db
        .db
        .notes
        .fetch_owned(note.id, owner.id)
        .await
        .expect("fetch note");
    assert_eq!(unchanged.title, "A");
    assert_eq!(unchanged.version, 1);
    assert!(!unchanged.is_archived);

    test_db.cleanup(owner.id).await;
    test_db.cleanup(intruder.id).await;
}

#[tokio::test]
#[ignore] // requires a provisioned DATABASE_URL
async fn test_update_merges_omitted_fields() {
    let test_db = TestDatabase::new().await;
    let user = test_db.create_user("merge").await;

    let note = test_db
        .db
        .notes
        .insert(user.id, sample_note())
        .await
        .expect("insert note");

    let update = test_db
        .db
        .notes
        .update(
            note.id,
            user.id,
            UpdateNoteRequest {
                title: Some("B".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("update note");

    assert_eq!(update.before.title, "A");
    assert_eq!(update.after.title, "B");
    assert_eq!(update.after.content, "x");
    assert_eq!(update.after.tags, vec!["test".to_string()]);
    assert_eq!(update.after.version, 2);

    let fetched = test_db
        .db
        .notes
        .fetch_owned(note.id, user.id)
        .await
        .expect("fetch note");
    assert_eq!(fetched.title, update.after.title);
    assert_eq!(fetched.version, update.after.version);

    test_db.cleanup(user.id).await;
}

#[tokio::test]
#[ignore] // requires a provisioned DATABASE_URL
async fn test_delete_cascades_to_versions() {
    let test_db = TestDatabase::new().await;
    let user = test_db.create_user("cascade").await;

    let note = test_db
        .db
        .notes
        .insert(user.id, sample_note())
        .await
        .expect("insert note");

    let update = test_db
        .db
        .notes
        .update(note.id, user.id, UpdateNoteRequest::default())
        .await
        .expect("update note");
    test_db
        .db
        .versions
        .snapshot_and_prune(&update.before)
        .await
        .expect("snapshot");

    test_db
        .db
        .notes
        .delete(note.id, user.id)
        .await
        .expect("delete note");

    assert!(matches!(
        test_db.db.notes.fetch_owned(note.id, user.id).await,
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        test_db.db.versions.list_for_note(note.id).await,
        Err(Error::NotFound(_))
    ));

    test_db.cleanup(user.id).await;
}

#[tokio::test]
#[ignore] // requires a provisioned DATABASE_URL
async fn test_archive_leaves_version_and_history_untouched() {
    let test_db = TestDatabase::new().await;
    let user = test_db.create_user("archive").await;

    let note = test_db
        .db
        .notes
        .insert(user.id, sample_note())
        .await
        .expect("insert note");

    let archived = test_db
        .db
        .notes
        .archive(note.id, user.id)
        .await
        .expect("archive note");

    assert!(archived.is_archived);
    assert_eq!(archived.version, 1);
    // No snapshot was taken.
    assert!(matches!(
        test_db.db.versions.list_for_note(note.id).await,
        Err(Error::NotFound(_))
    ));

    test_db.cleanup(user.id).await;
}

#[tokio::test]
#[ignore] // requires a provisioned DATABASE_URL
async fn test_list_scoped_to_owner() {
    let test_db = TestDatabase::new().await;
    let alice = test_db.create_user("alice").await;
    let bob = test_db.create_user("bob").await;

    test_db
        .db
        .notes
        .insert(alice.id, sample_note())
        .await
        .expect("insert note");

    let alices = test_db.db.notes.list_for_user(alice.id).await.unwrap();
    let bobs = test_db.db.notes.list_for_user(bob.id).await.unwrap();
    assert_eq!(alices.len(), 1);
    assert!(bobs.is_empty());

    test_db.cleanup(alice.id).await;
    test_db.cleanup(bob.id).await;
}
