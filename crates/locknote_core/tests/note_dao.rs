use locknote_core::db::migrations::latest_version;
use locknote_core::db::open_db_in_memory;
use locknote_core::{DaoError, Note, NoteDao, NoteRepository, SqliteNoteDao};
use rusqlite::Connection;

fn dao() -> SqliteNoteDao {
    SqliteNoteDao::try_new(open_db_in_memory().unwrap()).unwrap()
}

fn ids(notes: &[Note]) -> Vec<i64> {
    notes.iter().filter_map(|note| note.id).collect()
}

#[tokio::test]
async fn insert_then_get_roundtrip() {
    let dao = dao();
    let note = Note::with_timestamp("Groceries", "milk, eggs", 1_000);

    let id = dao.insert(note.clone()).await.unwrap();
    let loaded = dao.get_by_id(id).await.unwrap().unwrap();

    assert_eq!(loaded, note.with_id(id));
}

#[tokio::test]
async fn get_unknown_id_returns_none() {
    let dao = dao();
    assert!(dao.get_by_id(404).await.unwrap().is_none());
}

#[tokio::test]
async fn insert_assigns_fresh_ids() {
    let dao = dao();
    let first = dao.insert(Note::with_timestamp("a", "1", 1)).await.unwrap();
    let second = dao.insert(Note::with_timestamp("b", "2", 2)).await.unwrap();
    assert_ne!(first, second);
}

#[tokio::test]
async fn insert_with_existing_id_replaces_row() {
    let dao = dao();
    let id = dao.insert(Note::with_timestamp("draft", "v1", 1)).await.unwrap();

    let replaced_id = dao
        .insert(Note::with_timestamp("final", "v2", 2).with_id(id))
        .await
        .unwrap();

    assert_eq!(replaced_id, id);
    let all = dao.list_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].title, "final");
    assert_eq!(all[0].content, "v2");
}

#[tokio::test]
async fn update_preserves_id_and_replaces_fields() {
    let dao = dao();
    let id = dao.insert(Note::with_timestamp("a", "1", 1)).await.unwrap();

    let edited = Note::with_timestamp("a2", "12", 50).with_id(id);
    assert!(dao.update(edited.clone()).await.unwrap());

    let loaded = dao.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(loaded, edited);
}

#[tokio::test]
async fn update_of_unknown_or_unsaved_note_is_noop() {
    let dao = dao();
    assert!(!dao
        .update(Note::with_timestamp("x", "y", 1).with_id(77))
        .await
        .unwrap());
    assert!(!dao.update(Note::with_timestamp("x", "y", 1)).await.unwrap());
    assert!(dao.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_by_entity_and_by_id() {
    let dao = dao();
    let first = dao.insert(Note::with_timestamp("a", "1", 1)).await.unwrap();
    let second = dao.insert(Note::with_timestamp("b", "2", 2)).await.unwrap();

    let loaded = dao.get_by_id(first).await.unwrap().unwrap();
    assert!(dao.delete(loaded).await.unwrap());
    assert!(dao.delete_by_id(second).await.unwrap());

    assert!(dao.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_of_missing_note_is_idempotent_and_silent() {
    let dao = dao();
    dao.insert(Note::with_timestamp("a", "1", 1)).await.unwrap();
    let mut subscription = dao.observe_all().await.unwrap();
    assert_eq!(subscription.latest().unwrap().len(), 1);

    assert!(!dao.delete_by_id(999).await.unwrap());
    assert!(!dao.delete(Note::with_timestamp("a", "1", 1)).await.unwrap());

    assert!(subscription.try_recv().is_none(), "no-op must not publish");
}

#[tokio::test]
async fn list_is_newest_first() {
    let dao = dao();
    let old = dao.insert(Note::with_timestamp("old", "1", 100)).await.unwrap();
    let newest = dao.insert(Note::with_timestamp("newest", "2", 300)).await.unwrap();
    let middle = dao.insert(Note::with_timestamp("middle", "3", 200)).await.unwrap();

    let all = dao.list_all().await.unwrap();
    assert_eq!(ids(&all), vec![newest, middle, old]);
}

#[tokio::test]
async fn equal_timestamps_list_last_inserted_first() {
    let dao = dao();
    let first = dao.insert(Note::with_timestamp("first", "1", 500)).await.unwrap();
    let second = dao.insert(Note::with_timestamp("second", "2", 500)).await.unwrap();
    let third = dao.insert(Note::with_timestamp("third", "3", 500)).await.unwrap();

    let mut subscription = dao.observe_all().await.unwrap();
    let snapshot = subscription.latest().unwrap();
    assert_eq!(ids(&snapshot), vec![third, second, first]);
}

#[tokio::test]
async fn upsert_of_older_note_lists_it_before_equal_timestamps() {
    let dao = dao();
    let a = dao.insert(Note::with_timestamp("a", "1", 500)).await.unwrap();
    let b = dao.insert(Note::with_timestamp("b", "2", 500)).await.unwrap();
    assert_eq!(ids(&dao.list_all().await.unwrap()), vec![b, a]);

    dao.insert(Note::with_timestamp("a again", "1", 500).with_id(a))
        .await
        .unwrap();

    assert_eq!(ids(&dao.list_all().await.unwrap()), vec![a, b]);
}

#[tokio::test]
async fn update_with_same_timestamp_moves_note_first() {
    let dao = dao();
    let a = dao.insert(Note::with_timestamp("a", "1", 500)).await.unwrap();
    let b = dao.insert(Note::with_timestamp("b", "2", 500)).await.unwrap();
    let c = dao.insert(Note::with_timestamp("c", "3", 500)).await.unwrap();

    assert!(dao
        .update(Note::with_timestamp("b edited", "2", 500).with_id(b))
        .await
        .unwrap());
    assert_eq!(ids(&dao.list_all().await.unwrap()), vec![b, c, a]);

    assert!(!dao
        .update(Note::with_timestamp("ghost", "x", 500).with_id(999))
        .await
        .unwrap());
    assert_eq!(ids(&dao.list_all().await.unwrap()), vec![b, c, a]);
}

#[tokio::test]
async fn observer_receives_full_snapshot_after_each_write() {
    let dao = dao();
    let mut subscription = dao.observe_all().await.unwrap();
    assert!(subscription.recv().await.unwrap().is_empty());

    let a = dao.insert(Note::with_timestamp("a", "1", 10)).await.unwrap();
    let b = dao.insert(Note::with_timestamp("b", "2", 20)).await.unwrap();
    dao.update(Note::with_timestamp("a", "edited", 30).with_id(a))
        .await
        .unwrap();
    dao.delete_by_id(b).await.unwrap();

    let snapshots: Vec<Vec<i64>> = [
        subscription.recv().await.unwrap(),
        subscription.recv().await.unwrap(),
        subscription.recv().await.unwrap(),
        subscription.recv().await.unwrap(),
    ]
    .iter()
    .map(|snapshot| ids(snapshot))
    .collect();

    assert_eq!(snapshots, vec![vec![a], vec![b, a], vec![a, b], vec![a]]);
    assert!(subscription.try_recv().is_none());
}

#[tokio::test]
async fn unsubscribed_observer_gets_nothing_more() {
    let dao = dao();
    let mut subscription = dao.observe_all().await.unwrap();
    subscription.latest();
    assert!(subscription.unsubscribe());

    dao.insert(Note::with_timestamp("a", "1", 1)).await.unwrap();
    assert!(subscription.recv().await.is_none());
    assert_eq!(dao.observer().subscriber_count(), 0);
}

#[tokio::test]
async fn repository_forwards_to_dao() {
    let repo = NoteRepository::new(dao());
    let id = repo
        .insert(Note::with_timestamp("from repo", "body", 5))
        .await
        .unwrap();

    assert_eq!(
        repo.get_note_by_id(id).await.unwrap().map(|note| note.title),
        Some("from repo".to_string())
    );
    assert_eq!(repo.list_notes().await.unwrap().len(), 1);
    let mut live = repo.all_notes().await.unwrap();
    assert_eq!(live.latest().unwrap().len(), 1);
    assert!(repo.delete_by_id(id).await.unwrap());
    assert!(!repo.delete_by_id(id).await.unwrap());
}

#[test]
fn dao_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteNoteDao::try_new(conn) {
        Err(DaoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn dao_rejects_connection_without_notes_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteNoteDao::try_new(conn),
        Err(DaoError::MissingRequiredTable("notes"))
    ));
}

#[test]
fn dao_rejects_connection_missing_timestamp_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE notes (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            content TEXT NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteNoteDao::try_new(conn),
        Err(DaoError::MissingRequiredColumn {
            table: "notes",
            column: "timestamp"
        })
    ));
}
