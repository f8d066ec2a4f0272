//! Note DAO contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and ordered listing over the `notes` table.
//! - Publish a fresh ordered snapshot to observers after every effective write.
//!
//! # Invariants
//! - Listing order is `timestamp DESC, write_seq DESC`: newest first, and among
//!   equal timestamps the most recently written note first. Every insert,
//!   upsert and update takes the next `write_seq`.
//! - `insert` with an explicit id replaces the existing row (upsert).
//! - `update`/`delete` on an unknown id change nothing and publish nothing.
//! - Snapshots are published while the connection lock is held, so observers
//!   see them in commit order.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::note::{Note, NoteId, NoteSnapshot};
use crate::observe::{NotesObserver, NotesSubscription};
use async_trait::async_trait;
use log::{debug, error, info};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

const NOTE_SELECT_SQL: &str = "SELECT id, title, content, timestamp FROM notes";
const NOTE_ORDER_SQL: &str = "ORDER BY timestamp DESC, write_seq DESC, id DESC";
const NEXT_WRITE_SEQ_SQL: &str = "(SELECT IFNULL(MAX(write_seq), 0) + 1 FROM notes)";
const REQUIRED_COLUMNS: [&str; 5] = ["id", "title", "content", "timestamp", "write_seq"];

pub type DaoResult<T> = Result<T, DaoError>;

/// Error for note persistence and query operations.
#[derive(Debug)]
pub enum DaoError {
    Db(DbError),
    /// Connection schema version does not match this binary.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Blocking worker panicked or was cancelled by the runtime.
    Worker(String),
}

impl Display for DaoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection is not migrated: expected schema version {expected_version}, found {actual_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
            Self::Worker(details) => write!(f, "storage worker failed: {details}"),
        }
    }
}

impl Error for DaoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for DaoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for DaoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Asynchronous data access contract for notes.
#[async_trait]
pub trait NoteDao: Send + Sync {
    /// Registers a live subscriber; the current snapshot is queued immediately.
    async fn observe_all(&self) -> DaoResult<NotesSubscription>;
    /// One-shot ordered snapshot of every note.
    async fn list_all(&self) -> DaoResult<Vec<Note>>;
    async fn get_by_id(&self, id: NoteId) -> DaoResult<Option<Note>>;
    /// Inserts (or replaces, when `note.id` is set) and returns the row id.
    async fn insert(&self, note: Note) -> DaoResult<NoteId>;
    /// Overwrites the row with `note.id`. Returns whether a row changed.
    async fn update(&self, note: Note) -> DaoResult<bool>;
    /// Removes the row with `note.id`. Returns whether a row was removed.
    async fn delete(&self, note: Note) -> DaoResult<bool>;
    async fn delete_by_id(&self, id: NoteId) -> DaoResult<bool>;
}

/// SQLite-backed note DAO.
///
/// Clones share the connection and the observer registry.
#[derive(Clone)]
pub struct SqliteNoteDao {
    conn: Arc<Mutex<Connection>>,
    observer: NotesObserver,
}

impl SqliteNoteDao {
    /// Takes ownership of a migrated connection.
    pub fn try_new(conn: Connection) -> DaoResult<Self> {
        ensure_connection_ready(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            observer: NotesObserver::new(),
        })
    }

    /// Registry used to publish snapshots; exposed for diagnostics.
    pub fn observer(&self) -> &NotesObserver {
        &self.observer
    }

    async fn run<T, F>(&self, op: &'static str, work: F) -> DaoResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection, &NotesObserver) -> DaoResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let observer = self.observer.clone();
        let started_at = Instant::now();

        let joined = tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().unwrap_or_else(PoisonError::into_inner);
            work(&mut guard, &observer)
        })
        .await;

        let result = match joined {
            Ok(result) => result,
            Err(err) => Err(DaoError::Worker(err.to_string())),
        };

        match &result {
            Ok(_) => debug!(
                "event={op} module=dao status=ok duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event={op} module=dao status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }
}

#[async_trait]
impl NoteDao for SqliteNoteDao {
    async fn observe_all(&self) -> DaoResult<NotesSubscription> {
        self.run("note_observe", |conn, observer| {
            let snapshot = query_snapshot(conn)?;
            Ok(observer.subscribe(snapshot))
        })
        .await
    }

    async fn list_all(&self) -> DaoResult<Vec<Note>> {
        self.run("note_list", |conn, _| query_all(conn)).await
    }

    async fn get_by_id(&self, id: NoteId) -> DaoResult<Option<Note>> {
        self.run("note_get", move |conn, _| {
            let note = conn
                .query_row(
                    &format!("{NOTE_SELECT_SQL} WHERE id = ?1;"),
                    [id],
                    parse_note_row,
                )
                .optional()?;
            Ok(note)
        })
        .await
    }

    async fn insert(&self, note: Note) -> DaoResult<NoteId> {
        self.run("note_insert", move |conn, observer| {
            conn.execute(
                &format!(
                    "INSERT OR REPLACE INTO notes (id, title, content, timestamp, write_seq)
                     VALUES (?1, ?2, ?3, ?4, {NEXT_WRITE_SEQ_SQL});"
                ),
                params![note.id, note.title, note.content, note.timestamp],
            )?;
            let id = conn.last_insert_rowid();
            publish_snapshot(conn, observer)?;
            info!(
                "event=note_insert module=dao status=ok note_id={id} replaced={}",
                note.id.is_some()
            );
            Ok(id)
        })
        .await
    }

    async fn update(&self, note: Note) -> DaoResult<bool> {
        let Some(id) = note.id else {
            debug!("event=note_update module=dao status=skipped reason=unsaved_note");
            return Ok(false);
        };

        self.run("note_update", move |conn, observer| {
            let changed = conn.execute(
                &format!(
                    "UPDATE notes
                     SET title = ?2, content = ?3, timestamp = ?4,
                         write_seq = {NEXT_WRITE_SEQ_SQL}
                     WHERE id = ?1;"
                ),
                params![id, note.title, note.content, note.timestamp],
            )?;
            finish_write(conn, observer, "note_update", id, changed)
        })
        .await
    }

    async fn delete(&self, note: Note) -> DaoResult<bool> {
        match note.id {
            Some(id) => self.delete_by_id(id).await,
            None => Ok(false),
        }
    }

    async fn delete_by_id(&self, id: NoteId) -> DaoResult<bool> {
        self.run("note_delete", move |conn, observer| {
            let changed = conn.execute("DELETE FROM notes WHERE id = ?1;", [id])?;
            finish_write(conn, observer, "note_delete", id, changed)
        })
        .await
    }
}

fn finish_write(
    conn: &Connection,
    observer: &NotesObserver,
    event: &'static str,
    id: NoteId,
    changed: usize,
) -> DaoResult<bool> {
    if changed == 0 {
        info!("event={event} module=dao status=noop note_id={id} reason=not_found");
        return Ok(false);
    }
    publish_snapshot(conn, observer)?;
    info!("event={event} module=dao status=ok note_id={id}");
    Ok(true)
}

fn publish_snapshot(conn: &Connection, observer: &NotesObserver) -> DaoResult<()> {
    let snapshot = query_snapshot(conn)?;
    let delivered = observer.publish(&snapshot);
    debug!(
        "event=notes_publish module=dao status=ok notes={} subscribers={delivered}",
        snapshot.len()
    );
    Ok(())
}

fn query_snapshot(conn: &Connection) -> DaoResult<NoteSnapshot> {
    Ok(Arc::new(query_all(conn)?))
}

fn query_all(conn: &Connection) -> DaoResult<Vec<Note>> {
    let mut stmt = conn.prepare_cached(&format!("{NOTE_SELECT_SQL} {NOTE_ORDER_SQL};"))?;
    let notes = stmt
        .query_map([], parse_note_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(notes)
}

fn parse_note_row(row: &Row<'_>) -> rusqlite::Result<Note> {
    Ok(Note {
        id: Some(row.get("id")?),
        title: row.get("title")?,
        content: row.get("content")?,
        timestamp: row.get("timestamp")?,
    })
}

fn ensure_connection_ready(conn: &Connection) -> DaoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(DaoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "notes")? {
        return Err(DaoError::MissingRequiredTable("notes"));
    }

    let columns = table_columns(conn, "notes")?;
    for column in REQUIRED_COLUMNS {
        if !columns.iter().any(|current| current == column) {
            return Err(DaoError::MissingRequiredColumn {
                table: "notes",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> DaoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_columns(conn: &Connection, table: &str) -> DaoResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(columns)
}
