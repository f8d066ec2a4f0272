//! Note repository façade.

use crate::dao::{DaoResult, NoteDao};
use crate::model::note::{Note, NoteId};
use crate::observe::NotesSubscription;

/// Pass-through façade over a `NoteDao` implementation.
pub struct NoteRepository<D: NoteDao> {
    dao: D,
}

impl<D: NoteDao> NoteRepository<D> {
    /// Creates a repository using the provided DAO implementation.
    pub fn new(dao: D) -> Self {
        Self { dao }
    }

    /// Live, read-only view of all notes, newest first.
    pub async fn all_notes(&self) -> DaoResult<NotesSubscription> {
        self.dao.observe_all().await
    }

    pub async fn list_notes(&self) -> DaoResult<Vec<Note>> {
        self.dao.list_all().await
    }

    pub async fn get_note_by_id(&self, id: NoteId) -> DaoResult<Option<Note>> {
        self.dao.get_by_id(id).await
    }

    pub async fn insert(&self, note: Note) -> DaoResult<NoteId> {
        self.dao.insert(note).await
    }

    pub async fn update(&self, note: Note) -> DaoResult<bool> {
        self.dao.update(note).await
    }

    pub async fn delete(&self, note: Note) -> DaoResult<bool> {
        self.dao.delete(note).await
    }

    pub async fn delete_by_id(&self, id: NoteId) -> DaoResult<bool> {
        self.dao.delete_by_id(id).await
    }
}
