//! Note list view-model.
//!
//! # Responsibility
//! - Mirror the repository's live note collection into a `watch` channel.
//! - Run insert/update/delete intents on tasks scoped to the view-model.
//!
//! # Invariants
//! - After `clear()` no new snapshot reaches `notes()` receivers.
//! - Cancellation is cooperative: a write already handed to the storage
//!   worker still completes, only its outcome is reported as `Cancelled`.

use crate::dao::{DaoError, DaoResult, NoteDao};
use crate::model::note::{Note, NoteId, NoteSnapshot};
use crate::observe::NotesSubscription;
use crate::repo::NoteRepository;
use log::{debug, error, info};
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Result of one fire-and-forget intent, for callers that await it.
#[derive(Debug)]
pub enum IntentOutcome<T> {
    Completed(T),
    /// Storage fault, surfaced unchanged.
    Failed(DaoError),
    /// The view-model scope ended before the outcome was delivered.
    Cancelled,
}

impl<T> IntentOutcome<T> {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns the completed value, if any.
    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Failed(_) | Self::Cancelled => None,
        }
    }
}

/// State holder behind the note list screen.
pub struct NoteListViewModel<D: NoteDao + 'static> {
    repo: Arc<NoteRepository<D>>,
    notes: watch::Receiver<NoteSnapshot>,
    scope: CancellationToken,
    tasks: TaskTracker,
    runtime: Handle,
}

impl<D: NoteDao + 'static> NoteListViewModel<D> {
    /// Subscribes to the repository and starts mirroring snapshots.
    ///
    /// The runtime this is awaited on also runs every intent.
    pub async fn new(repo: Arc<NoteRepository<D>>) -> DaoResult<Self> {
        let mut subscription = repo.all_notes().await?;
        let initial = subscription.recv().await.unwrap_or_default();
        let (sender, notes) = watch::channel(initial);

        let scope = CancellationToken::new();
        let tasks = TaskTracker::new();
        let runtime = Handle::current();
        tasks.spawn_on(
            forward_snapshots(subscription, sender, scope.clone()),
            &runtime,
        );
        info!("event=viewmodel_start module=viewmodel status=ok");

        Ok(Self {
            repo,
            notes,
            scope,
            tasks,
            runtime,
        })
    }

    /// Read-only live collection, newest first.
    pub fn notes(&self) -> watch::Receiver<NoteSnapshot> {
        self.notes.clone()
    }

    /// Snapshot currently shown to the view.
    pub fn current_notes(&self) -> NoteSnapshot {
        Arc::clone(&self.notes.borrow())
    }

    pub fn insert(&self, note: Note) -> JoinHandle<IntentOutcome<NoteId>> {
        let repo = Arc::clone(&self.repo);
        self.launch("note_insert", async move { repo.insert(note).await })
    }

    pub fn update(&self, note: Note) -> JoinHandle<IntentOutcome<bool>> {
        let repo = Arc::clone(&self.repo);
        self.launch("note_update", async move { repo.update(note).await })
    }

    pub fn delete(&self, note: Note) -> JoinHandle<IntentOutcome<bool>> {
        let repo = Arc::clone(&self.repo);
        self.launch("note_delete", async move { repo.delete(note).await })
    }

    pub fn delete_by_id(&self, id: NoteId) -> JoinHandle<IntentOutcome<bool>> {
        let repo = Arc::clone(&self.repo);
        self.launch("note_delete", async move { repo.delete_by_id(id).await })
    }

    /// Looks a note up; unknown ids yield `Ok(None)`.
    pub async fn get_by_id(&self, id: NoteId) -> DaoResult<Option<Note>> {
        self.repo.get_note_by_id(id).await
    }

    /// Ends the view-model scope. Idempotent.
    pub fn clear(&self) {
        if self.scope.is_cancelled() {
            return;
        }
        self.scope.cancel();
        self.tasks.close();
        info!(
            "event=viewmodel_clear module=viewmodel status=ok pending_tasks={}",
            self.tasks.len()
        );
    }

    /// Ends the scope and waits until every scoped task has returned.
    pub async fn shutdown(&self) {
        self.clear();
        self.tasks.wait().await;
    }

    pub fn is_cleared(&self) -> bool {
        self.scope.is_cancelled()
    }

    fn launch<T, F>(&self, intent: &'static str, work: F) -> JoinHandle<IntentOutcome<T>>
    where
        T: Send + 'static,
        F: Future<Output = DaoResult<T>> + Send + 'static,
    {
        let scope = self.scope.clone();
        self.tasks.spawn_on(
            async move {
                if scope.is_cancelled() {
                    debug!("event={intent} module=viewmodel status=cancelled stage=before_start");
                    return IntentOutcome::Cancelled;
                }
                tokio::select! {
                    biased;
                    () = scope.cancelled() => {
                        debug!("event={intent} module=viewmodel status=cancelled stage=in_flight");
                        IntentOutcome::Cancelled
                    }
                    result = work => match result {
                        Ok(value) => IntentOutcome::Completed(value),
                        Err(err) => {
                            error!("event={intent} module=viewmodel status=error error={err}");
                            IntentOutcome::Failed(err)
                        }
                    },
                }
            },
            &self.runtime,
        )
    }
}

impl<D: NoteDao + 'static> Drop for NoteListViewModel<D> {
    fn drop(&mut self) {
        self.clear();
    }
}

async fn forward_snapshots(
    mut subscription: NotesSubscription,
    sender: watch::Sender<NoteSnapshot>,
    scope: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = scope.cancelled() => break,
            next = subscription.recv() => match next {
                Some(snapshot) => {
                    if sender.send(snapshot).is_err() {
                        break;
                    }
                }
                None => break,
            },
        }
    }
    subscription.unsubscribe();
    debug!("event=viewmodel_forward module=viewmodel status=stopped");
}
