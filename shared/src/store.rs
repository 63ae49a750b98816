use std::cell::RefCell;
use std::rc::Rc;

use sigmut::{ActionContext, SignalContext};
use thiserror::Error;
use uuid::Uuid;

use crate::collection::{apply_change, Cursor, TaskCollection};
use crate::query::{FindOptions, TaskFilter};
use crate::task::{NewTask, Task, TaskPatch};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("not authorized: sign in to add tasks")]
    NotAuthenticated,
    #[error("task not found: {0}")]
    NotFound(Uuid),
    #[error("request rejected with status {status}")]
    Rejected { status: u16 },
    #[error("sync failed: {0}")]
    Sync(String),
}

impl StoreError {
    pub fn sync(message: impl Into<String>) -> Self {
        StoreError::Sync(message.into())
    }
}

/// A mutation as issued by a view handler.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskCommand {
    Insert(NewTask),
    Update { id: Uuid, patch: TaskPatch },
    Remove(Uuid),
}

/// A backend result waiting to be mirrored into the [`TaskCollection`].
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// The full set, from a load started when `generation` mutations had
    /// been confirmed.
    Loaded { tasks: Vec<Task>, generation: u64 },
    Inserted(Task),
    Updated(Task),
    Removed(Uuid),
}

/// The service that owns and persists the authoritative task set.
///
/// Implementations decide authorization; callers never pre-check.
#[allow(async_fn_in_trait)]
pub trait TaskBackend {
    async fn load(&self) -> Result<Vec<Task>, StoreError>;
    async fn insert(&self, fields: NewTask) -> Result<Task, StoreError>;
    async fn update(&self, id: Uuid, patch: TaskPatch) -> Result<Task, StoreError>;
    async fn remove(&self, id: Uuid) -> Result<(), StoreError>;
}

/// Bookkeeping that keeps a load from erasing mutations confirmed while it
/// was in flight.
#[derive(Debug, Default)]
struct Journal {
    /// Confirmed mutations settled so far.
    generation: u64,
    loads_in_flight: usize,
    /// Start generation of the newest load applied to the mirror.
    applied_load: Option<u64>,
    /// Mutations confirmed while a load was in flight, tagged with their
    /// generation.
    confirmed: Vec<(u64, SyncEvent)>,
}

/// Sends mutations to a [`TaskBackend`] and mirrors what it confirms.
///
/// Backend calls and mirroring are split: the async methods only talk to the
/// backend, and [`TaskStore::settle`] applies their outcome inside an
/// action. There is no queue, retry or conflict handling: a rejected
/// mutation is logged, returned, and never reaches the collection.
#[derive(Debug, Clone)]
pub struct TaskStore<B> {
    backend: B,
    collection: TaskCollection,
    journal: Rc<RefCell<Journal>>,
}

impl<B: TaskBackend> TaskStore<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            collection: TaskCollection::new(),
            journal: Rc::default(),
        }
    }

    pub fn collection(&self) -> &TaskCollection {
        &self.collection
    }

    /// Fetch the backend's current set. Settling the result replaces the
    /// mirror, keeping any mutation confirmed after the load started.
    pub async fn sync(&self) -> Result<SyncEvent, StoreError> {
        let generation = {
            let mut journal = self.journal.borrow_mut();
            journal.loads_in_flight += 1;
            journal.generation
        };
        let loaded = self.backend.load().await;
        if loaded.is_err() {
            let mut journal = self.journal.borrow_mut();
            journal.loads_in_flight = journal.loads_in_flight.saturating_sub(1);
        }
        loaded.map(|tasks| SyncEvent::Loaded { tasks, generation })
    }

    pub async fn insert(&self, fields: NewTask) -> Result<SyncEvent, StoreError> {
        self.execute(TaskCommand::Insert(fields)).await
    }

    pub async fn update(&self, id: Uuid, patch: TaskPatch) -> Result<SyncEvent, StoreError> {
        self.execute(TaskCommand::Update { id, patch }).await
    }

    pub async fn remove(&self, id: Uuid) -> Result<SyncEvent, StoreError> {
        self.execute(TaskCommand::Remove(id)).await
    }

    pub async fn execute(&self, command: TaskCommand) -> Result<SyncEvent, StoreError> {
        match command {
            TaskCommand::Insert(fields) => self.backend.insert(fields).await.map(SyncEvent::Inserted),
            TaskCommand::Update { id, patch } => self.backend.update(id, patch).await.map(SyncEvent::Updated),
            TaskCommand::Remove(id) => self.backend.remove(id).await.map(|()| SyncEvent::Removed(id)),
        }
    }

    /// Mirror a backend outcome. Failures are logged and handed back
    /// untouched.
    pub fn settle(&self, outcome: Result<SyncEvent, StoreError>, ac: &mut ActionContext) -> Result<(), StoreError> {
        let event = outcome.map_err(|err| {
            tracing::warn!(error = %err, "backend rejected the request");
            err
        })?;

        let event = match event {
            SyncEvent::Loaded { tasks, generation } => match self.reconcile(tasks, generation) {
                Some(tasks) => SyncEvent::Loaded { tasks, generation },
                None => return Ok(()),
            },
            change => {
                let mut journal = self.journal.borrow_mut();
                journal.generation += 1;
                if journal.loads_in_flight > 0 {
                    let generation = journal.generation;
                    journal.confirmed.push((generation, change.clone()));
                }
                tracing::debug!(event = ?change, generation = journal.generation, "mutation confirmed");
                change
            }
        };
        self.collection.apply(event, ac);
        Ok(())
    }

    /// Bring a loaded set up to date with mutations confirmed since its
    /// load started. `None` when a newer load has already been applied.
    fn reconcile(&self, mut tasks: Vec<Task>, generation: u64) -> Option<Vec<Task>> {
        let mut journal = self.journal.borrow_mut();
        journal.loads_in_flight = journal.loads_in_flight.saturating_sub(1);

        if journal.applied_load.is_some_and(|newest| generation < newest) {
            tracing::debug!(generation, "dropping superseded task load");
            return None;
        }
        journal.applied_load = Some(generation);

        let mut replayed = 0;
        for (_, change) in journal.confirmed.iter().filter(|(at, _)| *at > generation) {
            apply_change(&mut tasks, change.clone());
            replayed += 1;
        }
        if journal.loads_in_flight == 0 {
            journal.confirmed.clear();
        } else {
            journal.confirmed.retain(|(at, _)| *at > generation);
        }

        tracing::debug!(count = tasks.len(), replayed, "task collection synced");
        Some(tasks)
    }

    pub fn find(&self, filter: TaskFilter, options: FindOptions) -> Cursor {
        self.collection.find(filter, options)
    }

    pub fn count(&self, filter: TaskFilter, sc: &mut SignalContext) -> usize {
        self.collection.count(filter, sc)
    }
}
