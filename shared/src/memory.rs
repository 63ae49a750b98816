use std::cell::RefCell;
use std::rc::Rc;

use uuid::Uuid;

use crate::store::{StoreError, TaskBackend};
use crate::task::{NewTask, Task, TaskPatch};

#[derive(Debug, Default)]
struct MemoryState {
    records: Vec<Task>,
    offline: bool,
}

/// In-process backend with the same observable rules as the remote one:
/// inserts need an owner, unknown ids are not found, and an offline
/// backend rejects everything.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(records: Vec<Task>) -> Self {
        let backend = Self::new();
        backend.state.borrow_mut().records = records;
        backend
    }

    pub fn set_offline(&self, offline: bool) {
        self.state.borrow_mut().offline = offline;
    }

    pub fn records(&self) -> Vec<Task> {
        self.state.borrow().records.clone()
    }

    fn online(&self) -> Result<(), StoreError> {
        if self.state.borrow().offline {
            Err(StoreError::sync("backend unreachable"))
        } else {
            Ok(())
        }
    }
}

impl TaskBackend for MemoryBackend {
    async fn load(&self) -> Result<Vec<Task>, StoreError> {
        self.online()?;
        Ok(self.records())
    }

    async fn insert(&self, fields: NewTask) -> Result<Task, StoreError> {
        self.online()?;
        let task = fields.into_task(Uuid::new_v4())?;
        self.state.borrow_mut().records.push(task.clone());
        Ok(task)
    }

    async fn update(&self, id: Uuid, patch: TaskPatch) -> Result<Task, StoreError> {
        self.online()?;
        let mut state = self.state.borrow_mut();
        let task = state
            .records
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or(StoreError::NotFound(id))?;
        patch.apply_to(task);
        Ok(task.clone())
    }

    async fn remove(&self, id: Uuid) -> Result<(), StoreError> {
        self.online()?;
        let mut state = self.state.borrow_mut();
        let index = state
            .records
            .iter()
            .position(|task| task.id == id)
            .ok_or(StoreError::NotFound(id))?;
        state.records.remove(index);
        Ok(())
    }
}
