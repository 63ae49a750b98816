//! View bindings for the task list page and its rows.
//!
//! Derived output comes from pure selectors over the collection and the
//! view flags, read through a [`SignalContext`] so signals built on them
//! track both. Handlers either write a flag or return the store future for
//! the caller to drive and settle; they never check authorization or
//! validate text.

use std::future::Future;

use sigmut::{ActionContext, Signal, SignalContext, Subscription};
use uuid::Uuid;

use crate::accounts::AccountState;
use crate::collection::TaskCollection;
use crate::query::{FindOptions, TaskFilter};
use crate::store::{StoreError, SyncEvent, TaskBackend, TaskStore};
use crate::task::{NewTask, Task, TaskPatch};
use crate::view_state::{ViewKey, ViewState};

/// Newest first; only incomplete tasks when `hide_completed` is set.
pub fn select_tasks(collection: &TaskCollection, hide_completed: bool, sc: &mut SignalContext) -> Vec<Task> {
    let filter = if hide_completed {
        TaskFilter::Incomplete
    } else {
        TaskFilter::All
    };
    collection.find(filter, FindOptions::newest_first()).fetch(sc)
}

pub fn select_incomplete_count(collection: &TaskCollection, sc: &mut SignalContext) -> usize {
    collection.count(TaskFilter::Incomplete, sc)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTaskForm {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskListSnapshot {
    pub tasks: Vec<Task>,
    pub incomplete_count: usize,
    pub hide_completed: bool,
}

#[derive(Debug, Clone)]
pub struct TaskListView<B> {
    store: TaskStore<B>,
    view_state: ViewState,
    accounts: AccountState,
}

impl<B: TaskBackend + Clone + 'static> TaskListView<B> {
    pub fn new(store: TaskStore<B>, view_state: ViewState, accounts: AccountState) -> Self {
        Self {
            store,
            view_state,
            accounts,
        }
    }

    pub fn store(&self) -> &TaskStore<B> {
        &self.store
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view_state
    }

    pub fn accounts(&self) -> &AccountState {
        &self.accounts
    }

    pub fn items(&self) -> TaskItemView<B> {
        TaskItemView::new(self.store.clone())
    }

    pub fn tasks(&self, sc: &mut SignalContext) -> Vec<Task> {
        let hide_completed = self.view_state.hide_completed(sc);
        select_tasks(self.store.collection(), hide_completed, sc)
    }

    pub fn incomplete_count(&self, sc: &mut SignalContext) -> usize {
        select_incomplete_count(self.store.collection(), sc)
    }

    pub fn hide_completed(&self, sc: &mut SignalContext) -> bool {
        self.view_state.hide_completed(sc)
    }

    pub fn snapshot(&self, sc: &mut SignalContext) -> TaskListSnapshot {
        TaskListSnapshot {
            tasks: self.tasks(sc),
            incomplete_count: self.incomplete_count(sc),
            hide_completed: self.hide_completed(sc),
        }
    }

    /// Call `listener` with a fresh snapshot on the first runtime update and
    /// on every update after the filter flag or the collection changed.
    pub fn watch(&self, listener: impl Fn(&TaskListSnapshot) + 'static) -> Subscription {
        let view = self.clone();
        Signal::new(move |sc| view.snapshot(sc)).effect(listener)
    }

    /// Take the form text, clear the form, and insert the task as the
    /// current user. Empty text and a missing user are passed through.
    pub fn submit_new_task(
        &self,
        form: &mut NewTaskForm,
        sc: &mut SignalContext,
    ) -> impl Future<Output = Result<SyncEvent, StoreError>> + 'static {
        let text = std::mem::take(&mut form.text);
        let fields = NewTask::new(text, self.accounts.current_user(sc).as_ref());
        let store = self.store.clone();
        async move { store.insert(fields).await }
    }

    pub fn toggle_hide_completed(&self, checked: bool, ac: &mut ActionContext) {
        self.view_state.set(ViewKey::HideCompleted, checked, ac);
    }

    /// Mirror the outcome of a handler future.
    pub fn settle(&self, outcome: Result<SyncEvent, StoreError>, ac: &mut ActionContext) -> Result<(), StoreError> {
        self.store.settle(outcome, ac)
    }
}

/// Row handlers. The row's task id is passed in by the caller.
#[derive(Debug, Clone)]
pub struct TaskItemView<B> {
    store: TaskStore<B>,
}

impl<B: TaskBackend + Clone + 'static> TaskItemView<B> {
    pub fn new(store: TaskStore<B>) -> Self {
        Self { store }
    }

    pub fn toggle_checked(
        &self,
        id: Uuid,
        checked: bool,
    ) -> impl Future<Output = Result<SyncEvent, StoreError>> + 'static {
        let store = self.store.clone();
        async move { store.update(id, TaskPatch::checked(checked)).await }
    }

    pub fn delete(&self, id: Uuid) -> impl Future<Output = Result<SyncEvent, StoreError>> + 'static {
        let store = self.store.clone();
        async move { store.remove(id).await }
    }
}
