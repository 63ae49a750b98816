//! Model and reactive glue for the task list client, independent of the
//! browser so it can be driven and tested natively.
//!
//! Reactive state is held in `sigmut` states: reads take a
//! `SignalContext`, writes take an `ActionContext`, and effects run when the
//! owning `sigmut::core::Runtime` updates.

pub mod accounts;
pub mod collection;
pub mod memory;
pub mod query;
pub mod store;
pub mod task;
pub mod view;
pub mod view_state;

pub use accounts::{AccountState, AccountsConfig, Credentials, PasswordSignupFields, SignInForm, UserIdentity};
pub use collection::{Cursor, TaskCollection};
pub use memory::MemoryBackend;
pub use query::{FindOptions, Sort, SortDirection, TaskFilter};
pub use store::{StoreError, SyncEvent, TaskBackend, TaskCommand, TaskStore};
pub use task::{NewTask, Task, TaskPatch};
pub use view::{NewTaskForm, TaskItemView, TaskListSnapshot, TaskListView};
pub use view_state::{ViewKey, ViewState};
