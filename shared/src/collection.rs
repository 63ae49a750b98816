use std::fmt;

use sigmut::{ActionContext, Signal, SignalContext, State};
use uuid::Uuid;

use crate::query::{FindOptions, TaskFilter};
use crate::store::SyncEvent;
use crate::task::Task;

/// Client-side mirror of the backend collection, in insertion order.
///
/// Only confirmed backend results are applied here. Reads made through a
/// [`SignalContext`] register a dependency, so signals derived from the
/// collection recompute on the next runtime update after a change.
#[derive(Clone)]
pub struct TaskCollection {
    records: State<Vec<Task>>,
}

impl Default for TaskCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TaskCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskCollection").finish_non_exhaustive()
    }
}

impl TaskCollection {
    pub fn new() -> Self {
        Self {
            records: State::new(Vec::new()),
        }
    }

    pub fn apply(&self, event: SyncEvent, ac: &mut ActionContext) {
        match event {
            SyncEvent::Loaded { tasks, .. } => self.records.set(tasks, ac),
            change => apply_change(&mut self.records.borrow_mut(ac), change),
        }
    }

    pub fn get(&self, id: Uuid, sc: &mut SignalContext) -> Option<Task> {
        self.records
            .borrow(sc)
            .iter()
            .find(|task| task.id == id)
            .cloned()
    }

    pub fn len(&self, sc: &mut SignalContext) -> usize {
        self.records.borrow(sc).len()
    }

    pub fn find(&self, filter: TaskFilter, options: FindOptions) -> Cursor {
        Cursor {
            collection: self.clone(),
            filter,
            options,
        }
    }

    pub fn count(&self, filter: TaskFilter, sc: &mut SignalContext) -> usize {
        self.find(filter, FindOptions::default()).count(sc)
    }
}

/// Fold one confirmed change into a record list. Upserts and removals are
/// idempotent, so replaying a change the list already holds is harmless.
pub(crate) fn apply_change(records: &mut Vec<Task>, event: SyncEvent) {
    match event {
        SyncEvent::Loaded { tasks, .. } => *records = tasks,
        SyncEvent::Inserted(task) | SyncEvent::Updated(task) => {
            match records.iter_mut().find(|existing| existing.id == task.id) {
                Some(existing) => *existing = task,
                None => records.push(task),
            }
        }
        SyncEvent::Removed(id) => records.retain(|task| task.id != id),
    }
}

/// A query over the collection. Nothing is read until `fetch` or `count`,
/// and each call sees the collection as it is at that moment.
#[derive(Debug, Clone)]
pub struct Cursor {
    collection: TaskCollection,
    filter: TaskFilter,
    options: FindOptions,
}

impl Cursor {
    pub fn fetch(&self, sc: &mut SignalContext) -> Vec<Task> {
        let mut matched: Vec<Task> = self
            .collection
            .records
            .borrow(sc)
            .iter()
            .filter(|task| self.filter.matches(task))
            .cloned()
            .collect();
        if let Some(sort) = self.options.sort {
            sort.apply(&mut matched);
        }
        matched
    }

    pub fn count(&self, sc: &mut SignalContext) -> usize {
        self.collection
            .records
            .borrow(sc)
            .iter()
            .filter(|task| self.filter.matches(task))
            .count()
    }

    /// The query as a signal, re-run whenever the collection changes.
    pub fn to_signal(&self) -> Signal<Vec<Task>> {
        let cursor = self.clone();
        Signal::new(move |sc| cursor.fetch(sc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use sigmut::core::Runtime;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn task(text: &str, minute: i64, checked: Option<bool>) -> Task {
        Task {
            id: Uuid::new_v4(),
            text: text.to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minute),
            owner: "u1".to_string(),
            username: "alice".to_string(),
            checked,
        }
    }

    fn texts(tasks: &[Task]) -> Vec<String> {
        tasks.iter().map(|t| t.text.clone()).collect()
    }

    fn loaded(tasks: Vec<Task>) -> SyncEvent {
        SyncEvent::Loaded { tasks, generation: 0 }
    }

    #[test]
    fn updated_event_replaces_the_record_in_place() {
        let mut rt = Runtime::new();
        let collection = TaskCollection::new();
        let first = task("first", 0, None);
        let second = task("second", 1, None);
        collection.apply(loaded(vec![first.clone(), second.clone()]), rt.ac());

        let mut checked = first.clone();
        checked.checked = Some(true);
        collection.apply(SyncEvent::Updated(checked), rt.ac());

        assert_eq!(collection.get(first.id, &mut rt.sc()).and_then(|t| t.checked), Some(true));
        assert_eq!(collection.get(second.id, &mut rt.sc()), Some(second));
        assert_eq!(collection.len(&mut rt.sc()), 2);
    }

    #[test]
    fn replaying_a_change_is_idempotent() {
        let only = task("only", 0, None);
        let mut records = vec![only.clone()];
        apply_change(&mut records, SyncEvent::Inserted(only.clone()));
        apply_change(&mut records, SyncEvent::Removed(Uuid::new_v4()));
        assert_eq!(records, vec![only.clone()]);

        apply_change(&mut records, SyncEvent::Removed(only.id));
        apply_change(&mut records, SyncEvent::Removed(only.id));
        assert!(records.is_empty());
    }

    #[test]
    fn cursor_reads_the_collection_lazily() {
        let mut rt = Runtime::new();
        let collection = TaskCollection::new();
        let cursor = collection.find(TaskFilter::Incomplete, FindOptions::newest_first());
        assert!(cursor.fetch(&mut rt.sc()).is_empty());

        collection.apply(SyncEvent::Inserted(task("a", 0, None)), rt.ac());
        collection.apply(SyncEvent::Inserted(task("b", 1, Some(true))), rt.ac());
        collection.apply(SyncEvent::Inserted(task("c", 2, Some(false))), rt.ac());

        assert_eq!(texts(&cursor.fetch(&mut rt.sc())), ["c", "a"]);
        assert_eq!(cursor.count(&mut rt.sc()), 2);
        assert_eq!(collection.count(TaskFilter::All, &mut rt.sc()), 3);
    }

    #[test]
    fn cursor_signal_reruns_on_change() {
        let mut rt = Runtime::new();
        let collection = TaskCollection::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let tasks = collection.find(TaskFilter::All, FindOptions::newest_first()).to_signal();
        let effect = tasks.effect({
            let seen = Rc::clone(&seen);
            move |tasks| seen.borrow_mut().push(texts(tasks))
        });
        rt.update();

        collection.apply(SyncEvent::Inserted(task("a", 0, None)), rt.ac());
        rt.update();
        collection.apply(SyncEvent::Inserted(task("b", 1, None)), rt.ac());
        rt.update();
        drop(effect);
        collection.apply(SyncEvent::Inserted(task("c", 2, None)), rt.ac());
        rt.update();

        assert_eq!(
            *seen.borrow(),
            vec![
                Vec::<String>::new(),
                vec!["a".to_string()],
                vec!["b".to_string(), "a".to_string()],
            ]
        );
    }
}
