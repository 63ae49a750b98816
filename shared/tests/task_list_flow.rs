use std::cell::RefCell;
use std::rc::Rc;

use sigmut::core::Runtime;
use tasklist_shared::{
    AccountState, MemoryBackend, NewTaskForm, StoreError, TaskListView, TaskStore, UserIdentity, ViewKey,
    ViewState,
};

#[tokio::test]
async fn session_walkthrough() {
    let mut rt = Runtime::new();
    let backend = MemoryBackend::new();
    let view_state = ViewState::new();
    let accounts = AccountState::new();
    let view = TaskListView::new(TaskStore::new(backend.clone()), view_state.clone(), accounts.clone());

    let renders = Rc::new(RefCell::new(Vec::new()));
    let _watch = view.watch({
        let renders = Rc::clone(&renders);
        move |snapshot| {
            let texts: Vec<String> = snapshot.tasks.iter().map(|t| t.text.clone()).collect();
            renders.borrow_mut().push(texts);
        }
    });

    // The initial load is still out when the first submit goes through.
    let loading = view.store().sync();

    // Signed out: the form clears but nothing is stored.
    let mut form = NewTaskForm {
        text: "too early".to_string(),
    };
    let refused = view.submit_new_task(&mut form, &mut rt.sc()).await;
    assert_eq!(view.settle(refused, rt.ac()), Err(StoreError::NotAuthenticated));
    assert!(backend.records().is_empty());

    accounts.set_user(
        Some(UserIdentity {
            id: "u1".to_string(),
            username: "alice".to_string(),
        }),
        rt.ac(),
    );

    let loaded = loading.await;
    for text in ["Buy milk", "Walk dog", "File taxes"] {
        form.text = text.to_string();
        let inserted = view.submit_new_task(&mut form, &mut rt.sc()).await;
        view.settle(inserted, rt.ac()).expect("insert");
    }
    view.settle(loaded, rt.ac()).expect("initial sync");
    rt.update();
    assert_eq!(view.incomplete_count(&mut rt.sc()), 3);

    let walk = view
        .tasks(&mut rt.sc())
        .into_iter()
        .find(|t| t.text == "Walk dog")
        .expect("walk task");
    let checked = view.items().toggle_checked(walk.id, true).await;
    view.settle(checked, rt.ac()).expect("check");
    assert_eq!(view.incomplete_count(&mut rt.sc()), 2);

    view.toggle_hide_completed(true, rt.ac());
    rt.update();
    assert!(view_state.get(ViewKey::HideCompleted, &mut rt.sc()));
    assert!(view.tasks(&mut rt.sc()).iter().all(|t| !t.is_checked()));
    assert_eq!(view.tasks(&mut rt.sc()).len(), 2);

    // A write lost to the network never shows up.
    backend.set_offline(true);
    let lost = view.items().delete(walk.id).await;
    assert!(view.settle(lost, rt.ac()).is_err());
    backend.set_offline(false);
    assert_eq!(view.store().collection().len(&mut rt.sc()), 3);

    let deleted = view.items().delete(walk.id).await;
    view.settle(deleted, rt.ac()).expect("delete");
    rt.update();
    assert_eq!(view.store().collection().len(&mut rt.sc()), 2);
    assert_eq!(view.incomplete_count(&mut rt.sc()), 2);

    let last = renders.borrow().last().cloned().unwrap_or_default();
    assert_eq!(last.len(), 2);
    assert!(last.iter().all(|text| text != "Walk dog"));
}
