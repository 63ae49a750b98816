use std::cell::RefCell;

use sauron::{
    html::{attributes::*, *},
    prelude::*,
};
use sigmut::{core::Runtime, Subscription};
use tasklist_shared::{
    accounts::SignupField, AccountState, NewTaskForm, SignInForm, StoreError, SyncEvent, Task, TaskItemView,
    TaskListSnapshot, TaskListView, TaskStore, UserIdentity, ViewState,
};
use uuid::Uuid;
use wasm_bindgen::JsCast;
use web_sys::HtmlInputElement;

pub mod api;
pub mod config;

use api::HttpBackend;
use config::ClientConfig;

#[derive(Debug, Clone)]
pub enum Msg {
    // Task list
    SetNewTaskText(String),
    SubmitNewTask,
    SetHideCompleted(bool),
    // Task rows
    SetChecked(Uuid, bool),
    DeleteTask(Uuid),
    // Backend answer for a load or a task change, mirrored on arrival
    Settled(Result<SyncEvent, StoreError>),
    // Accounts
    SetUsername(String),
    SetEmail(String),
    SetPassword(String),
    SignIn,
    SignUp,
    SignOut,
    UserLoaded(Result<Option<UserIdentity>, StoreError>),
}

pub struct Model {
    config: ClientConfig,
    backend: HttpBackend,
    list: TaskListView<HttpBackend>,
    items: TaskItemView<HttpBackend>,
    new_task: NewTaskForm,
    sign_in: SignInForm,
    _title_sub: Subscription,
    // Last, so every state above is dropped before its runtime.
    rt: RefCell<Runtime>,
}

impl Model {
    pub fn new(config: ClientConfig) -> Self {
        let rt = Runtime::new();
        let backend = HttpBackend::new(&config.api_base);
        let list = TaskListView::new(TaskStore::new(backend.clone()), ViewState::new(), AccountState::new());
        let items = list.items();
        let title_sub = list.watch(|snapshot| set_document_title(snapshot.incomplete_count));

        Self {
            config,
            backend,
            list,
            items,
            new_task: NewTaskForm::default(),
            sign_in: SignInForm::default(),
            _title_sub: title_sub,
            rt: RefCell::new(rt),
        }
    }

    fn dispatch(&mut self, msg: Msg) -> Cmd<Msg> {
        match msg {
            Msg::SetNewTaskText(text) => {
                self.new_task.text = text;
                Cmd::none()
            }
            Msg::SubmitNewTask => {
                let pending = self
                    .list
                    .submit_new_task(&mut self.new_task, &mut self.rt.borrow_mut().sc());
                Cmd::new(async move { Msg::Settled(pending.await) })
            }
            Msg::SetHideCompleted(checked) => {
                self.list.toggle_hide_completed(checked, self.rt.borrow_mut().ac());
                Cmd::none()
            }
            Msg::SetChecked(id, checked) => {
                let pending = self.items.toggle_checked(id, checked);
                Cmd::new(async move { Msg::Settled(pending.await) })
            }
            Msg::DeleteTask(id) => {
                let pending = self.items.delete(id);
                Cmd::new(async move { Msg::Settled(pending.await) })
            }
            Msg::Settled(outcome) => {
                // Logged by the store; a failed change simply never shows.
                let settled = self.list.settle(outcome, self.rt.borrow_mut().ac());
                if let Err(err) = settled {
                    tracing::debug!(error = %err, "task change not applied");
                }
                Cmd::none()
            }
            Msg::SetUsername(username) => {
                self.sign_in.username = username;
                Cmd::none()
            }
            Msg::SetEmail(email) => {
                self.sign_in.email = email;
                Cmd::none()
            }
            Msg::SetPassword(password) => {
                self.sign_in.password = password;
                Cmd::none()
            }
            Msg::SignIn => {
                let credentials = self.sign_in.credentials(self.config.accounts.password_signup_fields);
                self.sign_in.clear_password();
                let backend = self.backend.clone();
                Cmd::new(async move { Msg::UserLoaded(backend.sign_in(&credentials).await) })
            }
            Msg::SignUp => {
                let credentials = self.sign_in.credentials(self.config.accounts.password_signup_fields);
                self.sign_in.clear_password();
                let backend = self.backend.clone();
                Cmd::new(async move { Msg::UserLoaded(backend.sign_up(&credentials).await) })
            }
            Msg::SignOut => {
                let backend = self.backend.clone();
                Cmd::new(async move { Msg::UserLoaded(backend.sign_out().await) })
            }
            Msg::UserLoaded(Ok(user)) => {
                self.list.accounts().set_user(user, self.rt.borrow_mut().ac());
                Cmd::none()
            }
            Msg::UserLoaded(Err(err)) => {
                tracing::warn!(error = %err, "account request failed");
                Cmd::none()
            }
        }
    }
}

impl Application for Model {
    type MSG = Msg;

    fn init(&mut self) -> Cmd<Msg> {
        {
            let mut rt = self.rt.borrow_mut();
            self.list.view_state().reset(rt.ac());
            // First run of the title effect.
            rt.update();
        }
        tracing::info!(
            signup_fields = %self.config.accounts.password_signup_fields,
            "accounts configured"
        );

        let store = self.list.store().clone();
        let backend = self.backend.clone();
        Cmd::batch(vec![
            Cmd::new(async move { Msg::Settled(store.sync().await) }),
            Cmd::new(async move { Msg::UserLoaded(backend.current_user().await) }),
        ])
    }

    fn update(&mut self, msg: Msg) -> Cmd<Msg> {
        let cmd = self.dispatch(msg);
        self.rt.borrow_mut().update();
        cmd
    }

    fn view(&self) -> Node<Msg> {
        let (snapshot, user) = {
            let mut rt = self.rt.borrow_mut();
            let sc = &mut rt.sc();
            (self.list.snapshot(sc), self.list.accounts().current_user(sc))
        };
        div(
            [class("min-h-screen bg-ctp-base text-ctp-text")],
            [
                view_header(&snapshot),
                div(
                    [class("max-w-3xl mx-auto px-6 py-8 space-y-6")],
                    [
                        self.view_account_bar(user.as_ref()),
                        self.view_new_task_form(),
                        view_task_list(&snapshot.tasks),
                    ],
                ),
            ],
        )
    }
}

impl Model {
    fn view_account_bar(&self, user: Option<&UserIdentity>) -> Node<Msg> {
        match user {
            Some(user) => div([class("flex items-center justify-between text-sm text-ctp-subtext1")], [
                span([], [text(&format!("Signed in as {}", user.username))]),
                button([
                    on_click(|_| Msg::SignOut),
                    r#type("button"),
                    class("text-ctp-red hover:underline"),
                ], [text("Sign out")]),
            ]),
            None => div(
                [class("p-4 bg-ctp-surface0 rounded-lg border border-ctp-surface1 space-y-3")],
                self.config
                    .accounts
                    .password_signup_fields
                    .fields()
                    .iter()
                    .map(|field| self.view_signup_field(*field))
                    .chain([div([class("flex gap-2")], [
                        button([
                            on_click(|_| Msg::SignIn),
                            r#type("button"),
                            class("bg-ctp-blue hover:bg-ctp-sapphire text-ctp-base font-medium px-4 py-2 rounded-md transition-colors duration-200"),
                        ], [text("Sign in")]),
                        button([
                            on_click(|_| Msg::SignUp),
                            r#type("button"),
                            class("bg-ctp-surface2 hover:bg-ctp-overlay0 text-ctp-text font-medium px-4 py-2 rounded-md transition-colors duration-200"),
                        ], [text("Create account")]),
                    ])])
                    .collect::<Vec<_>>(),
            ),
        }
    }

    fn view_signup_field(&self, field: SignupField) -> Node<Msg> {
        let (current, handler) = match field {
            SignupField::Username => (
                &self.sign_in.username,
                on_input(|event| Msg::SetUsername(event.value())),
            ),
            SignupField::Email | SignupField::OptionalEmail => (
                &self.sign_in.email,
                on_input(|event| Msg::SetEmail(event.value())),
            ),
            SignupField::Password => (
                &self.sign_in.password,
                on_input(|event| Msg::SetPassword(event.value())),
            ),
        };
        input([
            r#type(field.input_type()),
            placeholder(field.label()),
            value(current),
            handler,
            class("w-full px-3 py-2 bg-ctp-surface1 border border-ctp-surface2 rounded-md text-ctp-text placeholder-ctp-subtext0 focus:outline-none focus:ring-2 focus:ring-ctp-blue"),
        ], [])
    }

    // Always rendered: a signed-out submit is sent and refused by the backend.
    fn view_new_task_form(&self) -> Node<Msg> {
        form([
            class("new-task flex gap-2"),
            on_submit(|event| {
                event.prevent_default();
                Msg::SubmitNewTask
            }),
        ], [
            input([
                r#type("text"),
                placeholder("Type to add new tasks"),
                value(&self.new_task.text),
                on_input(|event| Msg::SetNewTaskText(event.value())),
                class("flex-1 px-3 py-2 bg-ctp-surface0 border border-ctp-surface2 rounded-md text-ctp-text placeholder-ctp-subtext0 focus:outline-none focus:ring-2 focus:ring-ctp-blue focus:border-transparent"),
            ], []),
            button([
                r#type("submit"),
                class("bg-ctp-blue hover:bg-ctp-sapphire text-ctp-base font-medium px-6 py-2 rounded-md transition-colors duration-200"),
            ], [text("Add")]),
        ])
    }
}

fn view_header(snapshot: &TaskListSnapshot) -> Node<Msg> {
    let hide_completed = snapshot.hide_completed;
    header([class("bg-ctp-mantle shadow-lg border-b border-ctp-surface0")], [
        div([class("max-w-3xl mx-auto px-6 py-4 flex items-center justify-between")], [
            h1([class("text-2xl font-bold text-ctp-text")], [
                text(&format!("Todo List ({})", snapshot.incomplete_count)),
            ]),
            label([class("hide-completed flex items-center gap-2 text-sm text-ctp-subtext1 cursor-pointer")], [
                input([
                    r#type("checkbox"),
                    checked(hide_completed),
                    on_click(move |event| {
                        Msg::SetHideCompleted(checkbox_state(&event).unwrap_or(!hide_completed))
                    }),
                ], []),
                text("Hide Completed Tasks"),
            ]),
        ]),
    ])
}

fn view_task_list(tasks: &[Task]) -> Node<Msg> {
    if tasks.is_empty() {
        return div([class("text-center py-12 text-ctp-subtext0")], [text("Nothing to show.")]);
    }
    ul(
        [class("space-y-2")],
        tasks.iter().map(view_task).collect::<Vec<_>>(),
    )
}

fn view_task(task: &Task) -> Node<Msg> {
    let task_id = task.id;
    let is_checked = task.is_checked();

    li(
        [
            key(task.id.to_string()),
            class(&format!(
                "flex items-center gap-3 rounded-lg border px-4 py-3 transition-colors duration-200 {}",
                if is_checked {
                    "checked border-ctp-green bg-ctp-green/10"
                } else {
                    "border-ctp-surface1 bg-ctp-surface0"
                }
            )),
        ],
        [
            button([
                r#type("button"),
                on_click(move |_| Msg::DeleteTask(task_id)),
                class("delete w-8 h-8 rounded-lg bg-ctp-red/20 text-ctp-red hover:bg-ctp-red/30"),
            ], [text("×")]),
            input([
                r#type("checkbox"),
                checked(is_checked),
                id(&format!("checkbox-{}", task.id)),
                on_click(move |event| {
                    Msg::SetChecked(task_id, checkbox_state(&event).unwrap_or(!is_checked))
                }),
                class("toggle-checked"),
            ], []),
            span(
                [class(if is_checked {
                    "text line-through text-ctp-overlay1"
                } else {
                    "text text-ctp-text"
                })],
                [
                    span([class("font-semibold")], [text(&task.username)]),
                    text(&format!(" - {}", task.text)),
                ],
            ),
        ],
    )
}

/// Checked state of the checkbox that raised `event`.
fn checkbox_state(event: &web_sys::Event) -> Option<bool> {
    event
        .target()?
        .dyn_into::<HtmlInputElement>()
        .ok()
        .map(|input| input.checked())
}

fn set_document_title(incomplete: usize) {
    if let Some(document) = web_sys::window().and_then(|window| window.document()) {
        document.set_title(&format!("Todo List ({})", incomplete));
    }
}

#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_tracing::set_as_global_default();

    let config = ClientConfig::from_document();
    tracing::info!(api_base = %config.api_base, "starting task list client");
    Program::mount_to_body(Model::new(config));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find_tag<'a>(node: &'a Node<Msg>, tag: &str) -> Option<&'a Node<Msg>> {
        if node.tag().is_some_and(|t| *t == tag) {
            return Some(node);
        }
        node.children().iter().find_map(|child| find_tag(child, tag))
    }

    #[test]
    fn new_task_input_sits_in_a_submitting_form() {
        let model = Model::new(ClientConfig::default());
        let page = model.view();

        let form = find_tag(&page, "form").expect("new task form");
        let attributes = form.attributes().unwrap_or_default();
        assert!(attributes
            .iter()
            .any(|attr| *attr.name() == "submit" && attr.is_event_listener()));

        // Enter in the text input submits through the form, not a click handler.
        let html = form.render_to_string();
        assert!(html.contains(r#"type="text""#));
        assert!(html.contains(r#"type="submit""#));
    }

    #[test]
    fn header_counts_incomplete_tasks() {
        let model = Model::new(ClientConfig::default());
        let html = model.view().render_to_string();
        assert!(html.contains("Todo List (0)"));
        assert!(html.contains("Nothing to show."));
    }
}
