use sigmut::{ActionContext, SignalContext, State};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKey {
    HideCompleted,
}

/// Per-session UI flags. Never persisted; a fresh session starts from
/// defaults.
///
/// Reading a flag inside a signal subscribes that signal to the flag.
#[derive(Clone)]
pub struct ViewState {
    hide_completed: State<bool>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ViewState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewState").finish_non_exhaustive()
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self {
            hide_completed: State::new(false),
        }
    }

    pub fn get(&self, key: ViewKey, sc: &mut SignalContext) -> bool {
        self.slot(key).get(sc)
    }

    /// Dependents of `key` are invalidated only when the value changes.
    pub fn set(&self, key: ViewKey, value: bool, ac: &mut ActionContext) {
        self.slot(key).set_dedup(value, ac);
        tracing::debug!(?key, value, "view state set");
    }

    pub fn hide_completed(&self, sc: &mut SignalContext) -> bool {
        self.get(ViewKey::HideCompleted, sc)
    }

    /// Back to session defaults.
    pub fn reset(&self, ac: &mut ActionContext) {
        self.set(ViewKey::HideCompleted, false, ac);
    }

    fn slot(&self, key: ViewKey) -> &State<bool> {
        match key {
            ViewKey::HideCompleted => &self.hide_completed,
        }
    }
}
