// Application context: routes user intents to the store and renders views

use crate::models::Task;
use crate::render::{DisplaySurface, render};
use crate::storage::KeyValueStorage;
use crate::store::{StoreError, TaskStore};
use crate::view::{FilterKind, ViewModel, compute_view};
use tracing::debug;

/// A user action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Submit(String),
    Toggle(i64),
    Delete(i64),
    ClearCompleted,
    SetFilter(FilterKind),
}

/// What a dispatched intent did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Created(Task),
    /// Blank input, silently ignored
    Declined,
    Toggled(i64),
    Deleted(i64),
    Cleared(usize),
    /// The intent referenced a task that does not exist
    Unchanged,
    FilterChanged(FilterKind),
}

/// Holds the task store and the current filter
///
/// `dispatch` never renders. Callers re-render after every dispatch with
/// [`App::render`].
pub struct App<S> {
    store: TaskStore<S>,
    filter: FilterKind,
}

impl<S: KeyValueStorage> App<S> {
    /// Wrap a store, starting with the default filter
    pub fn new(store: TaskStore<S>) -> Self {
        Self {
            store,
            filter: FilterKind::default(),
        }
    }

    /// Load tasks and the remembered filter from `storage`
    pub fn open(storage: S, key: &str) -> Result<Self, StoreError> {
        let filter = storage
            .get(&filter_key(key))?
            .map(|name| FilterKind::parse_lenient(&name))
            .unwrap_or_default();
        let store = TaskStore::open(storage, key)?;

        debug!(key, %filter, "Opened app");
        Ok(Self { store, filter })
    }

    pub fn store(&self) -> &TaskStore<S> {
        &self.store
    }

    pub fn filter(&self) -> FilterKind {
        self.filter
    }

    pub fn dispatch(&mut self, intent: Intent) -> Result<Outcome, StoreError> {
        debug!(?intent, "Dispatching intent");

        let outcome = match intent {
            Intent::Submit(text) => match self.store.create(&text) {
                Ok(task) => Outcome::Created(task),
                Err(StoreError::EmptyInput) => Outcome::Declined,
                Err(e) => return Err(e),
            },
            Intent::Toggle(id) => {
                if self.store.toggle_completed(id)? {
                    Outcome::Toggled(id)
                } else {
                    Outcome::Unchanged
                }
            }
            Intent::Delete(id) => {
                if self.store.delete(id)? {
                    Outcome::Deleted(id)
                } else {
                    Outcome::Unchanged
                }
            }
            Intent::ClearCompleted => Outcome::Cleared(self.store.clear_completed()?),
            Intent::SetFilter(filter) => {
                let key = filter_key(self.store.key());
                self.store.storage_mut().set(&key, filter.as_str())?;
                self.filter = filter;
                Outcome::FilterChanged(filter)
            }
        };

        Ok(outcome)
    }

    /// View of the current tasks under the current filter
    pub fn view(&self) -> ViewModel<'_> {
        self.view_as(self.filter)
    }

    /// View under `filter` without changing the current filter
    pub fn view_as(&self, filter: FilterKind) -> ViewModel<'_> {
        compute_view(self.store.list(), filter)
    }

    /// Recompute the view and redisplay it on `surface`
    pub fn render<D: DisplaySurface + ?Sized>(&self, surface: &mut D) {
        render(&self.view(), surface);
    }
}

fn filter_key(key: &str) -> String {
    format!("{}.filter", key)
}
