// todostore - Single-user task list with local persistence and filtered views

pub mod app;
pub mod config;
pub mod models;
pub mod render;
pub mod sqlite;
pub mod storage;
pub mod store;
pub mod view;

// Re-export main types for convenience
pub use app::{App, Intent, Outcome};
pub use models::{Task, now, now_ms};
pub use render::{DisplaySurface, HtmlSurface, TaskItem, TerminalSurface, render};
pub use sqlite::SqliteStorage;
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError};
pub use store::{DEFAULT_KEY, StoreError, TaskStore};
pub use view::{CountSummary, FilterKind, ViewModel, compute_view};
