// Task store: the ordered task sequence and its persistence

use crate::models::{self, Task};
use crate::storage::{KeyValueStorage, StorageError};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Storage key used when none is configured
pub const DEFAULT_KEY: &str = "todos";

/// Time source for task creation
pub type Clock = fn() -> DateTime<Utc>;

/// Errors returned by [`TaskStore`] operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("task text cannot be empty or whitespace-only")]
    EmptyInput,

    #[error("no task id left after {0}")]
    IdsExhausted(i64),

    #[error("failed to serialize tasks")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Owns the newest-first task sequence and keeps it persisted
///
/// Every mutation that changes the sequence writes the whole sequence to the
/// storage backend before it is applied in memory. If the write fails the
/// error is returned and the in-memory sequence is left untouched.
pub struct TaskStore<S> {
    storage: S,
    key: String,
    tasks: Vec<Task>,
    clock: Clock,
}

impl<S: KeyValueStorage> TaskStore<S> {
    /// Load the task sequence stored under `key`
    ///
    /// Missing or malformed data yields an empty store. Only a failing
    /// storage read is returned as an error.
    pub fn open(storage: S, key: impl Into<String>) -> Result<Self, StoreError> {
        let key = key.into();
        let tasks = match storage.get(&key)? {
            Some(raw) => decode_tasks(&raw),
            None => Vec::new(),
        };

        info!(key = %key, count = tasks.len(), "Loaded tasks");

        Ok(Self {
            storage,
            key,
            tasks,
            clock: models::now,
        })
    }

    /// Replace the time source used by [`TaskStore::create`]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Current tasks, newest first
    pub fn list(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: i64) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Create a task from user input and put it at the head of the sequence
    pub fn create(&mut self, text: &str) -> Result<Task, StoreError> {
        let text = text.trim();
        if text.is_empty() {
            debug!("Declining to create task with empty text");
            return Err(StoreError::EmptyInput);
        }

        let created_at = (self.clock)();
        let task = Task {
            id: self.next_id(created_at)?,
            text: text.to_string(),
            completed: false,
            created_at,
        };

        let mut next = Vec::with_capacity(self.tasks.len() + 1);
        next.push(task.clone());
        next.extend(self.tasks.iter().cloned());
        self.commit(next)?;

        info!(id = task.id, "Created task");
        Ok(task)
    }

    /// Remove the task with `id`. Returns false if no such task exists.
    pub fn delete(&mut self, id: i64) -> Result<bool, StoreError> {
        let Some(pos) = self.position(id) else {
            debug!(id, "delete: task not found");
            return Ok(false);
        };

        let mut next = self.tasks.clone();
        next.remove(pos);
        self.commit(next)?;

        info!(id, "Deleted task");
        Ok(true)
    }

    /// Flip the completion flag of the task with `id`. Returns false if no
    /// such task exists.
    pub fn toggle_completed(&mut self, id: i64) -> Result<bool, StoreError> {
        let Some(pos) = self.position(id) else {
            debug!(id, "toggle_completed: task not found");
            return Ok(false);
        };

        let mut next = self.tasks.clone();
        next[pos].completed = !next[pos].completed;
        let completed = next[pos].completed;
        self.commit(next)?;

        info!(id, completed, "Toggled task");
        Ok(true)
    }

    /// Remove every completed task, returning how many were removed
    pub fn clear_completed(&mut self) -> Result<usize, StoreError> {
        let next: Vec<Task> = self.tasks.iter().filter(|task| task.is_active()).cloned().collect();
        let removed = self.tasks.len() - next.len();
        if removed == 0 {
            debug!("clear_completed: nothing to remove");
            return Ok(0);
        }

        self.commit(next)?;

        info!(removed, "Cleared completed tasks");
        Ok(removed)
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    fn position(&self, id: i64) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    /// Creation time in milliseconds, bumped past every id already held
    fn next_id(&self, created_at: DateTime<Utc>) -> Result<i64, StoreError> {
        let candidate = created_at.timestamp_millis();
        match self.tasks.iter().map(|task| task.id).max() {
            Some(max) if candidate <= max => max.checked_add(1).ok_or(StoreError::IdsExhausted(max)),
            _ => Ok(candidate),
        }
    }

    fn commit(&mut self, next: Vec<Task>) -> Result<(), StoreError> {
        let payload = encode_tasks(&next)?;
        self.storage.set(&self.key, &payload)?;
        debug!(key = %self.key, count = next.len(), "Persisted tasks");

        self.tasks = next;
        Ok(())
    }
}

/// Serialize a task sequence into its persisted form
pub fn encode_tasks(tasks: &[Task]) -> Result<String, serde_json::Error> {
    serde_json::to_string(tasks)
}

/// Parse a persisted task sequence, recovering from bad data
///
/// A payload that is not a JSON array loads as empty. Inside an array,
/// records that fail to parse, have blank text, or repeat an earlier id are
/// skipped with a warning; the remaining records keep their order.
pub fn decode_tasks(raw: &str) -> Vec<Task> {
    let values: Vec<serde_json::Value> = match serde_json::from_str(raw) {
        Ok(values) => values,
        Err(e) => {
            warn!(error = %e, "Persisted tasks are malformed, starting empty");
            return Vec::new();
        }
    };

    let mut seen = HashSet::with_capacity(values.len());
    let mut tasks = Vec::with_capacity(values.len());

    for (index, value) in values.into_iter().enumerate() {
        let task: Task = match serde_json::from_value(value) {
            Ok(task) => task,
            Err(e) => {
                warn!(index, error = %e, "Failed to parse task record, skipping");
                continue;
            }
        };

        if task.text.trim().is_empty() {
            warn!(index, id = task.id, "Task record has empty text, skipping");
            continue;
        }

        if !seen.insert(task.id) {
            warn!(index, id = task.id, "Duplicate task id, skipping");
            continue;
        }

        tasks.push(task);
    }

    tasks
}
