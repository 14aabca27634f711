// In-memory task queue with cursor state and synchronous observers

use crate::task::Task;
use eyre::Result;
use tracing::{debug, warn};

/// Receives a snapshot of the collection after every accepted mutation
///
/// Observers run synchronously, in registration order, before the mutating
/// call returns. An error from an observer is handed back to the caller of the
/// mutation; the in-memory change itself is kept.
pub trait Observer {
    fn on_change(&mut self, tasks: &[Task]) -> Result<()>;
}

impl<F> Observer for F
where
    F: FnMut(&[Task]) -> Result<()>,
{
    fn on_change(&mut self, tasks: &[Task]) -> Result<()> {
        self(tasks)
    }
}

/// UI-facing selection state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    /// Index of the selected row; always `< len` when the list is non-empty, else 0
    pub cursor: usize,
    /// Whether the edit panel is visible
    pub modal_open: bool,
    /// Reserved for search; currently always empty
    pub filter: String,
}

/// Owner of the ordered task collection
///
/// Index-based operations (`remove_at`, `toggle_done_at`, `update_fields`)
/// treat an out-of-range index as a silent no-op: they return `Ok(false)` or
/// `Ok(None)` and notify nobody. A stale cursor from a racing key event must
/// never take the session down.
#[derive(Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
    selection: SelectionState,
    observers: Vec<Box<dyn Observer>>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `tasks` and no observers
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            ..Self::default()
        }
    }

    /// Register an observer; it is notified after every later mutation
    pub fn subscribe(&mut self, observer: impl Observer + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn cursor(&self) -> usize {
        self.selection.cursor
    }

    /// Task under the cursor, if any
    pub fn current(&self) -> Option<&Task> {
        self.tasks.get(self.selection.cursor)
    }

    // ========================================================================
    // Collection mutations
    // ========================================================================

    /// Replace the whole collection (hydration). The cursor is left as is.
    pub fn replace_all(&mut self, tasks: Vec<Task>) -> Result<()> {
        debug!(count = tasks.len(), "replace_all");
        self.tasks = tasks;
        self.notify()
    }

    /// Append a new task and return its id. The cursor does not move.
    pub fn add(&mut self, title: impl Into<String>) -> Result<String> {
        let task = Task::new(title);
        let id = task.id.clone();
        debug!(id = %id, "add");
        self.tasks.push(task);
        self.notify()?;
        Ok(id)
    }

    /// Delete the task at `index` and re-clamp the cursor
    pub fn remove_at(&mut self, index: usize) -> Result<Option<Task>> {
        if index >= self.tasks.len() {
            debug!(index, len = self.tasks.len(), "remove_at: out of range, ignored");
            return Ok(None);
        }

        let removed = self.tasks.remove(index);
        self.selection.cursor = clamp_index(self.selection.cursor, self.tasks.len());
        debug!(id = %removed.id, index, "remove_at");

        self.notify()?;
        Ok(Some(removed))
    }

    /// Flip `done` on the task at `index`
    pub fn toggle_done_at(&mut self, index: usize) -> Result<bool> {
        let Some(task) = self.tasks.get_mut(index) else {
            debug!(index, "toggle_done_at: out of range, ignored");
            return Ok(false);
        };

        task.done = !task.done;
        debug!(id = %task.id, done = task.done, "toggle_done_at");

        self.notify()?;
        Ok(true)
    }

    /// Replace title, detail and tags of the task at `index`
    ///
    /// `id`, `created_at` and `done` are left untouched.
    pub fn update_fields(
        &mut self,
        index: usize,
        title: impl Into<String>,
        detail: Option<String>,
        tags: Vec<String>,
    ) -> Result<bool> {
        let Some(task) = self.tasks.get_mut(index) else {
            debug!(index, "update_fields: out of range, ignored");
            return Ok(false);
        };

        task.title = title.into();
        task.detail = detail;
        task.tags = tags;
        debug!(id = %task.id, "update_fields");

        self.notify()?;
        Ok(true)
    }

    /// Re-send the current snapshot to every observer
    ///
    /// Used to retry a write-through that failed earlier.
    pub fn flush(&mut self) -> Result<()> {
        self.notify()
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Store `index` clamped into `[0, len-1]` (0 when empty)
    pub fn set_cursor(&mut self, index: i64) {
        let len = self.tasks.len();
        self.selection.cursor = if len == 0 || index <= 0 {
            0
        } else {
            (index as u64).min(len as u64 - 1) as usize
        };
    }

    /// Move the cursor by `delta` rows, clamped
    pub fn move_cursor(&mut self, delta: i64) {
        self.set_cursor((self.selection.cursor as i64).saturating_add(delta));
    }

    pub fn open_modal(&mut self) {
        self.selection.modal_open = true;
    }

    pub fn close_modal(&mut self) {
        self.selection.modal_open = false;
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    fn notify(&mut self) -> Result<()> {
        let mut first_err = None;

        for (i, observer) in self.observers.iter_mut().enumerate() {
            if let Err(e) = observer.on_change(&self.tasks) {
                warn!(observer = i, error = %e, "Observer failed");
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

fn clamp_index(index: usize, len: usize) -> usize {
    if len == 0 { 0 } else { index.min(len - 1) }
}
