// todoq - single-queue terminal TODO manager with write-through JSON persistence

pub mod config;
pub mod export;
pub mod keymap;
pub mod logging;
pub mod persistence;
pub mod store;
pub mod task;
pub mod theme;
pub mod tui;
pub mod window;

// Re-export main types for convenience
pub use persistence::{
    Autosave, Hydration, HydrationSource, LoadError, hydrate, load_all, load_chunked, save, try_load_all,
};
pub use store::{Observer, SelectionState, TaskStore};
pub use task::{Task, now_ms};
pub use window::window;
