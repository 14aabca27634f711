use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::cursor::Show;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use eyre::Result;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::export;
use crate::persistence::{self, Autosave};
use crate::store::TaskStore;
use crate::task::{Task, parse_tags};

use super::input;
use super::render;

/// Field focused in the edit panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Tags,
    Detail,
}

impl Field {
    pub fn next(self) -> Self {
        match self {
            Field::Title => Field::Tags,
            Field::Tags => Field::Detail,
            Field::Detail => Field::Title,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Field::Title => Field::Detail,
            Field::Tags => Field::Title,
            Field::Detail => Field::Tags,
        }
    }
}

/// Edit buffers for the task under the cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditForm {
    pub index: usize,
    pub title: String,
    pub tags: String,
    pub detail: String,
    pub field: Field,
}

impl EditForm {
    pub fn from_task(index: usize, task: &Task) -> Self {
        Self {
            index,
            title: task.title.clone(),
            tags: task.tags.join(", "),
            detail: task.detail.clone().unwrap_or_default(),
            field: Field::Title,
        }
    }

    pub fn active_mut(&mut self) -> &mut String {
        match self.field {
            Field::Title => &mut self.title,
            Field::Tags => &mut self.tags,
            Field::Detail => &mut self.detail,
        }
    }
}

/// Current interaction mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    /// Typing the title of a new task
    Add(String),
    /// Edit panel open
    Edit(EditForm),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

/// One-line message under the list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub text: String,
    pub kind: StatusKind,
}

/// Whether a successful store call actually reached the observers
pub trait WriteOutcome {
    fn wrote(&self) -> bool;
}

impl WriteOutcome for () {
    fn wrote(&self) -> bool {
        true
    }
}

/// `add` returns the new id
impl WriteOutcome for String {
    fn wrote(&self) -> bool {
        true
    }
}

/// `toggle_done_at` / `update_fields`: `false` means out of range
impl WriteOutcome for bool {
    fn wrote(&self) -> bool {
        *self
    }
}

/// `remove_at`: `None` means out of range
impl<T> WriteOutcome for Option<T> {
    fn wrote(&self) -> bool {
        self.is_some()
    }
}

/// Main application state
pub struct App {
    pub store: TaskStore,
    pub config: Config,
    pub mode: Mode,
    pub status: Option<Status>,
    /// The last write-through failed; the file may be behind memory
    pub unsaved: bool,
    /// A quit was refused once because of unsaved changes
    pub quit_armed: bool,
    pub should_quit: bool,
}

impl App {
    /// Hydrate from the configured data file and enable write-through
    pub fn open(config: Config) -> Self {
        let hydration = persistence::hydrate(&config.data_path);
        let warning = hydration.warning();

        let mut store = TaskStore::new();
        if let Err(e) = store.replace_all(hydration.tasks) {
            // No observers yet, so this cannot fail in practice
            warn!(error = %e, "replace_all failed during hydration");
        }
        store.subscribe(Autosave::new(&config.data_path));

        let mut app = Self::with_store(store, config);
        if let Some(w) = warning {
            app.set_error(w);
        }
        app
    }

    pub fn with_store(store: TaskStore, config: Config) -> Self {
        Self {
            store,
            config,
            mode: Mode::Navigate,
            status: None,
            unsaved: false,
            quit_armed: false,
            should_quit: false,
        }
    }

    pub fn set_info(&mut self, text: impl Into<String>) {
        self.status = Some(Status {
            text: text.into(),
            kind: StatusKind::Info,
        });
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        self.status = Some(Status {
            text: text.into(),
            kind: StatusKind::Error,
        });
    }

    /// Record the outcome of a store mutation
    ///
    /// Every write stores the whole collection, so one success makes all
    /// earlier changes durable again. An out-of-range no-op wrote nothing and
    /// leaves the unsaved state alone.
    pub fn track<T: WriteOutcome>(&mut self, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => {
                if value.wrote() {
                    if self.unsaved {
                        self.set_info("Saved");
                    }
                    self.unsaved = false;
                }
                Some(value)
            }
            Err(e) => {
                error!(error = %e, "Write-through failed");
                self.unsaved = true;
                self.set_error(format!("Not saved: {:#}", e));
                None
            }
        }
    }

    /// Quit, unless the last change could not be written
    ///
    /// With unsaved changes the write is retried; if it fails again the quit
    /// is refused once, and a second request quits anyway.
    pub fn request_quit(&mut self) {
        if !self.unsaved {
            self.should_quit = true;
            return;
        }

        let result = self.store.flush();
        if self.track(result).is_some() {
            self.should_quit = true;
        } else if self.quit_armed {
            warn!("Quitting with unsaved changes");
            self.should_quit = true;
        } else {
            self.quit_armed = true;
            let reason = self.status.as_ref().map(|s| s.text.clone()).unwrap_or_default();
            self.set_error(format!("{} - press quit again to discard", reason));
        }
    }

    pub fn export_markdown(&mut self) {
        match export::export_markdown(&self.config.export_dir, self.store.tasks()) {
            Ok(path) => self.set_info(format!("Exported Markdown: {}", path.display())),
            Err(e) => self.set_error(format!("Export failed: {:#}", e)),
        }
    }

    pub fn export_csv(&mut self) {
        match export::export_csv(&self.config.export_dir, self.store.tasks()) {
            Ok(path) => self.set_info(format!("Exported CSV: {}", path.display())),
            Err(e) => self.set_error(format!("Export failed: {:#}", e)),
        }
    }

    /// Open the edit panel on the task under the cursor
    pub fn open_editor(&mut self) {
        let index = self.store.cursor();
        match self.store.current() {
            Some(task) => {
                let form = EditForm::from_task(index, task);
                self.store.open_modal();
                self.mode = Mode::Edit(form);
            }
            None => self.set_info("Nothing to edit"),
        }
    }

    pub fn close_editor(&mut self) {
        self.store.close_modal();
        self.mode = Mode::Navigate;
    }

    /// Write the edit buffers back to the task they came from
    pub fn commit_edit(&mut self, form: EditForm) {
        let detail = Some(form.detail).filter(|d| !d.is_empty());
        let result = self
            .store
            .update_fields(form.index, form.title, detail, parse_tags(&form.tags));
        self.close_editor();
        self.track(result);
    }
}

type PanicHook = Box<dyn Fn(&std::panic::PanicHookInfo<'_>) + Sync + Send + 'static>;

/// Run the TUI application
pub fn run(config: Config) -> Result<()> {
    let mut app = App::open(config);
    info!(count = app.store.len(), "Starting TUI");

    let guard = PanicGuard::install();
    let result = enable_raw_mode()
        .map_err(eyre::Report::from)
        .and_then(|()| run_in_terminal(&mut app));

    // Restore terminal on every path, including failed setup
    let restored = restore_terminal();
    drop(guard);

    if app.unsaved {
        eprintln!("todoq: last change was not saved to {}", app.config.data_path.display());
    }
    result?;
    restored?;
    Ok(())
}

fn run_in_terminal(app: &mut App) -> Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    run_event_loop(&mut terminal, app)
}

fn restore_terminal() -> io::Result<()> {
    let raw = disable_raw_mode();
    execute!(io::stdout(), LeaveAlternateScreen, Show)?;
    raw
}

/// Restores the terminal if a panic happens while alive; reinstalls the
/// previous panic hook on drop
struct PanicGuard {
    original: Option<Arc<PanicHook>>,
}

impl PanicGuard {
    fn install() -> Self {
        let original: Arc<PanicHook> = Arc::new(std::panic::take_hook());
        let hook = Arc::clone(&original);
        std::panic::set_hook(Box::new(move |panic_info| {
            let _ = restore_terminal();
            (**hook)(panic_info);
        }));
        Self {
            original: Some(original),
        }
    }
}

impl Drop for PanicGuard {
    fn drop(&mut self) {
        // take_hook panics on a panicking thread
        if std::thread::panicking() {
            return;
        }
        // Dropping our hook releases its clone of the original
        drop(std::panic::take_hook());
        if let Some(original) = self.original.take() {
            match Arc::try_unwrap(original) {
                Ok(hook) => std::panic::set_hook(hook),
                Err(shared) => std::panic::set_hook(Box::new(move |info| (**shared)(info))),
            }
        }
    }
}

fn run_event_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    input::handle_key(app, key);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
