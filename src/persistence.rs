// JSON data file operations: full load, chunked load, write-through save

use crate::store::Observer;
use crate::task::{DataFile, Task, now_ms};
use eyre::{Context, Result};
use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Chunk size used by startup hydration
pub const DEFAULT_CHUNK_SIZE: usize = 100;

/// Why an existing data file could not be loaded
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("could not read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("could not parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Read the whole data file
///
/// Returns `Ok(None)` when the file does not exist, which is the normal state
/// on first launch. An unreadable or malformed file is an error.
pub fn try_load_all(path: &Path) -> Result<Option<Vec<Task>>, LoadError> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(file = ?path, "Data file does not exist yet");
            return Ok(None);
        }
        Err(e) => {
            return Err(LoadError::Read {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    // I/O failures surface through serde_json too (e.g. a directory at `path`)
    let data: DataFile = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        if e.is_io() {
            LoadError::Read {
                path: path.to_path_buf(),
                source: e.into(),
            }
        } else {
            LoadError::Parse {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    info!(file = ?path, count = data.todos.len(), "Loaded tasks");
    Ok(Some(data.todos))
}

/// Read the whole data file, degrading every failure to an empty list
///
/// A missing file and a corrupt file look the same to the caller here; use
/// [`try_load_all`] or [`hydrate`] when the difference matters.
pub fn load_all(path: &Path) -> Vec<Task> {
    match try_load_all(path) {
        Ok(tasks) => tasks.unwrap_or_default(),
        Err(e) => {
            warn!(file = ?path, error = %e, "Failed to load data file, starting empty");
            Vec::new()
        }
    }
}

/// Lazily yield the persisted collection in slices of at most `chunk_size`
///
/// The sequence is finite and cannot be restarted. It is empty when the file
/// is missing or cannot be parsed, so zero chunks is ambiguous between "no
/// file", "empty list" and "corrupt file"; fall back to [`try_load_all`] to
/// tell them apart. A `chunk_size` of zero is treated as one.
pub fn load_chunked(path: &Path, chunk_size: usize) -> Chunks {
    let tasks = match try_load_all(path) {
        Ok(tasks) => tasks.unwrap_or_default(),
        Err(e) => {
            warn!(file = ?path, error = %e, "Failed to load data file lazily");
            Vec::new()
        }
    };

    Chunks {
        remaining: tasks.into_iter(),
        chunk_size: chunk_size.max(1),
    }
}

/// Iterator returned by [`load_chunked`]
pub struct Chunks {
    remaining: std::vec::IntoIter<Task>,
    chunk_size: usize,
}

impl Iterator for Chunks {
    type Item = Vec<Task>;

    fn next(&mut self) -> Option<Self::Item> {
        let chunk: Vec<Task> = self.remaining.by_ref().take(self.chunk_size).collect();
        if chunk.is_empty() { None } else { Some(chunk) }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining.len().div_ceil(self.chunk_size);
        (n, Some(n))
    }
}

/// Write the whole collection to `path`
///
/// Parent directories are created as needed. The data goes to a temporary
/// file in the same directory which is synced and then renamed over `path`,
/// so a crash mid-write leaves the previous contents intact.
pub fn save(path: &Path, tasks: &[Task]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).with_context(|| format!("Failed to create directory {}", dir.display()))?;

    let data = DataFile {
        todos: tasks.to_vec(),
    };
    let json = serde_json::to_string_pretty(&data).context("Failed to serialize tasks")?;

    let mut tmp = NamedTempFile::new_in(dir).context("Failed to create temporary data file")?;
    tmp.write_all(json.as_bytes())?;
    tmp.as_file().sync_all()?; // Ensure data is flushed to disk
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    debug!(file = ?path, count = tasks.len(), "Saved tasks");
    Ok(())
}

/// Observer that writes every new snapshot straight to disk
#[derive(Debug, Clone)]
pub struct Autosave {
    path: PathBuf,
}

impl Autosave {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Observer for Autosave {
    fn on_change(&mut self, tasks: &[Task]) -> Result<()> {
        save(&self.path, tasks)
    }
}

// ============================================================================
// Hydration
// ============================================================================

/// Where the startup collection came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HydrationSource {
    /// No data file yet
    Missing,
    /// Data file parsed (possibly an empty list)
    File,
    /// Data file is not valid JSON; it was moved to `backup` when possible
    Corrupt { error: String, backup: Option<PathBuf> },
    /// Data file exists but could not be read; it is left where it is
    Unreadable { error: String },
}

/// Result of [`hydrate`]
#[derive(Debug, Clone)]
pub struct Hydration {
    pub tasks: Vec<Task>,
    pub source: HydrationSource,
}

impl Hydration {
    /// Message to show the user, if any
    pub fn warning(&self) -> Option<String> {
        match &self.source {
            HydrationSource::Corrupt { error, backup: Some(b) } => Some(format!(
                "Data file corrupt ({}); moved to {}",
                error,
                b.display()
            )),
            HydrationSource::Corrupt { error, backup: None } => {
                Some(format!("Data file corrupt ({}); starting empty", error))
            }
            HydrationSource::Unreadable { error } => {
                Some(format!("Data file unreadable ({}); starting empty", error))
            }
            _ => None,
        }
    }
}

/// Load the startup collection through the chunked reader
///
/// All chunks are drained before returning. When no chunk was produced the
/// full loader decides between a missing file, an empty list and a corrupt
/// file. A corrupt file is moved aside so the first write-through does not
/// overwrite the only copy of the user's data. A file that cannot be read at
/// all is never moved: the failure may be transient or about permissions,
/// not content.
pub fn hydrate(path: &Path) -> Hydration {
    let mut tasks = Vec::new();
    let mut chunks = 0usize;
    for chunk in load_chunked(path, DEFAULT_CHUNK_SIZE) {
        chunks += 1;
        tasks.extend(chunk);
    }

    if chunks > 0 {
        info!(file = ?path, chunks, count = tasks.len(), "Hydrated from data file");
        return Hydration {
            tasks,
            source: HydrationSource::File,
        };
    }

    match try_load_all(path) {
        Ok(None) => Hydration {
            tasks: Vec::new(),
            source: HydrationSource::Missing,
        },
        Ok(Some(tasks)) => Hydration {
            tasks,
            source: HydrationSource::File,
        },
        Err(e @ LoadError::Read { .. }) => {
            warn!(file = ?path, error = %e, "Data file is unreadable");
            Hydration {
                tasks: Vec::new(),
                source: HydrationSource::Unreadable { error: e.to_string() },
            }
        }
        Err(e @ LoadError::Parse { .. }) => {
            warn!(file = ?path, error = %e, "Data file is corrupt");
            let backup = match quarantine(path) {
                Ok(b) => Some(b),
                Err(qe) => {
                    warn!(file = ?path, error = %qe, "Failed to move corrupt data file aside");
                    None
                }
            };
            Hydration {
                tasks: Vec::new(),
                source: HydrationSource::Corrupt {
                    error: e.to_string(),
                    backup,
                },
            }
        }
    }
}

/// Rename `path` to `<path>.corrupt-<epoch-ms>`
fn quarantine(path: &Path) -> Result<PathBuf> {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "data.json".into());
    name.push(format!(".corrupt-{}", now_ms()));
    let backup = path.with_file_name(name);

    fs::rename(path, &backup).with_context(|| format!("Failed to rename {}", path.display()))?;
    info!(from = ?path, to = ?backup, "Moved corrupt data file aside");
    Ok(backup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TaskStore;
    use tempfile::TempDir;

    fn sample(n: usize) -> Vec<Task> {
        (0..n)
            .map(|i| Task {
                id: format!("task-{}", i),
                title: format!("Task {}", i),
                detail: if i % 3 == 0 { Some(format!("detail {}\nline two", i)) } else { None },
                tags: if i % 2 == 0 { vec!["a".to_string(), "b c".to_string()] } else { vec![] },
                created_at: 1_700_000_000_000 + i as i64,
                done: i % 4 == 0,
            })
            .collect()
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data.json");

        for n in [0, 1, 7] {
            let tasks = sample(n);
            save(&path, &tasks).unwrap();
            assert_eq!(load_all(&path), tasks);
        }
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/deeper/data.json");

        save(&path, &sample(2)).unwrap();
        assert!(path.exists());

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"todos\""));
        assert!(content.contains("\"createdAt\""));
    }

    #[test]
    fn test_save_leaves_no_temp_files() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data.json");
        save(&path, &sample(3)).unwrap();
        save(&path, &sample(4)).unwrap();

        let entries: Vec<_> = fs::read_dir(temp.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_save_to_unwritable_target_errors() {
        let temp = TempDir::new().unwrap();
        // A directory where the file should go
        let path = temp.path().join("data.json");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();

        assert!(save(&path, &sample(1)).is_err());
    }

    #[test]
    fn test_load_all_nonexistent_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nonexistent.json");

        assert!(load_all(&path).is_empty());
        assert!(try_load_all(&path).unwrap().is_none());
    }

    #[test]
    fn test_load_all_corrupt_file_degrades_to_empty() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data.json");
        fs::write(&path, "{malformed json").unwrap();

        assert!(load_all(&path).is_empty());
        assert!(matches!(try_load_all(&path), Err(LoadError::Parse { .. })));
    }

    #[test]
    fn test_load_all_applies_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data.json");
        fs::write(
            &path,
            r#"{"todos":[{"id":"a","title":"Plain","createdAt":1},{"id":"b","title":"Full","detail":"d","tags":["x"],"createdAt":2,"done":true}],"version":9}"#,
        )
        .unwrap();

        let tasks = load_all(&path);
        assert_eq!(tasks.len(), 2);
        assert!(!tasks[0].done);
        assert!(tasks[0].tags.is_empty());
        assert!(tasks[1].done);
        assert_eq!(tasks[1].tags, vec!["x"]);
    }

    #[test]
    fn test_load_chunked_sizes_and_order() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data.json");
        let tasks = sample(250);
        save(&path, &tasks).unwrap();

        let chunks: Vec<Vec<Task>> = load_chunked(&path, 100).collect();
        let sizes: Vec<usize> = chunks.iter().map(|c| c.len()).collect();
        assert_eq!(sizes, vec![100, 100, 50]);

        let joined: Vec<Task> = chunks.into_iter().flatten().collect();
        assert_eq!(joined, tasks);
    }

    #[test]
    fn test_load_chunked_size_hint() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data.json");
        save(&path, &sample(250)).unwrap();

        let mut chunks = load_chunked(&path, 100);
        assert_eq!(chunks.size_hint(), (3, Some(3)));
        chunks.next();
        assert_eq!(chunks.size_hint(), (2, Some(2)));
    }

    #[test]
    fn test_load_chunked_zero_chunk_size() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data.json");
        save(&path, &sample(3)).unwrap();

        assert_eq!(load_chunked(&path, 0).count(), 3);
    }

    #[test]
    fn test_load_chunked_missing_file_falls_back_to_empty() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.json");

        assert_eq!(load_chunked(&path, DEFAULT_CHUNK_SIZE).count(), 0);
        assert!(load_all(&path).is_empty());
    }

    #[test]
    fn test_load_chunked_corrupt_file_yields_nothing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data.json");
        fs::write(&path, "not json at all").unwrap();

        assert_eq!(load_chunked(&path, 10).count(), 0);
    }

    #[test]
    fn test_hydrate_missing() {
        let temp = TempDir::new().unwrap();
        let hydration = hydrate(&temp.path().join("data.json"));
        assert_eq!(hydration.source, HydrationSource::Missing);
        assert!(hydration.tasks.is_empty());
        assert!(hydration.warning().is_none());
    }

    #[test]
    fn test_hydrate_empty_list() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data.json");
        save(&path, &[]).unwrap();

        let hydration = hydrate(&path);
        assert_eq!(hydration.source, HydrationSource::File);
        assert!(hydration.tasks.is_empty());
    }

    #[test]
    fn test_hydrate_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data.json");
        let tasks = sample(120);
        save(&path, &tasks).unwrap();

        let hydration = hydrate(&path);
        assert_eq!(hydration.source, HydrationSource::File);
        assert_eq!(hydration.tasks, tasks);
    }

    #[test]
    fn test_hydrate_corrupt_moves_file_aside() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data.json");
        fs::write(&path, "{\"todos\": [oops").unwrap();

        let hydration = hydrate(&path);
        assert!(hydration.tasks.is_empty());
        let backup = match &hydration.source {
            HydrationSource::Corrupt { backup: Some(b), .. } => b.clone(),
            other => panic!("unexpected source: {:?}", other),
        };

        assert!(!path.exists());
        assert_eq!(fs::read_to_string(&backup).unwrap(), "{\"todos\": [oops");
        assert!(hydration.warning().unwrap().contains("moved to"));
    }

    #[test]
    fn test_try_load_all_directory_is_read_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data.json");
        fs::create_dir(&path).unwrap();

        assert!(matches!(try_load_all(&path), Err(LoadError::Read { .. })));
    }

    #[test]
    fn test_hydrate_unreadable_leaves_file_in_place() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data.json");
        fs::create_dir_all(path.join("keep")).unwrap();

        let hydration = hydrate(&path);
        assert!(hydration.tasks.is_empty());
        assert!(matches!(hydration.source, HydrationSource::Unreadable { .. }));
        assert!(hydration.warning().unwrap().contains("unreadable"));

        assert!(path.join("keep").is_dir());
        let moved = fs::read_dir(temp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .any(|e| e.file_name().to_string_lossy().contains(".corrupt-"));
        assert!(!moved);
    }

    #[test]
    fn test_autosave_writes_through() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data.json");

        let mut store = TaskStore::new();
        store.subscribe(Autosave::new(&path));

        store.add("First").unwrap();
        store.add("Second").unwrap();
        assert_eq!(load_all(&path).len(), 2);

        store.toggle_done_at(0).unwrap();
        assert!(load_all(&path)[0].done);

        store.remove_at(1).unwrap();
        let on_disk = load_all(&path);
        assert_eq!(on_disk.len(), 1);
        assert_eq!(on_disk, store.tasks());
    }

    #[test]
    fn test_autosave_failure_reaches_caller() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data.json");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();

        let mut store = TaskStore::new();
        store.subscribe(Autosave::new(&path));
        assert!(store.add("lost?").is_err());
        assert_eq!(store.len(), 1);
    }
}
