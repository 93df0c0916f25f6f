//! State store primitives.

use keyhook_core::{AppError, AppResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::location::{
    file_name_for, global_state_dir, local_state_dir, StateLocation, DOCUMENT_EXTENSION,
    LOG_EXTENSION,
};

/// Result of reading whole-document state.
#[derive(Debug, Clone, PartialEq)]
pub enum StateRead<T> {
    /// The file exists and parsed as `T`
    Found { data: T, path: PathBuf },
    /// No file, or its contents did not parse
    Missing,
}

impl<T> StateRead<T> {
    pub fn exists(&self) -> bool {
        matches!(self, StateRead::Found { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            StateRead::Found { data, .. } => Some(data),
            StateRead::Missing => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            StateRead::Found { data, .. } => Some(data),
            StateRead::Missing => None,
        }
    }

    /// Path the state was read from.
    pub fn found_at(&self) -> Option<&Path> {
        match self {
            StateRead::Found { path, .. } => Some(path),
            StateRead::Missing => None,
        }
    }
}

/// Result of a write, update or append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    pub success: bool,
    pub path: PathBuf,
    pub error: Option<String>,
}

impl WriteOutcome {
    fn from_result(path: PathBuf, result: AppResult<()>) -> Self {
        match result {
            Ok(()) => Self {
                success: true,
                path,
                error: None,
            },
            Err(e) => {
                tracing::warn!("State write to {:?} failed: {}", path, e);
                Self {
                    success: false,
                    path,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

/// Synchronous JSON state persistence rooted at a local and a global directory.
///
/// There is no locking and no caching: every call goes to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateStore {
    local_dir: PathBuf,
    global_dir: PathBuf,
}

impl StateStore {
    /// Store with local state under `project_root` and global state under the home directory.
    pub fn new(project_root: &Path) -> Self {
        Self {
            local_dir: local_state_dir(project_root),
            global_dir: global_state_dir(),
        }
    }

    /// Store rooted at the current working directory.
    pub fn current() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::new(&cwd)
    }

    /// Store with explicit state directories.
    pub fn with_dirs(local_dir: impl Into<PathBuf>, global_dir: impl Into<PathBuf>) -> Self {
        Self {
            local_dir: local_dir.into(),
            global_dir: global_dir.into(),
        }
    }

    /// State directory for `location`.
    pub fn dir(&self, location: StateLocation) -> &Path {
        match location {
            StateLocation::Local => &self.local_dir,
            StateLocation::Global => &self.global_dir,
        }
    }

    /// Path of whole-document state `name`.
    ///
    /// Fails for names that would resolve outside the state directory.
    pub fn path_for(&self, name: &str, location: StateLocation) -> AppResult<PathBuf> {
        Ok(self
            .dir(location)
            .join(file_name_for(name, DOCUMENT_EXTENSION)?))
    }

    /// Path of append log `name`.
    pub fn log_path_for(&self, name: &str, location: StateLocation) -> AppResult<PathBuf> {
        Ok(self.dir(location).join(file_name_for(name, LOG_EXTENSION)?))
    }

    /// Read whole-document state.
    pub fn read<T: DeserializeOwned>(&self, name: &str, location: StateLocation) -> StateRead<T> {
        let path = match self.path_for(name, location) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("Refusing to read state: {}", e);
                return StateRead::Missing;
            }
        };

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Failed to read state {:?}: {}", path, e);
                }
                return StateRead::Missing;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(data) => StateRead::Found { data, path },
            Err(e) => {
                tracing::warn!("Ignoring unparsable state {:?}: {}", path, e);
                StateRead::Missing
            }
        }
    }

    /// Replace whole-document state, creating directories as needed.
    pub fn write<T: Serialize + ?Sized>(
        &self,
        name: &str,
        data: &T,
        location: StateLocation,
    ) -> WriteOutcome {
        match self.path_for(name, location) {
            Ok(path) => {
                let result = write_document(&path, data);
                WriteOutcome::from_result(path, result)
            }
            Err(e) => WriteOutcome::from_result(self.dir(location).to_path_buf(), Err(e)),
        }
    }

    /// Read, transform and write back whole-document state.
    ///
    /// `transform` receives `None` when there is no prior state and returns
    /// the complete replacement value.
    pub fn update<T, F>(&self, name: &str, location: StateLocation, transform: F) -> WriteOutcome
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(Option<T>) -> T,
    {
        let current = self.read::<T>(name, location).into_data();
        let next = transform(current);
        self.write(name, &next, location)
    }

    /// Append one entry to a line-delimited log.
    pub fn append<T: Serialize + ?Sized>(
        &self,
        name: &str,
        entry: &T,
        location: StateLocation,
    ) -> WriteOutcome {
        match self.log_path_for(name, location) {
            Ok(path) => {
                let result = append_line(&path, entry);
                WriteOutcome::from_result(path, result)
            }
            Err(e) => WriteOutcome::from_result(self.dir(location).to_path_buf(), Err(e)),
        }
    }

    /// Read every entry of a log in append order.
    ///
    /// Blank lines are ignored. Lines that do not parse as `T` are skipped
    /// with a warning; they never fail the whole read.
    pub fn read_log<T: DeserializeOwned>(&self, name: &str, location: StateLocation) -> Vec<T> {
        let path = match self.log_path_for(name, location) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("Refusing to read log: {}", e);
                return Vec::new();
            }
        };

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Failed to read log {:?}: {}", path, e);
                }
                return Vec::new();
            }
        };

        contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .filter_map(|(index, line)| match serde_json::from_str(line) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("Skipping line {} of {:?}: {}", index + 1, path, e);
                    None
                }
            })
            .collect()
    }

    /// Whether whole-document state `name` exists.
    pub fn exists(&self, name: &str, location: StateLocation) -> bool {
        self.path_for(name, location)
            .is_ok_and(|path| path.is_file())
    }

    /// Delete whole-document state. Returns true iff a file was removed.
    pub fn clear(&self, name: &str, location: StateLocation) -> bool {
        self.path_for(name, location)
            .is_ok_and(|path| remove_if_present(&path))
    }

    /// Delete an append log. Returns true iff a file was removed.
    pub fn clear_log(&self, name: &str, location: StateLocation) -> bool {
        self.log_path_for(name, location)
            .is_ok_and(|path| remove_if_present(&path))
    }

    /// List whole-document state names at `location`, sorted.
    ///
    /// Names are relative to the state directory, without the `.json`
    /// extension, with `/` between nested directories.
    pub fn list(&self, location: StateLocation) -> Vec<String> {
        let dir = self.dir(location);
        if !dir.exists() {
            return Vec::new();
        }

        let mut names: Vec<String> = walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                entry.path().extension().and_then(|s| s.to_str()) == Some(DOCUMENT_EXTENSION)
            })
            .filter_map(|entry| {
                let relative = entry.path().strip_prefix(dir).ok()?.with_extension("");
                let parts: Vec<String> = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                Some(parts.join("/"))
            })
            .collect();

        names.sort();
        names
    }
}

fn write_document<T: Serialize + ?Sized>(path: &Path, data: &T) -> AppResult<()> {
    ensure_parent(path)?;
    let mut json = serde_json::to_string_pretty(data)?;
    json.push('\n');
    fs::write(path, json)?;
    Ok(())
}

fn append_line<T: Serialize + ?Sized>(path: &Path, entry: &T) -> AppResult<()> {
    ensure_parent(path)?;
    let mut line = serde_json::to_string(entry)?;
    line.push('\n');

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(line.as_bytes())?;
    Ok(())
}

fn ensure_parent(path: &Path) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            AppError::State(format!("Failed to create directory {:?}: {}", parent, e))
        })?;
    }
    Ok(())
}

fn remove_if_present(path: &Path) -> bool {
    match fs::remove_file(path) {
        Ok(()) => true,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
        Err(e) => {
            tracing::warn!("Failed to remove state {:?}: {}", path, e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Counter {
        count: u32,
        label: String,
    }

    fn test_store(temp_dir: &TempDir) -> StateStore {
        StateStore::with_dirs(temp_dir.path().join("local"), temp_dir.path().join("global"))
    }

    #[test]
    fn test_write_then_read_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        let value = json!({"mode": "ultra", "tasks": [1, 2, 3], "nested": {"ok": true}});

        let outcome = store.write("session", &value, StateLocation::Local);
        assert!(outcome.success);
        assert!(outcome.error.is_none());
        assert_eq!(outcome.path, temp_dir.path().join("local/session.json"));

        let read: StateRead<Value> = store.read("session", StateLocation::Local);
        assert!(read.exists());
        assert_eq!(read.found_at(), Some(outcome.path.as_path()));
        assert_eq!(read.into_data(), Some(value));
    }

    #[test]
    fn test_written_json_is_pretty() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        let outcome = store.write("pretty", &json!({"a": 1}), StateLocation::Local);

        let contents = fs::read_to_string(outcome.path).unwrap();
        assert_eq!(contents, "{\n  \"a\": 1\n}\n");
    }

    #[test]
    fn test_read_missing_and_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let missing: StateRead<Value> = store.read("nothing", StateLocation::Local);
        assert_eq!(missing, StateRead::Missing);

        let path = store.path_for("broken", StateLocation::Local).unwrap();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();
        let corrupt: StateRead<Value> = store.read("broken", StateLocation::Local);
        assert!(!corrupt.exists());
        assert!(corrupt.data().is_none());
    }

    #[test]
    fn test_write_failure_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "file, not a directory").unwrap();

        let store = StateStore::with_dirs(blocker.join("state"), temp_dir.path().join("global"));
        let outcome = store.write("session", &json!({}), StateLocation::Local);

        assert!(!outcome.success);
        assert!(outcome.error.is_some());
    }

    #[test]
    fn test_update_receives_none_then_previous() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let first = store.update("counter", StateLocation::Global, |prev: Option<Counter>| {
            assert!(prev.is_none());
            Counter {
                count: 1,
                label: "first".to_string(),
            }
        });
        assert!(first.success);

        store.update("counter", StateLocation::Global, |prev: Option<Counter>| {
            let prev = prev.expect("previous state");
            Counter {
                count: prev.count + 1,
                label: prev.label,
            }
        });

        let read: StateRead<Counter> = store.read("counter", StateLocation::Global);
        assert_eq!(
            read.into_data(),
            Some(Counter {
                count: 2,
                label: "first".to_string()
            })
        );
        assert!(!store.exists("counter", StateLocation::Local));
    }

    #[test]
    fn test_append_then_read_log_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        for i in 0..5 {
            let outcome = store.append("events", &json!({"seq": i}), StateLocation::Local);
            assert!(outcome.success);
        }

        let entries: Vec<Value> = store.read_log("events", StateLocation::Local);
        assert_eq!(entries.len(), 5);
        for (i, entry) in entries.iter().enumerate() {
            assert_eq!(entry["seq"], json!(i));
        }

        let path = store.log_path_for("events", StateLocation::Local).unwrap();
        assert_eq!(path.extension().unwrap(), "jsonl");
    }

    #[test]
    fn test_read_log_skips_malformed_lines() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        let path = store.log_path_for("mixed", StateLocation::Local).unwrap();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{\"n\":1}\n\n{broken\n{\"n\":2}\n").unwrap();

        let entries: Vec<Value> = store.read_log("mixed", StateLocation::Local);
        assert_eq!(entries, vec![json!({"n": 1}), json!({"n": 2})]);
    }

    #[test]
    fn test_read_log_missing_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        let entries: Vec<Value> = store.read_log("never", StateLocation::Global);
        assert!(entries.is_empty());
    }

    #[test]
    fn test_clear_semantics() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        assert!(!store.clear("ghost", StateLocation::Local));

        store.write("ghost", &json!(1), StateLocation::Local);
        assert!(store.exists("ghost", StateLocation::Local));
        assert!(store.clear("ghost", StateLocation::Local));
        assert!(!store.clear("ghost", StateLocation::Local));
        assert!(!store.exists("ghost", StateLocation::Local));
    }

    #[test]
    fn test_clear_log() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        store.append("events", &json!("x"), StateLocation::Local);

        assert!(store.clear_log("events", StateLocation::Local));
        assert!(!store.clear_log("events", StateLocation::Local));
    }

    #[test]
    fn test_name_with_extension_is_verbatim() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let outcome = store.write("notes.data", &json!(["a"]), StateLocation::Local);
        assert_eq!(outcome.path, temp_dir.path().join("local/notes.data"));

        let read: StateRead<Value> = store.read("notes.data", StateLocation::Local);
        assert_eq!(read.into_data(), Some(json!(["a"])));
    }

    #[test]
    fn test_escaping_names_never_touch_disk() {
        let temp_dir = TempDir::new().unwrap();
        let store = StateStore::with_dirs(
            temp_dir.path().join("root/local"),
            temp_dir.path().join("root/global"),
        );
        let outside = temp_dir.path().join("outside");
        let absolute = outside.join("abs");
        let absolute = absolute.to_str().unwrap();

        for name in [absolute, "../../outside/rel"] {
            let outcome = store.write(name, &json!({"x": 1}), StateLocation::Local);
            assert!(!outcome.success);
            assert!(outcome.error.unwrap().contains("Invalid state name"));

            let outcome = store.append(name, &json!({"x": 1}), StateLocation::Global);
            assert!(!outcome.success);

            assert_eq!(store.read::<Value>(name, StateLocation::Local), StateRead::Missing);
            assert!(store.read_log::<Value>(name, StateLocation::Global).is_empty());
            assert!(!store.exists(name, StateLocation::Local));
            assert!(!store.clear(name, StateLocation::Local));
            assert!(!store.clear_log(name, StateLocation::Global));
        }

        assert!(!outside.exists());
        assert!(!temp_dir.path().join("root").exists());
    }

    #[test]
    fn test_escaping_name_cannot_remove_outside_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        let victim = temp_dir.path().join("victim.json");
        fs::write(&victim, "{}").unwrap();

        assert!(!store.clear("../victim", StateLocation::Local));
        assert!(!store.clear(victim.to_str().unwrap(), StateLocation::Local));
        assert!(victim.exists());
    }

    #[test]
    fn test_list_documents() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        store.write("session", &json!({}), StateLocation::Local);
        store.write("modes/ultra", &json!({}), StateLocation::Local);
        store.append("events", &json!({}), StateLocation::Local);

        assert_eq!(
            store.list(StateLocation::Local),
            vec!["modes/ultra".to_string(), "session".to_string()]
        );
        assert!(store.list(StateLocation::Global).is_empty());
    }

    #[test]
    fn test_new_uses_project_state_dir() {
        let store = StateStore::new(Path::new("/repo"));
        assert_eq!(
            store.dir(StateLocation::Local),
            Path::new("/repo/.keyhook/state")
        );
    }
}
