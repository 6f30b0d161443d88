//! prefs.rs — Client-local preference store
//!
//! A narrow string key/value interface. Values survive the process when
//! backed by `FilePreferences`; tests use `MemoryPreferences`. Storage
//! failures never reach callers: reads come back absent, writes are dropped.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};

pub const LAST_FILTER: &str = "lastFilter";
pub const LAST_TAB: &str = "lastTab";

pub trait Preferences: Send + Sync {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

// ── In-memory ───────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with existing values, as if left over from an earlier run.
    pub fn with_values<'a>(values: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let map = values
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self { values: Mutex::new(map) }
    }
}

impl Preferences for MemoryPreferences {
    fn read(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn write(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

// ── On disk ─────────────────────────────────────────────────────────

/// Preferences kept as one JSON object in a file. The whole object is
/// rewritten on every change.
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    values: Mutex<HashMap<String, String>>,
}

impl FilePreferences {
    /// Open (or lazily create) the store at `path`. A missing, unreadable or
    /// corrupt file starts the store empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match load(&path) {
            Ok(values) => {
                debug!(path = %path.display(), count = values.len(), "preferences loaded");
                values
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "preferences unreadable, starting empty");
                HashMap::new()
            }
        };
        Self {
            path,
            values: Mutex::new(values),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &HashMap<String, String>) {
        if let Err(e) = save(&self.path, values) {
            warn!(path = %self.path.display(), error = %e, "preference write dropped");
        }
    }
}

fn load(path: &Path) -> io::Result<HashMap<String, String>> {
    let text = fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn save(path: &Path, values: &HashMap<String, String>) -> io::Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }
    let text = serde_json::to_string_pretty(values)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(path, text)
}

impl Preferences for FilePreferences {
    fn read(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn write(&self, key: &str, value: &str) {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        self.persist(&values);
    }

    fn remove(&self, key: &str) {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        if values.remove(key).is_some() {
            self.persist(&values);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_round_trip() {
        let prefs = MemoryPreferences::new();
        assert_eq!(prefs.read(LAST_FILTER), None);
        prefs.write(LAST_FILTER, "MALE");
        assert_eq!(prefs.read(LAST_FILTER).as_deref(), Some("MALE"));
        prefs.remove(LAST_FILTER);
        assert_eq!(prefs.read(LAST_FILTER), None);
    }

    #[test]
    fn file_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.json");

        let prefs = FilePreferences::open(&path);
        prefs.write(LAST_FILTER, "TEEN");
        prefs.write(LAST_TAB, "MANY_RECEIVE");
        drop(prefs);

        let reopened = FilePreferences::open(&path);
        assert_eq!(reopened.read(LAST_FILTER).as_deref(), Some("TEEN"));
        assert_eq!(reopened.read(LAST_TAB).as_deref(), Some("MANY_RECEIVE"));
    }

    #[test]
    fn corrupt_file_reads_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "{ not json").unwrap();

        let prefs = FilePreferences::open(&path);
        assert_eq!(prefs.read(LAST_FILTER), None);
    }

    #[test]
    fn unwritable_location_drops_writes_silently() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be makes every write fail.
        let path = dir.path().join("prefs.json");
        fs::create_dir(&path).unwrap();

        let prefs = FilePreferences::open(&path);
        prefs.write(LAST_TAB, "MANY_WISH");
        assert!(path.is_dir());
    }
}
