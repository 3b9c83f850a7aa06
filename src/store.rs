//! Durable key-value storage for the best score.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

pub const BEST_SCORE_KEY: &str = "bestScore";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access store file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("store file {path} is not a JSON string map: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Absent, unparsable and unreadable values all read as `default`.
pub fn get_or<T: FromStr>(store: &dyn KeyValueStore, key: &str, default: T) -> T {
    match store.get(key) {
        Ok(Some(raw)) => raw.trim().parse().unwrap_or(default),
        Ok(None) => default,
        Err(err) => {
            log::warn!("store read of {key:?} failed, using default: {err}");
            default
        }
    }
}

/// Reads the best score; absent or unparsable values are 0.
pub fn load_best_score(store: &dyn KeyValueStore) -> u32 {
    get_or(store, BEST_SCORE_KEY, 0)
}

pub fn save_best_score(store: &mut dyn KeyValueStore, best: u32) -> Result<(), StoreError> {
    store.set(BEST_SCORE_KEY, &best.to_string())
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// A flat JSON object on disk. Loaded once; every `set` rewrites the file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// A missing file opens as an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text).map_err(|source| StoreError::Format { path: path.clone(), source })?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io { path: self.path.clone(), source };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let text = serde_json::to_string_pretty(&self.entries)
            .map_err(|source| StoreError::Format { path: self.path.clone(), source })?;
        fs::write(&self.path, text).map_err(io_err)
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_owned(), value.to_owned());
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("snake-store-{}-{name}.json", std::process::id()))
    }

    #[test]
    fn best_score_defaults_to_zero() {
        let mut store = MemoryStore::new();
        assert_eq!(load_best_score(&store), 0);
        store.set(BEST_SCORE_KEY, "not a number").unwrap();
        assert_eq!(load_best_score(&store), 0);
        save_best_score(&mut store, 12).unwrap();
        assert_eq!(load_best_score(&store), 12);
        assert_eq!(store.get(BEST_SCORE_KEY).unwrap().as_deref(), Some("12"));
    }

    #[test]
    fn typed_default() {
        let mut store = MemoryStore::new();
        assert_eq!(get_or(&store, "speed", 3u8), 3);
        store.set("speed", "9").unwrap();
        assert_eq!(get_or(&store, "speed", 3u8), 9);
        store.set("speed", "fast").unwrap();
        assert_eq!(get_or(&store, "speed", 3u8), 3);
    }

    #[test]
    fn file_store_survives_reopen() {
        let path = temp_path("reopen");
        let _ = fs::remove_file(&path);
        {
            let mut store = JsonFileStore::open(&path).unwrap();
            assert_eq!(load_best_score(&store), 0);
            save_best_score(&mut store, 42).unwrap();
        }
        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(load_best_score(&store), 42);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn corrupt_file_is_a_format_error() {
        let path = temp_path("corrupt");
        fs::write(&path, "[1, 2").unwrap();
        assert!(matches!(JsonFileStore::open(&path), Err(StoreError::Format { .. })));
        fs::remove_file(&path).unwrap();
    }
}
