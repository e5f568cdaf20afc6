use crate::errors::ProgressError;
use serde::{de::DeserializeOwned, Serialize};
use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};
use tracing::error;

/// The fixed set of documents the tracker persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    Progress,
    Logs,
    Tasks,
    /// Legacy key; nothing reads it, but reset still clears it.
    WeeklyProgress,
}

impl StoreKey {
    pub const ALL: [StoreKey; 4] = [
        StoreKey::Progress,
        StoreKey::Logs,
        StoreKey::Tasks,
        StoreKey::WeeklyProgress,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StoreKey::Progress => "bootcamp_progress",
            StoreKey::Logs => "learning_logs",
            StoreKey::Tasks => "daily_tasks",
            StoreKey::WeeklyProgress => "weekly_progress",
        }
    }
}

/// Synchronous key-value text storage.
pub trait Store {
    fn get(&self, key: StoreKey) -> io::Result<Option<String>>;
    fn set(&mut self, key: StoreKey, value: &str) -> io::Result<()>;
    fn remove(&mut self, key: StoreKey) -> io::Result<()>;
}

/// Keeps each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: StoreKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.as_str()))
    }
}

impl Store for FileStore {
    fn get(&self, key: StoreKey) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn set(&mut self, key: StoreKey, value: &str) -> io::Result<()> {
        fs::write(self.path_for(key), value)
    }

    fn remove(&mut self, key: StoreKey) -> io::Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
            _ => Ok(()),
        }
    }
}

/// In-memory store for tests and throwaway sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<StoreKey, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: StoreKey) -> io::Result<Option<String>> {
        Ok(self.entries.get(&key).cloned())
    }

    fn set(&mut self, key: StoreKey, value: &str) -> io::Result<()> {
        self.entries.insert(key, value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: StoreKey) -> io::Result<()> {
        self.entries.remove(&key);
        Ok(())
    }
}

/// Reads and decodes a stored document. Malformed text is a `Parse` error.
pub fn read_json<T: DeserializeOwned>(
    store: &dyn Store,
    key: StoreKey,
) -> Result<Option<T>, ProgressError> {
    match store.get(key)? {
        Some(text) => Ok(Some(serde_json::from_str(&text)?)),
        None => Ok(None),
    }
}

pub fn write_json<T: Serialize + ?Sized>(
    store: &mut dyn Store,
    key: StoreKey,
    value: &T,
) -> Result<(), ProgressError> {
    let payload = serde_json::to_string_pretty(value)?;
    store.set(key, &payload)?;
    Ok(())
}

/// Like [`read_json`], but a missing or corrupted document yields the default.
pub fn load_or_default<T: DeserializeOwned + Default>(
    store: &dyn Store,
    key: StoreKey,
) -> Result<T, ProgressError> {
    match read_json(store, key) {
        Ok(value) => Ok(value.unwrap_or_default()),
        Err(ProgressError::Parse(err)) => {
            error!("failed to parse stored {}: {err}", key.as_str());
            Ok(T::default())
        }
        Err(err) => Err(err),
    }
}
