//! Workout persistence over a key-value store.
//!
//! The whole workout list lives under one key as a JSON array and is
//! rewritten on every change. Two stores are provided:
//! - [`FileStore`]: one file per key with file locking and atomic replace
//! - [`MemoryStore`]: a map, for tests and throwaway sessions

use crate::{Error, Result, Workout};
use fs2::FileExt;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::PathBuf;
use tempfile::NamedTempFile;

/// Persistent string key-value storage
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Directory-backed store: key `k` lives in `<dir>/k.json`
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    /// Read a value under a shared lock
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            tracing::debug!("No stored value at {:?}", path);
            return Ok(None);
        }

        let file = File::open(&path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;
        read?;

        tracing::debug!("Read {} bytes from {:?}", contents.len(), path);
        Ok(Some(contents))
    }

    /// Atomically replace a value
    ///
    /// Writes to a temp file in the same directory, syncs it, then renames
    /// it over the target so readers never see a partial write.
    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);

        let temp = NamedTempFile::new_in(&self.dir)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            writer.write_all(value.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(&path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Wrote {} bytes to {:?}", value.len(), path);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!("Removed {:?}", path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// Serialize the full list under `key`
pub fn save_workouts<S: KeyValueStore + ?Sized>(
    store: &mut S,
    key: &str,
    workouts: &[Workout],
) -> Result<()> {
    // Compact JSON, same shape the page stores
    let blob = serde_json::to_string(workouts)?;
    store.set(key, &blob)?;
    tracing::debug!("Saved {} workouts under {:?}", workouts.len(), key);
    Ok(())
}

/// Load the list stored under `key`
///
/// A missing key (or a stored `null`) is an empty history. A blob that
/// is not a JSON array is logged and also treated as empty. Entries that
/// do not parse as workouts are logged and skipped; the rest load.
pub fn load_workouts<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Result<Vec<Workout>> {
    let Some(blob) = store.get(key)? else {
        tracing::debug!("Nothing stored under {:?}", key);
        return Ok(Vec::new());
    };

    let entries = match serde_json::from_str::<Option<Vec<serde_json::Value>>>(&blob) {
        Ok(entries) => entries.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(
                "Failed to parse stored workouts under {:?}: {}. Starting empty.",
                key,
                e
            );
            return Ok(Vec::new());
        }
    };

    let total = entries.len();
    let mut workouts = Vec::with_capacity(total);
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<Workout>(entry) {
            Ok(workout) => workouts.push(workout),
            Err(e) => {
                tracing::warn!("Skipping stored workout #{} under {:?}: {}", index, key, e)
            }
        }
    }

    tracing::debug!(
        "Loaded {} of {} workouts from {:?}",
        workouts.len(),
        total,
        key
    );
    Ok(workouts)
}
