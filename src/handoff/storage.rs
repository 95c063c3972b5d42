use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Shared string key-value surface that every window of one profile sees.
///
/// Implementations must make a `set` visible to any later `get` on the same
/// key from another store handle. No locking or change notification is
/// offered; concurrent writers resolve as last write wins.
pub trait HandoffStorage: Send + Sync {
    /// Human-readable backend name (e.g. "memory", "file")
    fn name(&self) -> &str;

    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;
}

/// Process-local storage. Two controllers sharing one `Arc<MemoryStorage>`
/// behave like two windows of the same browser profile.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|error| anyhow::anyhow!("Lock error: {error}"))
    }
}

impl HandoffStorage for MemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// A single JSON object file holding every key, the on-disk stand-in for a
/// browser profile's local storage.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    guard: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        if contents.trim().is_empty() {
            return Ok(Map::new());
        }
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", self.path.display()))
    }

    /// Like `load`, but a corrupt file is replaced rather than blocking writes.
    fn load_for_update(&self) -> Result<Map<String, Value>> {
        match self.load() {
            Ok(entries) => Ok(entries),
            Err(error) if self.path.exists() => {
                warn!(path = %self.path.display(), error = %error, "resetting unreadable handoff file");
                Ok(Map::new())
            }
            Err(error) => Err(error),
        }
    }

    fn persist(&self, entries: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let serialized =
            serde_json::to_string_pretty(entries).context("Failed to serialize handoff file")?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serialized).with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.guard
            .lock()
            .map_err(|error| anyhow::anyhow!("Lock error: {error}"))
    }
}

impl HandoffStorage for FileStorage {
    fn name(&self) -> &str {
        "file"
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock()?;
        let entries = self.load()?;
        Ok(entries.get(key).map(|value| match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock()?;
        let mut entries = self.load_for_update()?;
        entries.insert(key.to_string(), Value::String(value.to_string()));
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.lock()?;
        let mut entries = self.load_for_update()?;
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }
}
