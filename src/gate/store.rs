//! Durable client-side key-value state for the login gate.
//!
//! Every piece of persisted gate state (role, lockout counters, trusted devices,
//! auth token) goes through [`ClientStore`]. Reads never fail: a missing or
//! unreadable value is reported as `None` and the caller falls back to its
//! default. Writes may fail and are propagated.

use serde_json::{Map, Value};
use std::{
    collections::HashMap,
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};
use tempfile::NamedTempFile;
use tracing::{debug, instrument, warn};

/// Last explicitly selected role (`"user"` or `"admin"`).
pub const KEY_ROLE: &str = "dualgate.role";
/// JSON array of trusted device records.
pub const KEY_TRUSTED_DEVICES: &str = "dualgate.trusted_devices";
/// Consecutive failed admin attempts, decimal.
pub const KEY_ADMIN_FAILURES: &str = "dualgate.admin_failures";
/// Admin lock expiry, epoch milliseconds.
pub const KEY_ADMIN_LOCKED_UNTIL: &str = "dualgate.admin_locked_until";
/// Session token returned by the last successful login.
pub const KEY_AUTH_TOKEN: &str = "dualgate.auth_token";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to write state file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to read state file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("state file {path} is not a JSON object")]
    Format { path: PathBuf },
    #[error("failed to encode state: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Get/set/remove by key, scoped to one client.
pub trait ClientStore {
    fn get(&self, key: &str) -> Option<String>;

    /// # Errors
    /// Returns an error if the value cannot be persisted.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// # Errors
    /// Returns an error if the removal cannot be persisted.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl<S: ClientStore + ?Sized> ClientStore for Arc<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// Process-local store, used by tests and embedders that persist elsewhere.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ClientStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

/// JSON object on disk, rewritten on every change.
///
/// There is no cross-process locking: two processes sharing one file race the
/// same way two browser tabs race on local storage.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<Map<String, Value>>,
}

impl FileStore {
    /// Opens the state file, starting empty when it does not exist yet.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or is not a JSON object.
    #[instrument]
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let entries = match fs::read_to_string(path) {
            Ok(raw) if raw.trim().is_empty() => Map::new(),
            Ok(raw) => match serde_json::from_str::<Value>(&raw) {
                Ok(Value::Object(map)) => map,
                _ => {
                    return Err(StoreError::Format {
                        path: path.to_path_buf(),
                    })
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("state file not found, starting empty");
                Map::new()
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            entries: Mutex::new(entries),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `entries` to a private temp file next to the state file and renames it
    /// into place, so readers never see a partial file and the token stays owner-only.
    fn flush(&self, entries: &Map<String, Value>) -> Result<(), StoreError> {
        let body = serde_json::to_string_pretty(entries)?;
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(write_err)?;

        let mut file = NamedTempFile::new_in(dir).map_err(write_err)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.as_file()
                .set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(write_err)?;
        }
        file.write_all(body.as_bytes()).map_err(write_err)?;
        file.as_file().sync_all().map_err(write_err)?;
        file.persist(&self.path)
            .map_err(|err| write_err(err.error))?;

        Ok(())
    }
}

impl ClientStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        match entries.get(key)? {
            Value::String(value) => Some(value.clone()),
            other => {
                warn!(key, "ignoring non-string state value: {other}");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = entries.clone();
        next.insert(key.to_string(), Value::String(value.to_string()));
        self.flush(&next)?;
        *entries = next;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut next = entries.clone();
        next.remove(key);
        self.flush(&next)?;
        *entries = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_set_get_remove() -> Result<(), StoreError> {
        let store = MemoryStore::new();
        assert!(store.get(KEY_ROLE).is_none());

        store.set(KEY_ROLE, "admin")?;
        assert_eq!(store.get(KEY_ROLE).as_deref(), Some("admin"));
        assert_eq!(store.len(), 1);

        store.remove(KEY_ROLE)?;
        assert!(store.get(KEY_ROLE).is_none());
        assert!(store.is_empty());
        Ok(())
    }

    #[test]
    fn arc_store_shares_state() -> Result<(), StoreError> {
        let store = Arc::new(MemoryStore::new());
        let handle = Arc::clone(&store);
        handle.set(KEY_AUTH_TOKEN, "t-1")?;
        assert_eq!(store.get(KEY_AUTH_TOKEN).as_deref(), Some("t-1"));
        Ok(())
    }

    #[test]
    fn file_store_persists_across_opens() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("state.json");

        let store = FileStore::open(&path)?;
        store.set(KEY_ADMIN_FAILURES, "2")?;
        store.set(KEY_ROLE, "user")?;
        store.remove(KEY_ROLE)?;

        let reopened = FileStore::open(&path)?;
        assert_eq!(reopened.get(KEY_ADMIN_FAILURES).as_deref(), Some("2"));
        assert!(reopened.get(KEY_ROLE).is_none());
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn file_store_is_owner_only() -> anyhow::Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir()?;
        let path = dir.path().join("state.json");
        let store = FileStore::open(&path)?;
        store.set(KEY_AUTH_TOKEN, "secret-token")?;

        let mode = fs::metadata(&path)?.permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);

        // rewrites keep the mode
        store.set(KEY_ROLE, "user")?;
        let mode = fs::metadata(&path)?.permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
        Ok(())
    }

    #[test]
    fn failed_write_leaves_memory_unchanged() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let blocker = dir.path().join("sub");
        let path = blocker.join("state.json");
        let store = FileStore::open(&path)?;

        // a regular file where the state directory should be makes every flush fail
        fs::write(&blocker, "not a directory")?;

        assert!(matches!(
            store.set(KEY_AUTH_TOKEN, "tok"),
            Err(StoreError::Write { .. })
        ));
        assert!(store.get(KEY_AUTH_TOKEN).is_none());
        Ok(())
    }

    #[test]
    fn failed_remove_keeps_value() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let sub = dir.path().join("sub");
        let path = sub.join("state.json");
        let store = FileStore::open(&path)?;
        store.set(KEY_AUTH_TOKEN, "tok")?;

        fs::remove_dir_all(&sub)?;
        fs::write(&sub, "not a directory")?;

        assert!(store.remove(KEY_AUTH_TOKEN).is_err());
        assert_eq!(store.get(KEY_AUTH_TOKEN).as_deref(), Some("tok"));
        Ok(())
    }

    #[test]
    fn file_store_rejects_non_object() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("state.json");
        fs::write(&path, "[1, 2, 3]")?;

        let result = FileStore::open(&path);
        assert!(matches!(result, Err(StoreError::Format { .. })));
        Ok(())
    }

    #[test]
    fn file_store_ignores_non_string_values() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("state.json");
        fs::write(&path, r#"{"dualgate.admin_failures": 7}"#)?;

        let store = FileStore::open(&path)?;
        assert!(store.get(KEY_ADMIN_FAILURES).is_none());
        Ok(())
    }
}
