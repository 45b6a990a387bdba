//! File-backed session storage.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;

use super::backend::{apply_to_map, Changes, EventHub, StorageBackend, StorageEvent};
use crate::errors::SessionError;

/// Storage persisted as a JSON object in a single file.
///
/// The file holds the bearer token: treat it as a secret. On Unix it is
/// written with permissions `600`. A missing file reads as empty storage.
/// Clones share the same lock and events.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
    events: EventHub,
}

impl FileStorage {
    /// Storage backed by `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::new(Mutex::new(())),
            events: EventHub::new(),
        }
    }

    /// Location of the storage file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<HashMap<String, String>, SessionError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(HashMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_map(&self, map: &HashMap<String, String>) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, serde_json::to_vec_pretty(map)?)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }
}

impl StorageBackend for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        let _guard = self.lock.lock().map_err(|_poisoned| SessionError::Poisoned)?;
        Ok(self.read_map()?.remove(key))
    }

    fn apply(&self, origin: u64, changes: Changes<'_>) -> Result<(), SessionError> {
        let events = {
            let _guard = self.lock.lock().map_err(|_poisoned| SessionError::Poisoned)?;
            let mut map = self.read_map()?;
            let events = apply_to_map(&mut map, origin, changes);
            if !events.is_empty() {
                self.write_map(&map)?;
            }
            events
        };
        self.events.publish(events);
        Ok(())
    }

    fn apply_if_present(
        &self,
        origin: u64,
        required: &str,
        changes: Changes<'_>,
    ) -> Result<bool, SessionError> {
        let events = {
            let _guard = self.lock.lock().map_err(|_poisoned| SessionError::Poisoned)?;
            let mut map = self.read_map()?;
            if !map.contains_key(required) {
                return Ok(false);
            }
            let events = apply_to_map(&mut map, origin, changes);
            if !events.is_empty() {
                self.write_map(&map)?;
            }
            events
        };
        self.events.publish(events);
        Ok(true)
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let storage = FileStorage::new(&path);
        assert_eq!(storage.get("authToken").unwrap(), None);
        storage
            .apply(1, &[("authToken", Some("t1".into()))])
            .unwrap();

        let reopened = FileStorage::new(&path);
        assert_eq!(reopened.get("authToken").unwrap().as_deref(), Some("t1"));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn conditional_apply_needs_the_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let storage = FileStorage::new(&path);

        let applied = storage
            .apply_if_present(1, "authToken", &[("currentUser", Some("{}".into()))])
            .unwrap();
        assert!(!applied);
        assert!(!path.exists());

        storage.apply(1, &[("authToken", Some("t1".into()))]).unwrap();
        let applied = storage
            .apply_if_present(1, "authToken", &[("currentUser", Some("{}".into()))])
            .unwrap();
        assert!(applied);
        assert_eq!(storage.get("currentUser").unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn corrupted_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let storage = FileStorage::new(&path);
        assert!(matches!(
            storage.get("authToken"),
            Err(SessionError::Corrupted(_))
        ));
    }
}
