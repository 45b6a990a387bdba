//! Key/value storage behind the session, modelled on browser `localStorage`.
//!
//! Several [`crate::SessionStore`] handles may share one backend, the way
//! browser tabs share `localStorage`. Every effective change is broadcast as a
//! [`StorageEvent`] tagged with the handle that made it, so other handles can
//! react to a logout or login performed elsewhere.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, RwLock};

use tokio::sync::broadcast;

use crate::errors::SessionError;

const EVENT_CAPACITY: usize = 64;

/// One key changed in the storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    /// Storage key that changed.
    pub key: String,
    /// New value, `None` when removed.
    pub new_value: Option<String>,
    /// Handle that made the change, see [`crate::SessionStore::origin`].
    pub origin: u64,
}

/// A set of writes applied together.
pub type Changes<'a> = &'a [(&'a str, Option<String>)];

/// Durable string storage.
pub trait StorageBackend: Send + Sync + Debug {
    /// Current value of `key`.
    fn get(&self, key: &str) -> Result<Option<String>, SessionError>;

    /// Applies all `changes` (`Some` sets, `None` removes) as one write, then
    /// broadcasts an event per key whose value actually changed.
    fn apply(&self, origin: u64, changes: Changes<'_>) -> Result<(), SessionError>;

    /// Like [`StorageBackend::apply`], but only while `required` is set, checked
    /// under the same lock as the write. Returns whether the changes were applied.
    fn apply_if_present(
        &self,
        origin: u64,
        required: &str,
        changes: Changes<'_>,
    ) -> Result<bool, SessionError>;

    /// Receiver of future change events.
    fn subscribe(&self) -> broadcast::Receiver<StorageEvent>;
}

/// Applies `changes` to `map` and returns the events to broadcast.
pub(crate) fn apply_to_map(
    map: &mut HashMap<String, String>,
    origin: u64,
    changes: Changes<'_>,
) -> Vec<StorageEvent> {
    let mut events = Vec::new();
    for (key, value) in changes {
        let previous = match value {
            Some(v) => map.insert((*key).to_string(), v.clone()),
            None => map.remove(*key),
        };
        if previous.as_ref() != value.as_ref() {
            events.push(StorageEvent {
                key: (*key).to_string(),
                new_value: value.clone(),
                origin,
            });
        }
    }
    events
}

/// Broadcast side shared by the backends.
#[derive(Debug, Clone)]
pub(crate) struct EventHub {
    sender: broadcast::Sender<StorageEvent>,
}

impl EventHub {
    pub(crate) fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    pub(crate) fn publish(&self, events: Vec<StorageEvent>) {
        for event in events {
            // No subscriber is not an error.
            let _ = self.sender.send(event);
        }
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.sender.subscribe()
    }
}

/// In-process storage. Clones share the same data and events.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    inner: Arc<RwLock<HashMap<String, String>>>,
    events: EventHub,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    /// Empty storage.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            events: EventHub::new(),
        }
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        let map = self.inner.read().map_err(|_poisoned| SessionError::Poisoned)?;
        Ok(map.get(key).cloned())
    }

    fn apply(&self, origin: u64, changes: Changes<'_>) -> Result<(), SessionError> {
        let events = {
            let mut map = self
                .inner
                .write()
                .map_err(|_poisoned| SessionError::Poisoned)?;
            apply_to_map(&mut map, origin, changes)
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
            let mut map = self
                .inner
                .write()
                .map_err(|_poisoned| SessionError::Poisoned)?;
            if !map.contains_key(required) {
                return Ok(false);
            }
            apply_to_map(&mut map, origin, changes)
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

    #[tokio::test]
    async fn only_effective_changes_are_broadcast() {
        let storage = MemoryStorage::new();
        let mut rx = storage.subscribe();

        storage
            .apply(1, &[("a", Some("x".into())), ("b", None)])
            .unwrap();
        storage.apply(2, &[("a", Some("x".into()))]).unwrap();
        storage.apply(3, &[("a", None)]).unwrap();

        assert_eq!(
            rx.recv().await.unwrap(),
            StorageEvent {
                key: "a".into(),
                new_value: Some("x".into()),
                origin: 1
            }
        );
        let removed = rx.recv().await.unwrap();
        assert_eq!((removed.new_value, removed.origin), (None, 3));
        assert!(rx.try_recv().is_err());
        assert_eq!(storage.get("a").unwrap(), None);
    }

    #[test]
    fn conditional_apply() {
        let storage = MemoryStorage::new();
        let mut rx = storage.subscribe();

        let applied = storage
            .apply_if_present(1, "token", &[("user", Some("u1".into()))])
            .unwrap();
        assert!(!applied);
        assert_eq!(storage.get("user").unwrap(), None);
        assert!(rx.try_recv().is_err());

        storage.apply(1, &[("token", Some("t1".into()))]).unwrap();
        let applied = storage
            .apply_if_present(1, "token", &[("user", Some("u1".into()))])
            .unwrap();
        assert!(applied);
        assert_eq!(storage.get("user").unwrap().as_deref(), Some("u1"));
    }

    #[test]
    fn clones_share_data() {
        let a = MemoryStorage::new();
        let b = a.clone();
        a.apply(1, &[("k", Some("v".into()))]).unwrap();
        assert_eq!(b.get("k").unwrap().as_deref(), Some("v"));
    }
}
