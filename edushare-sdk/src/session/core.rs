//! The session handle: bearer token and signed-in user kept as a pair.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use edushare_common::{User, constants::storage_keys};
use tokio::sync::broadcast;

use super::backend::{MemoryStorage, StorageBackend, StorageEvent};
use super::persist::FileStorage;
use crate::errors::SessionError;

static NEXT_ORIGIN: AtomicU64 = AtomicU64::new(1);

/// Snapshot of the session: bearer token and cached user.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Session {
    /// Opaque bearer token.
    pub token: Option<String>,
    /// Cached profile of the signed-in user.
    pub user: Option<User>,
}

/// The single source of truth for "who is signed in".
///
/// Holds the bearer token (`authToken`) and a JSON snapshot of the user
/// (`currentUser`) in a [`StorageBackend`]. The two are always written and
/// cleared together in one backend write, never one without the other.
///
/// A `SessionStore` is injected into every API client instead of living in a
/// global. Clones are the same handle; [`SessionStore::fork`] gives a new
/// handle over the same storage, the way a second browser tab shares
/// `localStorage`.
///
/// ```
/// # use edushare::SessionStore;
/// let session = SessionStore::in_memory();
/// assert!(!session.is_authenticated());
/// session.clear()?;
/// # Ok::<_, edushare::errors::SessionError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SessionStore {
    backend: Arc<dyn StorageBackend>,
    origin: u64,
}

impl SessionStore {
    /// Session over any storage backend.
    pub fn new<B: StorageBackend + 'static>(backend: B) -> Self {
        Self {
            backend: Arc::new(backend),
            origin: NEXT_ORIGIN.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Session kept in memory only.
    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::new())
    }

    /// Session persisted in a JSON file.
    pub fn file(path: impl Into<std::path::PathBuf>) -> Self {
        Self::new(FileStorage::new(path))
    }

    /// Another handle on the same storage with its own origin.
    pub fn fork(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            origin: NEXT_ORIGIN.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Tag carried by the [`StorageEvent`]s this handle produces.
    pub fn origin(&self) -> u64 {
        self.origin
    }

    /// Current bearer token.
    pub fn token(&self) -> Result<Option<String>, SessionError> {
        self.backend.get(storage_keys::AUTH_TOKEN)
    }

    /// Cached user snapshot.
    pub fn user(&self) -> Result<Option<User>, SessionError> {
        match self.backend.get(storage_keys::CURRENT_USER)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Token and user read together.
    pub fn snapshot(&self) -> Result<Session, SessionError> {
        Ok(Session {
            token: self.token()?,
            user: self.user()?,
        })
    }

    /// True when a token is stored. Storage failures count as signed out.
    pub fn is_authenticated(&self) -> bool {
        matches!(self.token(), Ok(Some(_)))
    }

    /// Stores a new token and user as one write.
    pub fn set(&self, token: &str, user: &User) -> Result<(), SessionError> {
        let user = serde_json::to_string(user)?;
        self.backend.apply(
            self.origin,
            &[
                (storage_keys::AUTH_TOKEN, Some(token.to_string())),
                (storage_keys::CURRENT_USER, Some(user)),
            ],
        )
    }

    /// Refreshes the cached user of the current session.
    ///
    /// Does nothing when signed out, so a late profile response cannot
    /// resurrect half a session. The token check and the write happen under
    /// one backend lock, so a concurrent [`Self::clear`] always wins.
    pub fn update_user(&self, user: &User) -> Result<bool, SessionError> {
        let user = serde_json::to_string(user)?;
        self.backend.apply_if_present(
            self.origin,
            storage_keys::AUTH_TOKEN,
            &[(storage_keys::CURRENT_USER, Some(user))],
        )
    }

    /// Removes token and user as one write. Clearing an empty session is a no-op.
    pub fn clear(&self) -> Result<(), SessionError> {
        self.backend.apply(
            self.origin,
            &[
                (storage_keys::AUTH_TOKEN, None),
                (storage_keys::CURRENT_USER, None),
            ],
        )
    }

    /// Whether the user asked to stay signed in.
    pub fn remember_me(&self) -> Result<bool, SessionError> {
        Ok(self.backend.get(storage_keys::REMEMBER_ME)?.as_deref() == Some("true"))
    }

    /// Records the "stay signed in" preference. It survives [`Self::clear`].
    pub fn set_remember_me(&self, remember: bool) -> Result<(), SessionError> {
        let value = remember.then(|| "true".to_string());
        self.backend
            .apply(self.origin, &[(storage_keys::REMEMBER_ME, value)])
    }

    /// Receiver of changes made through any handle sharing this storage.
    pub fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.backend.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edushare_common::{Id, Role};

    fn user(id: &str) -> User {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "email": "marie@lycee.fr",
            "nom": "Curie",
            "prenom": "Marie",
            "role": "professeur"
        }))
        .unwrap()
    }

    #[test]
    fn set_and_clear_as_a_pair() {
        let session = SessionStore::in_memory();
        session.set("t1", &user("u1")).unwrap();

        let snap = session.snapshot().unwrap();
        assert_eq!(snap.token.as_deref(), Some("t1"));
        assert_eq!(snap.user.unwrap().id, Id::from("u1"));
        assert!(session.is_authenticated());

        session.clear().unwrap();
        assert_eq!(session.snapshot().unwrap(), Session::default());

        // Idempotent.
        session.clear().unwrap();
        assert_eq!(session.snapshot().unwrap(), Session::default());
    }

    #[test]
    fn update_user_requires_a_token() {
        let session = SessionStore::in_memory();
        assert!(!session.update_user(&user("u1")).unwrap());
        assert_eq!(session.user().unwrap(), None);

        session.set("t1", &user("u1")).unwrap();
        let mut changed = user("u1");
        changed.role = Role::Eleve;
        assert!(session.update_user(&changed).unwrap());
        assert_eq!(session.user().unwrap().unwrap().role, Role::Eleve);
        assert_eq!(session.token().unwrap().as_deref(), Some("t1"));
    }

    #[test]
    fn update_user_never_outlives_a_clear() {
        for _ in 0..200 {
            let session = SessionStore::in_memory();
            session.set("t1", &user("u1")).unwrap();

            let updater = {
                let tab = session.fork();
                std::thread::spawn(move || tab.update_user(&user("u2")).unwrap())
            };
            session.clear().unwrap();
            updater.join().unwrap();

            assert_eq!(session.token().unwrap(), None);
            assert_eq!(session.user().unwrap(), None);
        }
    }

    #[test]
    fn remember_me_survives_clear() {
        let session = SessionStore::in_memory();
        session.set_remember_me(true).unwrap();
        session.set("t1", &user("u1")).unwrap();
        session.clear().unwrap();
        assert!(session.remember_me().unwrap());
        session.set_remember_me(false).unwrap();
        assert!(!session.remember_me().unwrap());
    }

    #[tokio::test]
    async fn forks_share_storage_and_tag_events() {
        let tab_a = SessionStore::in_memory();
        let tab_b = tab_a.fork();
        assert_ne!(tab_a.origin(), tab_b.origin());

        let mut events = tab_b.subscribe();
        tab_a.set("t1", &user("u1")).unwrap();
        assert_eq!(tab_b.token().unwrap().as_deref(), Some("t1"));

        let first = events.recv().await.unwrap();
        assert_eq!(first.key, storage_keys::AUTH_TOKEN);
        assert_eq!(first.origin, tab_a.origin());
    }

    #[test]
    fn file_backed_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        SessionStore::file(&path).set("t1", &user("u1")).unwrap();

        let reopened = SessionStore::file(&path);
        assert_eq!(reopened.token().unwrap().as_deref(), Some("t1"));
        assert_eq!(reopened.user().unwrap().unwrap().id, Id::from("u1"));
    }
}
