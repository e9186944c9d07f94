//! Durable session storage. The layout mirrors browser local storage: a flat
//! string map holding `token` and `user` (the user record as JSON text).

use crate::session::{
    errors::StorageError,
    types::{Session, User},
};
use std::{
    collections::BTreeMap,
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

/// String key/value store with local-storage semantics.
pub trait KeyValueStore {
    /// # Errors
    /// Returns `StorageError` if the backing medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// # Errors
    /// Returns `StorageError` if the value cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// # Errors
    /// Returns `StorageError` if the key cannot be removed.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-memory store.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// JSON object file. A missing file reads as empty; writes replace the file
/// atomically through a temporary sibling.
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => {
                serde_json::from_str(&contents).map_err(|source| StorageError::Corrupt {
                    path: self.path.clone(),
                    source,
                })
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(self.io_error(err)),
        }
    }

    fn write(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| self.io_error(err))?;
        }

        let payload = serde_json::to_vec_pretty(entries)?;
        let tmp_path = self.path.with_extension("tmp");

        let mut file = open_private(&tmp_path).map_err(|err| self.io_error(err))?;
        file.write_all(&payload)
            .and_then(|()| file.sync_all())
            .map_err(|err| self.io_error(err))?;
        drop(file);

        fs::rename(&tmp_path, &self.path).map_err(|err| self.io_error(err))?;
        debug!(path = %self.path.display(), "session storage written");
        Ok(())
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;

    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.read()?;
        entries.insert(key.to_string(), value.to_string());
        self.write(&entries)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.read()?;
        if entries.remove(key).is_some() {
            self.write(&entries)?;
        }
        Ok(())
    }
}

/// Typed session view over a key/value store.
#[derive(Clone, Debug)]
pub struct SessionStorage<K> {
    store: K,
}

impl<K: KeyValueStore> SessionStorage<K> {
    pub const fn new(store: K) -> Self {
        Self { store }
    }

    pub const fn store(&self) -> &K {
        &self.store
    }

    /// Raw stored auth token.
    ///
    /// # Errors
    /// Returns `StorageError` if the store cannot be read.
    pub fn token(&self) -> Result<Option<String>, StorageError> {
        self.store.get(TOKEN_KEY)
    }

    /// Loads the stored session. Half-written records (one key missing, or a
    /// user that does not parse) are removed and read as no session.
    ///
    /// # Errors
    /// Returns `StorageError` if the store cannot be read or cleaned up.
    pub fn load(&mut self) -> Result<Option<Session>, StorageError> {
        let token = self.store.get(TOKEN_KEY)?.filter(|t| !t.is_empty());
        let user = self.store.get(USER_KEY)?;

        match (token, user) {
            (None, None) => Ok(None),
            (Some(auth_token), Some(raw_user)) => match serde_json::from_str::<User>(&raw_user) {
                Ok(user) => Ok(Some(Session {
                    auth_token,
                    user,
                    session_id: None,
                })),
                Err(err) => {
                    warn!("discarding stored session with unreadable user record: {err}");
                    self.clear()?;
                    Ok(None)
                }
            },
            _ => {
                warn!("discarding incomplete stored session");
                self.clear()?;
                Ok(None)
            }
        }
    }

    /// Persists token and user.
    ///
    /// # Errors
    /// Returns `StorageError` if encoding or writing fails.
    pub fn save(&mut self, session: &Session) -> Result<(), StorageError> {
        let user = serde_json::to_string(&session.user)?;
        self.store.set(TOKEN_KEY, &session.auth_token)?;
        if let Err(err) = self.store.set(USER_KEY, &user) {
            // never leave a token without its user
            if let Err(rollback) = self.store.remove(TOKEN_KEY) {
                warn!("stored token left without its user record: {rollback}");
            }
            return Err(err);
        }
        Ok(())
    }

    /// Removes both session keys.
    ///
    /// # Errors
    /// Returns the first `StorageError`; both removals are always attempted.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        let token = self.store.remove(TOKEN_KEY);
        let user = self.store.remove(USER_KEY);
        token.and(user)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::session::{role::Role, types::RecordId};

    fn session() -> Session {
        Session {
            auth_token: "abc".to_string(),
            user: User {
                id: Some(RecordId::Number(9)),
                first_name: "Juan".to_string(),
                role: Role::Client,
                ..User::default()
            },
            session_id: Some("ignored".to_string()),
        }
    }

    #[test]
    fn memory_round_trip() {
        let mut storage = SessionStorage::new(MemoryStore::new());
        assert!(storage.load().unwrap().is_none());

        storage.save(&session()).unwrap();
        assert_eq!(storage.token().unwrap().as_deref(), Some("abc"));

        let loaded = storage.load().unwrap().unwrap();
        assert_eq!(loaded.auth_token, "abc");
        assert_eq!(loaded.user.first_name, "Juan");
        // session id belongs to one login exchange and is not persisted
        assert_eq!(loaded.session_id, None);

        storage.clear().unwrap();
        assert!(storage.store().is_empty());
    }

    /// Memory store whose user writes (and optionally removals) fail.
    #[derive(Default)]
    struct FailingStore {
        inner: MemoryStore,
        fail_removes: bool,
    }

    fn io_error(key: &str) -> StorageError {
        StorageError::Io {
            path: PathBuf::from(key),
            source: std::io::Error::new(ErrorKind::Other, "disk full"),
        }
    }

    impl KeyValueStore for FailingStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            if key == USER_KEY {
                return Err(io_error(key));
            }
            self.inner.set(key, value)
        }

        fn remove(&mut self, key: &str) -> Result<(), StorageError> {
            if self.fail_removes {
                return Err(io_error(key));
            }
            self.inner.remove(key)
        }
    }

    #[test]
    fn failed_user_write_rolls_back_token() {
        let mut storage = SessionStorage::new(FailingStore::default());
        let err = storage.save(&session()).unwrap_err();
        assert!(matches!(err, StorageError::Io { ref path, .. } if path == Path::new(USER_KEY)));
        assert!(storage.store().inner.is_empty());
    }

    #[test]
    fn failed_rollback_keeps_the_write_error() {
        let mut storage = SessionStorage::new(FailingStore {
            fail_removes: true,
            ..FailingStore::default()
        });
        let err = storage.save(&session()).unwrap_err();
        assert!(matches!(err, StorageError::Io { ref path, .. } if path == Path::new(USER_KEY)));
        // the orphaned token is discarded on the next load
        assert_eq!(storage.store().inner.get(TOKEN_KEY).unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn incomplete_record_is_discarded() {
        let mut store = MemoryStore::new();
        store.set(TOKEN_KEY, "abc").unwrap();
        let mut storage = SessionStorage::new(store);

        assert!(storage.load().unwrap().is_none());
        assert!(storage.store().is_empty());
    }

    #[test]
    fn unreadable_user_is_discarded() {
        let mut store = MemoryStore::new();
        store.set(TOKEN_KEY, "abc").unwrap();
        store.set(USER_KEY, "{not json").unwrap();
        let mut storage = SessionStorage::new(store);

        assert!(storage.load().unwrap().is_none());
        assert!(storage.store().is_empty());
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let mut storage = SessionStorage::new(FileStore::new(&path));
        storage.save(&session()).unwrap();
        assert!(path.exists());

        let mut reopened = SessionStorage::new(FileStore::new(&path));
        let loaded = reopened.load().unwrap().unwrap();
        assert_eq!(loaded.user.role, Role::Client);

        reopened.clear().unwrap();
        let mut again = SessionStorage::new(FileStore::new(&path));
        assert!(again.load().unwrap().is_none());
    }

    #[test]
    fn file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("absent.json"));
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn file_store_reports_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "[1, 2").unwrap();

        let store = FileStore::new(&path);
        assert!(matches!(
            store.get(TOKEN_KEY),
            Err(StorageError::Corrupt { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn file_store_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let mut store = FileStore::new(&path);
        store.set(TOKEN_KEY, "abc").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
