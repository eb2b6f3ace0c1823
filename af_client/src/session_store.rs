//! Persistent slot for the current session token.
//!
//! At most one token is held at a time; `save` replaces whatever was there.

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Mutex,
};

use crate::errors::{ClientError, ClientResult};

/// Single-slot token storage
pub trait SessionStore: Send + Sync {
    /// Store `token`, replacing any previous one
    fn save(&self, token: &str) -> ClientResult<()>;

    /// Current token, if any
    fn load(&self) -> ClientResult<Option<String>>;

    /// Forget the stored token; clearing an empty slot is not an error
    fn clear(&self) -> ClientResult<()>;
}

/// Token kept in a file so it survives client restarts
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn save(&self, token: &str) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(storage_error)?;
            }
        }
        fs::write(&self.path, token).map_err(storage_error)
    }

    fn load(&self) -> ClientResult<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(storage_error(e)),
        }
    }

    fn clear(&self) -> ClientResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error(e)),
        }
    }
}

fn storage_error(e: io::Error) -> ClientError {
    ClientError::Storage(e.to_string())
}

/// Process-local store, mainly for tests and embedding
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    token: Mutex<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `token`
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn save(&self, token: &str) -> ClientResult<()> {
        let mut slot = self
            .token
            .lock()
            .map_err(|_| ClientError::Storage("session lock poisoned".to_string()))?;
        *slot = Some(token.to_string());
        Ok(())
    }

    fn load(&self) -> ClientResult<Option<String>> {
        let slot = self
            .token
            .lock()
            .map_err(|_| ClientError::Storage("session lock poisoned".to_string()))?;
        Ok(slot.clone())
    }

    fn clear(&self) -> ClientResult<()> {
        let mut slot = self
            .token
            .lock()
            .map_err(|_| ClientError::Storage("session lock poisoned".to_string()))?;
        *slot = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("nested").join("session"));

        assert_eq!(store.load().unwrap(), None);

        store.save("first").unwrap();
        store.save("second").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("second"));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        // Clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_survives_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session");

        FileSessionStore::new(&path).save("persisted").unwrap();
        let reopened = FileSessionStore::new(&path);
        assert_eq!(reopened.load().unwrap().as_deref(), Some("persisted"));
    }

    #[test]
    fn test_blank_file_is_empty_slot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session");
        fs::write(&path, "  \n").unwrap();

        assert_eq!(FileSessionStore::new(path).load().unwrap(), None);
    }

    #[test]
    fn test_memory_store() {
        let store = MemorySessionStore::with_token("abc");
        assert_eq!(store.load().unwrap().as_deref(), Some("abc"));
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }
}
