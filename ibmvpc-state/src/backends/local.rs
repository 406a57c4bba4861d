//! Local file backend
//!
//! State lives in a JSON file (default `ibmvpc.state.json`); the lock is a
//! sibling file with the `.lock` extension holding the serialized `LockInfo`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::backend::{BackendConfig, BackendError, BackendResult, StateBackend};
use crate::lock::LockInfo;
use crate::state::StateFile;

pub struct LocalBackend {
    state_path: PathBuf,
    lock_path: PathBuf,
}

impl LocalBackend {
    pub const DEFAULT_STATE_FILE: &'static str = "ibmvpc.state.json";

    pub fn new() -> Self {
        Self::with_path(PathBuf::from(Self::DEFAULT_STATE_FILE))
    }

    pub fn with_path(state_path: PathBuf) -> Self {
        let lock_path = state_path.with_extension("lock");
        Self {
            state_path,
            lock_path,
        }
    }

    pub fn from_config(config: &BackendConfig) -> BackendResult<Self> {
        let path = match config.get_string("path") {
            Some("") => return Err(BackendError::configuration("path must not be empty")),
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(Self::DEFAULT_STATE_FILE),
        };
        Ok(Self::with_path(path))
    }

    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    async fn read_lock(&self) -> BackendResult<Option<LockInfo>> {
        match tokio::fs::read_to_string(&self.lock_path).await {
            Ok(content) => Ok(serde_json::from_str(&content).ok()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BackendError::Io(format!("Failed to read lock file: {}", e))),
        }
    }

    async fn remove_lock(&self) -> BackendResult<()> {
        tokio::fs::remove_file(&self.lock_path)
            .await
            .map_err(|e| BackendError::Io(format!("Failed to remove lock file: {}", e)))
    }

    /// Write the lock only if no lock file exists
    async fn try_create_lock(&self, lock: &LockInfo) -> BackendResult<bool> {
        let content = serde_json::to_vec_pretty(lock)
            .map_err(|e| BackendError::Serialization(format!("Failed to serialize lock: {}", e)))?;
        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.lock_path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => return Err(BackendError::Io(format!("Failed to create lock file: {}", e))),
        };
        file.write_all(&content)
            .await
            .map_err(|e| BackendError::Io(format!("Failed to write lock file: {}", e)))?;
        file.flush()
            .await
            .map_err(|e| BackendError::Io(format!("Failed to write lock file: {}", e)))?;
        Ok(true)
    }
}

impl Default for LocalBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StateBackend for LocalBackend {
    async fn read_state(&self) -> BackendResult<Option<StateFile>> {
        let content = match tokio::fs::read_to_string(&self.state_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(BackendError::Io(format!("Failed to read state file: {}", e))),
        };

        let state: StateFile = serde_json::from_str(&content).map_err(|e| {
            BackendError::InvalidState(format!("Failed to parse state file: {}", e))
        })?;
        Ok(Some(state))
    }

    async fn write_state(&self, state: &StateFile) -> BackendResult<()> {
        if let Some(existing) = self.read_state().await?
            && existing.lineage != state.lineage
        {
            return Err(BackendError::LineageMismatch {
                expected: existing.lineage,
                actual: state.lineage.clone(),
            });
        }

        let content = serde_json::to_string_pretty(state).map_err(|e| {
            BackendError::Serialization(format!("Failed to serialize state: {}", e))
        })?;

        // Write then rename so a crash never leaves a truncated state file
        let tmp_path = self.state_path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, content)
            .await
            .map_err(|e| BackendError::Io(format!("Failed to write state file: {}", e)))?;
        tokio::fs::rename(&tmp_path, &self.state_path)
            .await
            .map_err(|e| BackendError::Io(format!("Failed to replace state file: {}", e)))?;

        log::debug!(
            "Wrote state serial {} to {}",
            state.serial,
            self.state_path.display()
        );
        Ok(())
    }

    async fn acquire_lock(&self, operation: &str) -> BackendResult<LockInfo> {
        let lock = LockInfo::new(operation);
        if self.try_create_lock(&lock).await? {
            return Ok(lock);
        }

        // An expired or unreadable lock is taken over once
        if let Some(existing) = self.read_lock().await?
            && !existing.is_expired()
        {
            return Err(BackendError::locked(&existing));
        }
        log::warn!(
            "Replacing stale lock file {}",
            self.lock_path.display()
        );
        self.remove_lock().await?;
        if self.try_create_lock(&lock).await? {
            return Ok(lock);
        }
        match self.read_lock().await? {
            Some(existing) => Err(BackendError::locked(&existing)),
            None => Err(BackendError::Io(
                "Lock file appeared while acquiring the lock".to_string(),
            )),
        }
    }

    async fn release_lock(&self, lock: &LockInfo) -> BackendResult<()> {
        let existing = match tokio::fs::read_to_string(&self.lock_path).await {
            Ok(content) => serde_json::from_str::<LockInfo>(&content).map_err(|e| {
                BackendError::InvalidState(format!("Failed to parse lock file: {}", e))
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(BackendError::LockNotFound(lock.id.clone()));
            }
            Err(e) => return Err(BackendError::Io(format!("Failed to read lock file: {}", e))),
        };

        if existing.id != lock.id {
            return Err(BackendError::LockMismatch {
                expected: lock.id.clone(),
                actual: existing.id,
            });
        }
        self.remove_lock().await
    }

    async fn force_unlock(&self, lock_id: &str) -> BackendResult<()> {
        if !self.lock_path.exists() {
            return Err(BackendError::LockNotFound(lock_id.to_string()));
        }

        if let Some(existing) = self.read_lock().await?
            && existing.id != lock_id
        {
            return Err(BackendError::LockMismatch {
                expected: lock_id.to_string(),
                actual: existing.id,
            });
        }
        self.remove_lock().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ibmvpc_core::resource::Value;
    use tempfile::tempdir;

    fn backend_in(dir: &tempfile::TempDir) -> LocalBackend {
        LocalBackend::with_path(dir.path().join("ibmvpc.state.json"))
    }

    #[test]
    fn lock_path_is_sibling() {
        let backend = LocalBackend::new();
        assert_eq!(backend.lock_path(), Path::new("ibmvpc.state.lock"));
    }

    #[tokio::test]
    async fn read_write() {
        let dir = tempdir().unwrap();
        let backend = backend_in(&dir);

        assert!(backend.read_state().await.unwrap().is_none());

        let mut state = StateFile::new();
        state.increment_serial();
        backend.write_state(&state).await.unwrap();

        let read = backend.read_state().await.unwrap().unwrap();
        assert_eq!(read, state);
        assert!(!dir.path().join("ibmvpc.state.json.tmp").exists());
    }

    #[tokio::test]
    async fn refuses_foreign_lineage() {
        let dir = tempdir().unwrap();
        let backend = backend_in(&dir);
        backend.write_state(&StateFile::new()).await.unwrap();

        let err = backend.write_state(&StateFile::new()).await.unwrap_err();
        assert!(matches!(err, BackendError::LineageMismatch { .. }));
    }

    #[tokio::test]
    async fn corrupt_state_is_invalid() {
        let dir = tempdir().unwrap();
        let backend = backend_in(&dir);
        std::fs::write(backend.state_path(), "{not json").unwrap();

        let err = backend.read_state().await.unwrap_err();
        assert!(matches!(err, BackendError::InvalidState(_)));
    }

    #[tokio::test]
    async fn locking() {
        let dir = tempdir().unwrap();
        let backend = backend_in(&dir);

        let lock = backend.acquire_lock("apply").await.unwrap();
        let err = backend.acquire_lock("destroy").await.unwrap_err();
        match err {
            BackendError::Locked { lock_id, operation, .. } => {
                assert_eq!(lock_id, lock.id);
                assert_eq!(operation, "apply");
            }
            other => panic!("expected Locked, got {}", other),
        }

        backend.release_lock(&lock).await.unwrap();
        let again = backend.acquire_lock("destroy").await.unwrap();
        backend.release_lock(&again).await.unwrap();
        assert!(!backend.lock_path().exists());
    }

    #[tokio::test]
    async fn expired_lock_is_replaced() {
        let dir = tempdir().unwrap();
        let backend = backend_in(&dir);
        let stale = LockInfo::with_timeout("apply", -60);
        std::fs::write(backend.lock_path(), serde_json::to_string(&stale).unwrap()).unwrap();

        let lock = backend.acquire_lock("refresh").await.unwrap();
        assert_ne!(lock.id, stale.id);
    }

    #[tokio::test]
    async fn release_checks_lock_id() {
        let dir = tempdir().unwrap();
        let backend = backend_in(&dir);
        let held = backend.acquire_lock("apply").await.unwrap();

        let other = LockInfo::new("apply");
        let err = backend.release_lock(&other).await.unwrap_err();
        assert!(matches!(err, BackendError::LockMismatch { .. }));
        assert!(backend.lock_path().exists());

        backend.release_lock(&held).await.unwrap();
        let err = backend.release_lock(&held).await.unwrap_err();
        assert!(matches!(err, BackendError::LockNotFound(_)));
    }

    #[tokio::test]
    async fn force_unlock() {
        let dir = tempdir().unwrap();
        let backend = backend_in(&dir);
        let held = backend.acquire_lock("apply").await.unwrap();

        let err = backend.force_unlock("other-id").await.unwrap_err();
        assert!(matches!(err, BackendError::LockMismatch { .. }));

        backend.force_unlock(&held.id).await.unwrap();
        assert!(!backend.lock_path().exists());

        let err = backend.force_unlock(&held.id).await.unwrap_err();
        assert!(matches!(err, BackendError::LockNotFound(_)));
    }

    #[test]
    fn from_config_path() {
        let mut config = BackendConfig::local();
        let backend = LocalBackend::from_config(&config).unwrap();
        assert_eq!(backend.state_path(), Path::new("ibmvpc.state.json"));

        config
            .attributes
            .insert("path".to_string(), Value::from("envs/prod.state.json"));
        let backend = LocalBackend::from_config(&config).unwrap();
        assert_eq!(backend.state_path(), Path::new("envs/prod.state.json"));
        assert_eq!(backend.lock_path(), Path::new("envs/prod.state.lock"));

        config.attributes.insert("path".to_string(), Value::from(""));
        assert!(matches!(
            LocalBackend::from_config(&config),
            Err(BackendError::Configuration(_))
        ));
    }
}
