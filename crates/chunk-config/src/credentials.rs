use chunk_models::CredentialRecord;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("credential store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse credential record at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize credential record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Storage boundary for the credential record.
///
/// `save` must be atomic: a concurrent reader sees either the previous or the
/// new record, never a partial write.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Result<CredentialRecord, StoreError>;
    fn save(&self, record: &CredentialRecord) -> Result<(), StoreError>;

    /// Human readable location for logs and `config show`.
    fn location(&self) -> String;
}

/// Credential record kept as a pretty-printed JSON document on disk.
pub struct JsonFileCredentialStore {
    path: PathBuf,
}

impl JsonFileCredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn io_error(&self, path: &Path, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl CredentialStore for JsonFileCredentialStore {
    fn load(&self) -> Result<CredentialRecord, StoreError> {
        if !self.path.exists() {
            warn!(path = %self.path.display(), "credential file not found");
            return Ok(CredentialRecord::default());
        }

        let content = std::fs::read_to_string(&self.path).map_err(|e| self.io_error(&self.path, e))?;
        serde_json::from_str(&content).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, record: &CredentialRecord) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| self.io_error(parent, e))?;
            }
        }

        let json = serde_json::to_string_pretty(record)?;

        // Atomic write: tmp file, then rename over the target
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        std::fs::write(&tmp, json).map_err(|e| self.io_error(&tmp, e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600))
                .map_err(|e| self.io_error(&tmp, e))?;
        }

        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_error(&self.path, e))?;
        debug!(path = %self.path.display(), "credential record saved");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory store; records how many times it was saved.
#[derive(Default)]
pub struct MemoryCredentialStore {
    inner: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    record: CredentialRecord,
    saves: usize,
}

impl MemoryCredentialStore {
    pub fn new(record: CredentialRecord) -> Self {
        Self {
            inner: Mutex::new(MemoryState { record, saves: 0 }),
        }
    }

    pub fn snapshot(&self) -> CredentialRecord {
        self.lock().record.clone()
    }

    pub fn save_count(&self) -> usize {
        self.lock().saves
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<CredentialRecord, StoreError> {
        Ok(self.lock().record.clone())
    }

    fn save(&self, record: &CredentialRecord) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.record = record.clone();
        state.saves += 1;
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
