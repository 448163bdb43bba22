use async_trait::async_trait;
use serde_json::{Map, Value};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::Mutex;

/// Key the map credential is stored under.
pub const MAPS_CREDENTIAL_KEY: &str = "googleMapsApiKey";

#[derive(Debug, Error)]
pub enum CredentialStoreError {
    #[error("Credential store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Credential store is corrupt: {0}")]
    Json(#[from] serde_json::Error),
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get(&self) -> Result<Option<String>, CredentialStoreError>;
    async fn set(&self, credential: &str) -> Result<(), CredentialStoreError>;
    async fn clear(&self) -> Result<(), CredentialStoreError>;
}

/// JSON object on disk, credential under [`MAPS_CREDENTIAL_KEY`]. Other keys
/// in the file are preserved.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    async fn read_entries(&self) -> Result<Map<String, Value>, CredentialStoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) if contents.trim().is_empty() => Ok(Map::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_entries(&self, entries: &Map<String, Value>) -> Result<(), CredentialStoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let contents = serde_json::to_string_pretty(entries)?;
        tokio::fs::write(&self.path, contents).await?;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn get(&self) -> Result<Option<String>, CredentialStoreError> {
        let entries = self.read_entries().await?;
        Ok(entries
            .get(MAPS_CREDENTIAL_KEY)
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    async fn set(&self, credential: &str) -> Result<(), CredentialStoreError> {
        let mut entries = self.read_entries().await?;
        entries.insert(
            MAPS_CREDENTIAL_KEY.to_string(),
            Value::String(credential.to_string()),
        );
        self.write_entries(&entries).await
    }

    async fn clear(&self) -> Result<(), CredentialStoreError> {
        let mut entries = self.read_entries().await?;
        if entries.remove(MAPS_CREDENTIAL_KEY).is_some() {
            self.write_entries(&entries).await?;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryCredentialStore {
    value: Mutex<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn with_credential(credential: &str) -> Self {
        Self {
            value: Mutex::new(Some(credential.to_string())),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self) -> Result<Option<String>, CredentialStoreError> {
        Ok(self.value.lock().await.clone())
    }

    async fn set(&self, credential: &str) -> Result<(), CredentialStoreError> {
        *self.value.lock().await = Some(credential.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<(), CredentialStoreError> {
        self.value.lock().await.take();
        Ok(())
    }
}
