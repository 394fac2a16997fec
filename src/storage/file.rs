use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;

use super::KeyValueStore;
use crate::error::{AppError, AppResult};

/// Store keeping every key in one JSON document on disk
///
/// Writes go to a sibling temporary file that is then renamed over the
/// document, so a crash mid-write leaves the previous version intact.
pub struct FileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles on the document
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    async fn read_document(&self) -> AppResult<BTreeMap<String, String>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(AppError::Storage(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&contents).map_err(|e| {
            AppError::Storage(format!("Corrupt store file {}: {}", self.path.display(), e))
        })
    }

    async fn write_document(&self, document: &BTreeMap<String, String>) -> AppResult<()> {
        let json = serde_json::to_string_pretty(document)
            .map_err(|e| AppError::Storage(format!("Store serialization error: {}", e)))?;

        let tmp_path = self.path.with_extension("tmp");
        tokio::fs::write(&tmp_path, json).await.map_err(|e| {
            AppError::Storage(format!("Failed to write {}: {}", tmp_path.display(), e))
        })?;
        tokio::fs::rename(&tmp_path, &self.path).await.map_err(|e| {
            AppError::Storage(format!("Failed to replace {}: {}", self.path.display(), e))
        })?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let _guard = self.lock.lock().await;
        let mut document = self.read_document().await?;
        Ok(document.remove(key))
    }

    async fn set(&self, key: &str, value: String) -> AppResult<()> {
        let _guard = self.lock.lock().await;
        let mut document = self.read_document().await?;
        document.insert(key.to_string(), value);
        self.write_document(&document).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let _guard = self.lock.lock().await;
        let mut document = self.read_document().await?;
        if document.remove(key).is_some() {
            self.write_document(&document).await?;
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
