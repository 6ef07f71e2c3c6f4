use crate::core::traits::DocumentStore;
use crate::utils::error::{AppError, AppResult};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// One pretty-printed JSON array per collection: `<data_dir>/<collection>.json`
pub struct JsonFileStore {
    data_dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into() }
    }

    fn collection_path(&self, collection: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", collection))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn load(&self, collection: &str) -> AppResult<Vec<Value>> {
        let path = self.collection_path(collection);

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(AppError::Storage(format!(
                    "Failed to read collection file {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        // Handle empty files
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str::<Vec<Value>>(&content).map_err(|e| {
            AppError::Storage(format!("Failed to parse collection file {}: {}", path.display(), e))
        })
    }

    async fn save(&self, collection: &str, documents: &[Value]) -> AppResult<()> {
        self.ensure_ready().await?;

        let path = self.collection_path(collection);
        let content = serde_json::to_string_pretty(documents)
            .map_err(|e| AppError::Storage(format!("Failed to serialize collection '{}': {}", collection, e)))?;

        // Write beside the target then rename so readers never see a partial file
        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, content).await.map_err(|e| {
            AppError::Storage(format!("Failed to write collection file {}: {}", tmp_path.display(), e))
        })?;
        tokio::fs::rename(&tmp_path, &path).await.map_err(|e| {
            AppError::Storage(format!("Failed to replace collection file {}: {}", path.display(), e))
        })?;

        tracing::debug!(collection, documents = documents.len(), "collection saved");
        Ok(())
    }

    async fn ensure_ready(&self) -> AppResult<()> {
        tokio::fs::create_dir_all(&self.data_dir).await.map_err(|e| {
            AppError::Storage(format!("Failed to create data directory {}: {}", self.data_dir.display(), e))
        })
    }
}

/// Process-local store, used by tests and `backend = "memory"`
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Value>>>,
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn load(&self, collection: &str) -> AppResult<Vec<Value>> {
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .cloned()
            .unwrap_or_default())
    }

    async fn save(&self, collection: &str, documents: &[Value]) -> AppResult<()> {
        self.collections
            .write()
            .await
            .insert(collection.to_string(), documents.to_vec());
        Ok(())
    }

    async fn ensure_ready(&self) -> AppResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_file_store_missing_collection_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("data"));
        assert!(store.load("prompts").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_store_round_trip_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("data"));

        store.save("patterns", &[json!({ "id": "p1" })]).await.unwrap();
        let loaded = store.load("patterns").await.unwrap();
        assert_eq!(loaded, vec![json!({ "id": "p1" })]);
        assert!(dir.path().join("nested/data/patterns.json").exists());
        assert!(!dir.path().join("nested/data/patterns.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_file_store_empty_file_is_empty_collection() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("workflows.json"), "  \n").unwrap();
        let store = JsonFileStore::new(dir.path());
        assert!(store.load("workflows").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_store_corrupt_file_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("prompts.json"), "{ not json").unwrap();
        let store = JsonFileStore::new(dir.path());
        assert!(matches!(store.load("prompts").await, Err(AppError::Storage(_))));
    }

    #[tokio::test]
    async fn test_memory_store_isolates_collections() {
        let store = MemoryStore::default();
        store.save("a", &[json!(1)]).await.unwrap();
        assert_eq!(store.load("a").await.unwrap().len(), 1);
        assert!(store.load("b").await.unwrap().is_empty());
    }
}
