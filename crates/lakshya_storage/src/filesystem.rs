//! Filesystem-backed document store.
//!
//! Each document is one pretty-printed JSON file, grouped by collection.

use crate::select::{select, validate_path, validate_segment};
use async_trait::async_trait;
use lakshya_error::{StorageError, StorageErrorKind, StorageResult};
use lakshya_interface::{DocumentPath, DocumentStore, Filter, Record};
use serde_json::Value;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const EXTENSION: &str = "json";

/// Filesystem document store.
///
/// Layout: `{root}/{collection}/{id}.json`
///
/// ```text
/// data/
/// ├── colleges/
/// │   ├── coep.json
/// │   └── iit-bombay.json
/// └── chat_sessions/
///     └── 5b0e...c1.json
/// ```
///
/// Writes go to a uniquely named temp file first and are renamed into
/// place, so readers never observe a half-written document and two writers
/// of the same document leave one complete version behind.
#[derive(Debug, Clone)]
pub struct FileDocumentStore {
    root: PathBuf,
}

impl FileDocumentStore {
    /// Create a store rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created.
    #[tracing::instrument(skip(root))]
    pub fn new(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();

        std::fs::create_dir_all(&root).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                root.display(),
                e
            )))
        })?;

        tracing::info!(path = %root.display(), "Opened file document store");
        Ok(Self { root })
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_dir(&self, collection: &str) -> PathBuf {
        self.root.join(collection)
    }

    fn document_file(&self, path: &DocumentPath) -> PathBuf {
        self.collection_dir(&path.collection)
            .join(format!("{}.{}", path.id, EXTENSION))
    }

    async fn read_document(file: &Path) -> StorageResult<Option<Value>> {
        let bytes = match tokio::fs::read(file).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StorageError::new(StorageErrorKind::Read(format!(
                    "{}: {}",
                    file.display(),
                    e
                ))));
            }
        };

        serde_json::from_slice(&bytes).map(Some).map_err(|e| {
            StorageError::new(StorageErrorKind::Serialization(format!(
                "{}: {}",
                file.display(),
                e
            )))
        })
    }
}

#[async_trait]
impl DocumentStore for FileDocumentStore {
    #[tracing::instrument(skip(self, filters), fields(filters = filters.len()))]
    async fn query(
        &self,
        collection: &str,
        filters: &[Filter],
        limit: Option<usize>,
    ) -> StorageResult<Vec<Record>> {
        validate_segment(collection)?;
        let dir = self.collection_dir(collection);

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StorageError::new(StorageErrorKind::Read(format!(
                    "{}: {}",
                    dir.display(),
                    e
                ))));
            }
        };

        let mut records = Vec::new();
        loop {
            let entry = entries.next_entry().await.map_err(|e| {
                StorageError::new(StorageErrorKind::Read(format!("{}: {}", dir.display(), e)))
            })?;
            let Some(entry) = entry else { break };

            let file = entry.path();
            if file.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Some(id) = file.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let id = id.to_string();

            // Deleted between listing and reading
            if let Some(data) = Self::read_document(&file).await? {
                records.push(Record {
                    path: DocumentPath::new(collection, id),
                    data,
                });
            }
        }

        let selected = select(records, filters, limit);
        tracing::debug!(matched = selected.len(), "Query complete");
        Ok(selected)
    }

    #[tracing::instrument(skip(self), fields(path = %path))]
    async fn get_record(&self, path: &DocumentPath) -> StorageResult<Option<Record>> {
        validate_path(path)?;

        let data = Self::read_document(&self.document_file(path)).await?;
        Ok(data.map(|data| Record {
            path: path.clone(),
            data,
        }))
    }

    #[tracing::instrument(skip(self, data))]
    async fn add_record(&self, collection: &str, data: Value) -> StorageResult<DocumentPath> {
        let path = DocumentPath::new(collection, Uuid::new_v4().to_string());
        self.set_record(&path, data).await?;
        Ok(path)
    }

    #[tracing::instrument(skip(self, data), fields(path = %path))]
    async fn set_record(&self, path: &DocumentPath, data: Value) -> StorageResult<()> {
        validate_path(path)?;

        let dir = self.collection_dir(&path.collection);
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                dir.display(),
                e
            )))
        })?;

        let bytes = serde_json::to_vec_pretty(&data).map_err(|e| {
            StorageError::new(StorageErrorKind::Serialization(format!("{}: {}", path, e)))
        })?;

        // Write to temp file first, then rename for atomicity
        let file = self.document_file(path);
        let temp = dir.join(format!(".{}.{}.tmp", path.id, Uuid::new_v4()));
        tokio::fs::write(&temp, &bytes).await.map_err(|e| {
            StorageError::new(StorageErrorKind::Write(format!("{}: {}", temp.display(), e)))
        })?;

        if let Err(e) = tokio::fs::rename(&temp, &file).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(StorageError::new(StorageErrorKind::Write(format!(
                "rename {} to {}: {}",
                temp.display(),
                file.display(),
                e
            ))));
        }

        tracing::debug!(file = %file.display(), size = bytes.len(), "Stored document");
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(path = %path))]
    async fn delete_record(&self, path: &DocumentPath) -> StorageResult<()> {
        validate_path(path)?;

        let file = self.document_file(path);
        match tokio::fs::remove_file(&file).await {
            Ok(()) => {
                tracing::debug!(file = %file.display(), "Deleted document");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::new(StorageErrorKind::Write(format!(
                "delete {}: {}",
                file.display(),
                e
            )))),
        }
    }
}
