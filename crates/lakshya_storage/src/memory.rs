//! In-process document store.

use crate::select::{select, validate_path, validate_segment};
use async_trait::async_trait;
use lakshya_error::StorageResult;
use lakshya_interface::{DocumentPath, DocumentStore, Filter, Record};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Document store held entirely in memory.
///
/// Suitable for tests, demos and short-lived sessions. Each write replaces
/// one document under a single lock, so concurrent writers to different
/// documents never interfere.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Value>>>,
}

impl InMemoryDocumentStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in `collection`.
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, BTreeMap::len)
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    #[instrument(skip(self, filters), fields(filters = filters.len()))]
    async fn query(
        &self,
        collection: &str,
        filters: &[Filter],
        limit: Option<usize>,
    ) -> StorageResult<Vec<Record>> {
        validate_segment(collection)?;

        let records = self
            .collections
            .read()
            .await
            .get(collection)
            .map(|documents| {
                documents
                    .iter()
                    .map(|(id, data)| Record {
                        path: DocumentPath::new(collection, id.clone()),
                        data: data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let selected = select(records, filters, limit);
        debug!(matched = selected.len(), "Query complete");
        Ok(selected)
    }

    #[instrument(skip(self), fields(path = %path))]
    async fn get_record(&self, path: &DocumentPath) -> StorageResult<Option<Record>> {
        validate_path(path)?;

        Ok(self
            .collections
            .read()
            .await
            .get(&path.collection)
            .and_then(|documents| documents.get(&path.id))
            .map(|data| Record {
                path: path.clone(),
                data: data.clone(),
            }))
    }

    #[instrument(skip(self, data))]
    async fn add_record(&self, collection: &str, data: Value) -> StorageResult<DocumentPath> {
        let path = DocumentPath::new(collection, Uuid::new_v4().to_string());
        self.set_record(&path, data).await?;
        Ok(path)
    }

    #[instrument(skip(self, data), fields(path = %path))]
    async fn set_record(&self, path: &DocumentPath, data: Value) -> StorageResult<()> {
        validate_path(path)?;

        self.collections
            .write()
            .await
            .entry(path.collection.clone())
            .or_default()
            .insert(path.id.clone(), data);
        debug!("Stored document");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %path))]
    async fn delete_record(&self, path: &DocumentPath) -> StorageResult<()> {
        validate_path(path)?;

        let removed = self
            .collections
            .write()
            .await
            .get_mut(&path.collection)
            .and_then(|documents| documents.remove(&path.id));
        debug!(existed = removed.is_some(), "Deleted document");
        Ok(())
    }
}
