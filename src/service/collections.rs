use crate::db::{Database, Ident, Record, RecordId, RecordStore, Schema, TableProvisioner};
use crate::error::TabulaError;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Per-request entry point. Writes make sure the collection's table exists
/// before running; reads and deletes never create tables.
#[derive(Clone)]
pub struct CollectionService {
    provisioner: TableProvisioner,
    store: RecordStore,
}

impl CollectionService {
    pub fn new(db: &Database, schema: Arc<Schema>) -> Self {
        Self {
            provisioner: TableProvisioner::new(db.pool().clone()),
            store: RecordStore::new(db.pool().clone(), schema),
        }
    }

    pub async fn create(
        &self,
        collection: &str,
        fields: &Map<String, Value>,
    ) -> Result<RecordId, TabulaError> {
        self.ensure(collection).await?;
        self.store.create(collection, fields).await
    }

    pub async fn read(&self, collection: &str, id: RecordId) -> Result<Option<Record>, TabulaError> {
        self.store.read(collection, id).await
    }

    /// Full-replace update; returns the stored record, or `None` if absent.
    pub async fn update(
        &self,
        collection: &str,
        id: RecordId,
        fields: &Map<String, Value>,
    ) -> Result<Option<Record>, TabulaError> {
        self.ensure(collection).await?;
        self.store.update(collection, id, fields).await
    }

    pub async fn delete(&self, collection: &str, id: RecordId) -> Result<bool, TabulaError> {
        self.store.delete(collection, id).await
    }

    async fn ensure(&self, collection: &str) -> Result<(), TabulaError> {
        let ident = Ident::parse(collection)?;
        self.provisioner.ensure_exists(&ident).await
    }
}
