pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod service;

pub use error::TabulaError;

use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::db::{Database, Schema, TableProvisioner};
use crate::service::CollectionService;

/// Connect, load the schema, and reset every declared collection.
///
/// Fails without serving anything if the schema declaration is malformed.
/// Declared collections lose all their rows.
pub async fn bootstrap(cfg: &Config) -> Result<CollectionService, TabulaError> {
    let schema = Arc::new(Schema::load(&cfg.schema_path)?);
    info!(
        path = %cfg.schema_path.display(),
        collections = schema.len(),
        "schema loaded"
    );

    let db = Database::connect(&cfg.database_url).await?;
    start(&db, schema).await
}

/// Reset declared collections on an already open database and build the service.
pub async fn start(db: &Database, schema: Arc<Schema>) -> Result<CollectionService, TabulaError> {
    TableProvisioner::new(db.pool().clone())
        .reset_all(&schema)
        .await?;
    Ok(CollectionService::new(db, schema))
}
