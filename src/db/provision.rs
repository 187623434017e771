use crate::db::ident::Ident;
use crate::db::schema::{Schema, ad_hoc_table_sql};
use crate::db::sqlite::SqlitePool;
use crate::error::TabulaError;
use sqlx::FromRow;
use tracing::{debug, info};

/// A column as SQLite reports it for an existing table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct PhysicalColumn {
    pub name: String,
    #[sqlx(rename = "type")]
    pub ty: String,
    pub pk: i64,
}

/// Creates and resets collection tables.
#[derive(Clone)]
pub struct TableProvisioner {
    pool: SqlitePool,
}

impl TableProvisioner {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Drop and recreate every declared collection from the schema.
    ///
    /// Destroys all rows of declared collections. Must finish before any
    /// request is served.
    pub async fn reset_all(&self, schema: &Schema) -> Result<(), TabulaError> {
        let mut tx = self.pool.begin().await?;
        for collection in schema.collections() {
            let drop_sql = format!("DROP TABLE IF EXISTS {}", collection.name.quoted());
            sqlx::query(&drop_sql).execute(&mut *tx).await?;

            let create_sql = collection.create_table_sql();
            sqlx::query(&create_sql).execute(&mut *tx).await?;
            debug!(
                collection = %collection.name,
                columns = collection.columns.len(),
                "collection table recreated"
            );
        }
        tx.commit().await?;

        info!(count = schema.len(), "declared collections reset");
        Ok(())
    }

    /// Create an identity-only table for `collection` unless one already exists.
    pub async fn ensure_exists(&self, collection: &Ident) -> Result<(), TabulaError> {
        sqlx::query(&ad_hoc_table_sql(collection))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn exists(&self, collection: &Ident) -> Result<bool, TabulaError> {
        let (found,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?)",
        )
        .bind(collection.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(found)
    }

    /// Physical columns of `collection` in table order; empty if it does not exist.
    pub async fn columns(&self, collection: &Ident) -> Result<Vec<PhysicalColumn>, TabulaError> {
        let cols = sqlx::query_as::<_, PhysicalColumn>(
            "SELECT name, type, pk FROM pragma_table_info(?) ORDER BY cid",
        )
        .bind(collection.as_str())
        .fetch_all(&self.pool)
        .await?;
        Ok(cols)
    }
}
