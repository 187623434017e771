use crate::db::ident::Ident;
use crate::db::models::{Record, RecordId, SqlValue};
use crate::db::schema::{ColumnDef, IDENTITY_COLUMN, Schema};
use crate::db::sqlite::SqlitePool;
use crate::error::TabulaError;
use serde_json::{Map, Value};
use sqlx::error::DatabaseError as _;
use std::sync::Arc;
use tracing::debug;

/// Single-record CRUD over collection tables.
///
/// Table and column names come from the schema or pass [`Ident::parse`]
/// before they reach statement text; values are always bound.
#[derive(Clone)]
pub struct RecordStore {
    pool: SqlitePool,
    schema: Arc<Schema>,
}

impl RecordStore {
    pub fn new(pool: SqlitePool, schema: Arc<Schema>) -> Self {
        Self { pool, schema }
    }

    /// Insert a record into a declared collection. Returns the new identity.
    ///
    /// Declared columns missing from `fields` are stored as NULL; keys that are
    /// not declared columns are ignored.
    pub async fn create(
        &self,
        collection: &str,
        fields: &Map<String, Value>,
    ) -> Result<RecordId, TabulaError> {
        let (table, columns) = self.declared(collection)?;

        let sql = if columns.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES", table.quoted())
        } else {
            let names = columns
                .iter()
                .map(|c| c.name.quoted())
                .collect::<Vec<_>>()
                .join(", ");
            let placeholders = vec!["?"; columns.len()].join(", ");
            format!(
                "INSERT INTO {} ({names}) VALUES ({placeholders})",
                table.quoted()
            )
        };

        let mut query = sqlx::query(&sql);
        for value in bind_values(columns, fields)? {
            query = value.bind_to(query);
        }
        let id = query.execute(&self.pool).await?.last_insert_rowid();

        debug!(collection = %table, id, "record created");
        Ok(id)
    }

    /// Fetch a record by identity from any collection.
    ///
    /// A collection that has never been provisioned holds no records, so a
    /// missing table reads as absence.
    pub async fn read(&self, collection: &str, id: RecordId) -> Result<Option<Record>, TabulaError> {
        let table = Ident::parse(collection)?;
        let sql = format!(
            "SELECT * FROM {} WHERE \"{IDENTITY_COLUMN}\" = ?",
            table.quoted()
        );
        let row = match sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await {
            Ok(row) => row,
            Err(e) if is_missing_table(&e) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        row.as_ref().map(Record::from_row).transpose()
    }

    /// Replace every declared column of a record and return the stored row,
    /// or `None` if no record has `id`.
    ///
    /// This is a full replace: declared columns missing from `fields` are set
    /// to NULL.
    pub async fn update(
        &self,
        collection: &str,
        id: RecordId,
        fields: &Map<String, Value>,
    ) -> Result<Option<Record>, TabulaError> {
        let (table, columns) = self.declared(collection)?;

        if columns.is_empty() {
            return self.read(table.as_str(), id).await;
        }

        let assignments = columns
            .iter()
            .map(|c| format!("{} = ?", c.name.quoted()))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {assignments} WHERE \"{IDENTITY_COLUMN}\" = ? RETURNING *",
            table.quoted()
        );

        let mut query = sqlx::query(&sql);
        for value in bind_values(columns, fields)? {
            query = value.bind_to(query);
        }
        let row = query.bind(id).fetch_optional(&self.pool).await?;

        debug!(collection = %table, id, found = row.is_some(), "record updated");
        row.as_ref().map(Record::from_row).transpose()
    }

    /// Delete a record. Returns whether a row was actually removed; a
    /// collection without a table has nothing to remove.
    pub async fn delete(&self, collection: &str, id: RecordId) -> Result<bool, TabulaError> {
        let table = Ident::parse(collection)?;
        let sql = format!(
            "DELETE FROM {} WHERE \"{IDENTITY_COLUMN}\" = ?",
            table.quoted()
        );
        let affected = match sqlx::query(&sql).bind(id).execute(&self.pool).await {
            Ok(done) => done.rows_affected(),
            Err(e) if is_missing_table(&e) => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        debug!(collection = %table, id, affected, "record deleted");
        Ok(affected > 0)
    }

    fn declared(&self, collection: &str) -> Result<(&Ident, &[ColumnDef]), TabulaError> {
        let def = self
            .schema
            .get(collection)
            .ok_or_else(|| TabulaError::UnknownCollection(collection.to_string()))?;
        Ok((&def.name, def.columns.as_slice()))
    }
}

fn is_missing_table(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.message().starts_with("no such table"))
}

fn bind_values(
    columns: &[ColumnDef],
    fields: &Map<String, Value>,
) -> Result<Vec<SqlValue>, TabulaError> {
    columns
        .iter()
        .map(|c| SqlValue::from_json(c.name.as_str(), c.ty, fields.get(c.name.as_str())))
        .collect()
}
