//! Records and the mapping between JSON values and SQLite values.

use crate::db::schema::{ColumnType, IDENTITY_COLUMN};
use crate::error::TabulaError;
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::Serialize;
use serde_json::{Map, Number, Value};
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::query::Query;
use sqlx::{Column, Row, Sqlite, TypeInfo, ValueRef};

/// Identity of a record within its collection.
pub type RecordId = i64;

/// One row of a collection, serialized flat: `{"id": 1, "name": "Ann", ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub id: RecordId,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Record {
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }

    /// Decode a `SELECT *` row using each value's runtime storage class.
    pub(crate) fn from_row(row: &SqliteRow) -> Result<Self, TabulaError> {
        let id: RecordId = row.try_get(IDENTITY_COLUMN)?;
        let mut fields = Map::new();
        for column in row.columns() {
            if column.name() == IDENTITY_COLUMN {
                continue;
            }
            fields.insert(column.name().to_string(), decode_value(row, column.ordinal())?);
        }
        Ok(Self { id, fields })
    }
}

fn decode_value(row: &SqliteRow, idx: usize) -> Result<Value, TabulaError> {
    let raw = row.try_get_raw(idx)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let storage_class = raw.type_info().name().to_string();
    let value = match storage_class.as_str() {
        "INTEGER" | "BOOLEAN" => Value::from(row.try_get::<i64, _>(idx)?),
        "REAL" => Number::from_f64(row.try_get::<f64, _>(idx)?)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        "BLOB" => Value::String(STANDARD.encode(row.try_get::<Vec<u8>, _>(idx)?)),
        _ => Value::String(row.try_get::<String, _>(idx)?),
    };
    Ok(value)
}

/// A value ready to be bound as a statement parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl SqlValue {
    /// Convert a JSON input value for a column of type `ty`.
    ///
    /// BLOB columns take base64 strings; nested arrays and objects are stored
    /// as their JSON text. Integers beyond `i64` are rejected rather than
    /// rounded to REAL.
    pub fn from_json(column: &str, ty: ColumnType, value: Option<&Value>) -> Result<Self, TabulaError> {
        let Some(value) = value else {
            return Ok(SqlValue::Null);
        };
        let converted = match value {
            Value::Null => SqlValue::Null,
            Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
            Value::Number(n) if n.is_u64() && n.as_i64().is_none() => {
                return Err(TabulaError::InvalidValue {
                    column: column.to_string(),
                    reason: format!("integer {n} exceeds the 64-bit signed range"),
                });
            }
            Value::Number(n) => match n.as_i64() {
                Some(i) => SqlValue::Integer(i),
                None => SqlValue::Real(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) if ty == ColumnType::Blob => {
                let bytes = STANDARD.decode(s).map_err(|e| TabulaError::InvalidValue {
                    column: column.to_string(),
                    reason: format!("expected base64: {e}"),
                })?;
                SqlValue::Blob(bytes)
            }
            Value::String(s) => SqlValue::Text(s.clone()),
            nested @ (Value::Array(_) | Value::Object(_)) => SqlValue::Text(nested.to_string()),
        };
        Ok(converted)
    }

    pub(crate) fn bind_to<'q>(
        self,
        query: Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> Query<'q, Sqlite, SqliteArguments<'q>> {
        match self {
            SqlValue::Null => query.bind(None::<String>),
            SqlValue::Integer(i) => query.bind(i),
            SqlValue::Real(f) => query.bind(f),
            SqlValue::Text(s) => query.bind(s),
            SqlValue::Blob(b) => query.bind(b),
        }
    }
}
