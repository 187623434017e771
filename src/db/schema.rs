//! Collection schema declaration and the DDL derived from it.
//!
//! The declaration is a JSON object mapping collection name to an ordered
//! object of column name -> physical type:
//!
//! ```json
//! { "users": { "name": "TEXT", "age": "INTEGER" } }
//! ```
//!
//! Every collection table also carries the identity column
//! `id INTEGER PRIMARY KEY AUTOINCREMENT`, which must not be redeclared.

use crate::db::ident::{Ident, InvalidIdentifier};
use serde_json::{Map, Value};
use std::{collections::HashSet, fmt, fs, path::Path, str::FromStr};
use thiserror::Error as ThisError;

/// Name of the identity column present in every collection table.
pub const IDENTITY_COLUMN: &str = "id";

#[derive(Debug, ThisError)]
pub enum SchemaError {
    #[error("failed to read schema declaration: {0}")]
    Io(#[from] std::io::Error),

    #[error("schema declaration is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON object at {at}")]
    NotAnObject { at: String },

    #[error("unsupported column type {ty} for {collection}.{column}")]
    UnsupportedType {
        collection: String,
        column: String,
        ty: String,
    },

    #[error(transparent)]
    InvalidIdentifier(#[from] InvalidIdentifier),

    #[error("column `id` in {collection} collides with the identity column")]
    ReservedColumn { collection: String },

    /// SQLite compares table and column names case-insensitively.
    #[error("{name} is declared more than once in {at} (names are case-insensitive)")]
    DuplicateName { at: String, name: String },
}

/// SQLite storage types a declared column may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Text,
    Real,
    Blob,
    Numeric,
}

impl ColumnType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Text => "TEXT",
            ColumnType::Real => "REAL",
            ColumnType::Blob => "BLOB",
            ColumnType::Numeric => "NUMERIC",
        }
    }
}

impl FromStr for ColumnType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INTEGER" => Ok(ColumnType::Integer),
            "TEXT" => Ok(ColumnType::Text),
            "REAL" => Ok(ColumnType::Real),
            "BLOB" => Ok(ColumnType::Blob),
            "NUMERIC" => Ok(ColumnType::Numeric),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: Ident,
    pub ty: ColumnType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionDef {
    pub name: Ident,
    pub columns: Vec<ColumnDef>,
}

impl CollectionDef {
    /// `CREATE TABLE` statement: identity column, then declared columns in order.
    pub fn create_table_sql(&self) -> String {
        let mut defs = vec![identity_column_sql()];
        defs.extend(
            self.columns
                .iter()
                .map(|c| format!("{} {}", c.name.quoted(), c.ty.as_sql())),
        );
        format!("CREATE TABLE {} ({})", self.name.quoted(), defs.join(", "))
    }
}

/// `CREATE TABLE IF NOT EXISTS` for an ad hoc collection (identity only).
pub fn ad_hoc_table_sql(collection: &Ident) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        collection.quoted(),
        identity_column_sql()
    )
}

fn identity_column_sql() -> String {
    format!("\"{IDENTITY_COLUMN}\" INTEGER PRIMARY KEY AUTOINCREMENT")
}

/// Immutable registry of declared collections, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    collections: Vec<CollectionDef>,
}

impl Schema {
    /// Read and validate the declaration file.
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(contents: &str) -> Result<Self, SchemaError> {
        let root: Value = serde_json::from_str(contents)?;
        let Value::Object(root) = root else {
            return Err(SchemaError::NotAnObject {
                at: "<root>".to_string(),
            });
        };

        let collections = root
            .into_iter()
            .map(|(name, columns)| parse_collection(name, columns))
            .collect::<Result<Vec<_>, _>>()?;
        reject_duplicates("<root>", collections.iter().map(|c| &c.name))?;
        Ok(Self { collections })
    }

    /// Ordered column list for a declared collection.
    pub fn lookup(&self, collection: &str) -> Option<&[ColumnDef]> {
        self.get(collection).map(|c| c.columns.as_slice())
    }

    pub fn get(&self, collection: &str) -> Option<&CollectionDef> {
        self.collections
            .iter()
            .find(|c| c.name.as_str() == collection)
    }

    pub fn collections(&self) -> impl Iterator<Item = &CollectionDef> {
        self.collections.iter()
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}

fn parse_collection(name: String, columns: Value) -> Result<CollectionDef, SchemaError> {
    let name = Ident::parse(&name)?;
    let Value::Object(columns) = columns else {
        return Err(SchemaError::NotAnObject {
            at: name.to_string(),
        });
    };
    let columns = parse_columns(&name, columns)?;
    reject_duplicates(name.as_str(), columns.iter().map(|c| &c.name))?;
    Ok(CollectionDef { name, columns })
}

fn reject_duplicates<'a>(
    at: &str,
    names: impl Iterator<Item = &'a Ident>,
) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name.as_str().to_ascii_lowercase()) {
            return Err(SchemaError::DuplicateName {
                at: at.to_string(),
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

fn parse_columns(
    collection: &Ident,
    columns: Map<String, Value>,
) -> Result<Vec<ColumnDef>, SchemaError> {
    columns
        .into_iter()
        .map(|(column, ty)| {
            if column.eq_ignore_ascii_case(IDENTITY_COLUMN) {
                return Err(SchemaError::ReservedColumn {
                    collection: collection.to_string(),
                });
            }
            let parsed = ty.as_str().and_then(|s| s.parse::<ColumnType>().ok());
            let Some(ty) = parsed else {
                return Err(SchemaError::UnsupportedType {
                    collection: collection.to_string(),
                    column: column.clone(),
                    ty: ty.to_string(),
                });
            };
            Ok(ColumnDef {
                name: Ident::parse(&column)?,
                ty,
            })
        })
        .collect()
}
