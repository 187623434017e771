//! Database module: schema registry, provisioning and record storage.
//!
//! Layout:
//! - `ident.rs`: validated identifiers for statement text
//! - `schema.rs`: collection declaration and the DDL derived from it
//! - `sqlite.rs`: the shared SQLite pool
//! - `provision.rs`: creating and resetting collection tables
//! - `models.rs`: records and JSON <-> SQLite value mapping
//! - `records.rs`: single-record CRUD

pub mod ident;
pub mod models;
pub mod provision;
pub mod records;
pub mod schema;
pub mod sqlite;

pub use ident::Ident;
pub use models::{Record, RecordId};
pub use provision::{PhysicalColumn, TableProvisioner};
pub use records::RecordStore;
pub use schema::{ColumnDef, ColumnType, Schema, SchemaError};
pub use sqlite::{Database, SqlitePool};
