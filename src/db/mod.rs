//! Data access layer over the database files in the data root.
//!
//! Layout:
//! - `ident.rs`: name validation and quoting for statement text
//! - `models.rs`: `Record` and the JSON <-> SQLite value mapping
//! - `sqlite.rs`: `Store`, one connection per operation

pub mod ident;
pub mod models;
pub mod sqlite;

pub use models::{Fields, Record};
pub use sqlite::{RecordStream, Store};
