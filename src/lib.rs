//! Tabula: declarative schema synchronization and a fluent query builder
//!
//! Tabula keeps a MySQL database structurally in sync with per-table
//! declarative documents: it loads the desired schema, introspects the live
//! structure, computes a minimal additive diff and executes the resulting
//! CREATE/ALTER statements. Alongside the sync engine it ships a reusable
//! query builder that assembles parameterized SELECT/INSERT/UPDATE/DELETE
//! statements for the application's model layer.

pub mod config;
pub mod db;
pub mod error;
pub mod query;
pub mod schema;
pub mod sync;
pub mod utils;

// Re-export main types for easier access
pub use config::{Config, DefaultComparison};
pub use db::adapter::DatabaseAdapter;
pub use db::connection::MySqlAdapter;
pub use error::{Error, Result};
pub use query::builder::QueryBuilder;
pub use query::escape::Driver;
pub use query::value::SqlValue;
pub use schema::diff::TableDiff;
pub use schema::types::{Column, ColumnType, Index, IndexKind, Table};
pub use sync::{SyncReport, Synchronizer};

/// Initialize Tabula from a configuration file: set up logging, connect the
/// MySQL adapter and prepare a synchronizer.
pub async fn init(config_path: &str) -> Result<Synchronizer<MySqlAdapter>> {
    let config = config::load_from_file(config_path)?;
    utils::logging::init_logging(&config.logging)?;

    let adapter = MySqlAdapter::connect(&config.database).await?;
    Synchronizer::new(adapter, config.schema).await
}
