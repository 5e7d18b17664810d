//! Database adapter abstraction
//!
//! The sync engine and query builder only produce SQL text and parameter
//! lists; everything that actually touches the database goes through this
//! trait. Keeping it narrow makes the orchestrator testable with a mock.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::Result;
use crate::query::value::SqlValue;
use crate::schema::normalizer::{RawColumnRow, RawIndexRow};

/// A generic result row: column name to scalar value.
pub type RowMap = HashMap<String, SqlValue>;

/// Executes SQL and exposes the introspection queries the sync engine
/// consumes.
#[async_trait]
pub trait DatabaseAdapter: Send + Sync {
    /// Execute a statement, returning the affected-row count.
    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64>;

    /// Fetch the first row, if any.
    async fn fetch_row(&self, sql: &str, params: &[SqlValue]) -> Result<Option<RowMap>>;

    /// Fetch all rows.
    async fn fetch_all(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<RowMap>>;

    /// Fetch the first column of the first row, if any.
    async fn fetch_scalar(&self, sql: &str, params: &[SqlValue]) -> Result<Option<SqlValue>>;

    /// Identifier generated by the most recent INSERT on this connection.
    async fn last_insert_id(&self) -> Result<u64>;

    /// Names of all tables currently present.
    async fn table_names(&self) -> Result<Vec<String>>;

    /// Raw column metadata for one table.
    async fn column_rows(&self, table: &str) -> Result<Vec<RawColumnRow>>;

    /// Raw index metadata for one table.
    async fn index_rows(&self, table: &str) -> Result<Vec<RawIndexRow>>;
}
