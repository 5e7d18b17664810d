//! MySQL adapter backed by a sqlx connection pool.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::mysql::{MySqlArguments, MySqlPoolOptions, MySqlRow};
use sqlx::{Column, MySql, MySqlPool, Row};

use crate::config::DatabaseConfig;
use crate::db::adapter::{DatabaseAdapter, RowMap};
use crate::error::{Error, Result};
use crate::query::value::SqlValue;
use crate::schema::normalizer::{RawColumnRow, RawIndexRow};

/// Database adapter over a MySQL pool.
#[derive(Debug, Clone)]
pub struct MySqlAdapter {
    pool: MySqlPool,
}

impl MySqlAdapter {
    /// Connect using the configured URL and pool options.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool_size = config.pool_size.unwrap_or(10);
        let timeout_seconds = config.timeout_seconds.unwrap_or(30);

        let pool = MySqlPoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(timeout_seconds))
            .connect(&config.url)
            .await?;

        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

fn bind_params<'q>(
    mut query: sqlx::query::Query<'q, MySql, MySqlArguments>,
    params: &'q [SqlValue],
) -> sqlx::query::Query<'q, MySql, MySqlArguments> {
    for param in params {
        query = match param {
            SqlValue::Null => query.bind(None::<String>),
            SqlValue::Bool(b) => query.bind(*b),
            SqlValue::Int(n) => query.bind(*n),
            SqlValue::Float(f) => query.bind(*f),
            SqlValue::Text(s) => query.bind(s.as_str()),
            SqlValue::Blob(b) => query.bind(b.as_slice()),
        };
    }
    query
}

/// Decode one column position into a scalar, trying the common MySQL
/// decodings in order.
fn decode_value(row: &MySqlRow, index: usize) -> SqlValue {
    if let Ok(value) = row.try_get::<Option<i64>, _>(index) {
        return value.map(SqlValue::Int).unwrap_or(SqlValue::Null);
    }
    if let Ok(value) = row.try_get::<Option<u64>, _>(index) {
        return value.map(|v| SqlValue::Int(v as i64)).unwrap_or(SqlValue::Null);
    }
    if let Ok(value) = row.try_get::<Option<f64>, _>(index) {
        return value.map(SqlValue::Float).unwrap_or(SqlValue::Null);
    }
    if let Ok(value) = row.try_get::<Option<DateTime<Utc>>, _>(index) {
        return value
            .map(|v| SqlValue::Text(v.to_rfc3339()))
            .unwrap_or(SqlValue::Null);
    }
    if let Ok(value) = row.try_get::<Option<NaiveDateTime>, _>(index) {
        return value
            .map(|v| SqlValue::Text(v.to_string()))
            .unwrap_or(SqlValue::Null);
    }
    if let Ok(value) = row.try_get::<Option<NaiveDate>, _>(index) {
        return value
            .map(|v| SqlValue::Text(v.to_string()))
            .unwrap_or(SqlValue::Null);
    }
    if let Ok(value) = row.try_get::<Option<String>, _>(index) {
        return value.map(SqlValue::Text).unwrap_or(SqlValue::Null);
    }
    if let Ok(value) = row.try_get::<Option<Vec<u8>>, _>(index) {
        return value.map(SqlValue::Blob).unwrap_or(SqlValue::Null);
    }
    SqlValue::Null
}

fn decode_row(row: &MySqlRow) -> RowMap {
    row.columns()
        .iter()
        .enumerate()
        .map(|(index, column)| (column.name().to_string(), decode_value(row, index)))
        .collect()
}

#[async_trait]
impl DatabaseAdapter for MySqlAdapter {
    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        let result = bind_params(sqlx::query(sql), params)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Execution(format!("{}: {}", sql, e)))?;
        Ok(result.rows_affected())
    }

    async fn fetch_row(&self, sql: &str, params: &[SqlValue]) -> Result<Option<RowMap>> {
        let row = bind_params(sqlx::query(sql), params)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(decode_row))
    }

    async fn fetch_all(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<RowMap>> {
        let rows = bind_params(sqlx::query(sql), params)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(decode_row).collect())
    }

    async fn fetch_scalar(&self, sql: &str, params: &[SqlValue]) -> Result<Option<SqlValue>> {
        let row = bind_params(sqlx::query(sql), params)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(|row| decode_value(row, 0)))
    }

    async fn last_insert_id(&self) -> Result<u64> {
        let value = self.fetch_scalar("SELECT LAST_INSERT_ID()", &[]).await?;
        match value {
            Some(SqlValue::Int(id)) => Ok(id as u64),
            other => Err(Error::Execution(format!(
                "unexpected LAST_INSERT_ID() result: {:?}",
                other
            ))),
        }
    }

    async fn table_names(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SHOW TABLES")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::Introspection(format!("failed to list tables: {}", e)))?;
        rows.iter()
            .map(|row| {
                row.try_get::<String, _>(0)
                    .map_err(|e| Error::Introspection(format!("unreadable table name: {}", e)))
            })
            .collect()
    }

    async fn column_rows(&self, table: &str) -> Result<Vec<RawColumnRow>> {
        let sql = format!("SHOW FULL COLUMNS FROM `{}`", table);
        sqlx::query_as::<_, RawColumnRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                Error::Introspection(format!("failed to read columns of `{}`: {}", table, e))
            })
    }

    async fn index_rows(&self, table: &str) -> Result<Vec<RawIndexRow>> {
        let sql = format!("SHOW INDEXES FROM `{}`", table);
        sqlx::query_as::<_, RawIndexRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                Error::Introspection(format!("failed to read indexes of `{}`: {}", table, e))
            })
    }
}
