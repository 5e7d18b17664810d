//! Error types for Tabula

use thiserror::Error;

/// Result type for Tabula operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Tabula
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Schema format error: {0}")]
    SchemaFormat(String),

    #[error("Introspection error: {0}")]
    Introspection(String),

    #[error("Query build error: {0}")]
    QueryBuild(String),

    #[error("Execution error: {0}")]
    Execution(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),
}
