//! Declarative schema loader
//!
//! One TOML document per table. The document's `table` key may be omitted,
//! in which case the table name is derived from the file stem.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::config::SchemaConfig;
use crate::error::{Error, Result};
use crate::query::value::SqlValue;
use crate::schema::types::{Column, ColumnType, Index, IndexKind, Table};

#[derive(Debug, Deserialize)]
struct TableDocument {
    table: Option<String>,
    engine: Option<String>,
    collation: Option<String>,
    comment: Option<String>,
    #[serde(default)]
    columns: Vec<ColumnEntry>,
    #[serde(default)]
    indexes: Vec<IndexEntry>,
}

#[derive(Debug, Deserialize)]
struct ColumnEntry {
    name: String,
    #[serde(rename = "type")]
    column_type: String,
    length: Option<u32>,
    collation: Option<String>,
    attribute: Option<String>,
    #[serde(default)]
    nullable: bool,
    default: Option<toml::Value>,
    #[serde(default)]
    auto_increment: bool,
    #[serde(default)]
    comment: String,
    index: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IndexEntry {
    #[serde(rename = "type")]
    kind: String,
    columns: Vec<String>,
    name: Option<String>,
}

/// Load one table definition from a declarative document.
pub fn load_table(path: &Path, config: &SchemaConfig) -> Result<Table> {
    let source = fs::read_to_string(path)?;

    let doc: TableDocument = toml::from_str(&source).map_err(|e| {
        Error::SchemaFormat(format!("{}: failed to parse document: {}", path.display(), e))
    })?;

    let name = match doc.table {
        Some(name) if !name.is_empty() => name,
        _ => path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(|stem| stem.to_string())
            .ok_or_else(|| {
                Error::SchemaFormat(format!("{}: missing table name", path.display()))
            })?,
    };

    if doc.columns.is_empty() {
        return Err(Error::SchemaFormat(format!(
            "{}: table `{}` declares no columns",
            path.display(),
            name
        )));
    }

    let engine = doc.engine.unwrap_or_else(|| config.default_engine.clone());
    let collation = doc
        .collation
        .unwrap_or_else(|| config.default_collation.clone());

    let mut table = Table::new(&name, &engine, &collation);
    table.comment = doc.comment;

    for entry in doc.columns {
        let column = build_column(entry, config, &name)?;
        if let Some(role) = column.index_role {
            table.add_index(Index::new(role, vec![column.name.clone()]));
        }
        table.add_column(column);
    }

    for entry in doc.indexes {
        let kind = parse_index_kind(&entry.kind).ok_or_else(|| {
            Error::SchemaFormat(format!(
                "table `{}`: unknown index type `{}`",
                name, entry.kind
            ))
        })?;
        let mut index = Index::new(kind, entry.columns);
        index.name = entry.name;
        table.add_index(index);
    }

    Ok(table)
}

fn build_column(entry: ColumnEntry, config: &SchemaConfig, table: &str) -> Result<Column> {
    let column_type = ColumnType::parse(&entry.column_type).ok_or_else(|| {
        Error::SchemaFormat(format!(
            "table `{}`: column `{}` has unknown type `{}`",
            table, entry.name, entry.column_type
        ))
    })?;

    let index_role = match entry.index.as_deref() {
        None => None,
        Some(role) => Some(parse_index_kind(role).ok_or_else(|| {
            Error::SchemaFormat(format!(
                "table `{}`: column `{}` has unknown index role `{}`",
                table, entry.name, role
            ))
        })?),
    };

    let mut column = Column::new(&entry.name, column_type);
    column.length = entry.length;
    column.collation = entry.collation;
    column.attribute = entry.attribute;
    column.nullable = entry.nullable;
    column.default = entry.default.map(toml_value_to_sql);
    column.auto_increment = entry.auto_increment;
    column.comment = entry.comment;
    column.index_role = index_role;
    column.apply_default_collation(&config.default_collation);

    Ok(column)
}

fn parse_index_kind(token: &str) -> Option<IndexKind> {
    match token.to_lowercase().as_str() {
        "primary" => Some(IndexKind::Primary),
        "unique" => Some(IndexKind::Unique),
        "index" => Some(IndexKind::Index),
        _ => None,
    }
}

fn toml_value_to_sql(value: toml::Value) -> SqlValue {
    match value {
        toml::Value::String(s) => SqlValue::Text(s),
        toml::Value::Integer(n) => SqlValue::Int(n),
        toml::Value::Float(f) => SqlValue::Float(f),
        toml::Value::Boolean(b) => SqlValue::Bool(b),
        other => SqlValue::Text(other.to_string()),
    }
}
