//! Live structure normalizer
//!
//! Converts raw introspection rows (`SHOW FULL COLUMNS` / `SHOW INDEXES`
//! shapes) into the same canonical column/index form the schema model uses,
//! so live and desired structure can be compared field by field.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::schema::types::{Index, IndexKind};

/// Raw column metadata row, shaped like `SHOW FULL COLUMNS FROM t`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RawColumnRow {
    #[sqlx(rename = "Field")]
    pub field: String,
    #[sqlx(rename = "Type")]
    pub column_type: String,
    #[sqlx(rename = "Collation")]
    pub collation: Option<String>,
    #[sqlx(rename = "Null")]
    pub null: String,
    #[sqlx(rename = "Key")]
    pub key: String,
    #[sqlx(rename = "Default")]
    pub default: Option<String>,
    #[sqlx(rename = "Extra")]
    pub extra: String,
    #[sqlx(rename = "Comment")]
    pub comment: String,
}

/// Raw index metadata row, shaped like `SHOW INDEXES FROM t`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RawIndexRow {
    #[sqlx(rename = "Key_name")]
    pub key_name: String,
    #[sqlx(rename = "Non_unique")]
    pub non_unique: i64,
    #[sqlx(rename = "Column_name")]
    pub column_name: String,
    #[sqlx(rename = "Seq_in_index")]
    pub seq_in_index: u32,
}

/// A live column in canonical form.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveColumn {
    pub name: String,
    /// Bare type token with any `(n)` suffix stripped, e.g. `varchar`
    pub type_token: String,
    pub length: Option<u32>,
    /// Whatever trails the type token, e.g. `unsigned`; empty when absent
    pub attribute: String,
    pub collation: Option<String>,
    pub nullable: bool,
    pub default: Option<String>,
    pub auto_increment: bool,
    pub comment: String,
}

/// Normalized live table structure.
#[derive(Debug, Clone, Default)]
pub struct LiveStructure {
    /// Columns keyed by name, in introspection order
    pub columns: IndexMap<String, LiveColumn>,
    /// Indexes keyed by comparison key
    pub indexes: IndexMap<String, Index>,
}

impl LiveStructure {
    pub fn from_rows(column_rows: Vec<RawColumnRow>, index_rows: Vec<RawIndexRow>) -> Self {
        Self {
            columns: normalize_columns(column_rows),
            indexes: normalize_indexes(index_rows),
        }
    }
}

static TYPE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    // type token, optional (length[,scale]), optional trailing attribute
    Regex::new(r"^(?i)([a-z]+)(?:\((\d+)(?:,\d+)?\))?\s*(.*)$").expect("valid type pattern")
});

/// Split a live type string like `int(11) unsigned` into its parts.
pub fn parse_type_string(raw: &str) -> (String, Option<u32>, String) {
    match TYPE_PATTERN.captures(raw.trim()) {
        Some(caps) => {
            let token = caps
                .get(1)
                .map(|m| m.as_str().to_lowercase())
                .unwrap_or_default();
            let length = caps.get(2).and_then(|m| m.as_str().parse().ok());
            let attribute = caps
                .get(3)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default();
            (token, length, attribute)
        }
        None => (raw.trim().to_lowercase(), None, String::new()),
    }
}

/// Normalize raw column rows into a name-keyed map.
pub fn normalize_columns(rows: Vec<RawColumnRow>) -> IndexMap<String, LiveColumn> {
    let mut columns = IndexMap::new();

    for row in rows {
        let (type_token, length, attribute) = parse_type_string(&row.column_type);

        let column = LiveColumn {
            name: row.field.clone(),
            type_token,
            length,
            attribute,
            collation: row.collation,
            nullable: row.null.eq_ignore_ascii_case("YES"),
            default: row.default,
            auto_increment: row.extra.to_lowercase().contains("auto_increment"),
            comment: row.comment,
        };

        columns.insert(row.field, column);
    }

    columns
}

/// Normalize raw index rows into a comparison-key-keyed map.
///
/// Rows are grouped by `(key_name, non_unique)` in row order; the group's
/// comparison key is computed exactly as the schema model computes it.
pub fn normalize_indexes(rows: Vec<RawIndexRow>) -> IndexMap<String, Index> {
    let mut groups: IndexMap<(String, i64), Index> = IndexMap::new();

    for row in rows {
        let kind = mysql_index_kind(&row.key_name, row.non_unique);
        let entry = groups
            .entry((row.key_name.clone(), row.non_unique))
            .or_insert_with(|| {
                let mut index = Index::new(kind, Vec::new());
                // the primary key is nameless so it canonicalizes to `primary`
                if kind != IndexKind::Primary {
                    index.name = Some(row.key_name.clone());
                }
                index
            });
        entry.columns.push(row.column_name);
    }

    groups
        .into_values()
        .map(|index| (index.comparison_key(), index))
        .collect()
}

/// MySQL-specific mapping from introspection markers to an index kind.
///
/// Other drivers report uniqueness differently; keep that assumption here
/// rather than spread through the normalizer.
fn mysql_index_kind(key_name: &str, non_unique: i64) -> IndexKind {
    if key_name.eq_ignore_ascii_case("primary") {
        IndexKind::Primary
    } else if non_unique == 0 {
        IndexKind::Unique
    } else {
        IndexKind::Index
    }
}
