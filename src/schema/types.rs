//! Type definitions for database schema objects
//!
//! The schema model is the canonical in-memory form of a table: ordered
//! columns, indexes, storage engine, collation. Both the declarative loader
//! and the live-structure normalizer converge on the shapes defined here so
//! the differ can compare them field by field.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::query::value::SqlValue;

/// Enumerated base column types, grouped by family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    // integer family
    TinyInt,
    SmallInt,
    MediumInt,
    Int,
    BigInt,
    // decimal family
    Decimal,
    Float,
    Double,
    // character family
    Char,
    Varchar,
    // text family
    TinyText,
    Text,
    MediumText,
    LongText,
    // temporal family
    Date,
    Time,
    DateTime,
    Timestamp,
    Year,
}

impl ColumnType {
    /// Parse a lowercase type token as reported by introspection or written
    /// in a schema document.
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_lowercase().as_str() {
            "tinyint" => Some(Self::TinyInt),
            "smallint" => Some(Self::SmallInt),
            "mediumint" => Some(Self::MediumInt),
            "int" | "integer" => Some(Self::Int),
            "bigint" => Some(Self::BigInt),
            "decimal" | "numeric" => Some(Self::Decimal),
            "float" => Some(Self::Float),
            "double" => Some(Self::Double),
            "char" => Some(Self::Char),
            "varchar" => Some(Self::Varchar),
            "tinytext" => Some(Self::TinyText),
            "text" => Some(Self::Text),
            "mediumtext" => Some(Self::MediumText),
            "longtext" => Some(Self::LongText),
            "date" => Some(Self::Date),
            "time" => Some(Self::Time),
            "datetime" => Some(Self::DateTime),
            "timestamp" => Some(Self::Timestamp),
            "year" => Some(Self::Year),
            _ => None,
        }
    }

    /// The lowercase token, matching what `SHOW FULL COLUMNS` reports.
    pub fn token(&self) -> &'static str {
        match self {
            Self::TinyInt => "tinyint",
            Self::SmallInt => "smallint",
            Self::MediumInt => "mediumint",
            Self::Int => "int",
            Self::BigInt => "bigint",
            Self::Decimal => "decimal",
            Self::Float => "float",
            Self::Double => "double",
            Self::Char => "char",
            Self::Varchar => "varchar",
            Self::TinyText => "tinytext",
            Self::Text => "text",
            Self::MediumText => "mediumtext",
            Self::LongText => "longtext",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "datetime",
            Self::Timestamp => "timestamp",
            Self::Year => "year",
        }
    }

    /// Uppercase rendering used in DDL output.
    pub fn as_sql(&self) -> String {
        self.token().to_uppercase()
    }

    /// True for the character and text families, which carry a collation.
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            Self::Char
                | Self::Varchar
                | Self::TinyText
                | Self::Text
                | Self::MediumText
                | Self::LongText
        )
    }
}

/// Index categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    Primary,
    Unique,
    Index,
}

impl IndexKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Unique => "unique",
            Self::Index => "index",
        }
    }
}

/// Represents a database column
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
    pub length: Option<u32>,
    pub collation: Option<String>,
    /// Extra type attribute, e.g. `unsigned`
    pub attribute: Option<String>,
    pub nullable: bool,
    pub default: Option<SqlValue>,
    pub auto_increment: bool,
    pub comment: String,
    /// Index-role hint carried on the column itself; folded into the
    /// table's index list when the table is assembled.
    pub index_role: Option<IndexKind>,
}

impl Column {
    /// Create a new column with the given name and type
    pub fn new(name: &str, column_type: ColumnType) -> Self {
        Self {
            name: name.to_string(),
            column_type,
            length: None,
            collation: None,
            attribute: None,
            nullable: false,
            default: None,
            auto_increment: false,
            comment: String::new(),
            index_role: None,
        }
    }

    /// Set the column length
    pub fn length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    /// Set whether the column is nullable
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Set a default value for the column
    pub fn default_value(mut self, default: SqlValue) -> Self {
        self.default = Some(default);
        self
    }

    /// Mark the column auto-increment
    pub fn auto_increment(mut self, auto_increment: bool) -> Self {
        self.auto_increment = auto_increment;
        self
    }

    /// Apply the framework-wide collation when the column is textual and no
    /// explicit collation was supplied.
    pub fn apply_default_collation(&mut self, collation: &str) {
        if self.column_type.is_textual() && self.collation.is_none() {
            self.collation = Some(collation.to_string());
        }
    }

    /// Render the column as a SQL fragment, omitting empty parts.
    pub fn render(&self) -> String {
        let mut sql = format!("`{}` {}", self.name, self.column_type.as_sql());

        if let Some(length) = self.length {
            sql.push_str(&format!("({})", length));
        }

        if let Some(attribute) = &self.attribute {
            sql.push_str(&format!(" {}", attribute));
        }

        if let Some(collation) = &self.collation {
            sql.push_str(&format!(" COLLATE {}", collation));
        }

        sql.push_str(if self.nullable { " NULL" } else { " NOT NULL" });

        if let Some(default) = &self.default {
            sql.push_str(&format!(" DEFAULT {}", render_default(default)));
        }

        if self.auto_increment {
            sql.push_str(" AUTO_INCREMENT");
        }

        if !self.comment.is_empty() {
            sql.push_str(&format!(" COMMENT '{}'", self.comment.replace('\'', "''")));
        }

        sql
    }
}

/// CURRENT_TIMESTAMP is a keyword default, not a string literal.
fn render_default(default: &SqlValue) -> String {
    match default {
        SqlValue::Text(s) if s.eq_ignore_ascii_case("CURRENT_TIMESTAMP") => s.clone(),
        other => other.to_sql_inline(),
    }
}

/// Represents an index
#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    pub kind: IndexKind,
    pub columns: Vec<String>,
    pub name: Option<String>,
}

impl Index {
    /// Create a new index over the given columns
    pub fn new(kind: IndexKind, columns: Vec<String>) -> Self {
        Self {
            kind,
            columns,
            name: None,
        }
    }

    /// Set an explicit index name
    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// The index name after canonicalization: a primary index is always
    /// `primary` (MySQL forces the name PRIMARY, so an explicit name would
    /// never survive introspection), any other unnamed index is
    /// `idx_<col1>_<col2>...`.
    pub fn effective_name(&self) -> String {
        match (self.kind, &self.name) {
            (IndexKind::Primary, _) => String::from("primary"),
            (_, Some(name)) => name.clone(),
            (_, None) => format!("idx_{}", self.columns.join("_")),
        }
    }

    /// Canonical identity used for set-membership diffing. Must be identical
    /// whether the index came from introspection or from a schema document.
    pub fn comparison_key(&self) -> String {
        format!(
            "{}-{}-{}",
            self.kind.as_str(),
            self.effective_name(),
            self.columns.join("_")
        )
    }

    /// Render the index as a SQL fragment.
    pub fn render(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|col| format!("`{}`", col))
            .collect::<Vec<_>>()
            .join(", ");

        match self.kind {
            IndexKind::Primary => format!("PRIMARY KEY ({})", columns),
            IndexKind::Unique => format!("UNIQUE KEY `{}` ({})", self.effective_name(), columns),
            IndexKind::Index => format!("KEY `{}` ({})", self.effective_name(), columns),
        }
    }
}

/// Represents a database table
#[derive(Debug, Clone)]
pub struct Table {
    pub name: String,
    /// Columns keyed by name, declaration order preserved
    pub columns: IndexMap<String, Column>,
    pub indexes: Vec<Index>,
    pub engine: String,
    pub collation: String,
    pub comment: Option<String>,
}

impl Table {
    /// Create a new table with the given name
    pub fn new(name: &str, engine: &str, collation: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: IndexMap::new(),
            indexes: Vec::new(),
            engine: engine.to_string(),
            collation: collation.to_string(),
            comment: None,
        }
    }

    /// Add a column to the table
    pub fn add_column(&mut self, column: Column) {
        self.columns.insert(column.name.clone(), column);
    }

    /// Add an index to the table
    pub fn add_index(&mut self, index: Index) {
        self.indexes.push(index);
    }

    /// Render a complete CREATE TABLE statement.
    pub fn render_create(&self) -> String {
        let mut defs: Vec<String> = self
            .columns
            .values()
            .map(|column| format!("  {}", column.render()))
            .collect();

        for index in &self.indexes {
            defs.push(format!("  {}", index.render()));
        }

        let mut sql = format!("CREATE TABLE IF NOT EXISTS `{}` (\n", self.name);
        sql.push_str(&defs.join(",\n"));
        sql.push_str(&format!(
            "\n) ENGINE={} COLLATE={}",
            self.engine, self.collation
        ));

        if let Some(comment) = &self.comment {
            sql.push_str(&format!(" COMMENT='{}'", comment.replace('\'', "''")));
        }

        sql
    }
}
