//! Table differ
//!
//! Compares a live table structure against its desired schema and renders
//! the reconciliation as a single ALTER statement. Columns follow the
//! additive-only policy: they are added or modified, never dropped. Indexes
//! are brought to exact parity, drops included, because stale or duplicate
//! indexes carry real performance and correctness risk.

use crate::config::DefaultComparison;
use crate::query::value::SqlValue;
use crate::schema::normalizer::{LiveColumn, LiveStructure};
use crate::schema::types::{Column, Index, IndexKind, Table};

/// One atomic structural change.
#[derive(Debug, Clone)]
pub enum DiffEntry {
    AddColumn(Column),
    ChangeColumn {
        column: Column,
        deltas: Vec<FieldDelta>,
    },
    AddIndex(Index),
    DropIndex(Index),
}

/// A single field-level difference on a column.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDelta {
    pub field: &'static str,
    pub live: String,
    pub desired: String,
}

/// The ordered set of changes needed to reconcile one table.
#[derive(Debug, Clone)]
pub struct TableDiff {
    pub table: String,
    pub entries: Vec<DiffEntry>,
}

impl TableDiff {
    /// Compute the diff between live and desired structure.
    ///
    /// Entries are ordered: column adds/changes in declaration order, then
    /// index adds, then index drops.
    pub fn compute(
        live: &LiveStructure,
        desired: &Table,
        default_comparison: DefaultComparison,
    ) -> Self {
        let mut entries = Vec::new();

        // column pass: additive only, live-only columns are left alone
        for column in desired.columns.values() {
            match live.columns.get(&column.name) {
                None => entries.push(DiffEntry::AddColumn(column.clone())),
                Some(live_column) => {
                    let deltas = compare_column(live_column, column, default_comparison);
                    if !deltas.is_empty() {
                        entries.push(DiffEntry::ChangeColumn {
                            column: column.clone(),
                            deltas,
                        });
                    }
                }
            }
        }

        // index pass: matched live indexes are consumed, leftovers dropped
        let mut remaining = live.indexes.clone();
        let mut adds = Vec::new();
        for index in &desired.indexes {
            if remaining.shift_remove(&index.comparison_key()).is_none() {
                adds.push(DiffEntry::AddIndex(index.clone()));
            }
        }

        entries.extend(adds);
        entries.extend(remaining.into_values().map(DiffEntry::DropIndex));

        Self {
            table: desired.name.clone(),
            entries,
        }
    }

    /// True when the schemas are structurally equivalent.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the diff as one ALTER statement; empty string when there is
    /// nothing to do.
    pub fn to_sql(&self) -> String {
        if self.entries.is_empty() {
            return String::new();
        }

        let clauses: Vec<String> = self
            .entries
            .iter()
            .map(|entry| match entry {
                DiffEntry::AddColumn(column) => format!("ADD COLUMN {}", column.render()),
                DiffEntry::ChangeColumn { column, .. } => {
                    format!("MODIFY COLUMN {}", column.render())
                }
                DiffEntry::AddIndex(index) => format!("ADD {}", index.render()),
                DiffEntry::DropIndex(index) => match index.kind {
                    IndexKind::Primary => String::from("DROP PRIMARY KEY"),
                    _ => format!("DROP INDEX `{}`", index.effective_name()),
                },
            })
            .collect();

        format!("ALTER TABLE `{}`\n  {}", self.table, clauses.join(",\n  "))
    }

    /// One-line description of the diff, used for the audit log.
    pub fn summary(&self) -> String {
        let mut added = 0;
        let mut changed = 0;
        let mut index_adds = 0;
        let mut index_drops = 0;
        for entry in &self.entries {
            match entry {
                DiffEntry::AddColumn(_) => added += 1,
                DiffEntry::ChangeColumn { .. } => changed += 1,
                DiffEntry::AddIndex(_) => index_adds += 1,
                DiffEntry::DropIndex(_) => index_drops += 1,
            }
        }
        format!(
            "{} column(s) added, {} modified, {} index(es) added, {} dropped",
            added, changed, index_adds, index_drops
        )
    }
}

fn compare_column(
    live: &LiveColumn,
    desired: &Column,
    default_comparison: DefaultComparison,
) -> Vec<FieldDelta> {
    let mut deltas = Vec::new();

    if live.type_token != desired.column_type.token() {
        deltas.push(FieldDelta {
            field: "type",
            live: live.type_token.clone(),
            desired: desired.column_type.token().to_string(),
        });
    }

    if live.length != desired.length {
        deltas.push(FieldDelta {
            field: "length",
            live: render_opt(&live.length),
            desired: render_opt(&desired.length),
        });
    }

    if live.nullable != desired.nullable {
        deltas.push(FieldDelta {
            field: "nullable",
            live: live.nullable.to_string(),
            desired: desired.nullable.to_string(),
        });
    }

    if !defaults_equal(
        live.default.as_deref(),
        desired.default.as_ref(),
        default_comparison,
    ) {
        deltas.push(FieldDelta {
            field: "default",
            live: live.default.clone().unwrap_or_default(),
            desired: desired
                .default
                .as_ref()
                .map(|d| d.canonical())
                .unwrap_or_default(),
        });
    }

    if live.auto_increment != desired.auto_increment {
        deltas.push(FieldDelta {
            field: "auto_increment",
            live: live.auto_increment.to_string(),
            desired: desired.auto_increment.to_string(),
        });
    }

    let desired_attribute = desired.attribute.clone().unwrap_or_default();
    if live.attribute != desired_attribute {
        deltas.push(FieldDelta {
            field: "attribute",
            live: live.attribute.clone(),
            desired: desired_attribute,
        });
    }

    if live.collation != desired.collation {
        deltas.push(FieldDelta {
            field: "collation",
            live: live.collation.clone().unwrap_or_default(),
            desired: desired.collation.clone().unwrap_or_default(),
        });
    }

    if live.comment != desired.comment {
        deltas.push(FieldDelta {
            field: "comment",
            live: live.comment.clone(),
            desired: desired.comment.clone(),
        });
    }

    deltas
}

/// Compare a live default (reported as text) against the declared scalar.
///
/// Loose comparison coerces numeric forms so `0` matches `"0"`; it can mask
/// a genuine type change, which is why strict mode exists.
fn defaults_equal(
    live: Option<&str>,
    desired: Option<&SqlValue>,
    comparison: DefaultComparison,
) -> bool {
    match (live, desired) {
        (None, None) => true,
        (Some(live), Some(desired)) => {
            let desired = desired.canonical();
            match comparison {
                DefaultComparison::Strict => live == desired,
                DefaultComparison::Loose => {
                    if live == desired {
                        return true;
                    }
                    if let (Ok(a), Ok(b)) = (live.parse::<f64>(), desired.parse::<f64>()) {
                        return a == b;
                    }
                    live.eq_ignore_ascii_case(&desired)
                }
            }
        }
        _ => false,
    }
}

fn render_opt(value: &Option<u32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::normalizer::{
        normalize_columns, normalize_indexes, RawColumnRow, RawIndexRow,
    };
    use crate::schema::types::ColumnType;
    use pretty_assertions::assert_eq;

    /// Simulate what introspection would report for a freshly created table.
    fn live_from(table: &Table) -> LiveStructure {
        let column_rows = table
            .columns
            .values()
            .map(|column| {
                let mut type_string = column.column_type.token().to_string();
                if let Some(length) = column.length {
                    type_string.push_str(&format!("({})", length));
                }
                if let Some(attribute) = &column.attribute {
                    type_string.push_str(&format!(" {}", attribute));
                }
                RawColumnRow {
                    field: column.name.clone(),
                    column_type: type_string,
                    collation: column.collation.clone(),
                    null: if column.nullable { "YES" } else { "NO" }.to_string(),
                    key: String::new(),
                    default: column.default.as_ref().map(|d| d.canonical()),
                    extra: if column.auto_increment {
                        "auto_increment".to_string()
                    } else {
                        String::new()
                    },
                    comment: column.comment.clone(),
                }
            })
            .collect();

        let mut index_rows = Vec::new();
        for index in &table.indexes {
            let key_name = match index.kind {
                IndexKind::Primary => "PRIMARY".to_string(),
                _ => index.effective_name(),
            };
            let non_unique = match index.kind {
                IndexKind::Primary | IndexKind::Unique => 0,
                IndexKind::Index => 1,
            };
            for (seq, column) in index.columns.iter().enumerate() {
                index_rows.push(RawIndexRow {
                    key_name: key_name.clone(),
                    non_unique,
                    column_name: column.clone(),
                    seq_in_index: (seq + 1) as u32,
                });
            }
        }

        LiveStructure {
            columns: normalize_columns(column_rows),
            indexes: normalize_indexes(index_rows),
        }
    }

    fn users_table() -> Table {
        let mut table = Table::new("users", "InnoDB", "utf8mb4_unicode_ci");
        let mut id = Column::new("id", ColumnType::Int).length(11).auto_increment(true);
        id.attribute = Some("unsigned".to_string());
        table.add_column(id);
        let mut email = Column::new("email", ColumnType::Varchar).length(190);
        email.apply_default_collation("utf8mb4_unicode_ci");
        table.add_column(email);
        table.add_index(Index::new(IndexKind::Primary, vec!["id".to_string()]));
        table.add_index(Index::new(IndexKind::Unique, vec!["email".to_string()]));
        table
    }

    #[test]
    fn round_trip_yields_empty_diff() {
        let table = users_table();
        let live = live_from(&table);

        let diff = TableDiff::compute(&live, &table, DefaultComparison::Loose);

        assert!(diff.is_empty(), "unexpected entries: {:?}", diff.entries);
        assert_eq!(diff.to_sql(), "");
    }

    #[test]
    fn explicitly_named_primary_index_round_trips() {
        // MySQL reports every primary key as PRIMARY, so a declared name
        // must not change the index identity
        let mut table = users_table();
        table.indexes[0] = Index::new(IndexKind::Primary, vec!["id".to_string()]).named("pk_users");
        let live = live_from(&table);

        let diff = TableDiff::compute(&live, &table, DefaultComparison::Loose);

        assert!(diff.is_empty(), "unexpected entries: {:?}", diff.entries);
    }

    #[test]
    fn missing_column_is_added() {
        let mut table = users_table();
        let live = live_from(&table);
        table.add_column(Column::new("age", ColumnType::Int).nullable(true));

        let diff = TableDiff::compute(&live, &table, DefaultComparison::Loose);

        assert_eq!(diff.entries.len(), 1);
        assert!(matches!(&diff.entries[0], DiffEntry::AddColumn(c) if c.name == "age"));
        assert_eq!(
            diff.to_sql(),
            "ALTER TABLE `users`\n  ADD COLUMN `age` INT NULL"
        );
    }

    #[test]
    fn live_only_columns_are_never_dropped() {
        let table = users_table();
        let mut wider = table.clone();
        wider.add_column(Column::new("legacy", ColumnType::Text).nullable(true));
        let live = live_from(&wider);

        let diff = TableDiff::compute(&live, &table, DefaultComparison::Loose);

        assert!(diff.is_empty());
    }

    #[test]
    fn changed_nullability_is_modified_with_deltas() {
        let mut table = users_table();
        let live = live_from(&table);
        table.columns.get_mut("email").expect("email column").nullable = true;

        let diff = TableDiff::compute(&live, &table, DefaultComparison::Loose);

        assert_eq!(diff.entries.len(), 1);
        match &diff.entries[0] {
            DiffEntry::ChangeColumn { column, deltas } => {
                assert_eq!(column.name, "email");
                assert_eq!(deltas.len(), 1);
                assert_eq!(deltas[0].field, "nullable");
            }
            other => panic!("expected ChangeColumn, got {:?}", other),
        }
        assert!(diff.to_sql().contains("MODIFY COLUMN `email`"));
    }

    #[test]
    fn missing_unique_index_is_added() {
        let table = users_table();
        // live was created before the unique index existed
        let mut earlier = table.clone();
        earlier.indexes.pop();
        let live = live_from(&earlier);

        let diff = TableDiff::compute(&live, &table, DefaultComparison::Loose);

        assert_eq!(diff.entries.len(), 1);
        assert!(matches!(&diff.entries[0], DiffEntry::AddIndex(_)));
        assert_eq!(
            diff.to_sql(),
            "ALTER TABLE `users`\n  ADD UNIQUE KEY `idx_email` (`email`)"
        );
    }

    #[test]
    fn stale_index_is_dropped() {
        let table = users_table();
        let mut wider = table.clone();
        wider.add_index(Index::new(IndexKind::Index, vec!["email".to_string()]).named("old_email"));
        let live = live_from(&wider);

        let diff = TableDiff::compute(&live, &table, DefaultComparison::Loose);

        assert_eq!(diff.entries.len(), 1);
        assert!(matches!(&diff.entries[0], DiffEntry::DropIndex(_)));
        assert_eq!(
            diff.to_sql(),
            "ALTER TABLE `users`\n  DROP INDEX `old_email`"
        );
    }

    #[test]
    fn dropped_primary_renders_drop_primary_key() {
        let mut table = users_table();
        table.indexes.retain(|i| i.kind != IndexKind::Primary);
        let live = live_from(&users_table());

        let diff = TableDiff::compute(&live, &table, DefaultComparison::Loose);

        assert!(diff.to_sql().contains("DROP PRIMARY KEY"));
    }

    #[test]
    fn entries_are_ordered_columns_then_index_adds_then_drops() {
        let mut desired = users_table();
        desired.add_column(Column::new("age", ColumnType::Int).nullable(true));
        desired.add_index(Index::new(IndexKind::Index, vec!["age".to_string()]));

        let mut live_shape = users_table();
        live_shape.indexes.pop(); // live is missing the unique index
        live_shape.add_index(Index::new(IndexKind::Index, vec!["id".to_string()]).named("stale"));
        let live = live_from(&live_shape);

        let diff = TableDiff::compute(&live, &desired, DefaultComparison::Loose);

        let shape: Vec<&str> = diff
            .entries
            .iter()
            .map(|e| match e {
                DiffEntry::AddColumn(_) => "add_col",
                DiffEntry::ChangeColumn { .. } => "change_col",
                DiffEntry::AddIndex(_) => "add_idx",
                DiffEntry::DropIndex(_) => "drop_idx",
            })
            .collect();
        assert_eq!(shape, vec!["add_col", "add_idx", "add_idx", "drop_idx"]);
    }

    #[test]
    fn loose_defaults_coerce_numeric_forms() {
        assert!(defaults_equal(
            Some("0"),
            Some(&SqlValue::Int(0)),
            DefaultComparison::Loose
        ));
        assert!(defaults_equal(
            Some("0.0"),
            Some(&SqlValue::Int(0)),
            DefaultComparison::Loose
        ));
        assert!(!defaults_equal(
            Some("0"),
            Some(&SqlValue::Int(1)),
            DefaultComparison::Loose
        ));
    }

    #[test]
    fn strict_defaults_require_exact_equality() {
        assert!(!defaults_equal(
            Some("0.0"),
            Some(&SqlValue::Int(0)),
            DefaultComparison::Strict
        ));
        assert!(defaults_equal(
            Some("0"),
            Some(&SqlValue::Int(0)),
            DefaultComparison::Strict
        ));
        assert!(!defaults_equal(Some("0"), None, DefaultComparison::Strict));
    }
}
