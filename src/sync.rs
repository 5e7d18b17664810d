//! Synchronization orchestrator
//!
//! Walks the declarative schema directory, decides CREATE vs ALTER per
//! table, and executes the result. Each table is an independent unit of
//! work: a failure is logged and the run moves on to the next table.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::SchemaConfig;
use crate::db::adapter::DatabaseAdapter;
use crate::error::Result;
use crate::schema::diff::TableDiff;
use crate::schema::loader;
use crate::schema::normalizer::LiveStructure;

/// Outcome counts of one synchronization run.
#[derive(Debug, Default, Clone)]
pub struct SyncReport {
    pub created: Vec<String>,
    pub altered: Vec<String>,
    pub unchanged: Vec<String>,
    /// Source files that failed to load or execute and were skipped
    pub skipped: Vec<String>,
}

impl SyncReport {
    /// Number of statements actually executed.
    pub fn executed(&self) -> usize {
        self.created.len() + self.altered.len()
    }
}

enum Outcome {
    Created(String),
    Altered(String),
    Unchanged(String),
}

/// Drives schema synchronization against one database.
pub struct Synchronizer<A: DatabaseAdapter> {
    adapter: A,
    config: SchemaConfig,
    live_tables: HashSet<String>,
}

impl<A: DatabaseAdapter> Synchronizer<A> {
    /// Capture the live table set once and prepare a run.
    pub async fn new(adapter: A, config: SchemaConfig) -> Result<Self> {
        let live_tables = adapter.table_names().await?.into_iter().collect();
        Ok(Self {
            adapter,
            config,
            live_tables,
        })
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Synchronize every declarative document under the configured
    /// directory. Per-table failures are logged and skipped; the run always
    /// completes.
    pub async fn sync_all(&mut self) -> Result<SyncReport> {
        let mut paths: Vec<PathBuf> = WalkDir::new(&self.config.directory)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry.file_type().is_file()
                    && entry.path().extension().and_then(|e| e.to_str()) == Some("toml")
            })
            .map(|entry| entry.into_path())
            .collect();
        paths.sort();

        let mut report = SyncReport::default();

        for path in paths {
            match self.sync_file(&path).await {
                Ok(Outcome::Created(table)) => report.created.push(table),
                Ok(Outcome::Altered(table)) => report.altered.push(table),
                Ok(Outcome::Unchanged(table)) => report.unchanged.push(table),
                Err(e) => {
                    tracing::error!(
                        source = %path.display(),
                        error = %e,
                        "Schema sync failed for this table, skipping"
                    );
                    report.skipped.push(path.display().to_string());
                }
            }
        }

        tracing::info!(
            created = report.created.len(),
            altered = report.altered.len(),
            unchanged = report.unchanged.len(),
            skipped = report.skipped.len(),
            "Schema synchronization finished"
        );

        Ok(report)
    }

    async fn sync_file(&mut self, path: &Path) -> Result<Outcome> {
        let table = loader::load_table(path, &self.config)?;

        if !self.live_tables.contains(&table.name) {
            let sql = table.render_create();
            self.execute(&sql).await?;
            self.live_tables.insert(table.name.clone());
            tracing::info!(table = %table.name, sql = %sql, "Created table");
            return Ok(Outcome::Created(table.name));
        }

        let column_rows = self.adapter.column_rows(&table.name).await?;
        let index_rows = self.adapter.index_rows(&table.name).await?;
        let live = LiveStructure::from_rows(column_rows, index_rows);

        let diff = TableDiff::compute(&live, &table, self.config.default_comparison);
        if diff.is_empty() {
            tracing::debug!(table = %table.name, "Table already in sync");
            return Ok(Outcome::Unchanged(table.name));
        }

        let sql = diff.to_sql();
        self.execute(&sql).await?;
        tracing::info!(
            table = %table.name,
            changes = %diff.summary(),
            sql = %sql,
            "Altered table"
        );
        Ok(Outcome::Altered(table.name))
    }

    async fn execute(&self, sql: &str) -> Result<u64> {
        if self.config.dry_run {
            tracing::info!(sql = %sql, "Dry run, statement not executed");
            return Ok(0);
        }
        self.adapter.execute(sql, &[]).await
    }
}
