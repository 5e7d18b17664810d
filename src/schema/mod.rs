//! Schema model, declarative loading, live-structure normalization and
//! diffing.

pub mod diff;
pub mod loader;
pub mod normalizer;
pub mod types;

pub use diff::{DiffEntry, FieldDelta, TableDiff};
pub use loader::load_table;
pub use normalizer::{LiveColumn, LiveStructure, RawColumnRow, RawIndexRow};
pub use types::{Column, ColumnType, Index, IndexKind, Table};
