//! Database access: the adapter trait and its MySQL implementation.

pub mod adapter;
pub mod connection;

pub use adapter::{DatabaseAdapter, RowMap};
pub use connection::MySqlAdapter;
