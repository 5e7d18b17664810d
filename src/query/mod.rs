//! Fluent query building: statement assembly, identifier escaping and
//! parameter values.

pub mod builder;
pub mod escape;
pub mod value;

pub use builder::{Connector, Direction, JoinKind, QueryBuilder, QueryKind};
pub use escape::Driver;
pub use value::{SqlValue, ToSqlValue};
