//! Driver-specific identifier escaping.

use serde::{Deserialize, Serialize};

/// SQL drivers supported by the query builder's identifier escaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Driver {
    #[default]
    MySql,
    Postgres,
}

impl Driver {
    fn quote_char(self) -> char {
        match self {
            Driver::MySql => '`',
            Driver::Postgres => '"',
        }
    }

    /// Escape a single identifier segment, doubling any embedded quote
    /// character.
    fn quote_segment(self, segment: &str) -> String {
        if segment == "*" {
            return String::from("*");
        }
        let q = self.quote_char();
        let doubled: String = q.to_string().repeat(2);
        format!("{q}{}{q}", segment.replace(q, &doubled))
    }

    /// Escape an identifier, handling dotted `table.column` references
    /// per segment. The bare wildcard is never quoted.
    pub fn escape(self, identifier: &str) -> String {
        identifier
            .split('.')
            .map(|segment| self.quote_segment(segment))
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Whether an expression is a known aggregate-function call that must be
/// passed through unescaped.
pub fn is_aggregate_expr(expr: &str) -> bool {
    const FUNCTIONS: [&str; 5] = ["COUNT(", "SUM(", "AVG(", "MAX(", "MIN("];
    let upper = expr.trim_start().to_uppercase();
    FUNCTIONS.iter().any(|f| upper.starts_with(f))
}
