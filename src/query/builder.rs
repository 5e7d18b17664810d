//! Fluent query builder
//!
//! A stateful, chainable assembler for parameterized SELECT / INSERT /
//! UPDATE / DELETE statements. State accumulates across chained calls and is
//! fully reset by `build()`, so one builder instance can safely produce a
//! sequence of unrelated statements within a single logical request.

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::query::escape::{is_aggregate_expr, Driver};
use crate::query::value::{SqlValue, ToSqlValue};
use crate::schema::types::Table;

/// Statement kinds; verb calls are mutually exclusive within a build cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Select,
    Insert,
    Update,
    Delete,
}

/// Boolean connector between WHERE nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connector {
    #[default]
    And,
    Or,
}

impl Connector {
    fn as_sql(self) -> &'static str {
        match self {
            Connector::And => "AND",
            Connector::Or => "OR",
        }
    }
}

/// Sort direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// Join flavors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Outer,
    Full,
}

impl JoinKind {
    fn as_sql(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::Outer => "OUTER JOIN",
            JoinKind::Full => "FULL JOIN",
        }
    }
}

#[derive(Debug, Clone)]
enum SelectColumn {
    Plain(String),
    Aliased { expr: String, alias: String },
}

#[derive(Debug, Clone)]
enum WhereNode {
    Condition {
        column: String,
        operator: String,
        value: SqlValue,
        connector: Connector,
    },
    Group {
        nodes: Vec<WhereNode>,
        connector: Connector,
    },
}

impl WhereNode {
    fn connector(&self) -> Connector {
        match self {
            WhereNode::Condition { connector, .. } => *connector,
            WhereNode::Group { connector, .. } => *connector,
        }
    }
}

#[derive(Debug, Clone)]
struct JoinClause {
    kind: JoinKind,
    table: String,
    alias: String,
    predicate: String,
}

/// Accumulated builder state; taken wholesale on `build()` so every exit
/// path leaves the builder idle.
#[derive(Debug, Default)]
struct BuilderState {
    kind: Option<QueryKind>,
    table: String,
    columns: Vec<SelectColumn>,
    wheres: Vec<WhereNode>,
    joins: Vec<JoinClause>,
    group_by: Vec<String>,
    order_by: Vec<(String, Direction)>,
    limit: Option<(u64, u64)>,
    rows: Vec<IndexMap<String, SqlValue>>,
    assignments: IndexMap<String, SqlValue>,
}

/// Fluent SQL statement assembler.
pub struct QueryBuilder {
    driver: Driver,
    state: BuilderState,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new(Driver::MySql)
    }
}

impl QueryBuilder {
    pub fn new(driver: Driver) -> Self {
        Self {
            driver,
            state: BuilderState::default(),
        }
    }

    /// Set the target table.
    pub fn table(&mut self, name: &str) -> &mut Self {
        self.state.table = name.to_string();
        self
    }

    /// Begin a SELECT; an empty column list selects the wildcard.
    pub fn select(&mut self, columns: &[&str]) -> &mut Self {
        self.state.kind = Some(QueryKind::Select);
        if columns.is_empty() {
            self.state.columns.push(SelectColumn::Plain(String::from("*")));
        } else {
            for column in columns {
                self.state.columns.push(SelectColumn::Plain(column.to_string()));
            }
        }
        self
    }

    /// Add an aliased select expression.
    pub fn select_expr(&mut self, expr: &str, alias: &str) -> &mut Self {
        self.state.kind = Some(QueryKind::Select);
        self.state.columns.push(SelectColumn::Aliased {
            expr: expr.to_string(),
            alias: alias.to_string(),
        });
        self
    }

    /// Begin an INSERT with a single row.
    pub fn insert(&mut self, row: Vec<(&str, SqlValue)>) -> &mut Self {
        self.state.kind = Some(QueryKind::Insert);
        self.state.rows.push(to_row(row));
        self
    }

    /// Begin a multi-row INSERT; all rows must share the same column set.
    pub fn insert_many(&mut self, rows: Vec<Vec<(&str, SqlValue)>>) -> &mut Self {
        self.state.kind = Some(QueryKind::Insert);
        for row in rows {
            self.state.rows.push(to_row(row));
        }
        self
    }

    /// Begin an UPDATE with the given assignments.
    pub fn update(&mut self, assignments: Vec<(&str, SqlValue)>) -> &mut Self {
        self.state.kind = Some(QueryKind::Update);
        self.state.assignments = to_row(assignments);
        self
    }

    /// Begin a DELETE.
    pub fn delete(&mut self) -> &mut Self {
        self.state.kind = Some(QueryKind::Delete);
        self
    }

    /// Append a flat condition joined with AND.
    pub fn where_<V: ToSqlValue>(&mut self, column: &str, operator: &str, value: V) -> &mut Self {
        self.where_cond(column, operator, value, Connector::And)
    }

    /// Append a flat condition joined with OR.
    pub fn or_where<V: ToSqlValue>(&mut self, column: &str, operator: &str, value: V) -> &mut Self {
        self.where_cond(column, operator, value, Connector::Or)
    }

    /// Append a flat condition with an explicit connector.
    pub fn where_cond<V: ToSqlValue>(
        &mut self,
        column: &str,
        operator: &str,
        value: V,
        connector: Connector,
    ) -> &mut Self {
        self.state.wheres.push(WhereNode::Condition {
            column: column.to_string(),
            operator: operator.to_string(),
            value: value.to_sql_value(),
            connector,
        });
        self
    }

    /// Open a parenthesized condition group joined with AND.
    ///
    /// The callback receives an isolated child builder; its accumulated
    /// conditions are folded into one group node, enabling arbitrary
    /// AND/OR nesting.
    pub fn where_group<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(&mut QueryBuilder),
    {
        self.where_group_with(f, Connector::And)
    }

    /// Open a parenthesized condition group joined with OR.
    pub fn or_where_group<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(&mut QueryBuilder),
    {
        self.where_group_with(f, Connector::Or)
    }

    fn where_group_with<F>(&mut self, f: F, connector: Connector) -> &mut Self
    where
        F: FnOnce(&mut QueryBuilder),
    {
        let mut child = QueryBuilder::new(self.driver);
        f(&mut child);
        if !child.state.wheres.is_empty() {
            self.state.wheres.push(WhereNode::Group {
                nodes: child.state.wheres,
                connector,
            });
        }
        self
    }

    /// Append a join clause with an explicit or auto-derived alias.
    pub fn join(
        &mut self,
        kind: JoinKind,
        table: &str,
        alias: Option<&str>,
        predicate: &str,
    ) -> &mut Self {
        let alias = alias
            .map(|a| a.to_string())
            .unwrap_or_else(|| derive_alias(table));
        self.state.joins.push(JoinClause {
            kind,
            table: table.to_string(),
            alias,
            predicate: predicate.to_string(),
        });
        self
    }

    pub fn inner_join(&mut self, table: &str, predicate: &str) -> &mut Self {
        self.join(JoinKind::Inner, table, None, predicate)
    }

    pub fn left_join(&mut self, table: &str, predicate: &str) -> &mut Self {
        self.join(JoinKind::Left, table, None, predicate)
    }

    pub fn right_join(&mut self, table: &str, predicate: &str) -> &mut Self {
        self.join(JoinKind::Right, table, None, predicate)
    }

    pub fn outer_join(&mut self, table: &str, predicate: &str) -> &mut Self {
        self.join(JoinKind::Outer, table, None, predicate)
    }

    pub fn full_join(&mut self, table: &str, predicate: &str) -> &mut Self {
        self.join(JoinKind::Full, table, None, predicate)
    }

    /// Append a GROUP BY column.
    pub fn group_by(&mut self, column: &str) -> &mut Self {
        self.state.group_by.push(column.to_string());
        self
    }

    /// Append an ORDER BY term; `only` clears prior ordering first, which
    /// call sites use to force a single deterministic sort.
    pub fn order_by(&mut self, column: &str, direction: Direction, only: bool) -> &mut Self {
        if only {
            self.state.order_by.clear();
        }
        self.state.order_by.push((column.to_string(), direction));
        self
    }

    /// Set LIMIT/OFFSET, replacing any previous pair.
    pub fn limit(&mut self, limit: u64, offset: u64) -> &mut Self {
        self.state.limit = Some((limit, offset));
        self
    }

    pub fn count(&mut self, column: &str, alias: Option<&str>, only: bool) -> &mut Self {
        self.aggregate("COUNT", column, alias, only)
    }

    pub fn sum(&mut self, column: &str, alias: Option<&str>, only: bool) -> &mut Self {
        self.aggregate("SUM", column, alias, only)
    }

    pub fn avg(&mut self, column: &str, alias: Option<&str>, only: bool) -> &mut Self {
        self.aggregate("AVG", column, alias, only)
    }

    pub fn max(&mut self, column: &str, alias: Option<&str>, only: bool) -> &mut Self {
        self.aggregate("MAX", column, alias, only)
    }

    pub fn min(&mut self, column: &str, alias: Option<&str>, only: bool) -> &mut Self {
        self.aggregate("MIN", column, alias, only)
    }

    /// Wrap a column in an aggregate function; `only` swaps out any prior
    /// select columns so a row-fetch becomes a scalar aggregate query.
    fn aggregate(
        &mut self,
        function: &str,
        column: &str,
        alias: Option<&str>,
        only: bool,
    ) -> &mut Self {
        if only {
            self.state.columns.clear();
        }
        self.state.kind.get_or_insert(QueryKind::Select);
        let expr = format!("{}({})", function, self.driver.escape(column));
        match alias {
            Some(alias) => self.state.columns.push(SelectColumn::Aliased {
                expr,
                alias: alias.to_string(),
            }),
            None => self.state.columns.push(SelectColumn::Plain(expr)),
        }
        self
    }

    /// Name of the first selected column, used by pagination to pick a
    /// counting column. A bare wildcard defers to the table metadata.
    pub fn first_column_name(&self, meta: Option<&Table>) -> Result<String> {
        let first = self
            .state
            .columns
            .first()
            .ok_or_else(|| Error::QueryBuild("no columns selected".to_string()))?;

        match first {
            SelectColumn::Plain(name) if name == "*" => meta
                .and_then(|table| table.columns.keys().next().cloned())
                .ok_or_else(|| {
                    Error::QueryBuild(
                        "wildcard select requires table metadata to name a column".to_string(),
                    )
                }),
            SelectColumn::Plain(name) => Ok(name.clone()),
            SelectColumn::Aliased { alias, .. } => Ok(alias.clone()),
        }
    }

    /// Assemble the statement and parameter list, fully resetting the
    /// builder on every exit path.
    pub fn build(&mut self) -> Result<(String, Vec<SqlValue>)> {
        let state = std::mem::take(&mut self.state);
        let driver = self.driver;

        let kind = state
            .kind
            .ok_or_else(|| Error::QueryBuild("no query kind set".to_string()))?;

        if state.table.is_empty() {
            return Err(Error::QueryBuild("no target table set".to_string()));
        }

        match kind {
            QueryKind::Select => build_select(driver, state),
            QueryKind::Insert => build_insert(driver, state),
            QueryKind::Update => build_update(driver, state),
            QueryKind::Delete => build_delete(driver, state),
        }
    }
}

fn to_row(pairs: Vec<(&str, SqlValue)>) -> IndexMap<String, SqlValue> {
    pairs
        .into_iter()
        .map(|(column, value)| (column.to_string(), value))
        .collect()
}

/// Derive a join alias from a table name: first letter of the first
/// underscore segment, then the first two letters of each later segment.
/// `user_profile` becomes `upr`.
fn derive_alias(table: &str) -> String {
    let mut alias = String::new();
    for (i, segment) in table.split('_').filter(|s| !s.is_empty()).enumerate() {
        if i == 0 {
            alias.extend(segment.chars().take(1));
        } else {
            alias.extend(segment.chars().take(2));
        }
    }
    alias
}

fn render_select_column(driver: Driver, column: &SelectColumn) -> String {
    match column {
        SelectColumn::Plain(name) => {
            if is_aggregate_expr(name) {
                name.clone()
            } else {
                driver.escape(name)
            }
        }
        SelectColumn::Aliased { expr, alias } => {
            let rendered = if is_aggregate_expr(expr) {
                expr.clone()
            } else {
                driver.escape(expr)
            };
            format!("{} AS {}", rendered, driver.escape(alias))
        }
    }
}

/// Render WHERE nodes left to right; parameters are pushed in the same
/// order their placeholders appear.
fn render_wheres(driver: Driver, nodes: &[WhereNode], params: &mut Vec<SqlValue>) -> String {
    let mut sql = String::new();
    for (i, node) in nodes.iter().enumerate() {
        if i > 0 {
            sql.push_str(&format!(" {} ", node.connector().as_sql()));
        }
        match node {
            WhereNode::Condition {
                column,
                operator,
                value,
                ..
            } => {
                sql.push_str(&format!("{} {} ?", driver.escape(column), operator));
                params.push(value.clone());
            }
            WhereNode::Group { nodes, .. } => {
                sql.push_str(&format!("({})", render_wheres(driver, nodes, params)));
            }
        }
    }
    sql
}

fn build_select(driver: Driver, state: BuilderState) -> Result<(String, Vec<SqlValue>)> {
    let mut params = Vec::new();

    let columns = if state.columns.is_empty() {
        String::from("*")
    } else {
        state
            .columns
            .iter()
            .map(|column| render_select_column(driver, column))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut sql = format!("SELECT {} FROM {}", columns, driver.escape(&state.table));

    for join in &state.joins {
        sql.push_str(&format!(
            " {} {} AS {} ON {}",
            join.kind.as_sql(),
            driver.escape(&join.table),
            driver.escape(&join.alias),
            join.predicate
        ));
    }

    if !state.wheres.is_empty() {
        let rendered = render_wheres(driver, &state.wheres, &mut params);
        sql.push_str(&format!(" WHERE {}", rendered));
    }

    if !state.group_by.is_empty() {
        let columns: Vec<String> = state.group_by.iter().map(|c| driver.escape(c)).collect();
        sql.push_str(&format!(" GROUP BY {}", columns.join(", ")));
    }

    if !state.order_by.is_empty() {
        let terms: Vec<String> = state
            .order_by
            .iter()
            .map(|(column, direction)| format!("{} {}", driver.escape(column), direction.as_sql()))
            .collect();
        sql.push_str(&format!(" ORDER BY {}", terms.join(", ")));
    }

    if let Some((limit, offset)) = state.limit {
        sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset));
    }

    Ok((sql, params))
}

fn build_insert(driver: Driver, state: BuilderState) -> Result<(String, Vec<SqlValue>)> {
    let first = state
        .rows
        .first()
        .ok_or_else(|| Error::QueryBuild("insert requires at least one row".to_string()))?;

    let columns: Vec<String> = first.keys().cloned().collect();
    let column_list = columns
        .iter()
        .map(|c| driver.escape(c))
        .collect::<Vec<_>>()
        .join(", ");
    let tuple = format!(
        "({})",
        columns.iter().map(|_| "?").collect::<Vec<_>>().join(", ")
    );

    let mut params = Vec::with_capacity(state.rows.len() * columns.len());
    for row in &state.rows {
        for column in &columns {
            let value = row.get(column).ok_or_else(|| {
                Error::QueryBuild(format!("insert rows must share columns; `{}` missing", column))
            })?;
            params.push(value.clone());
        }
    }

    let tuples = vec![tuple; state.rows.len()].join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES {}",
        driver.escape(&state.table),
        column_list,
        tuples
    );

    Ok((sql, params))
}

fn build_update(driver: Driver, state: BuilderState) -> Result<(String, Vec<SqlValue>)> {
    if state.assignments.is_empty() {
        return Err(Error::QueryBuild("update requires assignments".to_string()));
    }

    // set values first, where values after
    let mut params: Vec<SqlValue> = state.assignments.values().cloned().collect();
    let sets: Vec<String> = state
        .assignments
        .keys()
        .map(|column| format!("{} = ?", driver.escape(column)))
        .collect();

    let mut sql = format!(
        "UPDATE {} SET {}",
        driver.escape(&state.table),
        sets.join(", ")
    );

    if !state.wheres.is_empty() {
        let rendered = render_wheres(driver, &state.wheres, &mut params);
        sql.push_str(&format!(" WHERE {}", rendered));
    }

    Ok((sql, params))
}

fn build_delete(driver: Driver, state: BuilderState) -> Result<(String, Vec<SqlValue>)> {
    let mut params = Vec::new();
    let mut sql = format!("DELETE FROM {}", driver.escape(&state.table));

    if !state.wheres.is_empty() {
        let rendered = render_wheres(driver, &state.wheres, &mut params);
        sql.push_str(&format!(" WHERE {}", rendered));
    }

    Ok((sql, params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::{Column, ColumnType};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn select_with_where_binds_in_order() {
        let mut qb = QueryBuilder::default();
        let (sql, params) = qb
            .table("users")
            .select(&[])
            .where_("id", "=", 5)
            .build()
            .expect("build");

        assert_eq!(sql, "SELECT * FROM `users` WHERE `id` = ?");
        assert_eq!(params, vec![SqlValue::Int(5)]);
    }

    #[test]
    fn builder_resets_after_build() {
        let mut qb = QueryBuilder::default();
        qb.table("users")
            .select(&["id"])
            .where_("id", "=", 5)
            .order_by("id", Direction::Desc, false)
            .limit(10, 0)
            .build()
            .expect("first build");

        let (sql, params) = qb
            .table("posts")
            .delete()
            .where_("author_id", "=", 7)
            .build()
            .expect("second build");

        assert_eq!(sql, "DELETE FROM `posts` WHERE `author_id` = ?");
        assert_eq!(params, vec![SqlValue::Int(7)]);
    }

    #[test]
    fn builder_resets_even_when_build_fails() {
        let mut qb = QueryBuilder::default();
        qb.where_("id", "=", 1);
        assert!(qb.build().is_err());

        let (sql, params) = qb.table("users").select(&[]).build().expect("build");
        assert_eq!(sql, "SELECT * FROM `users`");
        assert!(params.is_empty());
    }

    #[test]
    fn where_group_renders_parenthesized() {
        let mut qb = QueryBuilder::default();
        let (sql, params) = qb
            .table("t")
            .select(&[])
            .where_("a", "=", 1)
            .where_group(|g| {
                g.or_where("b", "=", 2).or_where("c", "=", 3);
            })
            .build()
            .expect("build");

        assert_eq!(
            sql,
            "SELECT * FROM `t` WHERE `a` = ? AND (`b` = ? OR `c` = ?)"
        );
        assert_eq!(
            params,
            vec![SqlValue::Int(1), SqlValue::Int(2), SqlValue::Int(3)]
        );
    }

    #[test]
    fn nested_groups_recurse() {
        let mut qb = QueryBuilder::default();
        let (sql, _) = qb
            .table("t")
            .select(&[])
            .where_group(|g| {
                g.where_("a", "=", 1).or_where_group(|inner| {
                    inner.where_("b", ">", 2).where_("c", "<", 3);
                });
            })
            .build()
            .expect("build");

        assert_eq!(
            sql,
            "SELECT * FROM `t` WHERE (`a` = ? OR (`b` > ? AND `c` < ?))"
        );
    }

    #[test]
    fn empty_where_group_is_dropped() {
        let mut qb = QueryBuilder::default();
        let (sql, _) = qb
            .table("t")
            .select(&[])
            .where_group(|_| {})
            .build()
            .expect("build");

        assert_eq!(sql, "SELECT * FROM `t`");
    }

    #[test]
    fn multi_row_insert_flattens_params() {
        let mut qb = QueryBuilder::default();
        let (sql, params) = qb
            .table("t")
            .insert_many(vec![
                vec![("a", SqlValue::Int(1)), ("b", SqlValue::Int(2))],
                vec![("a", SqlValue::Int(3)), ("b", SqlValue::Int(4))],
            ])
            .build()
            .expect("build");

        assert_eq!(sql, "INSERT INTO `t` (`a`, `b`) VALUES (?, ?), (?, ?)");
        assert_eq!(
            params,
            vec![
                SqlValue::Int(1),
                SqlValue::Int(2),
                SqlValue::Int(3),
                SqlValue::Int(4)
            ]
        );
    }

    #[test]
    fn single_row_insert() {
        let mut qb = QueryBuilder::default();
        let (sql, params) = qb
            .table("users")
            .insert(vec![
                ("email", SqlValue::Text("a@b.c".to_string())),
                ("age", SqlValue::Int(30)),
            ])
            .build()
            .expect("build");

        assert_eq!(sql, "INSERT INTO `users` (`email`, `age`) VALUES (?, ?)");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn mismatched_insert_rows_fail() {
        let mut qb = QueryBuilder::default();
        let err = qb
            .table("t")
            .insert_many(vec![
                vec![("a", SqlValue::Int(1))],
                vec![("b", SqlValue::Int(2))],
            ])
            .build()
            .unwrap_err();

        assert!(matches!(err, Error::QueryBuild(_)));
    }

    #[test]
    fn update_orders_set_params_before_where_params() {
        let mut qb = QueryBuilder::default();
        let (sql, params) = qb
            .table("users")
            .update(vec![
                ("name", SqlValue::Text("x".to_string())),
                ("age", SqlValue::Int(40)),
            ])
            .where_("id", "=", 9)
            .build()
            .expect("build");

        assert_eq!(
            sql,
            "UPDATE `users` SET `name` = ?, `age` = ? WHERE `id` = ?"
        );
        assert_eq!(
            params,
            vec![
                SqlValue::Text("x".to_string()),
                SqlValue::Int(40),
                SqlValue::Int(9)
            ]
        );
    }

    #[test]
    fn select_with_join_group_order_limit() {
        let mut qb = QueryBuilder::default();
        let (sql, _) = qb
            .table("posts")
            .select(&["posts.id", "u.name"])
            .left_join("users", "u.id = posts.author_id")
            .group_by("u.name")
            .order_by("posts.id", Direction::Asc, false)
            .limit(20, 40)
            .build()
            .expect("build");

        assert_eq!(
            sql,
            "SELECT `posts`.`id`, `u`.`name` FROM `posts` \
             LEFT JOIN `users` AS `u` ON u.id = posts.author_id \
             GROUP BY `u`.`name` ORDER BY `posts`.`id` ASC LIMIT 20 OFFSET 40"
        );
    }

    #[test]
    fn limit_replaces_previous_pair() {
        let mut qb = QueryBuilder::default();
        let (sql, _) = qb
            .table("t")
            .select(&[])
            .limit(10, 0)
            .limit(5, 20)
            .build()
            .expect("build");

        assert!(sql.ends_with("LIMIT 5 OFFSET 20"));
    }

    #[test]
    fn order_by_only_clears_prior_ordering() {
        let mut qb = QueryBuilder::default();
        let (sql, _) = qb
            .table("t")
            .select(&[])
            .order_by("a", Direction::Asc, false)
            .order_by("b", Direction::Desc, false)
            .order_by("id", Direction::Asc, true)
            .build()
            .expect("build");

        assert!(sql.ends_with("ORDER BY `id` ASC"));
    }

    #[test]
    fn count_only_swaps_select_columns() {
        let mut qb = QueryBuilder::default();
        let (sql, params) = qb
            .table("users")
            .select(&["id", "email"])
            .where_("active", "=", 1)
            .count("*", Some("total"), true)
            .build()
            .expect("build");

        assert_eq!(
            sql,
            "SELECT COUNT(*) AS `total` FROM `users` WHERE `active` = ?"
        );
        assert_eq!(params, vec![SqlValue::Int(1)]);
    }

    #[rstest]
    #[case("users", "u")]
    #[case("user_profile", "upr")]
    #[case("order_line_item", "oliit")]
    fn derives_join_aliases(#[case] table: &str, #[case] expected: &str) {
        assert_eq!(derive_alias(table), expected);
    }

    #[test]
    fn postgres_driver_uses_double_quotes() {
        let mut qb = QueryBuilder::new(Driver::Postgres);
        let (sql, _) = qb
            .table("users")
            .select(&["id"])
            .build()
            .expect("build");

        assert_eq!(sql, "SELECT \"id\" FROM \"users\"");
    }

    #[test]
    fn build_without_verb_fails() {
        let mut qb = QueryBuilder::default();
        qb.table("users");
        assert!(matches!(qb.build(), Err(Error::QueryBuild(_))));
    }

    #[test]
    fn first_column_name_prefers_explicit_selection() {
        let mut qb = QueryBuilder::default();
        qb.table("users").select(&["email", "id"]);
        assert_eq!(qb.first_column_name(None).expect("name"), "email");

        let mut qb = QueryBuilder::default();
        qb.table("users").count("*", Some("total"), false);
        assert_eq!(qb.first_column_name(None).expect("name"), "total");
    }

    #[test]
    fn first_column_name_wildcard_uses_metadata() {
        let mut meta = Table::new("users", "InnoDB", "utf8mb4_unicode_ci");
        meta.add_column(Column::new("id", ColumnType::Int));
        meta.add_column(Column::new("email", ColumnType::Varchar));

        let mut qb = QueryBuilder::default();
        qb.table("users").select(&[]);

        assert_eq!(qb.first_column_name(Some(&meta)).expect("name"), "id");
        assert!(matches!(
            qb.first_column_name(None),
            Err(Error::QueryBuild(_))
        ));
    }

    #[test]
    fn first_column_name_without_selection_fails() {
        let qb = QueryBuilder::default();
        assert!(matches!(
            qb.first_column_name(None),
            Err(Error::QueryBuild(_))
        ));
    }

    #[test]
    fn aggregate_expressions_pass_through_unescaped() {
        let mut qb = QueryBuilder::default();
        let (sql, _) = qb
            .table("orders")
            .select(&["status"])
            .sum("amount", Some("revenue"), false)
            .group_by("status")
            .build()
            .expect("build");

        assert_eq!(
            sql,
            "SELECT `status`, SUM(`amount`) AS `revenue` FROM `orders` GROUP BY `status`"
        );
    }
}
