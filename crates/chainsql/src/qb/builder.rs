//! The mutable query descriptor and its fluent configuration surface.

use crate::error::{QbError, QbResult};
use crate::qb::clause::{Having, Join, JoinKind, JoinOn, OrderBy, OrderDirection, QueryKind};
use crate::qb::expr::{WhereBuilder, WhereGroup};
use crate::qb::param::ParamList;
use crate::value::Value;
use serde::Serialize;

/// Fluent SQL query builder.
///
/// Configuration calls take `&mut self` and return the builder for chaining;
/// calls that validate their arguments return `QbResult<&mut Self>` instead.
/// Nothing touches a database until one of the execution helpers runs.
///
/// # Example
/// ```ignore
/// use chainsql::prelude::*;
///
/// let mut qb = QueryBuilder::new();
/// qb.select(["id", "name"])
///     .from("users")
///     .where_eq("status", "active")
///     .order_by("name", "asc")?
///     .limit(10)?;
///
/// assert_eq!(
///     qb.to_sql()?,
///     "SELECT id, name FROM users WHERE status = ? ORDER BY name ASC LIMIT 10"
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct QueryBuilder {
    pub(super) kind: QueryKind,
    pub(super) columns: Vec<String>,
    pub(super) table: String,
    pub(super) alias: Option<String>,
    pub(super) joins: Vec<Join>,
    pub(super) wheres: WhereGroup,
    pub(super) sets: Vec<(String, Value)>,
    pub(super) values: Vec<(String, Value)>,
    pub(super) batch_rows: Vec<Vec<Value>>,
    pub(super) order_by: Vec<OrderBy>,
    pub(super) group_by: Vec<String>,
    pub(super) having: Option<Having>,
    pub(super) limit: Option<u64>,
    pub(super) offset: Option<u64>,
    pub(super) distinct: bool,
    pub(super) unions: Vec<QueryBuilder>,
    pub(super) union_all: bool,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self {
            kind: QueryKind::Select,
            columns: vec!["*".to_string()],
            table: String::new(),
            alias: None,
            joins: Vec::new(),
            wheres: WhereGroup::new(),
            sets: Vec::new(),
            values: Vec::new(),
            batch_rows: Vec::new(),
            order_by: Vec::new(),
            group_by: Vec::new(),
            having: None,
            limit: None,
            offset: None,
            distinct: false,
            unions: Vec::new(),
            union_all: false,
        }
    }
}

/// SQL text and its bind values, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    sql: String,
    bindings: Vec<Value>,
}

impl CompiledQuery {
    /// Get the SQL text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Get the bind values in placeholder order.
    pub fn bindings(&self) -> &[Value] {
        &self.bindings
    }

    /// Split into SQL text and bind values.
    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.bindings)
    }
}

/// Snapshot returned by [`QueryBuilder::debug`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebugInfo {
    pub sql: String,
    pub bindings: Vec<Value>,
    #[serde(rename = "type")]
    pub kind: QueryKind,
}

impl QueryBuilder {
    /// Create a new SELECT builder with no table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current statement kind.
    pub fn kind(&self) -> QueryKind {
        self.kind
    }

    // ==================== Kind selection ====================

    /// Switch to SELECT with the given columns. An empty list selects `*`.
    pub fn select<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.kind = QueryKind::Select;
        self.columns = columns.into_iter().map(Into::into).collect();
        if self.columns.is_empty() {
            self.columns.push("*".to_string());
        }
        self
    }

    /// Switch to `SELECT *`.
    pub fn select_all(&mut self) -> &mut Self {
        self.select(["*"])
    }

    /// Emit `SELECT DISTINCT`.
    pub fn distinct(&mut self) -> &mut Self {
        self.distinct = true;
        self
    }

    /// Set the target table, clearing any alias.
    pub fn from(&mut self, table: impl Into<String>) -> &mut Self {
        self.table = table.into();
        self.alias = None;
        self
    }

    /// `FROM table AS alias`
    pub fn from_as(&mut self, table: impl Into<String>, alias: impl Into<String>) -> &mut Self {
        self.table = table.into();
        self.alias = Some(alias.into()).filter(|a: &String| !a.is_empty());
        self
    }

    /// Switch to INSERT into `table`.
    pub fn insert(&mut self, table: impl Into<String>) -> &mut Self {
        self.switch(QueryKind::Insert, table)
    }

    /// Switch to REPLACE into `table`.
    pub fn replace(&mut self, table: impl Into<String>) -> &mut Self {
        self.switch(QueryKind::Replace, table)
    }

    /// Switch to UPDATE of `table`.
    pub fn update(&mut self, table: impl Into<String>) -> &mut Self {
        self.switch(QueryKind::Update, table)
    }

    /// Switch to DELETE from `table`.
    pub fn delete(&mut self, table: impl Into<String>) -> &mut Self {
        self.switch(QueryKind::Delete, table)
    }

    fn switch(&mut self, kind: QueryKind, table: impl Into<String>) -> &mut Self {
        self.kind = kind;
        self.table = table.into();
        self
    }

    // ==================== Data ====================

    /// Route a column mapping by kind: INSERT/REPLACE replace the row values,
    /// UPDATE merges into the assignments.
    pub fn data<I, K, V>(&mut self, data: I) -> QbResult<&mut Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        match self.kind {
            QueryKind::Insert | QueryKind::Replace => Ok(self.values(data)),
            QueryKind::Update => Ok(self.set_many(data)),
            kind => Err(QbError::config(format!(
                "Method data() not available for {} queries",
                kind
            ))),
        }
    }

    /// Set one UPDATE assignment. Re-setting a column keeps its position.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        upsert(&mut self.sets, column.into(), value.into());
        self
    }

    /// Merge several UPDATE assignments.
    pub fn set_many<I, K, V>(&mut self, data: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        for (column, value) in data {
            upsert(&mut self.sets, column.into(), value.into());
        }
        self
    }

    /// Replace the INSERT/REPLACE row. Columns keep their first-seen order.
    pub fn values<I, K, V>(&mut self, data: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.values = collect_row(data);
        self.batch_rows.clear();
        self
    }

    /// Replace the INSERT/REPLACE data with several rows, rendered as one
    /// `VALUES (?, ...), (?, ...)` statement.
    ///
    /// The first row fixes the column list. Every later row must name exactly
    /// the same columns, in any order; its values are bound in the first
    /// row's column order. On error the builder is left unchanged.
    pub fn values_many<I, R, K, V>(&mut self, rows: I) -> QbResult<&mut Self>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut rows = rows.into_iter();
        let first = match rows.next() {
            Some(row) => collect_row(row),
            None => return Err(QbError::config("No rows provided for batch insert")),
        };
        let columns: Vec<String> = first.iter().map(|(c, _)| c.clone()).collect();

        let mut batch = Vec::new();
        for (idx, row) in rows.enumerate() {
            let aligned = align_row(&columns, collect_row(row)).ok_or_else(|| {
                QbError::config(format!(
                    "Row {} does not match columns ({})",
                    idx + 2,
                    columns.join(", ")
                ))
            })?;
            batch.push(aligned);
        }

        self.values = first;
        self.batch_rows = batch;
        Ok(self)
    }

    // ==================== Joins ====================

    /// Alias for [`QueryBuilder::inner_join`].
    pub fn join(
        &mut self,
        table: impl Into<String>,
        left: impl Into<String>,
        op: impl Into<String>,
        right: impl Into<String>,
    ) -> &mut Self {
        self.inner_join(table, left, op, right)
    }

    /// `INNER JOIN table ON left op right`
    pub fn inner_join(
        &mut self,
        table: impl Into<String>,
        left: impl Into<String>,
        op: impl Into<String>,
        right: impl Into<String>,
    ) -> &mut Self {
        self.add_join(JoinKind::Inner, table, left, op, right)
    }

    /// `LEFT JOIN table ON left op right`
    pub fn left_join(
        &mut self,
        table: impl Into<String>,
        left: impl Into<String>,
        op: impl Into<String>,
        right: impl Into<String>,
    ) -> &mut Self {
        self.add_join(JoinKind::Left, table, left, op, right)
    }

    /// `RIGHT JOIN table ON left op right`
    pub fn right_join(
        &mut self,
        table: impl Into<String>,
        left: impl Into<String>,
        op: impl Into<String>,
        right: impl Into<String>,
    ) -> &mut Self {
        self.add_join(JoinKind::Right, table, left, op, right)
    }

    /// `CROSS JOIN table`
    pub fn cross_join(&mut self, table: impl Into<String>) -> &mut Self {
        self.joins.push(Join {
            kind: JoinKind::Cross,
            table: table.into(),
            on: None,
        });
        self
    }

    fn add_join(
        &mut self,
        kind: JoinKind,
        table: impl Into<String>,
        left: impl Into<String>,
        op: impl Into<String>,
        right: impl Into<String>,
    ) -> &mut Self {
        self.joins.push(Join {
            kind,
            table: table.into(),
            on: Some(JoinOn {
                left: left.into(),
                op: op.into(),
                right: right.into(),
            }),
        });
        self
    }

    // ==================== Grouping / ordering / paging ====================

    /// Append GROUP BY columns; repeated calls accumulate.
    pub fn group_by<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_by.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Set the HAVING comparison, replacing any previous one.
    pub fn having(
        &mut self,
        column: impl Into<String>,
        op: impl Into<String>,
        value: impl Into<Value>,
    ) -> &mut Self {
        self.having = Some(Having {
            column: column.into(),
            op: op.into(),
            value: value.into(),
        });
        self
    }

    /// Append an ORDER BY term. `direction` is `asc` or `desc`, any case.
    pub fn order_by(&mut self, column: impl Into<String>, direction: &str) -> QbResult<&mut Self> {
        let direction = OrderDirection::parse(direction)?;
        Ok(self.order_by_direction(column, direction))
    }

    /// Append an ORDER BY term with an already parsed direction.
    pub fn order_by_direction(
        &mut self,
        column: impl Into<String>,
        direction: OrderDirection,
    ) -> &mut Self {
        self.order_by.push(OrderBy {
            column: column.into(),
            direction,
        });
        self
    }

    /// Set `LIMIT`; fails on a negative value.
    pub fn limit(&mut self, limit: i64) -> QbResult<&mut Self> {
        let limit =
            u64::try_from(limit).map_err(|_| QbError::config("Limit must be non-negative"))?;
        self.limit = Some(limit);
        Ok(self)
    }

    /// Set `OFFSET`; fails on a negative value.
    pub fn offset(&mut self, offset: i64) -> QbResult<&mut Self> {
        let offset =
            u64::try_from(offset).map_err(|_| QbError::config("Offset must be non-negative"))?;
        self.offset = Some(offset);
        Ok(self)
    }

    // ==================== Unions ====================

    /// Append `UNION <query>`.
    ///
    /// The ALL flag is shared by every union on this builder and the last
    /// call decides it: `union(a).union_all(b)` renders both as `UNION ALL`.
    pub fn union(&mut self, query: QueryBuilder) -> &mut Self {
        self.unions.push(query);
        self.union_all = false;
        self
    }

    /// Append `UNION ALL <query>`. See [`QueryBuilder::union`] for the flag.
    pub fn union_all(&mut self, query: QueryBuilder) -> &mut Self {
        self.unions.push(query);
        self.union_all = true;
        self
    }

    /// Restore the freshly constructed state.
    pub fn reset(&mut self) -> &mut Self {
        *self = Self::default();
        self
    }

    // ==================== Compilation ====================

    /// Compile into SQL text and bindings.
    ///
    /// Compilation does not modify the builder; compiling twice yields the
    /// same result.
    pub fn compile(&self) -> QbResult<CompiledQuery> {
        let mut params = ParamList::new();
        let sql = self.build_sql(&mut params)?;
        Ok(CompiledQuery {
            sql,
            bindings: params.into_vec(),
        })
    }

    /// Compile and return the SQL text only.
    pub fn to_sql(&self) -> QbResult<String> {
        self.compile().map(|q| q.sql)
    }

    /// Compile and return the bind values only.
    pub fn bindings(&self) -> QbResult<Vec<Value>> {
        self.compile().map(|q| q.bindings)
    }

    /// Snapshot of SQL, bindings and kind.
    pub fn debug(&self) -> QbResult<DebugInfo> {
        let (sql, bindings) = self.compile()?.into_parts();
        Ok(DebugInfo {
            sql,
            bindings,
            kind: self.kind,
        })
    }

    /// Log the [`QueryBuilder::debug`] snapshot at INFO and return it.
    pub fn dump(&self) -> QbResult<DebugInfo> {
        let info = self.debug()?;
        let bindings = serde_json::to_string(&info.bindings).unwrap_or_default();
        tracing::info!(
            target: "chainsql.qb",
            kind = %info.kind,
            sql = %info.sql,
            bindings = %bindings,
            "query dump"
        );
        Ok(info)
    }

    pub(super) fn build_sql(&self, params: &mut ParamList) -> QbResult<String> {
        if self.table.is_empty() {
            return Err(QbError::config(format!(
                "No table specified for {} query",
                self.kind
            )));
        }
        match self.kind {
            QueryKind::Select => self.build_select(params),
            QueryKind::Insert | QueryKind::Replace => self.build_insert(params),
            QueryKind::Update => self.build_update(params),
            QueryKind::Delete => self.build_delete(params),
        }
    }

    /// `WHERE <tree>`, or `None` without predicates.
    pub(super) fn build_where(&self, params: &mut ParamList) -> QbResult<Option<String>> {
        if self.wheres.is_empty() {
            return Ok(None);
        }
        Ok(Some(format!("WHERE {}", self.wheres.build(params)?)))
    }
}

impl WhereBuilder for QueryBuilder {
    fn predicates_mut(&mut self) -> &mut WhereGroup {
        &mut self.wheres
    }
}

fn collect_row<I, K, V>(data: I) -> Vec<(String, Value)>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    let mut row = Vec::new();
    for (column, value) in data {
        upsert(&mut row, column.into(), value.into());
    }
    row
}

/// Order `row` by `columns`; `None` unless both name the same columns.
pub(super) fn align_row(columns: &[String], mut row: Vec<(String, Value)>) -> Option<Vec<Value>> {
    if row.len() != columns.len() {
        return None;
    }
    columns
        .iter()
        .map(|column| {
            let idx = row.iter().position(|(c, _)| c == column)?;
            Some(std::mem::replace(&mut row[idx].1, Value::Null))
        })
        .collect()
}

fn upsert(entries: &mut Vec<(String, Value)>, column: String, value: Value) {
    match entries.iter_mut().find(|(c, _)| *c == column) {
        Some(entry) => entry.1 = value,
        None => entries.push((column, value)),
    }
}
