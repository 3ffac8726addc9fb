//! WHERE predicate tree.
//!
//! A [`WhereGroup`] is an ordered list of predicates, each tagged with the
//! connective that joins it to the previous one. Groups nest: a nested group is
//! a single predicate of its parent and renders in parentheses.
//!
//! Rendering walks the tree once and pushes bind values into a [`ParamList`]
//! as each `?` is written, so placeholder order and binding order cannot
//! drift apart no matter how deeply groups are nested.

use crate::error::{QbError, QbResult};
use crate::qb::param::ParamList;
use crate::value::Value;

/// How a predicate joins the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    And,
    Or,
}

impl Connective {
    /// Get the SQL keyword.
    pub fn as_sql(self) -> &'static str {
        match self {
            Connective::And => "AND",
            Connective::Or => "OR",
        }
    }
}

/// A single WHERE node.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `column op ?`
    Basic {
        column: String,
        op: String,
        value: Value,
    },

    /// Caller-supplied fragment, written verbatim.
    Raw { sql: String, bindings: Vec<Value> },

    /// `column IS [NOT ]NULL`
    Null { column: String, negated: bool },

    /// `column [NOT ]IN (?, ...)`; never empty.
    In {
        column: String,
        values: Vec<Value>,
        negated: bool,
    },

    /// `column [NOT ]BETWEEN ? AND ?`
    Between {
        column: String,
        min: Value,
        max: Value,
        negated: bool,
    },

    /// Parenthesized sub-tree.
    Group(WhereGroup),
}

impl Predicate {
    /// Render this node, pushing its bindings in placeholder order.
    pub fn build(&self, params: &mut ParamList) -> QbResult<String> {
        let sql = match self {
            Predicate::Basic { column, op, value } => {
                format!("{} {} {}", column, op, params.push(value))
            }
            Predicate::Raw { sql, bindings } => {
                for value in bindings {
                    params.push(value);
                }
                sql.clone()
            }
            Predicate::Null { column, negated } => {
                if *negated {
                    format!("{} IS NOT NULL", column)
                } else {
                    format!("{} IS NULL", column)
                }
            }
            Predicate::In {
                column,
                values,
                negated,
            } => {
                if values.is_empty() {
                    return Err(QbError::config("WHERE IN values cannot be empty"));
                }
                let placeholders: Vec<&str> = values.iter().map(|v| params.push(v)).collect();
                let op = if *negated { "NOT IN" } else { "IN" };
                format!("{} {} ({})", column, op, placeholders.join(", "))
            }
            Predicate::Between {
                column,
                min,
                max,
                negated,
            } => {
                let op = if *negated { "NOT BETWEEN" } else { "BETWEEN" };
                let lo = params.push(min);
                let hi = params.push(max);
                format!("{} {} {} AND {}", column, op, lo, hi)
            }
            Predicate::Group(group) => {
                if group.is_empty() {
                    return Err(QbError::config("Nested WHERE group cannot be empty"));
                }
                format!("({})", group.build(params)?)
            }
        };
        Ok(sql)
    }
}

/// An ordered, independently built list of predicates.
///
/// Nested-group callbacks receive a fresh `WhereGroup`; whatever they add is
/// folded into the parent as one [`Predicate::Group`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereGroup {
    nodes: Vec<(Connective, Predicate)>,
}

impl WhereGroup {
    /// Create an empty group.
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Check if the group has no predicates.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get the number of top-level predicates; nested groups count once.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Append a predicate.
    pub fn push(&mut self, connective: Connective, predicate: Predicate) {
        self.nodes.push((connective, predicate));
    }

    /// Get the predicates with their connectives, in insertion order.
    pub fn nodes(&self) -> &[(Connective, Predicate)] {
        &self.nodes
    }

    /// Remove every predicate.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Render the group without surrounding parentheses.
    ///
    /// The first node never prints its connective.
    pub fn build(&self, params: &mut ParamList) -> QbResult<String> {
        let mut parts = Vec::with_capacity(self.nodes.len());
        for (i, (connective, predicate)) in self.nodes.iter().enumerate() {
            let fragment = predicate.build(params)?;
            if i == 0 {
                parts.push(fragment);
            } else {
                parts.push(format!("{} {}", connective.as_sql(), fragment));
            }
        }
        Ok(parts.join(" "))
    }
}

/// Predicate-adding methods shared by [`WhereGroup`] and the query builder.
///
/// Methods without an `or_` prefix join with `AND`.
pub trait WhereBuilder {
    /// The group new predicates are appended to.
    fn predicates_mut(&mut self) -> &mut WhereGroup;

    /// Append a predicate with an explicit connective.
    fn push_predicate(&mut self, connective: Connective, predicate: Predicate) -> &mut Self {
        self.predicates_mut().push(connective, predicate);
        self
    }

    /// `column = ?`
    fn where_eq(&mut self, column: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.where_op(column, "=", value)
    }

    /// `column <op> ?`
    fn where_op(
        &mut self,
        column: impl Into<String>,
        op: impl Into<String>,
        value: impl Into<Value>,
    ) -> &mut Self {
        self.push_predicate(
            Connective::And,
            Predicate::Basic {
                column: column.into(),
                op: op.into(),
                value: value.into(),
            },
        )
    }

    /// `OR column = ?`
    fn or_where_eq(&mut self, column: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.or_where_op(column, "=", value)
    }

    /// `OR column <op> ?`
    fn or_where_op(
        &mut self,
        column: impl Into<String>,
        op: impl Into<String>,
        value: impl Into<Value>,
    ) -> &mut Self {
        self.push_predicate(
            Connective::Or,
            Predicate::Basic {
                column: column.into(),
                op: op.into(),
                value: value.into(),
            },
        )
    }

    /// Raw fragment; `bindings` must match the `?` it contains.
    fn where_raw<I, V>(&mut self, sql: impl Into<String>, bindings: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let bindings = bindings.into_iter().map(Into::into).collect();
        self.push_predicate(
            Connective::And,
            Predicate::Raw {
                sql: sql.into(),
                bindings,
            },
        )
    }

    /// Raw fragment joined with `OR`.
    fn or_where_raw<I, V>(&mut self, sql: impl Into<String>, bindings: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let bindings = bindings.into_iter().map(Into::into).collect();
        self.push_predicate(
            Connective::Or,
            Predicate::Raw {
                sql: sql.into(),
                bindings,
            },
        )
    }

    /// `column IS NULL`
    fn where_null(&mut self, column: impl Into<String>) -> &mut Self {
        self.push_predicate(Connective::And, null_check(column, false))
    }

    /// `column IS NOT NULL`
    fn where_not_null(&mut self, column: impl Into<String>) -> &mut Self {
        self.push_predicate(Connective::And, null_check(column, true))
    }

    fn or_where_null(&mut self, column: impl Into<String>) -> &mut Self {
        self.push_predicate(Connective::Or, null_check(column, false))
    }

    fn or_where_not_null(&mut self, column: impl Into<String>) -> &mut Self {
        self.push_predicate(Connective::Or, null_check(column, true))
    }

    /// `column IN (?, ...)`; fails on an empty list.
    fn where_in<I, V>(&mut self, column: impl Into<String>, values: I) -> QbResult<&mut Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let predicate = membership(column, values, false)?;
        Ok(self.push_predicate(Connective::And, predicate))
    }

    /// `column NOT IN (?, ...)`; fails on an empty list.
    fn where_not_in<I, V>(&mut self, column: impl Into<String>, values: I) -> QbResult<&mut Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let predicate = membership(column, values, true)?;
        Ok(self.push_predicate(Connective::And, predicate))
    }

    /// `OR column IN (?, ...)`; fails on an empty list.
    fn or_where_in<I, V>(&mut self, column: impl Into<String>, values: I) -> QbResult<&mut Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let predicate = membership(column, values, false)?;
        Ok(self.push_predicate(Connective::Or, predicate))
    }

    /// `OR column NOT IN (?, ...)`; fails on an empty list.
    fn or_where_not_in<I, V>(&mut self, column: impl Into<String>, values: I) -> QbResult<&mut Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let predicate = membership(column, values, true)?;
        Ok(self.push_predicate(Connective::Or, predicate))
    }

    /// `column BETWEEN ? AND ?`
    fn where_between(
        &mut self,
        column: impl Into<String>,
        min: impl Into<Value>,
        max: impl Into<Value>,
    ) -> &mut Self {
        self.push_predicate(Connective::And, range(column, min, max, false))
    }

    /// `column NOT BETWEEN ? AND ?`
    fn where_not_between(
        &mut self,
        column: impl Into<String>,
        min: impl Into<Value>,
        max: impl Into<Value>,
    ) -> &mut Self {
        self.push_predicate(Connective::And, range(column, min, max, true))
    }

    /// `OR column BETWEEN ? AND ?`
    fn or_where_between(
        &mut self,
        column: impl Into<String>,
        min: impl Into<Value>,
        max: impl Into<Value>,
    ) -> &mut Self {
        self.push_predicate(Connective::Or, range(column, min, max, false))
    }

    fn or_where_not_between(
        &mut self,
        column: impl Into<String>,
        min: impl Into<Value>,
        max: impl Into<Value>,
    ) -> &mut Self {
        self.push_predicate(Connective::Or, range(column, min, max, true))
    }

    /// Build a parenthesized sub-group joined with `AND`.
    ///
    /// # Example
    /// ```ignore
    /// qb.where_eq("status", "active").where_nested(|q| {
    ///     q.where_eq("role", "admin").or_where_eq("role", "moderator");
    /// });
    /// // WHERE status = ? AND (role = ? OR role = ?)
    /// ```
    fn where_nested<F>(&mut self, build: F) -> &mut Self
    where
        F: FnOnce(&mut WhereGroup),
    {
        let mut group = WhereGroup::new();
        build(&mut group);
        self.push_predicate(Connective::And, Predicate::Group(group))
    }

    /// Build a parenthesized sub-group joined with `OR`.
    fn or_where_nested<F>(&mut self, build: F) -> &mut Self
    where
        F: FnOnce(&mut WhereGroup),
    {
        let mut group = WhereGroup::new();
        build(&mut group);
        self.push_predicate(Connective::Or, Predicate::Group(group))
    }

    /// Like [`WhereBuilder::where_nested`] for callbacks that can fail, such
    /// as ones calling `where_in`. Nothing is added when the callback fails.
    fn try_where_nested<F>(&mut self, build: F) -> QbResult<&mut Self>
    where
        F: FnOnce(&mut WhereGroup) -> QbResult<()>,
    {
        let mut group = WhereGroup::new();
        build(&mut group)?;
        Ok(self.push_predicate(Connective::And, Predicate::Group(group)))
    }

    /// Fallible sub-group joined with `OR`.
    fn or_try_where_nested<F>(&mut self, build: F) -> QbResult<&mut Self>
    where
        F: FnOnce(&mut WhereGroup) -> QbResult<()>,
    {
        let mut group = WhereGroup::new();
        build(&mut group)?;
        Ok(self.push_predicate(Connective::Or, Predicate::Group(group)))
    }
}

impl WhereBuilder for WhereGroup {
    fn predicates_mut(&mut self) -> &mut WhereGroup {
        self
    }
}

fn null_check(column: impl Into<String>, negated: bool) -> Predicate {
    Predicate::Null {
        column: column.into(),
        negated,
    }
}

fn membership<I, V>(column: impl Into<String>, values: I, negated: bool) -> QbResult<Predicate>
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    let values: Vec<Value> = values.into_iter().map(Into::into).collect();
    if values.is_empty() {
        return Err(QbError::config("WHERE IN values cannot be empty"));
    }
    Ok(Predicate::In {
        column: column.into(),
        values,
        negated,
    })
}

fn range(
    column: impl Into<String>,
    min: impl Into<Value>,
    max: impl Into<Value>,
    negated: bool,
) -> Predicate {
    Predicate::Between {
        column: column.into(),
        min: min.into(),
        max: max.into(),
        negated,
    }
}
