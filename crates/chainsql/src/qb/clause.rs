//! Clause types other than WHERE: joins, ordering, HAVING and the query kind.

use crate::error::{QbError, QbResult};
use crate::qb::param::ParamList;
use crate::value::Value;
use serde::Serialize;
use std::fmt;

/// Statement kind; selects the compile routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryKind {
    #[default]
    Select,
    Insert,
    Update,
    Delete,
    Replace,
}

impl QueryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            QueryKind::Select => "select",
            QueryKind::Insert => "insert",
            QueryKind::Update => "update",
            QueryKind::Delete => "delete",
            QueryKind::Replace => "replace",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Cross,
}

impl JoinKind {
    pub fn as_sql(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::Cross => "CROSS JOIN",
        }
    }
}

/// A join clause. Cross joins carry no condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub kind: JoinKind,
    pub table: String,
    pub on: Option<JoinOn>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinOn {
    pub left: String,
    pub op: String,
    pub right: String,
}

impl Join {
    pub fn to_sql(&self) -> String {
        match &self.on {
            Some(on) if self.kind != JoinKind::Cross => format!(
                "{} {} ON {} {} {}",
                self.kind.as_sql(),
                self.table,
                on.left,
                on.op,
                on.right
            ),
            _ => format!("{} {}", self.kind.as_sql(), self.table),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl OrderDirection {
    /// Parse a direction, ignoring case.
    pub fn parse(direction: &str) -> QbResult<Self> {
        if direction.eq_ignore_ascii_case("asc") {
            Ok(OrderDirection::Asc)
        } else if direction.eq_ignore_ascii_case("desc") {
            Ok(OrderDirection::Desc)
        } else {
            Err(QbError::config(format!("Invalid order direction: {}", direction)))
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            OrderDirection::Asc => "ASC",
            OrderDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub column: String,
    pub direction: OrderDirection,
}

/// The single HAVING comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Having {
    pub column: String,
    pub op: String,
    pub value: Value,
}

impl Having {
    pub fn build(&self, params: &mut ParamList) -> String {
        format!("{} {} {}", self.column, self.op, params.push(&self.value))
    }
}
