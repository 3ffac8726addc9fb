//! Connection collaborator traits.
//!
//! The query builder never talks to a database directly. Execution helpers
//! compile the query, hand the SQL to [`Connection::prepare`], bind every value
//! by its 1-based position and then run the resulting [`Statement`].

use crate::error::QbResult;
use crate::row::Row;
use crate::value::{ParamKind, Value};

/// A database connection able to prepare statements.
///
/// Implementations are free to open the physical connection lazily, on the
/// first call to [`Connection::prepare`].
pub trait Connection {
    /// Prepared statement type borrowed from this connection.
    type Statement<'c>: Statement
    where
        Self: 'c;

    /// Prepare a statement for execution.
    fn prepare(&self, sql: &str) -> QbResult<Self::Statement<'_>>;

    /// Identifier generated by the most recent INSERT on this connection.
    fn last_insert_id(&self) -> QbResult<String>;
}

/// A prepared statement.
pub trait Statement {
    /// Bind `value` to the placeholder at `position` (1-based).
    fn bind_value(&mut self, position: usize, value: &Value, kind: ParamKind) -> QbResult<()>;

    /// Run the statement.
    fn execute(&mut self) -> QbResult<()>;

    /// All remaining rows of the result set.
    fn fetch_all(&mut self) -> QbResult<Vec<Row>>;

    /// The next row of the result set, if any.
    fn fetch(&mut self) -> QbResult<Option<Row>>;

    /// Rows affected by the last execution.
    fn row_count(&self) -> QbResult<u64>;
}
