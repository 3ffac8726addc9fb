//! Convenient imports for typical `chainsql` usage.
//!
//! ```ignore
//! use chainsql::prelude::*;
//! ```
//!
//! Brings in [`WhereBuilder`](crate::WhereBuilder), which the predicate methods
//! (`where_eq`, `where_in`, ...) of [`QueryBuilder`](crate::QueryBuilder) come from.

pub use crate::{
    Connection, FromRow, FromValue, InsertPool, QbError, QbResult, QueryBuilder, Row, Statement,
    Value, WhereBuilder, WhereGroup,
};
pub use crate::qb::OrderDirection;

#[cfg(feature = "sqlite")]
pub use crate::{SqliteConfig, SqliteConnection};
