//! Fluent query compiler.
//!
//! [`QueryBuilder`] accumulates clauses through chained calls and compiles them
//! into SQL with `?` placeholders plus the bind values in placeholder order.
//!
//! # Usage
//!
//! ```ignore
//! use chainsql::prelude::*;
//!
//! let mut qb = QueryBuilder::new();
//! qb.from("users")
//!     .where_eq("status", "active")
//!     .where_nested(|q| {
//!         q.where_eq("role", "admin").or_where_eq("role", "moderator");
//!     });
//!
//! let compiled = qb.compile()?;
//! assert_eq!(
//!     compiled.sql(),
//!     "SELECT * FROM users WHERE status = ? AND (role = ? OR role = ?)"
//! );
//!
//! // INSERT
//! let id = QueryBuilder::new()
//!     .insert("users")
//!     .values([("name", "alice"), ("email", "alice@example.com")])
//!     .insert_get_id(&conn)?;
//!
//! // Several rows in one statement
//! QueryBuilder::new()
//!     .insert("tags")
//!     .values_many([[("name", "rust")], [("name", "sql")]])?
//!     .execute(&conn)?;
//!
//! // UPDATE
//! QueryBuilder::new()
//!     .update("users")
//!     .set("status", "inactive")
//!     .where_eq("id", user_id)
//!     .row_count(&conn)?;
//! ```

mod builder;
mod clause;
mod delete;
mod exec;
mod expr;
mod insert;
mod param;
mod pool;
mod select;
mod update;

pub use builder::{CompiledQuery, DebugInfo, QueryBuilder};
pub use clause::{Having, Join, JoinKind, JoinOn, OrderBy, OrderDirection, QueryKind};
pub use expr::{Connective, Predicate, WhereBuilder, WhereGroup};
pub use param::ParamList;
pub use pool::InsertPool;

#[cfg(test)]
mod mock;
