//! # chainsql
//!
//! A fluent SQL query compiler with pluggable synchronous execution.
//!
//! ## Features
//!
//! - **Chained builder**: SELECT / INSERT / UPDATE / DELETE / REPLACE through one [`QueryBuilder`]
//! - **Parameter safe**: every value becomes a `?` placeholder; bindings are returned in
//!   placeholder order, however deeply WHERE groups nest
//! - **Eager validation**: empty `IN` lists, negative limits and bad sort directions fail at the
//!   call that introduced them
//! - **Pluggable execution**: helpers run over any [`Connection`]; a lazy SQLite implementation
//!   ships behind the default `sqlite` feature
//!
//! ## Example
//!
//! ```ignore
//! use chainsql::prelude::*;
//! use chainsql::sqlite::SqliteConnection;
//!
//! let conn = SqliteConnection::open_in_memory();
//!
//! let mut qb = QueryBuilder::new();
//! qb.select(["id", "name"])
//!     .from("users")
//!     .where_eq("status", "active")
//!     .where_nested(|q| {
//!         q.where_eq("role", "admin").or_where_eq("role", "moderator");
//!     })
//!     .order_by("name", "asc")?;
//!
//! let rows = qb.get(&conn)?;
//! let total = qb.count(&conn, "*")?;
//! ```

pub mod client;
pub mod error;
pub mod prelude;
pub mod qb;
pub mod row;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod value;

pub use client::{Connection, Statement};
pub use error::{QbError, QbResult};
pub use qb::{CompiledQuery, DebugInfo, InsertPool, QueryBuilder, QueryKind, WhereBuilder, WhereGroup};
pub use row::{FromRow, FromValue, Row};
pub use value::{ParamKind, Value};

#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteConfig, SqliteConnection};
