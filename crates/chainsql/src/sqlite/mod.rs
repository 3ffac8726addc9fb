//! SQLite collaborator built on `rusqlite`.
//!
//! [`SqliteConnection`] opens its physical connection on first use, so a
//! builder can be handed a connection that has not touched the disk yet.
//!
//! ```ignore
//! use chainsql::prelude::*;
//! use chainsql::sqlite::{SqliteConfig, SqliteConnection};
//!
//! let conn = SqliteConnection::new(SqliteConfig::new().path("app.db"));
//! let total = QueryBuilder::new().from("users").count(&conn, "*")?;
//! ```

mod config;
mod statement;

pub use config::SqliteConfig;
pub use statement::SqliteStatement;

use std::cell::OnceCell;

use crate::client::Connection;
use crate::error::QbResult;

/// Lazily opened SQLite connection.
#[derive(Debug)]
pub struct SqliteConnection {
    config: SqliteConfig,
    conn: OnceCell<rusqlite::Connection>,
}

impl SqliteConnection {
    /// Create a connection that opens with `config` on first use.
    pub fn new(config: SqliteConfig) -> Self {
        Self {
            config,
            conn: OnceCell::new(),
        }
    }

    /// A private in-memory database.
    pub fn open_in_memory() -> Self {
        Self::new(SqliteConfig::default())
    }

    /// Get the configuration this connection opens with.
    pub fn config(&self) -> &SqliteConfig {
        &self.config
    }

    /// Whether the physical connection has been opened.
    pub fn is_open(&self) -> bool {
        self.conn.get().is_some()
    }

    /// The underlying connection, opening it if needed.
    pub fn connection(&self) -> QbResult<&rusqlite::Connection> {
        if let Some(conn) = self.conn.get() {
            return Ok(conn);
        }

        let conn = self.config.open()?;
        match &self.config.path {
            Some(path) => tracing::info!(
                target: "chainsql.sqlite",
                path = %path.display(),
                read_only = self.config.read_only,
                "opened sqlite database"
            ),
            None => tracing::debug!(
                target: "chainsql.sqlite",
                "opened in-memory sqlite database"
            ),
        }
        Ok(self.conn.get_or_init(|| conn))
    }

    /// Run one or more statements without bindings, e.g. schema setup.
    pub fn execute_batch(&self, sql: &str) -> QbResult<()> {
        self.connection()?.execute_batch(sql)?;
        Ok(())
    }
}

impl Connection for SqliteConnection {
    type Statement<'c> = SqliteStatement<'c>;

    fn prepare(&self, sql: &str) -> QbResult<SqliteStatement<'_>> {
        let stmt = self.connection()?.prepare(sql)?;
        Ok(SqliteStatement::new(stmt))
    }

    fn last_insert_id(&self) -> QbResult<String> {
        Ok(self.connection()?.last_insert_rowid().to_string())
    }
}

impl Connection for rusqlite::Connection {
    type Statement<'c> = SqliteStatement<'c>;

    fn prepare(&self, sql: &str) -> QbResult<SqliteStatement<'_>> {
        let stmt = rusqlite::Connection::prepare(self, sql)?;
        Ok(SqliteStatement::new(stmt))
    }

    fn last_insert_id(&self) -> QbResult<String> {
        Ok(self.last_insert_rowid().to_string())
    }
}
