//! SQLite connection configuration.

use crate::error::QbResult;
use rusqlite::OpenFlags;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for [`SqliteConnection`](super::SqliteConnection).
#[derive(Debug, Clone, PartialEq)]
pub struct SqliteConfig {
    /// Database file. `None` opens a private in-memory database.
    pub path: Option<PathBuf>,
    /// Open without write access.
    pub read_only: bool,
    /// How long to wait on a locked database before failing.
    pub busy_timeout: Option<Duration>,
    /// Enforce foreign key constraints.
    pub foreign_keys: bool,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: None,
            read_only: false,
            busy_timeout: Some(Duration::from_secs(5)),
            foreign_keys: true,
        }
    }
}

impl SqliteConfig {
    /// Create a new configuration with defaults (in-memory).
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the database file at `path`.
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn in_memory(mut self) -> Self {
        self.path = None;
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = Some(timeout);
        self
    }

    /// Fail immediately on a locked database.
    pub fn no_busy_timeout(mut self) -> Self {
        self.busy_timeout = None;
        self
    }

    pub fn foreign_keys(mut self, enabled: bool) -> Self {
        self.foreign_keys = enabled;
        self
    }

    pub(crate) fn open_flags(&self) -> OpenFlags {
        let access = if self.read_only {
            OpenFlags::SQLITE_OPEN_READ_ONLY
        } else {
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE
        };
        access | OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX
    }

    /// Open a physical connection and apply the pragmas.
    pub(crate) fn open(&self) -> QbResult<rusqlite::Connection> {
        let flags = self.open_flags();
        let conn = match &self.path {
            Some(path) => rusqlite::Connection::open_with_flags(path, flags)?,
            None => rusqlite::Connection::open_in_memory_with_flags(flags)?,
        };

        if let Some(timeout) = self.busy_timeout {
            conn.busy_timeout(timeout)?;
        }
        if self.foreign_keys {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        }
        Ok(conn)
    }
}
