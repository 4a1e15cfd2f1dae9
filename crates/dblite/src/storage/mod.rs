//! `SQLite` storage for plain records.
//!
//! A [`Storage`] owns one connection and one table. Filters passed to
//! [`Storage::get`] and [`Storage::delete`] are built into criteria and
//! translated by `dblite-query`; the fragment is appended to the statement
//! skeleton and executed with positional binding.
//!
//! ## Module Structure
//!
//! - `helpers` - Value conversion and row mapping
//! - `records` - Record CRUD operations

mod helpers;
mod records;

use std::path::Path;

use rusqlite::Connection;
use tracing::{debug, info, warn};

use crate::autocommit::{AutoCommit, CommitCounter};
use crate::error::{Error, Result};
use crate::record::Schema;
use crate::statement;
use crate::uri::{parse_uri, DatabaseUri};

/// Open a storage by URI, creating the table for `schema` if needed.
///
/// Shorthand for [`Storage::open`].
///
/// # Errors
///
/// See [`Storage::open`].
pub fn open(schema: Schema, uri: &str, autocommit: AutoCommit) -> Result<Storage> {
    Storage::open(schema, uri, autocommit)
}

/// Records stored in one `SQLite` table.
///
/// Writes run in an implicitly opened transaction that is committed by
/// [`commit`](Self::commit) or by the auto-commit policy. Changes still
/// pending when the storage is closed or dropped are discarded.
pub struct Storage {
    conn: Connection,
    uri: DatabaseUri,
    schema: Schema,
    commits: CommitCounter,
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("uri", &self.uri.to_string())
            .field("schema", &self.schema)
            .field("commits", &self.commits)
            .finish_non_exhaustive()
    }
}

impl Storage {
    /// Open the database named by `uri` and create its table for `schema`.
    ///
    /// The table is created with one untyped column per schema field if it
    /// does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Uri`] for malformed URIs and [`Error::Database`] if
    /// the database cannot be opened or the table cannot be created.
    pub fn open(schema: Schema, uri: &str, autocommit: AutoCommit) -> Result<Self> {
        let uri = parse_uri(uri)?;
        let conn = Self::connect(&uri)?;

        let sql = statement::create_table(&uri.table, schema.fields());
        debug!(%sql, "Creating table");
        conn.execute_batch(&sql)?;

        Ok(Self {
            conn,
            uri,
            schema,
            commits: CommitCounter::new(autocommit),
        })
    }

    /// Open an existing table, reading its schema from the database.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if the table does not exist, plus the
    /// errors of [`Storage::open`].
    pub fn open_existing(uri: &str, autocommit: AutoCommit) -> Result<Self> {
        let uri = parse_uri(uri)?;
        let conn = Self::connect(&uri)?;
        let schema = Self::read_schema(&conn, &uri.table)?;

        Ok(Self {
            conn,
            uri,
            schema,
            commits: CommitCounter::new(autocommit),
        })
    }

    fn connect(uri: &DatabaseUri) -> Result<Connection> {
        if !uri.is_memory() {
            // Ensure parent directory exists
            if let Some(parent) = Path::new(&uri.database).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
        }

        debug!(database = %uri.database, table = %uri.table, "Opening database");
        Ok(Connection::open(&uri.database)?)
    }

    fn read_schema(conn: &Connection, table: &str) -> Result<Schema> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
        let columns = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        if columns.is_empty() {
            return Err(Error::Schema(format!("table '{table}' does not exist")));
        }
        Schema::new(columns)
    }

    /// The parsed URI this storage was opened with.
    #[must_use]
    pub fn uri(&self) -> &DatabaseUri {
        &self.uri
    }

    /// Name of the table holding the records.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.uri.table
    }

    /// The field set records are checked against.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The auto-commit policy.
    #[must_use]
    pub fn autocommit(&self) -> AutoCommit {
        self.commits.policy()
    }

    /// Puts since the last commit.
    #[must_use]
    pub fn pending_puts(&self) -> usize {
        self.commits.pending()
    }

    /// Returns `true` while a write transaction is open.
    #[must_use]
    pub fn has_uncommitted_changes(&self) -> bool {
        !self.conn.is_autocommit()
    }

    /// Open the implicit write transaction unless one is already running.
    fn begin_if_needed(&self) -> Result<()> {
        if self.conn.is_autocommit() {
            self.conn.execute_batch("BEGIN")?;
        }
        Ok(())
    }

    /// Commit pending changes.
    ///
    /// A no-op when nothing is pending.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Database`] if the commit fails.
    pub fn commit(&mut self) -> Result<()> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("COMMIT")?;
            info!(
                table = %self.uri.table,
                puts = self.commits.pending(),
                "Committed changes"
            );
        }
        self.commits.reset();
        Ok(())
    }

    /// Close the database. Uncommitted changes are discarded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Database`] if rolling back or closing fails.
    pub fn close(self) -> Result<()> {
        if !self.conn.is_autocommit() {
            warn!(
                table = %self.uri.table,
                puts = self.commits.pending(),
                "Closing with uncommitted changes; they are discarded"
            );
            self.conn.execute_batch("ROLLBACK")?;
        }
        self.conn.close().map_err(|(_, e)| Error::Database(e))
    }
}
