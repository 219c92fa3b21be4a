// src/store/mod.rs

//! Change store: the table mapping each known file path to its last observed
//! metadata, backed by SQLite.
//!
//! Every call takes the single connection lock, so at most one statement runs
//! at a time. Every mutation is written to the audit log before the statement
//! is attempted.
//!
//! Reconciliation:
//! - an update that matches no row, or fails, becomes an insert;
//! - a failed delete is reported, or becomes an insert under
//!   [`DeleteFailurePolicy::Insert`].

use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Local};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::audit::AuditLog;
use crate::engine::ChangeEvent;
use crate::errors::{FolderwatchError, Result};
use crate::types::{ChangeKind, DeleteFailurePolicy, FileChangeLog};

mod sql;

/// One row of the `fsevents` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    pub file_path: String,
    pub file_name: String,
    pub mode: String,
    pub size: i64,
}

impl ChangeRecord {
    pub fn from_event(event: &ChangeEvent) -> Self {
        Self {
            file_path: event.path_key(),
            file_name: event.name.clone(),
            mode: event.mode.clone(),
            size: event.size,
        }
    }

    fn change_log(&self, kind: ChangeKind, last_updated: DateTime<Local>) -> FileChangeLog {
        FileChangeLog {
            change_type: kind.to_string(),
            file_path: self.file_path.clone(),
            mode: self.mode.clone(),
            size: self.size,
            last_updated,
        }
    }
}

/// How an update was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated,
    /// No usable row existed; the event was inserted instead.
    Inserted,
}

/// How a delete was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// There was no record for the path.
    Missing,
    /// The delete failed and the record was inserted instead.
    Reinserted,
}

pub struct ChangeStore {
    conn: Mutex<Connection>,
    audit: Arc<AuditLog>,
    delete_policy: DeleteFailurePolicy,
}

impl fmt::Debug for ChangeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeStore")
            .field("delete_policy", &self.delete_policy)
            .finish_non_exhaustive()
    }
}

impl ChangeStore {
    /// Open (or create) the database at `location`, make sure the table exists
    /// and remove every existing row.
    pub fn open(
        location: impl AsRef<Path>,
        audit: Arc<AuditLog>,
        delete_policy: DeleteFailurePolicy,
    ) -> Result<Self> {
        let location = location.as_ref();
        let conn = match Connection::open(location) {
            Ok(conn) => conn,
            Err(err) => {
                audit.log_error(&format!("error opening database {}", location.display()), &err);
                return Err(err.into());
            }
        };
        Self::initialize(conn, audit, delete_policy)
    }

    /// In-memory store, mainly for tests.
    pub fn open_in_memory(audit: Arc<AuditLog>, delete_policy: DeleteFailurePolicy) -> Result<Self> {
        Self::initialize(Connection::open_in_memory()?, audit, delete_policy)
    }

    fn initialize(
        conn: Connection,
        audit: Arc<AuditLog>,
        delete_policy: DeleteFailurePolicy,
    ) -> Result<Self> {
        if let Err(err) = conn.execute(sql::CREATE_TABLE, []) {
            audit.log_error("error creating table 'fsevents'", &err);
            return Err(err.into());
        }
        audit.log_info("database table 'fsevents' exists or has been created", None);

        // A session always starts from an empty table; failing to clear it is
        // not fatal.
        match conn.execute(sql::DELETE_ALL, []) {
            Ok(rows) => audit.log_info(&format!("{rows} rows deleted from 'fsevents' table"), None),
            Err(err) => audit.log_error("error deleting all entries from fsevents", &err),
        }

        Ok(Self {
            conn: Mutex::new(conn),
            audit,
            delete_policy,
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| FolderwatchError::LockPoisoned("change store"))
    }

    fn preparation(&self, statement: &'static str, source: rusqlite::Error) -> FolderwatchError {
        self.audit
            .log_error(&format!("error preparing the {statement} statement:"), &source);
        FolderwatchError::Preparation { statement, source }
    }

    /// Record a file found by the initial scan.
    pub fn insert_initial(&self, record: &ChangeRecord, modified: DateTime<Local>) -> Result<()> {
        let conn = self.conn()?;
        self.audit
            .log_change(&record.change_log(ChangeKind::Initial, modified));
        self.insert_row(&conn, "add initial record", record)
    }

    /// Record a newly created file. Constraint violations (e.g. the path is
    /// already known) are returned as-is.
    pub fn insert_record(&self, event: &ChangeEvent) -> Result<()> {
        let conn = self.conn()?;
        self.add_locked(&conn, event)
    }

    /// Update mode and size of a known path, inserting it if unknown.
    pub fn update_record(&self, event: &ChangeEvent) -> Result<UpdateOutcome> {
        let conn = self.conn()?;
        let record = ChangeRecord::from_event(event);
        self.audit
            .log_change(&record.change_log(ChangeKind::Update, event.modified));

        let result = {
            let mut stmt = conn
                .prepare_cached(sql::UPDATE)
                .map_err(|source| self.preparation("update record", source))?;
            stmt.execute(params![record.mode, record.size, record.file_path])
        };

        match result {
            Ok(1) => Ok(UpdateOutcome::Updated),
            Ok(rows) => {
                debug!(path = %record.file_path, rows, "update matched no record");
                self.audit.log_info(
                    &format!("no record updated for {} trying add", record.file_path),
                    None,
                );
                self.add_locked(&conn, event).map(|()| UpdateOutcome::Inserted)
            }
            Err(err) => {
                self.audit.log_info(
                    &format!("error updating the record for {} trying add", record.file_path),
                    Some(&err),
                );
                self.add_locked(&conn, event).map(|()| UpdateOutcome::Inserted)
            }
        }
    }

    /// Delete the record of a removed path.
    pub fn delete_record(&self, event: &ChangeEvent) -> Result<DeleteOutcome> {
        let conn = self.conn()?;
        let record = ChangeRecord::from_event(event);
        self.audit
            .log_change(&record.change_log(ChangeKind::Delete, event.modified));

        let result = {
            let mut stmt = conn
                .prepare_cached(sql::DELETE_ONE)
                .map_err(|source| self.preparation("delete record", source))?;
            stmt.execute(params![record.file_path])
        };

        match result {
            Ok(0) => {
                self.audit.log_info(
                    &format!("no record to delete for {}", record.file_path),
                    None,
                );
                Ok(DeleteOutcome::Missing)
            }
            Ok(_) => Ok(DeleteOutcome::Deleted),
            Err(err) => match self.delete_policy {
                DeleteFailurePolicy::Report => {
                    self.audit.log_error(
                        &format!("error deleting the record for {}", record.file_path),
                        &err,
                    );
                    Err(err.into())
                }
                DeleteFailurePolicy::Insert => {
                    self.audit.log_info(
                        &format!("error deleting the record for {} trying add", record.file_path),
                        Some(&err),
                    );
                    self.add_locked(&conn, event).map(|()| DeleteOutcome::Reinserted)
                }
            },
        }
    }

    /// Current record for `path`, if any.
    pub fn get(&self, path: &str) -> Result<Option<ChangeRecord>> {
        let conn = self.conn()?;
        let record = conn
            .query_row(sql::SELECT_ONE, params![path], row_to_record)
            .optional()?;
        Ok(record)
    }

    /// All records ordered by path.
    pub fn records(&self) -> Result<Vec<ChangeRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(sql::SELECT_ALL)?;
        let rows = stmt.query_map([], row_to_record)?;
        let records = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    pub fn len(&self) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(sql::COUNT, [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Run raw SQL on the store's own connection, to break it in tests.
    #[cfg(test)]
    pub(crate) fn execute_batch(&self, sql: &str) -> Result<()> {
        self.conn()?.execute_batch(sql)?;
        Ok(())
    }

    /// Log an `Add` change and insert the event's record. Caller holds the lock.
    fn add_locked(&self, conn: &Connection, event: &ChangeEvent) -> Result<()> {
        let record = ChangeRecord::from_event(event);
        self.audit
            .log_change(&record.change_log(ChangeKind::Add, event.modified));
        self.insert_row(conn, "add record", &record)
    }

    fn insert_row(&self, conn: &Connection, statement: &'static str, record: &ChangeRecord) -> Result<()> {
        let mut stmt = conn
            .prepare_cached(sql::INSERT)
            .map_err(|source| self.preparation(statement, source))?;

        if let Err(err) = stmt.execute(params![
            record.file_path,
            record.file_name,
            record.mode,
            record.size
        ]) {
            self.audit
                .log_error(&format!("error adding the record for {}", record.file_path), &err);
            return Err(err.into());
        }
        Ok(())
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<ChangeRecord> {
    Ok(ChangeRecord {
        file_path: row.get(0)?,
        file_name: row.get(1)?,
        mode: row.get(2)?,
        size: row.get::<_, Option<i64>>(3)?.unwrap_or(0),
    })
}
