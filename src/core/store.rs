//! SQLite data file access
//!
//! The store is a thin owner of the connection. It knows how to create a
//! new file from [`TABLE_DEFINITION`] and how to run the single-row writes
//! and filtered reads the records and record sets need. It has no notion of
//! transactions spanning several calls: every write stands alone.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};
use thiserror::Error;

use crate::core::schema::{TABLES, TABLE_DEFINITION};
use crate::core::validate::FieldValue;

/// Errors from the data file or from a record that cannot be written
#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("database error: {0}")]
    #[diagnostic(code(partstracker::store::sqlite))]
    Sqlite(#[from] rusqlite::Error),

    #[error("{kind} is not valid: check {}", .fields.join(", "))]
    #[diagnostic(
        code(partstracker::store::invalid),
        help("fix the listed fields before saving")
    )]
    Invalid { kind: &'static str, fields: Vec<String> },

    #[error("{kind} has not been added yet")]
    #[diagnostic(code(partstracker::store::not_saved))]
    NotSaved { kind: &'static str },

    #[error("{kind} {id} already exists in the data file")]
    #[diagnostic(code(partstracker::store::already_saved))]
    AlreadySaved { kind: &'static str, id: i64 },

    #[error("{kind} {key} not found")]
    #[diagnostic(code(partstracker::store::not_found))]
    NotFound { kind: &'static str, key: String },

    #[error("unknown column '{column}' for table {table}")]
    #[diagnostic(code(partstracker::store::unknown_column))]
    UnknownColumn { table: &'static str, column: String },

    #[error("no data file is open")]
    #[diagnostic(
        code(partstracker::store::no_file),
        help("open one with 'ptrack file open <PATH>' or pass --file")
    )]
    NoFileOpen,

    #[error("data file already exists at {0:?}")]
    #[diagnostic(code(partstracker::store::file_exists))]
    FileExists(PathBuf),

    #[error("data file not found at {0:?}")]
    #[diagnostic(
        code(partstracker::store::file_missing),
        help("create one with 'ptrack file new <PATH>'")
    )]
    FileMissing(PathBuf),

    #[error("{0:?} is not a PartsTracker data file (missing table {1})")]
    #[diagnostic(code(partstracker::store::not_a_data_file))]
    NotADataFile(PathBuf, &'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// An open data file
pub struct Store {
    conn: Connection,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").field("path", &self.path).finish()
    }
}

impl Store {
    /// Create a new data file and lay down the schema
    pub fn create(path: &Path) -> Result<Self, StoreError> {
        if path.exists() {
            return Err(StoreError::FileExists(path.to_path_buf()));
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        let store = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        store.init_schema()?;
        tracing::info!(path = %path.display(), "created data file");
        Ok(store)
    }

    /// Open an existing data file
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if !path.is_file() {
            return Err(StoreError::FileMissing(path.to_path_buf()));
        }

        let conn = Connection::open(path)?;
        let store = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        store.check_tables(path)?;
        tracing::debug!(path = %path.display(), "opened data file");
        Ok(store)
    }

    /// A throwaway in-memory data file with the full schema
    pub fn in_memory() -> Result<Self, StoreError> {
        let store = Self {
            conn: Connection::open_in_memory()?,
            path: None,
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Path of the data file, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        for statement in TABLE_DEFINITION {
            self.conn.execute(statement, [])?;
        }
        Ok(())
    }

    fn check_tables(&self, path: &Path) -> Result<(), StoreError> {
        for table in TABLES {
            let found: Option<String> = self
                .conn
                .query_row(
                    "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    [table],
                    |row| row.get(0),
                )
                .optional()?;
            if found.is_none() {
                return Err(StoreError::NotADataFile(path.to_path_buf(), *table));
            }
        }
        Ok(())
    }

    /// Insert one row and return the new record id
    pub(crate) fn insert_row(
        &self,
        table: &str,
        columns: &[&str],
        values: &[FieldValue],
    ) -> Result<i64, StoreError> {
        let placeholders = (1..=columns.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders
        );
        self.conn.execute(&sql, params_from_iter(values.iter()))?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(table, record_id = id, "inserted row");
        Ok(id)
    }

    /// Rewrite every column of one row; returns the number of rows touched
    pub(crate) fn update_row(
        &self,
        table: &str,
        record_id: i64,
        columns: &[&str],
        values: &[FieldValue],
    ) -> Result<usize, StoreError> {
        let assignments = columns
            .iter()
            .enumerate()
            .map(|(i, col)| format!("{} = ?{}", col, i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {} WHERE record_id = ?{}",
            table,
            assignments,
            columns.len() + 1
        );
        let mut bound: Vec<FieldValue> = values.to_vec();
        bound.push(FieldValue::Integer(record_id));
        let touched = self.conn.execute(&sql, params_from_iter(bound.iter()))?;
        tracing::debug!(table, record_id, touched, "updated row");
        Ok(touched)
    }

    /// Delete one row; returns the number of rows removed
    pub(crate) fn delete_row(&self, table: &str, record_id: i64) -> Result<usize, StoreError> {
        let sql = format!("DELETE FROM {} WHERE record_id = ?1", table);
        let removed = self.conn.execute(&sql, [record_id])?;
        tracing::debug!(table, record_id, removed, "deleted row");
        Ok(removed)
    }

    /// Run a query and map each row
    pub(crate) fn select<T, F>(
        &self,
        sql: &str,
        params: &[FieldValue],
        mut map: F,
    ) -> Result<Vec<T>, StoreError>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params_from_iter(params.iter()), |row| map(row))?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Run a query expected to return at most one row
    pub(crate) fn select_one<T, F>(
        &self,
        sql: &str,
        params: &[FieldValue],
        map: F,
    ) -> Result<Option<T>, StoreError>
    where
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        Ok(self
            .conn
            .query_row(sql, params_from_iter(params.iter()), map)
            .optional()?)
    }

    /// Count rows of a table matching `column = value`
    pub fn count_where(
        &self,
        table: &str,
        column: &str,
        value: &FieldValue,
    ) -> Result<i64, StoreError> {
        let sql = format!("SELECT COUNT(*) FROM {} WHERE {} = ?1", table, column);
        Ok(self.conn.query_row(&sql, [value], |row| row.get(0))?)
    }
}
