//! Storage layer for exifnotes.
//!
//! This module provides `SQLite`-based persistent storage for the logbook:
//! equipment, film stocks, rolls, frames and the mountable links between
//! them. Records are validated before every write.

mod cameras;
mod film_stocks;
mod filters;
mod frames;
mod lenses;
pub mod migrations;
mod mountables;
mod rolls;
pub mod schema;

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, ParseError, Result};
use crate::model::DATE_FORMAT;

pub use film_stocks::FilmStockQuery;
pub use frames::FrameSort;
pub use rolls::{RollFilter, RollSort, RollSummary};

const MEMORY_PATH: &str = ":memory:";

/// Storage engine for the logbook.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch(
            "PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL; PRAGMA foreign_keys=ON;",
        )?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(MEMORY_PATH),
            source,
        })?;

        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(MEMORY_PATH),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Schema version recorded in the database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn schema_version(&self) -> Result<i32> {
        migrations::get_schema_version(&self.conn)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let count = |sql: &str| -> Result<i64> {
            Ok(self.conn.query_row(sql, [], |row| row.get(0))?)
        };

        let db_size_bytes = if self.path.as_os_str() == MEMORY_PATH {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            cameras: count("SELECT COUNT(*) FROM cameras")?,
            lenses: count("SELECT COUNT(*) FROM lenses")?,
            filters: count("SELECT COUNT(*) FROM filters")?,
            film_stocks: count("SELECT COUNT(*) FROM film_stocks")?,
            rolls: count("SELECT COUNT(*) FROM rolls WHERE archived = 0")?,
            archived_rolls: count("SELECT COUNT(*) FROM rolls WHERE archived = 1")?,
            frames: count("SELECT COUNT(*) FROM frames")?,
            db_size_bytes,
        })
    }

    /// Write a consistent copy of the database to `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if `target` already exists, its directory cannot be
    /// created or the copy fails.
    pub fn backup_to(&self, target: impl AsRef<Path>) -> Result<()> {
        let target = target.as_ref();
        if target.exists() {
            return Err(Error::validation(
                "backup",
                format!("{} already exists", target.display()),
            ));
        }
        if let Some(parent) = target.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        self.conn
            .execute("VACUUM INTO ?1", [&*target.to_string_lossy()])?;
        info!("Backed up database to {}", target.display());
        Ok(())
    }

    /// Picture file names referenced by any frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn picture_filenames(&self) -> Result<BTreeSet<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT picture_filename FROM frames WHERE picture_filename IS NOT NULL")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<BTreeSet<String>, _>>()?;
        Ok(names)
    }
}

/// Statistics about the storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageStats {
    /// Number of cameras.
    pub cameras: i64,
    /// Number of lenses.
    pub lenses: i64,
    /// Number of filters.
    pub filters: i64,
    /// Number of film stocks, catalog included.
    pub film_stocks: i64,
    /// Number of active rolls.
    pub rolls: i64,
    /// Number of archived rolls.
    pub archived_rolls: i64,
    /// Number of frames across all rolls.
    pub frames: i64,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

impl fmt::Display for StorageStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cameras:       {}", self.cameras)?;
        writeln!(f, "Lenses:        {}", self.lenses)?;
        writeln!(f, "Filters:       {}", self.filters)?;
        writeln!(f, "Film stocks:   {}", self.film_stocks)?;
        writeln!(f, "Rolls:         {} ({} archived)", self.rolls, self.archived_rolls)?;
        write!(f, "Frames:        {}", self.frames)
    }
}

/// Row id of a record about to be updated.
fn require_id(entity: &'static str, id: Option<i64>) -> Result<i64> {
    id.ok_or_else(|| Error::validation(entity, "cannot update a record that has not been saved"))
}

/// Turn an UPDATE's affected row count into `NotFound` when nothing matched.
fn ensure_found(entity: &'static str, id: i64, affected: usize) -> Result<()> {
    if affected == 0 {
        Err(Error::not_found(entity, id))
    } else {
        Ok(())
    }
}

fn format_date(date: &NaiveDateTime) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn date_column(row: &Row, idx: usize) -> rusqlite::Result<Option<NaiveDateTime>> {
    let value: Option<String> = row.get(idx)?;
    value
        .map(|text| {
            NaiveDateTime::parse_from_str(&text, DATE_FORMAT).map_err(|err| {
                rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
            })
        })
        .transpose()
}

fn required_date_column(row: &Row, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    date_column(row, idx)?.ok_or(rusqlite::Error::InvalidColumnType(
        idx,
        "date".to_string(),
        Type::Null,
    ))
}

/// Read a nullable text column holding a domain value's display form.
fn parsed_column<T>(row: &Row, idx: usize) -> rusqlite::Result<Option<T>>
where
    T: FromStr<Err = ParseError>,
{
    let value: Option<String> = row.get(idx)?;
    value
        .map(|text| {
            text.parse().map_err(|err: ParseError| {
                rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
            })
        })
        .transpose()
}

fn required_parsed_column<T>(row: &Row, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = ParseError>,
{
    parsed_column(row, idx)?.ok_or(rusqlite::Error::InvalidColumnType(
        idx,
        "text".to_string(),
        Type::Null,
    ))
}
