use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{ffi, Connection, Error as SqlError, ErrorCode};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::BookingResult;

/// Handle on the booking database. It only remembers where the file lives:
/// every operation opens its own connection and drops it before returning,
/// so no state is shared between calls apart from the file itself.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(config: &Config) -> Self {
        Self::at(&config.db_path)
    }

    pub fn at(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the data directory and every table that is still missing.
    /// Safe to run on each start; nothing existing is altered.
    pub fn ensure_schema(&self) -> BookingResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let conn = self.connect()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS appointments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                customer_name TEXT NOT NULL,
                date TEXT NOT NULL,
                time TEXT NOT NULL,
                barber_name TEXT
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS customers (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                email TEXT,
                phone TEXT
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS barbers (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                full_name TEXT NOT NULL,
                specialty TEXT NOT NULL DEFAULT ''
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS services (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                price REAL NOT NULL,
                duration_minutes INTEGER NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS bookings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                customer_id INTEGER NOT NULL,
                barber_id INTEGER NOT NULL,
                service_id INTEGER NOT NULL,
                date TEXT NOT NULL,
                time TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'scheduled',
                FOREIGN KEY(customer_id) REFERENCES customers(id),
                FOREIGN KEY(barber_id) REFERENCES barbers(id),
                FOREIGN KEY(service_id) REFERENCES services(id)
            )",
            [],
        )?;

        info!(path = %self.path.display(), "schema ready");
        Ok(())
    }

    /// Open a fresh connection with foreign keys enforced. The connection
    /// closes when the caller drops it.
    pub(crate) fn connect(&self) -> BookingResult<Connection> {
        debug!(path = %self.path.display(), "opening connection");
        let conn = Connection::open(&self.path)?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(conn)
    }
}

/// Which constraint stopped a write, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Constraint {
    Unique,
    ForeignKey,
    Other,
}

pub(crate) fn violated_constraint(err: &SqlError) -> Option<Constraint> {
    match err {
        SqlError::SqliteFailure(failure, _) if failure.code == ErrorCode::ConstraintViolation => {
            Some(match failure.extended_code {
                ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                    Constraint::Unique
                }
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => Constraint::ForeignKey,
                _ => Constraint::Other,
            })
        }
        _ => None,
    }
}
