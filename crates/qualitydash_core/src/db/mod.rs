//! Dashboard store: taxonomy, project matrix, commitments and QI snapshots.
//!
//! # Responsibility
//! - Hand out connections whose schema matches this build.
//! - Report why a store could not be opened: SQLite failure, a failed
//!   migration step, or a file written by a newer build.
//!
//! # Invariants
//! - The schema version lives in `PRAGMA user_version`.
//! - A failed migration leaves the store at its previous version.
//! - Foreign keys are enforced; the dense matrix relies on cascade deletes.
//! - Repositories refuse connections that were not opened through here.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Why the dashboard store could not be opened or migrated.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// A schema step failed and was rolled back.
    Migration {
        version: u32,
        source: rusqlite::Error,
    },
    /// The file was written by a newer build.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "dashboard store error: {err}"),
            Self::Migration { version, source } => {
                write!(f, "dashboard schema migration {version} failed: {source}")
            }
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "dashboard schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) | Self::Migration { source: err, .. } => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
