//! Database storage types

use chrono::DateTime;
use chrono::Utc;
use sqlx::migrate::Migrator;
use uuid::Uuid;

use crate::entries::Entry;
use crate::entries::FileDescriptor;

use super::Error;
use super::Result;

/// Migrator to run migrations on startup
pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Columns selected for every entry query
pub const ENTRY_COLUMNS: &str = r"
    id,
    name,
    email,
    message,
    entry_type,
    file_filename,
    file_original_name,
    file_mime_type,
    file_size,
    file_path,
    created_at,
    updated_at
";

/// `SQLx` version of entry
#[derive(Debug, sqlx::FromRow)]
pub struct SqlxEntry {
    /// Entry ID
    pub id: Uuid,

    pub name: String,

    pub email: String,

    pub message: String,

    /// One of the entry types, as text
    pub entry_type: String,

    pub file_filename: Option<String>,

    pub file_original_name: Option<String>,

    pub file_mime_type: Option<String>,

    pub file_size: Option<i64>,

    pub file_path: Option<String>,

    /// Creation date
    pub created_at: DateTime<Utc>,

    /// Last updated at
    pub updated_at: DateTime<Utc>,
}

impl Entry {
    /// Create entry from `SQLx` version
    pub fn from_sqlx_entry(entry: SqlxEntry) -> Result<Self> {
        let entry_type = entry.entry_type.parse().map_err(|_| {
            Error::Connection(format!("Unknown entry type in storage: {}", entry.entry_type))
        })?;

        // the table constraint keeps these all set or all empty
        let file = match (
            entry.file_filename,
            entry.file_original_name,
            entry.file_mime_type,
            entry.file_size,
            entry.file_path,
        ) {
            (Some(filename), Some(original_name), Some(mime_type), Some(size), Some(path)) => {
                Some(FileDescriptor {
                    filename,
                    original_name,
                    mime_type,
                    size: size.unsigned_abs(),
                    path,
                })
            }
            _ => None,
        };

        Ok(Self {
            id: entry.id,
            name: entry.name,
            email: entry.email,
            message: entry.message,
            entry_type,
            file,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        })
    }

    /// Maybe create entry from `SQLx` version
    pub fn from_sqlx_entry_optional(entry: Option<SqlxEntry>) -> Result<Option<Self>> {
        entry.map(Self::from_sqlx_entry).transpose()
    }

    /// Create multiple entries from `SQLx` version
    pub fn from_sqlx_entry_multiple(entries: Vec<SqlxEntry>) -> Result<Vec<Self>> {
        entries.into_iter().map(Self::from_sqlx_entry).collect()
    }
}
