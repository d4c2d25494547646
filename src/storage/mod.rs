//! All things related to the storage of entries

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::entries::Entry;
use crate::entries::FileDescriptor;
use crate::entries::ValidEntry;

pub use Config as StorageConfig;
pub use memory::Memory;
use postgres::Postgres;

mod memory;
mod postgres;
mod types;

/// Which storage to use
#[derive(Clone, Debug)]
pub enum Config {
    /// Keep everything in memory, gone on shutdown
    Memory,

    /// Postgres, reachable with the connection string
    Postgres(String),
}

/// Setup the configured storage
///
/// # Errors
///
/// Will return `Err` when the database can not be reached or migrated
pub async fn setup(config: Config) -> anyhow::Result<Arc<dyn Storage>> {
    match config {
        Config::Memory => {
            tracing::warn!("No `DATABASE_URL` set, entries are kept in memory only");

            Ok(Arc::new(Memory::new()))
        }
        Config::Postgres(connection_string) => {
            let postgres = Postgres::new(&connection_string).await?;

            Ok(Arc::new(postgres))
        }
    }
}

/// Storage errors
#[derive(Debug, Error)]
pub enum Error {
    /// A connection error with the storage
    #[error("Connection error: {0}")]
    Connection(String),
}

/// Result type for all storage interactions
pub type Result<T> = core::result::Result<T, Error>;

/// Values to create an Entry
pub struct CreateEntryValues<'a> {
    /// Validated entry fields
    pub entry: &'a ValidEntry,

    /// Attachment, already written to the content area
    pub file: Option<&'a FileDescriptor>,
}

/// Storage with all supported operations
///
/// Entries are never updated, only created and deleted
#[async_trait]
pub trait Storage: Send + Sync + 'static {
    /// Find all entries, newest first
    async fn find_all_entries(&self) -> Result<Vec<Entry>>;

    /// Find a single entry by its ID
    async fn find_single_entry_by_id(&self, id: &Uuid) -> Result<Option<Entry>>;

    /// Create an entry
    ///
    /// ID and timestamps are assigned by the storage
    async fn create_entry(&self, values: &CreateEntryValues<'_>) -> Result<Entry>;

    /// Delete an entry by its ID
    ///
    /// Returns the removed entry, `None` when there was nothing to remove
    async fn delete_entry_by_id(&self, id: &Uuid) -> Result<Option<Entry>>;
}
