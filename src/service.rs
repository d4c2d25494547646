//! Entry service
//!
//! Create, list, get and delete entries, combining validation, file intake and storage

use std::io;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::entries::Entry;
use crate::entries::EntryInput;
use crate::entries::EntryType;
use crate::entries::FileDescriptor;
use crate::files;
use crate::files::FileIntake;
use crate::files::Upload;
use crate::storage;
use crate::storage::CreateEntryValues;
use crate::storage::Storage;

/// Everything that can go wrong with an entry
#[derive(Debug, Error)]
pub enum EntryError {
    /// One or more fields are missing or malformed, one message per field
    #[error("{}", .0.join(", "))]
    ValidationFailed(Vec<String>),

    /// Attachment has a type that is not allowed
    #[error("Invalid file type. Only JPG, PNG, GIF, PDF, TXT allowed.")]
    InvalidFileType(String),

    /// Attachment is too large
    #[error("File too large. Max 5MB.")]
    FileTooLarge,

    /// No entry with the ID
    #[error("Entry not found")]
    NotFound,

    /// ID is not an entry ID at all
    #[error("Invalid entry id")]
    InvalidId,

    /// Storage could not be reached
    #[error("Storage unavailable: {0}")]
    StoreUnavailable(#[from] storage::Error),

    /// Attachment could not be written to the content area
    #[error("Could not store file: {0}")]
    FileWrite(#[source] io::Error),
}

impl From<files::Error> for EntryError {
    fn from(err: files::Error) -> Self {
        match err {
            files::Error::InvalidFileType(mime_type) => Self::InvalidFileType(mime_type),
            files::Error::FileTooLarge => Self::FileTooLarge,
            files::Error::Io(err) => Self::FileWrite(err),
        }
    }
}

/// Narrow down a listing
#[derive(Clone, Debug, Default)]
pub struct EntryFilter {
    /// Case-insensitive text to look for in name, message and type
    pub search: Option<String>,

    /// Only entries of this type
    pub entry_type: Option<EntryType>,
}

impl EntryFilter {
    fn is_empty(&self) -> bool {
        self.search.is_none() && self.entry_type.is_none()
    }

    fn apply(&self, entries: Vec<Entry>) -> Vec<Entry> {
        if self.is_empty() {
            return entries;
        }

        let needle = self
            .search
            .as_deref()
            .map(|search| search.trim().to_lowercase());

        entries
            .into_iter()
            .filter(|entry| self.entry_type.is_none_or(|t| t == entry.entry_type))
            .filter(|entry| needle.as_deref().is_none_or(|needle| entry.contains(needle)))
            .collect()
    }
}

/// Number of entries, in total and per type
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EntryStats {
    pub total: usize,
    pub note: usize,
    pub secret: usize,
    pub link: usize,
    pub code: usize,
    pub todo: usize,
}

impl EntryStats {
    fn from_entries(entries: &[Entry]) -> Self {
        let mut stats = Self {
            total: entries.len(),
            ..Self::default()
        };

        for entry in entries {
            let counter = match entry.entry_type {
                EntryType::Note => &mut stats.note,
                EntryType::Secret => &mut stats.secret,
                EntryType::Link => &mut stats.link,
                EntryType::Code => &mut stats.code,
                EntryType::Todo => &mut stats.todo,
            };

            *counter += 1;
        }

        stats
    }
}

/// The entry service
///
/// Holds no state of its own, everything lives in storage and the content area
#[derive(Clone)]
pub struct EntryService {
    storage: Arc<dyn Storage>,
    intake: FileIntake,
    delete_attachments: bool,
}

impl EntryService {
    /// Create the service
    ///
    /// With `delete_attachments` the attachment of an entry is removed together with the entry,
    /// otherwise it stays in the content area
    pub fn new(storage: Arc<dyn Storage>, intake: FileIntake, delete_attachments: bool) -> Self {
        Self {
            storage,
            intake,
            delete_attachments,
        }
    }

    /// Create an entry, with an optional attachment
    ///
    /// Nothing is written unless both the attachment and the fields are valid
    pub async fn create(
        &self,
        input: &EntryInput,
        upload: Option<Upload>,
    ) -> Result<Entry, EntryError> {
        let upload = upload
            .map(|upload| self.intake.check(upload))
            .transpose()?;

        let values = input.validate().map_err(EntryError::ValidationFailed)?;

        let file = match upload {
            Some(upload) => Some(self.intake.store(upload).await?),
            None => None,
        };

        let created = self
            .storage
            .create_entry(&CreateEntryValues {
                entry: &values,
                file: file.as_ref(),
            })
            .await;

        match created {
            Ok(entry) => {
                tracing::debug!("Created {} entry {}", entry.entry_type, entry.id);

                Ok(entry)
            }
            Err(err) => {
                if let Some(file) = &file {
                    self.discard_file(file).await;
                }

                Err(err.into())
            }
        }
    }

    /// List entries, newest first
    pub async fn list(&self, filter: &EntryFilter) -> Result<Vec<Entry>, EntryError> {
        let entries = self.storage.find_all_entries().await?;

        Ok(filter.apply(entries))
    }

    /// Count entries per type
    pub async fn stats(&self) -> Result<EntryStats, EntryError> {
        let entries = self.storage.find_all_entries().await?;

        Ok(EntryStats::from_entries(&entries))
    }

    /// Get a single entry
    pub async fn get(&self, id: &str) -> Result<Entry, EntryError> {
        let id = parse_id(id)?;

        tracing::debug!("Looking for entry: {id}");

        self.storage
            .find_single_entry_by_id(&id)
            .await?
            .ok_or(EntryError::NotFound)
    }

    /// Delete a single entry
    ///
    /// Returns the deleted entry; deleting the same ID twice fails with [`EntryError::NotFound`]
    pub async fn delete(&self, id: &str) -> Result<Entry, EntryError> {
        let id = parse_id(id)?;

        let entry = self
            .storage
            .delete_entry_by_id(&id)
            .await?
            .ok_or(EntryError::NotFound)?;

        tracing::debug!("Deleted entry {id}");

        if self.delete_attachments {
            if let Some(file) = &entry.file {
                self.discard_file(file).await;
            }
        }

        Ok(entry)
    }

    async fn discard_file(&self, file: &FileDescriptor) {
        if let Err(err) = self.intake.remove(file).await {
            tracing::warn!("Could not remove attachment {}: {err}", file.filename);
        }
    }
}

/// Parse an entry ID
pub fn parse_id(id: &str) -> Result<Uuid, EntryError> {
    Uuid::parse_str(id.trim()).map_err(|_| EntryError::InvalidId)
}
