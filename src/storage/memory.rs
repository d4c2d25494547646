//! Memory storage
//!
//! Will be destroyed on system shutdown

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::entries::Entry;

use super::CreateEntryValues;
use super::Result;
use super::Storage;

/// An in-memory storage
///
/// Entries are kept in insertion order
#[derive(Clone, Debug, Default)]
pub struct Memory {
    /// All entries in storage
    entries: Arc<Mutex<Vec<Entry>>>,
}

impl Memory {
    /// Create a new empty Memory storage
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for Memory {
    async fn find_all_entries(&self) -> Result<Vec<Entry>> {
        let mut entries = self
            .entries
            .lock()
            .await
            .iter()
            .rev()
            .cloned()
            .collect::<Vec<_>>();

        // stable, so equal timestamps keep the newest insert first
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(entries)
    }

    async fn find_single_entry_by_id(&self, id: &Uuid) -> Result<Option<Entry>> {
        Ok(self
            .entries
            .lock()
            .await
            .iter()
            .find(|entry| &entry.id == id)
            .cloned())
    }

    async fn create_entry(&self, values: &CreateEntryValues<'_>) -> Result<Entry> {
        let now = Utc::now();

        let entry = Entry {
            id: Uuid::new_v4(),
            name: values.entry.name.clone(),
            email: values.entry.email.clone(),
            message: values.entry.message.clone(),
            entry_type: values.entry.entry_type,
            file: values.file.cloned(),
            created_at: now,
            updated_at: now,
        };

        self.entries.lock().await.push(entry.clone());

        Ok(entry)
    }

    async fn delete_entry_by_id(&self, id: &Uuid) -> Result<Option<Entry>> {
        let mut entries = self.entries.lock().await;

        let Some(index) = entries.iter().position(|entry| &entry.id == id) else {
            return Ok(None);
        };

        Ok(Some(entries.remove(index)))
    }
}
