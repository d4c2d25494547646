//! Postgres storage

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use crate::entries::Entry;

use super::CreateEntryValues;
use super::Error;
use super::Result;
use super::Storage;
use super::types::ENTRY_COLUMNS;
use super::types::MIGRATOR;
use super::types::SqlxEntry;

/// Postgres storage
#[derive(Clone)]
pub struct Postgres {
    /// Pool of connections
    connection_pool: PgPool,
}

impl Postgres {
    /// Create Postgres storage
    ///
    /// Migrations will be run
    pub async fn new(connection_string: &str) -> anyhow::Result<Self> {
        let connection_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(connection_string)
            .await
            .context("Could not connect to the database")?;

        Self::new_with_pool(connection_pool).await
    }

    /// Create Postgres storage with existing pool
    ///
    /// Migrations will be run
    pub async fn new_with_pool(connection_pool: PgPool) -> anyhow::Result<Self> {
        MIGRATOR
            .run(&connection_pool)
            .await
            .context("Migrations could not run")?;

        tracing::info!("Connected to the database, migrations are up to date");

        Ok(Self { connection_pool })
    }
}

#[async_trait]
impl Storage for Postgres {
    async fn find_all_entries(&self) -> Result<Vec<Entry>> {
        let entries = sqlx::query_as::<_, SqlxEntry>(&format!(
            r"
            SELECT {ENTRY_COLUMNS}
            FROM entries
            ORDER BY created_at DESC, seq DESC
            "
        ))
        .fetch_all(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Entry::from_sqlx_entry_multiple(entries)
    }

    async fn find_single_entry_by_id(&self, id: &Uuid) -> Result<Option<Entry>> {
        let entry = sqlx::query_as::<_, SqlxEntry>(&format!(
            r"
            SELECT {ENTRY_COLUMNS}
            FROM entries
            WHERE id = $1
            LIMIT 1
            "
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Entry::from_sqlx_entry_optional(entry)
    }

    async fn create_entry(&self, values: &CreateEntryValues<'_>) -> Result<Entry> {
        let file = values.file;

        let entry = sqlx::query_as::<_, SqlxEntry>(&format!(
            r"
            INSERT INTO entries (
                id,
                name,
                email,
                message,
                entry_type,
                file_filename,
                file_original_name,
                file_mime_type,
                file_size,
                file_path
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {ENTRY_COLUMNS}
            "
        ))
        .bind(Uuid::new_v4())
        .bind(&values.entry.name)
        .bind(&values.entry.email)
        .bind(&values.entry.message)
        .bind(values.entry.entry_type.as_str())
        .bind(file.map(|file| file.filename.as_str()))
        .bind(file.map(|file| file.original_name.as_str()))
        .bind(file.map(|file| file.mime_type.as_str()))
        .bind(file.map(|file| i64::try_from(file.size).unwrap_or(i64::MAX)))
        .bind(file.map(|file| file.path.as_str()))
        .fetch_one(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Entry::from_sqlx_entry(entry)
    }

    async fn delete_entry_by_id(&self, id: &Uuid) -> Result<Option<Entry>> {
        let entry = sqlx::query_as::<_, SqlxEntry>(&format!(
            r"
            DELETE FROM entries
            WHERE id = $1
            RETURNING {ENTRY_COLUMNS}
            "
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Entry::from_sqlx_entry_optional(entry)
    }
}

fn connection_error<E>(err: E) -> Error
where
    E: std::error::Error,
{
    tracing::error!("Database error: {err}");

    Error::Connection(err.to_string())
}
