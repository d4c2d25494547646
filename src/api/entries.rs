//! Entries API endpoints

use axum::Extension;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::entries::Entry;
use crate::entries::EntryType;
use crate::entries::FileDescriptor;
use crate::entries::parse_entry_type;
use crate::files::public_url;
use crate::service::EntryError;
use crate::service::EntryFilter;
use crate::service::EntryService;
use crate::service::EntryStats;

use super::Error;
use super::PathParameters;
use super::QueryParameters;
use super::Submission;
use super::Success;

/// Entry response going to the client
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryResponse {
    /// Entry ID
    pub id: Uuid,

    pub name: String,

    pub email: String,

    pub message: String,

    #[serde(rename = "type")]
    pub entry_type: EntryType,

    /// Attachment, `null` when there is none
    pub file: Option<FileResponse>,

    /// Creation date
    pub created_at: DateTime<Utc>,

    /// Last updated at
    pub updated_at: DateTime<Utc>,
}

/// Attachment metadata going to the client
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResponse {
    pub filename: String,
    pub original_name: String,
    pub mime_type: String,
    pub size: u64,
    pub path: String,

    /// Where the attachment can be downloaded
    pub url: String,
}

impl FileResponse {
    fn from_file(file: FileDescriptor) -> Self {
        Self {
            url: public_url(&file.filename),
            filename: file.filename,
            original_name: file.original_name,
            mime_type: file.mime_type,
            size: file.size,
            path: file.path,
        }
    }
}

impl EntryResponse {
    fn from_entry(entry: Entry) -> Self {
        Self {
            id: entry.id,
            name: entry.name,
            email: entry.email,
            message: entry.message,
            entry_type: entry.entry_type,
            file: entry.file.map(FileResponse::from_file),
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        }
    }

    fn from_entry_multiple(entries: Vec<Entry>) -> Vec<Self> {
        entries.into_iter().map(Self::from_entry).collect()
    }
}

/// Confirmation of a deleted entry
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub id: Uuid,
}

/// Submit a new entry
///
/// Request:
/// ```sh
/// curl -v -F name=Alice -F email=alice@example.com -F message='hello world' \
///     -F type=note -F file=@notes.txt \
///     http://localhost:5000/api/submit
/// ```
///
/// Response:
/// ```json
/// { "success": true, "message": "Entry saved successfully!", "data": { "id": "<uuid>", ... } }
/// ```
pub async fn submit(
    Extension(service): Extension<EntryService>,
    submission: Submission,
) -> Result<Success<EntryResponse>, Error> {
    let entry = service
        .create(&submission.input, submission.upload)
        .await?;

    Ok(Success::created(EntryResponse::from_entry(entry)).with_message("Entry saved successfully!"))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    search: Option<String>,
    #[serde(rename = "type")]
    entry_type: Option<String>,
}

impl ListQuery {
    fn into_filter(self) -> Result<EntryFilter, EntryError> {
        let entry_type = match self.entry_type.as_deref().map(str::trim) {
            None | Some("") => None,
            entry_type => Some(parse_entry_type(entry_type).map_err(|_| {
                EntryError::ValidationFailed(vec!["Invalid entry type".to_string()])
            })?),
        };

        let search = self.search.filter(|search| !search.trim().is_empty());

        Ok(EntryFilter { search, entry_type })
    }
}

/// List all entries, newest first
///
/// Request:
/// ```sh
/// curl -v 'http://localhost:5000/api/entries?search=wifi&type=secret'
/// ```
///
/// Response:
/// ```json
/// { "success": true, "count": 1, "data": [ { "id": "<uuid>", ... } ] }
/// ```
pub async fn list(
    Extension(service): Extension<EntryService>,
    QueryParameters(query): QueryParameters<ListQuery>,
) -> Result<Success<Vec<EntryResponse>>, Error> {
    let filter = query.into_filter()?;

    let entries = service.list(&filter).await?;
    let count = entries.len();

    Ok(Success::ok(EntryResponse::from_entry_multiple(entries)).with_count(count))
}

/// Get a single entry
///
/// Request:
/// ```sh
/// curl -v http://localhost:5000/api/entries/<uuid>
/// ```
///
/// Response:
/// ```json
/// { "success": true, "data": { "id": "<uuid>", ... } }
/// ```
pub async fn single(
    Extension(service): Extension<EntryService>,
    PathParameters(entry_id): PathParameters<String>,
) -> Result<Success<EntryResponse>, Error> {
    let entry = service.get(&entry_id).await?;

    Ok(Success::ok(EntryResponse::from_entry(entry)))
}

/// Delete a single entry
///
/// Request:
/// ```sh
/// curl -v -X DELETE http://localhost:5000/api/entries/<uuid>
/// ```
///
/// Response:
/// ```json
/// { "success": true, "message": "Entry deleted", "data": { "id": "<uuid>" } }
/// ```
pub async fn delete(
    Extension(service): Extension<EntryService>,
    PathParameters(entry_id): PathParameters<String>,
) -> Result<Success<DeletedResponse>, Error> {
    let entry = service.delete(&entry_id).await?;

    Ok(Success::ok(DeletedResponse { id: entry.id }).with_message("Entry deleted"))
}

/// Count entries per type
pub async fn stats(
    Extension(service): Extension<EntryService>,
) -> Result<Success<EntryStats>, Error> {
    let stats = service.stats().await?;

    Ok(Success::ok(stats))
}
