//! File intake
//!
//! Checks uploaded attachments against the upload policy and writes them to the content area.
//! Knows nothing about entries, anything that accepts uploads can use it.

use std::io;
use std::path::Path;
use std::path::PathBuf;

use chrono::DateTime;
use chrono::Utc;
use mime::Mime;
use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;
use percent_encoding::utf8_percent_encode;
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::entries::FileDescriptor;

/// Form field carrying the attachment
pub const FILE_FIELD: &str = "file";

/// Largest accepted attachment, 5 MiB
pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Path the content area is served from
pub const UPLOADS_PATH: &str = "/uploads";

/// Longest stored filename in bytes, the common filesystem limit
const MAX_STORED_NAME_LENGTH: usize = 255;

/// Longest extension kept when a filename has to be shortened, dot included
const MAX_EXTENSION_LENGTH: usize = 16;

/// Characters kept as-is when a stored filename is used in a URL
const FILENAME_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

/// File intake errors
#[derive(Debug, Error)]
pub enum Error {
    /// MIME type is not on the allow list
    #[error("Invalid file type: {0}")]
    InvalidFileType(String),

    /// Attachment is larger than [`MAX_FILE_SIZE`]
    #[error("File too large")]
    FileTooLarge,

    /// Content area could not be written
    #[error("Could not write file: {0}")]
    Io(#[from] io::Error),
}

/// Result type for all file intake interactions
pub type Result<T> = core::result::Result<T, Error>;

/// An attachment as received, nothing checked yet
#[derive(Clone, Debug)]
pub struct Upload {
    /// Filename given by the client
    pub original_name: String,

    /// Declared content type, if any
    pub content_type: Option<String>,

    pub bytes: Vec<u8>,
}

/// An attachment that passed the upload policy, not yet written
#[derive(Debug)]
pub struct CheckedUpload {
    original_name: String,
    mime_type: Mime,
    bytes: Vec<u8>,
}

/// Writes attachments to a directory on disk
#[derive(Clone, Debug)]
pub struct FileIntake {
    upload_dir: PathBuf,
}

impl FileIntake {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Make sure the content area exists
    pub async fn prepare(&self) -> io::Result<()> {
        fs::create_dir_all(&self.upload_dir).await
    }

    /// Check an upload against the policy, nothing is written
    pub fn check(&self, upload: Upload) -> Result<CheckedUpload> {
        if upload.bytes.len() > MAX_FILE_SIZE {
            return Err(Error::FileTooLarge);
        }

        let mime_type = detect_mime_type(&upload)?;
        if !is_allowed(&mime_type) {
            return Err(Error::InvalidFileType(mime_type.essence_str().to_string()));
        }

        Ok(CheckedUpload {
            original_name: upload.original_name,
            mime_type,
            bytes: upload.bytes,
        })
    }

    /// Write a checked upload to the content area
    ///
    /// A fresh name is generated for every file, existing files are never overwritten
    pub async fn store(&self, upload: CheckedUpload) -> Result<FileDescriptor> {
        let filename = storage_filename(&upload.original_name, Utc::now());
        let path = self.upload_dir.join(&filename);

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        file.write_all(&upload.bytes).await?;
        file.flush().await?;

        tracing::debug!("Stored {} bytes as {}", upload.bytes.len(), path.display());

        Ok(FileDescriptor {
            filename,
            original_name: upload.original_name,
            mime_type: upload.mime_type.essence_str().to_string(),
            size: upload.bytes.len() as u64,
            path: path.to_string_lossy().into_owned(),
        })
    }

    /// Remove a stored attachment, a file that is already gone is fine
    pub async fn remove(&self, file: &FileDescriptor) -> io::Result<()> {
        // only trust our own generated name, never the stored path
        let path = self.upload_dir.join(sanitize_filename(&file.filename));

        match fs::remove_file(&path).await {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
            _ => Ok(()),
        }
    }
}

fn allowed_mime_types() -> [Mime; 5] {
    [
        mime::IMAGE_JPEG,
        mime::IMAGE_PNG,
        mime::IMAGE_GIF,
        mime::APPLICATION_PDF,
        mime::TEXT_PLAIN,
    ]
}

fn is_allowed(mime_type: &Mime) -> bool {
    allowed_mime_types()
        .iter()
        .any(|allowed| allowed.essence_str() == mime_type.essence_str())
}

/// Declared content type first, a guess based on the filename only when nothing was declared
///
/// A declared type that does not parse is never replaced by a guess
fn detect_mime_type(upload: &Upload) -> Result<Mime> {
    match upload.content_type.as_deref().map(str::trim) {
        Some(content_type) if !content_type.is_empty() => content_type
            .parse::<Mime>()
            .map_err(|_| Error::InvalidFileType(content_type.to_string())),
        _ => Ok(mime_guess::from_path(&upload.original_name)
            .first()
            .unwrap_or(mime::APPLICATION_OCTET_STREAM)),
    }
}

/// `<millis>-<random>-<sanitized name>`
///
/// The name part is shortened so the whole stays within [`MAX_STORED_NAME_LENGTH`]
fn storage_filename(original_name: &str, now: DateTime<Utc>) -> String {
    let random = Uuid::new_v4().simple().to_string();
    let prefix = format!("{}-{}-", now.timestamp_millis(), &random[..8]);

    let name = shorten_filename(
        &sanitize_filename(original_name),
        MAX_STORED_NAME_LENGTH.saturating_sub(prefix.len()),
    );

    format!("{prefix}{name}")
}

/// Cut a filename to at most `max_len` bytes, keeping its extension
///
/// Cuts on a char boundary; an extension longer than [`MAX_EXTENSION_LENGTH`] is not kept apart
fn shorten_filename(name: &str, max_len: usize) -> String {
    if name.len() <= max_len {
        return name.to_string();
    }

    let (stem, extension) = match name.rfind('.') {
        Some(index)
            if index > 0
                && name.len() - index <= MAX_EXTENSION_LENGTH
                && name.len() - index < max_len =>
        {
            name.split_at(index)
        }
        _ => (name, ""),
    };

    let mut end = max_len - extension.len();
    while !stem.is_char_boundary(end) {
        end -= 1;
    }

    format!("{}{extension}", &stem[..end])
}

/// Make a client supplied filename safe to use inside the content area
pub fn sanitize_filename(original_name: &str) -> String {
    let normalized = original_name.nfc().collect::<String>();
    let base = normalized.rsplit(['/', '\\']).next().unwrap_or_default();

    let mut sanitized = String::with_capacity(base.len());
    let mut in_whitespace = false;

    for ch in base.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                sanitized.push('_');
            }
            in_whitespace = true;
            continue;
        }

        in_whitespace = false;

        if ch.is_control() || matches!(ch, ':' | '*' | '?' | '"' | '<' | '>' | '|') {
            sanitized.push('_');
        } else {
            sanitized.push(ch);
        }
    }

    let sanitized = sanitized.trim_start_matches('.');
    if sanitized.is_empty() {
        "file".to_string()
    } else {
        sanitized.to_string()
    }
}

/// URL an attachment is served on
pub fn public_url(filename: &str) -> String {
    format!(
        "{UPLOADS_PATH}/{}",
        utf8_percent_encode(filename, FILENAME_ENCODE_SET)
    )
}
