//! API response helpers
//!
//! Every response is wrapped in the same envelope:
//! `{ "success": bool, "message"?: string, "count"?: int, "data"?: ..., "error"?: string }`

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Serialize;

use crate::service::EntryError;

/// Message sent for anything the client can not do anything about
const INTERNAL_ERROR_MESSAGE: &str = "Server error";

/// Hold data for a successful API interaction
pub struct Success<V>
where
    V: Serialize,
{
    status_code: StatusCode,
    message: Option<&'static str>,
    count: Option<usize>,
    data: V,
}

impl<V> Success<V>
where
    V: Serialize,
{
    pub fn ok(data: V) -> Self {
        Self {
            status_code: StatusCode::OK,
            message: None,
            count: None,
            data,
        }
    }

    pub fn created(data: V) -> Self {
        Self {
            status_code: StatusCode::CREATED,
            message: None,
            count: None,
            data,
        }
    }

    pub fn with_message(self, message: &'static str) -> Self {
        Self {
            message: Some(message),
            ..self
        }
    }

    pub fn with_count(self, count: usize) -> Self {
        Self {
            count: Some(count),
            ..self
        }
    }
}

#[derive(Serialize)]
struct SuccessWrapper<D>
where
    D: Serialize,
{
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<usize>,
    data: D,
}

impl<V> IntoResponse for Success<V>
where
    V: Serialize,
{
    fn into_response(self) -> Response {
        (
            self.status_code,
            Json(SuccessWrapper {
                success: true,
                message: self.message,
                count: self.count,
                data: self.data,
            }),
        )
            .into_response()
    }
}

/// Hold data for a failed API interaction
#[derive(Debug)]
pub struct Error {
    status_code: StatusCode,
    message: String,
}

impl Error {
    pub fn bad_request<M>(message: M) -> Self
    where
        M: ToString,
    {
        Self {
            status_code: StatusCode::BAD_REQUEST,
            message: message.to_string(),
        }
    }

    pub fn not_found<M>(message: M) -> Self
    where
        M: ToString,
    {
        Self {
            status_code: StatusCode::NOT_FOUND,
            message: message.to_string(),
        }
    }

    /// The actual error is logged, the client only gets a generic message
    pub fn internal_server_error<E>(err: E) -> Self
    where
        E: std::fmt::Display,
    {
        tracing::error!("Internal error: {err}");

        Self {
            status_code: StatusCode::INTERNAL_SERVER_ERROR,
            message: INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }
}

impl From<EntryError> for Error {
    fn from(err: EntryError) -> Self {
        match err {
            EntryError::ValidationFailed(_)
            | EntryError::InvalidFileType(_)
            | EntryError::FileTooLarge
            | EntryError::InvalidId => Self::bad_request(err),
            EntryError::NotFound => Self::not_found(err),
            EntryError::StoreUnavailable(_) | EntryError::FileWrite(_) => {
                Self::internal_server_error(err)
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorWrapper {
    success: bool,
    error: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (
            self.status_code,
            Json(ErrorWrapper {
                success: false,
                error: self.message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use crate::storage;

    use super::*;

    #[test]
    fn test_entry_error_status_codes() {
        let cases = [
            (
                EntryError::ValidationFailed(vec!["Name is required".to_string()]),
                StatusCode::BAD_REQUEST,
                "Name is required",
            ),
            (
                EntryError::InvalidFileType("application/zip".to_string()),
                StatusCode::BAD_REQUEST,
                "Invalid file type. Only JPG, PNG, GIF, PDF, TXT allowed.",
            ),
            (
                EntryError::FileTooLarge,
                StatusCode::BAD_REQUEST,
                "File too large. Max 5MB.",
            ),
            (
                EntryError::InvalidId,
                StatusCode::BAD_REQUEST,
                "Invalid entry id",
            ),
            (
                EntryError::NotFound,
                StatusCode::NOT_FOUND,
                "Entry not found",
            ),
            (
                EntryError::StoreUnavailable(storage::Error::Connection(
                    "password authentication failed".to_string(),
                )),
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server error",
            ),
        ];

        for (err, status_code, message) in cases {
            let error = Error::from(err);

            assert_eq!(status_code, error.status_code);
            assert_eq!(message, error.message);
        }
    }
}
