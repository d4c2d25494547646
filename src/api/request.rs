//! API request helpers

use axum::Json;
use axum::extract::FromRequest;
use axum::extract::FromRequestParts;
use axum::extract::Multipart;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::Request;
use axum::extract::multipart::Field;
use axum::extract::multipart::MultipartError;
use axum::extract::rejection::FormRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::rejection::PathRejection;
use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::http::request::Parts;
use mime::Mime;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::entries::EntryInput;
use crate::files::FILE_FIELD;
use crate::files::MAX_FILE_SIZE;
use crate::files::Upload;
use crate::service::EntryError;

use super::Error;

fn parse_json<J>(json: Result<Json<J>, JsonRejection>) -> Result<J, Error> {
    match json {
        Ok(Json(json)) => Ok(json),
        Err(err) => {
            tracing::debug!("Rejected JSON body: {err}");

            if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
                return Err(EntryError::FileTooLarge.into());
            }

            match err {
                JsonRejection::JsonDataError(_) => Err(Error::bad_request("Data error")),
                JsonRejection::JsonSyntaxError(_) => Err(Error::bad_request("JSON syntax error")),
                JsonRejection::MissingJsonContentType(_) => Err(Error::bad_request(
                    "Missing `application/json` content type",
                )),
                JsonRejection::BytesRejection(_) => {
                    Err(Error::bad_request("Invalid characters in JSON"))
                }
                _ => Err(Error::bad_request("Unknown JSON error")),
            }
        }
    }
}

fn parse_form<F>(form: Result<axum::Form<F>, FormRejection>) -> Result<F, Error> {
    match form {
        Ok(axum::Form(form)) => Ok(form),
        Err(err) => {
            tracing::debug!("Rejected form body: {err}");

            if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
                return Err(EntryError::FileTooLarge.into());
            }

            match err {
                FormRejection::FailedToDeserializeForm(_)
                | FormRejection::FailedToDeserializeFormBody(_) => {
                    Err(Error::bad_request("Invalid form data"))
                }
                _ => Err(Error::bad_request("Unknown form error")),
            }
        }
    }
}

fn parse_path<P>(path: Result<Path<P>, PathRejection>) -> Result<P, Error> {
    match path {
        Ok(Path(path)) => Ok(path),
        Err(err) => match err {
            PathRejection::FailedToDeserializePathParams(_) => {
                Err(Error::bad_request("Invalid path parameter"))
            }
            PathRejection::MissingPathParams(_) => {
                Err(Error::bad_request("Missing path parameter"))
            }
            _ => Err(Error::bad_request("Unknown path error")),
        },
    }
}

/// Wrapper for the path extractor
pub struct PathParameters<P>(pub P);

impl<S, P> FromRequestParts<S> for PathParameters<P>
where
    S: Send + Sync,
    P: DeserializeOwned + Send,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        parse_path(Path::<P>::from_request_parts(parts, state).await).map(PathParameters)
    }
}

/// Wrapper for the query string extractor
pub struct QueryParameters<Q>(pub Q);

impl<S, Q> FromRequestParts<S> for QueryParameters<Q>
where
    S: Send + Sync,
    Q: DeserializeOwned + Send,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<Q>::from_request_parts(parts, state).await {
            Ok(Query(query)) => Ok(QueryParameters(query)),
            Err(QueryRejection::FailedToDeserializeQueryString(err)) => {
                tracing::debug!("Rejected query string: {err}");

                Err(Error::bad_request("Invalid query parameter"))
            }
            Err(_) => Err(Error::bad_request("Unknown query error")),
        }
    }
}

/// Entry fields as sent by JSON or URL-encoded bodies
#[derive(Debug, Default, Deserialize)]
struct SubmitForm {
    name: Option<String>,
    email: Option<String>,
    message: Option<String>,
    #[serde(rename = "type")]
    entry_type: Option<String>,
}

impl SubmitForm {
    fn into_input(self) -> EntryInput {
        EntryInput {
            name: self.name,
            email: self.email,
            message: self.message,
            entry_type: self.entry_type,
        }
    }
}

/// A submitted entry with its optional attachment
///
/// Accepts `multipart/form-data`, `application/json` and
/// `application/x-www-form-urlencoded`; only multipart can carry a file
#[derive(Debug, Default)]
pub struct Submission {
    pub input: EntryInput,
    pub upload: Option<Upload>,
}

impl<S> FromRequest<S> for Submission
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<Mime>().ok());

        match content_type {
            Some(mime) if mime.type_() == mime::MULTIPART && mime.subtype() == mime::FORM_DATA => {
                let multipart = Multipart::from_request(req, state).await.map_err(|err| {
                    tracing::debug!("Rejected multipart body: {err}");

                    Error::bad_request("Invalid multipart body")
                })?;

                parse_multipart(multipart).await
            }
            Some(mime)
                if mime.type_() == mime::APPLICATION
                    && (mime.subtype() == mime::JSON || mime.suffix() == Some(mime::JSON)) =>
            {
                let form = parse_json(Json::<SubmitForm>::from_request(req, state).await)?;

                Ok(Self {
                    input: form.into_input(),
                    upload: None,
                })
            }
            Some(mime)
                if mime.essence_str() == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str() =>
            {
                let form = parse_form(axum::Form::<SubmitForm>::from_request(req, state).await)?;

                Ok(Self {
                    input: form.into_input(),
                    upload: None,
                })
            }
            _ => Err(Error::bad_request(
                "Expected multipart form data, JSON or a URL-encoded form",
            )),
        }
    }
}

async fn parse_multipart(mut multipart: Multipart) -> Result<Submission, Error> {
    let mut submission = Submission::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(ToString::to_string) else {
            continue;
        };

        match name.as_str() {
            FILE_FIELD => {
                let original_name = field.file_name().unwrap_or_default().to_string();
                // as sent, so a type that does not parse is still rejected
                let content_type = field
                    .headers()
                    .get(CONTENT_TYPE)
                    .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());
                let bytes = read_file(field).await?;

                // browsers send an empty part when no file is picked
                if original_name.is_empty() && bytes.is_empty() {
                    continue;
                }

                if submission.upload.is_some() {
                    return Err(Error::bad_request("Only one file may be uploaded"));
                }

                submission.upload = Some(Upload {
                    original_name,
                    content_type,
                    bytes,
                });
            }
            "name" => submission.input.name = Some(read_text(field).await?),
            "email" => submission.input.email = Some(read_text(field).await?),
            "message" => submission.input.message = Some(read_text(field).await?),
            "type" => submission.input.entry_type = Some(read_text(field).await?),
            _ => tracing::debug!("Ignoring unknown form field: {name}"),
        }
    }

    Ok(submission)
}

async fn read_text(field: Field<'_>) -> Result<String, Error> {
    field.text().await.map_err(multipart_error)
}

/// Read the file, giving up as soon as it is too large
async fn read_file(mut field: Field<'_>) -> Result<Vec<u8>, Error> {
    let mut bytes = Vec::new();

    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if bytes.len() + chunk.len() > MAX_FILE_SIZE {
            return Err(EntryError::FileTooLarge.into());
        }

        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

fn multipart_error(err: MultipartError) -> Error {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return EntryError::FileTooLarge.into();
    }

    tracing::debug!("Rejected multipart body: {err}");

    Error::bad_request("Invalid multipart body")
}
