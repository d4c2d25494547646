//! All API endpoint setup

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::routing::post;

pub use health::health;
pub use request::PathParameters;
pub use request::QueryParameters;
pub use request::Submission;
pub use response::Error;
pub use response::Success;

use crate::files::MAX_FILE_SIZE;

mod entries;
mod health;
mod request;
mod response;

/// Room for the other form fields and multipart framing next to the file
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Get the Axum router for all API routes
pub fn router() -> Router {
    Router::new()
        .route(
            "/submit",
            post(entries::submit).layer(DefaultBodyLimit::max(MAX_FILE_SIZE + MULTIPART_OVERHEAD)),
        )
        .route("/entries", get(entries::list))
        .route(
            "/entries/{entry}",
            get(entries::single).delete(entries::delete),
        )
        .route("/stats", get(entries::stats))
        .fallback(not_found)
}

async fn not_found() -> Error {
    Error::not_found("Route not found")
}
