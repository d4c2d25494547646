#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
// easier to use when using the functions as callback of foreign functions
#![allow(clippy::needless_pass_by_value)]

use std::net::SocketAddr;
use std::path::Path;

use anyhow::Context;
use anyhow::Result;
use axum::Extension;
use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::services::ServeFile;
use tower_http::trace::TraceLayer;
use tracing_subscriber::prelude::*;

use crate::api::health;
use crate::api::router;
use crate::config::Config;
use crate::files::FileIntake;
use crate::files::UPLOADS_PATH;
use crate::service::EntryService;
use crate::utils::env_var;
use crate::utils::env_var_or_else;

mod api;
mod config;
mod entries;
mod files;
mod graceful_shutdown;
mod service;
mod storage;
#[cfg(test)]
mod tests;
mod utils;

const DEFAULT_RUST_LOG: &str = "vault=debug,tower_http=debug";
const DEFAULT_ADDRESS: &str = "0.0.0.0:5000";

#[tokio::main]
async fn main() -> Result<()> {
    setup_environment();
    setup_tracing();

    let config = Config::from_env()?;
    let app = setup_app(config).await?;

    let address = setup_address()?;
    let listener = TcpListener::bind(address)
        .await
        .with_context(|| format!("Could not listen on {address}"))?;

    tracing::info!("Listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(graceful_shutdown::handler())
        .await?;

    Ok(())
}

/// Create and setup the app with its dependencies
///
/// # Errors
///
/// Will return `Err` if any of its dependencies fail to load:
/// - Database connection
/// - Content area for attachments
pub async fn setup_app(config: Config) -> Result<Router> {
    let Config {
        storage,
        upload_dir,
        public_dir,
        delete_attachments,
    } = config;

    let storage = storage::setup(storage).await?;

    let intake = FileIntake::new(&upload_dir);
    intake
        .prepare()
        .await
        .with_context(|| format!("Could not create upload directory {}", upload_dir.display()))?;

    tracing::info!("Storing attachments in {}", intake.upload_dir().display());

    if delete_attachments {
        tracing::info!("Attachments are removed together with their entry");
    }

    let service = EntryService::new(storage, intake, delete_attachments);

    Ok(create_router(service, &upload_dir, &public_dir))
}

/// Create the router for the vault
///
/// API routes, the health check, uploaded attachments and the static frontend
fn create_router(service: EntryService, upload_dir: &Path, public_dir: &Path) -> Router {
    // unknown paths get the frontend's index, so client-side routing works
    let frontend =
        ServeDir::new(public_dir).fallback(ServeFile::new(public_dir.join("index.html")));

    Router::new()
        .nest("/api", router())
        .route("/health", get(health))
        .nest_service(UPLOADS_PATH, ServeDir::new(upload_dir))
        .fallback_service(frontend)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(Extension(service))
}

fn setup_environment() {
    dotenvy::dotenv().ok();
}

fn setup_tracing() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::registry;

    registry()
        .with(EnvFilter::new(env_var_or_else("RUST_LOG", || {
            DEFAULT_RUST_LOG.into()
        })))
        .with(fmt::layer())
        .init();
}

fn setup_address() -> Result<SocketAddr> {
    let mut address =
        env_var_or_else("ADDRESS", || String::from(DEFAULT_ADDRESS)).parse::<SocketAddr>()?;

    // optional override of just the port
    if let Some(port) = env_var("PORT") {
        let port = port
            .parse::<u16>()
            .with_context(|| format!("`PORT` is not a valid port: {port}"))?;

        address.set_port(port);
    }

    Ok(address)
}
