//! Application configuration
//!
//! Read once from the environment at startup

use std::path::PathBuf;

use anyhow::Result;
use anyhow::bail;

use crate::storage::StorageConfig;
use crate::utils::env_var;
use crate::utils::env_var_or_else;
use crate::utils::parse_flag;

const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_PUBLIC_DIR: &str = "public";

/// Everything needed to build the app
#[derive(Clone, Debug)]
pub struct Config {
    /// Where entries are kept
    pub storage: StorageConfig,

    /// Content area for attachments
    pub upload_dir: PathBuf,

    /// Static frontend
    pub public_dir: PathBuf,

    /// Remove the attachment of an entry when the entry is deleted
    pub delete_attachments: bool,
}

impl Config {
    /// Detect configuration from environment
    ///
    /// # Errors
    ///
    /// Will return `Err` when `DELETE_ATTACHMENTS` is not a boolean
    pub fn from_env() -> Result<Self> {
        let storage = env_var("DATABASE_URL").map_or(StorageConfig::Memory, StorageConfig::Postgres);

        let delete_attachments = match env_var("DELETE_ATTACHMENTS") {
            None => false,
            Some(value) => match parse_flag(&value) {
                Some(flag) => flag,
                None => bail!("`DELETE_ATTACHMENTS` should be true or false, got: {value}"),
            },
        };

        Ok(Self {
            storage,
            upload_dir: env_var_or_else("UPLOAD_DIR", || DEFAULT_UPLOAD_DIR.into()).into(),
            public_dir: env_var_or_else("PUBLIC_DIR", || DEFAULT_PUBLIC_DIR.into()).into(),
            delete_attachments,
        })
    }
}
