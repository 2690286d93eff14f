use std::path::PathBuf;

use thiserror::Error;

/// Errors from loading configuration and reading or writing the task store.
///
/// Rendering never fails and has no variant here.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Malformed task store at {path}: {source}")]
    StoreParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to encode tasks: {0}")]
    StoreEncode(#[source] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
