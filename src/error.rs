//! Typed errors for the scout library.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a query build, a store operation or a sync cycle.
#[derive(Debug, Error)]
pub enum ScoutError {
    /// Search criteria out of range
    #[error("invalid search criteria: {reason}")]
    InvalidCriteria { reason: String },

    /// Transport failure talking to the listing site
    #[error("fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    /// Directory or file access on the listing store failed
    #[error("store I/O error on {path}: {source}")]
    StoreIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A persisted store file could not be decoded or encoded
    #[error("malformed store file {path}: {source}")]
    MalformedStoreFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// `append` called for a url the store already holds
    #[error("listing already stored: {url}")]
    DuplicateKey { url: String },

    /// Last entry date asked of a store with no records
    #[error("listing store is empty")]
    EmptyStore,

    /// A CSS selector failed to compile
    #[error("invalid selector: {0}")]
    Selector(String),

    #[error("config error: {0}")]
    Config(String),
}

impl ScoutError {
    pub(crate) fn store_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::StoreIo {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScoutError>;
