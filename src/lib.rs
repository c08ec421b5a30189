//! Geomirror: a mirror for hierarchically organized open-data portals
//!
//! This crate mirrors remote repositories exposed as plain HTTP directory
//! listings onto local storage, preserving the remote path structure, and
//! supports safe interruption and resumption of multi-hour transfers via a
//! persistent completion log.

pub mod config;
pub mod crawl;
pub mod journal;
pub mod listing;
pub mod manifest;
pub mod output;
pub mod url;

use thiserror::Error;

/// Main error type for mirror operations
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Completion log error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Manifest-specific errors
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to read manifest: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse manifest row: {0}")]
    Csv(#[from] csv::Error),

    #[error("Manifest is missing the required '{0}' column")]
    MissingColumn(&'static str),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(#[from] ::url::ParseError),

    #[error("URL has no host: {0}")]
    MissingHost(String),
}

/// Result type alias for mirror operations
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for manifest operations
pub type ManifestResult<T> = std::result::Result<T, ManifestError>;

// Re-export commonly used types
pub use config::Config;
pub use crawl::{DownloadTask, Mirror, MirrorOptions, Outcome, TaskCounts};
pub use journal::CompletionLog;
pub use listing::{HtmlListing, ListingClassifier};
pub use manifest::{load_manifest, Manifest, ManifestRow};
pub use output::RunSummary;
