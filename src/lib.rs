//! Sumi-Fetch: a concurrent batch URL fetcher
//!
//! This crate validates a batch of URLs, fetches them over a bounded pool of
//! workers, and reports exactly one typed outcome per submitted URL.

pub mod config;
pub mod fetcher;
pub mod output;
pub mod pool;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Sumi-Fetch operations
///
/// Per-URL failures are never reported through this type; they are
/// [`state::FetchOutcome::Failure`] values inside a batch.
#[derive(Debug, Error)]
pub enum SumiError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Concurrency must be at least 1, got {0}")]
    InvalidConcurrency(usize),

    #[error("Batch incomplete: {received} of {submitted} records collected")]
    IncompleteBatch { received: usize, submitted: usize },
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

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Errors raised by an [`fetcher::HttpClient`] before a response exists
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("bad request URL: {0}")]
    Url(#[from] UrlError),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for Sumi-Fetch operations
pub type Result<T> = std::result::Result<T, SumiError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use fetcher::{Fetcher, HttpClient, HttpResponse, ReqwestClient};
pub use pool::{aggregate, BatchReport, BatchStream, WorkerPool, WorkerReport};
pub use state::{FailureKind, FetchFailure, FetchOutcome, Page, ResultRecord};
pub use crate::url::{default_validator, UrlValidator};
