//! Sitemap-Submit: push sitemap URLs to search-engine indexing APIs
//!
//! This crate resolves a site's sitemap (following sitemap indexes), filters
//! out URLs that were already accepted by a platform, and submits the rest
//! to Baidu's push API and to IndexNow endpoints in quota-sized batches.

pub mod config;
pub mod history;
pub mod output;
pub mod platform;
pub mod report;
pub mod runner;
pub mod sitemap;
pub mod submitter;

use std::path::PathBuf;
use thiserror::Error;

/// User agent sent with every outgoing request
pub const USER_AGENT: &str = "Submit-Sitemap-Bot/1.0";

/// Main error type for Sitemap-Submit operations
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Sitemap error: {0}")]
    Sitemap(#[from] sitemap::SitemapError),

    #[error("History error: {0}")]
    History(#[from] history::HistoryError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

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

    #[error("Config path does not exist: {0}")]
    NotFound(PathBuf),

    #[error("No .toml files found in {0}")]
    Empty(PathBuf),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Sitemap-Submit operations
pub type Result<T> = std::result::Result<T, SubmitError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use history::HistoryStore;
pub use platform::Platform;
pub use report::{Reporter, TracingReporter};
pub use sitemap::{SitemapResolver, SitemapUrl};
pub use submitter::{SubmitFailure, SubmitResult, Submitter};
