//! Sitemap module for discovering page URLs
//!
//! This module contains everything needed to turn a sitemap location into a
//! flat list of page URLs:
//! - HTTP fetching with transparent gzip decoding
//! - XML parsing of `<urlset>` and `<sitemapindex>` documents
//! - Recursive resolution of sitemap indexes
//! - An on-disk cache of resolved lists

pub mod cache;
mod fetcher;
mod parser;
mod resolver;

pub use cache::SitemapCache;
pub use fetcher::{build_http_client, fetch_document};
pub use parser::{parse_document, SitemapDocument};
pub use resolver::SitemapResolver;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A page entry of a `<urlset>` document
///
/// Values are kept exactly as written in the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SitemapUrl {
    pub loc: String,
    pub last_modified: String,
    pub change_frequency: String,
    pub priority: String,
}

impl SitemapUrl {
    /// Creates an entry with only a location
    pub fn new(loc: impl Into<String>) -> Self {
        Self {
            loc: loc.into(),
            ..Default::default()
        }
    }
}

/// Errors that can occur while resolving a sitemap
#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("Failed to fetch sitemap {url}: {source}")]
    Fetch { url: String, source: reqwest::Error },

    #[error("Sitemap {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to decompress sitemap {url}: {source}")]
    Decompress {
        url: String,
        source: std::io::Error,
    },

    #[error("Failed to parse sitemap {url}: {message}")]
    Parse { url: String, message: String },
}

/// Result type for sitemap operations
pub type SitemapResult<T> = Result<T, SitemapError>;
