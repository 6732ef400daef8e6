//! On-disk cache of resolved sitemaps
//!
//! Resolving a large sitemap index can take hundreds of requests, so the
//! flattened list is kept as JSON under `<data-dir>/sitemaps/` and reused
//! until it is older than the configured number of hours.

use crate::sitemap::SitemapUrl;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Upper bound for the cache age, keeps the `chrono::Duration` in range
const MAX_AGE_HOURS: u64 = 24 * 365 * 100;

/// A cached resolution result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedSitemap {
    /// The sitemap location that was resolved
    pub sitemap_url: String,

    /// When the sitemap was resolved
    pub fetched_at: DateTime<Utc>,

    /// The resolved page entries
    pub urls: Vec<SitemapUrl>,
}

impl CachedSitemap {
    /// Checks if the entry is older than `max_age`
    pub fn is_stale(&self, max_age: Duration) -> bool {
        Utc::now() - self.fetched_at > max_age
    }
}

/// File-per-sitemap cache keyed by the SHA-256 of the location
#[derive(Debug, Clone)]
pub struct SitemapCache {
    dir: PathBuf,
    max_age: Duration,
}

impl SitemapCache {
    /// Creates a cache in `dir`; `max_age_hours == 0` disables it
    pub fn new(dir: impl Into<PathBuf>, max_age_hours: u64) -> Self {
        Self {
            dir: dir.into(),
            max_age: Duration::hours(max_age_hours.min(MAX_AGE_HOURS) as i64),
        }
    }

    /// Returns true if entries can ever be served
    pub fn is_enabled(&self) -> bool {
        self.max_age > Duration::zero()
    }

    /// Returns the cached URLs for a sitemap if a fresh entry exists
    ///
    /// Missing, unreadable and corrupt entries are all treated as misses.
    pub fn get(&self, sitemap_url: &str) -> Option<Vec<SitemapUrl>> {
        if !self.is_enabled() {
            return None;
        }

        let path = self.path_for(sitemap_url);
        let content = std::fs::read_to_string(&path).ok()?;
        let cached: CachedSitemap = match serde_json::from_str(&content) {
            Ok(cached) => cached,
            Err(e) => {
                tracing::debug!("Ignoring corrupt sitemap cache {}: {}", path.display(), e);
                return None;
            }
        };

        if cached.sitemap_url != sitemap_url || cached.is_stale(self.max_age) {
            return None;
        }
        Some(cached.urls)
    }

    /// Stores a resolved list for a sitemap
    pub fn put(&self, sitemap_url: &str, urls: &[SitemapUrl]) -> std::io::Result<()> {
        self.store(sitemap_url, urls, Utc::now())
    }

    fn store(
        &self,
        sitemap_url: &str,
        urls: &[SitemapUrl],
        fetched_at: DateTime<Utc>,
    ) -> std::io::Result<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        let entry = CachedSitemap {
            sitemap_url: sitemap_url.to_string(),
            fetched_at,
            urls: urls.to_vec(),
        };
        let json = serde_json::to_vec(&entry)?;
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(sitemap_url), json)
    }

    /// Directory holding the cache files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, sitemap_url: &str) -> PathBuf {
        let digest = Sha256::digest(sitemap_url.as_bytes());
        self.dir.join(format!("{}.json", hex::encode(digest)))
    }
}
