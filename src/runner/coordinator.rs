//! Run coordinator - per-site submission pipeline
//!
//! For every configured site this module:
//! - Resolves the sitemap (through the on-disk cache)
//! - Loads the submission history of each enabled platform
//! - Filters out URLs already accepted and applies the daily quota
//! - Submits the rest in batches and records the accepted URLs
//!
//! Sites run concurrently up to the `concurrent` setting; platforms of one
//! site run one after another.

use crate::config::{Config, Settings, SiteConfig};
use crate::history::HistoryStore;
use crate::output::SubmitStats;
use crate::platform::Platform;
use crate::report::Reporter;
use crate::sitemap::{build_http_client, SitemapCache, SitemapResolver, SitemapResult, SitemapUrl};
use crate::submitter::{
    submit_all, BaiduSubmitter, IndexNowSubmitter, Submitter, BAIDU_ENDPOINT, INDEXNOW_ENDPOINT,
};
use crate::SubmitError;
use chrono::Utc;
use reqwest::Client;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Options for a single run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Resolve and filter, but submit nothing
    pub dry_run: bool,

    /// Ignore cached sitemaps
    pub refresh: bool,

    /// Restrict the run to these platforms (all enabled ones when `None`)
    pub platforms: Option<Vec<Platform>>,
}

impl RunOptions {
    fn allows(&self, platform: Platform) -> bool {
        self.platforms
            .as_ref()
            .map_or(true, |allowed| allowed.contains(&platform))
    }
}

/// Base URLs of the indexing APIs
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub baidu: String,
    pub indexnow: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            baidu: BAIDU_ENDPOINT.to_string(),
            indexnow: INDEXNOW_ENDPOINT.to_string(),
        }
    }
}

/// State shared by every site task of one run
struct Shared {
    settings: Settings,
    client: Client,
    history: Arc<HistoryStore>,
    cache: SitemapCache,
    reporter: Arc<dyn Reporter>,
    endpoints: Endpoints,
}

/// Main run coordinator
pub struct Coordinator {
    sites: Vec<SiteConfig>,
    settings: Settings,
    client: Client,
    history: Arc<HistoryStore>,
    cache: SitemapCache,
    reporter: Arc<dyn Reporter>,
    endpoints: Endpoints,
}

impl Coordinator {
    /// Creates a coordinator for a validated configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(SubmitError)` - The HTTP client could not be built
    pub fn new(config: Config, reporter: Arc<dyn Reporter>) -> Result<Self, SubmitError> {
        let settings = config.settings;
        let client = build_http_client(settings.timeout)?;
        let history = Arc::new(HistoryStore::new(settings.data_dir.clone()));
        let cache = SitemapCache::new(
            settings.data_dir.join("sitemaps"),
            settings.sitemap_cache_hours,
        );

        Ok(Self {
            sites: config.sites,
            settings,
            client,
            history,
            cache,
            reporter,
            endpoints: Endpoints::default(),
        })
    }

    /// Replaces the API endpoints (used to target mock servers)
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// API endpoints the next run submits to
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// The history store used by this coordinator
    pub fn history(&self) -> &Arc<HistoryStore> {
        &self.history
    }

    /// Runs every site and returns one stats entry per site/platform pass
    ///
    /// Entries come back in configuration order regardless of which site
    /// finishes first.
    pub async fn run(&self, options: &RunOptions) -> Vec<SubmitStats> {
        let shared = Arc::new(Shared {
            settings: self.settings.clone(),
            client: self.client.clone(),
            history: Arc::clone(&self.history),
            cache: self.cache.clone(),
            reporter: Arc::clone(&self.reporter),
            endpoints: self.endpoints.clone(),
        });
        let semaphore = Arc::new(Semaphore::new(self.settings.concurrent.max(1)));
        let mut tasks = JoinSet::new();

        for (index, site) in self.sites.iter().cloned().enumerate() {
            let shared = Arc::clone(&shared);
            let semaphore = Arc::clone(&semaphore);
            let options = options.clone();
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                (index, shared.process_site(&site, &options).await)
            });
        }

        let mut per_site = Vec::with_capacity(self.sites.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(entry) => per_site.push(entry),
                Err(e) => self.reporter.error("Site task failed", &e),
            }
        }

        per_site.sort_by_key(|(index, _)| *index);
        per_site.into_iter().flat_map(|(_, stats)| stats).collect()
    }
}

impl Shared {
    async fn process_site(&self, site: &SiteConfig, options: &RunOptions) -> Vec<SubmitStats> {
        tracing::info!("Processing site {} ({})", site.name, site.domain);

        let entries = match self.resolve_sitemap(site, options.refresh).await {
            Ok(entries) => entries,
            Err(e) => {
                self.reporter
                    .error(&format!("Failed to resolve sitemap for {}", site.name), &e);
                return Vec::new();
            }
        };
        let candidates = unique_locations(&entries);
        tracing::info!("{}: {} unique URLs in sitemap", site.name, candidates.len());

        let mut stats = Vec::new();
        for platform in site.enabled_platforms() {
            if options.allows(platform) {
                stats.push(
                    self.process_platform(site, platform, &candidates, options.dry_run)
                        .await,
                );
            }
        }
        stats
    }

    async fn resolve_sitemap(
        &self,
        site: &SiteConfig,
        refresh: bool,
    ) -> SitemapResult<Vec<SitemapUrl>> {
        if !refresh {
            if let Some(cached) = self.cache.get(&site.sitemap_url) {
                tracing::info!(
                    "{}: using cached sitemap ({} URLs)",
                    site.name,
                    cached.len()
                );
                return Ok(cached);
            }
        }

        let resolver = SitemapResolver::new(self.client.clone(), Arc::clone(&self.reporter));
        let entries = resolver.resolve(&site.sitemap_url).await?;

        if let Err(e) = self.cache.put(&site.sitemap_url, &entries) {
            self.reporter.error(
                &format!("Failed to cache sitemap {}", site.sitemap_url),
                &e,
            );
        }
        Ok(entries)
    }

    async fn process_platform(
        &self,
        site: &SiteConfig,
        platform: Platform,
        candidates: &[String],
        dry_run: bool,
    ) -> SubmitStats {
        let label = platform.label();
        let mut stats = SubmitStats::new(&site.name, platform);
        stats.candidate_count = candidates.len();

        match self.history.load(&site.domain, platform) {
            Ok(count) => self.reporter.history_loaded(&site.name, label, count),
            Err(e) => {
                self.reporter.error(
                    &format!("Failed to load {} history for {}", label, site.name),
                    &e,
                );
                stats.error = Some(e.to_string());
                return stats;
            }
        }

        let pending = self
            .history
            .filter_unsubmitted(&site.domain, platform, candidates);
        self.reporter
            .urls_filtered(&site.name, label, candidates.len(), pending.len());
        stats.pending_count = pending.len();

        let quota = site.quota(platform);
        if pending.len() > quota {
            tracing::info!(
                "{} / {}: {} pending URLs, submitting the first {} (daily quota)",
                site.name,
                label,
                pending.len(),
                quota
            );
        }
        let batch: Vec<String> = pending.into_iter().take(quota).collect();
        stats.submitted_count = batch.len();

        if batch.is_empty() || dry_run {
            stats.history_count = self.history.count(&site.domain, platform);
            return stats;
        }

        let submitter = self.submitter_for(site, platform);
        self.reporter
            .submit_started(&site.name, label, batch.len());
        let result = submit_all(submitter.as_ref(), &batch, self.settings.batch_size).await;
        self.reporter.submit_finished(&site.name, label, &result);

        stats.success_count = result.success_count;
        stats.failed_count = result.failed_count;
        stats.error = result.error.as_ref().map(ToString::to_string);

        if let Err(e) = self
            .history
            .save(&site.domain, platform, &result.succeeded_urls)
        {
            self.reporter.error(
                &format!("Failed to record {} history for {}", label, site.name),
                &e,
            );
            stats.error.get_or_insert_with(|| e.to_string());
        }

        stats.history_count = self.history.count(&site.domain, platform);
        stats.timestamp = Utc::now();
        stats
    }

    fn submitter_for(&self, site: &SiteConfig, platform: Platform) -> Box<dyn Submitter> {
        match platform {
            Platform::Baidu => Box::new(
                BaiduSubmitter::new(self.client.clone(), &site.api.baidu)
                    .with_endpoint(&self.endpoints.baidu),
            ),
            Platform::Bing => Box::new(
                IndexNowSubmitter::new(self.client.clone(), platform, &site.api.bing)
                    .with_endpoint(&self.endpoints.indexnow),
            ),
            Platform::Google => Box::new(
                IndexNowSubmitter::new(self.client.clone(), platform, &site.api.google)
                    .with_endpoint(&self.endpoints.indexnow),
            ),
        }
    }
}

/// Page locations in sitemap order, without blanks or repeats
fn unique_locations(entries: &[SitemapUrl]) -> Vec<String> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .map(|entry| entry.loc.as_str())
        .filter(|loc| !loc.is_empty() && seen.insert(*loc))
        .map(str::to_string)
        .collect()
}
