//! Recursive sitemap resolution

use crate::report::Reporter;
use crate::sitemap::{
    fetch_document, parse_document, SitemapDocument, SitemapError, SitemapResult, SitemapUrl,
};
use reqwest::Client;
use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

type ResolveFuture<'a> = Pin<Box<dyn Future<Output = SitemapResult<Vec<SitemapUrl>>> + Send + 'a>>;

/// Turns a sitemap location into the flat list of pages it describes
///
/// Sitemap indexes are followed depth-first, so results come out in child
/// order, then document order. A child that fails is reported and skipped;
/// only failures of the top-level document are returned as errors. Each
/// location is fetched at most once per call, which stops self-referencing
/// indexes.
pub struct SitemapResolver {
    client: Client,
    reporter: Arc<dyn Reporter>,
}

impl SitemapResolver {
    /// Creates a resolver using a shared HTTP client
    pub fn new(client: Client, reporter: Arc<dyn Reporter>) -> Self {
        Self { client, reporter }
    }

    /// Resolves `sitemap_url` and every sitemap it references
    pub async fn resolve(&self, sitemap_url: &str) -> SitemapResult<Vec<SitemapUrl>> {
        let mut visited = HashSet::new();
        visited.insert(sitemap_url.to_string());
        self.resolve_document(sitemap_url, &mut visited).await
    }

    fn resolve_document<'a>(
        &'a self,
        url: &'a str,
        visited: &'a mut HashSet<String>,
    ) -> ResolveFuture<'a> {
        Box::pin(async move {
            tracing::debug!("Fetching sitemap {}", url);
            let body = fetch_document(&self.client, url).await?;
            let document = parse_document(&body).map_err(|message| SitemapError::Parse {
                url: url.to_string(),
                message,
            })?;

            match document {
                SitemapDocument::UrlSet(urls) => {
                    self.reporter.sitemap_parsed(url, urls.len());
                    Ok(urls)
                }
                SitemapDocument::Index(children) if !children.is_empty() => {
                    tracing::debug!("{} is an index of {} sitemaps", url, children.len());
                    let mut urls = Vec::new();
                    for child in &children {
                        if !visited.insert(child.clone()) {
                            self.reporter.sitemap_skipped(child, &"already visited");
                            continue;
                        }
                        match self.resolve_document(child, visited).await {
                            Ok(found) => urls.extend(found),
                            Err(e) => self.reporter.sitemap_skipped(child, &e),
                        }
                    }
                    self.reporter.sitemap_parsed(url, urls.len());
                    Ok(urls)
                }
                SitemapDocument::Index(_) => Err(SitemapError::Parse {
                    url: url.to_string(),
                    message: "sitemap index lists no sitemaps".to_string(),
                }),
            }
        })
    }
}
