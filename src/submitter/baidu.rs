//! Baidu push API adapter
//!
//! URLs are POSTed as a newline-separated `text/plain` body. When Baidu
//! rejects a multi-URL batch because the daily quota is exhausted, the batch
//! is retried one URL at a time so that whatever quota is left still gets
//! used. The fallback stops at the first transport error or repeated quota
//! rejection; every URL not attempted at that point is counted as failed.

use crate::config::BaiduConfig;
use crate::platform::Platform;
use crate::submitter::{SubmitFailure, SubmitResult, Submitter};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::HashSet;

/// Default base URL of the push API
pub const BAIDU_ENDPOINT: &str = "http://data.zz.baidu.com";

/// Substring of a 400 body that signals an exhausted daily quota
const OVER_QUOTA_MARKER: &str = "over quota";

/// Response body of a successful push
#[derive(Debug, Default, Deserialize)]
struct PushResponse {
    #[serde(default)]
    success: usize,
    #[serde(default)]
    remain: i64,
    #[serde(default)]
    not_same_site: Vec<String>,
    #[serde(default)]
    not_valid: Vec<String>,
}

/// Classified reply to one push request
#[derive(Debug)]
enum Reply {
    Accepted(PushResponse),
    OverQuota(String),
    Rejected { status: u16, body: String },
}

/// Submits URLs through Baidu's push API
pub struct BaiduSubmitter {
    client: Client,
    endpoint: String,
    site: String,
    token: String,
}

impl BaiduSubmitter {
    /// Creates a submitter for the site registered in `config`
    pub fn new(client: Client, config: &BaiduConfig) -> Self {
        Self {
            client,
            endpoint: BAIDU_ENDPOINT.to_string(),
            site: config.site.clone(),
            token: config.token.clone(),
        }
    }

    /// Points the submitter at a different base URL
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sends one push request and classifies the reply
    async fn push(&self, urls: &[String]) -> Result<Reply, SubmitFailure> {
        let response = self
            .client
            .post(format!("{}/urls", self.endpoint.trim_end_matches('/')))
            .query(&[("site", self.site.as_str()), ("token", self.token.as_str())])
            .header(CONTENT_TYPE, "text/plain")
            .body(urls.join("\n"))
            .send()
            .await
            .map_err(|e| SubmitFailure::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SubmitFailure::Transport(e.to_string()))?;

        if status == StatusCode::OK {
            match serde_json::from_str::<PushResponse>(&body) {
                Ok(parsed) => Ok(Reply::Accepted(parsed)),
                Err(e) => Err(SubmitFailure::Decode {
                    message: e.to_string(),
                    body,
                }),
            }
        } else if status == StatusCode::BAD_REQUEST && body.contains(OVER_QUOTA_MARKER) {
            Ok(Reply::OverQuota(body))
        } else {
            Ok(Reply::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }

    /// Builds the result of an accepted batch
    fn accepted(&self, urls: &[String], response: PushResponse) -> SubmitResult {
        tracing::debug!(
            "Baidu accepted {} of {} URLs, {} remaining today",
            response.success,
            urls.len(),
            response.remain
        );

        let mut result = SubmitResult::new(self.name(), urls.len());
        result.success_count = response.success.min(urls.len());
        result.failed_count = urls.len() - result.success_count;
        result.failed_urls = response.not_same_site;
        result.failed_urls.extend(response.not_valid);

        // Only trust the accepted set when the listed rejections explain
        // every failure; otherwise the accepted URLs are unknown.
        let rejected: HashSet<&str> = result.failed_urls.iter().map(String::as_str).collect();
        let remaining: Vec<String> = urls
            .iter()
            .filter(|url| !rejected.contains(url.as_str()))
            .cloned()
            .collect();
        if remaining.len() == result.success_count {
            result.succeeded_urls = remaining;
        } else {
            tracing::debug!(
                "Baidu reported {} successes but {} URLs were not rejected; not recording any",
                result.success_count,
                remaining.len()
            );
        }

        result
    }

    /// Resubmits each URL on its own after a batch hit the quota
    async fn submit_one_by_one(&self, urls: &[String]) -> SubmitResult {
        tracing::info!(
            "Baidu quota exceeded for a batch of {}, retrying one by one",
            urls.len()
        );

        let mut result = SubmitResult::new(self.name(), urls.len());
        let mut stopped_by = None;

        for (index, url) in urls.iter().enumerate() {
            match self.push(std::slice::from_ref(url)).await {
                Ok(Reply::Accepted(response)) if response.success > 0 => {
                    result.success_count += 1;
                    result.succeeded_urls.push(url.clone());
                }
                Ok(Reply::Accepted(_)) => {
                    result.failed_urls.push(url.clone());
                }
                Ok(Reply::Rejected { status, body }) => {
                    tracing::debug!("Baidu rejected {} with HTTP {}: {}", url, status, body);
                    result.failed_urls.push(url.clone());
                }
                Ok(Reply::OverQuota(body)) => {
                    result.failed_urls.extend_from_slice(&urls[index..]);
                    stopped_by = Some(SubmitFailure::QuotaExceeded { body });
                    break;
                }
                Err(failure) => {
                    result.failed_urls.extend_from_slice(&urls[index..]);
                    stopped_by = Some(failure);
                    break;
                }
            }
        }

        result.failed_count = result.failed_urls.len();
        if result.failed_count > 0 {
            result.error = Some(SubmitFailure::Degraded {
                succeeded: result.success_count,
                failed: result.failed_count,
                stopped_by: stopped_by.map(Box::new),
            });
        }
        result
    }
}

#[async_trait]
impl Submitter for BaiduSubmitter {
    async fn submit(&self, urls: &[String]) -> SubmitResult {
        if urls.is_empty() {
            return SubmitResult::new(self.name(), 0);
        }

        match self.push(urls).await {
            Ok(Reply::Accepted(response)) => self.accepted(urls, response),
            Ok(Reply::OverQuota(_)) if urls.len() > 1 => self.submit_one_by_one(urls).await,
            Ok(Reply::OverQuota(body)) => {
                SubmitResult::rejected(self.name(), urls, SubmitFailure::QuotaExceeded { body })
            }
            Ok(Reply::Rejected { status, body }) => {
                SubmitResult::rejected(self.name(), urls, SubmitFailure::Status { status, body })
            }
            Err(failure) => SubmitResult::rejected(self.name(), urls, failure),
        }
    }

    fn name(&self) -> &str {
        Platform::Baidu.label()
    }

    fn platform(&self) -> Platform {
        Platform::Baidu
    }
}
