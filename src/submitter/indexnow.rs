//! IndexNow adapter
//!
//! Bing and Google share the IndexNow protocol; one submitter type covers
//! both and only differs in platform label, host and key. IndexNow accepts
//! or rejects a request as a whole, so there is no partial success.

use crate::config::IndexNowConfig;
use crate::platform::Platform;
use crate::submitter::{SubmitFailure, SubmitResult, Submitter};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde::Serialize;

/// Shared public IndexNow endpoint
pub const INDEXNOW_ENDPOINT: &str = "https://api.indexnow.org/indexnow";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IndexNowRequest<'a> {
    host: &'a str,
    key: &'a str,
    key_location: &'a str,
    url_list: &'a [String],
}

/// Submits URLs through the IndexNow protocol
pub struct IndexNowSubmitter {
    client: Client,
    platform: Platform,
    endpoint: String,
    host: String,
    key: String,
    key_location: String,
}

impl IndexNowSubmitter {
    /// Creates a submitter for `platform` with the given credentials
    ///
    /// The key location defaults to `https://{host}/{key}.txt`.
    pub fn new(client: Client, platform: Platform, config: &IndexNowConfig) -> Self {
        let key_location = if config.key_location.is_empty() {
            format!("https://{}/{}.txt", config.host, config.api_key)
        } else {
            config.key_location.clone()
        };

        Self {
            client,
            platform,
            endpoint: INDEXNOW_ENDPOINT.to_string(),
            host: config.host.clone(),
            key: config.api_key.clone(),
            key_location,
        }
    }

    /// Points the submitter at a different endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Location the search engine fetches to verify the key
    pub fn key_location(&self) -> &str {
        &self.key_location
    }

    fn key_preview(&self) -> String {
        match self.key.char_indices().nth(8) {
            Some((cut, _)) => format!("{}***", &self.key[..cut]),
            None => self.key.clone(),
        }
    }
}

#[async_trait]
impl Submitter for IndexNowSubmitter {
    async fn submit(&self, urls: &[String]) -> SubmitResult {
        if urls.is_empty() {
            return SubmitResult::new(self.name(), 0);
        }

        let request = IndexNowRequest {
            host: &self.host,
            key: &self.key,
            key_location: &self.key_location,
            url_list: urls,
        };
        let body = match serde_json::to_vec(&request) {
            Ok(body) => body,
            Err(e) => {
                return SubmitResult::rejected(
                    self.name(),
                    urls,
                    SubmitFailure::Transport(format!("failed to encode request: {}", e)),
                )
            }
        };

        tracing::debug!(
            endpoint = %self.endpoint,
            host = %self.host,
            key = %self.key_preview(),
            key_location = %self.key_location,
            count = urls.len(),
            "Sending IndexNow request"
        );

        let response = match self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json; charset=utf-8")
            .body(body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                return SubmitResult::rejected(
                    self.name(),
                    urls,
                    SubmitFailure::Transport(e.to_string()),
                )
            }
        };

        let status = response.status();
        if status == StatusCode::OK || status == StatusCode::ACCEPTED {
            return SubmitResult::accepted(self.name(), urls);
        }

        let body = response.text().await.unwrap_or_default();
        SubmitResult::rejected(
            self.name(),
            urls,
            SubmitFailure::Status {
                status: status.as_u16(),
                body,
            },
        )
    }

    fn name(&self) -> &str {
        self.platform.label()
    }

    fn platform(&self) -> Platform {
        self.platform
    }
}
