//! HTTP fetching of sitemap documents

use crate::sitemap::{SitemapError, SitemapResult};
use crate::USER_AGENT;
use flate2::read::GzDecoder;
use reqwest::header::CONTENT_ENCODING;
use reqwest::{Client, StatusCode};
use std::io::Read;
use std::time::Duration;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Builds the HTTP client shared by the resolver and the submitters
///
/// `timeout_secs` bounds each whole request/response exchange.
///
/// # Example
///
/// ```no_run
/// use sitemap_submit::sitemap::build_http_client;
///
/// let client = build_http_client(30).unwrap();
/// ```
pub fn build_http_client(timeout_secs: u64) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a sitemap document and returns its decoded bytes
///
/// The body is gunzipped when the URL ends in `.gz` or the response declares
/// `Content-Encoding: gzip`, unless the client already decoded it.
pub async fn fetch_document(client: &Client, url: &str) -> SitemapResult<Vec<u8>> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| SitemapError::Fetch {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(SitemapError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let declared_gzip = response
        .headers()
        .get(CONTENT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("gzip"));

    let body = response
        .bytes()
        .await
        .map_err(|source| SitemapError::Fetch {
            url: url.to_string(),
            source,
        })?;

    if declared_gzip || url.ends_with(".gz") {
        gunzip(url, &body)
    } else {
        Ok(body.to_vec())
    }
}

/// Decompresses a gzip body; bodies without the gzip magic pass through
fn gunzip(url: &str, bytes: &[u8]) -> SitemapResult<Vec<u8>> {
    if !bytes.starts_with(&GZIP_MAGIC) {
        return Ok(bytes.to_vec());
    }

    let mut decoder = GzDecoder::new(bytes);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|source| SitemapError::Decompress {
            url: url.to_string(),
            source,
        })?;
    Ok(out)
}
