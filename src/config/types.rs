use crate::platform::Platform;
use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure for Sitemap-Submit
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default, rename = "site")]
    pub sites: Vec<SiteConfig>,
}

/// Global settings shared by every site
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Directory holding submission history and the sitemap cache
    #[serde(rename = "data-dir", default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// How long a resolved sitemap stays fresh (hours, 0 disables caching)
    #[serde(rename = "sitemap-cache-hours", default = "default_cache_hours")]
    pub sitemap_cache_hours: u64,

    /// Per-request timeout in seconds
    #[serde(default)]
    pub timeout: u64,

    /// Number of sites processed at the same time
    #[serde(default)]
    pub concurrent: usize,

    /// Log level used when no verbosity flag is given
    #[serde(rename = "log-level", default)]
    pub log_level: String,

    /// Maximum number of URLs per API request
    #[serde(rename = "batch-size", default)]
    pub batch_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            sitemap_cache_hours: default_cache_hours(),
            timeout: 0,
            concurrent: 0,
            log_level: String::new(),
            batch_size: 0,
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_cache_hours() -> u64 {
    168
}

/// A single site to submit
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Display name, defaults to the domain
    #[serde(default)]
    pub name: String,

    /// Domain used as the history key (e.g. "example.com")
    pub domain: String,

    /// Entry point of the sitemap tree
    #[serde(rename = "sitemap-url")]
    pub sitemap_url: String,

    #[serde(default)]
    pub quotas: QuotaConfig,

    #[serde(default)]
    pub api: ApiConfig,
}

impl SiteConfig {
    /// Daily quota for a platform, 0 when the platform is disabled
    pub fn quota(&self, platform: Platform) -> usize {
        match platform {
            Platform::Baidu => self.quotas.baidu,
            Platform::Bing => self.quotas.bing,
            Platform::Google => self.quotas.google,
        }
    }

    /// Platforms with a non-zero quota, in submission order
    pub fn enabled_platforms(&self) -> Vec<Platform> {
        Platform::ALL
            .into_iter()
            .filter(|p| self.quota(*p) > 0)
            .collect()
    }
}

/// Daily submission quota per platform
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuotaConfig {
    #[serde(default)]
    pub baidu: usize,
    #[serde(default)]
    pub bing: usize,
    #[serde(default)]
    pub google: usize,
}

/// Credentials per platform
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub baidu: BaiduConfig,
    #[serde(default)]
    pub bing: IndexNowConfig,
    #[serde(default)]
    pub google: IndexNowConfig,
}

/// Baidu push API credentials
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BaiduConfig {
    #[serde(default)]
    pub token: String,
    /// Site identifier as registered with Baidu (e.g. "https://www.example.com")
    #[serde(default)]
    pub site: String,
}

/// IndexNow credentials
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexNowConfig {
    #[serde(rename = "api-key", default)]
    pub api_key: String,
    /// Host the URLs belong to, defaults to the site domain
    #[serde(default)]
    pub host: String,
    /// Where the key file is published, defaults to https://{host}/{key}.txt
    #[serde(rename = "key-location", default)]
    pub key_location: String,
}
