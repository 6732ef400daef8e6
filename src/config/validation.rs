use crate::config::types::{Config, IndexNowConfig, SiteConfig};
use crate::history::check_domain;
use crate::platform::Platform;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.sites.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[site]] must be configured".to_string(),
        ));
    }

    for (index, site) in config.sites.iter().enumerate() {
        validate_site(index + 1, site)?;
    }

    Ok(())
}

/// Validates a single site entry (`position` is 1-based for messages)
fn validate_site(position: usize, site: &SiteConfig) -> Result<(), ConfigError> {
    if site.domain.trim().is_empty() {
        return Err(ConfigError::Validation(format!(
            "site #{}: domain cannot be empty",
            position
        )));
    }

    check_domain(&site.domain)
        .map_err(|e| ConfigError::Validation(format!("site #{}: {}", position, e)))?;

    validate_http_url(&site.sitemap_url).map_err(|e| {
        ConfigError::InvalidUrl(format!(
            "site #{} ({}): sitemap-url '{}': {}",
            position, site.domain, site.sitemap_url, e
        ))
    })?;

    let enabled = site.enabled_platforms();
    if enabled.is_empty() {
        return Err(ConfigError::Validation(format!(
            "site #{} ({}): at least one platform quota must be greater than zero",
            position, site.domain
        )));
    }

    for platform in enabled {
        match platform {
            Platform::Baidu => {
                if site.api.baidu.token.is_empty() || site.api.baidu.site.is_empty() {
                    return Err(ConfigError::Validation(format!(
                        "site #{} ({}): baidu quota is set but api.baidu token/site are missing",
                        position, site.domain
                    )));
                }
            }
            Platform::Bing => validate_indexnow(position, site, platform, &site.api.bing)?,
            Platform::Google => validate_indexnow(position, site, platform, &site.api.google)?,
        }
    }

    Ok(())
}

fn validate_indexnow(
    position: usize,
    site: &SiteConfig,
    platform: Platform,
    config: &IndexNowConfig,
) -> Result<(), ConfigError> {
    if config.api_key.is_empty() {
        return Err(ConfigError::Validation(format!(
            "site #{} ({}): {} quota is set but api.{}.api-key is missing",
            position,
            site.domain,
            platform.as_str(),
            platform.as_str()
        )));
    }

    if !config.key_location.is_empty() {
        validate_http_url(&config.key_location).map_err(|e| {
            ConfigError::InvalidUrl(format!(
                "site #{} ({}): key-location '{}': {}",
                position, site.domain, config.key_location, e
            ))
        })?;
    }

    Ok(())
}

/// Checks that a string is an absolute http(s) URL
fn validate_http_url(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("unsupported scheme '{}'", other)),
    }
}
