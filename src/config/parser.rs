use crate::config::types::{Config, Settings};
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::{Path, PathBuf};

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONCURRENT: usize = 3;
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_BATCH_SIZE: usize = 100;

/// Loads configuration from a file or from every `.toml` file in a directory
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    if path.is_dir() {
        load_config_dir(path)
    } else {
        load_config(path)
    }
}

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded, validated and defaulted configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses, validates and applies defaults to TOML configuration text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let mut config: Config = toml::from_str(content)?;
    validate(&config)?;
    apply_defaults(&mut config);
    Ok(config)
}

/// Loads every `.toml` file below `dir` and merges their sites
///
/// Each file contributes its `[[site]]` entries. The first `[settings]`
/// table found (in path order) applies to all sites.
pub fn load_config_dir(dir: &Path) -> Result<Config, ConfigError> {
    let mut files = Vec::new();
    collect_toml_files(dir, &mut files)?;
    if files.is_empty() {
        return Err(ConfigError::Empty(dir.to_path_buf()));
    }
    files.sort();

    let mut sites = Vec::new();
    let mut settings: Option<Settings> = None;

    for file in &files {
        let content = std::fs::read_to_string(file)?;
        let partial: PartialConfig = toml::from_str(&content)?;
        tracing::debug!(
            "Loaded {} site(s) from {}",
            partial.sites.len(),
            file.display()
        );
        sites.extend(partial.sites);
        if settings.is_none() {
            settings = partial.settings;
        }
    }

    let mut config = Config {
        settings: settings.unwrap_or_default(),
        sites,
    };
    validate(&config)?;
    apply_defaults(&mut config);
    Ok(config)
}

/// A single file of a configuration directory, where settings are optional
#[derive(serde::Deserialize)]
struct PartialConfig {
    settings: Option<Settings>,
    #[serde(default, rename = "site")]
    sites: Vec<crate::config::SiteConfig>,
}

fn collect_toml_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), ConfigError> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_toml_files(&path, out)?;
        } else if path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("toml"))
        {
            out.push(path);
        }
    }
    Ok(())
}

/// Fills unset settings and derived site fields
fn apply_defaults(config: &mut Config) {
    let settings = &mut config.settings;
    if settings.timeout == 0 {
        settings.timeout = DEFAULT_TIMEOUT_SECS;
    }
    if settings.concurrent == 0 {
        settings.concurrent = DEFAULT_CONCURRENT;
    }
    if settings.log_level.is_empty() {
        settings.log_level = DEFAULT_LOG_LEVEL.to_string();
    }
    if settings.batch_size == 0 {
        settings.batch_size = DEFAULT_BATCH_SIZE;
    }

    for site in &mut config.sites {
        if site.name.is_empty() {
            site.name = site.domain.clone();
        }
        for indexnow in [&mut site.api.bing, &mut site.api.google] {
            if indexnow.host.is_empty() {
                indexnow.host = site.domain.clone();
            }
        }
    }
}
