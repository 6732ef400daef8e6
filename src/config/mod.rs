//! Configuration module for Sitemap-Submit
//!
//! This module handles loading, parsing, validating and defaulting TOML
//! configuration, either from a single file or from a directory of files.
//!
//! # Example
//!
//! ```no_run
//! use sitemap_submit::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sites.toml")).unwrap();
//! println!("Submitting {} sites", config.sites.len());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ApiConfig, BaiduConfig, Config, IndexNowConfig, QuotaConfig, Settings, SiteConfig,
};

// Re-export parser functions
pub use parser::{load, load_config, load_config_dir, parse_config};
