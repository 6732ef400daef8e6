//! Run orchestration
//!
//! [`Coordinator`] drives a submission run; the helpers here back the
//! `--stats` and `--reset` commands, which only touch the history.

mod coordinator;

pub use coordinator::{Coordinator, Endpoints, RunOptions};

use crate::config::Config;
use crate::history::{HistoryResult, HistoryStore};
use crate::output::HistoryCount;
use crate::platform::Platform;

/// Number of recorded URLs for every configured site and platform
pub fn history_overview(config: &Config) -> HistoryResult<Vec<HistoryCount>> {
    let store = HistoryStore::new(config.settings.data_dir.clone());
    let mut counts = Vec::new();

    for site in &config.sites {
        for platform in Platform::ALL {
            let count = store.load(&site.domain, platform)?;
            counts.push(HistoryCount {
                site: site.name.clone(),
                domain: site.domain.clone(),
                platform,
                count,
            });
        }
    }
    Ok(counts)
}

/// Deletes the history of one domain, or of every configured site
///
/// Returns the domains that were reset.
pub fn reset_history(config: &Config, domain: Option<&str>) -> HistoryResult<Vec<String>> {
    let store = HistoryStore::new(config.settings.data_dir.clone());
    let domains: Vec<String> = match domain {
        Some(domain) => vec![domain.to_string()],
        None => config.sites.iter().map(|s| s.domain.clone()).collect(),
    };

    for domain in &domains {
        store.reset(domain)?;
        tracing::info!("Reset submission history for {}", domain);
    }
    Ok(domains)
}
