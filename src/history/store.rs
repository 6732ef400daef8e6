//! File-backed history store
//!
//! The in-memory cache is the read path; files are only read by
//! [`HistoryStore::load`]. One `RwLock` guards the whole
//! domain → platform → URL-set map.

use crate::history::{check_domain, HistoryError, HistoryResult};
use crate::platform::Platform;
use std::collections::{HashMap, HashSet};
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

type PlatformSets = HashMap<Platform, HashSet<String>>;

/// Previously accepted URLs per (domain, platform)
#[derive(Debug)]
pub struct HistoryStore {
    data_dir: PathBuf,
    cache: RwLock<HashMap<String, PlatformSets>>,
}

impl HistoryStore {
    /// Creates a store rooted at `data_dir`; nothing is read until [`load`](Self::load)
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Root directory of the store
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Replaces the cached set for a pair with the contents of its file
    ///
    /// A missing file yields an empty set. Returns the number of URLs loaded.
    pub fn load(&self, domain: &str, platform: Platform) -> HistoryResult<usize> {
        let path = self.file_path(domain, platform)?;
        let urls = read_url_file(&path)?;
        let count = urls.len();

        self.write()
            .entry(domain.to_string())
            .or_default()
            .insert(platform, urls);

        tracing::debug!("Loaded {} history entries from {}", count, path.display());
        Ok(count)
    }

    /// Checks the cache for a URL; never touches disk
    pub fn is_submitted(&self, domain: &str, platform: Platform, url: &str) -> bool {
        let cache = self.read();
        contains(&cache, domain, platform, url)
    }

    /// Returns `urls` minus those already submitted, keeping their order
    pub fn filter_unsubmitted(
        &self,
        domain: &str,
        platform: Platform,
        urls: &[String],
    ) -> Vec<String> {
        let cache = self.read();
        urls.iter()
            .filter(|url| !contains(&cache, domain, platform, url))
            .cloned()
            .collect()
    }

    /// Appends URLs to the pair's file and adds them to the cache
    ///
    /// URLs appended before a failure stay on disk and in the cache.
    pub fn save(&self, domain: &str, platform: Platform, urls: &[String]) -> HistoryResult<()> {
        if urls.is_empty() {
            return Ok(());
        }

        let path = self.file_path(domain, platform)?;
        let mut cache = self.write();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| HistoryError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| HistoryError::Write {
                path: path.clone(),
                source,
            })?;

        let set = cache
            .entry(domain.to_string())
            .or_default()
            .entry(platform)
            .or_default();

        for url in urls {
            file.write_all(format!("{}\n", url).as_bytes())
                .map_err(|source| HistoryError::Write {
                    path: path.clone(),
                    source,
                })?;
            set.insert(url.clone());
        }

        Ok(())
    }

    /// Deletes all history of a domain, on disk and in memory
    ///
    /// Fails with [`HistoryError::InvalidDomain`] for names that would
    /// escape the history directory.
    pub fn reset(&self, domain: &str) -> HistoryResult<()> {
        let dir = self.domain_dir(domain)?;
        let mut cache = self.write();

        match fs::remove_dir_all(&dir) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(source) => return Err(HistoryError::Remove { path: dir, source }),
        }

        cache.remove(domain);
        Ok(())
    }

    /// Number of cached URLs for a pair, 0 when not loaded
    pub fn count(&self, domain: &str, platform: Platform) -> usize {
        self.read()
            .get(domain)
            .and_then(|platforms| platforms.get(&platform))
            .map_or(0, HashSet::len)
    }

    fn domain_dir(&self, domain: &str) -> HistoryResult<PathBuf> {
        check_domain(domain)?;
        Ok(self.data_dir.join("submitted").join(domain))
    }

    fn file_path(&self, domain: &str, platform: Platform) -> HistoryResult<PathBuf> {
        Ok(self
            .domain_dir(domain)?
            .join(format!("{}.txt", platform.as_str())))
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, PlatformSets>> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, PlatformSets>> {
        self.cache.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn contains(
    cache: &HashMap<String, PlatformSets>,
    domain: &str,
    platform: Platform,
    url: &str,
) -> bool {
    cache
        .get(domain)
        .and_then(|platforms| platforms.get(&platform))
        .is_some_and(|set| set.contains(url))
}

fn read_url_file(path: &Path) -> HistoryResult<HashSet<String>> {
    let file = match fs::File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(HashSet::new()),
        Err(source) => {
            return Err(HistoryError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let mut urls = HashSet::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|source| HistoryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if !line.is_empty() {
            urls.insert(line);
        }
    }
    Ok(urls)
}
