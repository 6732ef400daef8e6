//! Indexing platforms known to the submitter

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// A search-engine indexing platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Baidu,
    Bing,
    Google,
}

impl Platform {
    /// All platforms, in submission order
    pub const ALL: [Platform; 3] = [Platform::Baidu, Platform::Bing, Platform::Google];

    /// Stable key used for history file names
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Baidu => "baidu",
            Self::Bing => "bing",
            Self::Google => "google",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Baidu => "Baidu",
            Self::Bing => "Bing",
            Self::Google => "Google",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "baidu" => Ok(Self::Baidu),
            "bing" => Ok(Self::Bing),
            "google" => Ok(Self::Google),
            other => Err(format!("unknown platform '{}'", other)),
        }
    }
}
