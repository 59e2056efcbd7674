use serde::Deserialize;
use std::time::Duration;

use crate::services::search::SearchSettings;

/// Application configuration loaded from `MOVIE_SEARCH_*` environment variables
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Search endpoint, without query string
    #[serde(default = "default_search_endpoint")]
    pub search_endpoint: String,

    /// Media filter sent with every search
    #[serde(default = "default_media")]
    pub media: String,

    /// Result-count ceiling sent with every search
    #[serde(default = "default_limit")]
    pub limit: u32,

    /// Per-request timeout, applies to searches and thumbnails
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// User-Agent header for outgoing requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_search_endpoint() -> String {
    "https://itunes.apple.com/search".to_string()
}

fn default_media() -> String {
    "movie".to_string()
}

fn default_limit() -> u32 {
    100
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    concat!("movie-search/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_endpoint: default_search_endpoint(),
            media: default_media(),
            limit: default_limit(),
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from an explicit set of variables
    pub fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::prefixed("MOVIE_SEARCH_")
            .from_iter::<_, Config>(vars)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn search_settings(&self) -> SearchSettings {
        SearchSettings {
            endpoint: self.search_endpoint.clone(),
            media: self.media.clone(),
            limit: self.limit,
        }
    }
}
