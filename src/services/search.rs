//! Movie search client
//!
//! Builds `<endpoint>?media=..&term=..&limit=..`, fetches it through the
//! injected [`Transport`] and decodes the payload into [`MovieRecord`]s.

use std::sync::Arc;

use tokio::sync::oneshot;
use tracing::instrument;
use url::Url;

use crate::{
    error::{AppResult, SearchError},
    models::{MovieRecord, SearchResult},
    services::{query::EncodedQuery, transport::Transport},
};

const DEFAULT_ENDPOINT: &str = "https://itunes.apple.com/search";
const DEFAULT_MEDIA: &str = "movie";
const DEFAULT_LIMIT: u32 = 100;

/// Fixed per-client request parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSettings {
    pub endpoint: String,
    pub media: String,
    pub limit: u32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            media: DEFAULT_MEDIA.to_string(),
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Stateless search client
///
/// Holds configuration and a shared transport only, so clones can run
/// overlapping searches without interfering with each other.
#[derive(Clone)]
pub struct SearchClient {
    settings: SearchSettings,
    transport: Arc<dyn Transport>,
}

impl SearchClient {
    pub fn new(settings: SearchSettings, transport: Arc<dyn Transport>) -> Self {
        Self {
            settings,
            transport,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.settings.endpoint = endpoint.into();
        self
    }

    pub fn with_media(mut self, media: impl Into<String>) -> Self {
        self.settings.media = media.into();
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.settings.limit = limit;
        self
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Build the request URL for `keyword`
    ///
    /// Fails with `BadUrl` when the endpoint does not form an absolute URL.
    pub fn request_url(&self, keyword: &EncodedQuery) -> AppResult<Url> {
        let url_string = format!(
            "{}?media={}&term={}&limit={}",
            self.settings.endpoint,
            urlencoding::encode(&self.settings.media),
            keyword,
            self.settings.limit
        );

        Url::parse(&url_string).map_err(|e| SearchError::BadUrl(format!("{url_string}: {e}")))
    }

    /// Run one search
    ///
    /// Resolves exactly once: the server-ordered records (possibly none) or a
    /// single classified error. A bad URL is reported before any request.
    #[instrument(skip_all, fields(query = %keyword, transport = self.transport.name()))]
    pub async fn search(&self, keyword: &EncodedQuery) -> AppResult<Vec<MovieRecord>> {
        let url = self.request_url(keyword).map_err(|e| {
            tracing::error!(error = %e, "Search URL could not be built");
            e
        })?;

        let body = self.transport.get(&url).await.map_err(|e| {
            tracing::warn!(error = %e, "Search request failed");
            SearchError::Network(e)
        })?;

        let search_result: SearchResult = serde_json::from_slice(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                response = %String::from_utf8_lossy(&body),
                "Failed to deserialize search response"
            );
            SearchError::Decoding(e)
        })?;

        if search_result.count_mismatch() {
            tracing::debug!(
                result_count = search_result.result_count,
                decoded = search_result.results.len(),
                "resultCount disagrees with decoded results; using decoded results"
            );
        }

        tracing::info!(results = search_result.results.len(), "Search completed");

        Ok(search_result.results)
    }

    /// Start a search in the background
    ///
    /// The receiver yields exactly one outcome once the round trip is done.
    pub fn spawn_search(
        &self,
        keyword: EncodedQuery,
    ) -> oneshot::Receiver<AppResult<Vec<MovieRecord>>> {
        let (tx, rx) = oneshot::channel();
        let client = self.clone();

        tokio::spawn(async move {
            let outcome = client.search(&keyword).await;
            if tx.send(outcome).is_err() {
                tracing::debug!("Search receiver dropped before completion");
            }
        });

        rx
    }
}
