use serde::Deserialize;
use url::Url;

pub mod thumbnail;

pub use thumbnail::{ImageBytes, SearchGeneration, SlotId, ThumbnailDelivery};

/// One movie from the search endpoint
///
/// Immutable once decoded. Optional fields are `None` when the payload omits
/// them or sends `null`; they are never filled with placeholder values.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MovieRecord {
    track_id: i64,
    artist_name: String,
    track_name: String,
    #[serde(rename = "artworkUrl100")]
    artwork_url: Url,
    #[serde(default)]
    collection_id: Option<i64>,
    #[serde(default)]
    collection_name: Option<String>,
    #[serde(default)]
    long_description: Option<String>,
}

impl MovieRecord {
    pub fn new(track_id: i64, artist_name: String, track_name: String, artwork_url: Url) -> Self {
        Self {
            track_id,
            artist_name,
            track_name,
            artwork_url,
            collection_id: None,
            collection_name: None,
            long_description: None,
        }
    }

    /// Attaches the collection the track belongs to
    pub fn with_collection(mut self, id: i64, name: String) -> Self {
        self.collection_id = Some(id);
        self.collection_name = Some(name);
        self
    }

    pub fn with_long_description(mut self, description: String) -> Self {
        self.long_description = Some(description);
        self
    }

    pub fn track_id(&self) -> i64 {
        self.track_id
    }

    pub fn artist_name(&self) -> &str {
        &self.artist_name
    }

    /// Display title
    pub fn track_name(&self) -> &str {
        &self.track_name
    }

    pub fn artwork_url(&self) -> &Url {
        &self.artwork_url
    }

    pub fn collection_id(&self) -> Option<i64> {
        self.collection_id
    }

    pub fn collection_name(&self) -> Option<&str> {
        self.collection_name.as_deref()
    }

    pub fn long_description(&self) -> Option<&str> {
        self.long_description.as_deref()
    }
}

/// Envelope returned by the search endpoint
///
/// `result_count` is informational only; `results.len()` is authoritative.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub result_count: i64,
    pub results: Vec<MovieRecord>,
}

impl SearchResult {
    /// True when the advertised count disagrees with the decoded records
    pub fn count_mismatch(&self) -> bool {
        usize::try_from(self.result_count).map_or(true, |count| count != self.results.len())
    }
}
