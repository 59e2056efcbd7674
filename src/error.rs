/// Failure of the underlying HTTP exchange, shared by search and thumbnail requests
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned status {status} for {url}")]
    Status { status: u16, url: String },
}

/// Raw search text that cannot become a query component
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("Search text is not valid UTF-8")]
    InvalidUtf8,
}

/// Search failures; exactly one is reported per failed call
#[derive(thiserror::Error, Debug)]
pub enum SearchError {
    #[error("Bad URL: {0}")]
    BadUrl(String),

    #[error("Network error: {0}")]
    Network(#[from] TransportError),

    #[error("Decoding error: {0}")]
    Decoding(#[from] serde_json::Error),
}

/// Thumbnail failures. Never fatal to the search flow.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("Thumbnail transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Thumbnail response from {0} had an empty body")]
    EmptyBody(String),
}

/// Category of a user-facing alert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Network,
    Decoding,
}

/// Message for the alerting collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub kind: AlertKind,
    pub title: String,
    pub message: String,
}

impl SearchError {
    /// Maps the error to what the user should see.
    ///
    /// `BadUrl` points at a defect in the encoder or endpoint configuration,
    /// so it yields `None` and is only logged.
    pub fn alert(&self) -> Option<Alert> {
        match self {
            SearchError::BadUrl(_) => None,
            SearchError::Network(cause) => Some(Alert {
                kind: AlertKind::Network,
                title: "Network Error".to_string(),
                message: cause.to_string(),
            }),
            SearchError::Decoding(_) => Some(Alert {
                kind: AlertKind::Decoding,
                title: "Unexpected Response".to_string(),
                message: "The search service returned results that could not be read."
                    .to_string(),
            }),
        }
    }
}

pub type AppResult<T> = Result<T, SearchError>;
