//! HTTP transport abstraction
//!
//! Searches and thumbnail fetches both go through this trait so tests can
//! inject a mock instead of the network. The production implementation lives
//! in [`http`].

use url::Url;

use crate::error::TransportError;

pub mod http;

pub use http::HttpTransport;

/// Trait for byte-level GET transports
///
/// Implementations must return `TransportError::Status` for non-success
/// responses instead of handing back an error page as a body.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Fetch the full response body for `url`
    async fn get(&self, url: &Url) -> Result<Vec<u8>, TransportError>;

    /// Transport name for logging and debugging
    fn name(&self) -> &'static str;
}
