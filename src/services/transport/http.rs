//! reqwest-backed transport
//!
//! One `reqwest::Client` is shared by every search and thumbnail request so
//! connections are pooled; cloning the transport clones the handle only.

use reqwest::Client as HttpClient;
use std::time::Duration;
use url::Url;

use crate::{config::Config, error::TransportError, services::transport::Transport};

#[derive(Debug, Clone)]
pub struct HttpTransport {
    http_client: HttpClient,
}

impl HttpTransport {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, TransportError> {
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self { http_client })
    }

    pub fn from_config(config: &Config) -> Result<Self, TransportError> {
        Self::new(config.request_timeout(), &config.user_agent)
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<Vec<u8>, TransportError> {
        let response = self.http_client.get(url.clone()).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::debug!(url = %url, status = status.as_u16(), "Non-success response");
            return Err(TransportError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        Ok(body.to_vec())
    }

    fn name(&self) -> &'static str {
        "reqwest"
    }
}
