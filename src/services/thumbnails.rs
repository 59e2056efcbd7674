//! Concurrent thumbnail fetching
//!
//! Every fetch runs as its own tokio task and reports back over an mpsc
//! channel, tagged with the slot it was issued for. Completion order is not
//! issue order; consumers match deliveries by [`SlotId`].

use std::sync::Arc;

use tokio::{sync::mpsc, task::JoinHandle};
use tracing::instrument;
use url::Url;

use crate::{
    error::FetchError,
    models::{ImageBytes, MovieRecord, SearchGeneration, SlotId, ThumbnailDelivery},
    services::transport::Transport,
};

#[derive(Clone)]
pub struct ThumbnailFetcher {
    transport: Arc<dyn Transport>,
}

impl ThumbnailFetcher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Fetch the artwork bytes behind `url`
    #[instrument(skip_all, fields(url = %url))]
    pub async fn fetch(&self, url: &Url) -> Result<ImageBytes, FetchError> {
        let bytes = self.transport.get(url).await?;

        if bytes.is_empty() {
            return Err(FetchError::EmptyBody(url.to_string()));
        }

        tracing::debug!(bytes = bytes.len(), "Thumbnail fetched");
        Ok(ImageBytes::new(bytes))
    }

    /// Fetch in the background and deliver the outcome for `slot`
    ///
    /// Failures are logged and delivered as `image: None`.
    pub fn spawn_fetch(
        &self,
        slot: SlotId,
        url: Url,
        deliveries: mpsc::UnboundedSender<ThumbnailDelivery>,
    ) -> JoinHandle<()> {
        let fetcher = self.clone();

        tokio::spawn(async move {
            let image = match fetcher.fetch(&url).await {
                Ok(image) => Some(image),
                Err(e) => {
                    tracing::warn!(slot = %slot, error = %e, "Thumbnail fetch failed");
                    None
                }
            };

            if deliveries.send(ThumbnailDelivery { slot, image }).is_err() {
                tracing::debug!(slot = %slot, "Thumbnail receiver closed; delivery dropped");
            }
        })
    }

    /// One background fetch per record, slots numbered in display order
    pub fn spawn_for_records(
        &self,
        generation: SearchGeneration,
        records: &[MovieRecord],
        deliveries: &mpsc::UnboundedSender<ThumbnailDelivery>,
    ) -> Vec<JoinHandle<()>> {
        records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let slot = SlotId {
                    generation,
                    index,
                    track_id: record.track_id(),
                };
                self.spawn_fetch(slot, record.artwork_url().clone(), deliveries.clone())
            })
            .collect()
    }
}
