//! Search session: the consuming side of the search client
//!
//! Wires encoder, client, thumbnail fetcher and [`ResultBoard`] together and
//! forwards what should be displayed to the [`Renderer`] and [`AlertSurface`]
//! collaborators.

use std::sync::Arc;

use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    error::{Alert, EncodingError, SearchError},
    models::{MovieRecord, SearchGeneration, ThumbnailDelivery},
    services::{query, SearchClient, ThumbnailFetcher},
};

pub mod state;

pub use state::{ApplyOutcome, BoardRow, BoardSnapshot, ResultBoard};

/// Rendering collaborator
#[cfg_attr(test, mockall::automock)]
pub trait Renderer: Send + Sync {
    /// A new result set replaced the displayed one
    ///
    /// Called while the board swap is held, so generations arrive in
    /// increasing order. Must not block.
    fn show_results(&self, generation: SearchGeneration, records: &[MovieRecord]);

    /// A thumbnail for a current slot arrived; `image` is `None` if it failed
    fn show_thumbnail(&self, delivery: &ThumbnailDelivery);
}

/// Alerting collaborator
#[cfg_attr(test, mockall::automock)]
pub trait AlertSurface: Send + Sync {
    fn show_alert(&self, alert: &Alert);
}

/// What happened to one submitted search
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Nothing to search for; no request was made
    Ignored,
    /// Results replaced the board and thumbnail fetches were started
    Displayed {
        generation: SearchGeneration,
        results: usize,
        thumbnails: Vec<JoinHandle<()>>,
    },
    /// A newer search started while this one was in flight
    Superseded { generation: SearchGeneration },
    /// The search failed; the alert (if any) has already been shown
    Failed {
        generation: SearchGeneration,
        error: SearchError,
    },
}

/// Handle for the task that applies thumbnail deliveries to the board
pub struct DeliveryPumpHandle {
    task: JoinHandle<()>,
}

impl DeliveryPumpHandle {
    /// Waits until every outstanding delivery has been applied
    ///
    /// Returns once all sessions sharing the pump have been dropped and every
    /// in-flight thumbnail fetch has reported.
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Thumbnail delivery task failed");
        }
    }
}

#[derive(Clone)]
pub struct SearchSession {
    client: SearchClient,
    fetcher: ThumbnailFetcher,
    board: ResultBoard,
    renderer: Arc<dyn Renderer>,
    alerts: Arc<dyn AlertSurface>,
    deliveries: mpsc::UnboundedSender<ThumbnailDelivery>,
}

impl SearchSession {
    /// Creates a session and spawns its thumbnail delivery task
    pub fn new(
        client: SearchClient,
        fetcher: ThumbnailFetcher,
        board: ResultBoard,
        renderer: Arc<dyn Renderer>,
        alerts: Arc<dyn AlertSurface>,
    ) -> (Self, DeliveryPumpHandle) {
        let (deliveries, delivery_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(Self::delivery_task(
            board.clone(),
            renderer.clone(),
            delivery_rx,
        ));

        let session = Self {
            client,
            fetcher,
            board,
            renderer,
            alerts,
            deliveries,
        };

        (session, DeliveryPumpHandle { task })
    }

    async fn delivery_task(
        board: ResultBoard,
        renderer: Arc<dyn Renderer>,
        mut delivery_rx: mpsc::UnboundedReceiver<ThumbnailDelivery>,
    ) {
        while let Some(delivery) = delivery_rx.recv().await {
            board
                .attach_thumbnail_with(delivery, |applied| renderer.show_thumbnail(applied))
                .await;
        }
        tracing::debug!("Thumbnail delivery channel closed");
    }

    pub fn board(&self) -> &ResultBoard {
        &self.board
    }

    /// Runs one search for the text the user typed
    ///
    /// Empty text is ignored without touching the network. Control characters
    /// are escaped like any other reserved byte.
    pub async fn submit(&self, raw: &str) -> Result<SubmitOutcome, EncodingError> {
        let Some(keyword) = query::encode(raw)? else {
            tracing::debug!("Empty search ignored");
            return Ok(SubmitOutcome::Ignored);
        };

        let generation = self.board.begin_search();
        tracing::info!(query = %keyword, generation = %generation, "Search submitted");

        let records = match self.client.search(&keyword).await {
            Ok(records) => records,
            Err(error) => return Ok(self.report_failure(generation, error)),
        };

        let outcome = self
            .board
            .apply_results_with(generation, records.clone(), |generation, records| {
                self.renderer.show_results(generation, records)
            })
            .await;

        if outcome == ApplyOutcome::Stale {
            return Ok(SubmitOutcome::Superseded { generation });
        }

        let thumbnails = self
            .fetcher
            .spawn_for_records(generation, &records, &self.deliveries);

        Ok(SubmitOutcome::Displayed {
            generation,
            results: records.len(),
            thumbnails,
        })
    }

    fn report_failure(&self, generation: SearchGeneration, error: SearchError) -> SubmitOutcome {
        if !self.board.is_latest(generation) {
            tracing::debug!(generation = %generation, error = %error, "Superseded search failed");
            return SubmitOutcome::Superseded { generation };
        }

        match error.alert() {
            Some(alert) => self.alerts.show_alert(&alert),
            None => tracing::error!(error = %error, "Search could not be issued"),
        }

        SubmitOutcome::Failed { generation, error }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::{AlertKind, TransportError},
        services::{transport::MockTransport, SearchSettings},
    };
    use std::time::Duration;
    use url::Url;

    const ONE_RESULT: &str = r#"{"resultCount":1,"results":[{
        "trackId": 1347768283,
        "artistName": "Ryan Coogler",
        "trackName": "Black Panther",
        "artworkUrl100": "https://example.com/bp.jpg"
    }]}"#;

    fn session_with(
        transport: MockTransport,
        renderer: MockRenderer,
        alerts: MockAlertSurface,
    ) -> (SearchSession, DeliveryPumpHandle) {
        let transport: Arc<MockTransport> = Arc::new(transport);
        SearchSession::new(
            SearchClient::new(SearchSettings::default(), transport.clone()),
            ThumbnailFetcher::new(transport),
            ResultBoard::new(),
            Arc::new(renderer),
            Arc::new(alerts),
        )
    }

    #[tokio::test]
    async fn test_empty_search_never_reaches_transport() {
        let mut transport = MockTransport::new();
        transport.expect_get().never();
        let mut renderer = MockRenderer::new();
        renderer.expect_show_results().never();
        let mut alerts = MockAlertSurface::new();
        alerts.expect_show_alert().never();

        let (session, pump) = session_with(transport, renderer, alerts);

        for raw in ["", "   "] {
            let outcome = session.submit(raw).await.unwrap();
            assert!(matches!(outcome, SubmitOutcome::Ignored));
        }
        assert_eq!(session.board().snapshot().await.generation, SearchGeneration(0));

        drop(session);
        pump.join().await;
    }

    #[tokio::test]
    async fn test_control_characters_reach_transport_escaped() {
        let mut transport = MockTransport::new();
        transport.expect_name().return_const("mock");
        transport
            .expect_get()
            .withf(|url| url.query().is_some_and(|q| q.contains("term=tom%09%26%20jerry")))
            .times(1)
            .returning(|_| Ok(br#"{"resultCount":0,"results":[]}"#.to_vec()));
        let mut renderer = MockRenderer::new();
        renderer
            .expect_show_results()
            .withf(|_, records| records.is_empty())
            .times(1)
            .return_const(());
        let mut alerts = MockAlertSurface::new();
        alerts.expect_show_alert().never();

        let (session, _pump) = session_with(transport, renderer, alerts);
        let outcome = session.submit("tom\t& jerry").await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Displayed { results: 0, .. }));
    }

    #[tokio::test]
    async fn test_successful_search_renders_and_fetches_thumbnails() {
        let mut transport = MockTransport::new();
        transport.expect_name().return_const("mock");
        transport.expect_get().times(2).returning(|url| {
            if url.path() == "/bp.jpg" {
                Ok(vec![1, 2, 3])
            } else {
                Ok(ONE_RESULT.as_bytes().to_vec())
            }
        });

        let mut renderer = MockRenderer::new();
        renderer
            .expect_show_results()
            .withf(|generation, records| {
                *generation == SearchGeneration(1) && records.len() == 1
            })
            .times(1)
            .return_const(());
        renderer
            .expect_show_thumbnail()
            .withf(|delivery| delivery.slot.track_id == 1347768283 && delivery.image.is_some())
            .times(1)
            .return_const(());
        let mut alerts = MockAlertSurface::new();
        alerts.expect_show_alert().never();

        let (session, pump) = session_with(transport, renderer, alerts);
        let board = session.board().clone();

        let outcome = session.submit("black panther").await.unwrap();
        let SubmitOutcome::Displayed {
            results,
            thumbnails,
            ..
        } = outcome
        else {
            panic!("expected results to be displayed, got {outcome:?}");
        };
        assert_eq!(results, 1);
        for handle in thumbnails {
            handle.await.unwrap();
        }

        drop(session);
        pump.join().await;

        let snapshot = board.snapshot().await;
        assert_eq!(snapshot.rows[0].record.artist_name(), "Ryan Coogler");
        assert_eq!(
            snapshot.rows[0].thumbnail.as_ref().map(|i| i.as_bytes().to_vec()),
            Some(vec![1, 2, 3])
        );
    }

    #[tokio::test]
    async fn test_older_search_finishing_last_is_superseded() {
        // "alien" is answered well after "aliens"
        struct SlowAlien;

        #[async_trait::async_trait]
        impl crate::services::transport::Transport for SlowAlien {
            async fn get(&self, url: &Url) -> Result<Vec<u8>, TransportError> {
                let term = url
                    .query_pairs()
                    .find(|(key, _)| key == "term")
                    .map(|(_, value)| value.into_owned());
                let Some(term) = term else {
                    return Ok(vec![7]);
                };

                if term == "alien" {
                    tokio::time::sleep(Duration::from_millis(200)).await;
                }
                let body = format!(
                    r#"{{"resultCount":1,"results":[{{"trackId":{},"artistName":"Ridley Scott","trackName":"{term}","artworkUrl100":"https://example.com/{term}.jpg"}}]}}"#,
                    term.len()
                );
                Ok(body.into_bytes())
            }

            fn name(&self) -> &'static str {
                "slow-alien"
            }
        }

        let mut renderer = MockRenderer::new();
        renderer
            .expect_show_results()
            .withf(|generation, records| {
                *generation == SearchGeneration(2)
                    && records.len() == 1
                    && records[0].track_name() == "aliens"
            })
            .times(1)
            .return_const(());
        renderer.expect_show_thumbnail().return_const(());
        let mut alerts = MockAlertSurface::new();
        alerts.expect_show_alert().never();

        let transport = Arc::new(SlowAlien);
        let (session, pump) = SearchSession::new(
            SearchClient::new(SearchSettings::default(), transport.clone()),
            ThumbnailFetcher::new(transport),
            ResultBoard::new(),
            Arc::new(renderer),
            Arc::new(alerts),
        );
        let board = session.board().clone();

        let (older, newer) = tokio::join!(session.submit("alien"), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            session.submit("aliens").await
        });

        assert!(matches!(
            older.unwrap(),
            SubmitOutcome::Superseded {
                generation: SearchGeneration(1)
            }
        ));
        let SubmitOutcome::Displayed {
            generation,
            thumbnails,
            ..
        } = newer.unwrap()
        else {
            panic!("expected the newer search to be displayed");
        };
        assert_eq!(generation, SearchGeneration(2));
        for handle in thumbnails {
            handle.await.unwrap();
        }

        drop(session);
        pump.join().await;

        let snapshot = board.snapshot().await;
        assert_eq!(snapshot.generation, SearchGeneration(2));
        assert_eq!(snapshot.rows.len(), 1);
        assert_eq!(snapshot.rows[0].record.track_name(), "aliens");
        assert_eq!(snapshot.rows[0].slot.generation, SearchGeneration(2));
    }

    #[tokio::test]
    async fn test_network_failure_shows_alert_once() {
        let mut transport = MockTransport::new();
        transport.expect_name().return_const("mock");
        transport
            .expect_get()
            .times(1)
            .returning(|url| {
                Err(TransportError::Status {
                    status: 503,
                    url: url.to_string(),
                })
            });
        let mut renderer = MockRenderer::new();
        renderer.expect_show_results().never();
        let mut alerts = MockAlertSurface::new();
        alerts
            .expect_show_alert()
            .withf(|alert| alert.kind == AlertKind::Network && alert.message.contains("503"))
            .times(1)
            .return_const(());

        let (session, _pump) = session_with(transport, renderer, alerts);
        let outcome = session.submit("comedy").await.unwrap();
        assert!(matches!(
            outcome,
            SubmitOutcome::Failed {
                error: SearchError::Network(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_bad_url_is_logged_not_alerted() {
        let mut transport = MockTransport::new();
        transport.expect_name().return_const("mock");
        transport.expect_get().never();
        let mut alerts = MockAlertSurface::new();
        alerts.expect_show_alert().never();
        let transport = Arc::new(transport);

        let (session, _pump) = SearchSession::new(
            SearchClient::new(SearchSettings::default(), transport.clone())
                .with_endpoint("no scheme here"),
            ThumbnailFetcher::new(transport),
            ResultBoard::new(),
            Arc::new(MockRenderer::new()),
            Arc::new(alerts),
        );

        let outcome = session.submit("comedy").await.unwrap();
        assert!(matches!(
            outcome,
            SubmitOutcome::Failed {
                error: SearchError::BadUrl(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_failed_thumbnail_keeps_search_alive() {
        let mut transport = MockTransport::new();
        transport.expect_name().return_const("mock");
        transport.expect_get().returning(|url: &Url| {
            if url.path() == "/bp.jpg" {
                Err(TransportError::Status {
                    status: 404,
                    url: url.to_string(),
                })
            } else {
                Ok(ONE_RESULT.as_bytes().to_vec())
            }
        });
        let mut renderer = MockRenderer::new();
        renderer.expect_show_results().times(1).return_const(());
        renderer
            .expect_show_thumbnail()
            .withf(|delivery| delivery.image.is_none())
            .times(1)
            .return_const(());
        let mut alerts = MockAlertSurface::new();
        alerts.expect_show_alert().never();

        let (session, pump) = session_with(transport, renderer, alerts);
        let board = session.board().clone();
        let outcome = session.submit("black panther").await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Displayed { .. }));

        drop(session);
        pump.join().await;

        let snapshot = board.snapshot().await;
        assert_eq!(snapshot.rows.len(), 1);
        assert_eq!(snapshot.rows[0].thumbnail, None);
    }
}
