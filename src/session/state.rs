use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::models::{ImageBytes, MovieRecord, SearchGeneration, SlotId, ThumbnailDelivery};

/// Whether a completion was applied to the board or thrown away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    Stale,
}

/// One displayed row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardRow {
    pub slot: SlotId,
    pub record: MovieRecord,
    pub thumbnail: Option<ImageBytes>,
}

/// Point-in-time copy of the board
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardSnapshot {
    pub generation: SearchGeneration,
    pub rows: Vec<BoardRow>,
}

/// Displayed result set, owned by the consuming layer
///
/// Search and thumbnail completions never write rows directly; they go
/// through [`ResultBoard::apply_results`] and [`ResultBoard::attach_thumbnail`],
/// which check the search generation first.
#[derive(Clone, Debug)]
pub struct ResultBoard {
    inner: Arc<RwLock<ResultBoardInner>>,
    latest: Arc<AtomicU64>,
}

#[derive(Debug, Default)]
struct ResultBoardInner {
    generation: SearchGeneration,
    rows: Vec<BoardRow>,
}

impl Default for ResultBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultBoard {
    /// Creates an empty board at generation 0
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(ResultBoardInner::default())),
            latest: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Claims the next generation token for a search about to be issued
    pub fn begin_search(&self) -> SearchGeneration {
        SearchGeneration(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// True while no newer search has been started
    pub fn is_latest(&self, generation: SearchGeneration) -> bool {
        self.latest.load(Ordering::SeqCst) == generation.0
    }

    /// Replaces the whole result set with `records`
    ///
    /// Only the newest generation may apply. The swap happens under one write
    /// lock, so readers see either the old set or the new one.
    pub async fn apply_results(
        &self,
        generation: SearchGeneration,
        records: Vec<MovieRecord>,
    ) -> ApplyOutcome {
        self.apply_results_with(generation, records, |_, _| {}).await
    }

    /// [`apply_results`](Self::apply_results), running `on_applied` before
    /// the write lock is released
    ///
    /// `on_applied` only runs for an applied swap. Competing swaps wait for
    /// it, so whatever it forwards the records to observes generations in
    /// increasing order.
    pub async fn apply_results_with<F>(
        &self,
        generation: SearchGeneration,
        records: Vec<MovieRecord>,
        on_applied: F,
    ) -> ApplyOutcome
    where
        F: FnOnce(SearchGeneration, &[MovieRecord]),
    {
        let mut inner = self.inner.write().await;

        if !self.is_latest(generation) || generation <= inner.generation {
            tracing::debug!(
                generation = %generation,
                displayed = %inner.generation,
                "Discarding results from a superseded search"
            );
            return ApplyOutcome::Stale;
        }

        on_applied(generation, &records);

        let rows = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| BoardRow {
                slot: SlotId {
                    generation,
                    index,
                    track_id: record.track_id(),
                },
                record,
                thumbnail: None,
            })
            .collect();

        *inner = ResultBoardInner { generation, rows };
        ApplyOutcome::Applied
    }

    /// Attaches a fetched thumbnail to the row it was issued for
    ///
    /// Deliveries for a generation that is no longer displayed, or for a row
    /// whose track has changed, are discarded.
    pub async fn attach_thumbnail(&self, delivery: ThumbnailDelivery) -> ApplyOutcome {
        self.attach_thumbnail_with(delivery, |_| {}).await
    }

    /// [`attach_thumbnail`](Self::attach_thumbnail), running `on_applied`
    /// under the write lock when the delivery lands on a row
    pub async fn attach_thumbnail_with<F>(
        &self,
        delivery: ThumbnailDelivery,
        on_applied: F,
    ) -> ApplyOutcome
    where
        F: FnOnce(&ThumbnailDelivery),
    {
        let mut inner = self.inner.write().await;
        let slot = delivery.slot;

        if slot.generation != inner.generation {
            tracing::debug!(slot = %slot, displayed = %inner.generation, "Discarding stale thumbnail");
            return ApplyOutcome::Stale;
        }

        match inner.rows.get_mut(slot.index) {
            Some(row) if row.slot == slot => {
                on_applied(&delivery);
                row.thumbnail = delivery.image;
                ApplyOutcome::Applied
            }
            _ => {
                tracing::debug!(slot = %slot, "Discarding thumbnail for a missing row");
                ApplyOutcome::Stale
            }
        }
    }

    pub async fn snapshot(&self) -> BoardSnapshot {
        let inner = self.inner.read().await;
        BoardSnapshot {
            generation: inner.generation,
            rows: inner.rows.clone(),
        }
    }
}
