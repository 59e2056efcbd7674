use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use movie_search::{
    Alert, AlertSurface, Config, HttpTransport, MovieRecord, Renderer, ResultBoard,
    SearchClient, SearchGeneration, SearchSession, SubmitOutcome, ThumbnailDelivery,
    ThumbnailFetcher,
};

/// Logs what a UI would draw; the final table is printed from the board
struct LogRenderer;

impl Renderer for LogRenderer {
    fn show_results(&self, generation: SearchGeneration, records: &[MovieRecord]) {
        tracing::info!(generation = %generation, results = records.len(), "Results ready");
    }

    fn show_thumbnail(&self, delivery: &ThumbnailDelivery) {
        tracing::debug!(
            slot = %delivery.slot,
            fetched = delivery.image.is_some(),
            "Thumbnail ready"
        );
    }
}

struct StderrAlerts;

impl AlertSurface for StderrAlerts {
    fn show_alert(&self, alert: &Alert) {
        eprintln!("{}: {}", alert.title, alert.message);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("movie_search=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    let keyword = std::env::args().skip(1).collect::<Vec<_>>().join(" ");

    let transport = Arc::new(HttpTransport::from_config(&config).context("Failed to build HTTP client")?);
    let board = ResultBoard::new();
    let (session, pump) = SearchSession::new(
        SearchClient::new(config.search_settings(), transport.clone()),
        ThumbnailFetcher::new(transport),
        board.clone(),
        Arc::new(LogRenderer),
        Arc::new(StderrAlerts),
    );

    let outcome = session
        .submit(&keyword)
        .await
        .with_context(|| format!("Cannot search for {keyword:?}"))?;
    drop(session);
    pump.join().await;

    match outcome {
        SubmitOutcome::Ignored => {
            tracing::info!("Nothing to search for");
            return Ok(());
        }
        SubmitOutcome::Failed { error, .. } => return Err(error.into()),
        SubmitOutcome::Superseded { .. } | SubmitOutcome::Displayed { .. } => {}
    }

    let snapshot = board.snapshot().await;
    for row in &snapshot.rows {
        println!(
            "{}\t{}\t{}\t{}",
            row.record.track_id(),
            row.record.track_name(),
            row.record.artist_name(),
            if row.thumbnail.is_some() { "artwork" } else { "-" }
        );
    }

    Ok(())
}
