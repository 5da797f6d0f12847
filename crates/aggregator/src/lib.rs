//! # Limelight Aggregator
//!
//! The aggregation-and-scoring core. A rebuild derives the active show set
//! from the live market quotes, fans out every (show, provider) fetch,
//! merges whatever settled into one record per show, scores each record,
//! and publishes the finished snapshot to the store in a single atomic swap.

use std::sync::Arc;

use chrono::Utc;
use configuration::Config;
use core_types::Snapshot;
use providers::{MarketDataClient, ProviderAdapter};

use crate::scorer::Scorer;

pub mod error;
pub mod merger;
pub mod orchestrator;
pub mod scorer;
pub mod store;

// Re-export the core types to provide a clean public API.
pub use error::AggregatorError;
pub use store::SnapshotStore;

/// The central orchestrator for the analysis pipeline.
///
/// Owns the quote source, the provider adapters and the scorer; shares the
/// snapshot store with whoever serves reads.
pub struct AnalysisEngine {
    config: Config,
    market_client: Arc<dyn MarketDataClient>,
    adapters: Vec<Arc<dyn ProviderAdapter>>,
    scorer: Scorer,
    store: Arc<SnapshotStore>,
}

impl AnalysisEngine {
    /// Creates a new `AnalysisEngine` instance with all its required
    /// components.
    pub fn new(
        config: Config,
        market_client: Arc<dyn MarketDataClient>,
        adapters: Vec<Arc<dyn ProviderAdapter>>,
        store: Arc<SnapshotStore>,
    ) -> Self {
        let scorer = Scorer::new(&config.scoring);
        Self {
            config,
            market_client,
            adapters,
            scorer,
            store,
        }
    }

    /// Convenience constructor wiring up the live clients and a fresh store
    /// from configuration.
    pub fn from_config(config: Config) -> Self {
        let market_client = Arc::new(providers::KalshiClient::new(&config.market, &config.fetch));
        let adapters = providers::build_adapters(&config);
        Self::new(
            config,
            market_client,
            adapters,
            Arc::new(SnapshotStore::new()),
        )
    }

    /// Runs one full analysis pass and publishes the result.
    ///
    /// Only the quote fetch can abort the pass; every enrichment provider
    /// failure degrades into an absent record instead. While another rebuild
    /// holds the gate this returns `RebuildInProgress` immediately, and the
    /// previous snapshot stays readable throughout. Dropping the returned
    /// future cancels the in-flight fan-out without touching the store.
    pub async fn rebuild_snapshot(&self) -> Result<Arc<Snapshot>, AggregatorError> {
        let Some(_gate) = self.store.begin_rebuild() else {
            return Err(AggregatorError::RebuildInProgress);
        };

        tracing::info!(event_ticker = %self.config.market.event_ticker, "Starting full analysis.");
        let quotes = self.market_client.fetch_event_quotes().await?;
        let entities = merger::resolve_entities(&quotes);
        tracing::info!(shows = entities.len(), "Resolved active show set.");

        let show_names: Vec<String> = entities.iter().map(|(name, _)| name.clone()).collect();
        let results =
            orchestrator::fetch_all(&show_names, &self.adapters, &self.config.fetch).await;

        let mut records = merger::merge(entities, results);
        self.scorer.annotate(&mut records);
        records.sort_by(|a, b| b.score.composite_score.cmp(&a.score.composite_score));

        let snapshot = Snapshot {
            generated_at: Utc::now(),
            shows: records,
        };
        let published = self.store.replace(snapshot);
        tracing::info!(shows = published.shows.len(), "Published analysis snapshot.");
        Ok(published)
    }

    /// The latest completed snapshot. Never blocks on a rebuild in progress.
    pub fn latest_snapshot(&self) -> Option<Arc<Snapshot>> {
        self.store.latest()
    }
}
