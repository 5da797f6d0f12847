use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use configuration::{Config, FetchConfig};
use core_types::{MarketQuote, ProviderKind, ProviderRecord};

use crate::error::ProviderError;

mod auth;
pub mod error;
pub mod market;
pub mod news;
pub mod sentiment;
pub mod tmdb;
pub mod wikipedia;
pub mod youtube;

// --- Public API ---
pub use market::KalshiClient;
pub use news::GnewsClient;
pub use tmdb::TmdbClient;
pub use wikipedia::WikipediaClient;
pub use youtube::YoutubeClient;

/// The abstract interface for the prediction-market quote source.
///
/// The quote list is the spine of a snapshot: the active show set is derived
/// from it, so a failure here is the one provider failure that aborts a
/// rebuild instead of degrading it.
#[async_trait]
pub trait MarketDataClient: Send + Sync {
    /// Fetches the top open markets for the configured event, ranked by
    /// price, normalized into `MarketQuote`s.
    async fn fetch_event_quotes(&self) -> Result<Vec<MarketQuote>, ProviderError>;
}

/// The uniform contract every enrichment provider is integrated behind.
///
/// `Ok(None)` means the provider has no data for the show; an `Err` is a
/// provider failure. The orchestrator treats both as "absent" so that no
/// single provider can fail a show, and this trait is the seam that lets
/// tests swap the live clients for mocks.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// The metric category this adapter contributes.
    fn kind(&self) -> ProviderKind;

    /// Fetches and normalizes this provider's data for one canonical show
    /// title.
    async fn fetch(&self, show: &str) -> Result<Option<ProviderRecord>, ProviderError>;
}

/// Constructs the full adapter set from configuration, in scoring-weight
/// order.
pub fn build_adapters(config: &Config) -> Vec<Arc<dyn ProviderAdapter>> {
    vec![
        Arc::new(YoutubeClient::new(&config.providers.youtube, &config.fetch)),
        Arc::new(GnewsClient::new(&config.providers.news, &config.fetch)),
        Arc::new(TmdbClient::new(&config.providers.tmdb, &config.fetch)),
        Arc::new(WikipediaClient::new(&config.providers.wikipedia, &config.fetch)),
    ]
}

/// Builds the shared reqwest client with the configured per-call deadline.
pub(crate) fn http_client(fetch: &FetchConfig) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(fetch.timeout_secs))
        .build()
        .expect("Failed to build reqwest client")
}
