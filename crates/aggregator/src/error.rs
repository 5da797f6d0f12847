use providers::error::ProviderError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AggregatorError {
    /// The market-quote listing could not be fetched. The quote list is the
    /// entity-set source, so this is the one failure that aborts a rebuild.
    #[error("Failed to fetch the market quote list: {0}")]
    MarketData(#[from] ProviderError),

    /// A rebuild was requested while another one is running. Non-fatal: the
    /// caller can keep reading the previous snapshot and retry.
    #[error("A snapshot rebuild is already in progress")]
    RebuildInProgress,
}
