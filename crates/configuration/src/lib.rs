use crate::error::ConfigError;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{
    Config, FetchConfig, MarketConfig, MissingProviderPolicy, NewsConfig, ProvidersConfig,
    ScoreWeights, ScoringConfig, ServerConfig, SnapshotConfig, TmdbConfig, WikipediaConfig,
    YoutubeConfig,
};

/// Loads the application configuration from the `config.toml` file.
///
/// This function is the primary entry point for this crate. It reads the
/// configuration file, layers `LIMELIGHT_`-prefixed environment variables on
/// top (e.g. `LIMELIGHT_PROVIDERS__TMDB__API_KEY`), deserializes the result
/// into our strongly-typed `Config` struct, validates it, and returns it.
pub fn load_config() -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        // Tells the builder to look for a file named `config.toml`
        .add_source(config::File::with_name("config.toml"))
        // Secrets come from the environment (usually via a .env file).
        .add_source(
            config::Environment::with_prefix("LIMELIGHT")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    validate(&config)?;

    Ok(config)
}

/// Rejects configurations the pipeline cannot run with.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.market.top_markets == 0 {
        return Err(ConfigError::ValidationError(
            "market.top_markets must be at least 1".to_string(),
        ));
    }
    if config.fetch.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "fetch.timeout_secs must be at least 1".to_string(),
        ));
    }
    if config.fetch.per_provider_concurrency == 0 {
        return Err(ConfigError::ValidationError(
            "fetch.per_provider_concurrency must be at least 1".to_string(),
        ));
    }
    // Under zero-fill, the weight total is the score ceiling; anything other
    // than 100 silently rescales every composite.
    if config.scoring.missing_provider_policy == MissingProviderPolicy::ZeroFill {
        let total = config.scoring.weights.total();
        if total != rust_decimal::Decimal::from(100) {
            return Err(ConfigError::ValidationError(format!(
                "scoring.weights must sum to 100 under the zero_fill policy, got {total}"
            )));
        }
    }
    if config.scoring.min_edge_points.is_sign_negative() {
        return Err(ConfigError::ValidationError(
            "scoring.min_edge_points must not be negative".to_string(),
        ));
    }
    Ok(())
}
