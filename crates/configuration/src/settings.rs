use std::path::PathBuf;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub market: MarketConfig,
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Connection parameters for the prediction-market quote source.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketConfig {
    /// Base URL including the API path prefix, e.g.
    /// "https://demo-api.kalshi.co/trade-api/v2".
    pub base_url: String,
    /// The event whose markets define the active show set.
    pub event_ticker: String,
    /// How many of the event's markets (ranked by price) enter a snapshot.
    #[serde(default = "default_top_markets")]
    pub top_markets: usize,
    /// Optional API credentials. Public endpoints work unsigned, so both
    /// fields may be omitted.
    pub api_key_id: Option<String>,
    pub api_secret: Option<String>,
}

fn default_top_markets() -> usize {
    5
}

/// One section per upstream data provider.
#[derive(Debug, Clone, Deserialize)]
pub struct ProvidersConfig {
    pub tmdb: TmdbConfig,
    pub youtube: YoutubeConfig,
    pub wikipedia: WikipediaConfig,
    pub news: NewsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbConfig {
    #[serde(default = "default_tmdb_base_url")]
    pub base_url: String,
    pub api_key: Option<String>,
}

fn default_tmdb_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct YoutubeConfig {
    #[serde(default = "default_youtube_base_url")]
    pub base_url: String,
    pub api_key: Option<String>,
    /// How many trailer search hits feed the engagement aggregate.
    #[serde(default = "default_max_videos")]
    pub max_videos: usize,
}

fn default_youtube_base_url() -> String {
    "https://www.googleapis.com/youtube/v3".to_string()
}

fn default_max_videos() -> usize {
    5
}

#[derive(Debug, Clone, Deserialize)]
pub struct WikipediaConfig {
    /// Base URL of the per-article pageviews API, up to (not including) the
    /// project segment.
    #[serde(default = "default_wikipedia_base_url")]
    pub base_url: String,
    #[serde(default = "default_wikipedia_project")]
    pub project: String,
    /// The pageviews API rejects anonymous clients, so a contactable
    /// User-Agent is mandatory.
    pub user_agent: String,
    /// Length of the trailing page-view window, in full days.
    #[serde(default = "default_trailing_days")]
    pub trailing_days: i64,
}

fn default_wikipedia_base_url() -> String {
    "https://wikimedia.org/api/rest_v1/metrics/pageviews/per-article".to_string()
}

fn default_wikipedia_project() -> String {
    "en.wikipedia".to_string()
}

fn default_trailing_days() -> i64 {
    7
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsConfig {
    #[serde(default = "default_news_base_url")]
    pub base_url: String,
    pub api_key: Option<String>,
    #[serde(default = "default_max_articles")]
    pub max_articles: usize,
    #[serde(default = "default_news_language")]
    pub language: String,
}

fn default_news_base_url() -> String {
    "https://gnews.io/api/v4".to_string()
}

fn default_max_articles() -> usize {
    50
}

fn default_news_language() -> String {
    "en".to_string()
}

/// Policy for every outbound provider call made during a rebuild.
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Hard deadline per provider call; a call past this settles as absent.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Maximum in-flight calls per provider, to respect upstream rate limits.
    #[serde(default = "default_per_provider_concurrency")]
    pub per_provider_concurrency: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            per_provider_concurrency: default_per_provider_concurrency(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_per_provider_concurrency() -> usize {
    4
}

/// How absent providers affect the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingProviderPolicy {
    /// An absent provider contributes zero. Scores stay comparable across
    /// shows with different coverage, at the cost of depressing sparsely
    /// covered shows.
    ZeroFill,
    /// Remaining weights are scaled up to cover the absent mass.
    Renormalize,
}

/// The weight each source carries in the composite score. The set must sum
/// to 100 under the zero-fill policy.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreWeights {
    pub market: Decimal,
    pub video_engagement: Decimal,
    pub media_sentiment: Decimal,
    pub popularity: Decimal,
    pub search_interest: Decimal,
}

impl ScoreWeights {
    pub fn total(&self) -> Decimal {
        self.market
            + self.video_engagement
            + self.media_sentiment
            + self.popularity
            + self.search_interest
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            market: dec!(50),
            video_engagement: dec!(20),
            media_sentiment: dec!(15),
            popularity: dec!(10),
            search_interest: dec!(5),
        }
    }
}

/// Contains parameters for the composite scorer.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub weights: ScoreWeights,
    #[serde(default = "default_missing_provider_policy")]
    pub missing_provider_policy: MissingProviderPolicy,
    /// Edges below this many price points are treated as noise, not signal.
    #[serde(default = "default_min_edge_points")]
    pub min_edge_points: Decimal,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            missing_provider_policy: default_missing_provider_policy(),
            min_edge_points: default_min_edge_points(),
        }
    }
}

fn default_missing_provider_policy() -> MissingProviderPolicy {
    MissingProviderPolicy::ZeroFill
}

fn default_min_edge_points() -> Decimal {
    dec!(5)
}

/// Where the CLI exports completed snapshots as JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data/full-analysis")
}

/// Bind address for the HTTP API.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

/// File logging for long-running modes. Console logging is always on.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// When set, `serve` mode also writes daily-rolling log files here.
    pub dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_sum_to_one_hundred() {
        assert_eq!(ScoreWeights::default().total(), dec!(100));
    }

    #[test]
    fn missing_provider_policy_parses_snake_case() {
        let policy: MissingProviderPolicy = serde_json::from_str("\"renormalize\"").unwrap();
        assert_eq!(policy, MissingProviderPolicy::Renormalize);
    }
}
