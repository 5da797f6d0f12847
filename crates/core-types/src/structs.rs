use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::enums::{ProviderKind, Recommendation};

/// One prediction-market instrument for a show, with prices in the exchange's
/// cent scale (0-100, the same domain as an implied probability).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketQuote {
    pub ticker: String,
    pub title: String,
    /// On ranking events the subtitle carries the raw show label
    /// (e.g. "Stranger Things 5").
    pub subtitle: Option<String>,
    pub yes_bid: Option<Decimal>,
    pub yes_ask: Option<Decimal>,
    pub no_bid: Option<Decimal>,
    pub no_ask: Option<Decimal>,
    pub last_price: Option<Decimal>,
    pub volume: i64,
    pub open_interest: i64,
    /// Implied chance of the YES outcome, already resolved through the
    /// last-price -> yes-bid fallback at normalization time.
    pub implied_chance: Option<Decimal>,
}

impl MarketQuote {
    /// The raw show label for this quote: subtitle first, title as fallback.
    pub fn raw_show_label(&self) -> &str {
        match &self.subtitle {
            Some(subtitle) if !subtitle.trim().is_empty() => subtitle,
            _ => &self.title,
        }
    }
}

/// A single day of article page views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageViewPoint {
    /// Day in `YYYYMMDD` form, as reported by the pageviews API.
    pub date: String,
    pub views: u64,
}

/// One headline retained from a news sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headline {
    pub title: String,
    pub source: Option<String>,
}

/// One normalized metric payload from one provider for one show.
///
/// Modeled as a tagged enum rather than a trait hierarchy so that a merged
/// record can hold whatever subset of providers succeeded in a plain map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProviderRecord {
    /// Catalog popularity metrics (TMDB).
    Popularity {
        vote_average: Decimal,
        vote_count: i64,
        popularity: Decimal,
        /// 1-based position in the weekly trending list, when present.
        trending_rank: Option<u32>,
        /// False when the catalog has no entry for the show; such a record
        /// contributes nothing to the composite score.
        found: bool,
    },
    /// Trailer engagement metrics (YouTube).
    VideoEngagement {
        total_views: u64,
        total_likes: u64,
        like_ratio: Decimal,
        /// Comment sentiment in -1..1.
        sentiment: Decimal,
        /// Derived engagement sub-score, 0-100.
        score: Decimal,
    },
    /// Encyclopedia page view interest over a trailing window (Wikipedia).
    SearchInterest {
        points: Vec<PageViewPoint>,
        total_views: u64,
        avg_daily_views: Decimal,
    },
    /// Press coverage sentiment (GNews).
    MediaSentiment {
        /// Average article sentiment in -1..1.
        sentiment: Decimal,
        article_count: usize,
        top_headlines: Vec<Headline>,
        /// Derived coverage sub-score, 0-100.
        score: Decimal,
    },
}

impl ProviderRecord {
    /// The provider category this record belongs to.
    pub fn kind(&self) -> ProviderKind {
        match self {
            ProviderRecord::Popularity { .. } => ProviderKind::Popularity,
            ProviderRecord::VideoEngagement { .. } => ProviderKind::VideoEngagement,
            ProviderRecord::SearchInterest { .. } => ProviderKind::SearchInterest,
            ProviderRecord::MediaSentiment { .. } => ProviderKind::MediaSentiment,
        }
    }
}

/// The weighted contribution each source made to a composite score.
///
/// An absent provider contributes zero here, which keeps scores comparable
/// across shows with different data coverage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub market: Decimal,
    pub popularity: Decimal,
    pub video_engagement: Decimal,
    pub search_interest: Decimal,
    pub media_sentiment: Decimal,
}

impl ScoreBreakdown {
    /// Creates a zeroed-out breakdown.
    pub fn new() -> Self {
        Self {
            market: Decimal::ZERO,
            popularity: Decimal::ZERO,
            video_engagement: Decimal::ZERO,
            search_interest: Decimal::ZERO,
            media_sentiment: Decimal::ZERO,
        }
    }
}

impl Default for ScoreBreakdown {
    fn default() -> Self {
        Self::new()
    }
}

/// The scorer's verdict on one merged record.
///
/// `fair_price` is the composite score re-expressed in the market's price
/// unit; `edge_points` is its absolute distance from the relevant live quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub composite_score: Decimal,
    pub fair_price: Decimal,
    pub edge_points: Decimal,
    pub recommendation: Recommendation,
    pub breakdown: ScoreBreakdown,
}

impl ScoreCard {
    /// Creates a new, zeroed-out ScoreCard with a `Hold` call.
    /// This is the state of a record between merging and scoring.
    pub fn new() -> Self {
        Self {
            composite_score: Decimal::ZERO,
            fair_price: Decimal::ZERO,
            edge_points: Decimal::ZERO,
            recommendation: Recommendation::Hold,
            breakdown: ScoreBreakdown::new(),
        }
    }
}

impl Default for ScoreCard {
    fn default() -> Self {
        Self::new()
    }
}

/// One show's complete analysis: its market quote, whatever provider records
/// settled successfully, and the derived score card.
///
/// The market quote is mandatory; every provider entry is optional. A missing
/// provider leaves the map sparse, it never fails the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRecord {
    pub show_name: String,
    pub market: MarketQuote,
    pub providers: BTreeMap<ProviderKind, ProviderRecord>,
    pub score: ScoreCard,
}

impl MergedRecord {
    /// Looks up one provider's record, if its fetch settled with data.
    pub fn provider(&self, kind: ProviderKind) -> Option<&ProviderRecord> {
        self.providers.get(&kind)
    }
}

/// One complete, immutable analysis pass: every scored show plus the moment
/// the pass finished. Ordered by composite score, best first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub generated_at: DateTime<Utc>,
    pub shows: Vec<MergedRecord>,
}
