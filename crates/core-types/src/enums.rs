use serde::{Deserialize, Serialize};

/// The category of data a provider contributes to a merged record.
///
/// The market quote itself is not a `ProviderKind`: a quote is the mandatory
/// spine of every record, while provider data is optional enrichment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Popularity,
    VideoEngagement,
    SearchInterest,
    MediaSentiment,
}

impl ProviderKind {
    /// Every provider category, in the order records serialize them.
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::Popularity,
        ProviderKind::VideoEngagement,
        ProviderKind::SearchInterest,
        ProviderKind::MediaSentiment,
    ];
}

/// The trading call derived from comparing a fair price against live quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    BuyYes,
    BuyNo,
    Hold,
}

impl Recommendation {
    /// Returns true when the call asks the reader to take a position.
    pub fn is_actionable(&self) -> bool {
        !matches!(self, Recommendation::Hold)
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Recommendation::BuyYes => "BUY_YES",
            Recommendation::BuyNo => "BUY_NO",
            Recommendation::Hold => "HOLD",
        };
        write!(f, "{label}")
    }
}
