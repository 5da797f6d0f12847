//! The composite scorer.
//!
//! Converts one merged record into a 0-100 composite score, a fair-price
//! estimate in the market's price unit, an edge against the relevant live
//! quote, and a discrete call. Scoring degrades gracefully: a record with no
//! provider data at all still gets a defined fair price and a `Hold`.

use configuration::{MissingProviderPolicy, ScoreWeights, ScoringConfig};
use core_types::{
    MarketQuote, MergedRecord, ProviderKind, ProviderRecord, Recommendation, ScoreBreakdown,
    ScoreCard,
};
use rust_decimal::Decimal;

/// Popularity-index value that saturates the catalog sub-score.
const POPULARITY_INDEX_CEILING: u32 = 250;

/// Flat bonus for appearing in the weekly trending list.
const TRENDING_BONUS: u32 = 5;

/// A stateless calculator that annotates merged records with score cards.
pub struct Scorer {
    weights: ScoreWeights,
    policy: MissingProviderPolicy,
    min_edge_points: Decimal,
}

/// Per-source sub-scores on the 0-100 scale; `None` means the source is
/// absent for this record.
struct SubScores {
    market: Option<Decimal>,
    popularity: Option<Decimal>,
    video_engagement: Option<Decimal>,
    search_interest: Option<Decimal>,
    media_sentiment: Option<Decimal>,
}

impl Scorer {
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            weights: config.weights.clone(),
            policy: config.missing_provider_policy,
            min_edge_points: config.min_edge_points,
        }
    }

    /// Scores every record in place.
    ///
    /// Takes the whole slice because search interest is relative: one show's
    /// sub-score is its share of the snapshot-wide weekly page views.
    pub fn annotate(&self, records: &mut [MergedRecord]) {
        let total_search_views: u64 = records.iter().filter_map(search_views).sum();
        for record in records.iter_mut() {
            record.score = self.score_record(record, total_search_views);
        }
    }

    fn score_record(&self, record: &MergedRecord, total_search_views: u64) -> ScoreCard {
        let subs = SubScores {
            market: record.market.implied_chance,
            popularity: popularity_subscore(record),
            video_engagement: derived_score(record, ProviderKind::VideoEngagement),
            search_interest: search_subscore(record, total_search_views),
            media_sentiment: derived_score(record, ProviderKind::MediaSentiment),
        };

        let (composite_score, breakdown) = self.combine(&subs);
        // The composite lives in the same 0-100 domain as an implied
        // probability, so the fair price is the composite itself.
        let fair_price = composite_score;
        let (recommendation, edge_points) = self.recommend(&record.market, fair_price);

        ScoreCard {
            composite_score,
            fair_price,
            edge_points,
            recommendation,
            breakdown,
        }
    }

    /// Folds the sub-scores into the weighted composite under the configured
    /// missing-provider policy, keeping the per-source contributions so the
    /// breakdown always sums to the composite.
    fn combine(&self, subs: &SubScores) -> (Decimal, ScoreBreakdown) {
        let weighted = |weight: Decimal, sub: Option<Decimal>| {
            sub.map(|score| weight * score / Decimal::ONE_HUNDRED)
        };

        let parts = [
            weighted(self.weights.market, subs.market),
            weighted(self.weights.popularity, subs.popularity),
            weighted(self.weights.video_engagement, subs.video_engagement),
            weighted(self.weights.search_interest, subs.search_interest),
            weighted(self.weights.media_sentiment, subs.media_sentiment),
        ];
        let present_weight = [
            (self.weights.market, subs.market),
            (self.weights.popularity, subs.popularity),
            (self.weights.video_engagement, subs.video_engagement),
            (self.weights.search_interest, subs.search_interest),
            (self.weights.media_sentiment, subs.media_sentiment),
        ]
        .iter()
        .filter(|(_, sub)| sub.is_some())
        .map(|(weight, _)| *weight)
        .sum::<Decimal>();

        // Zero-fill keeps the weight mass at 100 so absent sources depress
        // the score; renormalize scales the present mass back up to 100.
        let scale = match self.policy {
            MissingProviderPolicy::ZeroFill => Decimal::ONE,
            MissingProviderPolicy::Renormalize if present_weight.is_zero() => Decimal::ONE,
            MissingProviderPolicy::Renormalize => Decimal::ONE_HUNDRED / present_weight,
        };

        let contribution =
            |part: Option<Decimal>| (part.unwrap_or(Decimal::ZERO) * scale).round_dp(2);
        let breakdown = ScoreBreakdown {
            market: contribution(parts[0]),
            popularity: contribution(parts[1]),
            video_engagement: contribution(parts[2]),
            search_interest: contribution(parts[3]),
            media_sentiment: contribution(parts[4]),
        };

        let composite = (breakdown.market
            + breakdown.popularity
            + breakdown.video_engagement
            + breakdown.search_interest
            + breakdown.media_sentiment)
            .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);

        (composite, breakdown)
    }

    /// Turns a fair price into a call against the live quote.
    ///
    /// The side comes from comparing fair price to the implied chance; the
    /// edge is measured against the price the trade would actually get (ask
    /// to buy YES, bid to sell into for NO), falling back to the last traded
    /// price. Whenever no applicable price exists, or the edge is below the
    /// noise threshold, the call is `Hold`.
    fn recommend(&self, quote: &MarketQuote, fair_price: Decimal) -> (Recommendation, Decimal) {
        let Some(implied) = quote.implied_chance.or(quote.last_price) else {
            return (Recommendation::Hold, Decimal::ZERO);
        };
        if fair_price == implied {
            return (Recommendation::Hold, Decimal::ZERO);
        }

        let (side, relevant_price) = if fair_price > implied {
            (Recommendation::BuyYes, quote.yes_ask.or(quote.last_price))
        } else {
            (Recommendation::BuyNo, quote.yes_bid.or(quote.last_price))
        };
        let Some(price) = relevant_price else {
            return (Recommendation::Hold, Decimal::ZERO);
        };

        let edge_points = (fair_price - price).abs();
        if edge_points < self.min_edge_points {
            (Recommendation::Hold, edge_points)
        } else {
            (side, edge_points)
        }
    }
}

fn search_views(record: &MergedRecord) -> Option<u64> {
    match record.provider(ProviderKind::SearchInterest) {
        Some(ProviderRecord::SearchInterest { total_views, .. }) => Some(*total_views),
        _ => None,
    }
}

/// Reads the sub-score a provider derived itself (video engagement, media
/// sentiment).
fn derived_score(record: &MergedRecord, kind: ProviderKind) -> Option<Decimal> {
    match record.provider(kind) {
        Some(ProviderRecord::VideoEngagement { score, .. })
        | Some(ProviderRecord::MediaSentiment { score, .. }) => Some(*score),
        _ => None,
    }
}

/// Catalog popularity sub-score: 60% audience rating, 40% popularity index
/// against a fixed ceiling, plus a flat trending bonus. A `found=false`
/// record contributes nothing.
fn popularity_subscore(record: &MergedRecord) -> Option<Decimal> {
    let Some(ProviderRecord::Popularity {
        vote_average,
        popularity,
        trending_rank,
        found,
        ..
    }) = record.provider(ProviderKind::Popularity)
    else {
        return None;
    };
    if !found {
        return None;
    }

    let ceiling = Decimal::from(POPULARITY_INDEX_CEILING);
    let rating = *vote_average * Decimal::TEN;
    let index = (*popularity).min(ceiling) * Decimal::ONE_HUNDRED / ceiling;
    let mut score = (rating * Decimal::from(60) + index * Decimal::from(40)) / Decimal::ONE_HUNDRED;
    if trending_rank.is_some() {
        score += Decimal::from(TRENDING_BONUS);
    }

    Some(score.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED).round_dp(1))
}

/// Relative search interest: this show's share of the snapshot-wide weekly
/// page views, on the 0-100 scale.
fn search_subscore(record: &MergedRecord, total_search_views: u64) -> Option<Decimal> {
    let views = search_views(record)?;
    if total_search_views == 0 {
        return Some(Decimal::ZERO);
    }
    Some(
        (Decimal::from(views) * Decimal::ONE_HUNDRED / Decimal::from(total_search_views))
            .round_dp(1),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn quote_with(
        implied: Option<Decimal>,
        yes_bid: Option<Decimal>,
        yes_ask: Option<Decimal>,
        last_price: Option<Decimal>,
    ) -> MarketQuote {
        MarketQuote {
            ticker: "TEST".to_string(),
            title: "Test".to_string(),
            subtitle: None,
            yes_bid,
            yes_ask,
            no_bid: None,
            no_ask: Some(dec!(45)),
            last_price,
            volume: 1000,
            open_interest: 0,
            implied_chance: implied,
        }
    }

    fn record(quote: MarketQuote, providers: Vec<ProviderRecord>) -> MergedRecord {
        let providers: BTreeMap<ProviderKind, ProviderRecord> = providers
            .into_iter()
            .map(|record| (record.kind(), record))
            .collect();
        MergedRecord {
            show_name: "Stranger Things".to_string(),
            market: quote,
            providers,
            score: ScoreCard::new(),
        }
    }

    fn video(score: Decimal) -> ProviderRecord {
        ProviderRecord::VideoEngagement {
            total_views: 1_000_000,
            total_likes: 40_000,
            like_ratio: dec!(0.04),
            sentiment: dec!(0.2),
            score,
        }
    }

    fn news(score: Decimal) -> ProviderRecord {
        ProviderRecord::MediaSentiment {
            sentiment: dec!(0.3),
            article_count: 30,
            top_headlines: vec![],
            score,
        }
    }

    fn popularity(vote_average: Decimal, index: Decimal, trending: bool) -> ProviderRecord {
        ProviderRecord::Popularity {
            vote_average,
            vote_count: 5000,
            popularity: index,
            trending_rank: trending.then_some(3),
            found: true,
        }
    }

    fn interest(views: u64) -> ProviderRecord {
        ProviderRecord::SearchInterest {
            points: vec![],
            total_views: views,
            avg_daily_views: Decimal::ZERO,
        }
    }

    fn scorer() -> Scorer {
        Scorer::new(&ScoringConfig::default())
    }

    #[test]
    fn full_coverage_composite_stays_in_range() {
        let mut records = vec![record(
            quote_with(Some(dec!(80)), Some(dec!(78)), Some(dec!(82)), None),
            vec![
                video(dec!(70)),
                news(dec!(60)),
                popularity(dec!(8), dec!(200), true),
                interest(700_000),
            ],
        )];
        scorer().annotate(&mut records);

        let score = &records[0].score;
        assert!(score.composite_score >= Decimal::ZERO);
        assert!(score.composite_score <= Decimal::ONE_HUNDRED);
        // All five sources contributed.
        assert!(score.breakdown.market > Decimal::ZERO);
        assert!(score.breakdown.popularity > Decimal::ZERO);
        assert!(score.breakdown.video_engagement > Decimal::ZERO);
        assert!(score.breakdown.search_interest > Decimal::ZERO);
        assert!(score.breakdown.media_sentiment > Decimal::ZERO);
    }

    #[test]
    fn end_to_end_buy_yes_with_fifteen_points_of_edge() {
        // The lone record owns the full search share (100). Contributions:
        // 50%*66 + 10%*50 + 20%*100 + 5%*100 + 15%*80
        //   = 33 + 5 + 20 + 5 + 12 = 75.
        let mut records = vec![record(
            quote_with(Some(dec!(66)), Some(dec!(58)), Some(dec!(60)), None),
            vec![
                video(dec!(100)),
                news(dec!(80)),
                popularity(dec!(5), dec!(125), false),
                interest(600),
            ],
        )];
        scorer().annotate(&mut records);

        let score = &records[0].score;
        assert_eq!(score.composite_score, dec!(75));
        assert_eq!(score.fair_price, dec!(75));
        assert_eq!(score.recommendation, Recommendation::BuyYes);
        assert_eq!(score.edge_points, dec!(15));
    }

    #[test]
    fn missing_providers_zero_fill_but_never_fail() {
        let mut records = vec![record(
            quote_with(Some(dec!(80)), Some(dec!(78)), Some(dec!(82)), None),
            vec![],
        )];
        scorer().annotate(&mut records);

        let score = &records[0].score;
        // Only the market signal contributes: 50% of 80.
        assert_eq!(score.composite_score, dec!(40));
        assert_eq!(score.breakdown.video_engagement, Decimal::ZERO);
        // fair price and recommendation are still defined.
        assert_eq!(score.fair_price, dec!(40));
        assert_eq!(score.recommendation, Recommendation::BuyNo);
    }

    #[test]
    fn renormalize_policy_scales_present_weights() {
        let config = ScoringConfig {
            missing_provider_policy: MissingProviderPolicy::Renormalize,
            ..ScoringConfig::default()
        };
        let mut records = vec![record(
            quote_with(Some(dec!(80)), Some(dec!(78)), Some(dec!(82)), None),
            vec![],
        )];
        Scorer::new(&config).annotate(&mut records);

        // The market is the only present source, so it carries full weight.
        assert_eq!(records[0].score.composite_score, dec!(80));
    }

    #[test]
    fn buy_yes_measures_edge_against_the_ask() {
        let (call, edge) = scorer().recommend(
            &quote_with(Some(dec!(55)), Some(dec!(48)), Some(dec!(50)), None),
            dec!(70),
        );
        assert_eq!(call, Recommendation::BuyYes);
        assert_eq!(edge, dec!(20));
    }

    #[test]
    fn buy_no_measures_edge_against_the_bid() {
        let (call, edge) = scorer().recommend(
            &quote_with(Some(dec!(60)), Some(dec!(55)), Some(dec!(58)), None),
            dec!(30),
        );
        assert_eq!(call, Recommendation::BuyNo);
        assert_eq!(edge, dec!(25));
    }

    #[test]
    fn edge_below_threshold_is_noise() {
        let (call, edge) = scorer().recommend(
            &quote_with(Some(dec!(50)), Some(dec!(49)), Some(dec!(50)), None),
            dec!(52),
        );
        assert_eq!(call, Recommendation::Hold);
        assert_eq!(edge, dec!(2));
    }

    #[test]
    fn missing_side_price_falls_back_to_last_trade() {
        let (call, edge) = scorer().recommend(
            &quote_with(Some(dec!(50)), None, None, Some(dec!(50))),
            dec!(70),
        );
        assert_eq!(call, Recommendation::BuyYes);
        assert_eq!(edge, dec!(20));
    }

    #[test]
    fn no_market_price_at_all_forces_hold() {
        let (call, edge) = scorer().recommend(&quote_with(None, None, None, None), dec!(70));
        assert_eq!(call, Recommendation::Hold);
        assert_eq!(edge, Decimal::ZERO);
    }

    #[test]
    fn tie_with_implied_chance_holds() {
        let (call, _) = scorer().recommend(
            &quote_with(Some(dec!(70)), Some(dec!(68)), Some(dec!(72)), None),
            dec!(70),
        );
        assert_eq!(call, Recommendation::Hold);
    }

    #[test]
    fn search_interest_is_relative_across_the_snapshot() {
        let mut records = vec![
            record(
                quote_with(Some(dec!(50)), None, None, None),
                vec![interest(750)],
            ),
            record(
                quote_with(Some(dec!(50)), None, None, None),
                vec![interest(250)],
            ),
        ];
        scorer().annotate(&mut records);

        // 5% weight: 75% share -> 3.75 -> rounded contribution; 25% -> 1.25.
        assert_eq!(records[0].score.breakdown.search_interest, dec!(3.75));
        assert_eq!(records[1].score.breakdown.search_interest, dec!(1.25));
    }

    #[test]
    fn found_false_popularity_contributes_nothing() {
        let mut records = vec![record(
            quote_with(Some(dec!(60)), None, None, None),
            vec![ProviderRecord::Popularity {
                vote_average: Decimal::ZERO,
                vote_count: 0,
                popularity: Decimal::ZERO,
                trending_rank: None,
                found: false,
            }],
        )];
        scorer().annotate(&mut records);
        assert_eq!(records[0].score.breakdown.popularity, Decimal::ZERO);
    }
}
