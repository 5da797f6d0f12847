//! Entity resolution and record assembly.
//!
//! Both steps are pure: the active show set is the canonicalized,
//! de-duplicated image of the quote labels, and merging is a grouping
//! operation with no precedence conflicts since every provider owns a
//! disjoint field namespace.

use std::collections::HashSet;

use core_types::{canonical_show_title, MarketQuote, MergedRecord, ProviderKind, ScoreCard};

use crate::orchestrator::FetchResults;

/// Derives the active show set from a ranked quote list.
///
/// Quotes arrive ranked best-first; the first quote per canonical title wins,
/// so one show never appears twice even when several of its seasons trade at
/// once. Labels that canonicalize to nothing are discarded.
pub fn resolve_entities(quotes: &[MarketQuote]) -> Vec<(String, MarketQuote)> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut entities = Vec::new();

    for quote in quotes {
        let show_name = canonical_show_title(quote.raw_show_label());
        if show_name.is_empty() {
            tracing::debug!(ticker = %quote.ticker, "Quote label canonicalized to empty; dropping.");
            continue;
        }
        if seen.insert(show_name.clone()) {
            entities.push((show_name, quote.clone()));
        }
    }

    entities
}

/// Folds the settled fetch results into one record per show.
///
/// The quote is mandatory and already paired with each show; provider data
/// is optional, so absent results just leave the provider map sparse. The
/// score card stays zeroed here; the scorer fills it in.
pub fn merge(entities: Vec<(String, MarketQuote)>, mut results: FetchResults) -> Vec<MergedRecord> {
    entities
        .into_iter()
        .map(|(show_name, market)| {
            let providers = ProviderKind::ALL
                .iter()
                .filter_map(|kind| {
                    results
                        .remove(&(show_name.clone(), *kind))
                        .map(|record| (*kind, record))
                })
                .collect();

            MergedRecord {
                show_name,
                market,
                providers,
                score: ScoreCard::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::ProviderRecord;
    use rust_decimal::Decimal;

    fn quote(ticker: &str, subtitle: Option<&str>, title: &str) -> MarketQuote {
        MarketQuote {
            ticker: ticker.to_string(),
            title: title.to_string(),
            subtitle: subtitle.map(|s| s.to_string()),
            yes_bid: None,
            yes_ask: None,
            no_bid: None,
            no_ask: None,
            last_price: None,
            volume: 0,
            open_interest: 0,
            implied_chance: None,
        }
    }

    #[test]
    fn resolves_subtitle_first_with_title_fallback() {
        let quotes = vec![
            quote("T1", Some("Stranger Things 5"), "Top show?"),
            quote("T2", None, "Wednesday 2"),
        ];
        let entities = resolve_entities(&quotes);
        let names: Vec<&str> = entities.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["Stranger Things", "Wednesday"]);
    }

    #[test]
    fn first_quote_wins_per_canonical_title() {
        let quotes = vec![
            quote("T1", Some("Stranger Things 5"), ""),
            quote("T2", Some("Stranger Things: Season 4"), ""),
        ];
        let entities = resolve_entities(&quotes);
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].1.ticker, "T1");
    }

    #[test]
    fn empty_labels_are_dropped() {
        let quotes = vec![quote("T1", Some("5"), ""), quote("T2", None, "")];
        assert!(resolve_entities(&quotes).is_empty());
    }

    #[test]
    fn merge_leaves_missing_providers_sparse() {
        let entities = vec![
            ("Wednesday".to_string(), quote("T1", None, "Wednesday")),
            ("The Crown".to_string(), quote("T2", None, "The Crown")),
        ];
        let mut results = FetchResults::new();
        results.insert(
            ("Wednesday".to_string(), ProviderKind::SearchInterest),
            ProviderRecord::SearchInterest {
                points: vec![],
                total_views: 9000,
                avg_daily_views: Decimal::ZERO,
            },
        );

        let records = merge(entities, results);
        assert_eq!(records.len(), 2);

        let wednesday = &records[0];
        assert_eq!(wednesday.providers.len(), 1);
        assert!(wednesday.provider(ProviderKind::SearchInterest).is_some());

        let crown = &records[1];
        assert!(crown.providers.is_empty());
        // A record with no provider data still exists and still scores.
        assert_eq!(crown.score, ScoreCard::new());
    }
}
