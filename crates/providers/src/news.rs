use async_trait::async_trait;
use configuration::{FetchConfig, NewsConfig};
use core_types::{Headline, ProviderKind, ProviderRecord};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::ProviderError;
use crate::{sentiment, ProviderAdapter};

/// How many headlines a record retains for display.
const TOP_HEADLINES: usize = 3;

/// Article volume at which the coverage damping factor saturates.
const FULL_COVERAGE_ARTICLES: usize = 25;

/// Press-coverage sentiment adapter backed by the GNews API.
pub struct GnewsClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    max_articles: usize,
    language: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    articles: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
struct RawArticle {
    #[serde(default)]
    title: String,
    description: Option<String>,
    source: Option<RawSource>,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    name: Option<String>,
}

impl GnewsClient {
    pub fn new(config: &NewsConfig, fetch: &FetchConfig) -> Self {
        Self {
            client: crate::http_client(fetch),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            max_articles: config.max_articles,
            language: config.language.clone(),
        }
    }

    fn api_key(&self) -> Result<&str, ProviderError> {
        self.api_key
            .as_deref()
            .ok_or(ProviderError::MissingCredentials("GNews api_key"))
    }
}

/// Maps an average sentiment and an article count to a 0-100 sub-score.
///
/// The sentiment is centered at 50 and pulled back toward neutral by a
/// coverage factor, so one glowing article cannot dominate a show with broad
/// but mixed coverage.
fn coverage_score(avg_sentiment: f64, article_count: usize) -> f64 {
    let base = (avg_sentiment + 1.0) / 2.0 * 100.0;
    let coverage = (article_count.min(FULL_COVERAGE_ARTICLES) as f64)
        / FULL_COVERAGE_ARTICLES as f64;
    (50.0 + (base - 50.0) * coverage).clamp(0.0, 100.0)
}

#[async_trait]
impl ProviderAdapter for GnewsClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::MediaSentiment
    }

    async fn fetch(&self, show: &str) -> Result<Option<ProviderRecord>, ProviderError> {
        let api_key = self.api_key()?;
        let url = format!("{}/search", self.base_url);
        let max = self.max_articles.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", show),
                ("lang", &self.language),
                ("max", &max),
                ("sortby", "relevance"),
                ("apikey", api_key),
            ])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ProviderError::Api(format!(
                "news search failed with {status}: {text}"
            )));
        }

        let parsed: SearchResponse = serde_json::from_str(&text)
            .map_err(|e| ProviderError::Deserialization(e.to_string()))?;
        if parsed.articles.is_empty() {
            return Ok(None);
        }

        let article_count = parsed.articles.len();
        let mut sentiment_sum = 0.0_f64;
        let mut top_headlines = Vec::with_capacity(TOP_HEADLINES);
        for article in &parsed.articles {
            let text_to_analyze = match &article.description {
                Some(description) => format!("{}. {}", article.title, description),
                None => article.title.clone(),
            };
            sentiment_sum += sentiment::score_text(&text_to_analyze);

            if top_headlines.len() < TOP_HEADLINES && !article.title.is_empty() {
                top_headlines.push(Headline {
                    title: article.title.clone(),
                    source: article.source.as_ref().and_then(|s| s.name.clone()),
                });
            }
        }

        let avg_sentiment = sentiment_sum / article_count as f64;
        let score = coverage_score(avg_sentiment, article_count);

        Ok(Some(ProviderRecord::MediaSentiment {
            sentiment: decimal(avg_sentiment, 4),
            article_count,
            top_headlines,
            score: decimal(score, 1),
        }))
    }
}

fn decimal(value: f64, dp: u32) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO).round_dp(dp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_coverage_scores_fifty() {
        assert_eq!(coverage_score(0.0, 25), 50.0);
        assert_eq!(coverage_score(0.0, 3), 50.0);
    }

    #[test]
    fn thin_coverage_is_damped_toward_neutral() {
        let thin = coverage_score(0.9, 2);
        let broad = coverage_score(0.9, 25);
        assert!(broad > thin, "expected {broad} > {thin}");
        assert!(thin > 50.0);
    }

    #[test]
    fn negative_coverage_scores_below_fifty() {
        assert!(coverage_score(-0.6, 25) < 50.0);
    }

    #[test]
    fn score_is_clamped() {
        assert!(coverage_score(1.0, 100) <= 100.0);
        assert!(coverage_score(-1.0, 100) >= 0.0);
    }
}
