use async_trait::async_trait;
use chrono::{Duration, Utc};
use configuration::{FetchConfig, WikipediaConfig};
use core_types::{PageViewPoint, ProviderKind, ProviderRecord};
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::ProviderError;
use crate::ProviderAdapter;

/// Search-interest adapter backed by the Wikimedia per-article pageviews API.
pub struct WikipediaClient {
    client: reqwest::Client,
    base_url: String,
    project: String,
    user_agent: String,
    trailing_days: i64,
}

#[derive(Debug, Deserialize)]
struct PageviewsResponse {
    #[serde(default)]
    items: Vec<PageviewsItem>,
}

#[derive(Debug, Deserialize)]
struct PageviewsItem {
    #[serde(default)]
    timestamp: String,
    #[serde(default)]
    views: u64,
}

impl WikipediaClient {
    pub fn new(config: &WikipediaConfig, fetch: &FetchConfig) -> Self {
        Self {
            client: crate::http_client(fetch),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            project: config.project.clone(),
            user_agent: config.user_agent.clone(),
            trailing_days: config.trailing_days,
        }
    }

    /// The article slug for a show title: spaces become underscores.
    fn article_title(show: &str) -> String {
        show.trim().replace(' ', "_")
    }
}

#[async_trait]
impl ProviderAdapter for WikipediaClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::SearchInterest
    }

    async fn fetch(&self, show: &str) -> Result<Option<ProviderRecord>, ProviderError> {
        let article = Self::article_title(show);
        if article.is_empty() {
            return Ok(None);
        }

        // Trailing window of full days, ending yesterday (today's count is
        // still accumulating upstream).
        let end = Utc::now().date_naive() - Duration::days(1);
        let start = end - Duration::days(self.trailing_days - 1);
        let url = format!(
            "{}/{}/all-access/all-agents/{}/daily/{}00/{}00",
            self.base_url,
            self.project,
            article,
            start.format("%Y%m%d"),
            end.format("%Y%m%d"),
        );

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .send()
            .await?;

        // The pageviews API answers 404 for unknown articles.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ProviderError::Api(format!(
                "pageviews request failed with {status}: {text}"
            )));
        }

        let parsed: PageviewsResponse = serde_json::from_str(&text)
            .map_err(|e| ProviderError::Deserialization(e.to_string()))?;

        let points: Vec<PageViewPoint> = parsed
            .items
            .into_iter()
            .map(|item| PageViewPoint {
                date: item.timestamp.chars().take(8).collect(),
                views: item.views,
            })
            .collect();
        if points.is_empty() {
            return Ok(None);
        }

        let total_views: u64 = points.iter().map(|p| p.views).sum();
        let avg_daily_views =
            (Decimal::from(total_views) / Decimal::from(points.len() as u64)).round_dp(1);

        Ok(Some(ProviderRecord::SearchInterest {
            points,
            total_views,
            avg_daily_views,
        }))
    }
}
