use async_trait::async_trait;
use configuration::{FetchConfig, TmdbConfig};
use core_types::{ProviderKind, ProviderRecord};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::ProviderError;
use crate::ProviderAdapter;

/// Catalog popularity adapter backed by the TMDB API.
pub struct TmdbClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<TvSummary>,
}

#[derive(Debug, Deserialize)]
struct TvSummary {
    id: i64,
    vote_average: Option<f64>,
    vote_count: Option<i64>,
    popularity: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct TrendingResponse {
    #[serde(default)]
    results: Vec<TrendingEntry>,
}

#[derive(Debug, Deserialize)]
struct TrendingEntry {
    id: i64,
}

impl TmdbClient {
    pub fn new(config: &TmdbConfig, fetch: &FetchConfig) -> Self {
        Self {
            client: crate::http_client(fetch),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    fn api_key(&self) -> Result<&str, ProviderError> {
        self.api_key
            .as_deref()
            .ok_or(ProviderError::MissingCredentials("TMDB api_key"))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, ProviderError> {
        let api_key = self.api_key()?;
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("api_key", api_key)])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ProviderError::Api(format!(
                "{path} request failed with {status}: {text}"
            )));
        }
        serde_json::from_str(&text).map_err(|e| ProviderError::Deserialization(e.to_string()))
    }

    /// 1-based position of the show in the weekly trending list, if present.
    /// A trending failure only costs the rank, never the record.
    async fn trending_rank(&self, tv_id: i64) -> Option<u32> {
        let trending: TrendingResponse = match self
            .get_json("/trending/tv/week", &[("language", "en-US")])
            .await
        {
            Ok(trending) => trending,
            Err(err) => {
                tracing::debug!(error = %err, "Trending lookup failed; omitting rank.");
                return None;
            }
        };

        trending
            .results
            .iter()
            .position(|entry| entry.id == tv_id)
            .map(|idx| idx as u32 + 1)
    }
}

#[async_trait]
impl ProviderAdapter for TmdbClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Popularity
    }

    async fn fetch(&self, show: &str) -> Result<Option<ProviderRecord>, ProviderError> {
        let search: SearchResponse = self
            .get_json(
                "/search/tv",
                &[
                    ("query", show),
                    ("language", "en-US"),
                    ("include_adult", "false"),
                ],
            )
            .await?;

        let Some(hit) = search.results.into_iter().next() else {
            // The catalog has no entry; surface that as found=false so
            // coverage stays visible downstream.
            return Ok(Some(ProviderRecord::Popularity {
                vote_average: Decimal::ZERO,
                vote_count: 0,
                popularity: Decimal::ZERO,
                trending_rank: None,
                found: false,
            }));
        };

        let trending_rank = self.trending_rank(hit.id).await;

        Ok(Some(ProviderRecord::Popularity {
            vote_average: Decimal::from_f64(hit.vote_average.unwrap_or(0.0))
                .unwrap_or(Decimal::ZERO),
            vote_count: hit.vote_count.unwrap_or(0),
            popularity: Decimal::from_f64(hit.popularity.unwrap_or(0.0)).unwrap_or(Decimal::ZERO),
            trending_rank,
            found: true,
        }))
    }
}
