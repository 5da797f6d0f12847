use async_trait::async_trait;
use configuration::{FetchConfig, YoutubeConfig};
use core_types::{ProviderKind, ProviderRecord};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::ProviderError;
use crate::{sentiment, ProviderAdapter};

/// Trailer engagement adapter backed by the YouTube Data API.
///
/// One fetch is three upstream calls: a trailer search, a statistics batch
/// for the hits, and a comment sweep on the top hit for sentiment.
pub struct YoutubeClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    max_videos: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
}

#[derive(Debug, Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    statistics: VideoStatistics,
}

/// The API reports counts as strings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoStatistics {
    view_count: Option<String>,
    like_count: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommentThreadsResponse {
    #[serde(default)]
    items: Vec<CommentThread>,
}

#[derive(Debug, Deserialize)]
struct CommentThread {
    snippet: CommentThreadSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentThreadSnippet {
    top_level_comment: TopLevelComment,
}

#[derive(Debug, Deserialize)]
struct TopLevelComment {
    snippet: CommentSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentSnippet {
    text_display: Option<String>,
}

impl YoutubeClient {
    pub fn new(config: &YoutubeConfig, fetch: &FetchConfig) -> Self {
        Self {
            client: crate::http_client(fetch),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            max_videos: config.max_videos,
        }
    }

    fn api_key(&self) -> Result<&str, ProviderError> {
        self.api_key
            .as_deref()
            .ok_or(ProviderError::MissingCredentials("YouTube api_key"))
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
            .query(&[("key", api_key)])
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

    /// Average comment sentiment for one video, neutral when comments are
    /// unavailable (disabled comments, quota, etc).
    async fn comment_sentiment(&self, video_id: &str) -> f64 {
        let threads: CommentThreadsResponse = match self
            .get_json(
                "/commentThreads",
                &[
                    ("part", "snippet"),
                    ("videoId", video_id),
                    ("maxResults", "50"),
                    ("order", "relevance"),
                    ("textFormat", "plainText"),
                ],
            )
            .await
        {
            Ok(threads) => threads,
            Err(err) => {
                tracing::debug!(video_id, error = %err, "Comment sweep failed; using neutral sentiment.");
                return 0.0;
            }
        };

        let scores: Vec<f64> = threads
            .items
            .iter()
            .filter_map(|t| t.snippet.top_level_comment.snippet.text_display.as_deref())
            .map(sentiment::score_text)
            .collect();

        if scores.is_empty() {
            return 0.0;
        }
        scores.iter().sum::<f64>() / scores.len() as f64
    }
}

/// Blends the raw engagement numbers into a 0-100 sub-score:
/// 60% log-scaled views, 25% like ratio, 15% sentiment.
fn engagement_score(total_views: u64, like_ratio: f64, sentiment: f64) -> f64 {
    // 10^8 views saturates the view component.
    let views_norm = ((total_views as f64 + 1.0).log10() / 8.0).clamp(0.0, 1.0);
    // A 5% like ratio is an exceptional trailer; saturate there.
    let likes_norm = (like_ratio * 20.0).clamp(0.0, 1.0);
    let sentiment_norm = (sentiment + 1.0) / 2.0;

    (views_norm * 60.0 + likes_norm * 25.0 + sentiment_norm * 15.0).clamp(0.0, 100.0)
}

#[async_trait]
impl ProviderAdapter for YoutubeClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::VideoEngagement
    }

    async fn fetch(&self, show: &str) -> Result<Option<ProviderRecord>, ProviderError> {
        let query = format!("{show} official trailer");
        let max_results = self.max_videos.to_string();
        let search: SearchResponse = self
            .get_json(
                "/search",
                &[
                    ("part", "snippet"),
                    ("type", "video"),
                    ("q", &query),
                    ("maxResults", &max_results),
                    ("order", "relevance"),
                ],
            )
            .await?;

        let video_ids: Vec<String> = search
            .items
            .into_iter()
            .filter_map(|item| item.id.video_id)
            .collect();
        if video_ids.is_empty() {
            return Ok(None);
        }

        let videos: VideosResponse = self
            .get_json(
                "/videos",
                &[("part", "statistics"), ("id", &video_ids.join(","))],
            )
            .await?;

        let mut total_views = 0_u64;
        let mut total_likes = 0_u64;
        for video in &videos.items {
            total_views += parse_count(video.statistics.view_count.as_deref());
            total_likes += parse_count(video.statistics.like_count.as_deref());
        }

        let like_ratio = if total_views > 0 {
            total_likes as f64 / total_views as f64
        } else {
            0.0
        };
        let sentiment = self.comment_sentiment(&video_ids[0]).await;
        let score = engagement_score(total_views, like_ratio, sentiment);

        Ok(Some(ProviderRecord::VideoEngagement {
            total_views,
            total_likes,
            like_ratio: decimal(like_ratio, 4),
            sentiment: decimal(sentiment, 4),
            score: decimal(score, 1),
        }))
    }
}

fn parse_count(raw: Option<&str>) -> u64 {
    raw.and_then(|value| value.parse().ok()).unwrap_or(0)
}

fn decimal(value: f64, dp: u32) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO).round_dp(dp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engagement_score_scales_with_views() {
        let small = engagement_score(10_000, 0.04, 0.0);
        let large = engagement_score(50_000_000, 0.04, 0.0);
        assert!(large > small, "expected {large} > {small}");
        assert!(large <= 100.0);
    }

    #[test]
    fn engagement_score_rewards_sentiment() {
        let neutral = engagement_score(1_000_000, 0.04, 0.0);
        let loved = engagement_score(1_000_000, 0.04, 0.8);
        assert!(loved > neutral);
    }

    #[test]
    fn engagement_score_handles_zero_views() {
        assert_eq!(engagement_score(0, 0.0, -1.0), 0.0);
    }

    #[test]
    fn parse_count_tolerates_missing_fields() {
        assert_eq!(parse_count(Some("12345")), 12345);
        assert_eq!(parse_count(Some("not a number")), 0);
        assert_eq!(parse_count(None), 0);
    }
}
