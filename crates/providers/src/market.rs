use async_trait::async_trait;
use configuration::{FetchConfig, MarketConfig};
use core_types::MarketQuote;
use reqwest::header::{HeaderMap, HeaderValue};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::auth::sign_request;
use crate::error::ProviderError;
use crate::MarketDataClient;

/// A concrete implementation of `MarketDataClient` for the Kalshi exchange.
///
/// Credentials are optional: without them requests go out unsigned, which is
/// enough for the public demo endpoints.
pub struct KalshiClient {
    client: reqwest::Client,
    base_url: String,
    event_ticker: String,
    top_markets: usize,
    credentials: Option<Credentials>,
}

struct Credentials {
    key_id: String,
    secret: String,
}

// Intermediate structs for deserializing the markets listing.
#[derive(Debug, Deserialize)]
struct RawMarketsResponse {
    #[serde(default)]
    markets: Vec<RawMarket>,
}

#[derive(Debug, Deserialize)]
struct RawMarket {
    ticker: String,
    #[serde(default)]
    title: String,
    subtitle: Option<String>,
    yes_bid: Option<Decimal>,
    yes_ask: Option<Decimal>,
    no_bid: Option<Decimal>,
    no_ask: Option<Decimal>,
    last_price: Option<Decimal>,
    #[serde(default)]
    volume: i64,
    #[serde(default)]
    open_interest: i64,
}

impl KalshiClient {
    pub fn new(market: &MarketConfig, fetch: &FetchConfig) -> Self {
        let credentials = match (&market.api_key_id, &market.api_secret) {
            (Some(key_id), Some(secret)) => Some(Credentials {
                key_id: key_id.clone(),
                secret: secret.clone(),
            }),
            _ => {
                tracing::info!("Kalshi credentials not configured; using unsigned requests.");
                None
            }
        };

        Self {
            client: crate::http_client(fetch),
            base_url: market.base_url.trim_end_matches('/').to_string(),
            event_ticker: market.event_ticker.clone(),
            top_markets: market.top_markets,
            credentials,
        }
    }

    /// The URL path as it must appear in the signature: the base URL's path
    /// prefix plus the endpoint, query string excluded.
    fn signed_path(&self, endpoint: &str) -> String {
        let after_scheme = self
            .base_url
            .split_once("://")
            .map_or(self.base_url.as_str(), |(_, rest)| rest);
        match after_scheme.find('/') {
            Some(idx) => format!("{}{}", &after_scheme[idx..], endpoint),
            None => endpoint.to_string(),
        }
    }

    /// Builds the `KALSHI-ACCESS-*` headers for an authenticated request, or
    /// an empty map when no credentials are configured.
    fn auth_headers(&self, method: &str, endpoint: &str) -> Result<HeaderMap, ProviderError> {
        let mut headers = HeaderMap::new();
        let Some(credentials) = &self.credentials else {
            return Ok(headers);
        };

        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| ProviderError::Api(format!("System clock before UNIX epoch: {e}")))?
            .as_millis();
        let timestamp = timestamp_ms.to_string();

        // Per docs: sign timestamp + METHOD + path (no query params).
        let message = format!(
            "{timestamp}{}{}",
            method.to_uppercase(),
            self.signed_path(endpoint)
        );
        let signature = sign_request(&credentials.secret, &message);

        let header = |value: &str| {
            HeaderValue::from_str(value)
                .map_err(|e| ProviderError::Api(format!("Invalid header value: {e}")))
        };
        headers.insert("KALSHI-ACCESS-KEY", header(&credentials.key_id)?);
        headers.insert("KALSHI-ACCESS-TIMESTAMP", header(&timestamp)?);
        headers.insert("KALSHI-ACCESS-SIGNATURE", header(&signature)?);
        Ok(headers)
    }
}

/// Ranking key for the event's markets: prefer yes_bid, then last_price.
fn market_sort_key(market: &RawMarket) -> Decimal {
    market
        .yes_bid
        .or(market.last_price)
        .unwrap_or(Decimal::ZERO)
}

fn normalize(raw: RawMarket) -> MarketQuote {
    // Implied chance: last traded price, falling back to the standing bid.
    let implied_chance = raw.last_price.or(raw.yes_bid);
    MarketQuote {
        ticker: raw.ticker,
        title: raw.title,
        subtitle: raw.subtitle,
        yes_bid: raw.yes_bid,
        yes_ask: raw.yes_ask,
        no_bid: raw.no_bid,
        no_ask: raw.no_ask,
        last_price: raw.last_price,
        volume: raw.volume,
        open_interest: raw.open_interest,
        implied_chance,
    }
}

#[async_trait]
impl MarketDataClient for KalshiClient {
    async fn fetch_event_quotes(&self) -> Result<Vec<MarketQuote>, ProviderError> {
        let endpoint = "/markets";
        let url = format!("{}{}", self.base_url, endpoint);
        let headers = self.auth_headers("GET", endpoint)?;

        let response = self
            .client
            .get(&url)
            .headers(headers)
            .query(&[
                ("event_ticker", self.event_ticker.as_str()),
                ("status", "open"),
                ("limit", "1000"),
            ])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ProviderError::Api(format!(
                "markets request failed with {status}: {text}"
            )));
        }

        let parsed: RawMarketsResponse = serde_json::from_str(&text)
            .map_err(|e| ProviderError::Deserialization(e.to_string()))?;

        let mut markets = parsed.markets;
        markets.sort_by(|a, b| market_sort_key(b).cmp(&market_sort_key(a)));
        markets.truncate(self.top_markets);

        tracing::debug!(
            event_ticker = %self.event_ticker,
            count = markets.len(),
            "Fetched top event markets."
        );

        Ok(markets.into_iter().map(normalize).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn raw(ticker: &str, yes_bid: Option<Decimal>, last_price: Option<Decimal>) -> RawMarket {
        RawMarket {
            ticker: ticker.to_string(),
            title: ticker.to_string(),
            subtitle: None,
            yes_bid,
            yes_ask: None,
            no_bid: None,
            no_ask: None,
            last_price,
            volume: 0,
            open_interest: 0,
        }
    }

    #[test]
    fn sort_key_prefers_yes_bid_over_last_price() {
        let market = raw("A", Some(dec!(40)), Some(dec!(90)));
        assert_eq!(market_sort_key(&market), dec!(40));

        let market = raw("B", None, Some(dec!(90)));
        assert_eq!(market_sort_key(&market), dec!(90));

        let market = raw("C", None, None);
        assert_eq!(market_sort_key(&market), Decimal::ZERO);
    }

    #[test]
    fn normalize_resolves_implied_chance_fallback() {
        let quote = normalize(raw("A", Some(dec!(40)), Some(dec!(55))));
        assert_eq!(quote.implied_chance, Some(dec!(55)));

        let quote = normalize(raw("B", Some(dec!(40)), None));
        assert_eq!(quote.implied_chance, Some(dec!(40)));

        let quote = normalize(raw("C", None, None));
        assert_eq!(quote.implied_chance, None);
    }

    #[test]
    fn signed_path_includes_base_prefix() {
        let client = KalshiClient::new(
            &MarketConfig {
                base_url: "https://demo-api.kalshi.co/trade-api/v2".to_string(),
                event_ticker: "KXNETFLIXRANK".to_string(),
                top_markets: 5,
                api_key_id: None,
                api_secret: None,
            },
            &FetchConfig::default(),
        );
        assert_eq!(client.signed_path("/markets"), "/trade-api/v2/markets");
    }
}
