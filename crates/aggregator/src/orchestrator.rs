//! The per-(show, provider) fetch fan-out.
//!
//! Every attempt settles exactly once: with a record, or as absent after an
//! error, a not-found, or a timeout. Nothing a single provider does can abort
//! another show's or another provider's attempt.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use configuration::FetchConfig;
use core_types::{ProviderKind, ProviderRecord};
use providers::ProviderAdapter;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Every settled (show, provider) attempt that produced data. Absent
/// attempts simply have no entry.
pub type FetchResults = HashMap<(String, ProviderKind), ProviderRecord>;

/// Fans out one fetch per (show, adapter) pair and waits for every attempt
/// to settle.
///
/// Calls to the same provider share a semaphore sized by
/// `fetch.per_provider_concurrency`, so upstream rate limits are respected
/// no matter how many shows are in flight. Each call runs under
/// `fetch.timeout_secs`. Dropping the returned future aborts the whole
/// `JoinSet`, which is what makes a wholesale rebuild cancellation abandon
/// its in-flight calls.
pub async fn fetch_all(
    shows: &[String],
    adapters: &[Arc<dyn ProviderAdapter>],
    fetch: &FetchConfig,
) -> FetchResults {
    let timeout = Duration::from_secs(fetch.timeout_secs);
    let limits: HashMap<ProviderKind, Arc<Semaphore>> = adapters
        .iter()
        .map(|adapter| {
            (
                adapter.kind(),
                Arc::new(Semaphore::new(fetch.per_provider_concurrency)),
            )
        })
        .collect();

    let mut attempts = JoinSet::new();
    for adapter in adapters {
        for show in shows {
            let adapter = Arc::clone(adapter);
            let show = show.clone();
            let limit = Arc::clone(&limits[&adapter.kind()]);

            attempts.spawn(async move {
                // The semaphore is never closed, so acquisition only fails
                // during shutdown; proceeding unthrottled then is harmless.
                let _permit = limit.acquire_owned().await.ok();
                let kind = adapter.kind();

                let record = match tokio::time::timeout(timeout, adapter.fetch(&show)).await {
                    Ok(Ok(record)) => record,
                    Ok(Err(err)) => {
                        tracing::warn!(provider = ?kind, show = %show, error = %err, "Provider call failed.");
                        None
                    }
                    Err(_) => {
                        tracing::warn!(provider = ?kind, show = %show, "Provider call timed out.");
                        None
                    }
                };
                (show, kind, record)
            });
        }
    }

    let mut results = FetchResults::new();
    let mut absent: HashMap<ProviderKind, u32> = HashMap::new();
    while let Some(settled) = attempts.join_next().await {
        match settled {
            Ok((show, kind, Some(record))) => {
                results.insert((show, kind), record);
            }
            Ok((_, kind, None)) => {
                *absent.entry(kind).or_default() += 1;
            }
            Err(err) => {
                tracing::error!(error = %err, "A provider fetch task panicked.");
            }
        }
    }

    for (kind, count) in &absent {
        tracing::info!(provider = ?kind, absent = count, "Provider attempts settled without data.");
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use providers::error::ProviderError;
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn interest_record(views: u64) -> ProviderRecord {
        ProviderRecord::SearchInterest {
            points: vec![],
            total_views: views,
            avg_daily_views: Decimal::ZERO,
        }
    }

    /// An adapter whose behavior is scripted per test.
    struct ScriptedAdapter {
        kind: ProviderKind,
        behavior: Behavior,
        calls: AtomicUsize,
        max_observed_in_flight: Arc<AtomicUsize>,
        in_flight: Arc<AtomicUsize>,
    }

    enum Behavior {
        Succeed(u64),
        NotFound,
        Fail,
        Hang,
    }

    impl ScriptedAdapter {
        fn new(kind: ProviderKind, behavior: Behavior) -> Self {
            Self {
                kind,
                behavior,
                calls: AtomicUsize::new(0),
                max_observed_in_flight: Arc::new(AtomicUsize::new(0)),
                in_flight: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl ProviderAdapter for ScriptedAdapter {
        fn kind(&self) -> ProviderKind {
            self.kind
        }

        async fn fetch(&self, _show: &str) -> Result<Option<ProviderRecord>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_observed_in_flight.fetch_max(now, Ordering::SeqCst);
            // Hold the slot long enough for overlap to be observable.
            tokio::time::sleep(Duration::from_millis(50)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            match &self.behavior {
                Behavior::Succeed(views) => Ok(Some(interest_record(*views))),
                Behavior::NotFound => Ok(None),
                Behavior::Fail => Err(ProviderError::Api("scripted failure".to_string())),
                Behavior::Hang => {
                    // Far past the configured timeout; the orchestrator must
                    // cut this off.
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(Some(interest_record(0)))
                }
            }
        }
    }

    fn shows(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn failures_and_timeouts_settle_as_absent() {
        let adapters: Vec<Arc<dyn ProviderAdapter>> = vec![
            Arc::new(ScriptedAdapter::new(
                ProviderKind::SearchInterest,
                Behavior::Succeed(100),
            )),
            Arc::new(ScriptedAdapter::new(
                ProviderKind::MediaSentiment,
                Behavior::Fail,
            )),
            Arc::new(ScriptedAdapter::new(
                ProviderKind::Popularity,
                Behavior::Hang,
            )),
            Arc::new(ScriptedAdapter::new(
                ProviderKind::VideoEngagement,
                Behavior::NotFound,
            )),
        ];
        let shows = shows(&["Wednesday", "The Crown"]);

        let results = fetch_all(&shows, &adapters, &FetchConfig::default()).await;

        // Only the succeeding provider contributed records, one per show.
        assert_eq!(results.len(), 2);
        for show in &shows {
            assert!(results.contains_key(&(show.clone(), ProviderKind::SearchInterest)));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn every_pair_is_attempted_exactly_once() {
        let adapter = Arc::new(ScriptedAdapter::new(
            ProviderKind::SearchInterest,
            Behavior::Succeed(1),
        ));
        let adapters: Vec<Arc<dyn ProviderAdapter>> = vec![adapter.clone()];
        let shows = shows(&["A", "B", "C"]);

        let results = fetch_all(&shows, &adapters, &FetchConfig::default()).await;

        assert_eq!(results.len(), 3);
        assert_eq!(adapter.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn per_provider_concurrency_is_capped() {
        let adapter = Arc::new(ScriptedAdapter::new(
            ProviderKind::SearchInterest,
            Behavior::Succeed(1),
        ));
        let max_in_flight = Arc::clone(&adapter.max_observed_in_flight);
        let adapters: Vec<Arc<dyn ProviderAdapter>> = vec![adapter];
        let shows = shows(&["A", "B", "C", "D", "E", "F", "G", "H"]);

        let fetch = FetchConfig {
            timeout_secs: 10,
            per_provider_concurrency: 2,
        };
        let results = fetch_all(&shows, &adapters, &fetch).await;

        assert_eq!(results.len(), 8);
        assert!(
            max_in_flight.load(Ordering::SeqCst) <= 2,
            "semaphore let {} calls run at once",
            max_in_flight.load(Ordering::SeqCst)
        );
    }
}
