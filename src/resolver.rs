//! Date-range rank resolution
//!
//! For every date in a query's range the resolver takes the day's list from
//! the in-memory cache or, on a miss, from the provider, then looks the domain
//! up in it. A failed fetch only affects its own date.

use std::sync::Arc;

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::cache::RankingCache;
use crate::data::{DailyRanking, DayResult, RankQuery, RankingProvider};

/// Default number of dates resolved at the same time within one request
///
/// Dates are resolved one after another unless a higher value is configured.
pub const DEFAULT_FETCH_CONCURRENCY: usize = 1;

/// Resolves a domain's rank for each day of a range
pub struct RankResolver<P> {
    provider: P,
    cache: RankingCache,
    concurrency: usize,
}

impl<P: RankingProvider> RankResolver<P> {
    /// Creates a resolver owning the given cache
    pub fn new(provider: P, cache: RankingCache) -> Self {
        Self {
            provider,
            cache,
            concurrency: DEFAULT_FETCH_CONCURRENCY,
        }
    }

    /// Sets how many dates may be in flight at once; 1 resolves strictly in sequence
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Resolves every date in the query's range
    ///
    /// The result holds exactly one entry per date, in ascending order,
    /// whatever the provider does.
    pub async fn resolve(&self, query: &RankQuery) -> Vec<DayResult> {
        let domain = query.domain.as_str();

        let results: Vec<DayResult> = stream::iter(query.range.days())
            .map(|date| self.resolve_day(date, domain))
            .buffered(self.concurrency)
            .collect()
            .await;

        debug!(
            domain,
            start = %query.range.start(),
            end = %query.range.end(),
            days = results.len(),
            ranked = results.iter().filter(|r| r.rank.is_some()).count(),
            "resolved range"
        );
        results
    }

    /// Resolves a single date
    pub async fn resolve_day(&self, date: NaiveDate, domain: &str) -> DayResult {
        match self.ranking_for(date).await {
            Some(ranking) => match ranking.rank(domain) {
                Some(rank) => DayResult::ranked(date, rank),
                None => DayResult::not_ranked(date),
            },
            None => DayResult::unavailable(date),
        }
    }

    async fn ranking_for(&self, date: NaiveDate) -> Option<Arc<DailyRanking>> {
        if let Some(ranking) = self.cache.get(date) {
            return Some(ranking);
        }

        match self.provider.fetch(date).await {
            Ok(ranking) => {
                let ranking = Arc::new(ranking);
                self.cache.insert(date, Arc::clone(&ranking));
                Some(ranking)
            }
            Err(e) => {
                warn!(%date, error = %e, "failed to fetch ranking list");
                None
            }
        }
    }

    /// Number of daily lists currently held in memory
    pub fn cached_days(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DateRange, ProviderError, RankStatus};
    use crate::cache::MAX_ENTRIES;
    use chrono::Duration;
    use futures::future::BoxFuture;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Provider backed by a fixed map; dates not in the map fail
    #[derive(Default)]
    struct FakeProvider {
        lists: HashMap<NaiveDate, Vec<(&'static str, u32)>>,
        calls: AtomicUsize,
        delay_ms: HashMap<NaiveDate, u64>,
        in_flight: AtomicUsize,
        peak_in_flight: AtomicUsize,
    }

    impl FakeProvider {
        fn with(mut self, date: NaiveDate, entries: Vec<(&'static str, u32)>) -> Self {
            self.lists.insert(date, entries);
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl RankingProvider for FakeProvider {
        fn fetch(&self, date: NaiveDate) -> BoxFuture<'_, Result<DailyRanking, ProviderError>> {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
                if let Some(ms) = self.delay_ms.get(&date) {
                    tokio::time::sleep(std::time::Duration::from_millis(*ms)).await;
                }
                self.in_flight.fetch_sub(1, Ordering::SeqCst);
                match self.lists.get(&date) {
                    Some(entries) => Ok(DailyRanking::new(date, entries.iter().cloned())),
                    None => Err(ProviderError::MissingListId(date)),
                }
            })
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn query(domain: &str, start: &str, end: &str) -> RankQuery {
        RankQuery {
            domain: domain.to_string(),
            range: DateRange::new(date(start), date(end)).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_example_with_missing_third_day() {
        let provider = FakeProvider::default()
            .with(date("2023-06-01"), vec![("example.com", 500)])
            .with(date("2023-06-02"), vec![("example.com", 510)]);
        let resolver = RankResolver::new(provider, RankingCache::default());

        let results = resolver
            .resolve(&query("example.com", "2023-06-01", "2023-06-03"))
            .await;

        assert_eq!(
            results,
            vec![
                DayResult::ranked(date("2023-06-01"), 500),
                DayResult::ranked(date("2023-06-02"), 510),
                DayResult::unavailable(date("2023-06-03")),
            ]
        );
    }

    #[tokio::test]
    async fn test_absent_domain_is_not_ranked() {
        let provider = FakeProvider::default().with(date("2023-06-01"), vec![("other.com", 1)]);
        let resolver = RankResolver::new(provider, RankingCache::default());

        let results = resolver
            .resolve(&query("example.com", "2023-06-01", "2023-06-01"))
            .await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].rank, None);
        assert_eq!(results[0].status, RankStatus::NotRanked);
    }

    #[tokio::test]
    async fn test_failure_is_isolated_to_its_date() {
        let provider = FakeProvider::default()
            .with(date("2023-06-01"), vec![("example.com", 1)])
            .with(date("2023-06-03"), vec![("example.com", 3)]);
        let resolver = RankResolver::new(provider, RankingCache::default());

        let results = resolver
            .resolve(&query("example.com", "2023-06-01", "2023-06-03"))
            .await;

        let ranks: Vec<_> = results.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![Some(1), None, Some(3)]);
        assert_eq!(results[1].status, RankStatus::Unavailable);
        // Failed dates are not cached
        assert!(!resolver.cache.contains(date("2023-06-02")));
        assert_eq!(resolver.cached_days(), 2);
    }

    #[tokio::test]
    async fn test_output_covers_every_day_in_order() {
        let resolver = RankResolver::new(FakeProvider::default(), RankingCache::default());

        let results = resolver
            .resolve(&query("example.com", "2023-01-01", "2024-01-01"))
            .await;

        assert_eq!(results.len(), 366);
        assert_eq!(results.first().unwrap().date, date("2023-01-01"));
        assert_eq!(results.last().unwrap().date, date("2024-01-01"));
        for pair in results.windows(2) {
            assert_eq!(pair[1].date - pair[0].date, Duration::days(1));
        }
    }

    #[tokio::test]
    async fn test_order_is_kept_when_fetches_finish_out_of_order() {
        let mut provider = FakeProvider::default()
            .with(date("2023-06-01"), vec![("example.com", 1)])
            .with(date("2023-06-02"), vec![("example.com", 2)])
            .with(date("2023-06-03"), vec![("example.com", 3)]);
        provider.delay_ms.insert(date("2023-06-01"), 60);
        provider.delay_ms.insert(date("2023-06-02"), 30);
        let resolver = RankResolver::new(provider, RankingCache::default()).with_concurrency(3);

        let results = resolver
            .resolve(&query("example.com", "2023-06-01", "2023-06-03"))
            .await;

        let ranks: Vec<_> = results.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![Some(1), Some(2), Some(3)]);
        assert!(resolver.provider.peak_in_flight.load(Ordering::SeqCst) > 1);
    }

    #[tokio::test]
    async fn test_default_resolves_one_date_at_a_time() {
        let mut provider = FakeProvider::default();
        let start = date("2023-06-01");
        for offset in 0..4 {
            let day = start + Duration::days(offset);
            provider = provider.with(day, vec![("example.com", 1)]);
            provider.delay_ms.insert(day, 10);
        }
        let resolver = RankResolver::new(provider, RankingCache::default());
        assert_eq!(resolver.concurrency, DEFAULT_FETCH_CONCURRENCY);

        let results = resolver
            .resolve(&query("example.com", "2023-06-01", "2023-06-04"))
            .await;

        assert_eq!(results.len(), 4);
        assert_eq!(resolver.provider.calls(), 4);
        assert_eq!(resolver.provider.peak_in_flight.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_full_size_list_lookup() {
        let day = date("2023-06-01");
        let ranking = DailyRanking::new(
            day,
            (1..=1_000_000u32).map(|rank| (format!("site{rank}.example"), rank)),
        );

        struct FullList(Arc<DailyRanking>);
        impl RankingProvider for FullList {
            fn fetch(&self, _date: NaiveDate) -> BoxFuture<'_, Result<DailyRanking, ProviderError>> {
                Box::pin(async move { Ok((*self.0).clone()) })
            }
        }

        let resolver = RankResolver::new(FullList(Arc::new(ranking)), RankingCache::default());
        let results = resolver
            .resolve(&query("site999999.example", "2023-06-01", "2023-06-01"))
            .await;

        assert_eq!(results, vec![DayResult::ranked(day, 999_999)]);
        assert_eq!(resolver.cached_days(), 1);
    }

    #[tokio::test]
    async fn test_repeated_request_hits_cache_and_matches() {
        let provider = FakeProvider::default()
            .with(date("2023-06-01"), vec![("example.com", 500)])
            .with(date("2023-06-02"), vec![("example.com", 510)]);
        let resolver = RankResolver::new(provider, RankingCache::default()).with_concurrency(1);
        let q = query("example.com", "2023-06-01", "2023-06-02");

        let first = resolver.resolve(&q).await;
        let second = resolver.resolve(&q).await;

        assert_eq!(first, second);
        assert_eq!(resolver.provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_cache_stays_bounded_across_requests() {
        let mut provider = FakeProvider::default();
        let start = date("2023-01-01");
        for offset in 0..120 {
            provider = provider.with(start + Duration::days(offset), vec![("example.com", 1)]);
        }
        let resolver = RankResolver::new(provider, RankingCache::default());

        resolver.resolve(&query("example.com", "2023-01-01", "2023-02-28")).await;
        resolver.resolve(&query("example.com", "2023-03-01", "2023-04-30")).await;

        assert!(resolver.cached_days() <= MAX_ENTRIES);
        assert_eq!(resolver.cached_days(), MAX_ENTRIES);
    }

    #[test]
    fn test_zero_concurrency_is_clamped() {
        let resolver = RankResolver::new(FakeProvider::default(), RankingCache::default())
            .with_concurrency(0);
        assert_eq!(resolver.concurrency, 1);
    }
}
