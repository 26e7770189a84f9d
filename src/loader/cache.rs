//! Explicit, process-scoped cache of the loaded dataset.
//!
//! The cache owns its `DataSource`. A hit returns the same `Arc<Dataset>`
//! without touching the source; a miss fetches, parses and runs the ratio
//! calculator once, so every consumer sees ratios already attached.

use super::{DataSource, parse_dataset};
use crate::error::Result;
use crate::models::Dataset;
use crate::pipeline::ratios;
use crate::utils::Timer;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Identifies one materialized fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    pub location: String,
    pub fetched_at: DateTime<Utc>,
}

pub struct DatasetCache {
    source: Box<dyn DataSource>,
    /// `None`: keep for the life of the process.
    ttl: Option<Duration>,
    entry: Option<(CacheKey, Arc<Dataset>)>,
}

impl DatasetCache {
    pub fn new(source: Box<dyn DataSource>) -> Self {
        Self {
            source,
            ttl: None,
            entry: None,
        }
    }

    pub fn with_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn location(&self) -> String {
        self.source.location()
    }

    pub fn key(&self) -> Option<&CacheKey> {
        self.entry.as_ref().map(|(k, _)| k)
    }

    /// Forget the cached dataset; the next `get` refetches.
    pub fn invalidate(&mut self) {
        if self.entry.take().is_some() {
            debug!("Dataset cache invalidated");
        }
    }

    fn is_stale(&self, key: &CacheKey) -> bool {
        let Some(ttl) = self.ttl else {
            return false;
        };
        (Utc::now() - key.fetched_at)
            .to_std()
            .map(|age| age >= ttl)
            .unwrap_or(false)
    }

    /// Return the cached dataset, loading it on a miss or after the TTL.
    pub async fn get(&mut self) -> Result<Arc<Dataset>> {
        if let Some((key, dataset)) = &self.entry {
            if !self.is_stale(key) {
                return Ok(Arc::clone(dataset));
            }
            info!("Cached dataset from {} expired", key.location);
        }

        let location = self.source.location();
        let _t = Timer::start(format!("Load {}", location));

        let text = self.source.fetch().await?;
        let mut dataset = parse_dataset(&location, &text)?;
        ratios::apply(&mut dataset);
        info!("{}: {} records loaded", location, dataset.len());

        let dataset = Arc::new(dataset);
        let key = CacheKey {
            location,
            fetched_at: Utc::now(),
        };
        self.entry = Some((key, Arc::clone(&dataset)));
        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DashboardError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const CSV: &str = "Company_ID,Industry,Current_Assets,Current_Liabilities,Short_Term_Debt,Long_Term_Debt,Equity,Total_Revenue,Financial_Expenses\n\
                       A,Tech,200,100,10,20,60,500,25\n\
                       B,Tech,50,100,5,5,0,80,8\n";

    struct CountingSource {
        text: &'static str,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl DataSource for CountingSource {
        fn location(&self) -> String {
            "memory://financials.csv".to_string()
        }

        async fn fetch(&self) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.text.to_string())
        }
    }

    fn counting_cache(text: &'static str) -> (DatasetCache, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = CountingSource {
            text,
            calls: Arc::clone(&calls),
        };
        (DatasetCache::new(Box::new(source)), calls)
    }

    #[test]
    fn test_hit_returns_same_dataset_without_refetch() {
        let (mut cache, calls) = counting_cache(CSV);
        let first = tokio_test::block_on(cache.get()).unwrap();
        let second = tokio_test::block_on(cache.get()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(first.has_ratios());
        assert_eq!(cache.key().unwrap().location, "memory://financials.csv");
    }

    #[test]
    fn test_invalidate_forces_refetch() {
        let (mut cache, calls) = counting_cache(CSV);
        let first = tokio_test::block_on(cache.get()).unwrap();
        cache.invalidate();
        assert!(cache.key().is_none());
        let second = tokio_test::block_on(cache.get()).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_zero_ttl_always_refetches() {
        let (cache, calls) = counting_cache(CSV);
        let mut cache = cache.with_ttl(Some(Duration::ZERO));
        tokio_test::block_on(cache.get()).unwrap();
        tokio_test::block_on(cache.get()).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_malformed_source_is_not_cached() {
        let (mut cache, calls) = counting_cache("Company_ID,Industry\nA,Tech\n");
        let err = tokio_test::block_on(cache.get()).unwrap_err();
        assert!(matches!(err, DashboardError::DataUnavailable { .. }));
        assert!(cache.key().is_none());
        assert!(tokio_test::block_on(cache.get()).is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
