use std::{collections::HashMap, marker::PhantomData};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::sources::{DataSource, FetchError, ModelsRequest, TickersRequest};

/// Identifies a request inside a [`CachedSource`].
pub trait CacheKey {
    fn cache_key(&self) -> String;
}

impl CacheKey for TickersRequest {
    fn cache_key(&self) -> String {
        "tickers".to_string()
    }
}

impl CacheKey for ModelsRequest {
    fn cache_key(&self) -> String {
        "models".to_string()
    }
}

/// Remembers every successful fetch of the wrapped source for the life of the
/// process.
///
/// Concurrent misses for the same key may both reach the inner source; the
/// last write wins. Failed fetches are not cached.
pub struct CachedSource<S, Req>
where
    S: DataSource<Req>,
    Req: Send + 'static,
{
    inner: S,
    entries: RwLock<HashMap<String, S::Output>>,
    _request: PhantomData<fn(Req)>,
}

impl<S, Req> CachedSource<S, Req>
where
    S: DataSource<Req>,
    Req: Send + 'static,
{
    pub fn new(inner: S) -> Self {
        CachedSource {
            inner,
            entries: RwLock::new(HashMap::new()),
            _request: PhantomData,
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn invalidate(&self) {
        self.entries.write().await.clear();
    }
}

#[async_trait]
impl<S, Req> DataSource<Req> for CachedSource<S, Req>
where
    S: DataSource<Req>,
    S::Output: Clone + Sync,
    Req: CacheKey + Send + 'static,
{
    type Output = S::Output;

    async fn fetch(&self, request: Req) -> Result<S::Output, FetchError> {
        let key = request.cache_key();
        if let Some(hit) = self.entries.read().await.get(&key) {
            debug!(key = %key, "cache hit");
            return Ok(hit.clone());
        }

        debug!(key = %key, "cache miss");
        let value = self.inner.fetch(request).await?;
        self.entries.write().await.insert(key, value.clone());
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };
    use tokio::sync::Barrier;

    struct SlowTickers {
        calls: AtomicUsize,
        barrier: Barrier,
    }

    #[async_trait]
    impl DataSource<TickersRequest> for SlowTickers {
        type Output = Vec<String>;

        async fn fetch(&self, _request: TickersRequest) -> Result<Vec<String>, FetchError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            // Hold both concurrent misses inside the source at once.
            self.barrier.wait().await;
            Ok(vec![format!("AAPL-{call}")])
        }
    }

    struct FailingModels;

    #[async_trait]
    impl DataSource<ModelsRequest> for FailingModels {
        type Output = Vec<String>;

        async fn fetch(&self, _request: ModelsRequest) -> Result<Vec<String>, FetchError> {
            Err(FetchError::Status {
                service: "openrouter",
                status: 503,
            })
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_misses_both_fetch_and_last_write_wins() {
        let cache: Arc<CachedSource<_, TickersRequest>> = Arc::new(CachedSource::new(SlowTickers {
            calls: AtomicUsize::new(0),
            barrier: Barrier::new(2),
        }));

        let a = tokio::spawn({
            let cache = Arc::clone(&cache);
            async move { cache.fetch(TickersRequest).await }
        });
        let b = tokio::spawn({
            let cache = Arc::clone(&cache);
            async move { cache.fetch(TickersRequest).await }
        });
        let first = a.await.unwrap().unwrap();
        let second = b.await.unwrap().unwrap();

        assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len().await, 1);

        let cached = cache.fetch(TickersRequest).await.unwrap();
        assert!(cached == first || cached == second);
        assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let cache: CachedSource<_, ModelsRequest> = CachedSource::new(FailingModels);
        assert!(cache.fetch(ModelsRequest).await.is_err());
        assert_eq!(cache.len().await, 0);
    }
}
