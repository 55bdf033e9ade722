use async_trait::async_trait;
use repricer_core::{CoreResult, RateProvider};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Serves the last fetched currency rate until it is older than `ttl`
pub struct CachedRate {
    inner: Arc<dyn RateProvider>,
    ttl: Duration,
    cached: RwLock<Option<(f64, Instant)>>,
}

impl CachedRate {
    pub fn new(inner: Arc<dyn RateProvider>, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            cached: RwLock::new(None),
        }
    }

    /// Drop the cached rate so the next read refetches
    pub async fn invalidate(&self) {
        *self.cached.write().await = None;
    }

    fn fresh(&self, entry: &Option<(f64, Instant)>) -> Option<f64> {
        entry
            .filter(|(_, fetched)| fetched.elapsed() < self.ttl)
            .map(|(rate, _)| rate)
    }
}

#[async_trait]
impl RateProvider for CachedRate {
    async fn rate(&self) -> CoreResult<f64> {
        if let Some(rate) = self.fresh(&*self.cached.read().await) {
            return Ok(rate);
        }

        let mut cached = self.cached.write().await;
        // Another reader may have refreshed while we waited for the lock
        if let Some(rate) = self.fresh(&cached) {
            return Ok(rate);
        }

        let rate = self.inner.rate().await?;
        debug!("Currency rate refreshed: {}", rate);
        *cached = Some((rate, Instant::now()));
        Ok(rate)
    }
}
