use async_trait::async_trait;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use crate::traits::Observer;
use crate::types::Bypass;
use crate::types::Directive;
use crate::types::DirectiveKind;
use crate::types::HandlerId;
use crate::types::StoreOp;

/// Point-in-time copy of [`StatsObserver`] counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Invocations that had a directive of either kind.
    pub directives:    u64,
    pub hits:          u64,
    pub misses:        u64,
    pub invalidations: u64,
    pub bypasses:      u64,
    pub store_errors:  u64,
}

impl CacheStats {
    /// Share of lookups served from the cache; `None` before the first lookup.
    pub fn hit_ratio(&self) -> Option<f64> {
        let lookups = self.hits + self.misses;
        (lookups > 0).then(|| self.hits as f64 / lookups as f64)
    }
}

/// Observer counting interceptor events.
#[derive(Debug, Default)]
pub struct StatsObserver {
    directives:    AtomicU64,
    hits:          AtomicU64,
    misses:        AtomicU64,
    invalidations: AtomicU64,
    bypasses:      AtomicU64,
    store_errors:  AtomicU64,
}

impl StatsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> CacheStats {
        CacheStats {
            directives:    self.directives.load(Ordering::Relaxed),
            hits:          self.hits.load(Ordering::Relaxed),
            misses:        self.misses.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
            bypasses:      self.bypasses.load(Ordering::Relaxed),
            store_errors:  self.store_errors.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        for counter in [
            &self.directives,
            &self.hits,
            &self.misses,
            &self.invalidations,
            &self.bypasses,
            &self.store_errors,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

#[async_trait]
impl Observer for StatsObserver {
    async fn on_directive(&self, _handler: &HandlerId, _kind: DirectiveKind, _directive: &Directive) {
        self.directives.fetch_add(1, Ordering::Relaxed);
    }

    async fn on_hit(&self, _handler: &HandlerId, _key: &str) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    async fn on_miss(&self, _handler: &HandlerId, _key: &str) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    async fn on_invalidate(&self, _handler: &HandlerId, _key: &str) {
        self.invalidations.fetch_add(1, Ordering::Relaxed);
    }

    async fn on_bypass(&self, _handler: &HandlerId, _reason: Bypass) {
        self.bypasses.fetch_add(1, Ordering::Relaxed);
    }

    async fn on_store_error(&self, _op: StoreOp, _key: &str, _message: &str) {
        self.store_errors.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_ratio() {
        assert_eq!(CacheStats::default().hit_ratio(), None);

        let stats = CacheStats {
            hits: 3,
            misses: 1,
            ..Default::default()
        };
        assert_eq!(stats.hit_ratio(), Some(0.75));
    }

    #[tokio::test]
    async fn reset_zeroes_every_counter() {
        let observer = StatsObserver::new();
        let handler = HandlerId::from("user.get");
        let directive = Directive::new(["user"]);

        observer.on_directive(&handler, DirectiveKind::Cache, &directive).await;
        observer.on_hit(&handler, "user").await;
        observer.on_miss(&handler, "user").await;
        observer.on_invalidate(&handler, "user").await;
        observer.on_bypass(&handler, Bypass::Disabled).await;
        observer.on_store_error(StoreOp::Get, "user", "down").await;
        assert_eq!(
            observer.snapshot(),
            CacheStats {
                directives:    1,
                hits:          1,
                misses:        1,
                invalidations: 1,
                bypasses:      1,
                store_errors:  1,
            }
        );

        observer.reset();
        assert_eq!(observer.snapshot(), CacheStats::default());

        observer.on_hit(&handler, "user").await;
        assert_eq!(observer.snapshot().hits, 1, "counting resumes after a reset");
    }
}
