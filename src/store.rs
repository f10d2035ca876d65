use async_trait::async_trait;
use fieldx::fxstruct;
use moka::future::Cache;
use moka::policy::EvictionPolicy;
use std::convert::Infallible;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use crate::traits::KeyValueStore;

/// In-process [`KeyValueStore`] over a [moka](https://crates.io/crates/moka) cache.
///
/// Eviction and expiry are entirely moka's: the store is bounded by `max_capacity` and, optionally, drops entries
/// `time_to_live` after they were written.
///
/// ```ignore
/// let store = MokaStore::<serde_json::Value>::builder()
///     .name("resolvers")
///     .max_capacity(50_000)
///     .time_to_live(Duration::from_secs(60))
///     .build()?;
/// ```
#[fxstruct(
    sync,
    no_new,
    default(off),
    builder(
        doc("Builder object of [`MokaStore`].", "", "See [`MokaStore::builder()`] method."),
        method_doc("Implement builder pattern for [`MokaStore`]."),
    )
)]
pub struct MokaStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Store name. Shows up in moka's own logging.
    #[fieldx(optional, get(off))]
    name: &'static str,

    #[fieldx(get(copy), default(10_000))]
    max_capacity: u64,

    #[fieldx(optional, get(off))]
    time_to_live: Duration,

    #[fieldx(lazy, private, get(clone), builder(off))]
    cache: Arc<Cache<String, V>>,
}

impl<V> MokaStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn build_cache(&self) -> Arc<Cache<String, V>> {
        let mut builder = Cache::<String, V>::builder()
            .max_capacity(self.max_capacity())
            .name(self.name.unwrap_or_else(std::any::type_name::<V>))
            .eviction_policy(EvictionPolicy::tiny_lfu());

        if let Some(ttl) = self.time_to_live {
            builder = builder.time_to_live(ttl);
        }

        Arc::new(builder.build())
    }

    pub fn name(&self) -> String {
        self.cache().name().unwrap_or("<anon>").to_string()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.cache().contains_key(key)
    }

    /// Apply pending maintenance tasks and return the number of entries stored.
    pub async fn entry_count(&self) -> u64 {
        let cache = self.cache();
        cache.run_pending_tasks().await;
        cache.entry_count()
    }

    pub fn clear(&self) {
        self.cache().invalidate_all();
    }
}

impl<V> Debug for MokaStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaStore")
            .field("name", &self.name)
            .field("max_capacity", &self.max_capacity)
            .field("time_to_live", &self.time_to_live)
            .finish()
    }
}

#[async_trait]
impl<V> KeyValueStore for MokaStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    type Error = Infallible;
    type Value = V;

    async fn get(&self, key: &str) -> Result<Option<V>, Infallible> {
        Ok(self.cache().get(key).await)
    }

    async fn set(&self, key: &str, value: V) -> Result<(), Infallible> {
        self.cache().insert(key.to_string(), value).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), Infallible> {
        self.cache().invalidate(key).await;
        Ok(())
    }
}
