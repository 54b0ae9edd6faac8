use moka::future::Cache;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::Config;
use crate::upstream::PortalClient;

/// Cached serialized payload, tagged with the generation of the fetch that
/// produced it.
#[derive(Clone)]
pub struct CachedPayload {
    pub data: Arc<Vec<u8>>,
    pub generation: u64,
}

/// Cache for shaped chart payloads. Key is request params, value is the
/// serialized response. Weighted by byte size to enforce a memory limit.
pub type PayloadCache = Cache<String, CachedPayload>;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub upstream: Arc<PortalClient>,
    pub payload_cache: PayloadCache,
    generations: Arc<Mutex<HashMap<String, u64>>>,
}

impl AppState {
    #[must_use]
    pub fn new(config: Config, upstream: PortalClient) -> Self {
        // Cache weighted by byte size, not entry count
        let cache: PayloadCache = Cache::builder()
            .weigher(|_key: &String, value: &CachedPayload| -> u32 {
                value.data.len().try_into().unwrap_or(u32::MAX)
            })
            .max_capacity(config.cache_max_bytes)
            .time_to_live(Duration::from_secs(config.cache_ttl_seconds))
            .build();

        Self {
            config: Arc::new(config),
            upstream: Arc::new(upstream),
            payload_cache: cache,
            generations: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Current fetch generation for a cache key. A fetch captures this before
    /// calling upstream; its result is only stored while the generation is
    /// unchanged.
    #[must_use]
    pub fn current_generation(&self, cache_key: &str) -> u64 {
        let generations = self.generations.lock().expect("generation map poisoned");
        generations.get(cache_key).copied().unwrap_or(0)
    }

    /// Invalidate a cache slot by advancing its generation. Any fetch still
    /// in flight for the old generation will have its result discarded.
    pub fn bump_generation(&self, cache_key: &str) -> u64 {
        let mut generations = self.generations.lock().expect("generation map poisoned");
        let entry = generations.entry(cache_key.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }
}
