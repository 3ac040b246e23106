//! Time-bounded page store shared by every pagination controller.

use std::sync::Mutex;

use lru::LruCache;
use metrics::counter;
use tokio::time::Instant;
use tracing::debug;

use crate::application::pagination::Page;
use crate::util::lock::mutex_lock;

use super::config::CacheConfig;
use super::keys::QuerySignature;

const SOURCE: &str = "cache::store";

pub const METRIC_CACHE_HIT: &str = "catalog_cache_hit_total";
pub const METRIC_CACHE_MISS: &str = "catalog_cache_miss_total";
pub const METRIC_CACHE_EXPIRED: &str = "catalog_cache_expired_total";
pub const METRIC_CACHE_EVICT: &str = "catalog_cache_evict_total";

struct CacheEntry {
    page: Page,
    inserted_at: Instant,
}

/// Completed query results keyed by signature.
///
/// Entries older than the TTL are dropped when a lookup touches them; there is
/// no background sweep. Reads use `peek`, so the LRU order of the underlying
/// map is insertion order and capacity eviction always removes the oldest
/// insert.
pub struct PageCache {
    config: CacheConfig,
    entries: Mutex<LruCache<QuerySignature, CacheEntry>>,
}

impl PageCache {
    pub fn new(config: CacheConfig) -> Self {
        let entries = Mutex::new(LruCache::new(config.max_entries_non_zero()));
        Self { config, entries }
    }

    /// Return the cached page, evicting it instead if it outlived the TTL.
    pub fn get(&self, signature: &QuerySignature) -> Option<Page> {
        if !self.config.enabled {
            return None;
        }

        let mut entries = mutex_lock(&self.entries, SOURCE, "get");
        match entries.peek(signature) {
            None => {
                counter!(METRIC_CACHE_MISS).increment(1);
                return None;
            }
            Some(entry) if entry.inserted_at.elapsed() <= self.config.ttl => {
                counter!(METRIC_CACHE_HIT).increment(1);
                return Some(entry.page.clone());
            }
            Some(_) => {}
        }

        entries.pop(signature);
        counter!(METRIC_CACHE_EXPIRED).increment(1);
        counter!(METRIC_CACHE_MISS).increment(1);
        debug!(signature = %signature, "evicted expired page");
        None
    }

    /// Insert or overwrite; past capacity the oldest entry makes room.
    pub fn put(&self, signature: QuerySignature, page: Page) {
        if !self.config.enabled {
            return;
        }

        let entry = CacheEntry {
            page,
            inserted_at: Instant::now(),
        };
        let mut entries = mutex_lock(&self.entries, SOURCE, "put");
        if let Some((evicted, _)) = entries.push(signature.clone(), entry)
            && evicted != signature
        {
            counter!(METRIC_CACHE_EVICT).increment(1);
            debug!(signature = %evicted, "evicted oldest page at capacity");
        }
    }

    pub fn clear(&self) {
        mutex_lock(&self.entries, SOURCE, "clear").clear();
    }

    /// Number of stored entries, expired ones included until touched.
    pub fn len(&self) -> usize {
        mutex_lock(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
