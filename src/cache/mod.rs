//! Page cache for catalog query results.
//!
//! Pages are addressed by a [`QuerySignature`] derived from the full query
//! (collection, filter, page size, cursor) and expire after a TTL. One
//! [`PageCache`] instance is shared by every pagination controller.
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! enabled = true
//! ttl_seconds = 300
//! max_entries = 64
//! ```

mod config;
mod keys;
mod store;

pub use config::CacheConfig;
pub use keys::{QuerySignature, hash_signature};
pub use store::{
    METRIC_CACHE_EVICT, METRIC_CACHE_EXPIRED, METRIC_CACHE_HIT, METRIC_CACHE_MISS, PageCache,
};
