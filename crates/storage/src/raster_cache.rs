//! In-memory LRU cache for rendered marker rasters.
//!
//! ## Memory-Based Eviction
//!
//! The cache is bounded by the aggregate byte size of its values rather than
//! by entry count. Inserting past the budget evicts least-recently-used
//! entries until the new value fits.
//!
//! ## First Writer Wins
//!
//! `put` on a key that is already present is a no-op. Transition frames and
//! steady-state markers may be built more than once for the same key; the
//! first raster stays authoritative.
//!
//! ## Threading
//!
//! The cache is owned by the single rendering thread. The presence check in
//! `put` is not atomic with the insert, so sharing it across threads needs
//! external synchronization.

use lru::LruCache;
use tracing::{debug, info};

use crate::key::CacheKey;
use marker_common::CacheConfig;

/// Values that report their memory footprint.
pub trait Weighted {
    fn byte_size(&self) -> usize;
}

/// Counters for the raster cache.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RasterCacheStats {
    /// Total cache hits
    pub hits: u64,
    /// Total cache misses
    pub misses: u64,
    /// Total entries evicted
    pub evictions: u64,
    /// Inserts ignored because the key was already present
    pub duplicate_puts: u64,
    /// Inserts rejected because the value alone exceeds the budget
    pub oversized: u64,
    /// Current cache size in bytes
    pub size_bytes: u64,
    /// Current number of entries
    pub entry_count: u64,
}

impl RasterCacheStats {
    /// Hit rate as a percentage (0-100).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// Byte-budgeted LRU cache of rasters keyed by [`CacheKey`].
pub struct RasterCache<V> {
    cache: LruCache<CacheKey, V>,
    max_bytes: u64,
    enabled: bool,
    stats: RasterCacheStats,
}

impl<V: Weighted + Clone> RasterCache<V> {
    /// Create a cache holding at most `max_bytes` of values.
    pub fn new(max_bytes: u64) -> Self {
        Self {
            cache: LruCache::unbounded(),
            max_bytes,
            enabled: true,
            stats: RasterCacheStats::default(),
        }
    }

    /// Create a cache from configuration.
    pub fn from_config(config: &CacheConfig) -> Self {
        let mut cache = Self::new(config.max_bytes());
        cache.enabled = config.enabled;
        info!(
            max_size_mb = format!("{:.2}", config.max_bytes() as f64 / (1024.0 * 1024.0)),
            enabled = config.enabled,
            "Raster cache configured"
        );
        cache
    }

    /// A cache that never retains anything.
    pub fn disabled() -> Self {
        let mut cache = Self::new(0);
        cache.enabled = false;
        cache
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable caching. Disabling drops every entry.
    pub fn set_enabled(&mut self, enabled: bool) {
        if !enabled {
            self.clear();
        }
        self.enabled = enabled;
    }

    /// Look up a raster, marking it most recently used.
    pub fn get(&mut self, key: &CacheKey) -> Option<V> {
        if !self.enabled {
            self.stats.misses += 1;
            return None;
        }

        match self.cache.get(key) {
            Some(value) => {
                self.stats.hits += 1;
                Some(value.clone())
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Store a raster unless the key is already present.
    ///
    /// Returns `true` if the value was inserted.
    pub fn put(&mut self, key: CacheKey, value: V) -> bool {
        if !self.enabled {
            return false;
        }

        if self.cache.contains(&key) {
            self.stats.duplicate_puts += 1;
            return false;
        }

        let size = value.byte_size() as u64;
        if size > self.max_bytes {
            self.stats.oversized += 1;
            debug!(size_bytes = size, max_bytes = self.max_bytes, "Raster larger than cache budget");
            return false;
        }

        if self.stats.size_bytes + size > self.max_bytes {
            self.evict_until_fits(size);
        }

        self.cache.put(key, value);
        self.stats.size_bytes += size;
        self.stats.entry_count += 1;
        true
    }

    /// Whether `key` is cached, without touching recency.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.enabled && self.cache.contains(key)
    }

    /// Evict least-recently-used entries until `incoming` more bytes fit.
    ///
    /// Returns (entries_evicted, bytes_freed).
    fn evict_until_fits(&mut self, incoming: u64) -> (usize, u64) {
        let mut bytes_freed = 0u64;
        let mut entries_evicted = 0usize;

        while self.stats.size_bytes - bytes_freed + incoming > self.max_bytes {
            match self.cache.pop_lru() {
                Some((_, evicted)) => {
                    bytes_freed += evicted.byte_size() as u64;
                    entries_evicted += 1;
                }
                None => break,
            }
        }

        self.stats.size_bytes -= bytes_freed;
        self.stats.entry_count -= entries_evicted as u64;
        self.stats.evictions += entries_evicted as u64;

        debug!(
            entries_evicted = entries_evicted,
            bytes_freed = bytes_freed,
            cache_size_bytes = self.stats.size_bytes,
            "Raster cache eviction completed"
        );

        (entries_evicted, bytes_freed)
    }

    /// Clear all cached entries. Hit/miss counters are kept.
    pub fn clear(&mut self) {
        self.cache.clear();
        self.stats.size_bytes = 0;
        self.stats.entry_count = 0;
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    pub fn size_bytes(&self) -> u64 {
        self.stats.size_bytes
    }

    /// Current cache utilization ratio (0.0 - 1.0).
    pub fn utilization(&self) -> f64 {
        if self.max_bytes == 0 {
            0.0
        } else {
            self.stats.size_bytes as f64 / self.max_bytes as f64
        }
    }

    pub fn stats(&self) -> &RasterCacheStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marker_common::MarkerSpec;

    #[derive(Debug, Clone, PartialEq)]
    struct Blob(Vec<u8>);

    impl Weighted for Blob {
        fn byte_size(&self) -> usize {
            self.0.len()
        }
    }

    fn key(label: &str) -> CacheKey {
        CacheKey::marker(&MarkerSpec::new(label))
    }

    #[test]
    fn test_cache_basic_operations() {
        let mut cache = RasterCache::new(1024);
        assert!(cache.is_empty());
        assert!(cache.get(&key("a")).is_none());

        assert!(cache.put(key("a"), Blob(vec![1; 10])));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&key("a")), Some(Blob(vec![1; 10])));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size_bytes, 10);
    }

    #[test]
    fn test_first_writer_wins() {
        let mut cache = RasterCache::new(1024);
        assert!(cache.put(key("a"), Blob(vec![1; 4])));
        assert!(!cache.put(key("a"), Blob(vec![2; 8])));
        assert_eq!(cache.get(&key("a")), Some(Blob(vec![1; 4])));
        assert_eq!(cache.size_bytes(), 4);
        assert_eq!(cache.stats().duplicate_puts, 1);
    }

    #[test]
    fn test_lru_eviction_by_bytes() {
        let mut cache = RasterCache::new(100);
        cache.put(key("a"), Blob(vec![0; 40]));
        cache.put(key("b"), Blob(vec![0; 40]));
        // Touch "a" so "b" becomes least recently used
        cache.get(&key("a"));
        cache.put(key("c"), Blob(vec![0; 40]));

        assert!(cache.contains(&key("a")));
        assert!(!cache.contains(&key("b")));
        assert!(cache.contains(&key("c")));
        assert_eq!(cache.size_bytes(), 80);
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_oversized_value_not_retained() {
        let mut cache = RasterCache::new(16);
        assert!(!cache.put(key("big"), Blob(vec![0; 17])));
        assert!(cache.is_empty());
        assert_eq!(cache.stats().oversized, 1);
    }

    #[test]
    fn test_disabled_cache_retains_nothing() {
        let mut cache: RasterCache<Blob> = RasterCache::disabled();
        assert!(!cache.put(key("a"), Blob(vec![0; 4])));
        assert!(cache.get(&key("a")).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_disabling_clears_entries() {
        let mut cache = RasterCache::new(1024);
        cache.put(key("a"), Blob(vec![0; 4]));
        cache.set_enabled(false);
        assert!(cache.is_empty());
        assert_eq!(cache.size_bytes(), 0);
        cache.set_enabled(true);
        assert!(cache.get(&key("a")).is_none());
    }

    #[test]
    fn test_utilization() {
        let mut cache = RasterCache::new(200);
        cache.put(key("a"), Blob(vec![0; 100]));
        assert!((cache.utilization() - 0.5).abs() < 0.001);
    }
}
