//! In-memory storage for rendered marker rasters.
//!
//! Provides:
//! - Structural cache keys for single markers and transition frames
//! - A byte-budgeted LRU cache with first-writer-wins inserts

pub mod key;
pub mod raster_cache;

pub use key::CacheKey;
pub use raster_cache::{RasterCache, RasterCacheStats, Weighted};
