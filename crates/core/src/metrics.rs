//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Content cache (hits, misses, recovered insert races)
//! - External catalogs (requests by outcome)
//! - Watched list mutations
//! - Poster downloads

use once_cell::sync::Lazy;
use prometheus::{IntCounterVec, Opts, Registry};

// =============================================================================
// Content Cache
// =============================================================================

/// Content cache lookups by result.
pub static CONTENT_CACHE_LOOKUPS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "reelog_content_cache_lookups_total",
            "Content cache lookups",
        ),
        &["result"], // "hit", "miss", "race"
    )
    .unwrap()
});

// =============================================================================
// External Catalogs
// =============================================================================

/// External catalog requests by catalog and outcome.
pub static CATALOG_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "reelog_catalog_requests_total",
            "Requests made to external metadata catalogs",
        ),
        &["catalog", "result"], // catalog: "tmdb", "igdb"
    )
    .unwrap()
});

// =============================================================================
// Watched List
// =============================================================================

/// Watched list mutations by operation and result.
pub static WATCHED_MUTATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "reelog_watched_mutations_total",
            "Watched list add/update/remove operations",
        ),
        &["op", "result"],
    )
    .unwrap()
});

// =============================================================================
// Images
// =============================================================================

/// Poster downloads by result.
pub static IMAGE_DOWNLOADS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("reelog_image_downloads_total", "Poster image downloads"),
        &["result"], // "success", "failed", "skipped"
    )
    .unwrap()
});

/// Register all core metrics with a registry.
pub fn register_core_metrics(registry: &Registry) {
    let _ = registry.register(Box::new(CONTENT_CACHE_LOOKUPS.clone()));
    let _ = registry.register(Box::new(CATALOG_REQUESTS.clone()));
    let _ = registry.register(Box::new(WATCHED_MUTATIONS.clone()));
    let _ = registry.register(Box::new(IMAGE_DOWNLOADS.clone()));
}
