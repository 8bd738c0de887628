/// Prometheus metrics for the leaderboard cache coordinator
use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec_with_registry, register_gauge_with_registry,
    register_int_counter_with_registry, CounterVec, Encoder, Gauge, IntCounter, Registry,
    TextEncoder,
};

lazy_static! {
    /// Registry for all leaderboard metrics
    pub static ref REGISTRY: Registry = Registry::new();

    /// Rank index lookups (labels: result=hit|miss)
    pub static ref CACHE_LOOKUPS_TOTAL: CounterVec = register_counter_vec_with_registry!(
        "leaderboard_cache_lookups_total",
        "Rank index lookups by outcome",
        &["result"],
        REGISTRY
    )
    .unwrap();

    /// Entries evicted to enforce the cache bound
    pub static ref CACHE_EVICTIONS_TOTAL: IntCounter = register_int_counter_with_registry!(
        "leaderboard_cache_evictions_total",
        "Entries evicted from the rank index",
        REGISTRY
    )
    .unwrap();

    /// Full cache rebuilds from the durable store
    pub static ref RESYNCS_TOTAL: IntCounter = register_int_counter_with_registry!(
        "leaderboard_resyncs_total",
        "Full cache rebuilds from the durable store",
        REGISTRY
    )
    .unwrap();

    /// Current number of entries in the rank index
    pub static ref RANK_INDEX_SIZE: Gauge = register_gauge_with_registry!(
        "leaderboard_rank_index_size",
        "Current number of entries in the rank index",
        REGISTRY
    )
    .unwrap();
}

pub fn record_cache_hit() {
    CACHE_LOOKUPS_TOTAL.with_label_values(&["hit"]).inc();
}

pub fn record_cache_miss() {
    CACHE_LOOKUPS_TOTAL.with_label_values(&["miss"]).inc();
}

/// Gather all metrics in Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
