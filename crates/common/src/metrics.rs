use once_cell::sync::Lazy;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

// Prometheus metrics (default registry)
pub static CACHE_HITS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "catalog_cache_hits_total",
        "Catalog cache hits by tier",
        &["tier"]
    )
    .expect("register cache_hits_total")
});

pub static CACHE_MISSES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "catalog_cache_misses_total",
        "Catalog cache misses by tier",
        &["tier"]
    )
    .expect("register cache_misses_total")
});

pub static UPSTREAM_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "catalog_upstream_requests_total",
        "Upstream requests issued by operation",
        &["op"]
    )
    .expect("register upstream_requests_total")
});

pub static UPSTREAM_ERRORS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "catalog_upstream_errors_total",
        "Upstream requests that failed, by operation",
        &["op"]
    )
    .expect("register upstream_errors_total")
});

/// Cache tier label values.
pub const TIER_ENTITY: &str = "entity";
pub const TIER_PAGE: &str = "page";

/// Upstream operation label values.
pub const OP_LIST: &str = "list";
pub const OP_DETAIL: &str = "detail";

pub fn record_cache_hit(tier: &str) {
    CACHE_HITS_TOTAL.with_label_values(&[tier]).inc();
}

pub fn record_cache_miss(tier: &str) {
    CACHE_MISSES_TOTAL.with_label_values(&[tier]).inc();
}

pub fn record_upstream_request(op: &str) {
    UPSTREAM_REQUESTS_TOTAL.with_label_values(&[op]).inc();
}

pub fn record_upstream_error(op: &str) {
    UPSTREAM_ERRORS_TOTAL.with_label_values(&[op]).inc();
}

/// Render the default registry in the Prometheus text exposition format.
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    // Touch the statics so the families exist before the first request.
    Lazy::force(&CACHE_HITS_TOTAL);
    Lazy::force(&CACHE_MISSES_TOTAL);
    Lazy::force(&UPSTREAM_REQUESTS_TOTAL);
    Lazy::force(&UPSTREAM_ERRORS_TOTAL);

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}
