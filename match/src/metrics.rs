//! Metrics collection module for the matching engines
//!
//! Per-symbol counters and pass latency, exposed in the Prometheus text
//! format by [`crate::server::serve_metrics`].

use lazy_static::lazy_static;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};
use std::time::Instant;

lazy_static! {
    /// Global Prometheus registry instance
    pub static ref REGISTRY_INSTANCE: Registry = Registry::new();

    /// Inbound orders by symbol and outcome (`processed` or an ignore reason)
    pub static ref ORDER_COUNTER_VEC: IntCounterVec = IntCounterVec::new(
        Opts::new("match_orders_total", "inbound orders by outcome"),
        &["symbol", "outcome"]
    )
    .expect("valid metric definition");

    pub static ref TRADE_COUNTER_VEC: IntCounterVec = IntCounterVec::new(
        Opts::new("match_trades_total", "trade records produced"),
        &["symbol"]
    )
    .expect("valid metric definition");

    pub static ref SINK_FAILURE_COUNTER_VEC: IntCounterVec = IntCounterVec::new(
        Opts::new("match_sink_failures_total", "outbound events that failed to deliver"),
        &["symbol"]
    )
    .expect("valid metric definition");

    /// Wall time of one matching pass
    pub static ref PASS_HISTOGRAM_VEC: HistogramVec = HistogramVec::new(
        HistogramOpts::new("match_pass_seconds", "matching pass cost"),
        &["symbol"]
    )
    .expect("valid metric definition");
}

/// Registers all metric collectors with the global registry
pub fn init_registry() {
    let _ = REGISTRY_INSTANCE.register(Box::new(ORDER_COUNTER_VEC.clone()));
    let _ = REGISTRY_INSTANCE.register(Box::new(TRADE_COUNTER_VEC.clone()));
    let _ = REGISTRY_INSTANCE.register(Box::new(SINK_FAILURE_COUNTER_VEC.clone()));
    let _ = REGISTRY_INSTANCE.register(Box::new(PASS_HISTOGRAM_VEC.clone()));
}

/// Runs `handler` and records its duration under `symbol`
pub fn record_pass<F, T>(symbol: &str, handler: F) -> T
where
    F: FnOnce() -> T,
{
    let start = Instant::now();
    let result = handler();
    PASS_HISTOGRAM_VEC
        .with_label_values(&[symbol])
        .observe(start.elapsed().as_secs_f64());
    result
}

pub fn record_order(symbol: &str, outcome: &str) {
    ORDER_COUNTER_VEC.with_label_values(&[symbol, outcome]).inc();
}

pub fn record_trades(symbol: &str, count: usize) {
    if count > 0 {
        TRADE_COUNTER_VEC
            .with_label_values(&[symbol])
            .inc_by(count as u64);
    }
}

pub fn record_sink_failure(symbol: &str) {
    SINK_FAILURE_COUNTER_VEC.with_label_values(&[symbol]).inc();
}
