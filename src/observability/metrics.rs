use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry};
use tracing::info;
use std::sync::Arc;
use tokio::sync::OnceCell;

pub const KIND_NEW: &str = "new";
pub const KIND_REFRESH: &str = "refresh";

// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE.get_or_init(|| async {
        info!("Initializing Metrics ...");
        Metrics::new()}
    ).await
}


#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Token endpoint metrics, labelled by kind: new | refresh
    pub token_requests: IntCounterVec,
    pub token_failures: IntCounterVec,
    pub token_request_duration: HistogramVec,
    pub token_expiry_unix: IntGaugeVec,
    pub refresh_fallbacks: IntCounter,

    // Cache metrics
    pub cache_lookups: IntCounterVec,

    // Config/runtime
    pub config_validation_errors: IntCounter,
    pub up: IntGauge,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("socialhub_auth".into()), None).unwrap();

        let metrics: Arc<Metrics> = Arc::new(Self {
            token_requests: IntCounterVec::new(Opts::new("token_requests_total", "Token endpoint calls by kind"), &["kind"]).unwrap(),
            token_failures: IntCounterVec::new(Opts::new("token_failures_total", "Token endpoint failures by kind and reason"), &["kind", "reason"]).unwrap(),
            token_request_duration: HistogramVec::new(HistogramOpts::new("token_request_duration_seconds", "Token endpoint call duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]), &["kind"]).unwrap(),
            token_expiry_unix: IntGaugeVec::new(Opts::new("token_expiry_unix_seconds", "Expiry of the most recently issued token"), &["kind"]).unwrap(),
            refresh_fallbacks: IntCounter::new("token_refresh_fallbacks_total", "Refresh failures answered with a new token request").unwrap(),

            cache_lookups: IntCounterVec::new(Opts::new("cache_lookups_total", "Token cache lookups by result"), &["result"]).unwrap(),

            config_validation_errors: IntCounter::new("config_validation_errors_total", "Validation errors during startup").unwrap(),
            up: IntGauge::new("up", "1 if service is healthy").unwrap(),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.token_requests.clone())).unwrap();
        reg.register(Box::new(metrics.token_failures.clone())).unwrap();
        reg.register(Box::new(metrics.token_request_duration.clone())).unwrap();
        reg.register(Box::new(metrics.token_expiry_unix.clone())).unwrap();
        reg.register(Box::new(metrics.refresh_fallbacks.clone())).unwrap();
        reg.register(Box::new(metrics.cache_lookups.clone())).unwrap();
        reg.register(Box::new(metrics.config_validation_errors.clone())).unwrap();
        reg.register(Box::new(metrics.up.clone())).unwrap();

        metrics
    }
}
