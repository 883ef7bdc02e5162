// src/metrics.rs

use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up on /metrics).
pub fn ensure_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "news_fetch_articles_total",
            "Raw articles returned by the upstream API."
        );
        describe_counter!(
            "news_fetch_errors_total",
            "Fetch stage failures by kind (config/transport/api_status/decode)."
        );
        describe_counter!(
            "news_process_errors_total",
            "Batches rejected by the normalization stage."
        );
        describe_counter!(
            "news_articles_kept_total",
            "Clean rows surviving normalization + dedup."
        );
        describe_counter!(
            "news_dedup_dropped_total",
            "Rows removed as (title, source) duplicates."
        );
        describe_counter!("news_cache_hits_total", "Collection cache hits.");
        describe_counter!("news_cache_misses_total", "Collection cache misses.");
        describe_histogram!("news_process_ms", "Normalization time in milliseconds.");
        describe_gauge!(
            "news_pipeline_last_run_ts",
            "Unix ts when the pipeline last ran upstream."
        );
    });
}

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Initialize Prometheus recorder and expose a static gauge for the cache TTL.
    pub fn init(cache_ttl_secs: u64) -> Self {
        let builder = PrometheusBuilder::new();

        let handle = builder
            .install_recorder()
            .expect("prometheus: install recorder");

        ensure_described();
        gauge!("news_cache_ttl_seconds").set(cache_ttl_secs as f64);

        Self { handle }
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
