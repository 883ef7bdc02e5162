// src/api.rs
// HTTP boundary consumed by the dashboard shell, plus the pipeline
// orchestration (fetch → process → cache) behind it.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use metrics::{counter, gauge, histogram};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::article::CleanArticle;
use crate::cache::{ArticleCache, TimeRange};
use crate::charts::{self, SourceCount, TimeBucket};
use crate::fetcher::NewsSource;
use crate::processor;

/// Diagnostic header reporting whether the served collection came from the
/// TTL cache.
const CACHE_HEADER: &str = "x-news-cache";

#[derive(Clone)]
pub struct AppState {
    source: Arc<dyn NewsSource>,
    cache: Arc<ArticleCache>,
}

impl AppState {
    pub fn new(source: Arc<dyn NewsSource>, cache: Arc<ArticleCache>) -> Self {
        Self { source, cache }
    }
}

pub fn router(state: AppState) -> Router {
    crate::metrics::ensure_described();

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/news", get(news))
        .route("/api/trend", get(trend))
        .route("/api/trend/daily", get(trend_daily))
        .route("/api/sources", get(sources))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Fetch and normalize one time window. Degrades to an empty collection on
/// any stage failure; failures are logged and counted, never propagated, so
/// the shell always receives a well-typed value.
pub async fn run_pipeline(source: &dyn NewsSource, range: TimeRange) -> Vec<CleanArticle> {
    let now = Utc::now();
    let (start, end) = range.window(now);

    let raw = match source.fetch(start, end).await {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(
                stage = "fetch",
                source = source.name(),
                kind = e.kind(),
                error = %e,
                "news fetch failed"
            );
            counter!("news_fetch_errors_total", "kind" => e.kind()).increment(1);
            return Vec::new();
        }
    };
    if raw.is_empty() {
        // Legitimate "no mentions" outcome; logged apart from failures.
        tracing::info!(
            stage = "fetch",
            source = source.name(),
            range = range.label(),
            "no articles in window"
        );
        return Vec::new();
    }

    let t0 = Instant::now();
    let raw_len = raw.len();
    let clean = match processor::process(raw) {
        Ok(clean) => clean,
        Err(e) => {
            tracing::warn!(stage = "process", kind = e.kind(), error = %e, "normalization failed");
            counter!("news_process_errors_total").increment(1);
            return Vec::new();
        }
    };

    histogram!("news_process_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
    counter!("news_articles_kept_total").increment(clean.len() as u64);
    counter!("news_dedup_dropped_total").increment((raw_len - clean.len()) as u64);
    gauge!("news_pipeline_last_run_ts").set(now.timestamp() as f64);

    tracing::info!(
        range = range.label(),
        fetched = raw_len,
        kept = clean.len(),
        "pipeline run complete"
    );
    clean
}

async fn load_articles(state: &AppState, range: TimeRange) -> (Vec<CleanArticle>, &'static str) {
    if let Some(articles) = state.cache.get(range) {
        counter!("news_cache_hits_total").increment(1);
        return (articles, "HIT");
    }
    counter!("news_cache_misses_total").increment(1);

    let articles = run_pipeline(state.source.as_ref(), range).await;
    state.cache.put(range, articles.clone());
    (articles, "MISS")
}

#[derive(Deserialize)]
struct RangeQuery {
    #[serde(default)]
    range: Option<String>,
}

impl RangeQuery {
    fn resolve(&self) -> TimeRange {
        self.range
            .as_deref()
            .map(TimeRange::from_query)
            .unwrap_or(TimeRange::Day)
    }
}

#[derive(Debug, Serialize)]
struct NewsResponse {
    range: &'static str,
    total: usize,
    unique_sources: usize,
    recent_mentions: usize,
    articles: Vec<CleanArticle>,
}

async fn news(
    State(state): State<AppState>,
    Query(q): Query<RangeQuery>,
) -> ([(&'static str, &'static str); 1], Json<NewsResponse>) {
    let range = q.resolve();
    let (articles, cache_status) = load_articles(&state, range).await;
    let summary = charts::summarize(&articles, Utc::now());

    let body = NewsResponse {
        range: range.label(),
        total: summary.total,
        unique_sources: summary.unique_sources,
        recent_mentions: summary.recent_mentions,
        articles,
    };
    ([(CACHE_HEADER, cache_status)], Json(body))
}

#[derive(Debug, Serialize)]
struct TrendResponse {
    range: &'static str,
    granularity: &'static str,
    buckets: Vec<TimeBucket>,
}

async fn trend(
    State(state): State<AppState>,
    Query(q): Query<RangeQuery>,
) -> ([(&'static str, &'static str); 1], Json<TrendResponse>) {
    let range = q.resolve();
    let (articles, cache_status) = load_articles(&state, range).await;
    let body = TrendResponse {
        range: range.label(),
        granularity: "hour",
        buckets: charts::hourly_series(&articles),
    };
    ([(CACHE_HEADER, cache_status)], Json(body))
}

async fn trend_daily(
    State(state): State<AppState>,
    Query(q): Query<RangeQuery>,
) -> ([(&'static str, &'static str); 1], Json<TrendResponse>) {
    let range = q.resolve();
    let (articles, cache_status) = load_articles(&state, range).await;
    let body = TrendResponse {
        range: range.label(),
        granularity: "day",
        buckets: charts::daily_series(&articles),
    };
    ([(CACHE_HEADER, cache_status)], Json(body))
}

#[derive(Debug, Serialize)]
struct SourcesResponse {
    range: &'static str,
    sources: Vec<SourceCount>,
}

async fn sources(
    State(state): State<AppState>,
    Query(q): Query<RangeQuery>,
) -> ([(&'static str, &'static str); 1], Json<SourcesResponse>) {
    let range = q.resolve();
    let (articles, cache_status) = load_articles(&state, range).await;
    let body = SourcesResponse {
        range: range.label(),
        sources: charts::source_breakdown(&articles),
    };
    ([(CACHE_HEADER, cache_status)], Json(body))
}
