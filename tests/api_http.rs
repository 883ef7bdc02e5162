//! Integration tests for the JSON API consumed by the dashboard shell.
//!
//! Covered:
//! - summary metrics + sorted/deduplicated articles on /api/news
//! - degrade-to-empty payload when the upstream source fails
//! - unknown `range` values falling back to 24h
//! - gap-filled trend buckets and publisher breakdown endpoints

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{body::Body, http::Request, Router};
use chrono::{DateTime, Utc};
use http::StatusCode;
use serde_json::Value;
use tower::ServiceExt; // for oneshot

use bitcoin_news_tracker::{
    router, AppState, ArticleCache, FetchError, NewsSource, RawArticle,
};

struct StubSource {
    articles: Vec<RawArticle>,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl NewsSource for StubSource {
    async fn fetch(
        &self,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<Vec<RawArticle>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.articles.clone())
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

struct FailingSource;

#[async_trait]
impl NewsSource for FailingSource {
    async fn fetch(
        &self,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<Vec<RawArticle>, FetchError> {
        Err(FetchError::MissingApiKey)
    }

    fn name(&self) -> &'static str {
        "failing-stub"
    }
}

fn raw_article(title: &str, source_name: &str, published_at: &str) -> RawArticle {
    serde_json::from_value(serde_json::json!({
        "title": title,
        "description": "some detail",
        "source": {"id": null, "name": source_name},
        "publishedAt": published_at,
        "url": format!("https://example.com/{}", title.replace(' ', "-")),
    }))
    .expect("raw article json")
}

fn app_with(articles: Vec<RawArticle>) -> Router {
    let state = AppState::new(
        Arc::new(StubSource {
            articles,
            calls: Arc::new(AtomicUsize::new(0)),
        }),
        Arc::new(ArticleCache::new_1h()),
    );
    router(state)
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("request build"),
        )
        .await
        .expect("router response");
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json = serde_json::from_slice(&bytes).expect("json body");
    (status, json)
}

#[tokio::test]
async fn health_returns_ok() {
    let app = app_with(Vec::new());
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .expect("request build"),
        )
        .await
        .expect("router response");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn news_returns_summary_and_sorted_deduped_articles() {
    let app = app_with(vec![
        raw_article("Bitcoin hits new high", "CoinDesk", "2024-03-01T08:00:00Z"),
        raw_article("Bitcoin hits new high", "CoinDesk", "2024-03-01T12:00:00Z"),
        raw_article("ETF flows accelerate", "Reuters", "2024-03-01T10:00:00Z"),
    ]);

    let (status, body) = get_json(&app, "/api/news").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["unique_sources"], 2);
    assert_eq!(body["range"], "24h");

    let articles = body["articles"].as_array().expect("articles array");
    assert_eq!(articles.len(), 2);
    // Most recent first; the duplicate keeps the later timestamp.
    assert_eq!(articles[0]["title"], "Bitcoin hits new high");
    assert_eq!(articles[0]["published_at"], "2024-03-01T12:00:00Z");
    assert_eq!(articles[1]["title"], "ETF flows accelerate");
}

#[tokio::test]
async fn recent_mentions_counts_last_hour_of_now() {
    let fresh = (Utc::now() - chrono::Duration::minutes(10))
        .to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    let stale = (Utc::now() - chrono::Duration::hours(5))
        .to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    let app = app_with(vec![
        raw_article("fresh mention", "Reuters", &fresh),
        raw_article("stale mention", "Reuters", &stale),
    ]);

    let (_, body) = get_json(&app, "/api/news").await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["recent_mentions"], 1);
}

#[tokio::test]
async fn failing_source_degrades_to_empty_payload() {
    let state = AppState::new(Arc::new(FailingSource), Arc::new(ArticleCache::new_1h()));
    let app = router(state);

    let (status, body) = get_json(&app, "/api/news").await;
    assert_eq!(status, StatusCode::OK, "failures must not surface as 5xx");
    assert_eq!(body["total"], 0);
    assert_eq!(body["recent_mentions"], 0);
    assert_eq!(body["articles"].as_array().map(Vec::len), Some(0));

    let (status, body) = get_json(&app, "/api/trend").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["buckets"].as_array().map(Vec::len), Some(0));

    let (status, body) = get_json(&app, "/api/sources").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sources"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn unknown_range_falls_back_to_24h() {
    let app = app_with(Vec::new());
    let (status, body) = get_json(&app, "/api/news?range=fortnight").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["range"], "24h");

    let (_, body) = get_json(&app, "/api/news?range=7d").await;
    assert_eq!(body["range"], "7d");
}

#[tokio::test]
async fn trend_buckets_are_gap_filled_and_ascending() {
    // Mentions only at hour 0 and hour 3: four buckets, middle two at zero.
    let app = app_with(vec![
        raw_article("a", "Reuters", "2024-03-01T00:15:00Z"),
        raw_article("b", "CoinDesk", "2024-03-01T03:45:00Z"),
    ]);

    let (status, body) = get_json(&app, "/api/trend").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["granularity"], "hour");

    let buckets = body["buckets"].as_array().expect("buckets array");
    assert_eq!(buckets.len(), 4);
    let counts: Vec<u64> = buckets
        .iter()
        .map(|b| b["mentions"].as_u64().expect("mentions"))
        .collect();
    assert_eq!(counts, vec![1, 0, 0, 1]);
    assert_eq!(buckets[0]["bucket_start"], "2024-03-01T00:00:00Z");
    assert_eq!(buckets[3]["bucket_start"], "2024-03-01T03:00:00Z");
}

#[tokio::test]
async fn daily_trend_uses_day_granularity() {
    let app = app_with(vec![
        raw_article("a", "Reuters", "2024-03-01T09:00:00Z"),
        raw_article("b", "Reuters", "2024-03-03T02:00:00Z"),
    ]);

    let (_, body) = get_json(&app, "/api/trend/daily").await;
    assert_eq!(body["granularity"], "day");
    let buckets = body["buckets"].as_array().expect("buckets array");
    assert_eq!(buckets.len(), 3);
    assert_eq!(buckets[1]["mentions"], 0);
}

#[tokio::test]
async fn sources_are_ranked_by_mention_count() {
    let app = app_with(vec![
        raw_article("a", "Reuters", "2024-03-01T01:00:00Z"),
        raw_article("b", "Reuters", "2024-03-01T02:00:00Z"),
        raw_article("c", "CoinDesk", "2024-03-01T03:00:00Z"),
    ]);

    let (status, body) = get_json(&app, "/api/sources").await;
    assert_eq!(status, StatusCode::OK);

    let sources = body["sources"].as_array().expect("sources array");
    assert_eq!(sources.len(), 2);
    assert_eq!(sources[0]["source"], "Reuters");
    assert_eq!(sources[0]["mentions"], 2);
    assert_eq!(sources[1]["source"], "CoinDesk");
}
