//! Bitcoin News Tracker — Binary Entrypoint
//! Boots the Axum HTTP server: NewsAPI fetcher, TTL cache, JSON API, metrics.

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bitcoin_news_tracker::cache::ArticleCache;
use bitcoin_news_tracker::fetcher::NewsApiFetcher;
use bitcoin_news_tracker::metrics::Metrics;
use bitcoin_news_tracker::{api, AppState};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bitcoin_news_tracker=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op in prod environments. This is where
    // NEWS_API_KEY usually comes from outside of container deployments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cache = Arc::new(ArticleCache::new_1h());
    let metrics = Metrics::init(cache.ttl_secs());

    let fetcher = NewsApiFetcher::from_env();
    let state = AppState::new(Arc::new(fetcher), cache);
    let app = api::router(state).merge(metrics.router());

    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string());
    let addr = format!("{bind_addr}:{port}");
    tracing::info!(%addr, "bitcoin news tracker listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
