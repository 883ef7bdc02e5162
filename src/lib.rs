// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod article;
pub mod cache;
pub mod charts;
pub mod error;
pub mod fetcher;
pub mod metrics;
pub mod processor;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, run_pipeline, AppState};
pub use crate::article::{CleanArticle, RawArticle, RawSource};
pub use crate::cache::{ArticleCache, TimeRange};
pub use crate::error::{FetchError, ProcessError};
pub use crate::fetcher::{NewsApiFetcher, NewsSource, ENV_NEWS_API_KEY};
