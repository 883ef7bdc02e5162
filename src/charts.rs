// src/charts.rs
// Presentation aggregates derived from the clean collection. Pure functions;
// nothing here mutates or re-fetches.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, DurationRound, Utc};
use serde::Serialize;

use crate::article::CleanArticle;

/// How many publishers the breakdown keeps.
const TOP_SOURCES: usize = 10;

/// One point of a mention-count time series. Bucket starts are UTC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeBucket {
    pub bucket_start: DateTime<Utc>,
    pub mentions: u64,
}

/// One row of the publisher breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceCount {
    pub source: String,
    pub mentions: u64,
}

/// Scalar metrics the dashboard shell shows above the charts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub unique_sources: usize,
    pub recent_mentions: usize,
}

/// Hourly mention counts spanning the full observed range, oldest first.
/// Hours with no mentions appear with a zero count rather than being omitted.
pub fn hourly_series(articles: &[CleanArticle]) -> Vec<TimeBucket> {
    bucketed_series(articles, Duration::hours(1))
}

/// Same shape as [`hourly_series`] at daily granularity.
pub fn daily_series(articles: &[CleanArticle]) -> Vec<TimeBucket> {
    bucketed_series(articles, Duration::days(1))
}

fn bucketed_series(articles: &[CleanArticle], step: Duration) -> Vec<TimeBucket> {
    let Some(first) = articles.first() else {
        return Vec::new();
    };

    let mut min = first.published_at;
    let mut max = first.published_at;
    let mut counts: HashMap<DateTime<Utc>, u64> = HashMap::new();
    for a in articles {
        min = min.min(a.published_at);
        max = max.max(a.published_at);
        *counts.entry(truncate(a.published_at, step)).or_default() += 1;
    }

    let end = truncate(max, step);
    let mut cursor = truncate(min, step);
    let mut out = Vec::new();
    while cursor <= end {
        out.push(TimeBucket {
            bucket_start: cursor,
            mentions: counts.get(&cursor).copied().unwrap_or(0),
        });
        cursor = cursor + step;
    }
    out
}

fn truncate(ts: DateTime<Utc>, step: Duration) -> DateTime<Utc> {
    // Cannot fail for the fixed hour/day steps used here.
    ts.duration_trunc(step).unwrap_or(ts)
}

/// Top publishers by mention count, descending, truncated to ten. Ties keep
/// first-encountered order, which under the collection sort means the
/// publisher with the more recent article ranks first.
pub fn source_breakdown(articles: &[CleanArticle]) -> Vec<SourceCount> {
    let mut counts: Vec<SourceCount> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for a in articles {
        match index.get(&a.source) {
            Some(&i) => counts[i].mentions += 1,
            None => {
                index.insert(a.source.clone(), counts.len());
                counts.push(SourceCount {
                    source: a.source.clone(),
                    mentions: 1,
                });
            }
        }
    }

    counts.sort_by(|a, b| b.mentions.cmp(&a.mentions));
    counts.truncate(TOP_SOURCES);
    counts
}

/// The three scalar metrics: total rows, distinct publishers, and rows
/// published within the hour before `now`.
pub fn summarize(articles: &[CleanArticle], now: DateTime<Utc>) -> Summary {
    let one_hour_ago = now - Duration::hours(1);
    Summary {
        total: articles.len(),
        unique_sources: articles
            .iter()
            .map(|a| a.source.as_str())
            .collect::<HashSet<_>>()
            .len(),
        recent_mentions: articles
            .iter()
            .filter(|a| a.published_at >= one_hour_ago)
            .count(),
    }
}
