// src/processor.rs
// Normalizes raw NewsAPI records into the clean, sorted, deduplicated
// collection every downstream aggregate works from.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

use crate::article::{CleanArticle, RawArticle};
use crate::error::ProcessError;

/// Turn raw records into the clean collection.
///
/// An empty input is a legitimate "no mentions" outcome, not an error. Any
/// malformed record rejects the whole batch: the output satisfies every
/// collection invariant or the caller gets an error to degrade on.
pub fn process(raw: Vec<RawArticle>) -> Result<Vec<CleanArticle>, ProcessError> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }

    let mut clean = Vec::with_capacity(raw.len());
    for article in raw {
        clean.push(normalize(article)?);
    }

    // Most recent first. The sort is stable, so equal timestamps keep their
    // upstream order and dedup below is deterministic.
    clean.sort_by(|a, b| b.published_at.cmp(&a.published_at));

    // First occurrence under the sort wins: the most recently published of
    // any (title, source) pair is the one kept.
    let mut seen: HashSet<(String, String)> = HashSet::new();
    clean.retain(|a| seen.insert((a.title.clone(), a.source.clone())));

    Ok(clean)
}

fn normalize(raw: RawArticle) -> Result<CleanArticle, ProcessError> {
    let title = require(raw.title, "title")?;
    let description = require(raw.description, "description")?;
    let source = require(raw.source, "source")?.display_name();
    let published_raw = require(raw.published_at, "publishedAt")?;
    let url = require(raw.url, "url")?;

    Ok(CleanArticle {
        title,
        description,
        source,
        published_at: parse_published_at(&published_raw)?,
        url,
    })
}

fn require<T>(value: Option<T>, field: &'static str) -> Result<T, ProcessError> {
    value.ok_or(ProcessError::MissingField { field })
}

/// NewsAPI timestamps are RFC 3339 in practice, but zone-less variants show
/// up in the wild; those are taken as UTC. Offsets are converted to UTC.
fn parse_published_at(value: &str) -> Result<DateTime<Utc>, ProcessError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    match NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(naive) => Ok(Utc.from_utc_datetime(&naive)),
        Err(source) => Err(ProcessError::BadTimestamp {
            value: value.to_string(),
            source,
        }),
    }
}
