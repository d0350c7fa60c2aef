//! Normalization of raw capture rows into the canonical event shape.
//! One bad row never fails a batch: malformed rows are counted and
//! skipped, rows with unusable timestamps are kept without a time.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::{
    pipeline::{
        search,
        timestamp::{self, RawTimestamp, TimeBase},
    },
    sources::records::{AppCapture, AppRecord, BrowserCapture, BrowserRecord},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    RunningApp,
    AppHistory,
    BrowserVisit,
}

/// Canonical unit the pipeline works on. Built once per raw row and never
/// mutated afterwards; the category is attached as a separate annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityEvent {
    pub source: EventSource,
    /// Bundle identifier, or the normalized domain for browser visits.
    pub identifier: Arc<str>,
    pub display_name: Arc<str>,
    /// None when the raw timestamp failed to parse. Such events stay in
    /// count aggregates but never reach hourly histograms.
    pub occurred_at: Option<DateTime<Utc>>,
    pub duration_minutes: f64,
    pub url: Option<Arc<str>>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MalformedRecordError {
    #[error("browser row {index} has no url")]
    MissingUrl { index: usize },
    #[error("app row {index} has neither identifier nor name")]
    MissingSubject { index: usize },
}

/// Events recovered from one capture, with the rows that did not make it.
#[derive(Debug, Default)]
pub struct NormalizedBatch {
    pub events: Vec<ActivityEvent>,
    pub skipped: usize,
    pub timestamp_failures: usize,
}

impl NormalizedBatch {
    fn resolve_time(&mut self, base: TimeBase, raw: Option<&RawTimestamp>) -> Option<DateTime<Utc>> {
        let raw = raw?;
        match timestamp::normalize(base, raw) {
            Ok(v) => Some(v),
            Err(e) => {
                self.timestamp_failures += 1;
                warn!("dropping timestamp: {e}");
                None
            }
        }
    }
}

pub fn normalize_app_capture(capture: &AppCapture) -> NormalizedBatch {
    let mut batch = NormalizedBatch::default();
    normalize_app_rows(&capture.running_apps, EventSource::RunningApp, &mut batch);
    normalize_app_rows(&capture.app_history, EventSource::AppHistory, &mut batch);
    batch
}

fn normalize_app_rows(rows: &[AppRecord], source: EventSource, batch: &mut NormalizedBatch) {
    for (index, row) in rows.iter().enumerate() {
        let identifier = row.identifier.as_deref().filter(|v| !v.is_empty());
        let display_name = row.display_name.as_deref().filter(|v| !v.is_empty());
        let (identifier, display_name) = match (identifier, display_name) {
            (Some(id), Some(name)) => (id, name),
            // One of the two is enough to keep the row addressable.
            (Some(id), None) => (id, id),
            (None, Some(name)) => (name, name),
            (None, None) => {
                warn!(
                    "skipping app row: {}",
                    MalformedRecordError::MissingSubject { index }
                );
                batch.skipped += 1;
                continue;
            }
        };

        let occurred_at = batch.resolve_time(TimeBase::Iso8601, row.timestamp.as_ref());
        let duration_minutes = match source {
            EventSource::AppHistory => row.duration_minutes.unwrap_or(0.0).max(0.0),
            _ => 0.0,
        };

        batch.events.push(ActivityEvent {
            source,
            identifier: identifier.into(),
            display_name: display_name.into(),
            occurred_at,
            duration_minutes,
            url: None,
        });
    }
}

pub fn normalize_browser_capture(capture: &BrowserCapture) -> NormalizedBatch {
    let mut batch = NormalizedBatch::default();
    let base = capture.browser.time_base();
    for (index, row) in capture.visits.iter().enumerate() {
        normalize_visit(row, index, base, &mut batch);
    }
    batch
}

fn normalize_visit(row: &BrowserRecord, index: usize, base: TimeBase, batch: &mut NormalizedBatch) {
    let Some(url) = row.url.as_deref().filter(|v| !v.is_empty()) else {
        warn!(
            "skipping visit: {}",
            MalformedRecordError::MissingUrl { index }
        );
        batch.skipped += 1;
        return;
    };

    let identifier = row
        .domain
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(normalize_domain)
        .or_else(|| search::host_of(url).map(normalize_domain))
        .unwrap_or_default();

    let occurred_at = batch.resolve_time(base, row.visit_time.as_ref());

    batch.events.push(ActivityEvent {
        source: EventSource::BrowserVisit,
        identifier: identifier.into(),
        display_name: row.title.clone().unwrap_or_else(|| "".into()),
        occurred_at,
        duration_minutes: row.duration.unwrap_or(0.0).max(0.0) / 60.0,
        url: Some(url.into()),
    });
}

/// Lowercases a host and strips the `www.` prefix so the same site always
/// produces the same identifier.
pub fn normalize_domain(host: &str) -> String {
    let host = host.to_lowercase();
    match host.strip_prefix("www.") {
        Some(rest) if !rest.is_empty() => rest.to_string(),
        _ => host,
    }
}
