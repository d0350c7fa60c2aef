//! Raw capture file shapes as the collectors write them. These are the
//! boundary of the pipeline: everything here is deserialized as-is and
//! immediately normalized into events.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::pipeline::timestamp::{RawTimestamp, TimeBase};

/// One row from the app collector. Snapshot rows carry `active` and no
/// duration; history rows carry `duration_minutes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppRecord {
    #[serde(default)]
    pub identifier: Option<Arc<str>>,
    #[serde(default)]
    pub display_name: Option<Arc<str>>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub timestamp: Option<RawTimestamp>,
    #[serde(default)]
    pub duration_minutes: Option<f64>,
}

/// One visit row from the browser collector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowserRecord {
    #[serde(default)]
    pub url: Option<Arc<str>>,
    #[serde(default)]
    pub title: Option<Arc<str>>,
    #[serde(default)]
    pub visit_time: Option<RawTimestamp>,
    /// Seconds on the page, when the browser reports it.
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub domain: Option<Arc<str>>,
}

/// Browser whose history produced a capture. Picks the timestamp
/// convention for its visit rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    Chrome,
    Safari,
}

impl BrowserKind {
    pub fn time_base(self) -> TimeBase {
        match self {
            BrowserKind::Chrome => TimeBase::WebkitMicros,
            BrowserKind::Safari => TimeBase::CoreDataSeconds,
        }
    }
}

/// Contents of an `app_records_<date>.json` capture file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppCapture {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub running_apps: Vec<AppRecord>,
    #[serde(default)]
    pub app_history: Vec<AppRecord>,
}

/// Contents of a `browser_visits_<date>.json` capture file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowserCapture {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    pub browser: BrowserKind,
    #[serde(default)]
    pub visits: Vec<BrowserRecord>,
}
