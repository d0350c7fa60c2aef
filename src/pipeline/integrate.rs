//! Folds per-source results into one daily record. A missing or empty
//! source lowers the richness label but never aborts the fold.

use std::{fmt::Display, sync::Arc};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    config::ActivityConfig,
    pipeline::{
        categorize::CategorizedEvent,
        event::EventSource,
        insights,
        search::SearchHit,
        stats::{self, ActivitySummary, ProductivityScore, RankedCount},
    },
    utils::clock::Clock,
};

const TOP_CATEGORIES: usize = 5;
const TOP_DOMAINS: usize = 5;
const TOP_SEARCHES: usize = 10;

/// Categories treated as productive when they arrive through a browser.
const PRODUCTIVE_WEB_CATEGORIES: [&str; 3] = ["developer", "work", "education"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Browser,
    Apps,
}

impl Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Browser => write!(f, "browser"),
            SourceKind::Apps => write!(f, "apps"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataRichness {
    None,
    Medium,
    High,
}

impl Display for DataRichness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataRichness::None => write!(f, "none"),
            DataRichness::Medium => write!(f, "medium"),
            DataRichness::High => write!(f, "high"),
        }
    }
}

/// Everything one collector contributed for the day, already normalized
/// and categorized.
#[derive(Debug)]
pub struct SourceData {
    pub kind: SourceKind,
    /// Date claimed by the capture itself, when it carries one.
    pub date: Option<NaiveDate>,
    pub events: Vec<CategorizedEvent>,
    pub skipped_records: usize,
    pub timestamp_failures: usize,
    pub searches: Vec<SearchHit>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceReport {
    pub kind: SourceKind,
    pub skipped_records: usize,
    pub timestamp_failures: usize,
    pub summary: ActivitySummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedOverview {
    pub total_events: u64,
    pub total_minutes: f64,
    pub top_categories: Vec<RankedCount>,
    pub top_domains: Vec<RankedCount>,
    pub top_searches: Vec<RankedCount>,
    pub search_count: u64,
    pub peak_hour: Option<u8>,
    /// Share of browser visits that landed in a productive category.
    pub browser_productivity_ratio: f64,
    pub productivity: ProductivityScore,
    pub insights: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegratedDailyRecord {
    pub date: NaiveDate,
    pub sources_present: Vec<SourceKind>,
    pub data_richness: DataRichness,
    pub per_source_summary: Vec<SourceReport>,
    pub combined_overview: CombinedOverview,
}

/// Builds the daily record from whatever sources survived loading. The
/// date comes from the first of: the explicit argument, the browser
/// capture, the app capture, today.
pub fn integrate(
    config: &ActivityConfig,
    clock: &dyn Clock,
    explicit_date: Option<NaiveDate>,
    browser: Option<SourceData>,
    apps: Option<SourceData>,
) -> IntegratedDailyRecord {
    let date = explicit_date
        .or_else(|| browser.as_ref().and_then(|s| s.date))
        .or_else(|| apps.as_ref().and_then(|s| s.date))
        .unwrap_or_else(|| clock.time().date_naive());

    let mut sources_present = Vec::new();
    let mut per_source_summary = Vec::new();
    for source in [&browser, &apps].into_iter().flatten() {
        if source.events.is_empty() {
            continue;
        }
        sources_present.push(source.kind);
        per_source_summary.push(SourceReport {
            kind: source.kind,
            skipped_records: source.skipped_records,
            timestamp_failures: source.timestamp_failures,
            summary: stats::aggregate(config, &source.events),
        });
    }
    let data_richness = match sources_present.len() {
        0 => DataRichness::None,
        1 => DataRichness::Medium,
        _ => DataRichness::High,
    };

    let mut combined: Vec<CategorizedEvent> = Vec::new();
    let mut searches: Vec<SearchHit> = Vec::new();
    for source in [browser, apps].into_iter().flatten() {
        searches.extend(source.searches);
        combined.extend(source.events);
    }

    let summary = stats::aggregate(config, &combined);
    let domains = combined
        .iter()
        .filter(|e| e.event.source == EventSource::BrowserVisit && !e.event.identifier.is_empty())
        .map(|e| e.event.identifier.clone());
    let queries = searches
        .iter()
        .map(|hit| Arc::<str>::from(hit.query.to_lowercase()));

    let browser_visits = combined
        .iter()
        .filter(|e| e.event.source == EventSource::BrowserVisit)
        .count();
    let productive_visits = combined
        .iter()
        .filter(|e| {
            e.event.source == EventSource::BrowserVisit
                && PRODUCTIVE_WEB_CATEGORIES.iter().any(|c| *c == &*e.category)
        })
        .count();
    let browser_productivity_ratio = if browser_visits > 0 {
        productive_visits as f64 / browser_visits as f64
    } else {
        0.0
    };

    let mut overview = CombinedOverview {
        total_events: summary.total_events,
        total_minutes: summary.total_minutes,
        top_categories: stats::top_categories(&summary.categories, TOP_CATEGORIES),
        top_domains: stats::top_counts(domains, TOP_DOMAINS),
        top_searches: stats::top_counts(queries, TOP_SEARCHES),
        search_count: searches.len() as u64,
        peak_hour: stats::peak_hour(&stats::hourly_totals(&combined)),
        browser_productivity_ratio,
        productivity: summary.productivity,
        insights: Vec::new(),
    };
    overview.insights = insights::generate(&overview, data_richness);

    IntegratedDailyRecord {
        date,
        sources_present,
        data_richness,
        per_source_summary,
        combined_overview: overview,
    }
}
