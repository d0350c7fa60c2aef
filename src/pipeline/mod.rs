//! The day-folding pipeline. Raw capture rows flow through normalization,
//! categorization and search extraction, then per-source results merge
//! into one [IntegratedDailyRecord].

pub mod categorize;
pub mod event;
pub mod insights;
pub mod integrate;
pub mod search;
pub mod stats;
pub mod timestamp;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::{
    config::ActivityConfig,
    pipeline::{
        event::NormalizedBatch,
        integrate::{IntegratedDailyRecord, SourceData, SourceKind},
    },
    sources::{CaptureStore, SourceError},
    utils::clock::Clock,
};

/// Runs the pipeline for one day end to end. Both captures are loaded,
/// normalized and categorized independently, then folded together; a
/// source that fails to load only lowers the richness of the result.
pub async fn fold_day(
    store: impl CaptureStore,
    config: &ActivityConfig,
    clock: &dyn Clock,
    explicit_date: Option<NaiveDate>,
) -> IntegratedDailyRecord {
    let requested = explicit_date.unwrap_or_else(|| clock.time().date_naive());
    info!("Folding activity for {requested}");

    let (browser, apps) = tokio::join!(
        load_browser_source(&store, config, requested),
        load_app_source(&store, config, requested),
    );

    integrate::integrate(config, clock, explicit_date, browser, apps)
}

async fn load_browser_source(
    store: &impl CaptureStore,
    config: &ActivityConfig,
    date: NaiveDate,
) -> Option<SourceData> {
    let capture = match store.load_browser_capture(date).await {
        Ok(v) => v,
        Err(e) => return skip_source(e),
    };

    let NormalizedBatch {
        events,
        skipped,
        timestamp_failures,
    } = event::normalize_browser_capture(&capture);

    let searches = events
        .iter()
        .filter_map(|e| e.url.as_deref())
        .filter_map(|url| search::extract_query(&config.search_engines, url))
        .collect();

    Some(SourceData {
        kind: SourceKind::Browser,
        date: capture.date,
        events: categorize::categorize_all(config, events),
        skipped_records: skipped,
        timestamp_failures,
        searches,
    })
}

async fn load_app_source(
    store: &impl CaptureStore,
    config: &ActivityConfig,
    date: NaiveDate,
) -> Option<SourceData> {
    let capture = match store.load_app_capture(date).await {
        Ok(v) => v,
        Err(e) => return skip_source(e),
    };

    let NormalizedBatch {
        events,
        skipped,
        timestamp_failures,
    } = event::normalize_app_capture(&capture);

    Some(SourceData {
        kind: SourceKind::Apps,
        date: capture.date,
        events: categorize::categorize_all(config, events),
        skipped_records: skipped,
        timestamp_failures,
        searches: Vec::new(),
    })
}

fn skip_source(error: SourceError) -> Option<SourceData> {
    match error {
        // An absent file is the ordinary shape of "the collector never ran".
        SourceError::Unavailable { .. } => info!("{error}"),
        _ => warn!("Skipping source: {error}"),
    }
    None
}
