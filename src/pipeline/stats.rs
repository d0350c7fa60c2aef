//! Per-category statistics, hourly histograms and productivity scoring.
//! Everything here is recomputed from scratch on each run; nothing is
//! accumulated across days.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::Arc,
};

use chrono::Timelike;
use serde::{Deserialize, Serialize};

use crate::{
    config::ActivityConfig,
    pipeline::{categorize::CategorizedEvent, event::EventSource},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HourlyBucket {
    pub count: u64,
    pub minutes: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStatistics {
    pub category: Arc<str>,
    pub count: u64,
    pub total_minutes: f64,
    /// Keyed by hour of day. Only events with a resolved timestamp land
    /// here, so the bucket counts can sum below `count`.
    pub hourly_histogram: BTreeMap<u8, HourlyBucket>,
    pub peak_hour: Option<u8>,
    pub unique_subjects: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductivityScore {
    /// Count-weighted average over snapshot events, in [0, 100].
    pub instantaneous: f64,
    /// Duration-weighted average over events that carry time, in [0, 100].
    pub historical: f64,
    pub overall: f64,
    /// Weight actually applied per category seen in the input.
    pub weights_used: BTreeMap<Arc<str>, f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivitySummary {
    pub total_events: u64,
    pub total_minutes: f64,
    /// One entry per category seen, in first-encountered order.
    pub categories: Vec<CategoryStatistics>,
    pub productivity: ProductivityScore,
}

struct CategoryAccumulator {
    category: Arc<str>,
    count: u64,
    minutes: f64,
    histogram: BTreeMap<u8, HourlyBucket>,
    subjects: HashSet<Arc<str>>,
}

impl CategoryAccumulator {
    fn new(category: Arc<str>) -> Self {
        CategoryAccumulator {
            category,
            count: 0,
            minutes: 0.0,
            histogram: BTreeMap::new(),
            subjects: HashSet::new(),
        }
    }

    fn finish(self) -> CategoryStatistics {
        let peak_hour = peak_hour(&self.histogram);
        CategoryStatistics {
            category: self.category,
            count: self.count,
            total_minutes: self.minutes,
            hourly_histogram: self.histogram,
            peak_hour,
            unique_subjects: self.subjects.len(),
        }
    }
}

pub fn aggregate(config: &ActivityConfig, events: &[CategorizedEvent]) -> ActivitySummary {
    let mut order: Vec<CategoryAccumulator> = Vec::new();
    let mut index: HashMap<Arc<str>, usize> = HashMap::new();

    for entry in events {
        let slot = match index.get(&entry.category) {
            Some(&slot) => slot,
            None => {
                index.insert(entry.category.clone(), order.len());
                order.push(CategoryAccumulator::new(entry.category.clone()));
                order.len() - 1
            }
        };
        let accumulator = &mut order[slot];
        accumulator.count += 1;
        accumulator.minutes += entry.event.duration_minutes;
        accumulator.subjects.insert(entry.event.identifier.clone());
        if let Some(at) = entry.event.occurred_at {
            let bucket = accumulator.histogram.entry(at.hour() as u8).or_default();
            bucket.count += 1;
            bucket.minutes += entry.event.duration_minutes;
        }
    }

    ActivitySummary {
        total_events: events.len() as u64,
        total_minutes: events.iter().map(|e| e.event.duration_minutes).sum(),
        categories: order.into_iter().map(CategoryAccumulator::finish).collect(),
        productivity: productivity(config, events),
    }
}

/// Hourly totals across every event, regardless of category.
pub fn hourly_totals(events: &[CategorizedEvent]) -> BTreeMap<u8, HourlyBucket> {
    let mut totals: BTreeMap<u8, HourlyBucket> = BTreeMap::new();
    for entry in events {
        if let Some(at) = entry.event.occurred_at {
            let bucket = totals.entry(at.hour() as u8).or_default();
            bucket.count += 1;
            bucket.minutes += entry.event.duration_minutes;
        }
    }
    totals
}

/// Hour holding the most weight. Durations decide when the histogram has
/// any, otherwise counts do; the lower hour wins ties.
pub fn peak_hour(histogram: &BTreeMap<u8, HourlyBucket>) -> Option<u8> {
    let by_minutes = histogram.values().map(|b| b.minutes).sum::<f64>() > 0.0;
    let mut best: Option<(u8, f64)> = None;
    for (&hour, bucket) in histogram {
        let weight = if by_minutes {
            bucket.minutes
        } else {
            bucket.count as f64
        };
        match best {
            Some((_, top)) if weight <= top => {}
            _ => best = Some((hour, weight)),
        }
    }
    best.map(|(hour, _)| hour)
}

pub fn productivity(config: &ActivityConfig, events: &[CategorizedEvent]) -> ProductivityScore {
    let mut weights_used = BTreeMap::new();
    for entry in events {
        weights_used
            .entry(entry.category.clone())
            .or_insert_with(|| config.weight_for(&entry.category));
    }

    let mut snapshot_sum = 0.0;
    let mut snapshot_count = 0u64;
    for entry in events {
        if entry.event.source != EventSource::AppHistory {
            snapshot_sum += config.weight_for(&entry.category);
            snapshot_count += 1;
        }
    }
    let instantaneous = (snapshot_count > 0)
        .then(|| round_score(snapshot_sum / snapshot_count as f64 * 100.0));

    let mut weighted_minutes = 0.0;
    let mut timed_minutes = 0.0;
    for entry in events {
        let duration = entry.event.duration_minutes;
        if duration > 0.0 {
            weighted_minutes += config.weight_for(&entry.category) * duration;
            timed_minutes += duration;
        }
    }
    let historical =
        (timed_minutes > 0.0).then(|| round_score(weighted_minutes / timed_minutes * 100.0));

    let overall = match (instantaneous, historical) {
        (Some(i), Some(h)) => round_score((i + h) / 2.0),
        (Some(i), None) => i,
        (None, Some(h)) => h,
        (None, None) => 0.0,
    };

    ProductivityScore {
        instantaneous: instantaneous.unwrap_or(0.0),
        historical: historical.unwrap_or(0.0),
        overall,
        weights_used,
    }
}

fn round_score(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCount {
    pub name: Arc<str>,
    pub count: u64,
}

/// Occurrence counts sorted descending, capped at `n`. The sort is stable,
/// so equal counts keep their first-encountered order.
pub fn top_counts(names: impl IntoIterator<Item = Arc<str>>, n: usize) -> Vec<RankedCount> {
    let mut order: Vec<RankedCount> = Vec::new();
    let mut index: HashMap<Arc<str>, usize> = HashMap::new();
    for name in names {
        match index.get(&name) {
            Some(&slot) => order[slot].count += 1,
            None => {
                index.insert(name.clone(), order.len());
                order.push(RankedCount { name, count: 1 });
            }
        }
    }
    order.sort_by(|a, b| b.count.cmp(&a.count));
    order.truncate(n);
    order
}

pub fn top_categories(categories: &[CategoryStatistics], n: usize) -> Vec<RankedCount> {
    let mut ranked: Vec<RankedCount> = categories
        .iter()
        .map(|c| RankedCount {
            name: c.category.clone(),
            count: c.count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(n);
    ranked
}
