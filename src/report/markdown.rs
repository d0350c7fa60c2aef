//! Renders the daily note. Pure string assembly; every number is taken
//! from the integrated record as-is.

use crate::pipeline::integrate::{
    DataRichness, IntegratedDailyRecord, SourceKind, SourceReport,
};

pub fn render(record: &IntegratedDailyRecord) -> String {
    let overview = &record.combined_overview;
    let browser = source_report(record, SourceKind::Browser);
    let apps = source_report(record, SourceKind::Apps);

    let mut note = String::new();
    note.push_str(&format!("# Daily Activity - {}\n", record.date));

    note.push_str("\n## Summary\n\n");
    note.push_str(&format!("- Events: {}\n", overview.total_events));
    note.push_str(&format!("- Data richness: {}\n", record.data_richness));
    if record.data_richness != DataRichness::None {
        note.push_str(&format!(
            "- Overall productivity: {:.1} / 100\n",
            overview.productivity.overall
        ));
    }

    note.push_str("\n## Browser activity\n\n");
    match browser {
        Some(report) => {
            if !overview.top_domains.is_empty() {
                note.push_str("| Domain | Visits |\n| --- | --- |\n");
                for domain in &overview.top_domains {
                    note.push_str(&format!("| {} | {} |\n", domain.name, domain.count));
                }
            }
            if !overview.top_searches.is_empty() {
                note.push_str("\nTop searches:\n");
                for (position, search) in overview.top_searches.iter().enumerate() {
                    note.push_str(&format!("{}. {}\n", position + 1, search.name));
                }
            }
            note.push_str("\n| Category | Visits | Share |\n| --- | --- | --- |\n");
            for stats in &report.summary.categories {
                let share = stats.count as f64 / report.summary.total_events as f64 * 100.0;
                note.push_str(&format!(
                    "| {} | {} | {share:.1}% |\n",
                    stats.category, stats.count
                ));
            }
        }
        None => note.push_str("No browser capture contributed to this day.\n"),
    }

    note.push_str("\n## App activity\n\n");
    match apps {
        Some(report) => {
            note.push_str(&format!("- Sessions: {}\n", report.summary.total_events));
            let top = report
                .summary
                .categories
                .iter()
                .map(|c| format!("{} ({})", c.category, c.count))
                .collect::<Vec<_>>()
                .join(", ");
            note.push_str(&format!("- Categories: {top}\n"));
        }
        None => note.push_str("No application capture contributed to this day.\n"),
    }

    note.push_str("\n## Time patterns\n\n");
    match overview.peak_hour {
        Some(peak) => note.push_str(&format!(
            "- Peak hour: {peak:02}:00 ({})\n",
            day_period(peak)
        )),
        None => note.push_str("- No timestamped events.\n"),
    }

    note.push_str("\n## Productivity\n\n");
    if record.data_richness == DataRichness::None {
        note.push_str("Nothing to score.\n");
    } else {
        note.push_str(&format!(
            "- Score: {:.1} ({})\n",
            overview.productivity.overall,
            score_phrase(overview.productivity.overall)
        ));
        if browser.is_some() {
            note.push_str(&format!(
                "- Productive browsing: {:.0}% of visits ({})\n",
                overview.browser_productivity_ratio * 100.0,
                browsing_phrase(overview.browser_productivity_ratio)
            ));
        }
    }

    note.push_str("\n## Insights\n\n");
    for insight in &overview.insights {
        note.push_str(&format!("- {insight}\n"));
    }

    note.push('\n');
    note.push_str("#daily-log");
    for category in overview.top_categories.iter().take(3) {
        note.push_str(&format!(" #{}", category.name));
    }
    note.push('\n');

    note
}

fn source_report(record: &IntegratedDailyRecord, kind: SourceKind) -> Option<&SourceReport> {
    record.per_source_summary.iter().find(|r| r.kind == kind)
}

fn day_period(hour: u8) -> &'static str {
    match hour {
        0..=5 => "night",
        6..=11 => "morning",
        12..=17 => "afternoon",
        _ => "evening",
    }
}

fn score_phrase(score: f64) -> &'static str {
    if score >= 80.0 {
        "highly productive day"
    } else if score >= 60.0 {
        "moderately productive day"
    } else {
        "low productivity day"
    }
}

fn browsing_phrase(ratio: f64) -> &'static str {
    if ratio >= 0.7 {
        "mostly purposeful"
    } else if ratio >= 0.4 {
        "mixed"
    } else {
        "mostly leisure"
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

    use crate::{
        config::ActivityConfig,
        pipeline::{
            categorize::CategorizedEvent,
            event::{ActivityEvent, EventSource},
            integrate::{integrate, SourceData},
            search::SearchHit,
        },
        utils::clock::MockClock,
    };

    use super::*;

    const TEST_DATE: NaiveDate = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();

    fn visit(category: &str, domain: &str, hour: u32) -> CategorizedEvent {
        CategorizedEvent {
            event: ActivityEvent {
                source: EventSource::BrowserVisit,
                identifier: domain.into(),
                display_name: domain.into(),
                occurred_at: Some(Utc.from_utc_datetime(&NaiveDateTime::new(
                    TEST_DATE,
                    NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
                ))),
                duration_minutes: 0.0,
                url: None,
            },
            category: category.into(),
        }
    }

    fn browser_day() -> IntegratedDailyRecord {
        let mut browser = SourceData {
            kind: SourceKind::Browser,
            date: Some(TEST_DATE),
            events: vec![
                visit("developer", "github.com", 9),
                visit("developer", "github.com", 9),
                visit("developer", "docs.python.org", 10),
                visit("entertainment", "youtube.com", 21),
            ],
            skipped_records: 0,
            timestamp_failures: 0,
            searches: Vec::new(),
        };
        browser.searches = vec![SearchHit {
            engine: "google".into(),
            query: "rust lifetimes".into(),
        }];

        integrate(
            &ActivityConfig::default(),
            &MockClock::new(),
            None,
            Some(browser),
            None,
        )
    }

    #[test]
    fn browser_day_renders_tables_and_tags() {
        let record = browser_day();
        let note = render(&record);

        assert!(note.starts_with("# Daily Activity - 2025-03-15\n"));
        assert!(note.contains("| github.com | 2 |"));
        assert!(note.contains("1. rust lifetimes"));
        assert!(note.contains("| developer | 3 | 75.0% |"));
        assert!(note.contains("No application capture contributed to this day."));
        assert!(note.contains("- Peak hour: 09:00 (morning)"));
        assert!(note.contains("- Productive browsing: 75% of visits (mostly purposeful)"));
        assert!(note.contains("#daily-log #developer #entertainment"));
    }

    #[test]
    fn empty_day_still_renders_every_section() {
        let clock_date = Utc.from_utc_datetime(&NaiveDateTime::new(TEST_DATE, NaiveTime::MIN));
        let mut clock = MockClock::new();
        clock.expect_time().return_const(clock_date);

        let record = integrate(&ActivityConfig::default(), &clock, None, None, None);
        let note = render(&record);

        assert!(note.contains("- Data richness: none"));
        assert!(note.contains("No browser capture contributed to this day."));
        assert!(note.contains("No application capture contributed to this day."));
        assert!(note.contains("- No timestamped events."));
        assert!(note.contains("Nothing to score."));
        assert!(note.contains("No activity data was captured for this day."));
        assert!(!note.contains("Overall productivity"));
        assert!(note.ends_with("#daily-log\n"));
    }

    #[test]
    fn period_names_cover_the_clock() {
        assert_eq!(day_period(3), "night");
        assert_eq!(day_period(6), "morning");
        assert_eq!(day_period(12), "afternoon");
        assert_eq!(day_period(18), "evening");
        assert_eq!(day_period(23), "evening");
    }
}
