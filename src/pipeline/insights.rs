//! Short observations derived from the combined overview. Rules run in a
//! fixed order so two runs over the same data print the same list.

use crate::pipeline::integrate::{CombinedOverview, DataRichness};

const EARLY_PEAK_HOUR: u8 = 6;
const LOW_CATEGORY_SPREAD: usize = 3;
const HEAVY_SEARCH_COUNT: u64 = 20;
const DOMINANT_SHARE_PERCENT: f64 = 30.0;

pub fn generate(overview: &CombinedOverview, richness: DataRichness) -> Vec<String> {
    if richness == DataRichness::None {
        return vec![
            "No activity data was captured for this day. Run the collectors and fold again."
                .to_string(),
        ];
    }

    let mut insights = Vec::new();

    if let Some(peak) = overview.peak_hour {
        if peak < EARLY_PEAK_HOUR {
            insights.push(format!(
                "Peak activity landed at {peak:02}:00. Earlier nights might serve you better."
            ));
        }
    }

    if overview.top_categories.len() < LOW_CATEGORY_SPREAD {
        insights.push(
            "Activity spread across fewer than three categories. Consider mixing in some variety."
                .to_string(),
        );
    }

    if overview.search_count > HEAVY_SEARCH_COUNT {
        insights.push(format!(
            "{} searches today. Worth folding the findings into notes.",
            overview.search_count
        ));
    }

    if overview.total_events > 0 {
        if let Some(dominant) = overview.top_categories.first() {
            let share = dominant.count as f64 / overview.total_events as f64 * 100.0;
            if share > DOMINANT_SHARE_PERCENT {
                insights.push(format!(
                    "{} made up {share:.0}% of the day's activity.",
                    dominant.name
                ));
            }
        }
    }

    let overall = overview.productivity.overall;
    insights.push(
        if overall >= 80.0 {
            "Excellent productivity today."
        } else if overall >= 60.0 {
            "A productive day overall."
        } else if overall >= 40.0 {
            "Moderately productive day."
        } else {
            "Productivity ran low today."
        }
        .to_string(),
    );

    insights
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::pipeline::stats::{ProductivityScore, RankedCount};

    use super::*;

    fn overview() -> CombinedOverview {
        CombinedOverview {
            total_events: 0,
            total_minutes: 0.0,
            top_categories: Vec::new(),
            top_domains: Vec::new(),
            top_searches: Vec::new(),
            search_count: 0,
            peak_hour: None,
            browser_productivity_ratio: 0.0,
            productivity: ProductivityScore {
                instantaneous: 0.0,
                historical: 0.0,
                overall: 0.0,
                weights_used: BTreeMap::new(),
            },
            insights: Vec::new(),
        }
    }

    fn ranked(name: &str, count: u64) -> RankedCount {
        RankedCount {
            name: name.into(),
            count,
        }
    }

    #[test]
    fn missing_data_short_circuits_everything_else() {
        let insights = generate(&overview(), DataRichness::None);
        assert_eq!(insights.len(), 1);
        assert_eq!(
            insights[0],
            "No activity data was captured for this day. Run the collectors and fold again."
        );
    }

    #[test]
    fn every_rule_fires_in_declaration_order() {
        let mut overview = overview();
        overview.total_events = 10;
        overview.top_categories = vec![ranked("developer", 8), ranked("news", 2)];
        overview.search_count = 25;
        overview.peak_hour = Some(3);
        overview.productivity.overall = 85.0;

        let insights = generate(&overview, DataRichness::High);
        assert_eq!(
            insights,
            vec![
                "Peak activity landed at 03:00. Earlier nights might serve you better.",
                "Activity spread across fewer than three categories. Consider mixing in some variety.",
                "25 searches today. Worth folding the findings into notes.",
                "developer made up 80% of the day's activity.",
                "Excellent productivity today.",
            ]
        );
    }

    #[test]
    fn thresholds_are_exclusive_at_the_boundary() {
        let mut overview = overview();
        overview.total_events = 10;
        overview.top_categories = vec![
            ranked("developer", 3),
            ranked("news", 3),
            ranked("social", 3),
            ranked("other", 1),
        ];
        overview.search_count = 20;
        overview.peak_hour = Some(6);
        overview.productivity.overall = 59.9;

        let insights = generate(&overview, DataRichness::Medium);
        // A 30% share, hour six, and twenty searches all sit on the quiet
        // side of their thresholds.
        assert_eq!(insights, vec!["Moderately productive day.".to_string()]);
    }

    #[test]
    fn productivity_bands_cover_the_scale() {
        let cases = [
            (85.0, "Excellent productivity today."),
            (60.0, "A productive day overall."),
            (40.0, "Moderately productive day."),
            (12.5, "Productivity ran low today."),
        ];
        for (overall, expected) in cases {
            let mut overview = overview();
            overview.total_events = 1;
            overview.top_categories = vec![
                ranked("developer", 1),
                ranked("news", 1),
                ranked("social", 1),
            ];
            overview.productivity.overall = overall;
            let insights = generate(&overview, DataRichness::Medium);
            assert_eq!(insights.last().unwrap(), expected);
        }
    }

    #[test]
    fn no_rule_emits_an_empty_string() {
        let mut overview = overview();
        overview.total_events = 4;
        overview.top_categories = vec![ranked("other", 4)];
        overview.peak_hour = Some(2);
        overview.search_count = 40;

        let insights = generate(&overview, DataRichness::Medium);
        assert!(insights.iter().all(|i| !i.is_empty()));
    }
}
