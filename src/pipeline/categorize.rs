//! Rule-driven event categorization. Rules run in their declared order;
//! an exact identifier match anywhere beats every keyword match.

use std::sync::Arc;

use crate::{
    config::{ActivityConfig, FALLBACK_CATEGORY},
    pipeline::{event::ActivityEvent, search},
};

/// An event annotated with the category its subject resolved to.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorizedEvent {
    pub event: ActivityEvent,
    pub category: Arc<str>,
}

/// Resolves a category for one subject. Exact identifiers are compared
/// case-sensitively across every rule first, then keywords are matched
/// case-insensitively against the display name and the url host.
pub fn categorize(
    config: &ActivityConfig,
    identifier: &str,
    display_name: &str,
    url: Option<&str>,
) -> Arc<str> {
    if !identifier.is_empty() {
        for rule in &config.rules {
            if rule.exact.iter().any(|id| &**id == identifier) {
                return rule.category.clone();
            }
        }
    }

    let name = display_name.to_lowercase();
    let domain = url
        .and_then(search::host_of)
        .map(|host| host.to_lowercase());
    for rule in &config.rules {
        let hit = rule.keywords.iter().any(|keyword| {
            name.contains(&**keyword)
                || domain.as_deref().is_some_and(|d| d.contains(&**keyword))
        });
        if hit {
            return rule.category.clone();
        }
    }

    Arc::from(FALLBACK_CATEGORY)
}

pub fn categorize_event(config: &ActivityConfig, event: ActivityEvent) -> CategorizedEvent {
    let category = categorize(
        config,
        &event.identifier,
        &event.display_name,
        event.url.as_deref(),
    );
    CategorizedEvent { event, category }
}

pub fn categorize_all(
    config: &ActivityConfig,
    events: Vec<ActivityEvent>,
) -> Vec<CategorizedEvent> {
    events
        .into_iter()
        .map(|event| categorize_event(config, event))
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::config::{ActivityConfig, CategoryRule};

    use super::*;

    fn config_of(rules: Vec<CategoryRule>) -> ActivityConfig {
        ActivityConfig {
            rules,
            ..ActivityConfig::default()
        }
    }

    fn rule(category: &str, exact: &[&str], keywords: &[&str]) -> CategoryRule {
        CategoryRule {
            category: category.into(),
            exact: exact.iter().map(|v| (*v).into()).collect(),
            keywords: keywords.iter().map(|v| (*v).into()).collect(),
        }
    }

    #[test]
    fn exact_identifier_beats_keywords_of_earlier_rules() {
        let config = config_of(vec![
            rule("developer", &[], &["code"]),
            rule("browser", &["com.google.Chrome"], &[]),
        ]);

        // "code" appears in the name, but the identifier pins the browser rule.
        let category = categorize(&config, "com.google.Chrome", "Chrome - vs code docs", None);
        assert_eq!(&*category, "browser");
    }

    #[test]
    fn first_declared_rule_wins_keyword_ties() {
        let config = config_of(vec![
            rule("work", &[], &["mail"]),
            rule("communication", &[], &["mail"]),
        ]);

        let category = categorize(&config, "com.example.app", "Mail", None);
        assert_eq!(&*category, "work");
    }

    #[test]
    fn keywords_match_the_url_host_but_not_its_path() {
        let config = config_of(vec![rule("developer", &[], &["github"])]);

        let by_host = categorize(&config, "", "", Some("https://github.com/rust-lang"));
        assert_eq!(&*by_host, "developer");

        let by_path = categorize(&config, "", "", Some("https://example.com/github"));
        assert_eq!(&*by_path, "other");
    }

    #[test]
    fn keyword_matching_ignores_name_case() {
        let config = config_of(vec![rule("developer", &[], &["terminal"])]);
        let category = categorize(&config, "org.example.term", "TERMINAL Pro", None);
        assert_eq!(&*category, "developer");
    }

    #[test]
    fn unmatched_subjects_land_in_the_fallback() {
        let config = ActivityConfig::default();
        assert_eq!(&*categorize(&config, "", "", None), FALLBACK_CATEGORY);
        assert_eq!(
            &*categorize(&config, "com.unknown.thing", "Mystery", None),
            FALLBACK_CATEGORY
        );
    }

    #[test]
    fn default_tables_route_common_subjects() {
        let config = ActivityConfig::default();
        assert_eq!(
            &*categorize(&config, "com.microsoft.VSCode", "Visual Studio Code", None),
            "developer"
        );
        assert_eq!(
            &*categorize(&config, "com.google.Chrome", "Google Chrome", None),
            "browser"
        );
        assert_eq!(
            &*categorize(&config, "youtube.com", "cat videos", Some("https://www.youtube.com/watch")),
            "entertainment"
        );
    }

    #[test]
    fn repeated_calls_agree() {
        let config = ActivityConfig::default();
        let first = categorize(&config, "", "Slack", None);
        let second = categorize(&config, "", "Slack", None);
        assert_eq!(first, second);
    }
}
