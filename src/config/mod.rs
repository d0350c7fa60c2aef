//! Run configuration: the category rule table, the productivity weight
//! table, and the search engine table. Loaded once at startup and treated
//! as read-only afterwards. Every component that needs a table receives
//! this struct explicitly instead of reaching for globals.

use std::{collections::BTreeMap, collections::HashMap, path::Path, sync::Arc};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Category assigned when no rule matches.
pub const FALLBACK_CATEGORY: &str = "other";

/// Weight used for categories the weight table does not list.
pub const DEFAULT_WEIGHT: f64 = 0.5;

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),
    #[error("configuration file is not valid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("rule table is empty")]
    NoRules,
    #[error("rule {index} has an empty category name")]
    EmptyCategory { index: usize },
    #[error("category {category:?} has no productivity weight")]
    MissingWeight { category: Arc<str> },
    #[error("weight {weight} for category {category:?} is outside [0, 1]")]
    WeightOutOfRange { category: Arc<str>, weight: f64 },
    #[error("search engine {engine:?} lists no hosts")]
    EngineWithoutHosts { engine: Arc<str> },
    #[error("search engine {engine:?} has no query parameter")]
    EngineWithoutParam { engine: Arc<str> },
}

/// One categorization rule. Exact identifiers take priority over keywords
/// across the whole table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub category: Arc<str>,
    /// Bundle identifiers and normalized domains matched verbatim.
    #[serde(default)]
    pub exact: Vec<Arc<str>>,
    /// Substrings checked against the lowered display name and url domain.
    /// Stored lowercase; [ActivityConfig::load] lowers them on the way in.
    #[serde(default)]
    pub keywords: Vec<Arc<str>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchEngine {
    pub engine: Arc<str>,
    /// Hosts matched verbatim against the lowered url host, so `www.`
    /// variants are listed explicitly.
    pub hosts: Vec<Arc<str>>,
    /// Query string parameter that carries the search term.
    pub query_param: Arc<str>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityConfig {
    /// Consulted in declaration order. The first matching rule wins.
    pub rules: Vec<CategoryRule>,
    pub weights: BTreeMap<Arc<str>, f64>,
    pub search_engines: Vec<SearchEngine>,
}

impl ActivityConfig {
    /// Reads a configuration file, replacing the built-in tables entirely.
    pub fn load(path: &Path) -> Result<Self, ConfigurationError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: ActivityConfig = serde_json::from_str(&content)?;
        for rule in &mut config.rules {
            for keyword in &mut rule.keywords {
                if keyword.chars().any(char::is_uppercase) {
                    *keyword = keyword.to_lowercase().into();
                }
            }
        }
        config.validate()?;
        Ok(config)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigurationError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Structural checks that would make a run ill-defined. Failing here
    /// aborts before any record is processed.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.rules.is_empty() {
            return Err(ConfigurationError::NoRules);
        }
        for (index, rule) in self.rules.iter().enumerate() {
            if rule.category.is_empty() {
                return Err(ConfigurationError::EmptyCategory { index });
            }
            if !self.weights.contains_key(&*rule.category) {
                return Err(ConfigurationError::MissingWeight {
                    category: rule.category.clone(),
                });
            }
        }
        if !self.weights.contains_key(FALLBACK_CATEGORY) {
            return Err(ConfigurationError::MissingWeight {
                category: FALLBACK_CATEGORY.into(),
            });
        }
        for (category, &weight) in &self.weights {
            if !(0.0..=1.0).contains(&weight) {
                return Err(ConfigurationError::WeightOutOfRange {
                    category: category.clone(),
                    weight,
                });
            }
        }
        for engine in &self.search_engines {
            if engine.hosts.is_empty() {
                return Err(ConfigurationError::EngineWithoutHosts {
                    engine: engine.engine.clone(),
                });
            }
            if engine.query_param.is_empty() {
                return Err(ConfigurationError::EngineWithoutParam {
                    engine: engine.engine.clone(),
                });
            }
        }

        // Duplicated identifiers are resolved by table order, which is easy
        // to get wrong in a hand-edited file.
        let mut seen = HashMap::<&str, &str>::new();
        for rule in &self.rules {
            for id in &rule.exact {
                if let Some(first) = seen.get(&**id) {
                    warn!(
                        "identifier {id:?} appears under both {first:?} and {:?}, {first:?} wins",
                        rule.category
                    );
                } else {
                    seen.insert(&**id, &*rule.category);
                }
            }
        }
        Ok(())
    }

    /// Productivity weight for a category.
    pub fn weight_for(&self, category: &str) -> f64 {
        self.weights
            .get(category)
            .copied()
            .unwrap_or(DEFAULT_WEIGHT)
    }
}

fn rule(category: &str, exact: &[&str], keywords: &[&str]) -> CategoryRule {
    CategoryRule {
        category: category.into(),
        exact: exact.iter().map(|v| Arc::from(*v)).collect(),
        keywords: keywords.iter().map(|v| Arc::from(*v)).collect(),
    }
}

fn engine(engine: &str, hosts: &[&str], query_param: &str) -> SearchEngine {
    SearchEngine {
        engine: engine.into(),
        hosts: hosts.iter().map(|v| Arc::from(*v)).collect(),
        query_param: query_param.into(),
    }
}

impl Default for ActivityConfig {
    fn default() -> Self {
        let rules = vec![
            rule(
                "developer",
                &[
                    "com.microsoft.VSCode",
                    "com.apple.dt.Xcode",
                    "com.jetbrains.pycharm",
                    "com.sublimetext.3",
                    "com.github.atom",
                    "com.apple.Terminal",
                    "com.iterm2",
                    "com.docker.docker",
                    "com.postmanlabs.mac",
                    "com.jetbrains.intellij",
                    "com.jetbrains.webstorm",
                    "com.vim",
                    "com.sourcetreeapp.mac",
                    "com.git-tower.mac",
                    "com.panic.nova",
                    "com.github.GitHubClient",
                    "org.tabby",
                    "github.com",
                    "stackoverflow.com",
                    "medium.com",
                    "dev.to",
                    "docs.python.org",
                    "developer.mozilla.org",
                    "aws.amazon.com",
                    "docker.com",
                    "kubernetes.io",
                    "golang.org",
                    "nodejs.org",
                    "reactjs.org",
                    "vuejs.org",
                    "angular.io",
                    "tensorflow.org",
                ],
                &[
                    "code",
                    "terminal",
                    "git",
                    "docker",
                    "vim",
                    "emacs",
                    "studio",
                    "xcode",
                    "tabby",
                    "github",
                    "api",
                    "documentation",
                    "developer",
                    "programming",
                ],
            ),
            rule(
                "browser",
                &[
                    "com.google.Chrome",
                    "com.apple.Safari",
                    "org.mozilla.firefox",
                    "com.microsoft.edgemac",
                    "com.operasoftware.Opera",
                    "com.brave.Browser",
                ],
                &["chrome", "safari", "firefox", "edge", "opera", "brave"],
            ),
            rule(
                "productivity",
                &[
                    "com.microsoft.Word",
                    "com.microsoft.Excel",
                    "com.microsoft.PowerPoint",
                    "com.apple.Pages",
                    "com.apple.Numbers",
                    "com.apple.Keynote",
                    "com.notion.id",
                    "com.evernote.Evernote",
                    "com.bear-writer.BearMarkdown",
                    "com.culturedcode.ThingsMac",
                    "com.omnigroup.OmniFocus3",
                    "com.readdle.smartemail-Mac",
                    "com.microsoft.Outlook",
                    "md.obsidian",
                    "com.anthropic.claudefordesktop",
                ],
                &[
                    "word", "excel", "powerpoint", "pages", "numbers", "keynote", "notion",
                    "bear", "obsidian", "claude",
                ],
            ),
            rule(
                "communication",
                &[
                    "com.apple.MobileSMS",
                    "com.discord",
                    "com.slack.desktop",
                    "us.zoom.xos",
                    "com.microsoft.teams",
                    "com.skype.skype",
                    "com.telegram.desktop",
                    "org.whispersystems.signal-desktop",
                    "com.apple.FaceTime",
                    "com.apple.Mail",
                    "com.jandi.osx.JANDI",
                    "com.kakao.KakaoTalkMac",
                ],
                &[
                    "slack", "discord", "zoom", "teams", "skype", "telegram", "signal",
                    "facetime", "jandi", "kakaotalk",
                ],
            ),
            rule(
                "entertainment",
                &[
                    "com.spotify.client",
                    "com.apple.Music",
                    "com.apple.TV",
                    "com.netflix.Netflix",
                    "com.youtube.desktop",
                    "com.apple.QuickTimePlayerX",
                    "com.vlc.vlc",
                    "com.adobe.Photoshop",
                    "com.adobe.Illustrator",
                    "com.apple.Photos",
                    "com.figma.Desktop",
                    "netflix.com",
                    "youtube.com",
                    "twitch.tv",
                    "spotify.com",
                    "disney.com",
                    "hulu.com",
                    "prime.amazon.com",
                    "wavve.com",
                    "watcha.com",
                    "tving.com",
                    "melon.com",
                    "genie.co.kr",
                ],
                &[
                    "spotify",
                    "netflix",
                    "youtube",
                    "vlc",
                    "photoshop",
                    "figma",
                    "streaming",
                    "video",
                    "music",
                    "entertainment",
                    "movie",
                ],
            ),
            rule(
                "system",
                &[
                    "com.apple.finder",
                    "com.apple.ActivityMonitor",
                    "com.apple.Console",
                    "com.apple.systempreferences",
                    "com.apple.calculator",
                    "com.apple.TextEdit",
                    "com.apple.Preview",
                    "com.apple.Automator",
                    "com.apple.ScriptEditor",
                ],
                &[
                    "finder",
                    "activity",
                    "console",
                    "preferences",
                    "calculator",
                    "textedit",
                ],
            ),
            rule(
                "gaming",
                &[
                    "com.valvesoftware.steam",
                    "com.epicgames.launcher",
                    "com.blizzard.app",
                    "com.riotgames.Riot Client",
                    "com.apple.gamecenter",
                ],
                &["steam", "epic", "blizzard", "riot", "game"],
            ),
            rule(
                "social",
                &[
                    "facebook.com",
                    "twitter.com",
                    "instagram.com",
                    "linkedin.com",
                    "discord.com",
                    "reddit.com",
                    "tiktok.com",
                    "snapchat.com",
                    "pinterest.com",
                    "tumblr.com",
                    "kakao.com",
                    "band.us",
                    "cafe.naver.com",
                ],
                &["social", "community", "chat", "message"],
            ),
            rule(
                "work",
                &[
                    "slack.com",
                    "notion.so",
                    "trello.com",
                    "asana.com",
                    "teams.microsoft.com",
                    "zoom.us",
                    "meet.google.com",
                    "confluence.atlassian.com",
                    "jira.atlassian.com",
                    "monday.com",
                    "clickup.com",
                    "basecamp.com",
                    "office.com",
                    "sharepoint.com",
                    "dropbox.com",
                    "drive.google.com",
                    "onedrive.com",
                ],
                &["work", "office", "team", "project", "meeting"],
            ),
            rule(
                "news",
                &[
                    "naver.com",
                    "daum.net",
                    "hani.co.kr",
                    "chosun.com",
                    "joins.com",
                    "cnn.com",
                    "bbc.com",
                    "reuters.com",
                    "news.google.com",
                    "news.yahoo.com",
                    "yna.co.kr",
                    "sbs.co.kr",
                    "kbs.co.kr",
                    "mbc.co.kr",
                    "jtbc.co.kr",
                    "newspim.com",
                    "mt.co.kr",
                    "mk.co.kr",
                ],
                &["news", "breaking", "report", "article"],
            ),
            rule(
                "shopping",
                &[
                    "amazon.com",
                    "coupang.com",
                    "gmarket.co.kr",
                    "auction.co.kr",
                    "ebay.com",
                    "11st.co.kr",
                    "interpark.com",
                    "yes24.com",
                    "aladin.co.kr",
                    "kyobobook.co.kr",
                    "lotte.com",
                    "shinsegae.com",
                ],
                &["shop", "buy", "cart", "order", "product"],
            ),
            rule(
                "education",
                &[
                    "coursera.org",
                    "udemy.com",
                    "khan.org",
                    "edx.org",
                    "wikipedia.org",
                    "w3schools.com",
                    "codecademy.com",
                    "pluralsight.com",
                    "hackerrank.com",
                    "leetcode.com",
                    "programmers.co.kr",
                    "acmicpc.net",
                ],
                &["learn", "course", "tutorial", "education", "study"],
            ),
            rule(
                "finance",
                &[
                    "investing.com",
                    "finance.yahoo.com",
                    "bloomberg.com",
                    "kb.co.kr",
                    "shinhan.com",
                    "wooribank.com",
                    "hanabank.com",
                    "nhbank.com",
                    "kisbank.com",
                    "krx.co.kr",
                ],
                &["finance", "bank", "investment", "stock", "money"],
            ),
            rule(
                "travel",
                &[
                    "booking.com",
                    "expedia.com",
                    "airbnb.com",
                    "agoda.com",
                    "yanolja.com",
                    "goodchoice.kr",
                    "hanatour.com",
                    "modetour.com",
                    "koreatravelpost.com",
                ],
                &["travel", "hotel", "flight", "booking", "trip"],
            ),
            rule(
                "health",
                &[
                    "webmd.com",
                    "mayoclinic.org",
                    "healthline.com",
                    "amc.seoul.kr",
                    "severance.or.kr",
                    "snuh.org",
                ],
                &["health", "medical", "hospital", "doctor", "medicine"],
            ),
        ];

        let weights = [
            ("developer", 1.0),
            ("productivity", 0.9),
            ("communication", 0.7),
            ("browser", 0.5),
            ("entertainment", 0.1),
            ("gaming", 0.0),
            ("system", 0.3),
            ("social", 0.2),
            ("work", 0.9),
            ("news", 0.4),
            ("shopping", 0.2),
            ("education", 0.9),
            ("finance", 0.6),
            ("travel", 0.3),
            ("health", 0.6),
            (FALLBACK_CATEGORY, DEFAULT_WEIGHT),
        ]
        .into_iter()
        .map(|(category, weight)| (Arc::from(category), weight))
        .collect();

        let search_engines = vec![
            engine(
                "google",
                &["www.google.com", "google.com", "google.co.kr"],
                "q",
            ),
            engine("naver", &["search.naver.com"], "query"),
            engine(
                "youtube",
                &["www.youtube.com", "youtube.com"],
                "search_query",
            ),
            engine("bing", &["www.bing.com", "bing.com"], "q"),
            engine("duckduckgo", &["duckduckgo.com"], "q"),
            engine("yahoo", &["search.yahoo.com"], "p"),
            engine("baidu", &["www.baidu.com"], "wd"),
        ];

        ActivityConfig {
            rules,
            weights,
            search_engines,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn default_tables_are_valid() {
        let config = ActivityConfig::default();
        config.validate().unwrap();
    }

    #[test]
    fn rule_category_without_weight_is_fatal() {
        let mut config = ActivityConfig::default();
        config.rules.push(rule("reading", &["goodreads.com"], &[]));
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::MissingWeight { category }) if &*category == "reading"
        ));
    }

    #[test]
    fn missing_fallback_weight_is_fatal() {
        let mut config = ActivityConfig::default();
        config.weights.remove(FALLBACK_CATEGORY);
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::MissingWeight { category }) if &*category == FALLBACK_CATEGORY
        ));
    }

    #[test]
    fn weight_outside_unit_interval_is_fatal() {
        let mut config = ActivityConfig::default();
        config.weights.insert("developer".into(), 1.4);
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::WeightOutOfRange { weight, .. }) if weight == 1.4
        ));
    }

    #[test]
    fn duplicate_exact_identifiers_only_warn() {
        let mut config = ActivityConfig::default();
        config.rules[1].exact.push("github.com".into());
        config.validate().unwrap();
    }

    #[test]
    fn load_accepts_a_minimal_file_and_lowers_keywords() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "rules": [
                    {{"category": "developer", "exact": ["github.com"], "keywords": ["GitHub"]}}
                ],
                "weights": {{"developer": 1.0, "other": 0.5}},
                "search_engines": []
            }}"#
        )
        .unwrap();

        let config = ActivityConfig::load(file.path()).unwrap();
        assert_eq!(&*config.rules[0].keywords[0], "github");
        assert_eq!(config.weight_for("developer"), 1.0);
        assert_eq!(config.weight_for("unlisted"), DEFAULT_WEIGHT);
    }

    #[test]
    fn load_rejects_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            ActivityConfig::load(file.path()),
            Err(ConfigurationError::Json(_))
        ));
    }
}
