//! Search engine detection and query extraction. Hosts are matched
//! verbatim against the engine table and the query parameter is pulled
//! straight out of the url, so a malformed url is simply not a search.

use std::sync::Arc;

use crate::config::SearchEngine;

/// A recognized search visit.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub engine: Arc<str>,
    pub query: String,
}

/// Returns the engine and the decoded query for a search url, or nothing
/// when the host is unknown, the parameter is absent, or the query is
/// blank after trimming.
pub fn extract_query(engines: &[SearchEngine], url: &str) -> Option<SearchHit> {
    let host = host_of(url)?.to_lowercase();
    let engine = engines
        .iter()
        .find(|e| e.hosts.iter().any(|h| **h == *host))?;
    let raw = first_query_value(url, &engine.query_param)?;
    let query = decode_value(raw)?;
    let query = query.trim();
    if query.is_empty() {
        return None;
    }
    Some(SearchHit {
        engine: engine.engine.clone(),
        query: query.to_string(),
    })
}

/// Host portion of a url. Requires a scheme, drops userinfo and port.
pub fn host_of(url: &str) -> Option<&str> {
    let (_, rest) = url.split_once("://")?;
    let authority = rest.split(['/', '?', '#']).next().unwrap_or("");
    let host = authority
        .rsplit_once('@')
        .map_or(authority, |(_, host)| host);
    let host = host.split(':').next().unwrap_or(host);
    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}

/// First occurrence of `param` with a non-empty raw value. Later
/// duplicates are not consulted once a value is taken.
fn first_query_value<'a>(url: &'a str, param: &str) -> Option<&'a str> {
    let (_, after) = url.split_once('?')?;
    let query = after.split('#').next().unwrap_or(after);
    for pair in query.split('&') {
        if let Some((key, value)) = pair.split_once('=') {
            if key == param && !value.is_empty() {
                return Some(value);
            }
        }
    }
    None
}

/// `+` means space in query strings and has to be substituted before
/// percent-decoding, or an encoded literal plus would turn into a space.
fn decode_value(value: &str) -> Option<String> {
    let spaced = value.replace('+', " ");
    urlencoding::decode(&spaced).ok().map(|v| v.into_owned())
}

#[cfg(test)]
mod tests {
    use crate::config::ActivityConfig;

    use super::*;

    fn engines() -> Vec<crate::config::SearchEngine> {
        ActivityConfig::default().search_engines
    }

    #[test]
    fn google_query_is_decoded() {
        let hit = extract_query(
            &engines(),
            "https://www.google.com/search?q=python+tutorial",
        )
        .unwrap();
        assert_eq!(&*hit.engine, "google");
        assert_eq!(hit.query, "python tutorial");
    }

    #[test]
    fn percent_escapes_survive_plus_substitution() {
        let hit = extract_query(&engines(), "https://duckduckgo.com/?q=c%2B%2B+lifetimes").unwrap();
        assert_eq!(hit.query, "c++ lifetimes");
    }

    #[test]
    fn recognized_host_without_parameter_is_not_a_search() {
        assert_eq!(extract_query(&engines(), "https://www.google.com/maps"), None);
    }

    #[test]
    fn blank_query_is_not_a_search() {
        assert_eq!(
            extract_query(&engines(), "https://www.google.com/search?q="),
            None
        );
        assert_eq!(
            extract_query(&engines(), "https://www.google.com/search?q=+++"),
            None
        );
    }

    #[test]
    fn first_parameter_occurrence_wins() {
        let hit =
            extract_query(&engines(), "https://www.bing.com/search?q=first&q=second").unwrap();
        assert_eq!(hit.query, "first");
    }

    #[test]
    fn engine_specific_parameters_are_honored() {
        let naver = extract_query(
            &engines(),
            "https://search.naver.com/search.naver?query=%EB%82%A0%EC%94%A8",
        )
        .unwrap();
        assert_eq!(&*naver.engine, "naver");
        assert_eq!(naver.query, "날씨");

        let youtube = extract_query(
            &engines(),
            "https://www.youtube.com/results?search_query=lofi+mix",
        )
        .unwrap();
        assert_eq!(&*youtube.engine, "youtube");
        assert_eq!(youtube.query, "lofi mix");

        assert_eq!(
            extract_query(&engines(), "https://www.youtube.com/results?q=lofi"),
            None
        );
    }

    #[test]
    fn unknown_hosts_and_malformed_urls_are_ignored() {
        assert_eq!(
            extract_query(&engines(), "https://example.com/search?q=rust"),
            None
        );
        assert_eq!(extract_query(&engines(), "www.google.com/search?q=rust"), None);
        assert_eq!(extract_query(&engines(), "not a url at all"), None);
        assert_eq!(extract_query(&engines(), ""), None);
    }

    #[test]
    fn host_extraction_handles_ports_and_userinfo() {
        assert_eq!(host_of("https://user@www.google.com:443/x"), Some("www.google.com"));
        assert_eq!(host_of("https://GOOGLE.com?q=1"), Some("GOOGLE.com"));
        assert_eq!(host_of("https:///path"), None);
        assert_eq!(host_of("no scheme"), None);
    }

    #[test]
    fn host_case_is_ignored_for_engine_match() {
        let hit = extract_query(&engines(), "https://WWW.GOOGLE.COM/search?q=rust").unwrap();
        assert_eq!(&*hit.engine, "google");
    }
}
