//! Autocomplete suggestions.
//!
//! One GET per call against the public suggestion endpoint, bounded by a
//! timeout. Every failure mode (transport error, bad status, malformed
//! payload, timeout) resolves to an empty list; callers never see an error.
use std::sync::LazyLock;
use std::time::Duration;

use portal_http::{HttpClient, RequestOpts};
use regex::Regex;
use serde_json::Value;
use tracing::debug;

pub const DEFAULT_SUGGEST_TIMEOUT: Duration = Duration::from_secs(3);
pub const DEFAULT_MAX_QUERY_LEN: usize = 50;
pub const DEFAULT_SUGGEST_CLIENT: &str = "firefox";

// Some clients still get `callback([...])` back instead of bare JSON.
static CALLBACK_WRAPPER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[A-Za-z_$][\w$.]*\s*\(([\s\S]*)\)\s*;?\s*$").expect("valid wrapper regex")
});

/// Whether typed input is worth a suggestion round-trip: at least two
/// characters and no more than three words.
pub fn wants_suggestions(input: &str) -> bool {
    input.chars().count() >= 2 && input.split_whitespace().count() <= 3
}

/// Extract suggestion strings from a provider body shaped like
/// `[query, [s1, s2, ...], ...]`, optionally wrapped in a callback call.
pub fn parse_suggestions(body: &str) -> Vec<String> {
    let json = CALLBACK_WRAPPER
        .captures(body)
        .and_then(|c| c.get(1))
        .map_or(body, |m| m.as_str());

    let Ok(Value::Array(mut outer)) = serde_json::from_str::<Value>(json) else {
        return Vec::new();
    };
    if outer.len() < 2 {
        return Vec::new();
    }
    let Value::Array(items) = outer.swap_remove(1) else {
        return Vec::new();
    };
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) if !s.is_empty() => Some(s),
            _ => None,
        })
        .collect()
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[derive(Clone)]
pub struct SuggestionFetcher {
    http: HttpClient,
    client: String,
    timeout: Duration,
    max_query_len: usize,
}

impl SuggestionFetcher {
    /// `http` must be anchored at the suggestion endpoint.
    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            client: DEFAULT_SUGGEST_CLIENT.to_string(),
            timeout: DEFAULT_SUGGEST_TIMEOUT,
            max_query_len: DEFAULT_MAX_QUERY_LEN,
        }
    }

    pub fn with_client(mut self, client: impl Into<String>) -> Self {
        self.client = client.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_query_len(mut self, max: usize) -> Self {
        self.max_query_len = max.max(1);
        self
    }

    /// Suggestions for `partial`; empty input returns immediately without a
    /// request.
    pub async fn get_suggestions(&self, partial: &str) -> Vec<String> {
        let cleaned = partial.trim();
        if cleaned.is_empty() {
            return Vec::new();
        }
        let query = truncate_chars(cleaned, self.max_query_len);

        let request = self.http.get_text(
            "",
            RequestOpts {
                query: Some(vec![("client", self.client.as_str().into()), ("q", query.into())]),
                ..Default::default()
            },
        );

        match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(body)) => {
                let suggestions = parse_suggestions(&body);
                debug!(query, count = suggestions.len(), "suggest.done");
                suggestions
            }
            Ok(Err(err)) => {
                debug!(query, error=%err, "suggest.failed");
                Vec::new()
            }
            Err(_) => {
                debug!(query, timeout_ms = self.timeout.as_millis() as u64, "suggest.timeout");
                Vec::new()
            }
        }
    }

    /// Callback flavour of [`get_suggestions`](Self::get_suggestions):
    /// `on_result` runs exactly once with whatever the first finishing path
    /// produced.
    pub async fn get_suggestions_then<F>(&self, partial: &str, on_result: F)
    where
        F: FnOnce(Vec<String>),
    {
        on_result(self.get_suggestions(partial).await);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_json_payload() {
        let body = r#"["rus",["rust","rust lang","",42,"russia"],[],{}]"#;
        assert_eq!(parse_suggestions(body), vec!["rust", "rust lang", "russia"]);
    }

    #[test]
    fn unwraps_callback_payload() {
        let body = r#"window.google.ac.h(["rus",["rust","rustup"],{"k":1}]);"#;
        assert_eq!(parse_suggestions(body), vec!["rust", "rustup"]);
        let named = "suggestCallback_17([\"a\",[\"ab\"]])";
        assert_eq!(parse_suggestions(named), vec!["ab"]);
    }

    #[test]
    fn malformed_payloads_are_empty() {
        assert!(parse_suggestions("").is_empty());
        assert!(parse_suggestions("{}").is_empty());
        assert!(parse_suggestions(r#"["only"]"#).is_empty());
        assert!(parse_suggestions(r#"["q","not an array"]"#).is_empty());
        assert!(parse_suggestions("<html>oops</html>").is_empty());
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn suggestion_policy_matches_typing_rules() {
        assert!(!wants_suggestions("r"));
        assert!(wants_suggestions("ru"));
        assert!(wants_suggestions("how to rust"));
        assert!(!wants_suggestions("how to learn rust"));
    }
}
