//! Plain-text views for terminal output. `--json` bypasses these entirely.
use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use portal_news::NewsFeed;
use portal_search::{CredentialUsage, SearchResult};
use portal_shortcuts::Shortcut;

pub fn results(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return "no results\n".to_string();
    }
    let mut out = String::new();
    for (i, r) in results.iter().enumerate() {
        let _ = writeln!(out, "{:>2}. {}", i + 1, r.title);
        let _ = writeln!(out, "    {}", r.link);
        if !r.snippet.is_empty() {
            let _ = writeln!(out, "    {}", r.snippet.replace('\n', " "));
        }
    }
    out
}

pub fn suggestions(items: &[String]) -> String {
    items.iter().map(|s| format!("{s}\n")).collect()
}

fn age(posted: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - posted).num_seconds().max(0);
    match secs {
        0..=59 => "just now".to_string(),
        60..=3599 => format!("{}m ago", secs / 60),
        3600..=86_399 => format!("{}h ago", secs / 3600),
        _ => format!("{}d ago", secs / 86_400),
    }
}

pub fn news(feed: &NewsFeed, now: DateTime<Utc>) -> String {
    if let Some(err) = &feed.error {
        return format!("{err}\n");
    }
    let mut out = String::new();
    for (i, story) in feed.stories.iter().enumerate() {
        let when = story.posted_at().map(|t| age(t, now)).unwrap_or_default();
        let by = story.by.as_deref().unwrap_or("unknown");
        let _ = writeln!(out, "{:>2}. {}", i + 1, story.title);
        let _ = writeln!(out, "    {} points by {by} {when}", story.score);
        let _ = writeln!(out, "    {}", story.url);
    }
    out
}

pub fn usage(usage: &[CredentialUsage], cap: u32) -> String {
    if usage.is_empty() {
        return "no search credentials configured\n".to_string();
    }
    let mut out = String::new();
    for u in usage {
        let flag = if u.exhausted { "  exhausted" } else { "" };
        let _ = writeln!(
            out,
            "#{} {:<24} {:>3}/{cap} on {}{flag}",
            u.index + 1,
            u.engine_id,
            u.request_count,
            u.last_reset_date
        );
    }
    out
}

pub fn shortcuts(list: &[Shortcut]) -> String {
    let mut out = String::new();
    for (i, s) in list.iter().enumerate() {
        let _ = writeln!(out, "[{i}] {}  {:<12} {}", s.shortcut_key, s.name, s.url);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, TimeZone};
    use portal_news::Story;

    #[test]
    fn empty_results_say_so() {
        assert_eq!(results(&[]), "no results\n");
    }

    #[test]
    fn news_shows_error_line_instead_of_stories() {
        let feed = NewsFeed {
            stories: Vec::new(),
            error: Some(portal_news::LOAD_FAILED_MESSAGE.to_string()),
        };
        assert_eq!(
            news(&feed, Utc::now()),
            "Unable to load news. Please try again later.\n"
        );
    }

    #[test]
    fn news_lines_carry_age() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();
        let feed = NewsFeed {
            stories: vec![Story {
                id: 1,
                title: "Rust 2.0".into(),
                url: "https://blog.example/rust".into(),
                score: 42,
                time: (now - Duration::hours(3)).timestamp(),
                by: Some("ferris".into()),
            }],
            error: None,
        };
        let text = news(&feed, now);
        assert!(text.contains("42 points by ferris 3h ago"));
    }

    #[test]
    fn usage_marks_exhausted_credentials() {
        let text = usage(
            &[CredentialUsage {
                index: 0,
                engine_id: "cx1".into(),
                request_count: 101,
                last_reset_date: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
                exhausted: true,
            }],
            99,
        );
        assert!(text.contains("101/99"));
        assert!(text.ends_with("exhausted\n"));
    }
}
