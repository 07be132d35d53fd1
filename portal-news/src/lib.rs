//! News panel backing the portal's start page.
//!
//! `hn` talks to the Hacker News API; [`NewsFeed`] is the state a front end
//! renders, holding either the latest stories or a user-facing error line.
pub mod hn;

pub use hn::{NewsClient, Story};

use portal_http::HttpError;
use serde::Serialize;

/// Shown in place of the feed when a refresh fails.
pub const LOAD_FAILED_MESSAGE: &str = "Unable to load news. Please try again later.";

#[derive(Debug, thiserror::Error)]
pub enum NewsError {
    #[error("news request failed: {0}")]
    Http(#[from] HttpError),
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NewsFeed {
    pub stories: Vec<Story>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NewsFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the feed with a fresh fetch. On failure the list is emptied
    /// and [`LOAD_FAILED_MESSAGE`] recorded.
    pub async fn refresh(&mut self, client: &NewsClient) {
        match client.top_stories().await {
            Ok(stories) => {
                self.stories = stories;
                self.error = None;
            }
            Err(err) => {
                tracing::warn!(error=%err, "news.refresh_failed");
                self.stories.clear();
                self.error = Some(LOAD_FAILED_MESSAGE.to_string());
            }
        }
    }
}
