//! Two-step front page fetch: the ranked id list, then every item in
//! parallel.
use futures::future::try_join_all;
use portal_http::{HttpClient, RequestOpts};

use crate::NewsError;
use crate::hn::types::{Item, Story};

pub const DEFAULT_STORY_LIMIT: usize = 20;

#[derive(Clone)]
pub struct NewsClient {
    http: HttpClient,
    limit: usize,
}

impl NewsClient {
    /// `http` must be anchored at the API root with a trailing slash
    /// (`https://hacker-news.firebaseio.com/v0/`).
    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            limit: DEFAULT_STORY_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Top stories in ranking order. Any failed request fails the whole fetch.
    pub async fn top_stories(&self) -> Result<Vec<Story>, NewsError> {
        let mut ids: Vec<u64> = self
            .http
            .get_json("topstories.json", RequestOpts::default())
            .await?;
        ids.truncate(self.limit);
        tracing::debug!(count = ids.len(), "news.top_ids");

        let http = &self.http;
        let items = try_join_all(ids.iter().map(|id| async move {
            let path = format!("item/{id}.json");
            http.get_json::<Option<Item>>(&path, RequestOpts::default())
                .await
        }))
        .await?;

        let stories: Vec<Story> = items
            .into_iter()
            .flatten()
            .filter_map(Item::into_story)
            .collect();
        tracing::info!(fetched = ids.len(), kept = stories.len(), "news.top_stories");
        Ok(stories)
    }
}
