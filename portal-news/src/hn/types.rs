use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw item from `item/<id>.json`. Jobs, polls and comments share the shape;
/// only entries with a `url` become stories.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Item {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub score: Option<u64>,
    #[serde(default)]
    pub time: Option<i64>,
    #[serde(default)]
    pub by: Option<String>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub dead: bool,
}

/// A linkable front-page story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    pub id: u64,
    pub title: String,
    pub url: String,
    pub score: u64,
    /// Unix seconds.
    pub time: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by: Option<String>,
}

impl Story {
    pub fn posted_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.time, 0)
    }
}

impl Item {
    /// `None` for removed items and anything without an outbound link.
    pub fn into_story(self) -> Option<Story> {
        if self.deleted || self.dead {
            return None;
        }
        let url = self.url.filter(|u| !u.trim().is_empty())?;
        Some(Story {
            id: self.id,
            title: self.title.unwrap_or_default(),
            url,
            score: self.score.unwrap_or(0),
            time: self.time.unwrap_or(0),
            by: self.by,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn items_without_links_are_not_stories() {
        let ask: Item = serde_json::from_str(
            r#"{"id":1,"type":"story","title":"Ask HN: anything?","score":3,"time":1700000000}"#,
        )
        .unwrap();
        assert!(ask.into_story().is_none());

        let dead: Item =
            serde_json::from_str(r#"{"id":2,"url":"https://x.example","dead":true}"#).unwrap();
        assert!(dead.into_story().is_none());
    }

    #[test]
    fn story_fields_carry_over() {
        let item: Item = serde_json::from_str(
            r#"{"id":8863,"by":"dhouston","score":104,"time":1175714200,
                "title":"My YC app","type":"story","url":"http://www.getdropbox.com/u/2/screencast.html"}"#,
        )
        .unwrap();
        let story = item.into_story().unwrap();
        assert_eq!(story.id, 8863);
        assert_eq!(story.by.as_deref(), Some("dhouston"));
        assert_eq!(story.posted_at().unwrap().timestamp(), 1175714200);
    }
}
