use serde::{Deserialize, Serialize};

/// Results requested per page.
pub const PAGE_SIZE: u32 = 10;

/// `start` offsets of the pages fetched for one query, in merge order.
pub const PAGE_STARTS: [u32; 3] = [1, 11, 21];

/// One search hit as handed to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    pub snippet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

/// A page of the custom search JSON API.
///
/// A successful page carries `items` (absent when the page is empty); a
/// failed one carries `error`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CsePage {
    #[serde(default)]
    pub items: Option<Vec<CseItem>>,
    #[serde(default)]
    pub error: Option<CseError>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CseItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub pagemap: Option<Pagemap>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pagemap {
    #[serde(default)]
    pub cse_thumbnail: Option<Vec<Thumbnail>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Thumbnail {
    #[serde(default)]
    pub src: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CseError {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

impl CseError {
    pub fn describe(&self) -> String {
        match (&self.code, &self.message) {
            (Some(code), Some(msg)) => format!("{code}: {msg}"),
            (None, Some(msg)) => msg.clone(),
            (Some(code), None) => format!("provider error code {code}"),
            (None, None) => "unknown provider error".to_string(),
        }
    }
}

impl From<CseItem> for SearchResult {
    fn from(item: CseItem) -> Self {
        let thumbnail = item
            .pagemap
            .and_then(|p| p.cse_thumbnail)
            .and_then(|thumbs| thumbs.into_iter().next())
            .and_then(|t| t.src)
            .filter(|src| !src.is_empty());
        SearchResult {
            title: item.title.unwrap_or_default(),
            link: item.link.unwrap_or_default(),
            snippet: item.snippet.unwrap_or_default(),
            thumbnail,
        }
    }
}

/// Concatenate pages in the order given, keeping provider order within each.
pub fn flatten_pages(pages: Vec<CsePage>) -> Vec<SearchResult> {
    pages
        .into_iter()
        .flat_map(|page| page.items.unwrap_or_default())
        .map(SearchResult::from)
        .collect()
}
