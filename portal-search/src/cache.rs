use std::collections::HashMap;

use crate::SearchResult;

/// Results keyed by normalized query. Lives for the process; never evicts.
#[derive(Debug, Default)]
pub struct ResultCache {
    entries: HashMap<String, Vec<SearchResult>>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exact-match lookup.
    pub fn get(&self, query: &str) -> Option<&[SearchResult]> {
        self.entries.get(query).map(Vec::as_slice)
    }

    pub fn insert(&mut self, query: String, results: Vec<SearchResult>) {
        self.entries.insert(query, results);
    }

    /// Any entry whose key contains `query` or is contained in it. Which one
    /// wins when several match is unspecified.
    pub fn find_related(&self, query: &str) -> Option<(&str, &[SearchResult])> {
        self.entries
            .iter()
            .find(|(key, _)| key.contains(query) || query.contains(key.as_str()))
            .map(|(key, results)| (key.as_str(), results.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(title: &str) -> SearchResult {
        SearchResult {
            title: title.into(),
            link: format!("https://{title}.example"),
            snippet: String::new(),
            thumbnail: None,
        }
    }

    #[test]
    fn related_matches_in_both_directions() {
        let mut cache = ResultCache::new();
        cache.insert("rust async".into(), vec![hit("a")]);

        let (key, results) = cache.find_related("rust").unwrap();
        assert_eq!(key, "rust async");
        assert_eq!(results[0].title, "a");

        assert!(cache.find_related("rust async runtime").is_some());
        assert!(cache.find_related("python").is_none());
    }

    #[test]
    fn exact_lookup_does_not_fuzz() {
        let mut cache = ResultCache::new();
        cache.insert("rust".into(), vec![hit("a")]);
        assert!(cache.get("rust").is_some());
        assert!(cache.get("rust lang").is_none());
        assert_eq!(cache.len(), 1);
    }
}
