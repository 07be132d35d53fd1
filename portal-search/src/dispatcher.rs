//! Quota-aware search dispatcher.
//!
//! Owns the rotating credential cursor and the result cache for the life of
//! the process. Each successful uncached search costs the selected credential
//! three requests (one per page) against its daily cap; once every credential
//! is capped the dispatcher answers from related cache entries or not at all.
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use futures::future::try_join_all;
use portal_http::{HttpClient, HttpError};
use portal_store::KeyValueStore;
use tracing::{debug, info, warn};

use crate::cache::ResultCache;
use crate::credential::{Credential, CredentialUsage};
use crate::cse::{self, types::PAGE_STARTS};
use crate::quota::QuotaLedger;
use crate::{SearchResult, flatten_pages};

/// Daily request cap applied per credential unless overridden.
pub const DEFAULT_DAILY_CAP: u32 = 99;

/// Requests issued for one uncached query.
pub const REQUESTS_PER_SEARCH: u32 = PAGE_STARTS.len() as u32;

/// Failure reported by the search provider. Nothing is cached and no quota is
/// charged when a search ends in one of these.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Transport failure or non-success HTTP status on any page.
    #[error("search provider request failed: {0}")]
    Http(#[from] HttpError),
    /// A page decoded fine but carried an `error` object.
    #[error("search provider returned an error: {0}")]
    Provider(String),
}

type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

pub struct SearchDispatcher {
    http: HttpClient,
    credentials: Vec<Credential>,
    store: Arc<dyn KeyValueStore>,
    cache: ResultCache,
    cursor: usize,
    daily_cap: u32,
    today: Clock,
}

/// Trimmed, lower-cased query text used as the cache key.
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

impl SearchDispatcher {
    /// `http` must be anchored at the provider endpoint.
    pub fn new(
        http: HttpClient,
        credentials: Vec<Credential>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        if credentials.is_empty() {
            warn!("search.dispatcher.no_credentials");
        }
        Self {
            http,
            credentials,
            store,
            cache: ResultCache::new(),
            cursor: 0,
            daily_cap: DEFAULT_DAILY_CAP,
            today: Arc::new(|| Local::now().date_naive()),
        }
    }

    pub fn with_daily_cap(mut self, cap: u32) -> Self {
        self.daily_cap = cap;
        self
    }

    /// Replace the source of "today" used for the daily counter reset.
    pub fn with_clock<F>(mut self, today: F) -> Self
    where
        F: Fn() -> NaiveDate + Send + Sync + 'static,
    {
        self.today = Arc::new(today);
        self
    }

    pub fn daily_cap(&self) -> u32 {
        self.daily_cap
    }

    pub fn cached_queries(&self) -> usize {
        self.cache.len()
    }

    fn ledger(&self) -> QuotaLedger {
        QuotaLedger::load(self.store.as_ref(), self.credentials.len(), (self.today)())
    }

    /// Usage snapshot for every credential, as of today.
    pub fn usage(&self) -> Vec<CredentialUsage> {
        let ledger = self.ledger();
        self.credentials
            .iter()
            .enumerate()
            .map(|(index, cred)| {
                let used = ledger.used(index);
                CredentialUsage {
                    index,
                    engine_id: cred.engine_id.clone(),
                    request_count: used,
                    last_reset_date: ledger.date(),
                    exhausted: used >= self.daily_cap,
                }
            })
            .collect()
    }

    /// Index of a credential under the cap, starting at the cursor and moving
    /// it circularly. `None` once the whole list has been checked.
    fn select_credential(&mut self, ledger: &QuotaLedger) -> Option<usize> {
        let n = self.credentials.len();
        if n == 0 {
            return None;
        }
        if self.cursor >= n {
            self.cursor = 0;
        }
        if ledger.used(self.cursor) < self.daily_cap {
            return Some(self.cursor);
        }
        let start = self.cursor;
        loop {
            self.cursor = (self.cursor + 1) % n;
            if self.cursor == start {
                return None;
            }
            if ledger.used(self.cursor) < self.daily_cap {
                return Some(self.cursor);
            }
        }
    }

    /// Search for `query`.
    ///
    /// Empty queries return nothing without touching the network. Repeated
    /// queries are served from the cache. Quota exhaustion is not an error.
    pub async fn search(&mut self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        let normalized = normalize_query(query);
        if normalized.is_empty() {
            return Ok(Vec::new());
        }

        if let Some(hit) = self.cache.get(&normalized) {
            info!(query=%normalized, results=hit.len(), "search.cache_hit");
            return Ok(hit.to_vec());
        }

        let ledger = self.ledger();
        let Some(index) = self.select_credential(&ledger) else {
            return Ok(self.degraded(&normalized));
        };

        let cred = self.credentials[index].clone();
        info!(
            query=%normalized,
            credential=index,
            used=ledger.used(index),
            cap=self.daily_cap,
            "search.start"
        );

        let pages = try_join_all(PAGE_STARTS.iter().map(|&start| {
            cse::fetch_page(&self.http, &cred.key, &cred.engine_id, &normalized, start)
        }))
        .await
        .inspect_err(|err| warn!(query=%normalized, error=%err, "search.provider_error"))?;

        if let Some(err) = pages.iter().find_map(|p| p.error.as_ref()) {
            let message = err.describe();
            warn!(query=%normalized, message=%message, "search.provider_error_body");
            return Err(SearchError::Provider(message));
        }

        let results = flatten_pages(pages);
        info!(query=%normalized, results=results.len(), "search.done");

        if !results.is_empty() {
            self.cache.insert(normalized, results.clone());
            self.charge(index);
        }
        Ok(results)
    }

    /// Every credential is capped: answer from a related cache entry, if any.
    fn degraded(&self, normalized: &str) -> Vec<SearchResult> {
        match self.cache.find_related(normalized) {
            Some((key, results)) => {
                info!(query=%normalized, cached_key=%key, "search.quota_exhausted.related_hit");
                results.to_vec()
            }
            None => {
                info!(query=%normalized, "search.quota_exhausted");
                Vec::new()
            }
        }
    }

    fn charge(&self, index: usize) {
        // Re-read so the increment applies to the latest stored counters.
        let mut ledger = self.ledger();
        ledger.record(index, REQUESTS_PER_SEARCH);
        match ledger.save(self.store.as_ref()) {
            Ok(()) => debug!(credential = index, used = ledger.used(index), "search.quota.charged"),
            Err(err) => warn!(credential = index, error=%err, "search.quota.persist_failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_store::MemoryStore;

    fn dispatcher(creds: usize) -> SearchDispatcher {
        let http = HttpClient::new("http://127.0.0.1:9/customsearch/v1").unwrap();
        let credentials = (0..creds)
            .map(|i| Credential::new(format!("k{i}"), format!("cx{i}")))
            .collect();
        SearchDispatcher::new(http, credentials, Arc::new(MemoryStore::new()))
            .with_clock(|| NaiveDate::from_ymd_opt(2026, 10, 16).unwrap())
    }

    fn ledger_with(used: &[u32]) -> QuotaLedger {
        let mut ledger =
            QuotaLedger::fresh(used.len(), NaiveDate::from_ymd_opt(2026, 10, 16).unwrap());
        for (i, n) in used.iter().enumerate() {
            ledger.record(i, *n);
        }
        ledger
    }

    #[test]
    fn normalization_trims_and_lowercases() {
        assert_eq!(normalize_query("  Rust Lang \n"), "rust lang");
        assert_eq!(normalize_query("   "), "");
    }

    #[test]
    fn cursor_stays_while_under_cap() {
        let mut d = dispatcher(3);
        assert_eq!(d.select_credential(&ledger_with(&[10, 0, 0])), Some(0));
        assert_eq!(d.cursor, 0);
    }

    #[test]
    fn cursor_rotates_past_capped_credentials() {
        let mut d = dispatcher(3);
        assert_eq!(d.select_credential(&ledger_with(&[99, 99, 5])), Some(2));
        assert_eq!(d.cursor, 2);
        // wraps around from the end
        assert_eq!(d.select_credential(&ledger_with(&[0, 99, 99])), Some(0));
    }

    #[test]
    fn all_capped_yields_none() {
        let mut d = dispatcher(3);
        assert_eq!(d.select_credential(&ledger_with(&[99, 100, 101])), None);
        assert_eq!(dispatcher(0).select_credential(&ledger_with(&[])), None);
    }

    #[test]
    fn usage_reports_exhaustion_against_the_cap() {
        let d = dispatcher(2).with_daily_cap(10);
        let ledger = ledger_with(&[10, 3]);
        ledger.save(d.store.as_ref()).unwrap();

        let usage = d.usage();
        assert!(usage[0].exhausted);
        assert_eq!(usage[1].request_count, 3);
        assert!(!usage[1].exhausted);
        assert_eq!(usage[1].engine_id, "cx1");
    }
}
