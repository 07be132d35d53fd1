//! Assembles the library clients from a loaded [`PortalConfig`].
use std::sync::Arc;
use std::time::Duration;

use portal_common::{PortalError, Result};
use portal_config::PortalConfig;
use portal_http::{HttpClient, HttpError};
use portal_news::NewsClient;
use portal_search::{Credential, SearchDispatcher, SuggestionFetcher, with_referral};
use portal_shortcuts::{IconResolver, ShortcutBook};
use portal_store::{FileStore, KeyValueStore};

pub struct Portal {
    pub config: PortalConfig,
    pub search: SearchDispatcher,
    pub suggest: SuggestionFetcher,
    pub news: NewsClient,
    pub icons: IconResolver,
    store: Arc<dyn KeyValueStore>,
}

fn http_setup(err: HttpError) -> PortalError {
    PortalError::Http(err.to_string())
}

fn client(base: &str) -> Result<HttpClient> {
    HttpClient::new(base).map_err(http_setup)
}

/// `Url::join` replaces the last path segment unless the base ends in `/`.
fn with_trailing_slash(base: &str) -> String {
    if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{base}/")
    }
}

/// Build everything against the on-disk state file.
pub fn build_from_config(cfg: PortalConfig) -> Result<Portal> {
    let path = cfg.storage.resolved_path();
    tracing::debug!(path=%path.display(), "portal.storage");
    Portal::with_store(cfg, Arc::new(FileStore::new(path)))
}

impl Portal {
    pub fn with_store(cfg: PortalConfig, store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let mut search_http = client(&cfg.search.endpoint)?;
        if let Some(secs) = cfg.search.timeout_secs {
            search_http = search_http.with_timeout(Duration::from_secs(secs));
        }
        let credentials: Vec<Credential> = cfg
            .credentials()
            .into_iter()
            .map(|c| Credential::new(c.key, c.engine_id))
            .collect();
        tracing::info!(credentials = credentials.len(), cap = cfg.search.daily_cap, "portal.search.configured");
        let search = SearchDispatcher::new(search_http, credentials, store.clone())
            .with_daily_cap(cfg.search.daily_cap);

        let suggest = SuggestionFetcher::new(client(&cfg.suggest.endpoint)?)
            .with_client(cfg.suggest.client.clone())
            .with_timeout(Duration::from_millis(cfg.suggest.timeout_ms))
            .with_max_query_len(cfg.suggest.max_query_len);

        let news = NewsClient::new(client(&with_trailing_slash(&cfg.news.endpoint))?)
            .with_limit(cfg.news.limit);

        let icons = IconResolver::new(
            client(&with_trailing_slash(&cfg.shortcuts.icon_endpoint))?,
            &cfg.shortcuts.icon_fallback_endpoint,
        )
        .map_err(http_setup)?;

        Ok(Self {
            config: cfg,
            search,
            suggest,
            news,
            icons,
            store,
        })
    }

    pub fn shortcuts(&self) -> Result<ShortcutBook> {
        ShortcutBook::load(self.store.clone()).map_err(|e| PortalError::Storage(e.to_string()))
    }

    /// Outbound form of a result link; tagged only when a referral tag is set.
    pub fn outbound_link(&self, link: &str) -> String {
        match self.config.links.referral_tag.as_deref() {
            Some(tag) if !tag.trim().is_empty() => with_referral(link, tag),
            _ => link.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_store::MemoryStore;

    fn portal(cfg: PortalConfig) -> Portal {
        Portal::with_store(cfg, Arc::new(MemoryStore::new())).unwrap()
    }

    #[test]
    fn defaults_wire_up_and_load_default_shortcuts() {
        let p = portal(PortalConfig::default());
        assert_eq!(p.search.daily_cap(), 99);
        assert_eq!(p.shortcuts().unwrap().shortcuts().len(), 2);
    }

    #[test]
    fn referral_tag_only_applies_when_configured() {
        let mut cfg = PortalConfig::default();
        assert_eq!(
            portal(cfg.clone()).outbound_link("https://a.example/"),
            "https://a.example/"
        );
        cfg.links.referral_tag = Some("portal".into());
        assert_eq!(
            portal(cfg).outbound_link("https://a.example/"),
            "https://a.example/?from=portal"
        );
    }

    #[test]
    fn bad_endpoint_is_an_http_setup_error() {
        let mut cfg = PortalConfig::default();
        cfg.search.endpoint = "not a url".into();
        let err = Portal::with_store(cfg, Arc::new(MemoryStore::new())).err().unwrap();
        assert!(matches!(err, PortalError::Http(_)));
    }

    #[test]
    fn shortcuts_persist_in_the_configured_state_file() {
        let tmp = tempfile::tempdir().unwrap();
        let mut cfg = PortalConfig::default();
        cfg.storage.path = Some(tmp.path().join("state.json").display().to_string());

        let first = build_from_config(cfg.clone()).unwrap();
        first.shortcuts().unwrap().add("docs.rs", "d").unwrap();

        let second = build_from_config(cfg).unwrap();
        let book = second.shortcuts().unwrap();
        assert_eq!(book.find_by_key('d').map(|s| s.url.as_str()), Some("https://docs.rs"));
    }

    #[test]
    fn bases_gain_a_trailing_slash() {
        assert_eq!(with_trailing_slash("https://h.example/v0"), "https://h.example/v0/");
        assert_eq!(with_trailing_slash("https://h.example/v0/"), "https://h.example/v0/");
    }
}
