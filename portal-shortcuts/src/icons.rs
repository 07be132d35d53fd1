//! Favicon lookup for shortcuts.
use portal_http::{HttpClient, HttpError, RequestOpts};
use url::Url;

pub const FALLBACK_ICON_SIZE: &str = "64";

/// Probes the primary icon service and falls back to a sized favicon URL
/// from the secondary one.
#[derive(Clone)]
pub struct IconResolver {
    primary: HttpClient,
    fallback: Url,
}

impl IconResolver {
    /// `primary` is anchored at the icon service root (trailing slash);
    /// icons live at `<root><host>.ico`.
    pub fn new(primary: HttpClient, fallback_endpoint: &str) -> Result<Self, HttpError> {
        let fallback = Url::parse(fallback_endpoint).map_err(|e| HttpError::Url(e.to_string()))?;
        Ok(Self { primary, fallback })
    }

    /// Icon URL for `host`. Network failures are not errors; they select the
    /// fallback.
    pub async fn resolve(&self, host: &str) -> String {
        let path = format!("{host}.ico");
        match self.primary.probe(&path, RequestOpts::default()).await {
            Ok(status) if status.is_success() => match self.primary.base().join(&path) {
                Ok(url) => return url.to_string(),
                Err(err) => tracing::debug!(host, error=%err, "shortcuts.icon.join_failed"),
            },
            Ok(status) => tracing::debug!(host, status = status.as_u16(), "shortcuts.icon.miss"),
            Err(err) => tracing::debug!(host, error=%err, "shortcuts.icon.probe_failed"),
        }
        self.fallback_for(host)
    }

    pub fn fallback_for(&self, host: &str) -> String {
        let mut url = self.fallback.clone();
        url.query_pairs_mut()
            .append_pair("domain", host)
            .append_pair("sz", FALLBACK_ICON_SIZE);
        url.to_string()
    }
}
