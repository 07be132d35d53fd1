//! Custom search JSON API surface: wire types and the per-page request.
pub mod types;

use portal_http::{Auth, HttpClient, HttpError, RequestOpts};
use types::{CsePage, PAGE_SIZE};

/// Fetch one result page for `query` starting at the 1-based `start` offset.
pub async fn fetch_page(
    http: &HttpClient,
    key: &str,
    engine_id: &str,
    query: &str,
    start: u32,
) -> Result<CsePage, HttpError> {
    http.get_json(
        "",
        RequestOpts {
            auth: Some(Auth::Query {
                name: "key",
                value: key.into(),
            }),
            query: Some(vec![
                ("cx", engine_id.into()),
                ("q", query.into()),
                ("start", start.to_string().into()),
                ("num", PAGE_SIZE.to_string().into()),
            ]),
            ..Default::default()
        },
    )
    .await
}
