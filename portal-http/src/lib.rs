//! Minimal HTTP client with safe logging and query-parameter auth.
//!
//! - Request options: `Auth`, query params, timeout
//! - Redacts sensitive query params and never logs secret values
//! - Optional *raw* request/response logging via `PORTAL_HTTP_RAW=1`
//! - No retries: a failed request is reported to the caller as-is
//!
//! Example (no_run):
//! ```rust
//! # async fn demo() -> Result<(), portal_http::HttpError> {
//! let client = portal_http::HttpClient::new("https://api.example.com")?;
//! let got: serde_json::Value = client
//!     .get_json("v1/items", portal_http::RequestOpts::default())
//!     .await?;
//! # Ok(()) }
//! ```
//!
//! Observability: structured `tracing` events are emitted for request start,
//! response headers, body snippets (truncated), final errors, and
//! (optionally) raw request/response lines (target `http.raw`).

use encoding_rs::{Encoding, UTF_8};
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use reqwest::{Client, Method, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::env;
use std::time::{Duration, Instant};
use thiserror::Error;

// ==============================
// Raw logging toggles
// ==============================

const RAW_ENV: &str = "PORTAL_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024; // cap raw body logs (64 KiB)

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

fn is_secret_param(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "access_token"
            | "authorization"
            | "auth"
            | "key"
            | "api_key"
            | "token"
            | "secret"
            | "client_secret"
            | "bearer"
    )
}

/// Render a best-effort curl command for repro/debug, with secrets redacted.
fn make_curl(method: &Method, url: &Url) -> String {
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if is_secret_param(&k) {
                "<redacted>".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();
    if pairs.is_empty() {
        redacted.set_query(None);
    } else {
        redacted.query_pairs_mut().clear().extend_pairs(pairs);
    }
    format!(
        "curl -X{} '{}'",
        method,
        redacted.as_str().replace('\'', r"'\''")
    )
}

// ==============================
// Errors
// ==============================

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("server returned error {status}: {message}, request_id={request_id}")]
    Api {
        status: StatusCode,
        message: String,
        request_id: String,
    },
}

// ==============================
// Auth & Request Options
// ==============================

/// Authentication strategies supported by the HTTP client helpers.
///
/// ```
/// use portal_http::Auth;
/// use std::borrow::Cow;
///
/// let auth = Auth::Query { name: "key", value: Cow::Borrowed("secret") };
/// match auth {
///     Auth::Query { name, .. } => assert_eq!(name, "key"),
///     Auth::None => unreachable!(),
/// }
/// ```
#[derive(Clone, Debug)]
pub enum Auth<'a> {
    /// Auth via query param (e.g. the search API `key`)
    Query {
        name: &'a str,
        value: Cow<'a, str>,
    },
    None,
}

/// Per-request tuning knobs for the HTTP client.
///
/// ```
/// use portal_http::{Auth, RequestOpts};
/// use std::borrow::Cow;
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(3)),
///     auth: Some(Auth::Query {
///         name: "key",
///         value: Cow::Borrowed("demo"),
///     }),
///     ..Default::default()
/// };
///
/// assert_eq!(opts.timeout.unwrap().as_secs(), 3);
/// assert!(opts.query.is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    pub timeout: Option<Duration>,
    pub auth: Option<Auth<'a>>,
    pub query: Option<Vec<(&'a str, Cow<'a, str>)>>, // e.g. [("q", "term".into())]
}

// ==============================
// Client
// ==============================

#[derive(Clone)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    /// Applied when a request carries no timeout of its own. `None` waits
    /// for as long as the server takes.
    pub default_timeout: Option<Duration>,
}

/// What came back from the wire before any decoding.
struct RawResponse {
    req_id: String,
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl HttpClient {
    /// Construct a client anchored to a base URL.
    ///
    /// ```no_run
    /// use portal_http::{HttpClient, HttpError};
    ///
    /// let client = HttpClient::new("https://api.example.com")?;
    /// assert!(client.default_timeout.is_none());
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            default_timeout: None,
        })
    }

    /// Set a default timeout for requests that do not bring their own.
    ///
    /// ```no_run
    /// use portal_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://api.example.com")?
    ///     .with_timeout(Duration::from_secs(2));
    /// assert_eq!(client.default_timeout, Some(Duration::from_secs(2)));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = Some(dur);
        self
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// GET JSON; non-2xx statuses become [`HttpError::Api`].
    pub async fn get_json<T>(&self, path: &str, opts: RequestOpts<'_>) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        let raw = self.send(Method::GET, path, opts).await?;
        let snippet = snip_body(&raw.body);
        if !raw.status.is_success() {
            return Err(api_error(&raw, snippet));
        }

        // FIXME(content-type): Validate content-type before JSON decode.
        serde_json::from_slice::<T>(&raw.body).map_err(|e| {
            tracing::warn!(
                req_id=%raw.req_id,
                serde_line=%e.line(),
                serde_col=%e.column(),
                serde_err=%e.to_string(),
                body_snippet=%snippet,
                "http.response.decode_error"
            );
            HttpError::Decode(e.to_string(), snippet)
        })
    }

    /// GET a body as text, decoded with the `Content-Type` charset (UTF-8
    /// when absent or unknown); non-2xx statuses become [`HttpError::Api`].
    pub async fn get_text(&self, path: &str, opts: RequestOpts<'_>) -> Result<String, HttpError> {
        let raw = self.send(Method::GET, path, opts).await?;
        if !raw.status.is_success() {
            let snippet = snip_body(&raw.body);
            return Err(api_error(&raw, snippet));
        }
        let encoding = response_encoding(&raw.headers);
        let (text, _, had_errors) = encoding.decode(&raw.body);
        if had_errors {
            tracing::debug!(req_id=%raw.req_id, encoding=encoding.name(), "http.response.lossy_decode");
        }
        Ok(text.into_owned())
    }

    /// GET and report only the status; the body is discarded.
    pub async fn probe(&self, path: &str, opts: RequestOpts<'_>) -> Result<StatusCode, HttpError> {
        let raw = self.send(Method::GET, path, opts).await?;
        Ok(raw.status)
    }

    // ==============================
    // Core request implementation
    // ==============================

    async fn send(
        &self,
        method: Method,
        path: &str,
        opts: RequestOpts<'_>,
    ) -> Result<RawResponse, HttpError> {
        let url = self
            .base
            .join(path)
            .map_err(|e| HttpError::Url(e.to_string()))?;

        let mut rb = self.inner.request(method.clone(), url.clone());

        let timeout = opts.timeout.or(self.default_timeout);
        if let Some(t) = timeout {
            rb = rb.timeout(t);
        }

        let mut pairs: Vec<(&str, &str)> = opts
            .query
            .as_ref()
            .map(|q| q.iter().map(|(k, v)| (*k, v.as_ref())).collect())
            .unwrap_or_default();
        if let Some(Auth::Query { name, value }) = &opts.auth {
            pairs.push((*name, value.as_ref()));
        }
        if !pairs.is_empty() {
            rb = rb.query(&pairs);
        }

        let auth_kind = match &opts.auth {
            Some(Auth::Query { .. }) => "query",
            Some(Auth::None) | None => "none",
        };

        // Redact sensitive query params
        let redacted_q: Vec<(String, String)> = opts
            .query
            .as_ref()
            .map(|q| {
                q.iter()
                    .map(|(k, v)| {
                        let shown = if is_secret_param(k) {
                            "<redacted>".to_string()
                        } else {
                            v.as_ref().to_string()
                        };
                        ((*k).to_string(), shown)
                    })
                    .collect()
            })
            .unwrap_or_default();

        let req_id = format!("r{}", uuid::Uuid::new_v4().simple());

        tracing::debug!(
            req_id=%req_id,
            method=%method,
            host_path=%format!("{}{}", url.host_str().unwrap_or("-"), url.path()),
            query=?redacted_q,
            timeout_ms=timeout.map(|t| t.as_millis() as u64),
            auth_kind,
            "http.request.start"
        );

        let request = rb.build().map_err(|e| HttpError::Build(e.to_string()))?;
        if raw_enabled() {
            let curl = make_curl(&method, request.url());
            tracing::debug!(target: "http.raw", %req_id, %curl, "request");
        }

        // ----- Send -----
        let t0 = Instant::now();
        let resp = match self.inner.execute(request).await {
            Ok(resp) => resp,
            Err(err) => return Err(transport_error(&req_id, err, timeout, "send")),
        };
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = match resp.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(err) => return Err(transport_error(&req_id, err, timeout, "body")),
        };
        let dur_ms = t0.elapsed().as_millis() as u64;

        let req_hdr_id = request_id_header(&headers);
        tracing::debug!(
            req_id=%req_id,
            %status,
            duration_ms=dur_ms,
            body_len=body.len(),
            x_request_id=%req_hdr_id,
            "http.response.headers"
        );

        if raw_enabled() {
            let mut body_snip = body.clone();
            let truncated = body_snip.len() > RAW_MAX_BODY;
            if truncated {
                body_snip.truncate(RAW_MAX_BODY);
            }
            let text = String::from_utf8_lossy(&body_snip);
            tracing::info!(
                target:"http.raw",
                %req_id,
                status=%status,
                duration_ms=dur_ms,
                body=%text,
                truncated
            );
        }

        tracing::trace!(
            req_id=%req_id,
            body_snippet=%snip_body(&body),
            "http.response.body_snippet"
        );

        Ok(RawResponse {
            req_id,
            status,
            headers,
            body,
        })
    }
}

// ==============================
// Helpers
// ==============================

fn transport_error(
    req_id: &str,
    err: reqwest::Error,
    timeout: Option<Duration>,
    stage: &'static str,
) -> HttpError {
    let message = err.to_string();
    tracing::warn!(req_id=%req_id, stage, message=%message, "http.network_error");
    match (err.is_timeout(), timeout) {
        (true, Some(t)) => HttpError::Timeout(t),
        _ => HttpError::Network(message),
    }
}

fn api_error(raw: &RawResponse, snippet: String) -> HttpError {
    let message = extract_error_message(&raw.body);
    let request_id = request_id_header(&raw.headers).to_string();
    tracing::warn!(
        req_id=%raw.req_id,
        status=%raw.status,
        message=%message,
        x_request_id=%request_id,
        body_snippet=%snippet,
        "http.error"
    );
    HttpError::Api {
        status: raw.status,
        message,
        request_id,
    }
}

/// Encoding named by the `charset` parameter of `Content-Type`.
fn response_encoding(headers: &HeaderMap) -> &'static Encoding {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| {
            ct.split(';').skip(1).find_map(|param| {
                let (name, value) = param.split_once('=')?;
                name.trim()
                    .eq_ignore_ascii_case("charset")
                    .then(|| value.trim().trim_matches('"'))
            })
        })
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8)
}

fn request_id_header(headers: &HeaderMap) -> &str {
    headers
        .get("x-request-id")
        .or_else(|| headers.get("x-correlation-id"))
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
}

/// Pull a human message out of the common JSON error envelopes.
pub fn extract_error_message(body: &[u8]) -> String {
    // Google style: {"error":{"code":403,"message":"..."}}
    #[derive(Deserialize)]
    struct Envelope {
        error: Detail,
    }
    #[derive(Deserialize)]
    struct Detail {
        message: String,
    }

    // Generic: {"message":"..."} or {"detail":"..."} or {"error":"..."}
    #[derive(Deserialize)]
    struct Msg {
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        error: String,
    }

    if let Ok(env) = serde_json::from_slice::<Envelope>(body) {
        return env.error.message;
    }
    if let Ok(m) = serde_json::from_slice::<Msg>(body) {
        if !m.message.is_empty() {
            return m.message;
        }
        if !m.detail.is_empty() {
            return m.detail;
        }
        if !m.error.is_empty() {
            return m.error;
        }
    }
    snip_body(body)
}

fn snip_body(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(body).to_string();
    if snip.len() > 500 {
        let mut cut = 500;
        while !snip.is_char_boundary(cut) {
            cut -= 1;
        }
        snip.truncate(cut);
        snip.push_str("...");
    }
    snip
}
