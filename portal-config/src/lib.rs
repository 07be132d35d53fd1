//! Loader for portal configuration with YAML + environment overlays.
//!
//! Sources are merged in the order they are added, with `PORTAL__`-prefixed
//! environment variables winning (`PORTAL__SEARCH__DAILY_CAP=50`). String
//! values may reference other variables as `${VAR}`; expansion is applied
//! recursively up to a fixed depth. Every section has defaults, so an empty
//! document yields a usable configuration.
//!
//! Search credentials can also come from indexed variables
//! `PORTAL_SEARCH_API_KEY_<n>` / `PORTAL_SEARCH_ENGINE_ID_<n>` for n in 1..=10;
//! see [`PortalConfig::credentials`].
use config::{Config, ConfigError, Environment, File};
use portal_common::observability::{LogConfig, LogFormat};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

/// Upper bound on configured search credentials.
pub const MAX_CREDENTIALS: usize = 10;

pub const API_KEY_ENV_PREFIX: &str = "PORTAL_SEARCH_API_KEY_";
pub const ENGINE_ID_ENV_PREFIX: &str = "PORTAL_SEARCH_ENGINE_ID_";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortalConfig {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub suggest: SuggestSettings,
    #[serde(default)]
    pub news: NewsSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub shortcuts: ShortcutSettings,
    #[serde(default)]
    pub links: LinkSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// One API key / search engine id pair.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct CredentialSpec {
    pub key: String,
    pub engine_id: String,
}

impl CredentialSpec {
    /// Both halves present and fully expanded.
    pub fn is_usable(&self) -> bool {
        let ok = |s: &str| !s.trim().is_empty() && !s.contains("${");
        ok(&self.key) && ok(&self.engine_id)
    }
}

impl fmt::Debug for CredentialSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSpec")
            .field("key", &"<redacted>")
            .field("engine_id", &self.engine_id)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_daily_cap")]
    pub daily_cap: u32,
    /// No timeout unless set.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub credentials: Vec<CredentialSpec>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            endpoint: default_search_endpoint(),
            daily_cap: default_daily_cap(),
            timeout_secs: None,
            credentials: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SuggestSettings {
    #[serde(default = "default_suggest_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_suggest_client")]
    pub client: String,
    #[serde(default = "default_suggest_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_max_query_len")]
    pub max_query_len: usize,
}

impl Default for SuggestSettings {
    fn default() -> Self {
        Self {
            endpoint: default_suggest_endpoint(),
            client: default_suggest_client(),
            timeout_ms: default_suggest_timeout_ms(),
            max_query_len: default_max_query_len(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsSettings {
    #[serde(default = "default_news_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_news_limit")]
    pub limit: usize,
}

impl Default for NewsSettings {
    fn default() -> Self {
        Self {
            endpoint: default_news_endpoint(),
            limit: default_news_limit(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageSettings {
    /// Defaults to `<data dir>/portal/state.json`.
    #[serde(default)]
    pub path: Option<String>,
}

impl StorageSettings {
    /// Expand `~` and fall back to the platform data directory.
    pub fn resolved_path(&self) -> PathBuf {
        match &self.path {
            Some(p) => PathBuf::from(shellexpand::tilde(p).into_owned()),
            None => dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("portal")
                .join("state.json"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShortcutSettings {
    #[serde(default = "default_icon_endpoint")]
    pub icon_endpoint: String,
    #[serde(default = "default_icon_fallback_endpoint")]
    pub icon_fallback_endpoint: String,
}

impl Default for ShortcutSettings {
    fn default() -> Self {
        Self {
            icon_endpoint: default_icon_endpoint(),
            icon_fallback_endpoint: default_icon_fallback_endpoint(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinkSettings {
    #[serde(default)]
    pub referral_tag: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default)]
    pub dir: Option<PathBuf>,
    #[serde(default)]
    pub format: LogFormat,
    #[serde(default)]
    pub stderr: bool,
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            dir: None,
            format: LogFormat::Text,
            stderr: false,
            filter: default_log_filter(),
        }
    }
}

impl LoggingSettings {
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            log_dir: self.dir.clone(),
            emit_stderr: self.stderr,
            format: self.format,
            default_filter: self.filter.clone(),
            ..LogConfig::default()
        }
    }
}

fn default_search_endpoint() -> String {
    "https://www.googleapis.com/customsearch/v1".into()
}
fn default_daily_cap() -> u32 {
    99
}
fn default_suggest_endpoint() -> String {
    "https://suggestqueries.google.com/complete/search".into()
}
fn default_suggest_client() -> String {
    "firefox".into()
}
fn default_suggest_timeout_ms() -> u64 {
    3_000
}
fn default_max_query_len() -> usize {
    50
}
fn default_news_endpoint() -> String {
    "https://hacker-news.firebaseio.com/v0/".into()
}
fn default_news_limit() -> usize {
    20
}
fn default_icon_endpoint() -> String {
    "https://icons.duckduckgo.com/ip3/".into()
}
fn default_icon_fallback_endpoint() -> String {
    "https://www.google.com/s2/favicons".into()
}
fn default_log_filter() -> String {
    "info".into()
}

impl PortalConfig {
    /// Configured credentials followed by the indexed environment pairs.
    ///
    /// Unusable entries (empty or unexpanded `${...}` halves) are dropped and
    /// the list is capped at [`MAX_CREDENTIALS`].
    pub fn credentials(&self) -> Vec<CredentialSpec> {
        let mut out: Vec<CredentialSpec> = Vec::new();
        for cred in self
            .search
            .credentials
            .iter()
            .cloned()
            .chain(credentials_from_env())
        {
            if !cred.is_usable() {
                tracing::warn!(engine_id=%cred.engine_id, "config.credential.skipped");
                continue;
            }
            if out.contains(&cred) {
                continue;
            }
            out.push(cred);
        }
        if out.len() > MAX_CREDENTIALS {
            tracing::warn!(
                found = out.len(),
                kept = MAX_CREDENTIALS,
                "config.credential.truncated"
            );
            out.truncate(MAX_CREDENTIALS);
        }
        if out.is_empty() {
            tracing::warn!("config.credential.none_found");
        }
        out
    }
}

/// Read `PORTAL_SEARCH_API_KEY_<n>` / `PORTAL_SEARCH_ENGINE_ID_<n>` for n in 1..=10.
pub fn credentials_from_env() -> Vec<CredentialSpec> {
    (1..=MAX_CREDENTIALS)
        .filter_map(|i| {
            let key = std::env::var(format!("{API_KEY_ENV_PREFIX}{i}")).ok()?;
            let engine_id = std::env::var(format!("{ENGINE_ID_ENV_PREFIX}{i}")).ok()?;
            let cred = CredentialSpec { key, engine_id };
            cred.is_usable().then_some(cred)
        })
        .collect()
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct PortalConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for PortalConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl PortalConfigLoader {
    /// Empty loader; `PORTAL__` env overrides are applied on [`load`](Self::load).
    ///
    /// ```
    /// use portal_config::PortalConfigLoader;
    ///
    /// let config = PortalConfigLoader::new()
    ///     .with_yaml_str("version: '1'")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert_eq!(config.search.daily_cap, 99);
    /// assert_eq!(config.suggest.timeout_ms, 3000);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a required YAML/TOML/JSON file; the format is inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that may be absent (headless deployments rely on env only).
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet.
    ///
    /// ```
    /// use portal_config::PortalConfigLoader;
    ///
    /// let cfg = PortalConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// search:
    ///   daily_cap: 30
    ///   credentials:
    ///     - key: "k1"
    ///       engine_id: "cx1"
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.search.daily_cap, 30);
    /// assert_eq!(cfg.search.credentials.len(), 1);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into typed config,
    /// expanding `${VAR}` placeholders on the way.
    pub fn load(self) -> Result<PortalConfig, ConfigError> {
        // Env is added last so it overrides every file.
        let cfg = self
            .builder
            .add_source(Environment::with_prefix("PORTAL").separator("__"))
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        // Env overrides arrive as strings; going back through `Config` lets
        // "12" fill a number while "2024" can still fill a string.
        Config::try_from(&v)?.try_deserialize()
    }
}
