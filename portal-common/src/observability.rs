//! Logging setup shared by the `portal` binary and integration tests.
//!
//! [`init_logging`] installs one global `tracing` subscriber: a daily-rolling
//! file sink, optionally mirrored to stderr, both in the [`LogFormat`] chosen
//! by the `logging` config section. Later calls are no-ops that hand back the
//! log file path resolved by the first one.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use chrono::Local;
use serde::Deserialize;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();
static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();

const LOG_DIR_ENV: &str = "PORTAL_LOG_DIR";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Output encoding for structured logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    fn layer<W>(self, writer: W, ansi: bool) -> BoxedLayer
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        match self {
            LogFormat::Text => fmt::layer().with_writer(writer).with_ansi(ansi).boxed(),
            LogFormat::Json => fmt::layer().json().with_writer(writer).boxed(),
        }
    }
}

/// Configuration passed to [`init_logging`].
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Used for the log file name and the default directory.
    pub app_name: &'static str,
    /// Explicit log directory. Falls back to `PORTAL_LOG_DIR`, then the
    /// platform data directory.
    pub log_dir: Option<PathBuf>,
    /// Mirror every event to stderr.
    pub emit_stderr: bool,
    pub format: LogFormat,
    /// Filter used when `RUST_LOG` is unset.
    pub default_filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            app_name: "portal",
            log_dir: None,
            emit_stderr: false,
            format: LogFormat::Text,
            default_filter: "info".to_string(),
        }
    }
}

impl LogConfig {
    /// Directory the rolling file lives in.
    pub fn resolved_dir(&self) -> PathBuf {
        let configured = self
            .log_dir
            .clone()
            .or_else(|| std::env::var_os(LOG_DIR_ENV).map(PathBuf::from));
        match configured {
            Some(dir) => expand_home(&dir),
            None => dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(self.app_name),
        }
    }

    fn sinks<F>(&self, file: F) -> Vec<BoxedLayer>
    where
        F: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let mut sinks = vec![self.format.layer(file, false)];
        if self.emit_stderr {
            sinks.push(self.format.layer(std::io::stderr, true));
        }
        sinks
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.default_filter))
    }
}

fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Returns the log file path for the current day.
pub fn init_logging(config: LogConfig) -> anyhow::Result<PathBuf> {
    if let Some(path) = LOG_PATH.get() {
        return Ok(path.clone());
    }

    let dir = config.resolved_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create log directory: {}", dir.display()))?;

    let file_name = format!("{}.log", config.app_name);
    let path = dir.join(format!("{file_name}.{}", Local::now().format("%Y-%m-%d")));

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(&dir, file_name));
    let _ = LOG_GUARD.set(guard);

    tracing_subscriber::registry()
        .with(config.sinks(writer))
        .with(config.filter())
        .try_init()
        .map_err(|e| anyhow::anyhow!("tracing setup failed: {e}"))?;

    let _ = LOG_PATH.set(path.clone());
    Ok(path)
}
