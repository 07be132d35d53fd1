use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// An API key / search engine id pair. Usage counters live in the
/// [`QuotaLedger`](crate::quota::QuotaLedger), not here.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub key: String,
    pub engine_id: String,
}

impl Credential {
    pub fn new(key: impl Into<String>, engine_id: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            engine_id: engine_id.into(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("key", &"<redacted>")
            .field("engine_id", &self.engine_id)
            .finish()
    }
}

/// Today's usage of one credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialUsage {
    pub index: usize,
    pub engine_id: String,
    pub request_count: u32,
    pub last_reset_date: NaiveDate,
    pub exhausted: bool,
}
