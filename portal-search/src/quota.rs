//! Per-credential daily request counters.
//!
//! Persisted as one JSON object under [`COUNTS_KEY`]:
//! `{ "date": "2026-10-16", "api0": 12, "api1": 0 }`. A stored date other than
//! today means the counters belong to a previous day and are all zero.
use chrono::NaiveDate;
use portal_store::{KeyValueStore, StoreError};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, warn};

pub const COUNTS_KEY: &str = "apiRequestCounts";

const DATE_FIELD: &str = "date";
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaLedger {
    date: NaiveDate,
    counts: BTreeMap<usize, u32>,
}

fn slot_name(index: usize) -> String {
    format!("api{index}")
}

impl QuotaLedger {
    /// Fresh counters for `slots` credentials.
    pub fn fresh(slots: usize, today: NaiveDate) -> Self {
        Self {
            date: today,
            counts: (0..slots).map(|i| (i, 0)).collect(),
        }
    }

    /// Read the stored counters, resetting them when they were recorded on
    /// another day or cannot be read.
    pub fn load(store: &dyn KeyValueStore, slots: usize, today: NaiveDate) -> Self {
        let raw = match store.get(COUNTS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Self::fresh(slots, today),
            Err(err) => {
                warn!(error=%err, "quota.load.store_error");
                return Self::fresh(slots, today);
            }
        };

        let obj = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(obj)) => obj,
            Ok(_) | Err(_) => {
                warn!(raw_len = raw.len(), "quota.load.malformed");
                return Self::fresh(slots, today);
            }
        };

        let stored_date = obj
            .get(DATE_FIELD)
            .and_then(Value::as_str)
            .and_then(|s| NaiveDate::parse_from_str(s, DATE_FORMAT).ok());
        if stored_date != Some(today) {
            debug!(stored=?stored_date, %today, "quota.load.rollover");
            return Self::fresh(slots, today);
        }

        let counts = (0..slots)
            .map(|i| {
                let used = obj
                    .get(&slot_name(i))
                    .and_then(Value::as_u64)
                    .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
                    .unwrap_or(0);
                (i, used)
            })
            .collect();
        Self {
            date: today,
            counts,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Requests used today by credential `index`.
    pub fn used(&self, index: usize) -> u32 {
        self.counts.get(&index).copied().unwrap_or(0)
    }

    pub fn record(&mut self, index: usize, requests: u32) {
        let slot = self.counts.entry(index).or_insert(0);
        *slot = slot.saturating_add(requests);
    }

    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        obj.insert(
            DATE_FIELD.to_string(),
            Value::String(self.date.format(DATE_FORMAT).to_string()),
        );
        for (i, used) in &self.counts {
            obj.insert(slot_name(*i), Value::from(*used));
        }
        Value::Object(obj)
    }

    pub fn save(&self, store: &dyn KeyValueStore) -> Result<(), StoreError> {
        store.set(COUNTS_KEY, &self.to_json().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_store::MemoryStore;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    #[test]
    fn empty_store_starts_at_zero() {
        let store = MemoryStore::new();
        let ledger = QuotaLedger::load(&store, 2, day(16));
        assert_eq!(ledger.used(0), 0);
        assert_eq!(ledger.used(1), 0);
        assert_eq!(ledger.date(), day(16));
    }

    #[test]
    fn counters_from_yesterday_are_ignored() {
        let store = MemoryStore::new();
        store
            .set(COUNTS_KEY, r#"{"date":"2026-10-15","api0":99,"api1":40}"#)
            .unwrap();
        let ledger = QuotaLedger::load(&store, 2, day(16));
        assert_eq!(ledger.used(0), 0);
        assert_eq!(ledger.used(1), 0);
    }

    #[test]
    fn todays_counters_are_kept_and_missing_slots_are_zero() {
        let store = MemoryStore::new();
        store
            .set(COUNTS_KEY, r#"{"date":"2026-10-16","api0":42}"#)
            .unwrap();
        let ledger = QuotaLedger::load(&store, 2, day(16));
        assert_eq!(ledger.used(0), 42);
        assert_eq!(ledger.used(1), 0);
    }

    #[test]
    fn malformed_state_resets() {
        let store = MemoryStore::new();
        store.set(COUNTS_KEY, "[1,2,3]").unwrap();
        assert_eq!(
            QuotaLedger::load(&store, 1, day(16)),
            QuotaLedger::fresh(1, day(16))
        );
    }

    #[test]
    fn save_writes_date_and_slots() {
        let store = MemoryStore::new();
        let mut ledger = QuotaLedger::fresh(2, day(16));
        ledger.record(1, 3);
        ledger.save(&store).unwrap();

        let raw = store.get(COUNTS_KEY).unwrap().unwrap();
        let v: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(v["date"], "2026-10-16");
        assert_eq!(v["api0"], 0);
        assert_eq!(v["api1"], 3);

        let reloaded = QuotaLedger::load(&store, 2, day(16));
        assert_eq!(reloaded.used(1), 3);
    }
}
