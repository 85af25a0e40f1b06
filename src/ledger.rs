// src/ledger.rs
//! Append-only, locally persisted history of captured records.
//!
//! Store layout (one `KvStore` shared by every namespace):
//! - `"{namespace}"` → `{"records":[ … ]}`
//! - `"{namespace}:scope:{YYYY-MM-DD}:{scope_key}"` → capture time (RFC 3339),
//!   one marker per (day, scope) pair.
//!
//! Persistence is fail-open: a corrupt file loads as an empty ledger, a
//! single unreadable record is skipped, and a failed save is logged and
//! dropped. Capturing must never
//! take the caller down with it.
//!
//! Growth is unbounded; only `reset` shrinks a ledger.

use std::collections::HashSet;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::consts::SCOPE_MARKER_TAG;
use crate::error::Result;
use crate::record::Record;
use crate::store::KvStore;

#[derive(Debug, Default, Serialize, Deserialize)]
struct Persisted {
    #[serde(default)]
    records: Vec<serde_json::Value>,
}

pub struct Ledger<S: KvStore> {
    namespace: String,
    records: Vec<Record>,
    store: S,
}

impl<S: KvStore> Ledger<S> {
    /// Empty ledger that has not touched the store yet.
    pub fn new(store: S, namespace: impl Into<String>) -> Self {
        Self { namespace: namespace.into(), records: Vec::new(), store }
    }

    /// Load `namespace` from `store`. Missing or corrupt → empty.
    pub fn load(store: S, namespace: impl Into<String>) -> Self {
        let mut ledger = Self::new(store, namespace);
        ledger.records = match ledger.store.get(&ledger.namespace) {
            Ok(Some(text)) => match serde_json::from_str::<Persisted>(&text) {
                Ok(p) => readable_records(&ledger.namespace, p.records),
                Err(e) => {
                    loge!("Ledger: '{}' is corrupt, starting empty ({})", ledger.namespace, e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                loge!("Ledger: read '{}' failed, starting empty ({})", ledger.namespace, e);
                Vec::new()
            }
        };
        logd!("Ledger: loaded '{}' (records={})", ledger.namespace, ledger.records.len());
        ledger
    }

    pub fn namespace(&self) -> &str { &self.namespace }
    pub fn records(&self) -> &[Record] { &self.records }
    pub fn len(&self) -> usize { self.records.len() }
    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    pub fn store(&self) -> &S { &self.store }
    pub fn into_store(self) -> S { self.store }

    /// Add records at the end, in the order given. No dedup.
    pub fn append<I: IntoIterator<Item = Record>>(&mut self, new_records: I) {
        self.records.extend(new_records);
    }

    /// Append only records whose key was not seen before, in the ledger or
    /// earlier in the same batch. Returns how many were appended.
    pub fn append_deduped<I, F>(&mut self, new_records: I, key_fn: F) -> usize
    where
        I: IntoIterator<Item = Record>,
        F: Fn(&Record) -> String,
    {
        let mut seen: HashSet<String> = self.records.iter().map(&key_fn).collect();
        let before = self.records.len();
        for record in new_records {
            if seen.insert(key_fn(&record)) {
                self.records.push(record);
            }
        }
        self.records.len() - before
    }

    pub fn try_save(&mut self) -> Result<()> {
        let body = serde_json::to_string(&PersistedRef { records: &self.records })?;
        self.store.set(&self.namespace, &body)?;
        Ok(())
    }

    /// Persist the whole sequence. Failures are logged, never returned.
    pub fn save(&mut self) {
        match self.try_save() {
            Ok(()) => logd!("Ledger: saved '{}' (records={})", self.namespace, self.records.len()),
            Err(e) => loge!("Ledger: save '{}' failed: {}", self.namespace, e),
        }
    }

    fn marker_prefix(&self) -> String {
        format!("{}:{SCOPE_MARKER_TAG}:", self.namespace)
    }

    fn marker_key(&self, scope_key: &str, date: NaiveDate) -> String {
        format!("{}{}:{}", self.marker_prefix(), date.format("%Y-%m-%d"), scope_key)
    }

    /// Record that a capture ran for `scope_key` on `date`. Fail-open.
    pub fn mark_scope_run(&mut self, scope_key: &str, date: NaiveDate) {
        let key = self.marker_key(scope_key, date);
        let stamp = Local::now().to_rfc3339();
        if let Err(e) = self.store.set(&key, &stamp) {
            loge!("Ledger: marking scope '{}' failed: {}", scope_key, e);
        }
    }

    pub fn has_scope_run_on(&self, scope_key: &str, date: NaiveDate) -> bool {
        match self.store.get(&self.marker_key(scope_key, date)) {
            Ok(v) => v.is_some(),
            Err(e) => {
                logw!("Ledger: reading scope marker '{}' failed: {}", scope_key, e);
                false
            }
        }
    }

    pub fn has_scope_run_today(&self, scope_key: &str) -> bool {
        self.has_scope_run_on(scope_key, Local::now().date_naive())
    }

    /// Drop every record and every scope marker of this namespace.
    /// Confirmation is the caller's job.
    pub fn reset(&mut self) {
        self.records.clear();
        if let Err(e) = self.store.remove(&self.namespace) {
            loge!("Ledger: reset '{}' could not remove records: {}", self.namespace, e);
        }
        match self.store.keys_with_prefix(&self.marker_prefix()) {
            Ok(keys) => {
                for key in keys {
                    if let Err(e) = self.store.remove(&key) {
                        loge!("Ledger: reset could not remove marker '{}': {}", key, e);
                    }
                }
            }
            Err(e) => loge!("Ledger: reset could not list markers: {}", e),
        }
        logf!("Ledger: reset '{}'", self.namespace);
    }
}

/// Unreadable entries are skipped one by one; the rest of the history stays.
fn readable_records(namespace: &str, raw: Vec<serde_json::Value>) -> Vec<Record> {
    raw.into_iter()
        .enumerate()
        .filter_map(|(i, entry)| match serde_json::from_value::<Record>(entry) {
            Ok(r) => Some(r),
            Err(e) => {
                logw!("Ledger: '{}' record {} unreadable, skipped ({})", namespace, i, e);
                None
            }
        })
        .collect()
}

#[derive(Serialize)]
struct PersistedRef<'a> {
    records: &'a [Record],
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LedgerError;
    use crate::store::MemoryStore;
    use std::io;

    struct ReadOnlyStore;

    impl KvStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> io::Result<Option<String>> { Ok(None) }
        fn set(&mut self, _key: &str, _value: &str) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
        }
        fn remove(&mut self, _key: &str) -> io::Result<()> { Ok(()) }
        fn keys_with_prefix(&self, _prefix: &str) -> io::Result<Vec<String>> { Ok(Vec::new()) }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    #[test]
    fn append_keeps_order() {
        let mut l = Ledger::new(MemoryStore::new(), "t");
        l.append([record! { "a" => 1 }, record! { "a" => 2 }]);
        l.append([record! { "a" => 3 }]);
        let seq: Vec<String> = l.records().iter().map(|r| r.cell("a")).collect();
        assert_eq!(seq, ["1", "2", "3"]);
    }

    #[test]
    fn deduped_counts_and_skips_batch_duplicates() {
        let mut l = Ledger::new(MemoryStore::new(), "t");
        let key = |r: &Record| r.cell("k");
        let n = l.append_deduped([record! { "k" => "x" }, record! { "k" => "x" }, record! { "k" => "y" }], key);
        assert_eq!(n, 2);
        assert_eq!(l.append_deduped([record! { "k" => "y" }], key), 0);
        assert_eq!(l.len(), 2);
    }

    #[test]
    fn corrupt_store_loads_empty_and_can_be_overwritten() {
        let mut store = MemoryStore::new();
        store.set("t", "{not json").unwrap();
        let mut l = Ledger::load(store, "t");
        assert!(l.is_empty());
        l.append([record! { "a" => 1 }]);
        l.save();
        let l2 = Ledger::load(l.into_store(), "t");
        assert_eq!(l2.len(), 1);
    }

    #[test]
    fn one_bad_record_does_not_drop_the_history() {
        let mut store = MemoryStore::new();
        store
            .set("t", r#"{"records":[{"a":1},"junk",{"a":2,"price":null},{"a":3}]}"#)
            .unwrap();
        let l = Ledger::load(store, "t");
        let seq: Vec<String> = l.records().iter().map(|r| r.cell("a")).collect();
        assert_eq!(seq, ["1", "2", "3"]);
        assert_eq!(l.records()[1].get("price"), None);
    }

    #[test]
    fn non_finite_number_survives_save_and_load() {
        let mut l = Ledger::new(MemoryStore::new(), "t");
        l.append([record! { "id" => "1", "price" => 3.5 }, record! { "id" => "2", "price" => f64::NAN }]);
        l.try_save().unwrap();
        let l2 = Ledger::load(l.into_store(), "t");
        assert_eq!(l2.len(), 2);
        assert_eq!(l2.records()[1].cell("id"), "2");
    }

    #[test]
    fn failed_write_is_reported_by_try_save_only() {
        let mut l = Ledger::new(ReadOnlyStore, "t");
        l.append([record! { "a" => 1 }]);
        assert!(matches!(l.try_save(), Err(LedgerError::Io(e)) if e.kind() == io::ErrorKind::PermissionDenied));
        l.save();
        assert_eq!(l.len(), 1);
    }

    #[test]
    fn missing_records_key_in_json_is_empty() {
        let mut store = MemoryStore::new();
        store.set("t", "{}").unwrap();
        assert!(Ledger::load(store, "t").is_empty());
    }

    #[test]
    fn markers_are_per_day_and_scope() {
        let mut l = Ledger::new(MemoryStore::new(), "t");
        assert!(!l.has_scope_run_on("pageA", day(16)));
        l.mark_scope_run("pageA", day(16));
        assert!(l.has_scope_run_on("pageA", day(16)));
        assert!(!l.has_scope_run_on("pageA", day(17)));
        assert!(!l.has_scope_run_on("pageB", day(16)));
    }

    #[test]
    fn reset_clears_records_and_markers_of_own_namespace_only() {
        let mut store = MemoryStore::new();
        store.set("other:scope:2026-10-16:x", "keep").unwrap();
        let mut l = Ledger::new(store, "t");
        l.append([record! { "a" => 1 }]);
        l.save();
        l.mark_scope_run("p", day(16));
        l.reset();
        assert!(l.is_empty());
        assert!(!l.has_scope_run_on("p", day(16)));
        let store = l.into_store();
        assert_eq!(store.get("t").unwrap(), None);
        assert_eq!(store.len(), 1);
    }
}
