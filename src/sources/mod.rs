// src/sources/mod.rs
//! # Sources
//!
//! One module per shop page we know how to read. A source owns:
//! - its **schema** (ordered typed fields, which also names the ledger namespace),
//! - the **extraction** from a saved HTML snapshot of the page,
//! - its **dedup key**, if repeated captures should not repeat rows,
//! - any **export defaults** the page's consumers expect (delimiter, BOM).
//!
//! Extraction is tolerant by contract: a missing field becomes the schema
//! fallback, a row that cannot be identified is skipped and reported in
//! `Extraction::failures`, and the rest of the page is still read. Nothing
//! here persists or exports; `capture` decides what to do with the rows.

use chrono::{DateTime, Local};

use crate::config::options::ExportOptions;
use crate::record::{Record, Schema};

pub mod cardmarket_order;
pub mod cardmarket_products;
pub mod wallapop_sales;

/// Everything a source may need besides the document itself.
#[derive(Clone, Debug)]
pub struct CaptureContext {
    /// Distinguishes independently tracked views (path + query of the page)
    pub scope_key: String,
    /// Capture time; stamped on records that carry a timestamp
    pub now: DateTime<Local>,
}

impl CaptureContext {
    pub fn new(scope_key: impl Into<String>) -> Self {
        Self { scope_key: scope_key.into(), now: Local::now() }
    }

    pub fn at(scope_key: impl Into<String>, now: DateTime<Local>) -> Self {
        Self { scope_key: scope_key.into(), now }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowFailure {
    /// Position of the row among the page's candidate rows
    pub index: usize,
    pub reason: String,
}

#[derive(Clone, Debug, Default)]
pub struct Extraction {
    pub records: Vec<Record>,
    pub failures: Vec<RowFailure>,
}

impl Extraction {
    pub(crate) fn fail(&mut self, source: &str, index: usize, reason: impl Into<String>) {
        let reason = reason.into();
        logw!("Extract[{source}]: row {index} skipped: {reason}");
        self.failures.push(RowFailure { index, reason });
    }
}

pub trait Source: Send + Sync + 'static {
    /// Stable id used on the command line (`cardmarket-products`, …)
    fn id(&self) -> &'static str;
    fn label(&self) -> &'static str;
    fn schema(&self) -> &'static Schema;

    fn namespace(&self) -> &'static str {
        self.schema().namespace
    }

    /// Read every record the snapshot holds. Records come back conformed
    /// to `schema()`.
    fn extract(&self, doc: &str, ctx: &CaptureContext) -> Extraction;

    /// Identity used by `Ledger::append_deduped`; `None` means plain append.
    fn dedup_key(&self, _record: &Record) -> Option<String> {
        None
    }

    /// Adjust export defaults for this source's consumers.
    fn export_defaults(&self, _export: &mut ExportOptions) {}

    /// Optional identity for the export file name (e.g. an order number).
    fn scope_identity(&self, _records: &[Record]) -> Option<String> {
        None
    }
}

static SOURCES: &[&dyn Source] = &[
    &cardmarket_products::SOURCE,
    &wallapop_sales::SOURCE,
    &cardmarket_order::SOURCE,
];

pub fn all() -> &'static [&'static dyn Source] {
    SOURCES
}

pub fn by_id(id: &str) -> Option<&'static dyn Source> {
    SOURCES.iter().copied().find(|s| s.id().eq_ignore_ascii_case(id.trim()))
}

/* ---------------- shared helpers ---------------- */

/// Slice `doc` into candidate rows, one per start offset. A row runs to the
/// next row start (or the end of the document).
pub(crate) fn row_chunks<'a>(doc: &'a str, starts: &[usize]) -> Vec<&'a str> {
    starts
        .iter()
        .enumerate()
        .map(|(i, &s)| {
            let end = starts.get(i + 1).copied().unwrap_or(doc.len());
            &doc[s..end]
        })
        .collect()
}

/// "0,03 €" → 0.03, "1.234,50 €" → 1234.5, "1.234 €" → 1234, "12.50 $" → 12.5.
/// Returns `None` when there is no digit at all.
pub fn parse_price(text: &str) -> Option<f64> {
    let kept: String = text.chars().filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.').collect();
    if !kept.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    let normalized = match (kept.rfind(','), kept.rfind('.')) {
        // both present: the later one is the decimal mark
        (Some(c), Some(d)) if c > d => kept.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => kept.replace(',', ""),
        (Some(_), None) => kept.replace(',', "."),
        // "1.234 €", "1.234.567": dots grouping thousands
        (None, Some(d)) if kept.matches('.').count() > 1 || kept.len() - d - 1 == 3 => kept.replace('.', ""),
        _ => kept,
    };
    normalized.trim_matches('.').parse::<f64>().ok()
}
