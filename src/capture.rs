// src/capture.rs
//! Capture pipeline: page snapshot → records → ledger.
//!
//! ```text
//! frontend ─ doc text ─▶ capture() ─▶ Source::extract ─▶ Ledger::append[_deduped]
//!                            │                                   │
//!                            └── once-per-day gate      mark scope + save
//! ```
//! The document is handed over once it is complete; nothing here waits
//! for or polls the page.

use crate::config::options::CaptureOptions;
use crate::csv::parse_rows;
use crate::ledger::Ledger;
use crate::progress::Progress;
use crate::record::{Record, Schema};
use crate::sources::{CaptureContext, RowFailure, Source};
use crate::store::KvStore;

#[derive(Clone, Debug, PartialEq)]
pub enum CaptureOutcome {
    /// This scope was already captured today and `once_per_day` is on
    Skipped { scope_key: String },
    /// The page held no records; nothing was stored
    Empty { failures: Vec<RowFailure> },
    Captured {
        extracted: usize,
        appended: usize,
        failures: Vec<RowFailure>,
        total: usize,
    },
}

impl CaptureOutcome {
    /// One line for a status bar or terminal.
    pub fn summary(&self) -> String {
        match self {
            CaptureOutcome::Skipped { scope_key } => {
                format!("Already captured today for '{scope_key}', skipped")
            }
            CaptureOutcome::Empty { failures } if failures.is_empty() => {
                s!("No records found on this page")
            }
            CaptureOutcome::Empty { failures } => {
                format!("No records found on this page ({} row(s) unreadable)", failures.len())
            }
            CaptureOutcome::Captured { extracted, appended, failures, total } => {
                let mut msg = format!("Captured {appended} of {extracted} item(s). Total history: {total} record(s)");
                if !failures.is_empty() {
                    msg.push_str(&format!(", {} row(s) skipped", failures.len()));
                }
                msg
            }
        }
    }
}

pub fn capture<S: KvStore>(
    source: &dyn Source,
    doc: &str,
    ledger: &mut Ledger<S>,
    ctx: &CaptureContext,
    opts: &CaptureOptions,
    mut progress: Option<&mut dyn Progress>,
) -> CaptureOutcome {
    let today = ctx.now.date_naive();

    if opts.once_per_day && ledger.has_scope_run_on(&ctx.scope_key, today) {
        logf!("Capture[{}]: scope '{}' already ran {}, skipping", source.id(), ctx.scope_key, today);
        if let Some(p) = progress.as_deref_mut() {
            p.log("Already captured today");
        }
        return CaptureOutcome::Skipped { scope_key: ctx.scope_key.clone() };
    }

    if let Some(p) = progress.as_deref_mut() {
        p.log("Reading page…");
    }
    let extraction = source.extract(doc, ctx);
    let extracted = extraction.records.len();

    if extracted == 0 {
        logf!("Capture[{}]: nothing extracted (failed rows={})", source.id(), extraction.failures.len());
        if let Some(p) = progress.as_deref_mut() {
            p.finish();
        }
        return CaptureOutcome::Empty { failures: extraction.failures };
    }

    if let Some(p) = progress.as_deref_mut() {
        p.begin(extracted);
    }

    let appended = if opts.dedupe && extraction.records.first().is_some_and(|r| source.dedup_key(r).is_some()) {
        ledger.append_deduped(extraction.records, |r| source.dedup_key(r).unwrap_or_default())
    } else {
        ledger.append(extraction.records);
        extracted
    };

    ledger.mark_scope_run(&ctx.scope_key, today);
    ledger.save();

    if let Some(p) = progress.as_deref_mut() {
        p.item_done(appended);
        p.finish();
    }

    logf!(
        "Capture[{}]: scope='{}' extracted={} appended={} failed={} total={}",
        source.id(), ctx.scope_key, extracted, appended, extraction.failures.len(), ledger.len()
    );

    CaptureOutcome::Captured {
        extracted,
        appended,
        failures: extraction.failures,
        total: ledger.len(),
    }
}

/// Read a previously exported CSV back into schema-shaped records.
/// Columns are matched to fields by header text (or field name);
/// unknown columns are ignored, missing ones take their fallback.
pub fn import_csv(schema: &Schema, text: &str, delimiter: char) -> Vec<Record> {
    let mut rows = parse_rows(text, delimiter).into_iter();
    let Some(header) = rows.next() else { return Vec::new() };

    let columns: Vec<Option<&'static str>> = header
        .iter()
        .map(|h| {
            let h = h.trim();
            schema
                .fields
                .iter()
                .find(|f| f.header.eq_ignore_ascii_case(h) || f.name.eq_ignore_ascii_case(h))
                .map(|f| f.name)
        })
        .collect();

    rows.map(|row| {
        let mut r = Record::new();
        for (cell, column) in row.into_iter().zip(&columns) {
            if let Some(name) = column {
                r.set(*name, cell);
            }
        }
        schema.conform(&r)
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NullProgress;
    use crate::sources::wallapop_sales;
    use crate::store::MemoryStore;
    use chrono::{Local, TimeZone};

    const PAGE: &str = r#"
<div class="HistoricElement"><div class="HistoricElement__title"><div>X</div></div>
  <span class="HistoricElement__money-amount">5 €</span></div>"#;

    fn ctx(day: u32) -> CaptureContext {
        let now = Local.with_ymd_and_hms(2026, 10, day, 12, 0, 0).unwrap();
        CaptureContext::at("/app/purchases", now)
    }

    #[test]
    fn repeated_capture_is_deduped() {
        let mut ledger = Ledger::new(MemoryStore::new(), wallapop_sales::SCHEMA.namespace);
        let opts = CaptureOptions::default();
        let first = capture(&wallapop_sales::SOURCE, PAGE, &mut ledger, &ctx(16), &opts, None);
        assert!(matches!(first, CaptureOutcome::Captured { appended: 1, total: 1, .. }));
        let again = capture(&wallapop_sales::SOURCE, PAGE, &mut ledger, &ctx(16), &opts, Some(&mut NullProgress));
        assert!(matches!(again, CaptureOutcome::Captured { appended: 0, total: 1, .. }));
    }

    #[test]
    fn once_per_day_gate() {
        let mut ledger = Ledger::new(MemoryStore::new(), "g");
        let opts = CaptureOptions { once_per_day: true, dedupe: false, ..Default::default() };
        let src = &wallapop_sales::SOURCE;
        assert!(matches!(capture(src, PAGE, &mut ledger, &ctx(16), &opts, None), CaptureOutcome::Captured { .. }));
        assert!(matches!(capture(src, PAGE, &mut ledger, &ctx(16), &opts, None), CaptureOutcome::Skipped { .. }));
        assert!(matches!(capture(src, PAGE, &mut ledger, &ctx(17), &opts, None), CaptureOutcome::Captured { .. }));
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn without_dedupe_every_row_is_appended() {
        let mut ledger = Ledger::new(MemoryStore::new(), wallapop_sales::SCHEMA.namespace);
        let opts = CaptureOptions { dedupe: false, ..Default::default() };
        capture(&wallapop_sales::SOURCE, PAGE, &mut ledger, &ctx(16), &opts, None);
        let again = capture(&wallapop_sales::SOURCE, PAGE, &mut ledger, &ctx(16), &opts, None);
        assert!(matches!(again, CaptureOutcome::Captured { appended: 1, total: 2, .. }));
    }

    #[test]
    fn empty_page_stores_nothing() {
        let mut ledger = Ledger::new(MemoryStore::new(), "e");
        let out = capture(&wallapop_sales::SOURCE, "<html></html>", &mut ledger, &ctx(16), &CaptureOptions::default(), None);
        assert_eq!(out, CaptureOutcome::Empty { failures: Vec::new() });
        assert!(!ledger.has_scope_run_on("/app/purchases", ctx(16).now.date_naive()));
        assert_eq!(ledger.store().len(), 0);
    }

    #[test]
    fn import_maps_headers_and_ignores_unknown_columns() {
        let text = "Price,Title,Extra\n5 €,\"A, b\",zzz\n";
        let records = import_csv(&wallapop_sales::SCHEMA, text, ',');
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].cell("title"), "A, b");
        assert_eq!(records[0].cell("price"), "5 €");
        assert_eq!(records[0].cell("shipping"), "");
    }
}
