// src/sources/wallapop_sales.rs
//! Wallapop purchase/sale history (`tsl-historic-element .HistoricElement`).
//!
//! Entry layout:
//! - title: first `<div>` in `.HistoricElement__title`
//! - price: `.HistoricElement__money-amount`
//! - status + date: `.HistoricElement__subDescription` ("Completada el 23 mar.")
//! - shipping type: 2nd child of `.HistoricElement__description`, if a `<span>`
//!
//! The history page re-lists old entries on every visit, so appends are
//! deduped on title + price + status/date.

use crate::core::html;
use crate::record::{Field, Record, Schema};

use super::{CaptureContext, Extraction, Source, row_chunks};

const ENTRY_CLASS: &str = "HistoricElement";

static FIELDS: &[Field] = &[
    Field::text("title", "Title"),
    Field::text("price", "Price"),
    Field::text("status_date", "Status and date"),
    Field::text("shipping", "Shipping type"),
];

pub static SCHEMA: Schema = Schema { namespace: "wallapop_sales", fields: FIELDS };

pub struct WallapopSales;
pub static SOURCE: WallapopSales = WallapopSales;

impl Source for WallapopSales {
    fn id(&self) -> &'static str { "wallapop-sales" }
    fn label(&self) -> &'static str { "Wallapop history" }
    fn schema(&self) -> &'static Schema { &SCHEMA }

    fn extract(&self, doc: &str, _ctx: &CaptureContext) -> Extraction {
        let mut out = Extraction::default();

        let mut starts = Vec::new();
        let mut pos = 0;
        while let Some(tag) = html::find_class(doc, pos, None, ENTRY_CLASS) {
            pos = tag.end;
            starts.push(tag.start);
        }

        for (index, chunk) in row_chunks(doc, &starts).into_iter().enumerate() {
            let Some(open) = html::next_tag(chunk, 0) else { continue };
            let entry = html::inner_html(chunk, &open);
            match parse_entry(entry) {
                Some(record) => out.records.push(SCHEMA.conform(&record)),
                None => out.fail(self.id(), index, "entry has neither title nor price"),
            }
        }
        logd!("Extract[{}]: rows={} failed={}", self.id(), out.records.len(), out.failures.len());
        out
    }

    fn dedup_key(&self, record: &Record) -> Option<String> {
        Some(join!(
            &record.cell("title"), "\u{1f}",
            &record.cell("price"), "\u{1f}",
            &record.cell("status_date")
        ))
    }
}

fn part<'a>(entry: &'a str, suffix: &str) -> Option<&'a str> {
    let class = join!(ENTRY_CLASS, "__", suffix);
    let tag = html::find_class(entry, 0, None, &class)?;
    Some(html::inner_html(entry, &tag))
}

fn parse_entry(entry: &str) -> Option<Record> {
    let title = part(entry, "title")
        .and_then(|t| html::find_tag(t, 0, "div").map(|d| html::element_text(t, &d)))
        .unwrap_or_default();
    let price = part(entry, "money-amount").map(html::text_of).unwrap_or_default();
    if title.is_empty() && price.is_empty() {
        return None;
    }

    let mut r = Record::new();
    r.set("title", title);
    r.set("price", price);
    if let Some(sub) = part(entry, "subDescription") {
        r.set("status_date", html::text_of(sub));
    }
    let shipping = part(entry, "description").and_then(|d| {
        let kids = html::children(d);
        let second = kids.get(1).filter(|t| t.is("span"))?;
        Some(html::element_text(d, second))
    });
    if let Some(shipping) = shipping {
        r.set("shipping", shipping);
    }
    Some(r)
}
