// src/sources/cardmarket_products.rs
//! Cardmarket product listing → price history.
//!
//! Page: `/{lang}/{game}/Products/...` listing. Each product is a
//! `<div id="productRow{ID}">` inside `.table-body` with:
//! - name: first `<a>` in `.col-10`
//! - expansion: `aria-label` of the `<a>` in `.col-icon.small`
//! - number: first `<div>` in `.col-md-2`
//! - rarity: `aria-label` of the `<svg>` in `.col-sm-2`
//! - availability: `<span>` in `.col-availability`
//! - price: text of `.col-price` ("0,03 €")
//!
//! Every capture appends a full snapshot (no dedup): the ledger is a
//! price history, so the same product on another day is a new data point.

use crate::core::html;
use crate::record::{Fallback, Field, Record, Schema};

use super::{CaptureContext, Extraction, Source, parse_price, row_chunks};

const ROW_ID_PREFIX: &str = "productRow";
const TABLE_BODY_CLASS: &str = "table-body";

static FIELDS: &[Field] = &[
    Field::text("timestamp", "Timestamp"),
    Field::text("id", "ID"),
    Field::text("name", "Name"),
    Field::text("expansion", "Expansion").or(Fallback::Text("Unknown")),
    Field::text("number", "Number"),
    Field::text("rarity", "Rarity").or(Fallback::Text("Unknown")),
    Field::number("availability", "Availability"),
    Field::number("price", "Price"),
];

pub static SCHEMA: Schema = Schema { namespace: "cm_price_history", fields: FIELDS };

pub struct CardmarketProducts;
pub static SOURCE: CardmarketProducts = CardmarketProducts;

impl Source for CardmarketProducts {
    fn id(&self) -> &'static str { "cardmarket-products" }
    fn label(&self) -> &'static str { "Cardmarket prices" }
    fn schema(&self) -> &'static Schema { &SCHEMA }

    fn extract(&self, doc: &str, ctx: &CaptureContext) -> Extraction {
        let mut out = Extraction::default();
        let timestamp = ctx.now.to_rfc3339();

        let starts = row_starts(doc);
        for (index, chunk) in row_chunks(doc, &starts).into_iter().enumerate() {
            match parse_row(chunk) {
                Ok(mut record) => {
                    record.set("timestamp", timestamp.as_str());
                    out.records.push(SCHEMA.conform(&record));
                }
                Err(reason) => out.fail(self.id(), index, reason),
            }
        }
        logd!("Extract[{}]: rows={} failed={}", self.id(), out.records.len(), out.failures.len());
        out
    }
}

/// `div[id^=productRow]` openers inside a `.table-body`.
fn row_starts(doc: &str) -> Vec<usize> {
    let mut starts = Vec::new();
    let mut pos = 0;
    while let Some(body) = html::find_class(doc, pos, None, TABLE_BODY_CLASS) {
        let (a, b) = html::inner_range(doc, &body);
        pos = b.max(body.end);
        let table = &doc[..b];
        let mut rpos = a;
        while let Some(tag) = html::next_tag(table, rpos) {
            rpos = tag.end;
            if tag.closing || !tag.is("div") { continue; }
            if tag.attr("id").is_some_and(|id| id.starts_with(ROW_ID_PREFIX)) {
                starts.push(tag.start);
            }
        }
    }
    starts
}

/// Text of the first `inner` tag inside the first element with `class`.
fn text_in(chunk: &str, class: &str, inner: &str) -> Option<String> {
    let scope = class_scope(chunk, class)?;
    let tag = html::find_tag(scope, 0, inner)?;
    Some(html::element_text(scope, &tag)).filter(|t| !t.is_empty())
}

/// Attribute of the first `inner` tag inside the first element with `class`.
fn attr_in(chunk: &str, class: &str, inner: &str, attr: &str) -> Option<String> {
    let scope = class_scope(chunk, class)?;
    html::find_tag(scope, 0, inner)?.attr(attr).filter(|v| !v.trim().is_empty())
}

/// Inner HTML of the first element carrying every class token in `class`
/// ("col-icon small" means both tokens).
fn class_scope<'a>(chunk: &'a str, class: &str) -> Option<&'a str> {
    let mut tokens = class.split_whitespace();
    let first = tokens.next()?;
    let rest: Vec<&str> = tokens.collect();

    let mut pos = 0;
    while let Some(tag) = html::find_class(chunk, pos, None, first) {
        pos = tag.end;
        if rest.iter().all(|t| tag.has_class(t)) {
            return Some(html::inner_html(chunk, &tag));
        }
    }
    None
}

fn parse_row(chunk: &str) -> Result<Record, String> {
    let open = html::next_tag(chunk, 0).ok_or("row has no opener")?;
    // only look inside the row element; the chunk of the last row runs on
    // into whatever follows the table
    let row = html::inner_html(chunk, &open);
    let id = open
        .attr("id")
        .and_then(|id| id.strip_prefix(ROW_ID_PREFIX).map(str::to_string))
        .filter(|id| !id.trim().is_empty())
        .ok_or("row id is missing")?;

    let mut r = Record::new();
    r.set("id", id.trim());

    let name = class_scope(row, "col-10").and_then(|scope| {
        // `.col-10 .d-flex a` first, any `a` in `.col-10` otherwise
        class_scope(scope, "d-flex")
            .and_then(|inner| html::find_tag(inner, 0, "a").map(|a| html::element_text(inner, &a)))
            .or_else(|| html::find_tag(scope, 0, "a").map(|a| html::element_text(scope, &a)))
    });
    if let Some(name) = name.filter(|n| !n.is_empty()) {
        r.set("name", name);
    }
    if let Some(exp) = attr_in(row, "col-icon small", "a", "aria-label") {
        r.set("expansion", exp);
    }
    if let Some(number) = text_in(row, "col-md-2", "div") {
        r.set("number", number);
    }
    if let Some(rarity) = attr_in(row, "col-sm-2", "svg", "aria-label") {
        r.set("rarity", rarity);
    }
    if let Some(avail) = text_in(row, "col-availability", "span") {
        let digits: String = avail.chars().take_while(|c| c.is_ascii_digit()).collect();
        if let Ok(n) = digits.parse::<u32>() {
            r.set("availability", n);
        }
    }
    if let Some(price) = class_scope(row, "col-price")
        .map(html::text_of)
        .and_then(|t| parse_price(&t))
    {
        r.set("price", price);
    }
    Ok(r)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Value;

    const PAGE: &str = r#"
<div class="table-body">
  <div id="productRow751234" class="row g-0">
    <div class="col-10"><div class="d-flex"><a href="/en/Magic/Products/Singles/X/Opt">Opt</a></div></div>
    <div class="col-icon small"><a href="/x" aria-label="Ixalan"><span class="icon"></span></a></div>
    <div class="col-md-2"><div>65</div></div>
    <div class="col-sm-2"><svg aria-label="Common" class="rarity"></svg></div>
    <div class="col-availability"><span>1234</span></div>
    <div class="col-price pe-sm-2">0,03 €</div>
  </div>
  <div id="productRow" class="row g-0"><div class="col-10"><a>Broken</a></div></div>
  <div id="productRow99" class="row g-0">
    <div class="col-10"><a href="/y">Ral&#39;s &quot;Outburst&quot;</a></div>
    <div class="col-price">1.234,50 €</div>
  </div>
</div>"#;

    fn ctx() -> CaptureContext {
        CaptureContext::new("/en/Magic/Products/Singles/Ixalan")
    }

    #[test]
    fn reads_full_row() {
        let ex = SOURCE.extract(PAGE, &ctx());
        let r = &ex.records[0];
        assert_eq!(r.cell("id"), "751234");
        assert_eq!(r.cell("name"), "Opt");
        assert_eq!(r.cell("expansion"), "Ixalan");
        assert_eq!(r.cell("number"), "65");
        assert_eq!(r.cell("rarity"), "Common");
        assert_eq!(r.get("availability"), Some(&Value::Number(1234.0)));
        assert_eq!(r.get("price"), Some(&Value::Number(0.03)));
        assert!(!r.cell("timestamp").is_empty());
    }

    #[test]
    fn row_without_id_is_skipped_not_fatal() {
        let ex = SOURCE.extract(PAGE, &ctx());
        assert_eq!(ex.records.len(), 2);
        assert_eq!(ex.failures.len(), 1);
        assert_eq!(ex.failures[0].index, 1);
    }

    #[test]
    fn missing_fields_take_fallbacks() {
        let ex = SOURCE.extract(PAGE, &ctx());
        let r = &ex.records[1];
        assert_eq!(r.cell("name"), "Ral's \"Outburst\"");
        assert_eq!(r.cell("expansion"), "Unknown");
        assert_eq!(r.cell("rarity"), "Unknown");
        assert_eq!(r.cell("number"), "");
        assert_eq!(r.get("availability"), Some(&Value::Number(0.0)));
        assert_eq!(r.get("price"), Some(&Value::Number(1234.5)));
    }

    #[test]
    fn last_row_does_not_read_page_chrome() {
        let doc = r#"
<div class="table-body">
  <div id="productRow42" class="row g-0">
    <div class="col-10"><a href="/p">Opt</a></div>
    <div class="col-price">0,10 €</div>
  </div>
</div>
<footer>
  <div class="col-md-2"><div>Help center</div></div>
  <div class="col-sm-2"><svg aria-label="Logo"/></div>
  <div class="col-availability"><span>99</span></div>
</footer>"#;
        let ex = SOURCE.extract(doc, &ctx());
        assert_eq!(ex.records.len(), 1);
        let r = &ex.records[0];
        assert_eq!(r.cell("name"), "Opt");
        assert_eq!(r.cell("number"), "");
        assert_eq!(r.cell("rarity"), "Unknown");
        assert_eq!(r.get("availability"), Some(&Value::Number(0.0)));
        assert_eq!(r.get("price"), Some(&Value::Number(0.1)));
    }

    #[test]
    fn rows_outside_the_table_body_are_ignored() {
        let doc = r#"<div id="productRowSidebar"><div class="col-10"><a>Ad</a></div></div>
<div class="table-body"><div id="productRow7"><div class="col-10"><a>Opt</a></div></div></div>"#;
        let ex = SOURCE.extract(doc, &ctx());
        assert_eq!(ex.records.len(), 1);
        assert_eq!(ex.records[0].cell("id"), "7");
        assert!(ex.failures.is_empty());
    }

    #[test]
    fn page_without_rows_is_empty() {
        let ex = SOURCE.extract("<html><body>Nothing</body></html>", &ctx());
        assert!(ex.records.is_empty() && ex.failures.is_empty());
    }
}
