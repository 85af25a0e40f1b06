// src/sources/cardmarket_order.rs
//! Cardmarket order detail page (`/{lang}/{game}/Orders/{id}`).
//!
//! One record per article row (`table.product-table tr[data-article-id]`),
//! with the order number and seller repeated on each row so the ledger
//! stays a flat table. Order number comes from the page title
//! (`h1.text-break`, "Order #1234" / "Compra #1234"), seller from
//! `#SellerBuyerInfo .seller-name a[href*="/Users/"]`.
//!
//! Exports default to `;` + BOM: spreadsheet apps in comma-decimal locales
//! open that without an import dialog.

use crate::config::options::{Delim, ExportOptions};
use crate::core::html::{self, Tag};
use crate::record::{Field, Record, Schema};

use super::{CaptureContext, Extraction, Source, parse_price, row_chunks};

static FIELDS: &[Field] = &[
    Field::text("order_id", "OrderID"),
    Field::text("seller", "SellerUsername"),
    Field::text("article_id", "ArticleID"),
    Field::number("quantity", "Quantity"),
    Field::text("name", "Name"),
    Field::number("price", "Price"),
];

pub static SCHEMA: Schema = Schema { namespace: "cm_orders", fields: FIELDS };

pub struct CardmarketOrder;
pub static SOURCE: CardmarketOrder = CardmarketOrder;

impl Source for CardmarketOrder {
    fn id(&self) -> &'static str { "cardmarket-order" }
    fn label(&self) -> &'static str { "Cardmarket order" }
    fn schema(&self) -> &'static Schema { &SCHEMA }

    fn extract(&self, doc: &str, _ctx: &CaptureContext) -> Extraction {
        let mut out = Extraction::default();

        let order_id = order_id(doc).unwrap_or_default();
        let seller = seller(doc).unwrap_or_default();
        if order_id.is_empty() {
            logw!("Extract[{}]: order number not found on page", self.id());
        }

        let mut starts = Vec::new();
        let mut pos = 0;
        while let Some(table) = html::find_class(doc, pos, Some("table"), "product-table") {
            let (a, b) = html::inner_range(doc, &table);
            pos = b.max(table.end);
            let mut rpos = a;
            while let Some(tr) = html::find_tag(&doc[..b], rpos, "tr") {
                rpos = tr.end;
                if tr.attr("data-article-id").is_some() {
                    starts.push(tr.start);
                }
            }
        }

        for (index, chunk) in row_chunks(doc, &starts).into_iter().enumerate() {
            let Some(tr) = html::next_tag(chunk, 0) else { continue };
            match parse_article(chunk, &tr) {
                Ok(mut record) => {
                    record.set("order_id", order_id.as_str());
                    record.set("seller", seller.as_str());
                    out.records.push(SCHEMA.conform(&record));
                }
                Err(reason) => out.fail(self.id(), index, reason),
            }
        }
        logd!("Extract[{}]: order={} rows={} failed={}",
            self.id(), order_id, out.records.len(), out.failures.len());
        out
    }

    fn dedup_key(&self, record: &Record) -> Option<String> {
        Some(join!(&record.cell("order_id"), "\u{1f}", &record.cell("article_id")))
    }

    fn export_defaults(&self, export: &mut ExportOptions) {
        export.delimiter = Delim::Semicolon;
        export.bom = true;
    }

    /// The order number, when every record belongs to the same order.
    fn scope_identity(&self, records: &[Record]) -> Option<String> {
        let first = records.first()?.cell("order_id");
        if first.is_empty() || records.iter().any(|r| r.cell("order_id") != first) {
            return None;
        }
        Some(first)
    }
}

fn order_id(doc: &str) -> Option<String> {
    let h1 = html::find_class(doc, 0, Some("h1"), "text-break").or_else(|| {
        let container = html::find_class(doc, 0, Some("div"), "page-title-container")?;
        let (a, _) = html::inner_range(doc, &container);
        html::find_tag(doc, a, "h1")
    })?;
    let title = html::element_text(doc, &h1);
    // "Order #1234567", "Compra #1234567", or just "#1234567"
    let after_hash = title.rsplit('#').next()?.trim();
    let id: String = after_hash.chars().take_while(|c| !c.is_whitespace()).collect();
    Some(id).filter(|s| !s.is_empty())
}

fn seller(doc: &str) -> Option<String> {
    let mut pos = 0;
    let info = loop {
        let tag = html::next_tag(doc, pos)?;
        pos = tag.end;
        if !tag.closing && tag.attr("id").as_deref() == Some("SellerBuyerInfo") {
            break tag;
        }
    };
    let info = html::inner_html(doc, &info);
    let name_box = html::find_class(info, 0, None, "seller-name")?;
    let name_box = html::inner_html(info, &name_box);

    let mut pos = 0;
    while let Some(a) = html::find_tag(name_box, pos, "a") {
        pos = a.end;
        if a.attr("href").is_some_and(|h| h.contains("/Users/")) {
            return Some(html::element_text(name_box, &a)).filter(|s| !s.is_empty());
        }
    }
    None
}

fn cell_with_class<'a>(row: &'a str, class: &str) -> Option<&'a str> {
    let td = html::find_class(row, 0, Some("td"), class)?;
    Some(html::inner_html(row, &td))
}

fn parse_article(chunk: &str, tr: &Tag<'_>) -> Result<Record, String> {
    let article_id = tr
        .attr("data-article-id")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or("article id is empty")?;
    let row = html::inner_html(chunk, tr);

    let mut r = Record::new();
    r.set("article_id", article_id);

    if let Some(amount) = cell_with_class(row, "amount") {
        let digits: String = html::text_of(amount).chars().filter(|c| c.is_ascii_digit()).collect();
        if let Ok(n) = digits.parse::<u32>() {
            r.set("quantity", n);
        }
    }
    if let Some(name_cell) = cell_with_class(row, "name") {
        let name = html::find_tag(name_cell, 0, "a")
            .map(|a| html::element_text(name_cell, &a))
            .unwrap_or_else(|| html::text_of(name_cell));
        r.set("name", name);
    }
    if let Some(price) = cell_with_class(row, "price").and_then(|p| parse_price(&html::text_of(p))) {
        r.set("price", price);
    }
    Ok(r)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Value;

    const PAGE: &str = r#"
<div class="page-title-container"><h1 class="text-break">Order #1234567</h1></div>
<div id="SellerBuyerInfo">
  <span class="seller-name"><a href="/en/Magic/Users/CardShop">CardShop</a></span>
</div>
<table class="table product-table">
  <thead><tr><th>Qty</th></tr></thead>
  <tbody>
    <tr data-article-id="9001"><td class="amount">2x</td><td class="name"><a href="/p">Lightning Bolt</a></td><td class="price">0,25 €</td></tr>
    <tr data-article-id=""><td class="amount">1x</td></tr>
    <tr data-article-id="9002"><td class="amount">1x</td><td class="name"><a>Island; foil</a></td><td class="price">1,10 €</td></tr>
  </tbody>
</table>"#;

    fn ctx() -> CaptureContext { CaptureContext::new("/en/Magic/Orders/1234567") }

    #[test]
    fn reads_order_header_and_articles() {
        let ex = SOURCE.extract(PAGE, &ctx());
        assert_eq!(ex.records.len(), 2);
        let r = &ex.records[0];
        assert_eq!(r.cell("order_id"), "1234567");
        assert_eq!(r.cell("seller"), "CardShop");
        assert_eq!(r.cell("article_id"), "9001");
        assert_eq!(r.get("quantity"), Some(&Value::Number(2.0)));
        assert_eq!(r.cell("name"), "Lightning Bolt");
        assert_eq!(r.get("price"), Some(&Value::Number(0.25)));
        assert_eq!(ex.records[1].cell("name"), "Island; foil");
    }

    #[test]
    fn empty_article_id_is_skipped() {
        let ex = SOURCE.extract(PAGE, &ctx());
        assert_eq!(ex.failures.len(), 1);
        assert_eq!(ex.failures[0].index, 1);
    }

    #[test]
    fn scope_identity_is_the_shared_order_number() {
        let ex = SOURCE.extract(PAGE, &ctx());
        assert_eq!(SOURCE.scope_identity(&ex.records).as_deref(), Some("1234567"));
        let mixed = vec![record! { "order_id" => "1" }, record! { "order_id" => "2" }];
        assert_eq!(SOURCE.scope_identity(&mixed), None);
        assert_eq!(SOURCE.scope_identity(&[]), None);
    }

    #[test]
    fn spanish_title_and_export_defaults() {
        let doc = r#"<h1 class="text-break">Compra # 42</h1>"#;
        assert_eq!(order_id(doc).as_deref(), Some("42"));
        let mut export = ExportOptions::default();
        SOURCE.export_defaults(&mut export);
        assert_eq!(export.delim(), ';');
        assert!(export.bom);
    }
}
