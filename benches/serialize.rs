// benches/serialize.rs
use criterion::{criterion_group, criterion_main, Criterion, black_box};

use shop_ledger::{
    csv::{self, CsvOptions},
    record,
    sources::{cardmarket_products, CaptureContext, Source},
};

fn sample_records(n: usize) -> Vec<shop_ledger::record::Record> {
    (0..n)
        .map(|i| {
            cardmarket_products::SCHEMA.conform(&record! {
                "timestamp" => "2026-10-16T12:00:00+02:00",
                "id" => format!("{}", 700_000 + i),
                "name" => format!("Card \"{i}\", foil"),
                "expansion" => "Ixalan",
                "number" => format!("{}", i % 300),
                "rarity" => "Common",
                "availability" => (i % 97) as u32,
                "price" => 0.03 * i as f64,
            })
        })
        .collect()
}

fn synthetic_page(n: usize) -> String {
    let mut doc = String::from(r#"<div class="table-body">"#);
    for i in 0..n {
        doc.push_str(&format!(
            r#"<div id="productRow{id}" class="row g-0"><div class="col-10"><a href="/p/{id}">Card {i}</a></div><div class="col-icon"><a aria-label="Ixalan"></a></div><div class="col-availability"><span>{i}</span></div><div class="col-price">{i},50 €</div></div>"#,
            id = 700_000 + i,
        ));
    }
    doc.push_str("</div>");
    doc
}

fn bench_serialize(c: &mut Criterion) {
    let schema = &cardmarket_products::SCHEMA;
    let records = sample_records(5_000);
    let (header, order) = (schema.headers(), schema.field_order());

    c.bench_function("serialize_5k_comma", |b| {
        b.iter(|| csv::serialize(&header, black_box(&records), &order, &CsvOptions::default()).len())
    });

    let semi = CsvOptions { delimiter: ';', bom: true };
    c.bench_function("serialize_5k_semicolon_bom", |b| {
        b.iter(|| csv::serialize(&header, black_box(&records), &order, &semi).len())
    });
}

fn bench_extract(c: &mut Criterion) {
    let doc = synthetic_page(500);
    let ctx = CaptureContext::new("/bench");

    c.bench_function("extract_products_500", |b| {
        b.iter(|| cardmarket_products::SOURCE.extract(black_box(&doc), &ctx).records.len())
    });
}

criterion_group!(benches, bench_serialize, bench_extract);
criterion_main!(benches);
