// src/csv.rs
use std::mem::take;

use crate::config::consts::BOM;
use crate::config::options::ExportOptions;
use crate::core::sanitize::escape_cell;
use crate::ledger::Ledger;
use crate::record::{Record, Schema};
use crate::store::KvStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CsvOptions {
    pub delimiter: char,
    pub bom: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self { delimiter: ',', bom: false }
    }
}

impl From<&ExportOptions> for CsvOptions {
    fn from(export: &ExportOptions) -> Self {
        Self { delimiter: export.delim(), bom: export.bom }
    }
}

/* ---------------- Writing ---------------- */

fn write_row<'a, I>(out: &mut String, cells: I, sep: char)
where
    I: IntoIterator<Item = &'a str>,
{
    let mut first = true;
    for cell in cells {
        if !first { out.push(sep); } else { first = false; }
        out.push_str(&escape_cell(cell, sep));
    }
}

/// Header row, then one row per record in order, cells picked by `field_order`.
/// Rows are separated by a single `\n`; there is no trailing newline.
/// Missing fields render as empty cells.
pub fn serialize(
    header: &[String],
    records: &[Record],
    field_order: &[String],
    opts: &CsvOptions,
) -> String {
    let sep = opts.delimiter;
    let mut out = String::with_capacity(64 * (records.len() + 1));

    if opts.bom {
        out.push_str(BOM);
    }
    write_row(&mut out, header.iter().map(String::as_str), sep);

    for record in records {
        out.push('\n');
        let cells: Vec<String> = field_order.iter().map(|f| record.cell(f)).collect();
        write_row(&mut out, cells.iter().map(String::as_str), sep);
    }
    out
}

pub fn serialize_ledger<S: KvStore>(schema: &Schema, ledger: &Ledger<S>, opts: &CsvOptions) -> String {
    serialize(&schema.headers(), ledger.records(), &schema.field_order(), opts)
}

/* ---------------- Parsing ---------------- */

/// Minimal CSV parser (quotes + CRLF tolerant). A leading BOM is ignored.
pub fn parse_rows(text: &str, sep: char) -> Vec<Vec<String>> {
    let text = text.strip_prefix(BOM).unwrap_or(text);
    let mut rows = Vec::new();
    let mut field = s!();
    let mut row = Vec::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes {
                    if matches!(chars.peek(), Some('"')) {
                        chars.next(); // double-quote escape
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                } else {
                    in_quotes = true;
                }
            }
            c if c == sep && !in_quotes => {
                row.push(take(&mut field));
            }
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && matches!(chars.peek(), Some('\n')) { chars.next(); }
                row.push(take(&mut field));
                if !(row.len() == 1 && row[0].is_empty()) {
                    rows.push(take(&mut row));
                } else {
                    row.clear();
                }
            }
            _ => field.push(ch),
        }
    }

    // Flush any trailing field/row even if quotes were unterminated.
    row.push(field);
    if !(row.len() == 1 && row[0].is_empty()) {
        rows.push(row);
    }

    rows
}
