// src/core/sanitize.rs

/* ---------------- Scraped text ---------------- */

pub fn normalize_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&euro;", "€")
        .replace("&amp;", "&")
}

/// Collapse every whitespace run (line breaks included) into one space and trim.
pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space { out.push(' '); prev_space = true; }
        } else { out.push(ch); prev_space = false; }
    }
    out.trim().to_string()
}

/* ---------------- Delimited-text cells ---------------- */

/// Line breaks are kept (inside quotes) but unified to `\n`.
fn unify_line_breaks(s: &str) -> String {
    s.replace("\r\n", "\n").replace('\r', "\n")
}

fn needs_quotes(cell: &str, delim: char) -> bool {
    cell.contains(delim) || cell.contains('"') || cell.contains('\n')
}

/// Escape one cell: double embedded quotes, wrap in quotes when the cell
/// holds the delimiter, a quote or a line break. Total; never fails.
pub fn escape_cell(value: &str, delim: char) -> String {
    let cell = unify_line_breaks(value);
    if needs_quotes(&cell, delim) {
        join!("\"", &cell.replace('"', "\"\""), "\"")
    } else {
        cell
    }
}

/// Field sanitizer: absent value → empty cell.
pub fn sanitize(value: Option<&str>, delim: char) -> String {
    value.map(|v| escape_cell(v, delim)).unwrap_or_default()
}

/* ---------------- File names ---------------- */

/// Keep ASCII letters, digits and '-'; every other run becomes a single '_'.
/// Leading/trailing '_' are trimmed. May return an empty string.
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_us = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() || ch == '-' {
            out.push(ch);
            last_us = false;
        } else if !last_us {
            out.push('_');
            last_us = true;
        }
    }
    out.trim_matches('_').to_string()
}
