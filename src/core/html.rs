// src/core/html.rs
//! Tolerant, hand-rolled scanning over saved page HTML.
//!
//! No DOM is built. Helpers walk tags left to right, match tag names and
//! class tokens case-insensitively, and pull out attribute values or the
//! flattened text of one element. Good enough for the handful of selectors
//! the sources need; not a general HTML parser.

use super::sanitize::{normalize_entities, normalize_ws};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr",
];

/// One tag as found in the document. `start` is the '<', `end` is one past '>'.
#[derive(Clone, Copy, Debug)]
pub struct Tag<'a> {
    pub start: usize,
    pub end: usize,
    pub name: &'a str,
    pub closing: bool,
    /// Full opener text between '<' and '>'
    pub raw: &'a str,
}

impl<'a> Tag<'a> {
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// `<x/>` or a void element (`<br>`, `<img>`, …): no inner content, no closer.
    pub fn self_closing(&self) -> bool {
        self.raw.trim_end().ends_with('/')
            || VOID_ELEMENTS.iter().any(|v| self.name.eq_ignore_ascii_case(v))
    }

    pub fn attr(&self, name: &str) -> Option<String> {
        attr(self.raw, name)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|c| c.split_whitespace().any(|t| t == class))
            .unwrap_or(false)
    }
}

pub fn find_ci(hay: &str, needle: &str, from: usize) -> Option<usize> {
    let lc = hay.get(from..)?.to_ascii_lowercase();
    lc.find(&needle.to_ascii_lowercase()).map(|p| p + from)
}

/// Next tag at or after `from`.
pub fn next_tag(doc: &str, from: usize) -> Option<Tag<'_>> {
    let bytes = doc.as_bytes();
    let mut i = from;
    loop {
        let lt = i + doc.get(i..)?.find('<')?;
        // comments: skip whole `<!-- ... -->`
        if doc[lt..].starts_with("<!--") {
            let close = doc[lt..].find("-->")? + lt + 3;
            i = close;
            continue;
        }
        let gt = lt + doc[lt..].find('>')?;
        let raw = &doc[lt + 1..gt];
        let trimmed = raw.trim_start();
        let (closing, body) = match trimmed.strip_prefix('/') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let name_len = body
            .bytes()
            .take_while(|b| b.is_ascii_alphanumeric() || *b == b'-' || *b == b'!')
            .count();
        if name_len == 0 {
            // stray '<' in text
            i = lt + 1;
            if i >= bytes.len() { return None; }
            continue;
        }
        return Some(Tag { start: lt, end: gt + 1, name: &body[..name_len], closing, raw });
    }
}

/// First opening tag (optionally of `tag_name`) carrying the class token `class`.
pub fn find_class<'a>(doc: &'a str, from: usize, tag_name: Option<&str>, class: &str) -> Option<Tag<'a>> {
    let mut pos = from;
    while let Some(tag) = next_tag(doc, pos) {
        pos = tag.end;
        if tag.closing { continue; }
        if let Some(name) = tag_name {
            if !tag.is(name) { continue; }
        }
        if tag.has_class(class) {
            return Some(tag);
        }
    }
    None
}

/// First opening tag named `tag_name` at or after `from`.
pub fn find_tag<'a>(doc: &'a str, from: usize, tag_name: &str) -> Option<Tag<'a>> {
    let mut pos = from;
    while let Some(tag) = next_tag(doc, pos) {
        pos = tag.end;
        if !tag.closing && tag.is(tag_name) {
            return Some(tag);
        }
    }
    None
}

/// Byte range of the element's inner HTML, honoring nesting of the same tag name.
/// Unterminated elements run to the end of `doc`.
pub fn inner_range(doc: &str, open: &Tag<'_>) -> (usize, usize) {
    if open.self_closing() {
        return (open.end, open.end);
    }
    let mut depth = 1usize;
    let mut pos = open.end;
    while let Some(tag) = next_tag(doc, pos) {
        pos = tag.end;
        if !tag.is(open.name) || tag.self_closing() { continue; }
        if tag.closing {
            depth -= 1;
            if depth == 0 {
                return (open.end, tag.start);
            }
        } else {
            depth += 1;
        }
    }
    (open.end, doc.len())
}

/// Direct child elements of a fragment (text nodes are ignored).
pub fn children(fragment: &str) -> Vec<Tag<'_>> {
    let mut out = Vec::new();
    let mut pos = 0;
    while let Some(tag) = next_tag(fragment, pos) {
        if tag.closing {
            pos = tag.end;
            continue;
        }
        let (_, inner_end) = inner_range(fragment, &tag);
        // skip past the child's own closing tag
        pos = next_tag(fragment, inner_end)
            .filter(|t| t.closing && t.start == inner_end)
            .map(|t| t.end)
            .unwrap_or(inner_end.max(tag.end));
        out.push(tag);
    }
    out
}

pub fn inner_html<'a>(doc: &'a str, open: &Tag<'_>) -> &'a str {
    let (a, b) = inner_range(doc, open);
    &doc[a..b]
}

/// Visible text of the element: tags stripped, entities decoded, whitespace collapsed.
pub fn element_text(doc: &str, open: &Tag<'_>) -> String {
    text_of(inner_html(doc, open))
}

pub fn text_of(fragment: &str) -> String {
    normalize_ws(&normalize_entities(&strip_tags(fragment)))
}

pub fn strip_tags<S: AsRef<str>>(s: S) -> String {
    let s = s.as_ref();

    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;

    for ch in s.chars() {
        match ch {
            // a tag boundary separates words (`<br>`, `</div><div>`)
            '<' => { in_tag = true; out.push(' '); }
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

/// Attribute value from an opener's raw text. Accepts `"…"`, `'…'` or bare values.
pub fn attr(raw: &str, name: &str) -> Option<String> {
    let lc = raw.to_ascii_lowercase();
    let want = name.to_ascii_lowercase();
    let mut from = 0usize;

    while let Some(rel) = lc[from..].find(&want) {
        let at = from + rel;
        from = at + want.len();

        // must be a whole attribute name
        let before_ok = at == 0 || lc.as_bytes()[at - 1].is_ascii_whitespace();
        if !before_ok { continue; }
        let rest = raw[from..].trim_start();
        let Some(rest) = rest.strip_prefix('=') else { continue };
        let rest = rest.trim_start();

        let value = match rest.chars().next() {
            Some(q @ ('"' | '\'')) => {
                let body = &rest[1..];
                &body[..body.find(q).unwrap_or(body.len())]
            }
            _ => match rest.find(char::is_whitespace) {
                Some(end) => &rest[..end],
                // last attribute of `<x a=b/>`
                None => rest.trim_end_matches('/'),
            },
        };
        return Some(normalize_entities(value));
    }
    None
}
