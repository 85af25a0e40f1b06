// src/config/options.rs
use std::path::PathBuf;

use super::consts::*;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppOptions {
    pub capture: CaptureOptions,
    pub export: ExportOptions,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Delim {
    #[default]
    Comma,
    Semicolon,
}

impl Delim {
    pub fn as_char(&self) -> char {
        match self { Delim::Comma => ',', Delim::Semicolon => ';' }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "," | "comma" => Some(Delim::Comma),
            ";" | "semicolon" => Some(Delim::Semicolon),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaptureOptions {
    /// Where the ledger store (and the log) lives
    pub store_dir: PathBuf,
    /// Skip a capture when the same scope already ran today
    pub once_per_day: bool,
    /// Use the source's dedup key (if it has one) when appending
    pub dedupe: bool,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            store_dir: PathBuf::from(STORE_DIR),
            once_per_day: false,
            dedupe: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportOptions {
    pub delimiter: Delim,
    /// Prefix the file with a UTF-8 byte-order mark (spreadsheet apps want it)
    pub bom: bool,
    pub out_dir: PathBuf,
    /// Append the scope/identity part to the file name when one is known
    pub include_scope: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            delimiter: Delim::Comma,
            bom: false,
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            include_scope: true,
        }
    }
}

impl ExportOptions {
    pub fn delim(&self) -> char {
        self.delimiter.as_char()
    }

    /// Parse GUI/CLI text into the output directory. Blank keeps the default.
    pub fn set_out_dir(&mut self, text: &str) {
        let s = text.trim();
        self.out_dir = if s.is_empty() { PathBuf::from(DEFAULT_OUT_DIR) } else { PathBuf::from(s) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delim_parses_symbols_and_names() {
        assert_eq!(Delim::parse(","), Some(Delim::Comma));
        assert_eq!(Delim::parse("Semicolon"), Some(Delim::Semicolon));
        assert_eq!(Delim::parse("\t"), None);
    }

    #[test]
    fn blank_out_dir_restores_default() {
        let mut opts = ExportOptions::default();
        opts.set_out_dir("exports/cm");
        assert_eq!(opts.out_dir, PathBuf::from("exports/cm"));
        opts.set_out_dir("   ");
        assert_eq!(opts.out_dir, PathBuf::from(DEFAULT_OUT_DIR));
    }
}
