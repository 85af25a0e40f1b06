// src/export.rs
//! Turning a ledger into a file the user can open.
//!
//! `ExportSink` is the "download" seam: `FileSink` writes into the output
//! directory; when that fails the caller hands the same text to a fallback
//! (the GUI clipboard, or stdout for the CLI) instead of losing it.

use std::{
    fs,
    io::{self, Write},
    path::PathBuf,
};

use chrono::NaiveDate;

use crate::config::consts::{EXPORT_EXT, EXPORT_SUFFIX};
use crate::config::options::ExportOptions;
use crate::core::sanitize::sanitize_filename;
use crate::csv::{self, CsvOptions};
use crate::error::{LedgerError, Result};
use crate::ledger::Ledger;
use crate::record::Schema;
use crate::store::KvStore;

/// `{namespace}_{YYYYMMDD}[_{scope}]_export.csv`, every part filesystem-safe.
pub fn export_filename(namespace: &str, date: NaiveDate, scope: Option<&str>) -> String {
    let ns = sanitize_filename(namespace);
    let ns = if ns.is_empty() { s!("ledger") } else { ns };
    let day = date.format("%Y%m%d").to_string();

    let mut stem = join!(&ns, "_", &day);
    if let Some(scope) = scope.map(sanitize_filename).filter(|s| !s.is_empty()) {
        stem.push('_');
        stem.push_str(&scope);
    }
    format!("{stem}_{EXPORT_SUFFIX}.{EXPORT_EXT}")
}

pub trait ExportSink {
    /// Save `content` under `filename`; returns where it went.
    fn export_as_file(&mut self, content: &str, filename: &str) -> Result<PathBuf>;
}

/// Writes into a directory, creating it if needed.
#[derive(Clone, Debug)]
pub struct FileSink {
    pub dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ExportSink for FileSink {
    fn export_as_file(&mut self, content: &str, filename: &str) -> Result<PathBuf> {
        let unsupported = |e: io::Error| LedgerError::DownloadUnsupported { reason: e.to_string() };

        if self.dir.exists() && !self.dir.is_dir() {
            return Err(LedgerError::DownloadUnsupported {
                reason: format!("path exists but is not a directory: {}", self.dir.display()),
            });
        }
        fs::create_dir_all(&self.dir).map_err(unsupported)?;
        let path = self.dir.join(filename);
        fs::write(&path, content).map_err(unsupported)?;
        Ok(path)
    }
}

/// Where exported text ends up when no file could be written.
pub trait Fallback {
    fn deliver(&mut self, content: &str) -> io::Result<()>;
    fn describe(&self) -> &'static str;
}

/// CLI fallback: print the CSV so it can be copied from the terminal.
pub struct StdoutFallback;

impl Fallback for StdoutFallback {
    fn deliver(&mut self, content: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(content.as_bytes())?;
        writeln!(out)?;
        out.flush()
    }

    fn describe(&self) -> &'static str { "stdout" }
}

/// Keeps the text in memory (GUI hands it to the clipboard afterwards; tests inspect it).
#[derive(Default)]
pub struct BufferFallback {
    pub content: Option<String>,
}

impl Fallback for BufferFallback {
    fn deliver(&mut self, content: &str) -> io::Result<()> {
        self.content = Some(s!(content));
        Ok(())
    }

    fn describe(&self) -> &'static str { "clipboard" }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Exported {
    File(PathBuf),
    /// File could not be written; content went to the named fallback
    Fallback { to: &'static str, reason: String },
}

/// Try the sink; on `DownloadUnsupported` hand the content to the fallback.
pub fn export_with_fallback(
    content: &str,
    filename: &str,
    sink: &mut dyn ExportSink,
    fallback: &mut dyn Fallback,
) -> Result<Exported> {
    match sink.export_as_file(content, filename) {
        Ok(path) => {
            logf!("Export: wrote {}", path.display());
            Ok(Exported::File(path))
        }
        Err(LedgerError::DownloadUnsupported { reason }) => {
            logw!("Export: file save failed ({reason}); using {}", fallback.describe());
            fallback.deliver(content)?;
            Ok(Exported::Fallback { to: fallback.describe(), reason })
        }
        Err(e) => Err(e),
    }
}

/// Serialize the whole ledger and export it. Empty ledger → `NoDataToExport`.
pub fn export_ledger<S: KvStore>(
    schema: &Schema,
    ledger: &Ledger<S>,
    opts: &ExportOptions,
    date: NaiveDate,
    scope: Option<&str>,
    sink: &mut dyn ExportSink,
    fallback: &mut dyn Fallback,
) -> Result<Exported> {
    if ledger.is_empty() {
        logd!("Export: '{}' is empty, nothing to do", ledger.namespace());
        return Err(LedgerError::NoDataToExport { namespace: s!(ledger.namespace()) });
    }
    let content = csv::serialize_ledger(schema, ledger, &CsvOptions::from(opts));
    let scope = if opts.include_scope { scope } else { None };
    let filename = export_filename(ledger.namespace(), date, scope);

    logf!("Export: begin '{}' rows={} file={}", ledger.namespace(), ledger.len(), filename);
    export_with_fallback(&content, &filename, sink, fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn filename_without_scope() {
        assert_eq!(export_filename("cm_price_history", day(), None),
                   "cm_price_history_20261016_export.csv");
    }

    #[test]
    fn filename_scope_is_sanitized() {
        assert_eq!(export_filename("cm_orders", day(), Some("#1234 / x")),
                   "cm_orders_20261016_1234_x_export.csv");
        // a scope with nothing usable is dropped
        assert_eq!(export_filename("w", day(), Some("???")), "w_20261016_export.csv");
    }

    struct FailingSink;
    impl ExportSink for FailingSink {
        fn export_as_file(&mut self, _: &str, _: &str) -> Result<PathBuf> {
            Err(LedgerError::DownloadUnsupported { reason: s!("read-only") })
        }
    }

    #[test]
    fn unsupported_download_goes_to_fallback() {
        let mut fb = BufferFallback::default();
        let out = export_with_fallback("a,b", "f.csv", &mut FailingSink, &mut fb).unwrap();
        assert!(matches!(out, Exported::Fallback { to: "clipboard", .. }));
        assert_eq!(fb.content.as_deref(), Some("a,b"));
    }
}
