// src/error.rs
//! Failures that escape to a caller.
//!
//! Row and field level extraction problems never show up here: they are
//! recorded in `sources::Extraction` and the row is skipped or defaulted.
//! A corrupt stored ledger is also recovered in place (see `Ledger::load`).

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// Ledger (or the page just captured) holds zero records.
    #[error("nothing to export: ledger '{namespace}' is empty")]
    NoDataToExport { namespace: String },

    /// The file could not be written; callers fall back to the clipboard.
    #[error("cannot save export file: {reason}")]
    DownloadUnsupported { reason: String },

    #[error("unknown source '{0}' (see `sources` for the list)")]
    UnknownSource(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
