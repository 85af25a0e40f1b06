// src/progress.rs
/// Lightweight progress reporting for capture/export.
/// Frontends (GUI/CLI) implement this to surface status to users.
pub trait Progress {
    /// Called once the number of extracted records is known.
    fn begin(&mut self, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// Called when records were stored (how many made it into the ledger).
    fn item_done(&mut self, _count: usize) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}

/// Prints status lines to stderr (CLI).
pub struct StderrProgress;

impl Progress for StderrProgress {
    fn begin(&mut self, total: usize) {
        eprintln!("Found {total} record(s)");
    }

    fn log(&mut self, msg: &str) {
        eprintln!("{msg}");
    }
}
