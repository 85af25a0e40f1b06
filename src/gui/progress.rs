// src/gui/progress.rs
use std::sync::{Arc, Mutex};
use crate::progress::Progress;

/// Mirrors capture progress into the status bar text.
pub struct GuiProgress {
    status: Arc<Mutex<String>>,
    found: usize,
    stored: usize,
}

impl GuiProgress {
    pub fn new(status: Arc<Mutex<String>>) -> Self {
        Self { status, found: 0, stored: 0 }
    }
    fn set_status(&self, msg: impl Into<String>) {
        if let Ok(mut s) = self.status.lock() {
            *s = msg.into();
        }
    }
}

impl Progress for GuiProgress {
    fn begin(&mut self, total: usize) {
        self.found = total;
        self.set_status(format!("Found {total} record(s)"));
    }
    fn log(&mut self, msg: &str) {
        self.set_status(s!(msg));
    }
    fn item_done(&mut self, count: usize) {
        self.stored += count;
        self.set_status(format!("Stored {} of {} record(s)", self.stored, self.found));
    }
    fn finish(&mut self) {
        if self.found == 0 {
            self.set_status(s!("Capture complete")); // nothing was found
        } else {
            self.set_status(format!("Capture complete ({}/{})", self.stored, self.found));
        }
    }
}
