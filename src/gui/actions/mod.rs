// src/gui/actions/mod.rs
//
// Button actions. Layout lives in components/; these update the ledger,
// the status bar and the log.

mod capture;
mod copy;
mod export;
mod reset;

pub use capture::capture;
pub use copy::copy;
pub use export::export;
pub use reset::reset;
