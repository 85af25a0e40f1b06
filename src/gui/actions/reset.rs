// src/gui/actions/reset.rs
use crate::gui::app::App;

/// Runs only after the confirmation window said yes.
pub fn reset(app: &mut App) {
    app.confirm_reset = false;
    let ledger = app.current_ledger_mut();
    let dropped = ledger.len();
    ledger.reset();
    let msg = format!("Cleared {dropped} record(s) from '{}'", ledger.namespace());
    logf!("Reset: {}", msg);
    app.status(msg);
}
