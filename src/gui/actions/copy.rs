// src/gui/actions/copy.rs
use eframe::egui;
use crate::{csv::{self, CsvOptions}, gui::app::App};

pub fn copy(app: &mut App, ui_ctx: &egui::Context) {
    let src = app.current_source();
    let ledger = app.current_ledger();

    if ledger.is_empty() {
        app.status("Nothing to copy");
        logd!("Copy: Clicked, but '{}' is empty", ledger.namespace());
        return;
    }

    // clipboard never gets the BOM
    let opts = CsvOptions { bom: false, ..CsvOptions::from(&app.state.options.export) };
    let txt = csv::serialize_ledger(src.schema(), ledger, &opts);
    logf!("Copy: source={} rows={}", src.id(), ledger.len());

    ui_ctx.copy_text(txt);
    app.status("Copied to clipboard");
}
