// src/gui/actions/export.rs
use chrono::Local;
use eframe::egui;

use crate::{
    error::LedgerError,
    export::{self, BufferFallback, Exported, FileSink},
    gui::app::App,
};

pub fn export(app: &mut App, ui_ctx: &egui::Context) {
    // normalize out dir first (mutates app) before any &app borrows
    app.commit_out_dir();

    let src = app.current_source();
    let ledger = app.current_ledger();
    let opts = &app.state.options.export;

    let scope = src.scope_identity(ledger.records());
    let mut sink = FileSink::new(&opts.out_dir);
    let mut fallback = BufferFallback::default();

    let result = export::export_ledger(
        src.schema(),
        ledger,
        opts,
        Local::now().date_naive(),
        scope.as_deref(),
        &mut sink,
        &mut fallback,
    );

    let status_msg = match result {
        Ok(Exported::File(path)) => {
            logf!("Export: OK rows={} path={}", ledger.len(), path.display());
            format!("Exported {} record(s) to {}", ledger.len(), path.display())
        }
        Ok(Exported::Fallback { to, reason }) => {
            if let Some(txt) = fallback.content.take() {
                ui_ctx.copy_text(txt);
            }
            format!("Could not save file ({reason}). CSV copied to {to} instead")
        }
        Err(LedgerError::NoDataToExport { .. }) => s!("Nothing to export"),
        Err(e) => {
            loge!("Export: Error: {}", e);
            format!("Export error: {e}")
        }
    };

    // mutate app only after the ledger borrows are gone
    app.status(status_msg);
}
