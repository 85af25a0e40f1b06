// src/gui/app.rs
use std::{
    error::Error,
    sync::{Arc, Mutex},
};

use eframe::egui;

use crate::{
    config::{
        consts::DEFAULT_SCOPE,
        options::ExportOptions,
        state::AppState,
    },
    ledger::Ledger,
    sources::{self, Source},
    store::FileStore,
};

pub fn run(options: eframe::NativeOptions) -> Result<(), Box<dyn Error>> {
    eframe::run_native(
        "Shop Ledger",
        options,
        Box::new(|_cc| Ok(Box::new(App::new(AppState::default())))),
    )?;
    Ok(())
}

pub struct App {
    // single source of truth (UI thread only)
    pub state: AppState,

    // one ledger per source, same order as `sources::all()`
    pub ledgers: Vec<Ledger<FileStore>>,

    // output dir text field (mapped to ExportOptions on export)
    pub out_dir_text: String,
    pub out_dir_dirty: bool,

    // status bar (progress writes here)
    pub status: Arc<Mutex<String>>,

    // reset waits for a second click in the confirmation window
    pub confirm_reset: bool,
}

impl App {
    pub fn new(mut state: AppState) -> Self {
        let store_dir = state.options.capture.store_dir.clone();
        crate::log::init(&store_dir);

        let ledgers: Vec<Ledger<FileStore>> = sources::all()
            .iter()
            .map(|s| Ledger::load(FileStore::new(&store_dir), s.namespace()))
            .collect();

        let total: usize = ledgers.iter().map(|l| l.len()).sum();
        logf!("Init: sources={}, stored records={}", ledgers.len(), total);

        state.gui.scope_key = s!(DEFAULT_SCOPE);
        let first = sources::all()[state.gui.current_source_index];
        state.options.export = export_options_for(first, &state.options.export);

        let status = if total > 0 { s!("Loaded local history") } else { s!("Idle") };
        let out_dir_text = state.options.export.out_dir.to_string_lossy().into_owned();

        Self {
            state,
            ledgers,
            out_dir_text,
            out_dir_dirty: false,
            status: Arc::new(Mutex::new(status)),
            confirm_reset: false,
        }
    }

    /* ---------- tiny helpers ---------- */

    #[inline]
    pub fn current_index(&self) -> usize { self.state.gui.current_source_index }

    #[inline]
    pub fn current_source(&self) -> &'static dyn Source { sources::all()[self.current_index()] }

    #[inline]
    pub fn current_ledger(&self) -> &Ledger<FileStore> { &self.ledgers[self.current_index()] }

    #[inline]
    pub fn current_ledger_mut(&mut self) -> &mut Ledger<FileStore> {
        let ix = self.current_index();
        &mut self.ledgers[ix]
    }

    /// Switch tab and re-derive the export options for the new source.
    pub fn select_source(&mut self, idx: usize) {
        let prev = self.current_source().id();
        self.state.gui.current_source_index = idx;
        let src = self.current_source();
        self.state.options.export = export_options_for(src, &self.state.options.export);
        self.confirm_reset = false;
        logf!("UI: Tab switch {} → {}", prev, src.id());
    }

    /// Apply the output dir text field, if the user touched it.
    pub fn commit_out_dir(&mut self) {
        if self.out_dir_dirty {
            self.state.options.export.set_out_dir(&self.out_dir_text);
            logf!("Export: Out dir set → {}", self.state.options.export.out_dir.display());
            self.out_dir_dirty = false;
        }
    }

    #[inline]
    pub fn status<T: Into<String>>(&self, msg: T) {
        if let Ok(mut s) = self.status.lock() {
            *s = msg.into();
        }
    }

    pub fn status_text(&self) -> String {
        self.status.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

/// Source defaults on top of a clean `ExportOptions`; the output dir carries over.
fn export_options_for(src: &dyn Source, current: &ExportOptions) -> ExportOptions {
    let mut opts = ExportOptions { out_dir: current.out_dir.clone(), ..ExportOptions::default() };
    src.export_defaults(&mut opts);
    opts
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(self.status_text());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.weak(format!("{} record(s)", self.current_ledger().len()));
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            crate::gui::components::tabs::draw(ui, self);

            ui.separator();

            crate::gui::components::capture_bar::draw(ui, self);
            crate::gui::components::export_bar::draw(ui, self);

            ui.separator();

            crate::gui::components::ledger_table::draw(ui, self);
        });

        if self.confirm_reset {
            crate::gui::components::confirm_reset::draw(ctx, self);
        }
    }
}
