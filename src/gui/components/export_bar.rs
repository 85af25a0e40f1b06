// src/gui/components/export_bar.rs

use eframe::egui;
use crate::{config::options::Delim, gui::{actions, app::App}};

pub fn draw(ui: &mut egui::Ui, app: &mut App) {
    {
        let export = &mut app.state.options.export;
        let prev = (export.delimiter, export.bom);

        ui.horizontal(|ui| {
            ui.label("Delimiter:");
            ui.selectable_value(&mut export.delimiter, Delim::Comma, ",");
            ui.selectable_value(&mut export.delimiter, Delim::Semicolon, ";");
            ui.checkbox(&mut export.bom, "BOM")
                .on_hover_text("Prefix the file with a UTF-8 byte-order mark");
        });

        if (export.delimiter, export.bom) != prev {
            logf!("UI: Export delimiter={:?} bom={}", export.delimiter, export.bom);
        }
    }

    ui.horizontal(|ui| {
        ui.label("Output:");
        if ui
            .add(egui::TextEdit::singleline(&mut app.out_dir_text).font(egui::TextStyle::Monospace))
            .changed()
        {
            app.out_dir_dirty = true;
        }

        if ui.button("Export").clicked() {
            actions::export(app, ui.ctx());
        }
        if ui.button("Copy").clicked() {
            actions::copy(app, ui.ctx());
        }

        let has_data = !app.current_ledger().is_empty();
        if ui.add_enabled(has_data, egui::Button::new("Reset…")).clicked() {
            app.confirm_reset = true;
        }
    });
}
