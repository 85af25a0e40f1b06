// src/gui/components/capture_bar.rs

use eframe::egui;
use crate::gui::{actions, app::App};

pub fn draw(ui: &mut egui::Ui, app: &mut App) {
    ui.horizontal(|ui| {
        ui.label("Page:");
        let resp = ui.add(
            egui::TextEdit::singleline(&mut app.state.gui.html_path)
                .hint_text("saved page .html")
                .font(egui::TextStyle::Monospace)
                .desired_width(360.0),
        );
        if resp.lost_focus() {
            logd!("UI: html_path → {}", app.state.gui.html_path);
        }

        ui.label("Scope:");
        ui.add(egui::TextEdit::singleline(&mut app.state.gui.scope_key).desired_width(160.0))
            .on_hover_text("Captures with the same scope count as one view for \"once per day\"");

        let capture_opts = &mut app.state.options.capture;
        if ui.checkbox(&mut capture_opts.once_per_day, "Once per day").changed() {
            logf!("UI: once_per_day → {}", capture_opts.once_per_day);
        }
        if ui.checkbox(&mut capture_opts.dedupe, "Skip duplicates").changed() {
            logf!("UI: dedupe → {}", capture_opts.dedupe);
        }

        if ui.button("Capture").clicked() {
            actions::capture(app);
        }
    });
}
