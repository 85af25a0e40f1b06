// src/gui/components/confirm_reset.rs

use eframe::egui;
use crate::gui::{actions, app::App};

pub fn draw(ctx: &egui::Context, app: &mut App) {
    let (label, count) = (app.current_source().label(), app.current_ledger().len());
    let mut confirmed = false;
    let mut cancelled = false;

    egui::Window::new("Reset history?")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label(format!("Delete all {count} stored record(s) of {label}?"));
            ui.label("This cannot be undone.");
            ui.horizontal(|ui| {
                if ui.button("Delete").clicked() { confirmed = true; }
                if ui.button("Cancel").clicked() { cancelled = true; }
            });
        });

    if confirmed {
        actions::reset(app);
    } else if cancelled {
        logd!("Reset: cancelled");
        app.confirm_reset = false;
    }
}
