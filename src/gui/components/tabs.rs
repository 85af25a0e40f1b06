// src/gui/components/tabs.rs
//
// Renders the source tabs and performs the tab switch itself.

use eframe::egui;
use crate::{gui::app::App, sources};

pub fn draw(ui: &mut egui::Ui, app: &mut App) {
    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        let cur = app.current_index();
        for (idx, src) in sources::all().iter().enumerate() {
            let selected = idx == cur;
            let label = format!("{} ({})", src.label(), app.ledgers[idx].len());
            if ui.selectable_label(selected, label).clicked() && !selected {
                app.select_source(idx);
            }
        }
    });
}
