// src/gui/components/ledger_table.rs
//
// Draws the current source's ledger, oldest first, one column per schema field.
// Purely a view.

use eframe::egui::{self, Align, Layout, RichText, TextWrapMode};
use egui_extras::{Column, TableBuilder};

use crate::gui::app::App;
use crate::record::FieldKind;

pub fn draw(ui: &mut egui::Ui, app: &App) {
    let src = app.current_source();
    let schema = src.schema();
    let ledger = app.current_ledger();

    if ledger.is_empty() {
        ui.centered_and_justified(|ui| {
            ui.weak("No records yet. Capture a saved page to start the history.");
        });
        return;
    }

    {
        let s = &mut ui.style_mut().spacing.scroll;
        s.floating = false;     // reserve space instead of overlaying content
        s.bar_width = 10.0;
    }

    let avail_h = ui.available_height();
    egui::ScrollArea::horizontal()
        .id_salt("ledger_hscroll")
        .max_height(avail_h)
        .show(ui, |ui| {
            let mut table = TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .min_scrolled_height(0.0)
                .id_salt(("ledger_table", src.id()));
            for field in schema.fields {
                let w = if matches!(field.kind, FieldKind::Number) { 80.0 } else { 160.0 };
                table = table.column(Column::initial(w).at_least(30.0).clip(true));
            }

            table
                .header(24.0, |mut header| {
                    for field in schema.fields {
                        header.col(|ui| {
                            ui.style_mut().wrap_mode = Some(TextWrapMode::Extend);
                            ui.label(RichText::new(field.header).strong());
                        });
                    }
                })
                .body(|body| {
                    let records = ledger.records();
                    body.rows(20.0, records.len(), |mut row| {
                        let Some(record) = records.get(row.index()) else { return };
                        for field in schema.fields {
                            let text = record.cell(field.name);
                            row.col(|ui| {
                                ui.style_mut().wrap_mode = Some(TextWrapMode::Truncate);
                                if matches!(field.kind, FieldKind::Number) {
                                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| { ui.label(text); });
                                } else {
                                    ui.with_layout(Layout::left_to_right(Align::Center), |ui| { ui.label(text); });
                                }
                            });
                        }
                    });
                });
        });
}
