use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::{CellValue, Table};

/// Render a small read-only grid of `table`.
pub fn table_grid(ui: &mut Ui, id: impl std::hash::Hash, table: &Table) {
    if table.width() == 0 {
        ui.label("No columns.");
        return;
    }

    ui.push_id(id, |ui: &mut Ui| {
        egui::ScrollArea::horizontal()
            .auto_shrink([false, true])
            .show(ui, |ui: &mut Ui| {
                let mut builder = TableBuilder::new(ui)
                    .striped(true)
                    .resizable(true)
                    .vscroll(false)
                    .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                    .column(Column::exact(36.0));
                for _ in table.columns() {
                    builder = builder.column(Column::initial(120.0).at_least(40.0).clip(true));
                }

                builder
                    .header(20.0, |mut header| {
                        header.col(|ui: &mut Ui| {
                            ui.label("");
                        });
                        for column in table.columns() {
                            header.col(|ui: &mut Ui| {
                                ui.strong(&column.name);
                            });
                        }
                    })
                    .body(|mut body| {
                        for i in 0..table.len() {
                            body.row(18.0, |mut row| {
                                row.col(|ui: &mut Ui| {
                                    ui.label(RichText::new(i.to_string()).weak());
                                });
                                for value in table.row(i) {
                                    row.col(|ui: &mut Ui| {
                                        cell(ui, value);
                                    });
                                }
                            });
                        }
                    });
            });
    });
}

fn cell(ui: &mut Ui, value: &CellValue) {
    match value {
        CellValue::Missing => {
            ui.label(RichText::new(value.to_string()).color(Color32::GRAY).italics());
        }
        CellValue::Int(_) | CellValue::Float(_) => {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui: &mut Ui| {
                ui.monospace(value.to_string());
            });
        }
        _ => {
            ui.label(value.to_string());
        }
    }
}
