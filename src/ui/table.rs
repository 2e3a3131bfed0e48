use eframe::egui::Ui;
use egui_extras::{Column as GridColumn, TableBuilder};

use health_dashboard::data::export::Tabular;
use health_dashboard::data::model::{Column, StudyTable};

/// Scrollable grid of any exportable table.
pub fn data_grid<T: Tabular + ?Sized>(ui: &mut Ui, id: &str, table: &T, max_height: f32) {
    let header = table.header();
    let rows = table.rows();

    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .max_scroll_height(max_height)
            .columns(GridColumn::auto().at_least(60.0).clip(true), header.len())
            .header(20.0, |mut row| {
                for name in &header {
                    row.col(|ui: &mut Ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, rows.len(), |mut row| {
                    let cells = &rows[row.index()];
                    for cell in cells {
                        row.col(|ui: &mut Ui| {
                            ui.label(cell);
                        });
                    }
                });
            });
    });
}

/// Grid over the study records themselves. Only the visible rows are turned
/// into labels, so large tables stay cheap to draw every frame.
pub fn record_grid(ui: &mut Ui, id: &str, table: &StudyTable, max_height: f32) {
    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .max_scroll_height(max_height)
            .columns(GridColumn::auto().at_least(60.0).clip(true), Column::COUNT)
            .header(20.0, |mut row| {
                for col in Column::ALL {
                    row.col(|ui: &mut Ui| {
                        ui.strong(col.header());
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, table.len(), |mut row| {
                    let record = &table.records[row.index()];
                    for col in Column::ALL {
                        row.col(|ui: &mut Ui| {
                            ui.label(record.get(col).unwrap_or(""));
                        });
                    }
                });
            });
    });
}
