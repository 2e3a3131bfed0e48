use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use health_dashboard::data::model::Column;

use crate::state::{AppState, Tab};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

fn filter_title(column: Column) -> &'static str {
    match column {
        Column::Year => "Select Year(s) of Publication",
        Column::Country => "Select Country(ies)",
        Column::HealthEvent => "Select Health Event(s)",
        Column::Platform => "Select Platform(s)",
        Column::AnalysisMethod1 => "Select Analysis Method(s)",
        other => other.label(),
    }
}

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("🔍 Filters");
    ui.separator();

    let Some(table) = &state.table else {
        ui.label("No dataset loaded.");
        return;
    };

    // Options come from the unfiltered table; collect them so state can be
    // mutated inside the loop.
    let options: Vec<(Column, Vec<String>)> = Column::FILTERABLE
        .iter()
        .map(|col| (*col, table.options_for(*col).map(str::to_string).collect()))
        .collect();

    if !state.selection.is_empty() && ui.small_button("Clear all filters").clicked() {
        state.clear_all_filters();
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (col, values) in &options {
                let n_selected = state.selection.allowed(*col).map_or(0, |s| s.len());
                let header_text = if n_selected == 0 {
                    format!("{}  (all)", filter_title(*col))
                } else {
                    format!("{}  ({n_selected}/{})", filter_title(*col), values.len())
                };

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(col.key())
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        if n_selected > 0 && ui.small_button("Clear").clicked() {
                            state.clear_filter(*col);
                        }

                        for val in values {
                            let mut checked = state.selection.is_selected(*col, val);
                            if ui.checkbox(&mut checked, val.as_str()).changed() {
                                state.toggle_filter_value(*col, val);
                            }
                        }
                    });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu, tab strip and status line.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("📁 Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload default").clicked() {
                state.load_default();
                ui.close_menu();
            }
        });

        ui.separator();

        for tab in Tab::ALL {
            ui.selectable_value(&mut state.tab, tab, tab.title());
        }

        ui.separator();

        if let Some(table) = &state.table {
            ui.label(format!(
                "{} studies loaded, {} matching",
                table.len(),
                state.filtered.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                ui.visuals().text_color()
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Upload a file")
        .add_filter("Supported files", &["csv", "xlsx", "xlsm", "xls", "ods", "parquet", "pq", "json"])
        .add_filter("Spreadsheet", &["xlsx", "xlsm", "xls", "ods"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}
