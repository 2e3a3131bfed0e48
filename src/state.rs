use std::collections::BTreeMap;
use std::path::Path;

use health_dashboard::config::DashboardConfig;
use health_dashboard::data::error::LoadError;
use health_dashboard::data::export::{save_csv, Tabular};
use health_dashboard::data::filter::{apply, FilterSelection};
use health_dashboard::data::loader::load_file;
use health_dashboard::data::model::{Column, StudyTable};
use health_dashboard::data::view::DashboardView;

use crate::color::ColorMap;

/// Top-level tabs, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Home,
    DataOverview,
    Visualizations,
    Insights,
    Reference,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Home,
        Tab::DataOverview,
        Tab::Visualizations,
        Tab::Insights,
        Tab::Reference,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Home => "🏠 Home",
            Tab::DataOverview => "📊 Data Overview",
            Tab::Visualizations => "📈 Visualizations",
            Tab::Insights => "🔍 Insights",
            Tab::Reference => "📖 Reference",
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded dataset (None until a file loads successfully).
    pub table: Option<StudyTable>,

    /// File name shown above the charts.
    pub source_name: Option<String>,

    /// Current filter selection.
    pub selection: FilterSelection,

    /// Rows passing `selection`.
    pub filtered: StudyTable,

    /// Derived tables for the current `filtered` rows.
    pub view: Option<DashboardView>,

    /// Stable colours per chart column, built from the unfiltered options.
    pub colors: BTreeMap<Column, ColorMap>,

    pub tab: Tab,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

/// Columns whose categories colour a chart.
const COLORED: [Column; 6] = [
    Column::Country,
    Column::Platform,
    Column::DataSource,
    Column::AnalysisMethod1,
    Column::SurveillanceObjective,
    Column::SurveillanceEvaluation,
];

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            table: None,
            source_name: None,
            selection: FilterSelection::default(),
            filtered: StudyTable::default(),
            view: None,
            colors: BTreeMap::new(),
            tab: Tab::Visualizations,
            status_message: None,
        }
    }

    /// Load the dataset named by the configuration.
    pub fn load_default(&mut self) {
        let path = self.config.data_path.clone();
        self.load_path(&path);
    }

    /// Load a dataset, replacing the current one on success.
    pub fn load_path(&mut self, path: &Path) {
        match load_file(path) {
            Ok(table) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                self.set_table(table, name);
            }
            Err(e) => self.report_load_error(path, &e),
        }
    }

    fn report_load_error(&mut self, path: &Path, e: &LoadError) {
        log::error!("Failed to load {}: {e}", path.display());
        self.status_message = Some(format!("Error loading {}: {e}", path.display()));
    }

    /// Ingest a newly loaded table, reset filters and colours.
    pub fn set_table(&mut self, table: StudyTable, source_name: String) {
        self.colors = COLORED
            .iter()
            .map(|col| (*col, ColorMap::new(table.options_for(*col))))
            .collect();
        self.selection = FilterSelection::default();
        self.table = Some(table);
        self.source_name = Some(source_name);
        self.status_message = None;
        self.refilter();
    }

    /// Recompute the filtered rows and every derived table.
    pub fn refilter(&mut self) {
        if let Some(table) = &self.table {
            self.filtered = apply(table, &self.selection);
            self.view = Some(DashboardView::compute(&self.filtered, &self.config));
            log::debug!(
                "Filters {:?} keep {} of {} studies",
                self.selection.active_columns().collect::<Vec<_>>(),
                self.filtered.len(),
                table.len()
            );
        }
    }

    /// Toggle a single value in a column's filter.
    pub fn toggle_filter_value(&mut self, column: Column, value: &str) {
        self.selection.toggle(column, value);
        self.refilter();
    }

    /// Remove the constraint on one column.
    pub fn clear_filter(&mut self, column: Column) {
        self.selection.clear_column(column);
        self.refilter();
    }

    pub fn clear_all_filters(&mut self) {
        self.selection.clear();
        self.refilter();
    }

    pub fn color(&self, column: Column, label: &str) -> eframe::egui::Color32 {
        self.colors
            .get(&column)
            .map(|m| m.color_for(label))
            .unwrap_or(eframe::egui::Color32::GRAY)
    }
}

/// Ask for a destination and write `table` there as CSV.
///
/// Returns the status line to show, or `None` when the dialog was cancelled.
pub fn export_csv<T: Tabular + ?Sized>(table: &T, file_name: &str) -> Option<String> {
    let path = rfd::FileDialog::new()
        .set_title("Save data as CSV")
        .set_file_name(file_name)
        .add_filter("CSV", &["csv"])
        .save_file()?;
    match save_csv(table, &path) {
        Ok(()) => Some(format!("Saved {}", path.display())),
        Err(e) => {
            log::error!("Export to {} failed: {e}", path.display());
            Some(format!("Error: {e}"))
        }
    }
}
