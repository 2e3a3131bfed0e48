use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use health_dashboard::data::aggregate::Summary;
use health_dashboard::data::export::Tabular;
use health_dashboard::data::filter::FilterSelection;
use health_dashboard::data::model::Column;
use health_dashboard::data::view::DashboardView;

use crate::state::{export_csv, AppState};
use crate::ui::{charts, table};

const NO_DATA: &str = "No data available for the selected filters. Please adjust your selections.";

// ---------------------------------------------------------------------------
// Static tabs
// ---------------------------------------------------------------------------

pub fn home(ui: &mut Ui) {
    ui.heading("Introduction");
    ui.label(
        "The ubiquitous and openly accessible information produced by the public on the \
         Internet has sparked an increasing interest in developing digital public health \
         surveillance (DPHS) systems. Shakeri Hossein A. et al. [1]",
    );
}

pub fn data_overview(ui: &mut Ui) {
    ui.heading("About the data");
    ui.label(
        "This dataset was compiled in 2021 for the publication \"Digital Public Health \
         Surveillance: A Systematic Scoping Review\". It consists of published studies with \
         details on demographics, surveillance aspects, methodology and evaluation.",
    );
    ui.add_space(8.0);
    ui.strong("Key Performance Indicators");
    for col in [
        Column::Country,
        Column::Platform,
        Column::SurveillanceEvaluation,
        Column::HealthEvent,
        Column::SurveillanceObjective,
        Column::AnalysisMethod1,
        Column::DataSource,
    ] {
        ui.label(format!("• {}", col.label()));
    }
}

pub fn insights(ui: &mut Ui) {
    ui.heading("Key Insights");
    ui.strong("Which country has the highest health event surveillance?");
    ui.label(
        "1. The United States of America has the largest number of health events under \
         surveillance among the countries in the study.",
    );
    ui.label(
        "2. Behavioral risk factors and communicable diseases are the most predominant health \
         events, consistent with the large surveillance programs run by US public health agencies.",
    );
    ui.label(
        "3. Twitter is the most widely used platform, likely due to its real-time data, large \
         user base and ability to surface emerging health trends quickly.",
    );
}

pub fn reference(ui: &mut Ui) {
    ui.heading("References");
    ui.label(
        "Shakeri Hossein Abad, Z., Kline, A., Sultana, M. et al. Digital public health \
         surveillance: a systematic scoping review. npj Digit. Med. 4, 41 (2021).",
    );
    ui.hyperlink("https://doi.org/10.1038/s41746-021-00407-6");
}

// ---------------------------------------------------------------------------
// Visualizations tab
// ---------------------------------------------------------------------------

fn metric(ui: &mut Ui, label: &str, value: String) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(RichText::new(label).small());
        ui.label(RichText::new(value).heading().strong());
    });
}

fn metrics_row(ui: &mut Ui, summary: &Summary) {
    let (platform, count) = match &summary.top_platform {
        Some(top) => (top.value.clone(), top.count.to_string()),
        None => ("n/a".to_string(), "n/a".to_string()),
    };
    ui.columns(4, |cols| {
        metric(&mut cols[0], "Total Studies Matching Filters", summary.total_studies.to_string());
        metric(&mut cols[1], "Total Surveillance", summary.total_surveillance.to_string());
        metric(&mut cols[2], "Most used platform", platform);
        metric(&mut cols[3], "Count of most used", count);
    });
}

/// Heading of the trend chart, naming the selected analysis methods.
fn trend_title(selection: &FilterSelection) -> String {
    match selection.allowed(Column::AnalysisMethod1) {
        Some(methods) if !methods.is_empty() => {
            let names: Vec<&str> = methods.iter().map(String::as_str).collect();
            format!("📊 Trend of {} Over Time", names.join(", "))
        }
        _ => "📊 Trend of Analysis Methods Over Time".to_string(),
    }
}

/// "View data" expander plus "Get a copy of the data" button under a chart.
/// An export outcome lands in `status`.
fn data_controls<T: Tabular>(ui: &mut Ui, id: &str, data: &T, file_name: &str, status: &mut Option<String>) {
    if ui.button("⬇ Get a copy of the Data").clicked() {
        if let Some(msg) = export_csv(data, file_name) {
            *status = Some(msg);
        }
    }
    egui::CollapsingHeader::new("View Data")
        .id_salt(id)
        .show(ui, |ui: &mut Ui| table::data_grid(ui, id, data, 200.0));
}

fn no_data(ui: &mut Ui) {
    ui.colored_label(Color32::from_rgb(200, 140, 0), NO_DATA);
}

pub fn visualizations(ui: &mut Ui, state: &mut AppState) {
    let mut status = None;
    {
        let (Some(view), Some(_)) = (&state.view, &state.table) else {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open a file to explore studies  (File → Open…)");
            });
            return;
        };
        let state: &AppState = state;

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui: &mut Ui| {
                if let Some(name) = &state.source_name {
                    ui.label(format!("Loaded file: {name}"));
                }
                ui.separator();

                match &view.summary {
                    Ok(summary) => metrics_row(ui, summary),
                    Err(_) => no_data(ui),
                }
                ui.separator();

                if view.is_empty() {
                    no_data(ui);
                } else {
                    chart_grid(ui, state, view, &mut status);
                }

                ui.separator();
                ui.heading("Filtered Data");
                table::record_grid(ui, "filtered_data", &state.filtered, 400.0);
                if ui.button("⬇ Get a copy of the Raw Data").clicked() {
                    if let Some(msg) = export_csv(&state.filtered, "healthsurveillance.csv") {
                        status = Some(msg);
                    }
                }
            });
    }
    if status.is_some() {
        state.status_message = status;
    }
}

fn chart_grid(ui: &mut Ui, state: &AppState, view: &DashboardView, status: &mut Option<String>) {
    ui.columns(2, |cols| {
        cols[0].heading("Comparison of Health Surveillance by Country");
        charts::bar_chart(&mut cols[0], "country_bar", &view.countries, state);

        cols[1].heading("Public Health Surveillance Platforms Count");
        charts::pie_chart(&mut cols[1], &view.platforms, state);
    });
    ui.separator();

    ui.columns(2, |cols| {
        cols[0].heading("Distribution of Surveillance Platforms");
        charts::horizontal_bar_chart(&mut cols[0], "platform_bar", &view.platforms);
        data_controls(&mut cols[0], "platform_data", &view.platforms, "healthsurveillance_bar.csv", status);

        cols[1].heading("Health Surveillance by Country");
        if view.country_events.is_empty() {
            no_data(&mut cols[1]);
        } else {
            charts::treemap_chart(&mut cols[1], &view.country_events);
        }
        data_controls(&mut cols[1], "treemap_data", &view.country_events, "healthsurveillance_treemap.csv", status);
    });
    ui.separator();

    ui.columns(2, |cols| {
        cols[0].heading("Proportion of Data Sources");
        if view.data_sources.is_empty() {
            no_data(&mut cols[0]);
        } else {
            charts::pie_chart(&mut cols[0], &view.data_sources, state);
        }
        data_controls(&mut cols[0], "source_data", &view.data_sources, "healthsurveillance_ypie.csv", status);

        cols[1].heading(trend_title(&state.selection));
        if view.method_trend.is_empty() {
            no_data(&mut cols[1]);
        } else {
            charts::trend_chart(&mut cols[1], "method_trend", &view.method_trend, state);
        }
        data_controls(&mut cols[1], "trend_data", &view.method_trend, "healthsurveillance_line.csv", status);
    });
    ui.separator();

    ui.columns(2, |cols| {
        cols[0].heading("Proportion of Objectives per Health Event");
        if view.objective_shares.is_empty() {
            no_data(&mut cols[0]);
        } else {
            charts::stacked_share_chart(
                &mut cols[0],
                "objective_shares",
                &view.objective_shares,
                &view.event_order,
                state,
            );
        }
        data_controls(&mut cols[0], "shares_data", &view.objective_shares, "healthsurveillance_stacked.csv", status);

        cols[1].heading("Distribution of Surveillance Evaluation & Objective");
        if view.objective_evaluations.is_empty() {
            no_data(&mut cols[1]);
        } else {
            charts::sunburst_chart(&mut cols[1], &view.objective_evaluations, state);
            let objectives: Vec<&str> = view
                .objective_evaluations
                .groups()
                .into_iter()
                .map(|(outer, _, _)| outer)
                .collect();
            charts::column_legend(&mut cols[1], view.objective_evaluations.outer, &objectives, state);
            data_controls(&mut cols[1], "sunburst_data", &view.objective_evaluations, "healthsurveillance_sunburst.csv", status);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trend_title_names_selected_methods() {
        assert_eq!(
            trend_title(&FilterSelection::new()),
            "📊 Trend of Analysis Methods Over Time"
        );
        let sel = FilterSelection::new().with_values(Column::AnalysisMethod1, ["NLP", "ML"]);
        assert_eq!(trend_title(&sel), "📊 Trend of ML, NLP Over Time");
    }
}
