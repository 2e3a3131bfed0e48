use super::aggregate::{
    count_by, cross_tab, order_by_share, proportion_within, top_n_with_others, trend_over_time,
    CountTable, CrossTab, ProportionTable, Summary, Trend,
};
use super::error::NoDataError;
use super::model::{Column, StudyTable};
use crate::config::DashboardConfig;

/// Every derived table the Visualizations tab draws, computed from one
/// filtered table.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    /// Rows the view was computed from.
    pub rows: usize,
    pub summary: Result<Summary, NoDataError>,
    /// Bar chart: studies per country.
    pub countries: CountTable,
    /// Pie and horizontal bar: studies per platform.
    pub platforms: CountTable,
    /// Treemap: country → health event.
    pub country_events: CrossTab,
    /// Pie: top data sources plus `Others`.
    pub data_sources: CountTable,
    /// Line chart: year × analysis method.
    pub method_trend: Trend,
    /// Stacked bar: objective share within each health event.
    pub objective_shares: ProportionTable,
    /// Display order of health events for the stacked bar.
    pub event_order: Vec<String>,
    /// Sunburst: objective → evaluation.
    pub objective_evaluations: CrossTab,
}

impl DashboardView {
    pub fn compute(filtered: &StudyTable, config: &DashboardConfig) -> Self {
        let objective_shares =
            proportion_within(filtered, Column::HealthEvent, Column::SurveillanceObjective);
        let event_order = order_by_share(&objective_shares, &config.share_category);

        DashboardView {
            rows: filtered.len(),
            summary: Summary::compute(filtered),
            countries: count_by(filtered, Column::Country),
            platforms: count_by(filtered, Column::Platform),
            country_events: cross_tab(filtered, Column::Country, Column::HealthEvent),
            data_sources: top_n_with_others(filtered, Column::DataSource, config.top_n),
            method_trend: trend_over_time(filtered, Column::Year, Column::AnalysisMethod1),
            objective_shares,
            event_order,
            objective_evaluations: cross_tab(
                filtered,
                Column::SurveillanceObjective,
                Column::SurveillanceEvaluation,
            ),
        }
    }

    /// True when the filters left nothing to chart.
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }
}
