use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use super::error::UnknownColumn;

// ---------------------------------------------------------------------------
// Column – the closed set of spreadsheet columns the dashboard knows about
// ---------------------------------------------------------------------------

/// A known column of the surveillance spreadsheet.
///
/// Untyped spreadsheet headers are converted into `Column` once, during load.
/// Everything downstream (filters, aggregators, export) addresses cells through
/// this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    Title,
    Year,
    Country,
    Platform,
    HealthEvent,
    SurveillanceObjective,
    SurveillanceType,
    ObjectiveSub,
    Finding,
    AnalysisMethod1,
    AnalysisMethod2,
    AnalysisMethod3,
    AnalysisMethod4,
    AnalysisMethod5,
    DataSource,
    SurveillanceEvaluation,
}

impl Column {
    pub const COUNT: usize = 16;

    /// All columns in raw-table display order.
    pub const ALL: [Column; Column::COUNT] = [
        Column::Title,
        Column::Year,
        Column::Country,
        Column::Platform,
        Column::HealthEvent,
        Column::SurveillanceObjective,
        Column::SurveillanceType,
        Column::ObjectiveSub,
        Column::Finding,
        Column::AnalysisMethod1,
        Column::AnalysisMethod2,
        Column::AnalysisMethod3,
        Column::AnalysisMethod4,
        Column::AnalysisMethod5,
        Column::DataSource,
        Column::SurveillanceEvaluation,
    ];

    /// Columns a source file must provide.
    pub const REQUIRED: [Column; 8] = [
        Column::Year,
        Column::Country,
        Column::HealthEvent,
        Column::Platform,
        Column::AnalysisMethod1,
        Column::SurveillanceObjective,
        Column::SurveillanceEvaluation,
        Column::DataSource,
    ];

    /// Columns offered as multi-select filters in the side panel.
    pub const FILTERABLE: [Column; 5] = [
        Column::Year,
        Column::Country,
        Column::HealthEvent,
        Column::Platform,
        Column::AnalysisMethod1,
    ];

    /// Exact header text in the source spreadsheet.
    pub fn header(self) -> &'static str {
        match self {
            Column::Title => "Title",
            Column::Year => "Year of Publication",
            Column::Country => "Authors's country #1",
            Column::Platform => "Platform #1",
            Column::HealthEvent => "Health Event Under Surveillance",
            Column::SurveillanceObjective => "Surveillance Objective",
            Column::SurveillanceType => "Surveillance Type",
            Column::ObjectiveSub => "Objective-sub",
            Column::Finding => "Finding",
            Column::AnalysisMethod1 => "Analysis Method #1",
            Column::AnalysisMethod2 => "Analysis Method #2",
            Column::AnalysisMethod3 => "Analysis Method #3",
            Column::AnalysisMethod4 => "Analysis Method #4",
            Column::AnalysisMethod5 => "Analysis Method #5",
            Column::DataSource => "Data Source",
            Column::SurveillanceEvaluation => "Surveillance Evaluation",
        }
    }

    /// Short machine-friendly identifier.
    pub fn key(self) -> &'static str {
        match self {
            Column::Title => "title",
            Column::Year => "year",
            Column::Country => "country",
            Column::Platform => "platform",
            Column::HealthEvent => "health_event",
            Column::SurveillanceObjective => "surveillance_objective",
            Column::SurveillanceType => "surveillance_type",
            Column::ObjectiveSub => "objective_sub",
            Column::Finding => "finding",
            Column::AnalysisMethod1 => "analysis_method_1",
            Column::AnalysisMethod2 => "analysis_method_2",
            Column::AnalysisMethod3 => "analysis_method_3",
            Column::AnalysisMethod4 => "analysis_method_4",
            Column::AnalysisMethod5 => "analysis_method_5",
            Column::DataSource => "data_source",
            Column::SurveillanceEvaluation => "surveillance_evaluation",
        }
    }

    /// Human label used on filter widgets and chart axes.
    pub fn label(self) -> &'static str {
        match self {
            Column::Year => "Year",
            Column::Country => "Country",
            Column::Platform => "Platform",
            Column::HealthEvent => "Health Event",
            Column::AnalysisMethod1 => "Analysis Method",
            other => other.header(),
        }
    }

    pub fn is_required(self) -> bool {
        Column::REQUIRED.contains(&self)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

impl FromStr for Column {
    type Err = UnknownColumn;

    /// Accepts either the spreadsheet header or the short key, ignoring case
    /// and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Column::ALL
            .iter()
            .copied()
            .find(|c| {
                c.header().eq_ignore_ascii_case(wanted) || c.key().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| UnknownColumn(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Cell normalisation
// ---------------------------------------------------------------------------

/// Turn a raw cell into a category value. Blank cells are null.
pub fn normalize_cell(raw: &str) -> Option<String> {
    if raw.trim().is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}

/// Coerce a publication year to its string key.
///
/// Spreadsheets hand the year over as an integer, a float (`2020.0`) or text
/// depending on the reader. All three must group together, so integral
/// numbers are rendered without a fractional part and everything else is kept
/// as trimmed text. Years are opaque labels from here on.
pub fn normalize_year(raw: &str) -> Option<String> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }
    match text.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 => {
            Some(format!("{}", v as i64))
        }
        _ => Some(text.to_string()),
    }
}

/// Normalise a raw cell for the given column.
pub fn normalize_for(column: Column, raw: &str) -> Option<String> {
    match column {
        Column::Year => normalize_year(raw),
        _ => normalize_cell(raw),
    }
}

// ---------------------------------------------------------------------------
// Record – one study (one spreadsheet row)
// ---------------------------------------------------------------------------

/// A single published study. Every column is nullable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    values: [Option<String>; Column::COUNT],
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter, mostly for tests and generators.
    pub fn with(mut self, column: Column, value: impl Into<String>) -> Self {
        self.set(column, Some(value.into()));
        self
    }

    pub fn set(&mut self, column: Column, value: Option<String>) {
        self.values[column.index()] = value;
    }

    pub fn get(&self, column: Column) -> Option<&str> {
        self.values[column.index()].as_deref()
    }
}

// ---------------------------------------------------------------------------
// StudyTable – the loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed filter option lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudyTable {
    /// All studies in source order.
    pub records: Vec<Record>,
    /// For each column the sorted set of distinct non-null values.
    pub options: BTreeMap<Column, BTreeSet<String>>,
}

impl StudyTable {
    /// Build option lists from the loaded records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut options: BTreeMap<Column, BTreeSet<String>> = BTreeMap::new();
        for rec in &records {
            for col in Column::ALL {
                if let Some(val) = rec.get(col) {
                    options.entry(col).or_default().insert(val.to_string());
                }
            }
        }
        StudyTable { records, options }
    }

    /// Distinct non-null values of a column, sorted ascending.
    pub fn options_for(&self, column: Column) -> impl Iterator<Item = &str> {
        self.options
            .get(&column)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// Number of studies.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no studies.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_parses_header_and_key() {
        assert_eq!("Authors's country #1".parse::<Column>().unwrap(), Column::Country);
        assert_eq!("  data_source ".parse::<Column>().unwrap(), Column::DataSource);
        assert_eq!("YEAR OF PUBLICATION".parse::<Column>().unwrap(), Column::Year);
    }

    #[test]
    fn unknown_column_is_rejected() {
        let err = "Impact Factor".parse::<Column>().unwrap_err();
        assert_eq!(err.0, "Impact Factor");
    }

    #[test]
    fn all_columns_are_indexed_in_order() {
        for (i, col) in Column::ALL.iter().enumerate() {
            assert_eq!(col.index(), i);
        }
    }

    #[test]
    fn year_normalisation_unifies_numeric_forms() {
        assert_eq!(normalize_year("2020").as_deref(), Some("2020"));
        assert_eq!(normalize_year("2020.0").as_deref(), Some("2020"));
        assert_eq!(normalize_year(" 2019 ").as_deref(), Some("2019"));
        assert_eq!(normalize_year("2019-2020").as_deref(), Some("2019-2020"));
        assert_eq!(normalize_year("2020.5").as_deref(), Some("2020.5"));
        assert_eq!(normalize_year("   "), None);
    }

    #[test]
    fn blank_cells_are_null() {
        assert_eq!(normalize_cell(""), None);
        assert_eq!(normalize_cell("  \t"), None);
        assert_eq!(normalize_cell("Twitter").as_deref(), Some("Twitter"));
    }

    #[test]
    fn options_skip_nulls_and_sort() {
        let table = StudyTable::from_records(vec![
            Record::new().with(Column::Country, "USA"),
            Record::new().with(Column::Country, "Kenya"),
            Record::new(),
            Record::new().with(Column::Country, "USA"),
        ]);
        let countries: Vec<&str> = table.options_for(Column::Country).collect();
        assert_eq!(countries, vec!["Kenya", "USA"]);
        assert_eq!(table.options_for(Column::Platform).count(), 0);
        assert_eq!(table.len(), 4);
    }
}
