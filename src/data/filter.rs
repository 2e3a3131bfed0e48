use std::collections::{BTreeMap, BTreeSet};

use super::model::{Column, Record, StudyTable};

// ---------------------------------------------------------------------------
// Filter selection: which values are allowed per column
// ---------------------------------------------------------------------------

/// Per-column selection: maps column → set of allowed values.
///
/// A column that is absent, or whose set is empty, is unconstrained. The value
/// is rebuilt from the widgets on every interaction and handed to [`apply`];
/// nothing holds on to it between frames except the UI state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    allowed: BTreeMap<Column, BTreeSet<String>>,
}

impl FilterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the allowed set of one column.
    pub fn with_values<I, S>(mut self, column: Column, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        if set.is_empty() {
            self.allowed.remove(&column);
        } else {
            self.allowed.insert(column, set);
        }
        self
    }

    /// Add `value` to the column's allowed set, or remove it if present.
    pub fn toggle(&mut self, column: Column, value: &str) {
        let set = self.allowed.entry(column).or_default();
        if !set.remove(value) {
            set.insert(value.to_string());
        }
        if set.is_empty() {
            self.allowed.remove(&column);
        }
    }

    /// Drop the constraint on one column.
    pub fn clear_column(&mut self, column: Column) {
        self.allowed.remove(&column);
    }

    /// Drop every constraint.
    pub fn clear(&mut self) {
        self.allowed.clear();
    }

    /// Allowed values for a column; `None` when unconstrained.
    pub fn allowed(&self, column: Column) -> Option<&BTreeSet<String>> {
        self.allowed.get(&column).filter(|s| !s.is_empty())
    }

    pub fn is_selected(&self, column: Column, value: &str) -> bool {
        self.allowed(column).is_some_and(|s| s.contains(value))
    }

    /// Columns that actually constrain the result.
    pub fn active_columns(&self) -> impl Iterator<Item = Column> + '_ {
        self.allowed
            .iter()
            .filter(|(_, s)| !s.is_empty())
            .map(|(c, _)| *c)
    }

    /// True when no column is constrained.
    pub fn is_empty(&self) -> bool {
        self.active_columns().next().is_none()
    }

    /// Whether a single record passes every active constraint.
    ///
    /// A null cell never matches a non-empty allowed set.
    pub fn matches(&self, record: &Record) -> bool {
        self.allowed
            .iter()
            .filter(|(_, set)| !set.is_empty())
            .all(|(col, set)| record.get(*col).is_some_and(|v| set.contains(v)))
    }
}

/// Return indices of records that pass all active filters, in source order.
pub fn filtered_indices(table: &StudyTable, selection: &FilterSelection) -> Vec<usize> {
    table
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| selection.matches(rec))
        .map(|(i, _)| i)
        .collect()
}

/// Apply a selection to a table, producing the filtered table.
///
/// An empty selection returns a copy equal to the input.
pub fn apply(table: &StudyTable, selection: &FilterSelection) -> StudyTable {
    if selection.is_empty() {
        return table.clone();
    }
    let records = filtered_indices(table, selection)
        .into_iter()
        .map(|i| table.records[i].clone())
        .collect();
    StudyTable::from_records(records)
}
