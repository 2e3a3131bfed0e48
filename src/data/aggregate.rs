//! Pure aggregations from a (filtered) [`StudyTable`] to the small derived
//! tables each chart consumes.
//!
//! Every function here is deterministic: equal counts are ordered by category
//! label ascending so chart ordering is stable between frames. Null cells never
//! form a group.

use std::collections::BTreeMap;

use super::error::NoDataError;
use super::model::{Column, StudyTable};

/// Label of the synthetic bucket produced by [`top_n_with_others`].
pub const OTHERS: &str = "Others";

/// Default bucket size for [`top_n_with_others`].
pub const DEFAULT_TOP_N: usize = 10;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairCount {
    pub outer: String,
    pub inner: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PairShare {
    pub outer: String,
    pub inner: String,
    pub count: usize,
    /// `count` divided by the total of its `outer` group.
    pub proportion: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendPoint {
    pub time: String,
    pub series: String,
    pub count: usize,
}

// ---------------------------------------------------------------------------
// Derived tables
// ---------------------------------------------------------------------------

/// Counts per category of one column, count descending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountTable {
    pub column: Column,
    pub rows: Vec<CategoryCount>,
}

impl CountTable {
    pub fn total(&self) -> usize {
        self.rows.iter().map(|r| r.count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Count for one category, if present.
    pub fn get(&self, category: &str) -> Option<usize> {
        self.rows
            .iter()
            .find(|r| r.category == category)
            .map(|r| r.count)
    }
}

/// Counts per observed `(outer, inner)` pair, outer ascending then inner ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossTab {
    pub outer: Column,
    pub inner: Column,
    pub rows: Vec<PairCount>,
}

impl CrossTab {
    pub fn total(&self) -> usize {
        self.rows.iter().map(|r| r.count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Outer groups with their subtotal and children, in row order.
    pub fn groups(&self) -> Vec<(&str, usize, Vec<&PairCount>)> {
        let mut out: Vec<(&str, usize, Vec<&PairCount>)> = Vec::new();
        for row in &self.rows {
            match out.last_mut() {
                Some((outer, total, children)) if *outer == row.outer => {
                    *total += row.count;
                    children.push(row);
                }
                _ => out.push((row.outer.as_str(), row.count, vec![row])),
            }
        }
        out
    }
}

/// [`CrossTab`] rows carrying their share of the outer group.
#[derive(Debug, Clone, PartialEq)]
pub struct ProportionTable {
    pub outer: Column,
    pub inner: Column,
    pub rows: Vec<PairShare>,
}

impl ProportionTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Counts per `(time, series)`, time ascending as text then series ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trend {
    pub time: Column,
    pub series: Column,
    pub rows: Vec<TrendPoint>,
}

impl Trend {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct time labels in axis order.
    pub fn times(&self) -> Vec<&str> {
        let mut times: Vec<&str> = self.rows.iter().map(|p| p.time.as_str()).collect();
        times.dedup();
        times
    }

    /// Points grouped by series; series ascending, points in time order.
    pub fn series(&self) -> BTreeMap<&str, Vec<&TrendPoint>> {
        let mut out: BTreeMap<&str, Vec<&TrendPoint>> = BTreeMap::new();
        for p in &self.rows {
            out.entry(p.series.as_str()).or_default().push(p);
        }
        out
    }
}

/// Most frequent value of a column and how often it occurs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mode {
    pub value: String,
    pub count: usize,
}

/// Headline metrics shown above the charts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Studies matching the current filters.
    pub total_studies: usize,
    /// Studies with a recorded health event.
    pub total_surveillance: usize,
    /// Most used platform and its study count; `None` when no matching
    /// study names a platform.
    pub top_platform: Option<Mode>,
}

impl Summary {
    pub fn compute(table: &StudyTable) -> Result<Self, NoDataError> {
        if table.is_empty() {
            return Err(NoDataError);
        }
        Ok(Summary {
            total_studies: total(table),
            total_surveillance: non_null_count(table, Column::HealthEvent),
            top_platform: mode(table, Column::Platform).ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// Aggregators
// ---------------------------------------------------------------------------

fn tally<'a, K: Ord>(
    table: &'a StudyTable,
    key: impl Fn(&'a super::model::Record) -> Option<K>,
) -> BTreeMap<K, usize> {
    let mut counts = BTreeMap::new();
    for rec in &table.records {
        if let Some(k) = key(rec) {
            *counts.entry(k).or_insert(0) += 1;
        }
    }
    counts
}

/// Group by `column` and count rows; count descending, label ascending.
pub fn count_by(table: &StudyTable, column: Column) -> CountTable {
    let mut rows: Vec<CategoryCount> = tally(table, |r| r.get(column))
        .into_iter()
        .map(|(category, count)| CategoryCount {
            category: category.to_string(),
            count,
        })
        .collect();
    // Stable sort keeps the label-ascending order of the BTreeMap for ties.
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    CountTable { column, rows }
}

/// [`count_by`] truncated to the first `n` categories, with the remainder
/// summed into a trailing [`OTHERS`] row. No `Others` row when nothing remains.
pub fn top_n_with_others(table: &StudyTable, column: Column, n: usize) -> CountTable {
    let mut counts = count_by(table, column);
    if counts.rows.len() > n {
        let rest: usize = counts.rows.drain(n..).map(|r| r.count).sum();
        counts.rows.push(CategoryCount {
            category: OTHERS.to_string(),
            count: rest,
        });
    }
    counts
}

/// Count rows per observed `(outer, inner)` pair.
pub fn cross_tab(table: &StudyTable, outer: Column, inner: Column) -> CrossTab {
    let rows = tally(table, |r| Some((r.get(outer)?, r.get(inner)?)))
        .into_iter()
        .map(|((o, i), count)| PairCount {
            outer: o.to_string(),
            inner: i.to_string(),
            count,
        })
        .collect();
    CrossTab { outer, inner, rows }
}

/// [`cross_tab`] with each row's share of its outer group.
pub fn proportion_within(table: &StudyTable, outer: Column, inner: Column) -> ProportionTable {
    let tab = cross_tab(table, outer, inner);
    let mut group_totals: BTreeMap<&str, usize> = BTreeMap::new();
    for row in &tab.rows {
        *group_totals.entry(row.outer.as_str()).or_insert(0) += row.count;
    }

    // Every outer value present has at least one row, so totals are non-zero.
    let rows = tab
        .rows
        .iter()
        .map(|row| {
            let group = group_totals[row.outer.as_str()];
            PairShare {
                outer: row.outer.clone(),
                inner: row.inner.clone(),
                count: row.count,
                proportion: row.count as f64 / group as f64,
            }
        })
        .collect();
    ProportionTable { outer, inner, rows }
}

/// Count rows per `(time, series)`. Time labels sort as plain strings.
pub fn trend_over_time(table: &StudyTable, time: Column, series: Column) -> Trend {
    let rows = tally(table, |r| Some((r.get(time)?, r.get(series)?)))
        .into_iter()
        .map(|((t, s), count)| TrendPoint {
            time: t.to_string(),
            series: s.to_string(),
            count,
        })
        .collect();
    Trend { time, series, rows }
}

/// Number of rows in the table.
pub fn total(table: &StudyTable) -> usize {
    table.len()
}

/// Number of rows with a value in `column`.
pub fn non_null_count(table: &StudyTable, column: Column) -> usize {
    table
        .records
        .iter()
        .filter(|r| r.get(column).is_some())
        .count()
}

/// The most frequent non-null value of `column`; ties go to the smallest label.
pub fn mode(table: &StudyTable, column: Column) -> Result<Mode, NoDataError> {
    count_by(table, column)
        .rows
        .into_iter()
        .next()
        .map(|r| Mode {
            value: r.category,
            count: r.count,
        })
        .ok_or(NoDataError)
}

/// Outer categories ordered by the share of `inner_value` within them,
/// largest share first (ties by label). Outer categories without that inner
/// value follow in label order.
pub fn order_by_share(table: &ProportionTable, inner_value: &str) -> Vec<String> {
    let mut shares: BTreeMap<&str, f64> = BTreeMap::new();
    let mut rest: Vec<&str> = Vec::new();
    for row in &table.rows {
        if row.inner == inner_value {
            *shares.entry(row.outer.as_str()).or_insert(0.0) += row.proportion;
        }
    }
    for row in &table.rows {
        let o = row.outer.as_str();
        if !shares.contains_key(o) && rest.last() != Some(&o) {
            rest.push(o);
        }
    }

    let mut ranked: Vec<(&str, f64)> = shares.into_iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
        .into_iter()
        .map(|(o, _)| o)
        .chain(rest)
        .map(str::to_string)
        .collect()
}
