use std::io::Write;
use std::path::Path;

use super::aggregate::{CountTable, CrossTab, ProportionTable, Trend};
use super::error::ExportError;
use super::model::{Column, StudyTable};

/// Measure column name shared by every count table.
pub const COUNT_HEADER: &str = "Number of Studies";
pub const PROPORTION_HEADER: &str = "Proportion";

/// A table that can be shown as a grid or written as CSV without knowing
/// which chart it belongs to.
pub trait Tabular {
    /// Column names, in output order.
    fn header(&self) -> Vec<String>;
    /// Cells row by row, same order as [`Tabular::header`].
    fn rows(&self) -> Vec<Vec<String>>;
}

impl Tabular for StudyTable {
    fn header(&self) -> Vec<String> {
        Column::ALL.iter().map(|c| c.header().to_string()).collect()
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.records
            .iter()
            .map(|rec| {
                Column::ALL
                    .iter()
                    .map(|c| rec.get(*c).unwrap_or_default().to_string())
                    .collect()
            })
            .collect()
    }
}

impl Tabular for CountTable {
    fn header(&self) -> Vec<String> {
        vec![self.column.header().to_string(), COUNT_HEADER.to_string()]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|r| vec![r.category.clone(), r.count.to_string()])
            .collect()
    }
}

impl Tabular for CrossTab {
    fn header(&self) -> Vec<String> {
        vec![
            self.outer.header().to_string(),
            self.inner.header().to_string(),
            COUNT_HEADER.to_string(),
        ]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|r| vec![r.outer.clone(), r.inner.clone(), r.count.to_string()])
            .collect()
    }
}

impl Tabular for ProportionTable {
    fn header(&self) -> Vec<String> {
        vec![
            self.outer.header().to_string(),
            self.inner.header().to_string(),
            COUNT_HEADER.to_string(),
            PROPORTION_HEADER.to_string(),
        ]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|r| {
                vec![
                    r.outer.clone(),
                    r.inner.clone(),
                    r.count.to_string(),
                    r.proportion.to_string(),
                ]
            })
            .collect()
    }
}

impl Tabular for Trend {
    fn header(&self) -> Vec<String> {
        vec![
            self.time.header().to_string(),
            self.series.header().to_string(),
            COUNT_HEADER.to_string(),
        ]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|p| vec![p.time.clone(), p.series.clone(), p.count.to_string()])
            .collect()
    }
}

// ---------------------------------------------------------------------------
// CSV writer
// ---------------------------------------------------------------------------

/// Write `table` as UTF-8 CSV: header row, then one line per row.
pub fn write_csv<T: Tabular + ?Sized, W: Write>(table: &T, writer: W) -> Result<(), ExportError> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(table.header())?;
    for row in table.rows() {
        out.write_record(&row)?;
    }
    out.flush()?;
    Ok(())
}

/// CSV bytes for a table, ready for a download or clipboard.
pub fn to_csv_bytes<T: Tabular + ?Sized>(table: &T) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    write_csv(table, &mut buf)?;
    Ok(buf)
}

/// Write `table` to a CSV file at `path`.
pub fn save_csv<T: Tabular + ?Sized>(table: &T, path: &Path) -> Result<(), ExportError> {
    let file = std::fs::File::create(path)?;
    write_csv(table, std::io::BufWriter::new(file))?;
    log::info!("Exported {} rows to {}", table.rows().len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::aggregate::{count_by, proportion_within, top_n_with_others};
    use crate::data::model::Record;

    fn table() -> StudyTable {
        StudyTable::from_records(vec![
            Record::new()
                .with(Column::Country, "USA")
                .with(Column::HealthEvent, "HIV")
                .with(Column::SurveillanceObjective, "Infodemiology"),
            Record::new()
                .with(Column::Country, "USA")
                .with(Column::Title, "Vaccines, \"myths\" and Twitter")
                .with(Column::HealthEvent, "HIV")
                .with(Column::SurveillanceObjective, "Nowcasting"),
            Record::new().with(Column::Country, "Kenya"),
        ])
    }

    #[test]
    fn count_table_csv_has_header_and_rows() {
        let bytes = to_csv_bytes(&count_by(&table(), Column::Country)).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "Authors's country #1,Number of Studies\nUSA,2\nKenya,1\n");
    }

    #[test]
    fn others_bucket_is_exported_last() {
        let text = String::from_utf8(
            to_csv_bytes(&top_n_with_others(&table(), Column::Country, 1)).unwrap(),
        )
        .unwrap();
        assert!(text.ends_with("USA,2\nOthers,1\n"));
    }

    #[test]
    fn proportion_export_carries_both_measures() {
        let shares = proportion_within(&table(), Column::HealthEvent, Column::SurveillanceObjective);
        assert_eq!(
            shares.header(),
            vec![
                "Health Event Under Surveillance",
                "Surveillance Objective",
                COUNT_HEADER,
                PROPORTION_HEADER
            ]
        );
        assert_eq!(shares.rows()[0], vec!["HIV", "Infodemiology", "1", "0.5"]);
    }

    #[test]
    fn raw_export_quotes_and_keeps_source_order() {
        let text = String::from_utf8(to_csv_bytes(&table()).unwrap()).unwrap();
        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("Title,Year of Publication,Authors's country #1"));
        assert_eq!(header.split(',').count(), Column::COUNT);
        assert!(text.contains("\"Vaccines, \"\"myths\"\" and Twitter\""));
        let last = text.lines().last().unwrap();
        assert!(last.starts_with(",,Kenya,"));
    }
}
