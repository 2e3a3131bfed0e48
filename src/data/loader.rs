use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::error::ArrowError;
use calamine::{open_workbook_auto, Data, Reader};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::LoadError;
use super::model::{normalize_for, Column, Record, StudyTable};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a study table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xls` / `.ods` – first worksheet, header in row 1
/// * `.csv`     – header row with the spreadsheet column names
/// * `.parquet` – one column per spreadsheet column (string or numeric)
/// * `.json`    – `[{ "Year of Publication": 2020, ... }, ...]`
pub fn load_file(path: &Path) -> Result<StudyTable, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "xlsx" | "xlsm" | "xls" | "ods" => load_workbook(path)?,
        "csv" => {
            let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            read_csv(file)?
        }
        "parquet" | "pq" => load_parquet(path)?,
        "json" => load_json(path)?,
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };

    log::info!("Loaded {} studies from {}", table.len(), path.display());
    Ok(table)
}

// ---------------------------------------------------------------------------
// Header mapping shared by every tabular reader
// ---------------------------------------------------------------------------

/// Position of each known column in the source header row.
struct HeaderMap {
    positions: Vec<(Column, usize)>,
}

impl HeaderMap {
    /// Map header cells onto [`Column`]s. Unknown headers are ignored; a missing
    /// required column fails the load.
    fn resolve<S: AsRef<str>>(headers: &[S]) -> Result<Self, LoadError> {
        let mut positions = Vec::new();
        for (idx, header) in headers.iter().enumerate() {
            match header.as_ref().parse::<Column>() {
                Ok(col) if !positions.iter().any(|(c, _)| *c == col) => {
                    positions.push((col, idx))
                }
                Ok(col) => log::warn!("Duplicate column {col:?} at position {idx}, ignored"),
                Err(_) => log::debug!("Ignoring column {:?}", header.as_ref()),
            }
        }

        let missing: Vec<String> = Column::REQUIRED
            .iter()
            .filter(|req| !positions.iter().any(|(c, _)| c == *req))
            .map(|c| c.header().to_string())
            .collect();
        if !missing.is_empty() {
            return Err(LoadError::MissingColumns(missing));
        }

        Ok(HeaderMap { positions })
    }

    /// Build a record from one row, given a way to read a cell as text.
    fn record<F>(&self, cell: F) -> Record
    where
        F: Fn(usize) -> Option<String>,
    {
        let mut rec = Record::new();
        for &(col, idx) in &self.positions {
            let value = cell(idx).and_then(|raw| normalize_for(col, &raw));
            rec.set(col, value);
        }
        rec
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Read a CSV source whose header row carries the spreadsheet column names.
pub fn read_csv<R: Read>(source: R) -> Result<StudyTable, LoadError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(source);
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let map = HeaderMap::resolve(&headers)?;

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result?;
        records.push(map.record(|idx| row.get(idx).map(str::to_string)));
    }

    Ok(StudyTable::from_records(records))
}

// ---------------------------------------------------------------------------
// Workbook loader (xlsx / xls / ods)
// ---------------------------------------------------------------------------

fn load_workbook(path: &Path) -> Result<StudyTable, LoadError> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(LoadError::EmptyWorkbook)?;
    log::debug!("Reading worksheet {sheet:?} of {}", path.display());

    let range = workbook.worksheet_range(&sheet)?;
    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(row) => row.iter().map(|c| cell_text(c).trim().to_string()).collect(),
        None => Vec::new(),
    };
    let map = HeaderMap::resolve(&headers)?;

    let records = rows
        .filter(|row| row.iter().any(|c| !matches!(c, Data::Empty)))
        .map(|row| map.record(|idx| row.get(idx).map(cell_text)))
        .collect();

    Ok(StudyTable::from_records(records))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => format!("{f}"),
        Data::Int(i) => format!("{i}"),
        Data::Bool(b) => format!("{b}"),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(_) => String::new(),
        other => format!("{other:?}"),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `to_json(orient='records')`):
///
/// ```json
/// [
///   { "Year of Publication": 2020, "Authors's country #1": "USA", ... },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<StudyTable, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let root: JsonValue = serde_json::from_str(&text)?;

    let rows = root
        .as_array()
        .ok_or_else(|| LoadError::InvalidJson("expected top-level array".into()))?;

    let mut objects = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .ok_or_else(|| LoadError::InvalidJson(format!("row {i} is not an object")))?;
        objects.push(obj);
    }

    // The header is the union of keys in first-seen order.
    let mut headers: Vec<String> = Vec::new();
    for obj in &objects {
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }
    let map = HeaderMap::resolve(&headers)?;

    let records = objects
        .iter()
        .map(|obj| map.record(|idx| obj.get(&headers[idx]).and_then(json_text)))
        .collect();

    Ok(StudyTable::from_records(records))
}

fn json_text(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one column per spreadsheet column.
///
/// String, integer, float and boolean columns are read directly; anything else
/// (pandas `category` dictionaries, Polars string views, dates) is cast to
/// Utf8 first. Works with files written by both **Pandas**
/// (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<StudyTable, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let map = HeaderMap::resolve(&headers)?;
    let reader = builder.build()?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        let mut columns: Vec<ArrayRef> = batch.columns().to_vec();
        for &(_, idx) in &map.positions {
            columns[idx] = readable_column(&columns[idx])?;
        }
        for row in 0..batch.num_rows() {
            records.push(map.record(|idx| arrow_text(&columns[idx], row)));
        }
    }

    Ok(StudyTable::from_records(records))
}

/// Cast a column `arrow_text` cannot read into Utf8.
fn readable_column(col: &ArrayRef) -> Result<ArrayRef, ArrowError> {
    match col.data_type() {
        DataType::Utf8
        | DataType::LargeUtf8
        | DataType::Int32
        | DataType::Int64
        | DataType::Float32
        | DataType::Float64
        | DataType::Boolean => Ok(Arc::clone(col)),
        _ => cast(col, &DataType::Utf8),
    }
}

/// Extract a single cell from an Arrow column as text.
fn arrow_text(col: &ArrayRef, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    let text = match col.data_type() {
        DataType::Utf8 => col.as_string::<i32>().value(row).to_string(),
        DataType::LargeUtf8 => col.as_string::<i64>().value(row).to_string(),
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()?
            .value(row)
            .to_string(),
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()?
            .value(row)
            .to_string(),
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()?
            .value(row)
            .to_string(),
        DataType::Float64 => {
            let v = col.as_any().downcast_ref::<Float64Array>()?.value(row);
            // NaN is how pandas spells a missing float.
            if v.is_nan() {
                return None;
            }
            v.to_string()
        }
        DataType::Boolean => col
            .as_any()
            .downcast_ref::<BooleanArray>()?
            .value(row)
            .to_string(),
        // Never reached after `readable_column`.
        _ => return None,
    };
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Title,Year of Publication,Authors's country #1,Platform #1,\
Health Event Under Surveillance,Surveillance Objective,Analysis Method #1,\
Data Source,Surveillance Evaluation";

    #[test]
    fn csv_with_all_required_columns_loads() {
        let body = format!(
            "{HEADER}\n\
             Flu on Twitter,2020.0,USA,Twitter,Influenza,Infodemiology,NLP,Tweets,Yes\n\
             Cholera,2019,Kenya,Facebook,Cholera,Nowcasting,,Posts,No\n"
        );
        let table = read_csv(body.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].get(Column::Year), Some("2020"));
        assert_eq!(table.records[0].get(Column::Title), Some("Flu on Twitter"));
        assert_eq!(table.records[1].get(Column::AnalysisMethod1), None);
        // Optional column absent from the header loads as null.
        assert_eq!(table.records[1].get(Column::Finding), None);
    }

    #[test]
    fn missing_required_columns_are_reported() {
        let body = "Title,Year of Publication\nA,2020\n";
        match read_csv(body.as_bytes()) {
            Err(LoadError::MissingColumns(cols)) => {
                assert!(cols.contains(&"Authors's country #1".to_string()));
                assert!(cols.contains(&"Data Source".to_string()));
                assert!(!cols.contains(&"Year of Publication".to_string()));
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn unknown_headers_are_ignored() {
        let body = format!("{HEADER},Impact Factor\nT,2021,USA,Reddit,HIV,Surveillance,ML,Posts,No,3.2\n");
        let table = read_csv(body.as_bytes()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.records[0].get(Column::Platform), Some("Reddit"));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("studies.txt");
        std::fs::write(&path, "x").unwrap();
        assert!(matches!(
            load_file(&path),
            Err(LoadError::UnsupportedFormat(ext)) if ext == "txt"
        ));
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_file(Path::new("/nonexistent/Public Health Surveillance.xlsx")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }

    #[test]
    fn workbook_cells_render_as_text() {
        assert_eq!(cell_text(&Data::Float(2020.0)), "2020");
        assert_eq!(cell_text(&Data::Int(7)), "7");
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::String("USA".into())), "USA");
    }
}
