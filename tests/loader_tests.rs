use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, DictionaryArray, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Int32Type, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use rust_xlsxwriter::Workbook;

use health_dashboard::data::error::LoadError;
use health_dashboard::data::loader::load_file;
use health_dashboard::data::model::Column;

const HEADERS: [&str; 9] = [
    "Title",
    "Year of Publication",
    "Authors's country #1",
    "Platform #1",
    "Health Event Under Surveillance",
    "Surveillance Objective",
    "Analysis Method #1",
    "Data Source",
    "Surveillance Evaluation",
];

const ROWS: [[&str; 9]; 3] = [
    ["Flu tweets", "2020", "USA", "Twitter", "Influenza", "Infodemiology", "NLP", "Tweets", "Yes"],
    ["Cholera posts", "2019", "Kenya", "Facebook", "Cholera", "Nowcasting", "ML", "Posts", "No"],
    ["HIV forums", "2020", "USA", "", "HIV", "Infodemiology", "NLP", "Forums", "No"],
];

fn assert_fixture_loaded(path: &Path) {
    let table = load_file(path).unwrap_or_else(|e| panic!("{}: {e}", path.display()));
    assert_eq!(table.len(), 3);
    let years: Vec<&str> = table.options_for(Column::Year).collect();
    assert_eq!(years, vec!["2019", "2020"]);
    assert_eq!(table.records[0].get(Column::Title), Some("Flu tweets"));
    assert_eq!(table.records[1].get(Column::Country), Some("Kenya"));
    assert_eq!(table.records[2].get(Column::Platform), None);
    assert_eq!(table.records[2].get(Column::Finding), None);
}

#[test]
fn loads_csv_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("studies.csv");
    let mut body = HEADERS.join(",");
    body.push('\n');
    for row in ROWS {
        body.push_str(&row.join(","));
        body.push('\n');
    }
    std::fs::write(&path, body).unwrap();
    assert_fixture_loaded(&path);
}

#[test]
fn loads_xlsx_with_numeric_years() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Public Health Surveillance.xlsx");

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (c, h) in HEADERS.iter().enumerate() {
        sheet.write_string(0, c as u16, *h).unwrap();
    }
    for (r, row) in ROWS.iter().enumerate() {
        let r = r as u32 + 1;
        for (c, cell) in row.iter().enumerate() {
            if c == 1 {
                sheet.write_number(r, c as u16, cell.parse::<f64>().unwrap()).unwrap();
            } else if !cell.is_empty() {
                sheet.write_string(r, c as u16, *cell).unwrap();
            }
        }
    }
    workbook.save(&path).unwrap();

    assert_fixture_loaded(&path);
}

#[test]
fn loads_parquet_with_float_years() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("studies.parquet");

    let mut fields = Vec::new();
    let mut arrays: Vec<ArrayRef> = Vec::new();
    for (c, h) in HEADERS.iter().enumerate() {
        if c == 1 {
            fields.push(Field::new(*h, DataType::Float64, true));
            let years: Vec<f64> = ROWS.iter().map(|r| r[1].parse().unwrap()).collect();
            arrays.push(Arc::new(Float64Array::from(years)));
        } else {
            fields.push(Field::new(*h, DataType::Utf8, true));
            let values: Vec<Option<&str>> = ROWS
                .iter()
                .map(|r| Some(r[c]).filter(|v| !v.is_empty()))
                .collect();
            arrays.push(Arc::new(StringArray::from(values)));
        }
    }
    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), arrays).unwrap();
    let file = std::fs::File::create(&path).unwrap();
    let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    assert_fixture_loaded(&path);
}

#[test]
fn loads_parquet_with_dictionary_encoded_strings() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("categories.parquet");

    let mut fields = Vec::new();
    let mut arrays: Vec<ArrayRef> = Vec::new();
    for (c, h) in HEADERS.iter().enumerate() {
        let values: Vec<Option<&str>> = ROWS
            .iter()
            .map(|r| Some(r[c]).filter(|v| !v.is_empty()))
            .collect();
        if c == 2 || c == 3 {
            // Country and Platform as pandas `category` columns.
            let dict: DictionaryArray<Int32Type> = values.into_iter().collect();
            fields.push(Field::new(*h, dict.data_type().clone(), true));
            arrays.push(Arc::new(dict));
        } else {
            fields.push(Field::new(*h, DataType::Utf8, true));
            arrays.push(Arc::new(StringArray::from(values)));
        }
    }
    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), arrays).unwrap();
    let file = std::fs::File::create(&path).unwrap();
    let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    assert_fixture_loaded(&path);
    let table = load_file(&path).unwrap();
    let countries: Vec<&str> = table.options_for(Column::Country).collect();
    assert_eq!(countries, vec!["Kenya", "USA"]);
}

#[test]
fn loads_json_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("studies.json");
    let records: Vec<serde_json::Value> = ROWS
        .iter()
        .map(|row| {
            let mut obj = serde_json::Map::new();
            for (h, cell) in HEADERS.iter().zip(row) {
                let value = if *h == "Year of Publication" {
                    serde_json::json!(cell.parse::<i64>().unwrap())
                } else if cell.is_empty() {
                    serde_json::Value::Null
                } else {
                    serde_json::json!(cell)
                };
                obj.insert(h.to_string(), value);
            }
            serde_json::Value::Object(obj)
        })
        .collect();
    std::fs::write(&path, serde_json::to_string(&records).unwrap()).unwrap();

    assert_fixture_loaded(&path);
}

#[test]
fn json_that_is_not_an_array_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("studies.json");
    std::fs::write(&path, r#"{"Title": "x"}"#).unwrap();
    assert!(matches!(load_file(&path), Err(LoadError::InvalidJson(_))));
}

#[test]
fn xlsx_without_required_columns_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("partial.xlsx");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "Title").unwrap();
    sheet.write_string(0, 1, "Year of Publication").unwrap();
    sheet.write_string(1, 0, "Only a title").unwrap();
    sheet.write_number(1, 1, 2020.0).unwrap();
    workbook.save(&path).unwrap();

    match load_file(&path) {
        Err(LoadError::MissingColumns(cols)) => assert_eq!(cols.len(), 7),
        other => panic!("expected MissingColumns, got {other:?}"),
    }
}
