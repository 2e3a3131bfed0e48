//! Write a synthetic surveillance-study dataset for trying the dashboard
//! without the real spreadsheet.
//!
//! Usage: cargo run --bin generate_sample -- [output_stem] [rows]
//! Produces `<stem>.csv` and `<stem>.parquet` (default stem `sample_studies`).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use health_dashboard::data::export::save_csv;
use health_dashboard::data::model::{Column, Record, StudyTable};

const COUNTRIES: &[&str] = &["USA", "USA", "USA", "UK", "Canada", "China", "India", "Kenya", "Brazil", "Australia"];
const PLATFORMS: &[&str] = &["Twitter", "Twitter", "Twitter", "Reddit", "Facebook", "Google Trends", "Instagram", "YouTube"];
const EVENTS: &[&str] = &[
    "Behavioral Risk Factors",
    "Communicable Diseases",
    "Non-communicable Diseases",
    "Mental Health",
    "Drug Use",
];
const OBJECTIVES: &[&str] = &["Infodemiology", "Nowcasting", "Event Detection", "Sentiment Analysis"];
const EVALUATIONS: &[&str] = &["Yes", "No", "Partially"];
const METHODS: &[&str] = &["Machine Learning", "NLP", "Statistical Analysis", "Content Analysis", "Deep Learning"];
const SOURCES: &[&str] = &[
    "Tweets",
    "Posts",
    "Search Queries",
    "Comments",
    "Images",
    "Videos",
    "News Articles",
    "Forums",
    "Blogs",
    "Reviews",
    "Check-ins",
    "Wikipedia Views",
    "App Data",
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn pick<'a>(&mut self, choices: &[&'a str]) -> &'a str {
        choices[(self.next_u64() % choices.len() as u64) as usize]
    }

    /// True with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        ((self.next_u64() >> 11) as f64 / (1u64 << 53) as f64) < p
    }
}

fn generate(rows: usize, rng: &mut SimpleRng) -> StudyTable {
    let records = (0..rows)
        .map(|i| {
            let year = 2010 + (rng.next_u64() % 11);
            let mut rec = Record::new()
                .with(Column::Title, format!("Study {:03}", i + 1))
                .with(Column::Year, year.to_string())
                .with(Column::Country, rng.pick(COUNTRIES))
                .with(Column::Platform, rng.pick(PLATFORMS))
                .with(Column::HealthEvent, rng.pick(EVENTS))
                .with(Column::SurveillanceObjective, rng.pick(OBJECTIVES))
                .with(Column::SurveillanceEvaluation, rng.pick(EVALUATIONS))
                .with(Column::AnalysisMethod1, rng.pick(METHODS))
                .with(Column::DataSource, rng.pick(SOURCES));
            if rng.chance(0.4) {
                rec = rec.with(Column::AnalysisMethod2, rng.pick(METHODS));
            }
            // Leave a few gaps, as the real spreadsheet has.
            if rng.chance(0.05) {
                rec.set(Column::Platform, None);
            }
            rec
        })
        .collect();
    StudyTable::from_records(records)
}

fn write_parquet(table: &StudyTable, path: &Path) -> Result<()> {
    let mut fields = Vec::with_capacity(Column::COUNT);
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(Column::COUNT);
    for col in Column::ALL {
        if col == Column::Year {
            // Numeric years, as pandas writes them.
            let years: Vec<Option<i64>> = table
                .records
                .iter()
                .map(|r| r.get(col).and_then(|y| y.parse().ok()))
                .collect();
            fields.push(Field::new(col.header(), DataType::Int64, true));
            arrays.push(Arc::new(Int64Array::from(years)));
        } else {
            let values: Vec<Option<&str>> = table.records.iter().map(|r| r.get(col)).collect();
            fields.push(Field::new(col.header(), DataType::Utf8, true));
            arrays.push(Arc::new(StringArray::from(values)));
        }
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let stem = args.next().unwrap_or_else(|| "sample_studies".to_string());
    let rows: usize = match args.next() {
        Some(n) => n.parse().with_context(|| format!("invalid row count {n:?}"))?,
        None => 755,
    };

    let mut rng = SimpleRng::new(42);
    let table = generate(rows, &mut rng);

    let csv_path = PathBuf::from(format!("{stem}.csv"));
    save_csv(&table, &csv_path).with_context(|| format!("writing {}", csv_path.display()))?;

    let parquet_path = PathBuf::from(format!("{stem}.parquet"));
    write_parquet(&table, &parquet_path)?;

    println!(
        "Wrote {} studies to {} and {}",
        table.len(),
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}
