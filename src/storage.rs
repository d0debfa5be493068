use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::types::{SelectionRecord, Taxonomy};

/// CSV columns, in output order
pub const CSV_HEADERS: [&str; 9] = [
    "announced_on",
    "investment_type",
    "amount_usd",
    "company_name",
    "website",
    "location",
    "categories",
    "crunchbase_url",
    "description",
];

/// File name for a run's CSV, e.g. `funded_travel_top2_2025-06-02.csv`
pub fn csv_file_name(target: usize, date: NaiveDate) -> String {
    format!("funded_travel_top{}_{}.csv", target, date.format("%Y-%m-%d"))
}

/// Write the records to a dated CSV under `dir`; the header is written even when empty
pub fn save_csv(dir: &Path, file_name: &str, records: &[SelectionRecord]) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create output directory {:?}", dir))?;
    let path = dir.join(file_name);

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(&path)
        .with_context(|| format!("Failed to open {:?}", path))?;

    writer
        .write_record(CSV_HEADERS)
        .context("Failed to write CSV header")?;
    for record in records {
        writer
            .serialize(record)
            .with_context(|| format!("Failed to write row for {}", record.company_name))?;
    }
    writer.flush().with_context(|| format!("Failed to flush {:?}", path))?;

    Ok(path)
}

/// Load a replacement taxonomy from YAML (`label` plus `keywords` list)
pub fn load_taxonomy(path: &Path) -> Result<Taxonomy> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read taxonomy from {:?}", path))?;

    let taxonomy: Taxonomy = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse taxonomy YAML {:?}", path))?;

    Ok(taxonomy)
}
