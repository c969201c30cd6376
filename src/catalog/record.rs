use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;

/// One catalog row as it appears in the source file. All fields stay textual
/// until [`super::map_records`] normalizes them.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(default, rename = "Released")]
    pub released: String,
    #[serde(default, rename = "Genre")]
    pub genre: String,
    #[serde(default, rename = "imdbRating")]
    pub rating: String,
    #[serde(default, rename = "imdbVotes")]
    pub votes: String,
    #[serde(default, rename = "Rated")]
    pub rated: String,
}

pub fn load_records(path: &Path) -> Result<Vec<RawRecord>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read dataset {}", path.display()))?;
    parse_records(&raw).with_context(|| format!("failed to parse dataset {}", path.display()))
}

pub fn parse_records(raw: &str) -> Result<Vec<RawRecord>> {
    let parsed: Value = serde_json::from_str(raw).context("invalid JSON in dataset")?;
    let rows = parsed
        .as_array()
        .ok_or_else(|| anyhow!("dataset must be a JSON array of records"))?;

    let mut records = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        let record = RawRecord::deserialize(row)
            .with_context(|| format!("invalid record at position {index}"))?;
        records.push(record);
    }

    Ok(records)
}
