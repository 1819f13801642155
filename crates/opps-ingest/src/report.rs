//! The temporary project code report.
//!
//! `backfill-codes` lists every code it synthesized so that the rows can be
//! found again and annotated, or corrected by hand.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{IngestError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TempCodeEntry {
    #[serde(rename = "Project Name")]
    pub project_name: String,
    #[serde(rename = "Generated Code")]
    pub code: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "UID")]
    pub uid: String,
}

pub fn write_code_report(path: &Path, entries: &[TempCodeEntry]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|source| IngestError::write(path, source))?;
    for entry in entries {
        writer
            .serialize(entry)
            .map_err(|source| IngestError::write(path, source))?;
    }
    writer.flush().map_err(|source| IngestError::io(path, source))
}

pub fn read_code_report(path: &Path) -> Result<Vec<TempCodeEntry>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| IngestError::Open {
            path: path.to_path_buf(),
            source,
        })?;
    reader
        .deserialize()
        .map(|entry| {
            entry.map_err(|source| IngestError::Read {
                path: path.to_path_buf(),
                line: source.position().map_or(0, csv::Position::line),
                source,
            })
        })
        .collect()
}
