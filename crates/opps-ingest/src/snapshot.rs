use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use opps_model::{ColumnSchema, header_matches};
use tracing::debug;

use crate::error::{IngestError, Result};

/// One data row with the line it started on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRow {
    pub line: u64,
    pub values: Vec<String>,
}

/// A whole CSV snapshot held in memory.
///
/// Cells are kept exactly as read so that rows a pass does not touch are
/// written back unchanged. Rows keep their own width; nothing is padded.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub path: PathBuf,
    pub header: Vec<String>,
    pub rows: Vec<SnapshotRow>,
}

impl Snapshot {
    pub fn read(path: &Path) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)
            .map_err(|source| IngestError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        let mut header = Vec::new();
        let mut rows = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let record = record.map_err(|source| IngestError::Read {
                path: path.to_path_buf(),
                line: source.position().map_or(0, csv::Position::line),
                source,
            })?;
            let line = record.position().map_or(idx as u64 + 1, csv::Position::line);
            let values: Vec<String> = record.iter().map(str::to_string).collect();
            if idx == 0 {
                header = values;
                if let Some(first) = header.first_mut() {
                    *first = first.trim_start_matches('\u{feff}').to_string();
                }
            } else {
                rows.push(SnapshotRow { line, values });
            }
        }

        debug!(path = %path.display(), rows = rows.len(), "read snapshot");
        Ok(Self {
            path: path.to_path_buf(),
            header,
            rows,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a header column, compared with [`header_matches`].
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header
            .iter()
            .position(|header| header_matches(header, name))
    }

    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| IngestError::MissingColumn {
                path: self.path.clone(),
                column: name.to_string(),
            })
    }

    /// Check that the header agrees with `schema` at the position of every
    /// column in `columns`. A snapshot without a header is not checked.
    pub fn check_layout(&self, schema: &ColumnSchema, columns: &[&str]) -> Result<Vec<usize>> {
        let positions = schema.require_all(columns)?;
        if self.header.is_empty() {
            return Ok(positions);
        }
        for (&position, column) in positions.iter().zip(columns) {
            let found = self.header.get(position).map_or("", String::as_str);
            if !header_matches(found, column) {
                return Err(IngestError::HeaderMismatch {
                    path: self.path.clone(),
                    version: schema.version.clone(),
                    position,
                    expected: (*column).to_string(),
                    found: found.to_string(),
                });
            }
        }
        Ok(positions)
    }

    /// Header followed by every row, ready to write.
    pub fn into_records(self) -> Vec<Vec<String>> {
        let mut records = Vec::with_capacity(self.rows.len() + 1);
        if !self.header.is_empty() {
            records.push(self.header);
        }
        records.extend(self.rows.into_iter().map(|row| row.values));
        records
    }
}
