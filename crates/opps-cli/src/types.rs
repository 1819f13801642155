use std::path::PathBuf;

use opps_model::FieldIssue;
use serde::Serialize;

/// A row a pass rewrote, with the line announced to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowChange {
    pub row: usize,
    pub detail: String,
}

/// Outcome of one batch pass over a snapshot.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PassReport {
    pub pass: String,
    pub input: PathBuf,
    pub output: PathBuf,
    /// Data rows read, header excluded.
    pub rows_read: usize,
    pub rows_written: usize,
    pub rows_changed: usize,
    /// Rows written unchanged because they failed the pass precondition.
    pub rows_passed_through: usize,
    pub issues: Vec<FieldIssue>,
    /// Per-row notes, printed for the passes that announce each fix.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<RowChange>,
}

impl PassReport {
    /// An empty report; `output` is filled in once the snapshot is written.
    pub fn new(pass: &str, input: PathBuf) -> Self {
        Self {
            pass: pass.to_string(),
            input,
            ..Self::default()
        }
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }
}

/// Result of `submitted-total`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmittedTotal {
    pub input: PathBuf,
    pub total: f64,
    /// Rows with the submitted status, including those whose amount did not parse.
    pub rows: usize,
    pub skipped_amounts: usize,
}
