//! Batch passes over a snapshot.
//!
//! Every pass reads a whole [`Snapshot`], rewrites the rows it is responsible
//! for and returns every row, touched or not, in input order. Rows are never
//! dropped. Writing the result is left to the caller.

pub mod annotate;
pub mod backfill;
pub mod dates;
pub mod format;
pub mod import;
pub mod submitted;

use anyhow::Result;
use opps_ingest::{Snapshot, SnapshotRow};
use opps_model::{ColumnSchema, FieldIssue, ScrubConfig};
use opps_normalize::DateNormalizer;
use tracing::{info, warn};

use crate::logging::redact_value;
use crate::types::PassReport;

pub use annotate::{annotate_temp_codes, known_temp_codes};
pub use backfill::{BackfillOutput, backfill_codes};
pub use dates::fix_dates;
pub use format::format_snapshot;
pub use import::prepare_import;
pub use submitted::{format_thousands, submitted_total};

/// Configuration shared by the passes of one invocation.
#[derive(Debug, Clone)]
pub struct PassContext {
    pub config: ScrubConfig,
    /// The configured layout, resolved once.
    pub schema: ColumnSchema,
}

impl PassContext {
    pub fn new(config: ScrubConfig) -> Result<Self> {
        let schema = config.resolve_schema()?;
        Ok(Self { config, schema })
    }

    pub fn dates(&self) -> DateNormalizer {
        DateNormalizer::new(self.config.reference_year)
    }
}

/// Rows to write plus the report describing them.
#[derive(Debug, Clone)]
pub struct PassOutput {
    pub records: Vec<Vec<String>>,
    pub report: PassReport,
}

pub(crate) fn line_number(row: &SnapshotRow) -> usize {
    usize::try_from(row.line).unwrap_or(usize::MAX)
}

/// The header, if any, starts the output unchanged.
pub(crate) fn start_records(snapshot: &Snapshot) -> Vec<Vec<String>> {
    let mut records = Vec::with_capacity(snapshot.len() + 1);
    if !snapshot.header.is_empty() {
        records.push(snapshot.header.clone());
    }
    records
}

pub(crate) fn issue_event(pass: &str, issue: &FieldIssue) {
    warn!(
        pass,
        row = issue.row,
        column = issue.column.as_deref().unwrap_or("-"),
        kind = %issue.kind,
        raw = redact_value(&issue.raw),
        "field issue"
    );
}

/// Log the issues and counts of a finished pass. `with_header` says whether
/// `records` starts with a header row.
pub(crate) fn finish(records: Vec<Vec<String>>, with_header: bool, mut report: PassReport) -> PassOutput {
    report.rows_written = records.len() - usize::from(with_header && !records.is_empty());
    for issue in &report.issues {
        issue_event(&report.pass, issue);
    }
    info!(
        pass = %report.pass,
        rows_read = report.rows_read,
        rows_written = report.rows_written,
        rows_changed = report.rows_changed,
        rows_passed_through = report.rows_passed_through,
        issues = report.issues.len(),
        "pass complete"
    );
    PassOutput { records, report }
}
