//! Flag rows carrying a temporary project code in their remarks.

use std::collections::BTreeSet;

use anyhow::Result;
use opps_ingest::{Snapshot, TempCodeEntry};
use opps_model::ProjectCodeConfig;
use tracing::{debug, info_span};

use super::{PassContext, PassOutput, finish, line_number, start_records};
use crate::types::{PassReport, RowChange};

const NAME_COLUMN: &str = "project_name";
const CODE_COLUMN: &str = "project_code";
const REMARKS_COLUMN: &str = "remarks_comments";

/// Characters of the project name shown per annotated row.
const NAME_PREVIEW: usize = 60;

/// Temporary codes from the configuration and any code reports.
pub fn known_temp_codes(config: &ProjectCodeConfig, reports: &[TempCodeEntry]) -> BTreeSet<String> {
    config
        .temp_codes
        .iter()
        .map(|code| code.trim().to_string())
        .chain(reports.iter().map(|entry| entry.code.trim().to_string()))
        .filter(|code| !code.is_empty())
        .collect()
}

pub fn annotate_temp_codes(
    ctx: &PassContext,
    snapshot: &Snapshot,
    known: &BTreeSet<String>,
) -> Result<PassOutput> {
    let span = info_span!("annotate_temp_codes", input = %snapshot.path.display(), codes = known.len());
    let _guard = span.enter();

    let positions = snapshot.check_layout(&ctx.schema, &[NAME_COLUMN, CODE_COLUMN, REMARKS_COLUMN])?;
    let (name_idx, code_idx, remarks_idx) = (positions[0], positions[1], positions[2]);
    let min_width = name_idx.max(code_idx).max(remarks_idx) + 1;
    let note = ctx.config.project_codes.temp_code_note.as_str();

    let mut report = PassReport::new("annotate-temp-codes", snapshot.path.clone());
    report.rows_read = snapshot.len();
    let mut records = start_records(snapshot);

    for row in &snapshot.rows {
        let mut values = row.values.clone();
        if values.len() < min_width {
            report.rows_passed_through += 1;
            records.push(values);
            continue;
        }
        let remarks = values[remarks_idx].as_str();
        // A second run must not stack the note.
        if !known.contains(values[code_idx].trim()) || remarks.starts_with(note) {
            records.push(values);
            continue;
        }

        let annotated = if remarks.trim().is_empty() {
            note.to_string()
        } else {
            format!("{note}; {remarks}")
        };
        values[remarks_idx] = annotated;
        let line = line_number(row);
        debug!(line, code = %values[code_idx], "annotated temporary code");
        let preview: String = values[name_idx].chars().take(NAME_PREVIEW).collect();
        report.changes.push(RowChange {
            row: line,
            detail: format!("Updated row {line}: {preview}... -> Added temp code note"),
        });
        report.rows_changed += 1;
        records.push(values);
    }

    Ok(finish(records, !snapshot.header.is_empty(), report))
}
