//! Give rows with a bare `CMRP` project code a temporary code.

use anyhow::Result;
use opps_ingest::{Snapshot, TempCodeEntry};
use opps_model::{FieldIssue, IssueKind, UID_FIELD};
use opps_normalize::ProjectCodeGenerator;
use tracing::{debug, info_span};

use super::{PassContext, PassOutput, finish, line_number, start_records};
use crate::logging::redact_value;
use crate::types::{PassReport, RowChange};

const DATE_COLUMN: &str = "encoded_date";
const NAME_COLUMN: &str = "project_name";
const CODE_COLUMN: &str = "project_code";

#[derive(Debug, Clone)]
pub struct BackfillOutput {
    pub output: PassOutput,
    /// One entry per generated code, for the temporary code report.
    pub entries: Vec<TempCodeEntry>,
}

pub fn backfill_codes(ctx: &PassContext, snapshot: &Snapshot) -> Result<BackfillOutput> {
    let span = info_span!("backfill_codes", input = %snapshot.path.display());
    let _guard = span.enter();

    let positions = snapshot.check_layout(&ctx.schema, &[DATE_COLUMN, NAME_COLUMN, CODE_COLUMN])?;
    let (date_idx, name_idx, code_idx) = (positions[0], positions[1], positions[2]);
    let uid_idx = ctx.schema.index_of(UID_FIELD);
    let min_width = date_idx.max(name_idx).max(code_idx) + 1;

    let mut generator = ProjectCodeGenerator::new(&ctx.config.project_codes);
    for row in &snapshot.rows {
        if let Some(code) = row.values.get(code_idx) {
            generator.observe(code);
        }
    }

    let mut report = PassReport::new("backfill-codes", snapshot.path.clone());
    report.rows_read = snapshot.len();
    let mut entries = Vec::new();
    let mut records = start_records(snapshot);

    for row in &snapshot.rows {
        let line = line_number(row);
        let mut values = row.values.clone();
        if values.len() < min_width {
            report.rows_passed_through += 1;
            records.push(values);
            continue;
        }
        if !generator.is_incomplete(&values[code_idx]) {
            records.push(values);
            continue;
        }

        let date = values[date_idx].clone();
        let generated = generator.generate(&date);
        if generated.fallback {
            report.issues.push(
                FieldIssue::new(line, IssueKind::FallbackProjectCode, date.as_str())
                    .with_column(DATE_COLUMN),
            );
        }
        if generated.exhausted {
            report.issues.push(
                FieldIssue::new(line, IssueKind::SequenceExhausted, date.as_str())
                    .with_column(DATE_COLUMN),
            );
        }
        if generated.duplicate {
            report.issues.push(
                FieldIssue::new(line, IssueKind::DuplicateProjectCode, generated.code.as_str())
                    .with_column(CODE_COLUMN),
            );
        }

        let name = values[name_idx].clone();
        debug!(line, name = redact_value(&name), code = %generated.code, "generated project code");
        report.changes.push(RowChange {
            row: line,
            detail: format!("Fixed row {line}: '{name}' -> {}", generated.code),
        });
        report.rows_changed += 1;
        entries.push(TempCodeEntry {
            project_name: name,
            code: generated.code.clone(),
            date,
            uid: uid_idx
                .and_then(|idx| values.get(idx))
                .cloned()
                .unwrap_or_default(),
        });
        values[code_idx] = generated.code;
        records.push(values);
    }

    Ok(BackfillOutput {
        output: finish(records, !snapshot.header.is_empty(), report),
        entries,
    })
}
