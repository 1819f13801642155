//! Normalize the date columns of a positional snapshot in place.

use anyhow::Result;
use opps_ingest::Snapshot;
use opps_model::{DATE_FIELDS, FieldIssue, IssueKind};
use opps_normalize::normalization::clean_date_token;
use tracing::{info_span, trace};

use super::{PassContext, PassOutput, finish, line_number, start_records};
use crate::logging::redact_value;
use crate::types::PassReport;

pub fn fix_dates(ctx: &PassContext, snapshot: &Snapshot) -> Result<PassOutput> {
    let span = info_span!("fix_dates", input = %snapshot.path.display());
    let _guard = span.enter();

    let positions = snapshot.check_layout(&ctx.schema, &DATE_FIELDS)?;
    let dates = ctx.dates();
    let mut report = PassReport::new("fix-dates", snapshot.path.clone());
    report.rows_read = snapshot.len();

    let mut records = start_records(snapshot);
    for row in &snapshot.rows {
        let line = line_number(row);
        let mut values = row.values.clone();
        let mut touched = false;
        let mut changed = false;
        for (&idx, &column) in positions.iter().zip(DATE_FIELDS.iter()) {
            // Columns past the end of a short row are left alone.
            let Some(cell) = values.get_mut(idx) else {
                continue;
            };
            touched = true;
            let fixed = dates.normalize(cell);
            if fixed.is_empty() && !clean_date_token(cell).is_empty() {
                report.issues.push(
                    FieldIssue::new(line, IssueKind::UnparseableDate, cell.as_str()).with_column(column),
                );
            }
            if fixed != *cell {
                trace!(line, column, raw = redact_value(cell), fixed = %fixed, "date rewritten");
                *cell = fixed;
                changed = true;
            }
        }
        if !touched {
            report.rows_passed_through += 1;
        }
        if changed {
            report.rows_changed += 1;
        }
        records.push(values);
    }

    Ok(finish(records, !snapshot.header.is_empty(), report))
}
