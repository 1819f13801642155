//! Shape a snapshot for the database import.
//!
//! The import accepts exactly `import.width` columns and rejects folder ids
//! too short to be real, so short ids are cleared and rows are cut to width.

use anyhow::{Result, bail};
use opps_ingest::Snapshot;
use opps_model::{FieldIssue, IssueKind};
use tracing::{debug, info_span};

use super::{PassContext, PassOutput, finish, line_number};
use crate::types::PassReport;

pub fn prepare_import(ctx: &PassContext, snapshot: &Snapshot) -> Result<PassOutput> {
    let import = &ctx.config.import;
    let span = info_span!("prepare_import", input = %snapshot.path.display(), width = import.width);
    let _guard = span.enter();

    let schema = ctx.config.schema_named(&import.schema)?;
    let folder_column = import.folder_id_column.as_str();
    let folder_idx = snapshot.check_layout(&schema, &[folder_column])?[0];
    if folder_idx >= import.width {
        bail!(
            "{folder_column} is column {folder_idx} of schema {}, past the import width {}",
            schema.version,
            import.width
        );
    }

    let mut report = PassReport::new("prepare-import", snapshot.path.clone());
    report.rows_read = snapshot.len();
    let mut records = Vec::with_capacity(snapshot.len() + 1);
    if !snapshot.header.is_empty() {
        let mut header = snapshot.header.clone();
        header.truncate(import.width);
        records.push(header);
    }

    for row in &snapshot.rows {
        let line = line_number(row);
        let mut values = row.values.clone();
        if values.len() < import.width {
            report.rows_passed_through += 1;
            report.issues.push(FieldIssue::new(
                line,
                IssueKind::ShortRow,
                format!("{} of {} columns", values.len(), import.width),
            ));
            records.push(values);
            continue;
        }

        let mut changed = values.len() > import.width;
        let folder_id = &values[folder_idx];
        if !folder_id.is_empty() && folder_id.trim().chars().count() <= import.short_folder_id_len {
            report.issues.push(
                FieldIssue::new(line, IssueKind::ClearedFolderId, folder_id.as_str())
                    .with_column(folder_column),
            );
            values[folder_idx].clear();
            changed = true;
        }
        values.truncate(import.width);
        if changed {
            debug!(line, "row prepared for import");
            report.rows_changed += 1;
        }
        records.push(values);
    }

    Ok(finish(records, !snapshot.header.is_empty(), report))
}
