//! Rewrite a snapshot into the configured schema, field by field.

use anyhow::{Result, bail};
use opps_ingest::Snapshot;
use opps_normalize::{FieldSource, HeaderRow, RecordNormalizer};
use tracing::{debug, info_span, warn};

use super::{PassContext, PassOutput, finish, line_number};
use crate::types::PassReport;

pub fn format_snapshot(ctx: &PassContext, snapshot: &Snapshot) -> Result<PassOutput> {
    let span = info_span!("format", input = %snapshot.path.display(), schema = %ctx.schema.version);
    let _guard = span.enter();

    let missing: Vec<&str> = ctx
        .schema
        .header()
        .iter()
        .map(String::as_str)
        .filter(|&column| snapshot.column_index(column).is_none())
        .collect();
    if !snapshot.is_empty() && missing.len() == ctx.schema.width() {
        bail!(
            "{} names none of the columns of schema {}",
            snapshot.path.display(),
            ctx.schema.version
        );
    }
    if !missing.is_empty() {
        warn!(columns = %missing.join(","), "columns missing from input, written empty");
    }

    let normalizer = RecordNormalizer::new(ctx.dates(), ctx.schema.clone());
    let mut report = PassReport::new("format", snapshot.path.clone());
    report.rows_read = snapshot.len();

    let mut records = Vec::with_capacity(snapshot.len() + 1);
    records.push(ctx.schema.header().to_vec());
    for row in &snapshot.rows {
        let line = line_number(row);
        let source = HeaderRow::new(&snapshot.header, &row.values);
        let normalized = normalizer.normalize(line, &source);
        let unchanged = ctx
            .schema
            .header()
            .iter()
            .map(|column| source.field(column).unwrap_or_default())
            .eq(normalized.values.iter().map(String::as_str));
        if !unchanged {
            report.rows_changed += 1;
            debug!(line, "row normalized");
        }
        report.issues.extend(normalized.issues);
        records.push(normalized.values);
    }

    Ok(finish(records, true, report))
}
