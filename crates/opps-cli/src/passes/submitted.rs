//! Sum the final amount over submitted opportunities of a raw export.

use anyhow::Result;
use opps_ingest::Snapshot;
use opps_model::SubmittedConfig;
use opps_normalize::normalization::parse_amount;
use tracing::{info, info_span};

use crate::types::SubmittedTotal;

pub fn submitted_total(config: &SubmittedConfig, snapshot: &Snapshot) -> Result<SubmittedTotal> {
    let span = info_span!("submitted_total", input = %snapshot.path.display());
    let _guard = span.enter();

    let status_idx = snapshot.require_column(&config.status_column)?;
    let amount_idx = snapshot.require_column(&config.amount_column)?;
    let wanted = config.status_value.trim();

    let mut total = 0.0;
    let mut rows = 0;
    let mut skipped_amounts = 0;
    for row in &snapshot.rows {
        let cell = |idx: usize| row.values.get(idx).map_or("", String::as_str);
        if !cell(status_idx).trim().eq_ignore_ascii_case(wanted) {
            continue;
        }
        rows += 1;
        match parse_amount(cell(amount_idx)) {
            Some(amount) => total += amount,
            None => skipped_amounts += 1,
        }
    }

    info!(rows, skipped_amounts, "summed submitted amounts");
    Ok(SubmittedTotal {
        input: snapshot.path.clone(),
        total,
        rows,
        skipped_amounts,
    })
}

/// Two fraction digits with comma thousands separators: `1234.5` -> `1,234.50`.
pub fn format_thousands(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, digit) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{fraction}")
}
