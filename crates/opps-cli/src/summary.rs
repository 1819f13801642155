use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use opps_model::{ColumnSchema, FieldIssue, IssueKind, count_by_kind};

use crate::passes::format_thousands;
use crate::types::{PassReport, SubmittedTotal};

/// Issue rows shown before the table is cut off.
pub const ISSUE_TABLE_LIMIT: usize = 50;

pub fn print_report(report: &PassReport) {
    for change in &report.changes {
        println!("{}", change.detail);
    }
    if !report.changes.is_empty() {
        println!();
    }
    println!("{}", render_summary(report));
    if report.has_issues() {
        println!();
        println!("Issues:");
        println!("{}", render_issues(&report.issues));
    }
    println!("Output saved to: {}", report.output.display());
}

pub fn render_summary(report: &PassReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Pass"), header_cell(&report.pass)]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![Cell::new("Rows read"), Cell::new(report.rows_read)]);
    table.add_row(vec![Cell::new("Rows written"), Cell::new(report.rows_written)]);
    table.add_row(vec![
        Cell::new("Rows changed"),
        count_cell(report.rows_changed, Color::Green),
    ]);
    table.add_row(vec![
        Cell::new("Rows passed through"),
        count_cell(report.rows_passed_through, Color::Yellow),
    ]);
    for (kind, count) in count_by_kind(&report.issues) {
        table.add_row(vec![
            dim_cell(format!("  {kind}")),
            count_cell(count, kind_color(kind)),
        ]);
    }
    table.add_row(vec![
        Cell::new("Issues").add_attribute(Attribute::Bold),
        count_cell(report.issues.len(), Color::Yellow).add_attribute(Attribute::Bold),
    ]);
    table
}

/// Issue table, capped at [`ISSUE_TABLE_LIMIT`] rows plus a line counting
/// the rest.
pub fn render_issues(issues: &[FieldIssue]) -> String {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Row"),
        header_cell("Column"),
        header_cell("Kind"),
        header_cell("Raw value"),
    ]);
    apply_issue_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for issue in issues.iter().take(ISSUE_TABLE_LIMIT) {
        table.add_row(vec![
            Cell::new(issue.row),
            Cell::new(issue.column.as_deref().unwrap_or("-")),
            Cell::new(issue.kind).fg(kind_color(issue.kind)),
            raw_cell(&issue.raw),
        ]);
    }
    let hidden = issues.len().saturating_sub(ISSUE_TABLE_LIMIT);
    if hidden > 0 {
        format!("{table}\n... {hidden} more")
    } else {
        table.to_string()
    }
}

pub fn total_line(total: &SubmittedTotal) -> String {
    format!(
        "Total Submitted Amount: {} (from {} rows)",
        format_thousands(total.total),
        total.rows
    )
}

pub fn print_schema(schema: &ColumnSchema) {
    println!("Schema: {} ({} columns)", schema.version, schema.width());
    let mut table = Table::new();
    table.set_header(vec![header_cell("Position"), header_cell("Column")]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for (position, column) in schema.header().iter().enumerate() {
        table.add_row(vec![Cell::new(position), Cell::new(column)]);
    }
    println!("{table}");
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn apply_issue_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn kind_color(kind: IssueKind) -> Color {
    match kind {
        IssueKind::UnparseableDate | IssueKind::UnparseableNumber => Color::Yellow,
        IssueKind::MarginOutOfRange | IssueKind::NegativeAmount => Color::Red,
        IssueKind::DuplicateProjectCode
        | IssueKind::FallbackProjectCode
        | IssueKind::SequenceExhausted => Color::Magenta,
        IssueKind::ShortRow | IssueKind::ClearedFolderId => Color::DarkGrey,
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn raw_cell(raw: &str) -> Cell {
    if raw.is_empty() {
        dim_cell("(empty)")
    } else {
        Cell::new(raw)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
