//! Integration tests for the batch passes.

use std::collections::BTreeSet;
use std::path::PathBuf;

use opps_cli::passes::{
    PassContext, annotate_temp_codes, backfill_codes, fix_dates, format_snapshot,
    known_temp_codes, prepare_import, submitted_total,
};
use opps_cli::summary::{render_issues, total_line};
use opps_ingest::{Snapshot, SnapshotRow, TempCodeEntry};
use opps_model::{
    ColumnSchema, DEFAULT_TEMP_CODE_NOTE, FieldIssue, IMPORT_V2, IssueKind, ScrubConfig,
    SequenceStrategy,
};
use proptest::prelude::*;
use regex::Regex;

fn context() -> PassContext {
    PassContext::new(ScrubConfig::default()).expect("default context")
}

fn snapshot(header: Vec<String>, rows: Vec<Vec<String>>) -> Snapshot {
    Snapshot {
        path: PathBuf::from("opps.csv"),
        header,
        rows: rows
            .into_iter()
            .enumerate()
            .map(|(idx, values)| SnapshotRow {
                line: idx as u64 + 2,
                values,
            })
            .collect(),
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

fn canonical_header() -> Vec<String> {
    ColumnSchema::canonical().header().to_vec()
}

fn import_header() -> Vec<String> {
    ColumnSchema::builtin(IMPORT_V2).expect("import schema").header().to_vec()
}

/// A full-width row with the named cells filled in.
fn row_with(schema: &ColumnSchema, cells: &[(&str, &str)]) -> Vec<String> {
    let mut row = vec![String::new(); schema.width()];
    for (name, value) in cells {
        let idx = schema.index_of(name).expect("known column");
        row[idx] = (*value).to_string();
    }
    row
}

fn cell<'a>(row: &'a [String], name: &str) -> &'a str {
    &row[ColumnSchema::canonical().index_of(name).expect("known column")]
}

#[test]
fn format_normalizes_by_name_and_writes_schema_header() {
    let ctx = context();
    let input = snapshot(
        strings(&["encoded_date", "project_name", "project_code", "margin", "final_amt", "uid"]),
        vec![
            strings(&["Sat, 18/1/25", " 'Westside City CCTV' ", "CMRP", "0.85", "₱1,234.50", "u1"]),
            strings(&["TBI", "URC", "CMRP2501041", "150", "", ""]),
        ],
    );
    let output = format_snapshot(&ctx, &input).expect("format");
    let records = &output.records;

    assert_eq!(records[0], canonical_header());
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|record| record.len() == 31));

    assert_eq!(cell(&records[1], "encoded_date"), "2025-01-18");
    assert_eq!(cell(&records[1], "project_name"), "Westside City CCTV");
    assert_eq!(cell(&records[1], "margin"), "85.0");
    assert_eq!(cell(&records[1], "final_amt"), "1234.50");
    assert_eq!(cell(&records[1], "rev"), "0");
    assert_eq!(cell(&records[1], "uid"), "u1");

    assert_eq!(cell(&records[2], "encoded_date"), "");
    assert_eq!(cell(&records[2], "margin"), "");
    assert_eq!(cell(&records[2], "uid").len(), 36);

    let report = &output.report;
    assert_eq!(report.rows_read, 2);
    assert_eq!(report.rows_written, 2);
    assert_eq!(report.rows_changed, 2);
    assert_eq!(
        report.issues,
        vec![FieldIssue::new(3, IssueKind::MarginOutOfRange, "150").with_column("margin")]
    );
}

#[test]
fn formatted_bare_code_is_backfilled_from_its_date() {
    let ctx = context();
    let raw = snapshot(
        strings(&["encoded_date", "project_name", "project_code"]),
        vec![
            strings(&["Sat, 18/1/25", "Westside City CCTV", "CMRP"]),
            strings(&["2025-01-02", "URC", "CMRP2501041"]),
        ],
    );
    let mut records = format_snapshot(&ctx, &raw).expect("format").records;
    let header = records.remove(0);
    let formatted = snapshot(header, records);

    let backfill = backfill_codes(&ctx, &formatted).expect("backfill");
    let code = cell(&backfill.output.records[1], "project_code");
    assert!(Regex::new(r"^CMRP2501\d{3}$").unwrap().is_match(code), "{code}");
    assert_eq!(code, "CMRP2501042");
}

#[test]
fn format_reads_spaced_headers_and_empties_negative_amounts() {
    let ctx = context();
    let input = snapshot(
        strings(&["Encoded Date", " Final amt ", "REV", "Project Name"]),
        vec![strings(&["2025-01-18", "100", "-1,000", "URC"])],
    );
    let output = format_snapshot(&ctx, &input).expect("format");
    let row = &output.records[1];
    assert_eq!(cell(row, "encoded_date"), "2025-01-18");
    assert_eq!(cell(row, "final_amt"), "100");
    assert_eq!(cell(row, "project_name"), "URC");
    assert_eq!(cell(row, "rev"), "");
    assert_eq!(
        output.report.issues,
        vec![FieldIssue::new(2, IssueKind::NegativeAmount, "-1,000").with_column("rev")]
    );
}

#[test]
fn format_rejects_a_header_without_schema_columns() {
    let ctx = context();
    let input = snapshot(
        strings(&["Status", "Final amount"]),
        vec![strings(&["Submitted", "100"])],
    );
    let err = format_snapshot(&ctx, &input).unwrap_err();
    assert!(err.to_string().contains("names none of the columns"), "{err}");

    let empty = snapshot(strings(&["Status"]), Vec::new());
    let output = format_snapshot(&ctx, &empty).expect("nothing to lose");
    assert_eq!(output.records, vec![canonical_header()]);
}

#[test]
fn fix_dates_rewrites_date_columns_only() {
    let ctx = context();
    let schema = ColumnSchema::canonical();
    let input = snapshot(
        canonical_header(),
        vec![
            row_with(
                &schema,
                &[
                    ("encoded_date", "Thu, 30/7/25"),
                    ("date_received", "21/3"),
                    ("client_deadline", "soon"),
                    ("project_name", "21/3"),
                ],
            ),
            strings(&["3/21/2025", "Short row"]),
            row_with(&schema, &[("forecast_date", "2025-08-12")]),
        ],
    );
    let output = fix_dates(&ctx, &input).expect("fix dates");
    let records = &output.records;

    assert_eq!(records[0], canonical_header());
    assert_eq!(cell(&records[1], "encoded_date"), "2025-07-30");
    assert_eq!(cell(&records[1], "date_received"), "2025-03-21");
    assert_eq!(cell(&records[1], "client_deadline"), "");
    assert_eq!(cell(&records[1], "project_name"), "21/3");
    assert_eq!(records[2], strings(&["2025-03-21", "Short row"]));
    assert_eq!(cell(&records[3], "forecast_date"), "2025-08-12");

    let report = &output.report;
    assert_eq!(report.rows_changed, 2);
    assert_eq!(report.rows_passed_through, 0);
    assert_eq!(
        report.issues,
        vec![FieldIssue::new(2, IssueKind::UnparseableDate, "soon").with_column("client_deadline")]
    );
}

#[test]
fn fix_dates_rejects_a_drifted_layout() {
    let ctx = context();
    let mut header = canonical_header();
    header.swap(9, 10);
    let input = snapshot(header, Vec::new());
    let err = fix_dates(&ctx, &input).unwrap_err();
    assert!(err.to_string().contains("date_received"), "{err}");
}

#[test]
fn backfill_continues_existing_sequence_and_reports_codes() {
    let ctx = context();
    let schema = ColumnSchema::canonical();
    let input = snapshot(
        canonical_header(),
        vec![
            row_with(
                &schema,
                &[
                    ("encoded_date", "2025-03-02"),
                    ("project_name", "A"),
                    ("project_code", "CMRP"),
                    ("uid", "u-a"),
                ],
            ),
            strings(&["2025-03-03", "B"]),
            row_with(
                &schema,
                &[
                    ("encoded_date", "not a date"),
                    ("project_name", "C"),
                    ("project_code", " CMRP "),
                ],
            ),
            row_with(&schema, &[("project_code", "CMRP2503007")]),
        ],
    );
    let backfill = backfill_codes(&ctx, &input).expect("backfill");
    let records = &backfill.output.records;

    assert_eq!(cell(&records[1], "project_code"), "CMRP2503008");
    assert_eq!(records[2], strings(&["2025-03-03", "B"]));
    assert_eq!(cell(&records[3], "project_code"), "CMRP25000001");
    assert_eq!(cell(&records[4], "project_code"), "CMRP2503007");

    assert_eq!(
        backfill.entries,
        vec![
            TempCodeEntry {
                project_name: "A".to_string(),
                code: "CMRP2503008".to_string(),
                date: "2025-03-02".to_string(),
                uid: "u-a".to_string(),
            },
            TempCodeEntry {
                project_name: "C".to_string(),
                code: "CMRP25000001".to_string(),
                date: "not a date".to_string(),
                uid: String::new(),
            },
        ]
    );

    let report = &backfill.output.report;
    assert_eq!(report.rows_changed, 2);
    assert_eq!(report.rows_passed_through, 1);
    assert_eq!(report.changes[0].detail, "Fixed row 2: 'A' -> CMRP2503008");
    assert_eq!(
        report.issues,
        vec![
            FieldIssue::new(4, IssueKind::FallbackProjectCode, "not a date")
                .with_column("encoded_date")
        ]
    );
}

#[test]
fn backfill_keeps_three_sequence_digits_past_long_codes() {
    let ctx = context();
    let input = snapshot(
        strings(&["encoded_date", "project_name", "project_code"]),
        vec![
            strings(&["2025-08-01", "Existing", "CMRP25081000"]),
            strings(&["2025-08-01", "Existing", "CMRP2508999"]),
            strings(&["2025-08-12", "New", "CMRP"]),
        ],
    );
    let backfill = backfill_codes(&ctx, &input).expect("backfill");
    assert_eq!(backfill.entries[0].code, "CMRP2508001");
    assert!(backfill.output.report.issues.is_empty());
}

#[test]
fn fingerprint_backfill_flags_shared_dates() {
    let mut config = ScrubConfig::default();
    config.project_codes.sequence = SequenceStrategy::Fingerprint;
    let ctx = PassContext::new(config).expect("context");
    let input = snapshot(
        strings(&["encoded_date", "project_name", "project_code"]),
        vec![
            strings(&["2025-01-18", "LA CARLOTA Distillation", "CMRP"]),
            strings(&["2025-01-18", "LA CARLOTA Distillery", "CMRP"]),
        ],
    );
    let backfill = backfill_codes(&ctx, &input).expect("backfill");
    assert_eq!(backfill.entries[0].code, backfill.entries[1].code);
    let kinds: Vec<IssueKind> = backfill.output.report.issues.iter().map(|i| i.kind).collect();
    assert_eq!(kinds, vec![IssueKind::DuplicateProjectCode]);
}

#[test]
fn prepare_import_clears_short_folder_ids_and_cuts_width() {
    let ctx = context();
    let schema = ColumnSchema::builtin(IMPORT_V2).expect("import schema");
    let mut wide = row_with(&schema, &[("uid", "u1"), ("google_drive_folder_id", "abc")]);
    wide.push("stray".to_string());
    let kept = row_with(&schema, &[("google_drive_folder_id", "1A2b3C4d5E6f7G")]);
    let input = snapshot(
        import_header(),
        vec![wide, kept.clone(), strings(&["a", "b", "c", "d", "e"])],
    );
    let output = prepare_import(&ctx, &input).expect("prepare import");
    let records = &output.records;

    assert_eq!(records[0], import_header());
    assert_eq!(records[1].len(), 32);
    assert_eq!(records[1][31], "");
    assert_eq!(records[1][29], "u1");
    assert_eq!(records[2], kept);
    assert_eq!(records[3], strings(&["a", "b", "c", "d", "e"]));

    let report = &output.report;
    assert_eq!(report.rows_changed, 1);
    assert_eq!(report.rows_passed_through, 1);
    assert_eq!(
        report.issues,
        vec![
            FieldIssue::new(2, IssueKind::ClearedFolderId, "abc")
                .with_column("google_drive_folder_id"),
            FieldIssue::new(4, IssueKind::ShortRow, "5 of 32 columns"),
        ]
    );
}

#[test]
fn annotate_prepends_note_once() {
    let ctx = context();
    let schema = ColumnSchema::canonical();
    let known: BTreeSet<String> = known_temp_codes(
        &ctx.config.project_codes,
        &[TempCodeEntry {
            project_name: "A".to_string(),
            code: "CMRP2501385".to_string(),
            date: "2025-01-18".to_string(),
            uid: String::new(),
        }],
    );
    let input = snapshot(
        canonical_header(),
        vec![
            row_with(&schema, &[("project_name", "A"), ("project_code", "CMRP2501385")]),
            row_with(
                &schema,
                &[
                    ("project_name", "B"),
                    ("project_code", "CMRP2501385"),
                    ("remarks_comments", "call client"),
                ],
            ),
            row_with(&schema, &[("project_code", "CMRP2501999")]),
            strings(&["2025-01-18", "short", "CMRP2501385"]),
        ],
    );
    let output = annotate_temp_codes(&ctx, &input, &known).expect("annotate");
    let records = &output.records;

    assert_eq!(cell(&records[1], "remarks_comments"), DEFAULT_TEMP_CODE_NOTE);
    assert_eq!(
        cell(&records[2], "remarks_comments"),
        format!("{DEFAULT_TEMP_CODE_NOTE}; call client")
    );
    assert_eq!(cell(&records[3], "remarks_comments"), "");
    assert_eq!(records[4], strings(&["2025-01-18", "short", "CMRP2501385"]));
    assert_eq!(output.report.rows_changed, 2);
    assert_eq!(output.report.rows_passed_through, 1);
    assert_eq!(
        output.report.changes[0].detail,
        "Updated row 2: A... -> Added temp code note"
    );

    let mut again = output.records.clone();
    let header = again.remove(0);
    let rerun = annotate_temp_codes(&ctx, &snapshot(header, again), &known).expect("annotate");
    assert_eq!(rerun.report.rows_changed, 0);
    assert_eq!(rerun.records, output.records);
}

#[test]
fn submitted_total_sums_matching_status() {
    let config = ScrubConfig::default();
    let input = snapshot(
        strings(&["Status", "Project", "Final amt"]),
        vec![
            strings(&["Submitted", "A", "â‚±1,234.50"]),
            strings(&[" submitted ", "B", "1,000"]),
            strings(&["Lost", "C", "999"]),
            strings(&["SUBMITTED", "D", "TBA"]),
        ],
    );
    let total = submitted_total(&config.submitted, &input).expect("total");
    assert_eq!(total.rows, 3);
    assert_eq!(total.skipped_amounts, 1);
    assert!((total.total - 2234.5).abs() < 1e-9);
    insta::assert_snapshot!(total_line(&total), @"Total Submitted Amount: 2,234.50 (from 3 rows)");
}

#[test]
fn submitted_total_requires_its_columns() {
    let config = ScrubConfig::default();
    let input = snapshot(strings(&["Project", "Final amt"]), Vec::new());
    let err = submitted_total(&config.submitted, &input).unwrap_err();
    assert!(err.to_string().contains("Status"), "{err}");
}

#[test]
fn issue_table_is_capped() {
    let issues: Vec<FieldIssue> = (0..60)
        .map(|row| FieldIssue::new(row + 2, IssueKind::UnparseableDate, "soon"))
        .collect();
    let rendered = render_issues(&issues);
    assert!(rendered.ends_with("... 10 more"), "{rendered}");
    assert!(!render_issues(&issues[..3]).contains("more"));
}

fn ragged_rows() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(
        prop::collection::vec("[a-zA-Z0-9/ ]{0,8}", 1..40),
        0..12,
    )
}

proptest! {
    #[test]
    fn passes_never_drop_rows(rows in ragged_rows()) {
        let ctx = context();
        let input = snapshot(import_header(), rows.clone());
        let known: BTreeSet<String> = ["CMRP2501385".to_string()].into_iter().collect();

        let outputs = vec![
            fix_dates(&ctx, &input).unwrap(),
            backfill_codes(&ctx, &input).unwrap().output,
            annotate_temp_codes(&ctx, &input, &known).unwrap(),
        ];
        for output in outputs {
            prop_assert_eq!(output.records.len(), rows.len() + 1);
            for (written, read) in output.records[1..].iter().zip(&rows) {
                prop_assert_eq!(written.len(), read.len());
            }
        }

        let import = prepare_import(&ctx, &input).unwrap();
        prop_assert_eq!(import.records.len(), rows.len() + 1);
        for (written, read) in import.records[1..].iter().zip(&rows) {
            let expected = if read.len() >= 32 { 32 } else { read.len() };
            prop_assert_eq!(written.len(), expected);
        }
    }
}
