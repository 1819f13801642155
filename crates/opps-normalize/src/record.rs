//! Record-level normalization by field name.

use std::collections::BTreeMap;

use opps_model::{
    AMOUNT_FIELDS, ColumnSchema, DATE_FIELDS, FieldIssue, IssueKind, MARGIN_FIELD, UID_FIELD,
    header_matches,
};
use tracing::debug;
use uuid::Uuid;

use crate::normalization::{
    DateNormalizer, MarginValue, clean_date_token, clean_number, format_amount, normalize_text,
    parse_amount, parse_margin,
};

const REV_FIELD: &str = "rev";
const FORECAST_FIELD: &str = "forecast_date";
const AWARDED_LOST_FIELD: &str = "date_awarded_lost";

/// Named access to the fields of one input row.
pub trait FieldSource {
    /// `None` when the input has no such column at all.
    fn field(&self, name: &str) -> Option<&str>;
}

impl FieldSource for BTreeMap<String, String> {
    fn field(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str).or_else(|| {
            self.iter()
                .find(|(key, _)| header_matches(key, name))
                .map(|(_, value)| value.as_str())
        })
    }
}

/// A positional row viewed through its snapshot header.
#[derive(Debug, Clone, Copy)]
pub struct HeaderRow<'a> {
    headers: &'a [String],
    values: &'a [String],
}

impl<'a> HeaderRow<'a> {
    pub fn new(headers: &'a [String], values: &'a [String]) -> Self {
        Self { headers, values }
    }
}

impl FieldSource for HeaderRow<'_> {
    /// Header names match the way the positional passes match them. A column
    /// named in the header but missing from a short row reads as empty.
    fn field(&self, name: &str) -> Option<&str> {
        let idx = self
            .headers
            .iter()
            .position(|header| header_matches(header, name))?;
        Some(self.values.get(idx).map_or("", String::as_str))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Date,
    Amount,
    Margin,
    Uid,
    Text,
}

fn field_kind(column: &str) -> FieldKind {
    let is = |name: &str| column.eq_ignore_ascii_case(name);
    if DATE_FIELDS.iter().any(|&name| is(name)) {
        FieldKind::Date
    } else if AMOUNT_FIELDS.iter().any(|&name| is(name)) {
        FieldKind::Amount
    } else if is(MARGIN_FIELD) {
        FieldKind::Margin
    } else if is(UID_FIELD) {
        FieldKind::Uid
    } else {
        FieldKind::Text
    }
}

/// One row rewritten into the target schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    /// Values in schema order.
    pub values: Vec<String>,
    pub issues: Vec<FieldIssue>,
    pub generated_uid: bool,
}

/// Applies the field normalizers to every column of a target schema.
#[derive(Debug, Clone)]
pub struct RecordNormalizer {
    dates: DateNormalizer,
    schema: ColumnSchema,
}

impl RecordNormalizer {
    pub fn new(dates: DateNormalizer, schema: ColumnSchema) -> Self {
        Self { dates, schema }
    }

    pub fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    /// Normalize one row. `line` is the 1-based input line used in issues.
    pub fn normalize<S: FieldSource + ?Sized>(&self, line: usize, source: &S) -> NormalizedRecord {
        let mut issues = Vec::new();
        let mut generated_uid = false;
        let mut values = Vec::with_capacity(self.schema.width());

        for column in self.schema.header() {
            let raw = source.field(column);
            let value = match field_kind(column) {
                FieldKind::Date => {
                    let raw = raw.unwrap_or_default();
                    let value = self.dates.normalize(raw);
                    if value.is_empty() && !clean_date_token(raw).is_empty() {
                        issues.push(issue(line, column, raw, IssueKind::UnparseableDate));
                    }
                    value
                }
                FieldKind::Amount => {
                    // A snapshot without a revenue column means zero revenue.
                    let default = if column.eq_ignore_ascii_case(REV_FIELD) { "0" } else { "" };
                    let raw = raw.unwrap_or(default);
                    match parse_amount(raw) {
                        Some(amount) if amount < 0.0 => {
                            issues.push(issue(line, column, raw, IssueKind::NegativeAmount));
                            String::new()
                        }
                        Some(amount) => format_amount(amount),
                        None => {
                            if clean_number(raw).is_some() {
                                issues.push(issue(line, column, raw, IssueKind::UnparseableNumber));
                            }
                            String::new()
                        }
                    }
                }
                FieldKind::Margin => {
                    let raw = raw.unwrap_or_default();
                    match parse_margin(raw) {
                        MarginValue::Percent(value) => value,
                        MarginValue::Missing => String::new(),
                        MarginValue::Unparseable => {
                            issues.push(issue(line, column, raw, IssueKind::UnparseableNumber));
                            String::new()
                        }
                        MarginValue::OutOfRange(_) => {
                            issues.push(issue(line, column, raw, IssueKind::MarginOutOfRange));
                            String::new()
                        }
                    }
                }
                FieldKind::Uid => {
                    let existing = normalize_text(raw.unwrap_or_default());
                    if existing.is_empty() {
                        generated_uid = true;
                        debug!(line, "generated uid");
                        Uuid::new_v4().to_string()
                    } else {
                        existing
                    }
                }
                FieldKind::Text => normalize_text(raw.unwrap_or_default()),
            };
            values.push(value);
        }

        self.default_forecast(&mut values);

        NormalizedRecord {
            values,
            issues,
            generated_uid,
        }
    }

    /// An empty forecast date takes the awarded/lost date.
    fn default_forecast(&self, values: &mut [String]) {
        let (Some(forecast), Some(awarded)) = (
            self.schema.index_of(FORECAST_FIELD),
            self.schema.index_of(AWARDED_LOST_FIELD),
        ) else {
            return;
        };
        if values[forecast].is_empty() && !values[awarded].is_empty() {
            values[forecast] = values[awarded].clone();
        }
    }
}

fn issue(line: usize, column: &str, raw: &str, kind: IssueKind) -> FieldIssue {
    FieldIssue::new(line, kind, raw).with_column(column)
}
