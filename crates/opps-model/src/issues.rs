use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a field was emptied, left alone, or rewritten in a notable way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    UnparseableDate,
    UnparseableNumber,
    MarginOutOfRange,
    NegativeAmount,
    ShortRow,
    ClearedFolderId,
    FallbackProjectCode,
    DuplicateProjectCode,
    SequenceExhausted,
}

impl IssueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueKind::UnparseableDate => "unparseable date",
            IssueKind::UnparseableNumber => "unparseable number",
            IssueKind::MarginOutOfRange => "margin out of range",
            IssueKind::NegativeAmount => "negative amount",
            IssueKind::ShortRow => "short row",
            IssueKind::ClearedFolderId => "cleared folder id",
            IssueKind::FallbackProjectCode => "fallback project code",
            IssueKind::DuplicateProjectCode => "duplicate project code",
            IssueKind::SequenceExhausted => "sequence exhausted",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field-level finding reported to the operator after a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    /// 1-based line number in the input snapshot (the header is line 1).
    pub row: usize,
    /// Column name, when the finding concerns a single field.
    pub column: Option<String>,
    /// Raw value as read.
    pub raw: String,
    pub kind: IssueKind,
}

impl FieldIssue {
    pub fn new(row: usize, kind: IssueKind, raw: impl Into<String>) -> Self {
        Self {
            row,
            column: None,
            raw: raw.into(),
            kind,
        }
    }

    #[must_use]
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }
}

/// Tally of issues by kind, in kind order.
pub fn count_by_kind(issues: &[FieldIssue]) -> Vec<(IssueKind, usize)> {
    let mut counts: Vec<(IssueKind, usize)> = Vec::new();
    for issue in issues {
        match counts.iter_mut().find(|(kind, _)| *kind == issue.kind) {
            Some((_, count)) => *count += 1,
            None => counts.push((issue.kind, 1)),
        }
    }
    counts.sort_by_key(|(kind, _)| *kind);
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_group_by_kind() {
        let issues = vec![
            FieldIssue::new(3, IssueKind::ShortRow, "a,b"),
            FieldIssue::new(4, IssueKind::UnparseableDate, "soon").with_column("encoded_date"),
            FieldIssue::new(9, IssueKind::ShortRow, "c"),
        ];
        assert_eq!(
            count_by_kind(&issues),
            vec![(IssueKind::UnparseableDate, 1), (IssueKind::ShortRow, 2)]
        );
    }

    #[test]
    fn issue_serializes_kind_in_snake_case() {
        let issue = FieldIssue::new(2, IssueKind::MarginOutOfRange, "150").with_column("margin");
        let json = serde_json::to_string(&issue).unwrap();
        assert_eq!(
            json,
            r#"{"row":2,"column":"margin","raw":"150","kind":"margin_out_of_range"}"#
        );
    }
}
