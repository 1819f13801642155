//! Versioned column layouts for opportunity snapshots.
//!
//! Snapshots are positional CSV files. Passes that address columns by index
//! resolve those indices through a [`ColumnSchema`] so that a snapshot written
//! against a different layout fails loudly instead of touching the wrong
//! column.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Canonical snapshot layout version.
pub const CANONICAL_V1: &str = "canonical-v1";

/// Import layout version (canonical plus the folder reference column).
pub const IMPORT_V2: &str = "import-v2";

/// The 31 canonical fields, in snapshot order.
pub const CANONICAL_COLUMNS: [&str; 31] = [
    "encoded_date",
    "project_name",
    "project_code",
    "rev",
    "client",
    "solutions",
    "sol_particulars",
    "industries",
    "ind_particulars",
    "date_received",
    "client_deadline",
    "decision",
    "account_mgr",
    "pic",
    "bom",
    "status",
    "submitted_date",
    "margin",
    "final_amt",
    "opp_status",
    "date_awarded_lost",
    "lost_rca",
    "l_particulars",
    "a",
    "c",
    "r",
    "u",
    "d",
    "remarks_comments",
    "uid",
    "forecast_date",
];

/// Trailing column present in the import layout.
pub const FOLDER_ID_COLUMN: &str = "google_drive_folder_id";

/// Calendar date fields.
pub const DATE_FIELDS: [&str; 6] = [
    "encoded_date",
    "date_received",
    "client_deadline",
    "submitted_date",
    "date_awarded_lost",
    "forecast_date",
];

/// Monetary amount fields.
pub const AMOUNT_FIELDS: [&str; 2] = ["final_amt", "rev"];

pub const MARGIN_FIELD: &str = "margin";

pub const UID_FIELD: &str = "uid";

/// Free-text fields, trimmed and unquoted only.
pub const TEXT_FIELDS: [&str; 21] = [
    "project_name",
    "project_code",
    "client",
    "solutions",
    "sol_particulars",
    "industries",
    "ind_particulars",
    "decision",
    "account_mgr",
    "pic",
    "bom",
    "status",
    "opp_status",
    "lost_rca",
    "l_particulars",
    "a",
    "c",
    "r",
    "u",
    "d",
    "remarks_comments",
];

/// Lowercased header with surrounding spaces and a BOM removed and inner
/// whitespace runs joined by `_`.
pub fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push('_');
            normalized.push_str(part);
        }
    }
    normalized.to_ascii_lowercase()
}

/// Header cells compare equal when they differ only in case, spacing or a
/// byte order mark: `Encoded Date` matches `encoded_date`.
pub fn header_matches(header: &str, column: &str) -> bool {
    normalize_header(header) == normalize_header(column)
}

/// An explicit, versioned column layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub version: String,
    pub columns: Vec<String>,
}

impl ColumnSchema {
    /// Build a schema, rejecting empty layouts and duplicate column names.
    pub fn new(version: impl Into<String>, columns: Vec<String>) -> Result<Self> {
        let version = version.into();
        if columns.is_empty() {
            return Err(ModelError::EmptySchema { version });
        }
        for (idx, column) in columns.iter().enumerate() {
            if columns[..idx]
                .iter()
                .any(|earlier| earlier.eq_ignore_ascii_case(column))
            {
                return Err(ModelError::DuplicateColumn {
                    version,
                    column: column.clone(),
                });
            }
        }
        Ok(Self { version, columns })
    }

    /// Look up one of the built-in layouts.
    pub fn builtin(version: &str) -> Result<Self> {
        let mut columns = Self::canonical().columns;
        match version {
            CANONICAL_V1 => {}
            IMPORT_V2 => columns.push(FOLDER_ID_COLUMN.to_string()),
            other => {
                return Err(ModelError::UnknownSchema {
                    version: other.to_string(),
                });
            }
        }
        Ok(Self {
            version: version.to_string(),
            columns,
        })
    }

    pub fn canonical() -> Self {
        Self {
            version: CANONICAL_V1.to_string(),
            columns: CANONICAL_COLUMNS.iter().map(|c| (*c).to_string()).collect(),
        }
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn header(&self) -> &[String] {
        &self.columns
    }

    /// Position of a column, matched case-insensitively.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|column| column.eq_ignore_ascii_case(name))
    }

    /// Position of a column that a pass cannot run without.
    pub fn require(&self, name: &str) -> Result<usize> {
        self.index_of(name).ok_or_else(|| ModelError::MissingColumn {
            version: self.version.clone(),
            column: name.to_string(),
        })
    }

    /// Positions of several required columns, in the order given.
    pub fn require_all(&self, names: &[&str]) -> Result<Vec<usize>> {
        names.iter().map(|name| self.require(name)).collect()
    }
}

impl Default for ColumnSchema {
    fn default() -> Self {
        Self::canonical()
    }
}
