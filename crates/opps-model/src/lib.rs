//! Shared model for opportunity snapshot scrubbing.
//!
//! - **schema**: versioned, explicit column layouts
//! - **config**: TOML configuration with built-in defaults
//! - **issues**: field-level findings reported to the operator

pub mod config;
pub mod error;
pub mod issues;
pub mod schema;

pub use config::{
    DEFAULT_CODE_PREFIX, DEFAULT_FALLBACK_CODE, DEFAULT_REFERENCE_YEAR, DEFAULT_TEMP_CODE_NOTE,
    ImportConfig, ProjectCodeConfig, ScrubConfig, SequenceStrategy, SubmittedConfig,
};
pub use error::{ConfigError, ModelError, Result};
pub use issues::{FieldIssue, IssueKind, count_by_kind};
pub use schema::{
    AMOUNT_FIELDS, CANONICAL_COLUMNS, CANONICAL_V1, ColumnSchema, DATE_FIELDS, FOLDER_ID_COLUMN,
    IMPORT_V2, MARGIN_FIELD, TEXT_FIELDS, UID_FIELD, header_matches, normalize_header,
};
