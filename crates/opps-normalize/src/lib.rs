//! Field Normalizer for opportunity snapshots.
//!
//! Pure functions that clean one field at a time, plus a record-level
//! normalizer that applies them to a whole row by field name:
//!
//! - **normalization**: date, numeric, margin, text, project code
//! - **record**: named-field normalization of a full opportunity record

pub mod normalization;
pub mod record;

pub use normalization::{
    DateNormalizer, GeneratedCode, MarginValue, ProjectCodeGenerator, normalize_date,
    normalize_margin, normalize_number, normalize_text,
};
pub use record::{FieldSource, HeaderRow, NormalizedRecord, RecordNormalizer};
