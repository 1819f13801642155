//! Per-field normalizers.
//!
//! - **date**: raw date tokens to `YYYY-MM-DD`
//! - **numeric**: amounts and margins
//! - **text**: whitespace and quote trimming
//! - **project_code**: temporary project code synthesis

pub mod date;
pub mod numeric;
pub mod project_code;
pub mod text;

pub use date::{DateNormalizer, clean_date_token, is_normalized_date, normalize_date};
pub use numeric::{
    MarginValue, clean_number, format_amount, normalize_margin, normalize_number, parse_amount,
    parse_margin,
};
pub use project_code::{
    CodeParts, GeneratedCode, MAX_SEQUENCE, ProjectCodeGenerator, fingerprint_sequence, parse_code,
};
pub use text::{is_blank, normalize_text};
