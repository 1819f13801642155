//! Free-text cleanup.

/// Trim whitespace and surrounding quote characters.
///
/// Whitespace and single/double quotes are removed from both ends until
/// neither end starts with one, so the function is idempotent. Interior
/// characters are never touched.
///
/// # Examples
///
/// ```
/// use opps_normalize::normalize_text;
///
/// assert_eq!(normalize_text("  \"URC Canlubang\"  "), "URC Canlubang");
/// assert_eq!(normalize_text("'Inst'n'"), "Inst'n");
/// assert_eq!(normalize_text("   "), "");
/// ```
pub fn normalize_text(raw: &str) -> String {
    raw.trim_matches(is_text_padding).to_string()
}

/// True when the value holds nothing but whitespace and quotes.
pub fn is_blank(raw: &str) -> bool {
    raw.chars().all(is_text_padding)
}

fn is_text_padding(ch: char) -> bool {
    ch.is_whitespace() || ch == '"' || ch == '\''
}
