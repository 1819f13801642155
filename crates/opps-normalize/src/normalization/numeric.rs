//! Amount and margin normalization.

use super::text::normalize_text;

/// Characters stripped from amounts before parsing.
const DECORATION: &[char] = &['₱', '$', '€', '£', '¥', '%', ','];

/// `₱` as it appears after a UTF-8 export is re-read as Windows-1252.
const MOJIBAKE_PESO: &str = "â‚±";

/// Strip quotes, currency symbols, percent signs, thousands separators and
/// all whitespace. `None` when nothing is left.
pub fn clean_number(raw: &str) -> Option<String> {
    let text = normalize_text(raw).replace(MOJIBAKE_PESO, "");
    let cleaned: String = text
        .chars()
        .filter(|ch| !ch.is_whitespace() && !DECORATION.contains(ch))
        .collect();
    (!cleaned.is_empty()).then_some(cleaned)
}

/// Parse a decorated amount into a finite number.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned = clean_number(raw)?;
    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Render an amount: whole numbers without a fraction, others with two digits.
/// Negative zero renders as `0`.
pub fn format_amount(value: f64) -> String {
    let value = if value == 0.0 { 0.0 } else { value };
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

/// Canonical decimal string for an amount, or empty on failure.
pub fn normalize_number(raw: &str) -> String {
    parse_amount(raw).map(format_amount).unwrap_or_default()
}

/// Classification of a raw margin value.
#[derive(Debug, Clone, PartialEq)]
pub enum MarginValue {
    /// Nothing to parse.
    Missing,
    /// A percentage in `[0, 100]`, ready to store.
    Percent(String),
    /// Not a number.
    Unparseable,
    /// A number that is neither a fraction nor a percentage.
    OutOfRange(f64),
}

/// Interpret a margin.
///
/// Values in `(1, 100]` are already percentages and are kept as cleaned when
/// written as a plain decimal, otherwise re-rendered (`+85`, `1e2`, `085`).
/// Values in `[0, 1]` are fractions and are scaled by 100, rounded to two
/// decimals. Anything else is out of range.
pub fn parse_margin(raw: &str) -> MarginValue {
    let Some(cleaned) = clean_number(raw) else {
        return MarginValue::Missing;
    };
    let value = match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => return MarginValue::Unparseable,
    };
    if value > 1.0 && value <= 100.0 {
        if is_plain_decimal(&cleaned) {
            MarginValue::Percent(cleaned)
        } else {
            MarginValue::Percent(value.to_string())
        }
    } else if (0.0..=1.0).contains(&value) {
        MarginValue::Percent(format_percent((value * 100.0 * 100.0).round() / 100.0))
    } else {
        MarginValue::OutOfRange(value)
    }
}

/// Margin as a plain percentage, or empty when missing or invalid.
pub fn normalize_margin(raw: &str) -> String {
    match parse_margin(raw) {
        MarginValue::Percent(value) => value,
        _ => String::new(),
    }
}

/// Digits with an optional fraction and no redundant leading zero.
fn is_plain_decimal(text: &str) -> bool {
    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (text, None),
    };
    let digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    digits(whole)
        && (whole == "0" || !whole.starts_with('0'))
        && fraction.is_none_or(digits)
}

/// At least one fraction digit, no trailing zeros beyond it.
fn format_percent(value: f64) -> String {
    if value.fract() == 0.0 {
        return format!("{value:.1}");
    }
    let text = format!("{value:.2}");
    text.trim_end_matches('0').to_string()
}
