//! Calendar date normalization to `YYYY-MM-DD`.
//!
//! Spreadsheet dates arrive in whatever shape the person typing them chose:
//! day-first or month-first, dotted, with month names, with a weekday in
//! front, or with no year at all. Normalization is best effort and ordered:
//!
//! 1. Clean the token (whitespace, quotes, the `TBI` placeholder).
//! 2. Accept an existing `YYYY-MM-DD` value if it is a real calendar date.
//! 3. Try the exact patterns in [`EXACT_PATTERNS`], first match wins.
//! 4. Fall back to extracting a day/month pair with regular expressions.
//!
//! Failure is signalled by an empty string, never by an error.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use opps_model::DEFAULT_REFERENCE_YEAR;
use regex::Regex;

use super::text::normalize_text;

/// Placeholder used in the spreadsheet for "to be identified".
pub const TBI_PLACEHOLDER: &str = "TBI";

/// How a pattern carries the year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearPart {
    /// Four-digit year (`%Y`).
    Full,
    /// Two-digit year (`%y`).
    Short,
    /// No year; the reference year is assumed.
    Omitted,
}

/// One exact `chrono` format in the priority list.
#[derive(Debug, Clone, Copy)]
pub struct DatePattern {
    pub format: &'static str,
    pub year: YearPart,
}

const fn pattern(format: &'static str, year: YearPart) -> DatePattern {
    DatePattern { format, year }
}

/// Exact patterns in priority order. Day-first wins over month-first when a
/// value is valid both ways.
pub const EXACT_PATTERNS: &[DatePattern] = &[
    pattern("%Y-%m-%d", YearPart::Full),   // 2025-01-01
    pattern("%d/%m/%Y", YearPart::Full),   // 21/03/2025
    pattern("%m/%d/%Y", YearPart::Full),   // 03/21/2025
    pattern("%d-%m-%Y", YearPart::Full),   // 21-03-2025
    pattern("%Y/%m/%d", YearPart::Full),   // 2025/01/01
    pattern("%d/%m/%y", YearPart::Short),  // 21/3/25
    pattern("%m/%d/%y", YearPart::Short),  // 3/21/25
    pattern("%b %d, %Y", YearPart::Full),  // Mar 21, 2025
    pattern("%B %d, %Y", YearPart::Full),  // March 21, 2025
    pattern("%d %b %Y", YearPart::Full),   // 21 Mar 2025
    pattern("%d %B %Y", YearPart::Full),   // 21 March 2025
    pattern("%b %d", YearPart::Omitted),   // Mar 21
    pattern("%d/%m", YearPart::Omitted),   // 21/3
    pattern("%m/%d", YearPart::Omitted),   // 3/21
    pattern("%d-%m", YearPart::Omitted),   // 21-3
    pattern("%m-%d", YearPart::Omitted),   // 3-21
    pattern("%Y.%m.%d", YearPart::Full),   // 2025.03.21
    pattern("%d.%m.%Y", YearPart::Full),   // 21.03.2025
    pattern("%d.%m.%y", YearPart::Short),  // 21.03.25
];

static WEEKDAY_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:mon|tue|wed|thu|fri|sat|sun)[a-z]*\.?(?:,\s*|\s+)")
        .expect("weekday prefix regex")
});

static NUMERIC_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]{1,2})[/.-]([0-9]{1,2})").expect("numeric pair regex"));

static DAY_MONTH_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([0-9]{1,2})\s*(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*")
        .expect("day month regex")
});

static MONTH_NAME_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\s*([0-9]{1,2})")
        .expect("month day regex")
});

/// Normalizes raw date tokens against a fixed reference year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateNormalizer {
    reference_year: i32,
}

impl Default for DateNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_REFERENCE_YEAR)
    }
}

impl DateNormalizer {
    pub fn new(reference_year: i32) -> Self {
        Self { reference_year }
    }

    pub fn reference_year(&self) -> i32 {
        self.reference_year
    }

    /// Canonical `YYYY-MM-DD`, or an empty string when nothing matched.
    pub fn normalize(&self, raw: &str) -> String {
        self.parse(raw).map(format_iso_date).unwrap_or_default()
    }

    /// Parse a raw token into a calendar date.
    pub fn parse(&self, raw: &str) -> Option<NaiveDate> {
        let cleaned = clean_date_token(raw);
        if cleaned.is_empty() {
            return None;
        }

        // An ISO-shaped value is either valid as-is or not a date at all.
        if is_iso_date_shape(&cleaned) {
            return NaiveDate::parse_from_str(&cleaned, "%Y-%m-%d").ok();
        }

        if let Some(date) = self.parse_exact(&cleaned) {
            return Some(date);
        }
        if let Some(stripped) = strip_weekday(&cleaned) {
            if let Some(date) = self.parse_exact(stripped) {
                return Some(date);
            }
        }

        self.extract_day_month(&cleaned)
    }

    fn parse_exact(&self, value: &str) -> Option<NaiveDate> {
        EXACT_PATTERNS
            .iter()
            .find_map(|pattern| self.parse_with(value, pattern))
    }

    fn parse_with(&self, value: &str, pattern: &DatePattern) -> Option<NaiveDate> {
        match pattern.year {
            YearPart::Full => NaiveDate::parse_from_str(value, pattern.format)
                .ok()
                // chrono reads `%Y` from any number of digits; a two-digit
                // year must fall through to the `%y` patterns.
                .filter(|date| (1000..=9999).contains(&date.year())),
            YearPart::Short => NaiveDate::parse_from_str(value, pattern.format).ok(),
            YearPart::Omitted => {
                let with_year = format!("{value} {}", self.reference_year);
                let format = format!("{} %Y", pattern.format);
                NaiveDate::parse_from_str(&with_year, &format).ok()
            }
        }
    }

    /// Regex fallback: a numeric day/month pair, then a day next to a month
    /// name in either order. The first candidate of each kind is tried.
    fn extract_day_month(&self, value: &str) -> Option<NaiveDate> {
        if let Some(caps) = NUMERIC_PAIR.captures(value) {
            let mut day: u32 = caps[1].parse().ok()?;
            let mut month: u32 = caps[2].parse().ok()?;
            if month > 12 && day <= 12 {
                std::mem::swap(&mut day, &mut month);
            }
            if let Some(date) = self.day_month(day, month) {
                return Some(date);
            }
        }

        if let Some(caps) = DAY_MONTH_NAME.captures(value) {
            let day = caps[1].parse().ok();
            let month = month_from_abbrev(&caps[2]);
            if let (Some(day), Some(month)) = (day, month) {
                if let Some(date) = self.day_month(day, month) {
                    return Some(date);
                }
            }
        }

        if let Some(caps) = MONTH_NAME_DAY.captures(value) {
            let month = month_from_abbrev(&caps[1]);
            let day = caps[2].parse().ok();
            if let (Some(day), Some(month)) = (day, month) {
                return self.day_month(day, month);
            }
        }

        None
    }

    fn day_month(&self, day: u32, month: u32) -> Option<NaiveDate> {
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return None;
        }
        NaiveDate::from_ymd_opt(self.reference_year, month, day)
    }
}

/// Normalize a date with the default reference year.
pub fn normalize_date(raw: &str) -> String {
    DateNormalizer::default().normalize(raw)
}

/// Step 1 of normalization: trim whitespace and quotes, drop `TBI`.
pub fn clean_date_token(raw: &str) -> String {
    let text = normalize_text(raw);
    if text.eq_ignore_ascii_case(TBI_PLACEHOLDER) {
        return String::new();
    }
    text.replace(TBI_PLACEHOLDER, "").trim().to_string()
}

/// `YYYY-MM-DD` digit shape, without checking the calendar.
pub fn is_iso_date_shape(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(idx, byte)| match idx {
            4 | 7 => *byte == b'-',
            _ => byte.is_ascii_digit(),
        })
}

/// True for values a normalized date column may hold: empty or a valid ISO date.
pub fn is_normalized_date(value: &str) -> bool {
    value.is_empty()
        || (is_iso_date_shape(value) && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok())
}

pub fn format_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn strip_weekday(value: &str) -> Option<&str> {
    let found = WEEKDAY_PREFIX.find(value)?;
    let rest = value[found.end()..].trim();
    (!rest.is_empty()).then_some(rest)
}

fn month_from_abbrev(name: &str) -> Option<u32> {
    let month = match name.get(..3)?.to_ascii_lowercase().as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}
