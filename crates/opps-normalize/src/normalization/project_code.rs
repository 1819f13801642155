//! Temporary project code synthesis.
//!
//! A complete code is `<prefix><yy><mm><sequence>`, e.g. `CMRP2501385`.
//! Rows whose code is the bare prefix get a placeholder built from the row's
//! encoded date. Placeholders are flagged for manual correction later.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate};
use opps_model::{ProjectCodeConfig, SequenceStrategy};
use sha2::{Digest, Sha256};

/// Highest sequence that fits the three sequence digits of a code.
pub const MAX_SEQUENCE: u32 = 999;

/// Components of a complete project code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeParts {
    pub year: u32,
    pub month: u32,
    pub sequence: u32,
}

/// Split `<prefix><yy><mm><digits>` into its parts.
pub fn parse_code(code: &str, prefix: &str) -> Option<CodeParts> {
    let rest = code.trim().strip_prefix(prefix)?;
    if rest.len() < 5 || !rest.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = rest[..2].parse().ok()?;
    let month = rest[2..4].parse().ok()?;
    let sequence = rest[4..].parse().ok()?;
    (1..=12)
        .contains(&month)
        .then_some(CodeParts { year, month, sequence })
}

/// Sequence digits derived from the date string alone: SHA-256, first eight
/// bytes big-endian, modulo 1000. Every row sharing a date gets the same value.
pub fn fingerprint_sequence(date: &str) -> u32 {
    let digest = Sha256::digest(date.as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    (u64::from_be_bytes(head) % 1000) as u32
}

/// A synthesized code and how it came about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedCode {
    pub code: String,
    /// The date did not parse and the fixed fallback was used.
    pub fallback: bool,
    /// The code was already present in the snapshot or issued earlier.
    pub duplicate: bool,
    /// Every three-digit sequence of the month was taken and the fallback
    /// was used.
    pub exhausted: bool,
}

/// Issues temporary codes for one snapshot.
#[derive(Debug, Clone)]
pub struct ProjectCodeGenerator {
    prefix: String,
    fallback: String,
    strategy: SequenceStrategy,
    /// Highest sequence seen per (yy, mm).
    highest: BTreeMap<(u32, u32), u32>,
    known: BTreeSet<String>,
}

impl ProjectCodeGenerator {
    pub fn new(config: &ProjectCodeConfig) -> Self {
        Self {
            prefix: config.prefix.clone(),
            fallback: config.fallback.clone(),
            strategy: config.sequence,
            highest: BTreeMap::new(),
            known: BTreeSet::new(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// A code is incomplete when it is the bare prefix.
    pub fn is_incomplete(&self, code: &str) -> bool {
        code.trim() == self.prefix
    }

    /// Record a code already present in the snapshot so that counters start
    /// past it and collisions with it are detected.
    pub fn observe(&mut self, code: &str) {
        let code = code.trim();
        let Some(parts) = parse_code(code, &self.prefix) else {
            return;
        };
        self.known.insert(code.to_string());
        let entry = self.highest.entry((parts.year, parts.month)).or_insert(0);
        *entry = (*entry).max(parts.sequence);
    }

    /// Synthesize a code from an ISO `YYYY-MM-DD` date string.
    pub fn generate(&mut self, date: &str) -> GeneratedCode {
        let date = date.trim();
        let Ok(parsed) = NaiveDate::parse_from_str(date, "%Y-%m-%d") else {
            return GeneratedCode {
                code: self.fallback.clone(),
                fallback: true,
                duplicate: false,
                exhausted: false,
            };
        };
        let year = parsed.year().rem_euclid(100) as u32;
        let month = parsed.month();
        let sequence = match self.strategy {
            SequenceStrategy::Counter => self.next_sequence(year, month),
            SequenceStrategy::Fingerprint => Some(fingerprint_sequence(date)),
        };
        let Some(sequence) = sequence else {
            return GeneratedCode {
                code: self.fallback.clone(),
                fallback: false,
                duplicate: false,
                exhausted: true,
            };
        };
        let code = self.format_code(year, month, sequence);
        let duplicate = !self.known.insert(code.clone());
        GeneratedCode {
            code,
            fallback: false,
            duplicate,
            exhausted: false,
        }
    }

    fn format_code(&self, year: u32, month: u32, sequence: u32) -> String {
        format!("{}{year:02}{month:02}{sequence:03}", self.prefix)
    }

    /// One past the highest sequence of the month while that still fits in
    /// three digits, then the lowest free slot. `None` once all are taken.
    fn next_sequence(&mut self, year: u32, month: u32) -> Option<u32> {
        let highest = self.highest.entry((year, month)).or_insert(0);
        if *highest < MAX_SEQUENCE {
            *highest += 1;
            return Some(*highest);
        }
        (1..=MAX_SEQUENCE)
            .find(|&sequence| !self.known.contains(&self.format_code(year, month, sequence)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator(strategy: SequenceStrategy) -> ProjectCodeGenerator {
        ProjectCodeGenerator::new(&ProjectCodeConfig {
            sequence: strategy,
            ..ProjectCodeConfig::default()
        })
    }

    #[test]
    fn parses_complete_codes() {
        assert_eq!(
            parse_code("CMRP2501385", "CMRP"),
            Some(CodeParts {
                year: 25,
                month: 1,
                sequence: 385
            })
        );
        assert_eq!(parse_code("CMRP", "CMRP"), None);
        assert_eq!(parse_code("CMRP2513001", "CMRP"), None);
        assert_eq!(parse_code("XX2501385", "CMRP"), None);
    }

    #[test]
    fn incomplete_detection_trims() {
        let generator = generator(SequenceStrategy::Counter);
        assert!(generator.is_incomplete(" CMRP "));
        assert!(!generator.is_incomplete("CMRP2501385"));
        assert!(!generator.is_incomplete(""));
    }

    #[test]
    fn counter_continues_after_existing_codes() {
        let mut generator = generator(SequenceStrategy::Counter);
        generator.observe("CMRP2501041");
        generator.observe("CMRP2501007");
        generator.observe("CMRP2502900");
        assert_eq!(generator.generate("2025-01-18").code, "CMRP2501042");
        assert_eq!(generator.generate("2025-01-20").code, "CMRP2501043");
        assert_eq!(generator.generate("2025-03-02").code, "CMRP2503001");
    }

    #[test]
    fn fingerprint_is_stable_and_flags_collisions() {
        let mut generator = generator(SequenceStrategy::Fingerprint);
        let first = generator.generate("2025-01-18");
        let second = generator.generate("2025-01-18");
        assert_eq!(first.code, second.code);
        assert!(!first.duplicate);
        assert!(second.duplicate);
        assert_eq!(
            first.code,
            format!("CMRP2501{:03}", fingerprint_sequence("2025-01-18"))
        );
    }

    #[test]
    fn unparseable_date_uses_fallback() {
        let mut generator = generator(SequenceStrategy::Counter);
        let generated = generator.generate("18/01/2025");
        assert_eq!(generated.code, "CMRP25000001");
        assert!(generated.fallback);
    }

    #[test]
    fn counter_never_grows_past_three_digits() {
        let mut generator = generator(SequenceStrategy::Counter);
        generator.observe("CMRP2508999");
        generator.observe("CMRP2508001");
        let generated = generator.generate("2025-08-12");
        assert_eq!(generated.code, "CMRP2508002");
        assert!(!generated.duplicate);
        assert!(!generated.exhausted);
        assert_eq!(generator.generate("2025-08-13").code, "CMRP2508003");
    }

    #[test]
    fn four_digit_sequences_do_not_leak_into_new_codes() {
        let mut generator = generator(SequenceStrategy::Counter);
        generator.observe("CMRP25081000");
        let generated = generator.generate("2025-08-12");
        assert_eq!(generated.code, "CMRP2508001");
        assert_eq!(generated.code.len(), 11);
    }

    #[test]
    fn full_month_falls_back() {
        let mut generator = generator(SequenceStrategy::Counter);
        for sequence in 1..=MAX_SEQUENCE {
            generator.observe(&format!("CMRP2508{sequence:03}"));
        }
        let generated = generator.generate("2025-08-12");
        assert_eq!(generated.code, "CMRP25000001");
        assert!(generated.exhausted);
        assert!(!generated.fallback);
        assert_eq!(generator.generate("2025-09-01").code, "CMRP2509001");
    }

    #[test]
    fn fingerprint_stays_below_one_thousand() {
        for day in 1..=28 {
            assert!(fingerprint_sequence(&format!("2025-02-{day:02}")) < 1000);
        }
    }
}
