//! Tests for temporary project code backfill.

use opps_model::{ProjectCodeConfig, SequenceStrategy};
use opps_normalize::ProjectCodeGenerator;
use regex::Regex;

#[test]
fn backfilled_code_carries_year_and_month() {
    let pattern = Regex::new(r"^CMRP2501\d{3}$").unwrap();
    for strategy in [SequenceStrategy::Counter, SequenceStrategy::Fingerprint] {
        let mut generator = ProjectCodeGenerator::new(&ProjectCodeConfig {
            sequence: strategy,
            ..ProjectCodeConfig::default()
        });
        let generated = generator.generate("2025-01-18");
        assert!(pattern.is_match(&generated.code), "{}", generated.code);
        assert!(!generated.fallback);
    }
}

#[test]
fn counter_codes_are_unique_within_a_month() {
    let mut generator = ProjectCodeGenerator::new(&ProjectCodeConfig::default());
    let codes: Vec<String> = (0..5)
        .map(|_| generator.generate("2025-01-18").code)
        .collect();
    assert_eq!(
        codes,
        vec!["CMRP2501001", "CMRP2501002", "CMRP2501003", "CMRP2501004", "CMRP2501005"]
    );
}

#[test]
fn custom_prefix_and_fallback() {
    let mut generator = ProjectCodeGenerator::new(&ProjectCodeConfig {
        prefix: "OPP".to_string(),
        fallback: "OPP00000000".to_string(),
        ..ProjectCodeConfig::default()
    });
    assert!(generator.is_incomplete("OPP"));
    assert!(!generator.is_incomplete("CMRP"));
    assert_eq!(generator.generate("2024-12-01").code, "OPP2412001");
    assert_eq!(generator.generate("").code, "OPP00000000");
}
