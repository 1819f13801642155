//! Scrub configuration loaded from TOML.
//!
//! Every key is optional. A missing file section falls back to the built-in
//! defaults, which reproduce the layout and constants the opportunity
//! snapshots have always used.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ModelError};
use crate::schema::{CANONICAL_V1, ColumnSchema, FOLDER_ID_COLUMN, IMPORT_V2};

/// Year assumed for dates written without one.
pub const DEFAULT_REFERENCE_YEAR: i32 = 2025;

pub const DEFAULT_CODE_PREFIX: &str = "CMRP";

pub const DEFAULT_FALLBACK_CODE: &str = "CMRP25000001";

pub const DEFAULT_TEMP_CODE_NOTE: &str =
    "NOTE: TEMPORARY PROJECT CODE - NEEDS PROPER EXISTING CODE ASSIGNMENT";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScrubConfig {
    pub reference_year: i32,
    /// Version of the layout positional passes resolve columns against.
    pub schema: String,
    /// Additional layouts, looked up before the built-in ones.
    pub schemas: Vec<ColumnSchema>,
    pub project_codes: ProjectCodeConfig,
    pub import: ImportConfig,
    pub submitted: SubmittedConfig,
}

impl Default for ScrubConfig {
    fn default() -> Self {
        Self {
            reference_year: DEFAULT_REFERENCE_YEAR,
            schema: CANONICAL_V1.to_string(),
            schemas: Vec::new(),
            project_codes: ProjectCodeConfig::default(),
            import: ImportConfig::default(),
            submitted: SubmittedConfig::default(),
        }
    }
}

/// How the sequence digits of a temporary project code are chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequenceStrategy {
    /// Next free number per year-month, seeded from codes already present.
    #[default]
    Counter,
    /// SHA-256 of the date string modulo 1000. Stable, but collides.
    Fingerprint,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectCodeConfig {
    pub prefix: String,
    pub fallback: String,
    pub sequence: SequenceStrategy,
    pub temp_code_note: String,
    /// Codes known to be temporary placeholders.
    pub temp_codes: Vec<String>,
}

impl Default for ProjectCodeConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_CODE_PREFIX.to_string(),
            fallback: DEFAULT_FALLBACK_CODE.to_string(),
            sequence: SequenceStrategy::default(),
            temp_code_note: DEFAULT_TEMP_CODE_NOTE.to_string(),
            temp_codes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImportConfig {
    /// Layout of the snapshot handed to the database import.
    pub schema: String,
    /// Column count the database import accepts.
    pub width: usize,
    pub folder_id_column: String,
    /// Folder ids whose trimmed length is at most this are cleared.
    pub short_folder_id_len: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            schema: IMPORT_V2.to_string(),
            width: 32,
            folder_id_column: FOLDER_ID_COLUMN.to_string(),
            short_folder_id_len: 10,
        }
    }
}

/// Column names of the raw spreadsheet export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SubmittedConfig {
    pub status_column: String,
    pub amount_column: String,
    pub status_value: String,
}

impl Default for SubmittedConfig {
    fn default() -> Self {
        Self {
            status_column: "Status".to_string(),
            amount_column: "Final amt".to_string(),
            status_value: "submitted".to_string(),
        }
    }
}

impl ScrubConfig {
    /// Read and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` when given, otherwise the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1000..=9999).contains(&self.reference_year) {
            return Err(ConfigError::invalid(
                "reference_year",
                format!("{} is not a four-digit year", self.reference_year),
            ));
        }
        if self.project_codes.prefix.trim().is_empty() {
            return Err(ConfigError::invalid("project_codes.prefix", "must not be empty"));
        }
        if self.import.width == 0 {
            return Err(ConfigError::invalid("import.width", "must be at least 1"));
        }
        if self.schema.trim().is_empty() {
            return Err(ConfigError::invalid("schema", "must name a schema version"));
        }
        Ok(())
    }

    /// Resolve the configured schema version, custom layouts first.
    pub fn resolve_schema(&self) -> Result<ColumnSchema, ModelError> {
        self.schema_named(&self.schema)
    }

    pub fn schema_named(&self, version: &str) -> Result<ColumnSchema, ModelError> {
        match self.schemas.iter().find(|s| s.version == version) {
            Some(custom) => ColumnSchema::new(custom.version.clone(), custom.columns.clone()),
            None => ColumnSchema::builtin(version),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config: ScrubConfig = toml::from_str("").unwrap();
        assert_eq!(config, ScrubConfig::default());
        assert_eq!(config.reference_year, 2025);
        assert_eq!(config.project_codes.sequence, SequenceStrategy::Counter);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: ScrubConfig = toml::from_str(
            r#"
reference_year = 2026

[project_codes]
sequence = "fingerprint"
temp_codes = ["CMRP2501385"]
"#,
        )
        .unwrap();
        assert_eq!(config.reference_year, 2026);
        assert_eq!(config.project_codes.sequence, SequenceStrategy::Fingerprint);
        assert_eq!(config.project_codes.prefix, "CMRP");
        assert_eq!(config.project_codes.temp_codes, vec!["CMRP2501385"]);
        assert_eq!(config.import.width, 32);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<ScrubConfig, _> = toml::from_str("refrence_year = 2025");
        assert!(result.is_err());
    }

    #[test]
    fn validate_rejects_two_digit_year() {
        let config = ScrubConfig {
            reference_year: 25,
            ..ScrubConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("reference_year"));
    }

    #[test]
    fn custom_schema_shadows_builtin() {
        let config: ScrubConfig = toml::from_str(
            r#"
schema = "legacy"

[[schemas]]
version = "legacy"
columns = ["encoded_date", "project_name", "project_code"]
"#,
        )
        .unwrap();
        let schema = config.resolve_schema().unwrap();
        assert_eq!(schema.version, "legacy");
        assert_eq!(schema.width(), 3);
        assert!(config.schema_named("import-v2").is_ok());
        assert!(config.schema_named("nope").is_err());
    }
}
