//! Registration configuration.
//!
//! Loaded from `CWR_*` environment variables (a `.env` file is honoured) or
//! from a JSON file checked against `schemas/registration-config.json`.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};
use crate::record::CwrVersion;
use crate::validation::validate_config_json;

/// Longest submitter code allowed in file names and HDR records.
pub const SUBMITTER_CODE_MAX: usize = 3;

fn identity(text: &str) -> String {
    text.to_string()
}

/// Everything the assembler needs besides the catalog itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistrationConfig {
    pub submitter_code: String,
    /// Interested party number of the submitting publisher.
    pub submitter_ipi: u64,
    /// Overrides the registry name in the HDR sender name when set.
    pub submitter_name: String,
    pub receiver_society: Option<u16>,
    pub version: CwrVersion,
    /// HDR revision, 2.2 only.
    pub revision: u16,
    pub software_package: String,
    pub software_version: String,
    pub character_set: String,
    pub contact_name: String,
    pub contact_id: String,
    /// Sequence number of the file within the year, from 1.
    pub file_sequence: u32,
    pub rewrite_territories: bool,
    /// Receiver society to the ISO countries collection shares are restricted to.
    pub rewrite_rules: BTreeMap<u16, Vec<String>>,
    /// Receiver society to extra organisation codes that mark a revision.
    pub revision_rules: BTreeMap<u16, Vec<u16>>,
    /// Applied to titles and names before they are written.
    #[serde(skip, default = "default_transliterate")]
    pub transliterate: fn(&str) -> String,
}

fn default_transliterate() -> fn(&str) -> String {
    identity
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            submitter_code: String::new(),
            submitter_ipi: 0,
            submitter_name: String::new(),
            receiver_society: None,
            version: CwrVersion::default(),
            revision: 0,
            software_package: env!("CARGO_PKG_NAME").to_string(),
            software_version: env!("CARGO_PKG_VERSION").to_string(),
            character_set: String::new(),
            contact_name: String::new(),
            contact_id: String::new(),
            file_sequence: 1,
            rewrite_territories: false,
            rewrite_rules: BTreeMap::from([(88, vec!["CA".to_string()])]),
            revision_rules: BTreeMap::from([(707, vec![10, 21, 101])]),
            transliterate: identity,
        }
    }
}

impl RegistrationConfig {
    pub fn new(submitter_code: impl Into<String>, submitter_ipi: u64) -> Self {
        Self { submitter_code: submitter_code.into(), submitter_ipi, ..Self::default() }
    }

    pub fn with_receiver(mut self, society: u16) -> Self {
        self.receiver_society = Some(society);
        self
    }

    pub fn with_version(mut self, version: CwrVersion) -> Self {
        self.version = version;
        self
    }

    /// Load from `CWR_*` environment variables, reading `.env` first.
    pub fn from_env() -> ConfigResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from any key lookup using the `CWR_*` names.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mut config = Self {
            submitter_code: get("CWR_SUBMITTER_CODE")
                .ok_or_else(|| ConfigError::Missing("CWR_SUBMITTER_CODE".to_string()))?,
            submitter_ipi: parse_number(
                "CWR_SUBMITTER_IPI",
                &get("CWR_SUBMITTER_IPI").ok_or_else(|| ConfigError::Missing("CWR_SUBMITTER_IPI".to_string()))?,
            )?,
            ..Self::default()
        };

        if let Some(name) = get("CWR_SUBMITTER_NAME") {
            config.submitter_name = name;
        }
        if let Some(society) = get("CWR_RECEIVER_SOCIETY") {
            config.receiver_society = Some(parse_number("CWR_RECEIVER_SOCIETY", &society)?);
        }
        if let Some(version) = get("CWR_VERSION") {
            config.version = version.parse().map_err(|_| ConfigError::UnsupportedVersion(version))?;
        }
        if let Some(revision) = get("CWR_REVISION") {
            config.revision = parse_number("CWR_REVISION", &revision)?;
        }
        if let Some(charset) = get("CWR_CHARACTER_SET") {
            config.character_set = charset;
        }
        if let Some(name) = get("CWR_CONTACT_NAME") {
            config.contact_name = name;
        }
        if let Some(id) = get("CWR_CONTACT_ID") {
            config.contact_id = id;
        }
        if let Some(sequence) = get("CWR_FILE_SEQUENCE") {
            config.file_sequence = parse_number("CWR_FILE_SEQUENCE", &sequence)?;
        }
        if let Some(flag) = get("CWR_REWRITE_TERRITORIES") {
            config.rewrite_territories = matches!(flag.to_lowercase().as_str(), "1" | "true" | "yes" | "y");
        }

        config.check()?;
        Ok(config)
    }

    /// Load a JSON file, checked against the configuration schema.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        let value: serde_json::Value = serde_json::from_str(&content)?;
        validate_config_json(&value).map_err(|errors| ConfigError::Schema { errors })?;
        let config: Self = serde_json::from_value(value)?;
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> ConfigResult<()> {
        if self.submitter_code.chars().count() > SUBMITTER_CODE_MAX {
            return Err(ConfigError::Invalid {
                key: "submitterCode".to_string(),
                message: format!("at most {} characters", SUBMITTER_CODE_MAX),
            });
        }
        Ok(())
    }

    /// Output file name, e.g. `CW240001ABC_021.V21`.
    pub fn filename(&self, date: NaiveDate) -> String {
        format!(
            "CW{:02}{:04}{}_{:03}.V{}",
            date.year().rem_euclid(100),
            self.file_sequence,
            self.submitter_code,
            self.receiver_society.unwrap_or(0),
            self.version.file_code()
        )
    }

    /// Extra organisation codes that mark a revision for the configured receiver.
    pub fn revision_codes(&self) -> &[u16] {
        self.receiver_society
            .and_then(|society| self.revision_rules.get(&society))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Target countries when territory rewriting applies to the configured receiver.
    pub fn rewrite_targets(&self) -> Option<&[String]> {
        if !self.rewrite_territories {
            return None;
        }
        self.receiver_society
            .and_then(|society| self.rewrite_rules.get(&society))
            .map(Vec::as_slice)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> ConfigResult<T> {
    value.parse().map_err(|_| ConfigError::Invalid {
        key: key.to_string(),
        message: format!("'{}' is not a number", value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_reads_settings() {
        let config = RegistrationConfig::from_lookup(lookup(&[
            ("CWR_SUBMITTER_CODE", "ABC"),
            ("CWR_SUBMITTER_IPI", "100000001"),
            ("CWR_RECEIVER_SOCIETY", "21"),
            ("CWR_VERSION", "2.2"),
            ("CWR_REWRITE_TERRITORIES", "true"),
        ]))
        .unwrap();
        assert_eq!(config.submitter_code, "ABC");
        assert_eq!(config.submitter_ipi, 100000001);
        assert_eq!(config.receiver_society, Some(21));
        assert_eq!(config.version, CwrVersion::V22);
        assert!(config.rewrite_territories);
        assert_eq!(config.file_sequence, 1);
    }

    #[test]
    fn test_from_lookup_errors() {
        let missing = RegistrationConfig::from_lookup(lookup(&[("CWR_SUBMITTER_IPI", "1")]));
        assert!(matches!(missing, Err(ConfigError::Missing(key)) if key == "CWR_SUBMITTER_CODE"));

        let bad = RegistrationConfig::from_lookup(lookup(&[
            ("CWR_SUBMITTER_CODE", "ABC"),
            ("CWR_SUBMITTER_IPI", "12x"),
        ]));
        assert!(matches!(bad, Err(ConfigError::Invalid { .. })));

        let version = RegistrationConfig::from_lookup(lookup(&[
            ("CWR_SUBMITTER_CODE", "ABC"),
            ("CWR_SUBMITTER_IPI", "1"),
            ("CWR_VERSION", "3.0"),
        ]));
        assert!(matches!(version, Err(ConfigError::UnsupportedVersion(_))));

        let long = RegistrationConfig::from_lookup(lookup(&[
            ("CWR_SUBMITTER_CODE", "ABCD"),
            ("CWR_SUBMITTER_IPI", "1"),
        ]));
        assert!(matches!(long, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_filename_convention() {
        let config = RegistrationConfig::new("ABC", 100000001).with_receiver(21);
        let date = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        assert_eq!(config.filename(date), "CW240001ABC_021.V21");

        let config = RegistrationConfig { file_sequence: 12, ..config.with_version(CwrVersion::V22) };
        assert_eq!(config.filename(date), "CW240012ABC_021.V22");
    }

    #[test]
    fn test_receiver_rules() {
        let config = RegistrationConfig::new("ABC", 1).with_receiver(707);
        assert_eq!(config.revision_codes(), &[10, 21, 101]);
        assert!(config.rewrite_targets().is_none());

        let config = RegistrationConfig { rewrite_territories: true, ..RegistrationConfig::new("ABC", 1).with_receiver(88) };
        assert_eq!(config.rewrite_targets(), Some(&["CA".to_string()][..]));
        assert!(config.revision_codes().is_empty());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"submitterCode": "ABC", "submitterIpi": 100000001, "receiverSociety": 52, "version": "2.2", "rewriteRules": {{"52": ["FR"]}}}}"#
        )
        .unwrap();
        let config = RegistrationConfig::from_file(file.path()).unwrap();
        assert_eq!(config.version, CwrVersion::V22);
        assert_eq!(config.rewrite_rules.get(&52), Some(&vec!["FR".to_string()]));
        assert_eq!((config.transliterate)("Él"), "Él");
    }

    #[test]
    fn test_from_file_rejects_schema_violations() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"submitterCode": 12}}"#).unwrap();
        assert!(matches!(RegistrationConfig::from_file(file.path()), Err(ConfigError::Schema { .. })));
    }
}
