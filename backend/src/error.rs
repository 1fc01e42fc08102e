//! Error types for the CWR registration engine.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`ConfigError`] - Registration configuration errors
//! - [`CatalogError`] - Invalid handles or references into a catalog
//! - [`AssemblyError`] - Conditions that abort writing a whole CWR file
//! - [`ReadError`] - Failures reading CWR input before any record is seen
//! - [`CwrError`] - Top-level errors
//!
//! Business-rule problems (share totals, vocabulary codes, checksums) are
//! never errors: they are diagnostics in a [`crate::logs::MessageLog`].
//! Only the conditions listed here cross the library boundary as `Err`.

use thiserror::Error;

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while loading a [`crate::config::RegistrationConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required setting is absent.
    #[error("Missing configuration value: {0}")]
    Missing(String),

    /// A setting is present but cannot be used.
    #[error("Invalid value for '{key}': {message}")]
    Invalid { key: String, message: String },

    /// Unsupported CWR version string.
    #[error("Unsupported CWR version: {0}")]
    UnsupportedVersion(String),

    /// Configuration file failed schema validation.
    #[error("Configuration does not match schema: {errors:?}")]
    Schema { errors: Vec<String> },

    /// JSON error.
    #[error("Configuration JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("Configuration IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Catalog Errors
// =============================================================================

/// Errors from catalog mutation calls given a stale or foreign handle.
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    /// Work handle does not exist.
    #[error("Unknown work handle: {0}")]
    UnknownWork(usize),

    /// Share handle does not exist in the given work.
    #[error("Unknown share {share} in work {work}")]
    UnknownShare { work: usize, share: usize },

    /// Share cites a party number that was never registered.
    #[error("Interested party {0} is not registered")]
    UnknownShareholder(u64),

    /// Session cursor used before a work or share was selected.
    #[error("No {0} selected")]
    NothingSelected(&'static str),
}

// =============================================================================
// Assembly Errors
// =============================================================================

/// File-fatal conditions while writing a CWR transmission.
#[derive(Debug, Error, PartialEq)]
pub enum AssemblyError {
    /// No submitter code configured.
    #[error("Submitter code is not configured")]
    MissingSubmitterCode,

    /// No submitter IPI configured.
    #[error("Submitter IPI is not configured")]
    MissingSubmitterIpi,

    /// Submitter is not in the shareholder registry.
    #[error("Submitter {0} is not a registered shareholder")]
    SubmitterNotRegistered(u64),
}

// =============================================================================
// Read Errors
// =============================================================================

/// Errors reading raw CWR input.
#[derive(Debug, Error)]
pub enum ReadError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Input could not be decoded in the detected encoding.
    #[error("Failed to decode input as {0}")]
    Encoding(String),

    /// Empty input.
    #[error("CWR input is empty")]
    EmptyInput,
}

// =============================================================================
// Top-level Errors
// =============================================================================

/// Top-level error type wrapping every layer.
#[derive(Debug, Error)]
pub enum CwrError {
    /// Configuration error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Catalog error.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Assembly error.
    #[error("Assembly error: {0}")]
    Assembly(#[from] AssemblyError),

    /// Read error.
    #[error("Read error: {0}")]
    Read(#[from] ReadError),

    /// Catalog JSON does not match the catalog schema.
    #[error("Catalog does not match schema: {errors:?}")]
    Schema { errors: Vec<String> },

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for catalog mutation.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Result type for assembly.
pub type AssemblyResult<T> = Result<T, AssemblyError>;

/// Result type for reading input.
pub type ReadResult<T> = Result<T, ReadError>;

/// Result type for top-level operations.
pub type CwrResult<T> = Result<T, CwrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        let read_err = ReadError::EmptyInput;
        let top: CwrError = read_err.into();
        assert!(top.to_string().contains("empty"));

        let assembly_err = AssemblyError::SubmitterNotRegistered(123456789);
        let top: CwrError = assembly_err.into();
        assert!(top.to_string().contains("123456789"));
    }

    #[test]
    fn test_config_error_format() {
        let err = ConfigError::Invalid {
            key: "CWR_RECEIVER".into(),
            message: "must be numeric".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("CWR_RECEIVER"));
        assert!(msg.contains("must be numeric"));
    }
}
