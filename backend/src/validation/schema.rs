//! JSON Schema checks for catalog and configuration documents.
//!
//! Schemas are embedded at compile time from the `schemas/` directory:
//! - `catalog.json`
//! - `registration-config.json`

use once_cell::sync::Lazy;
use serde_json::Value;

static CATALOG_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/catalog.json")).expect("Invalid embedded schema")
});

static CONFIG_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/registration-config.json")).expect("Invalid embedded schema")
});

/// Validate a JSON value against a JSON schema.
///
/// # Returns
/// * `Ok(())` if valid
/// * `Err(Vec<String>)` with one message per violation
///
/// # Example
/// ```ignore
/// use serde_json::json;
/// use cwr::validation::validate;
///
/// let schema = json!({
///     "type": "object",
///     "required": ["submitterCode"],
///     "properties": { "submitterCode": { "type": "string" } }
/// });
///
/// assert!(validate(&schema, &json!({ "submitterCode": "ABC" })).is_ok());
/// assert!(validate(&schema, &json!({ "submitterIpi": 1 })).is_err());
/// ```
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema).map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator.iter_errors(data).map(|e| e.to_string()).collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Yes/no variant of [`validate`].
pub fn is_valid(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}

/// Validate a catalog document before deserialising it.
pub fn validate_catalog_json(data: &Value) -> Result<(), Vec<String>> {
    validate(&CATALOG_SCHEMA, data)
}

/// Validate a registration configuration document.
pub fn validate_config_json(data: &Value) -> Result<(), Vec<String>> {
    validate(&CONFIG_SCHEMA, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_config() {
        let config = json!({
            "submitterCode": "ABC",
            "submitterIpi": 100000001,
            "receiverSociety": 21,
            "version": "2.1"
        });
        assert!(validate_config_json(&config).is_ok());
    }

    #[test]
    fn test_invalid_config() {
        let config = json!({ "submitterCode": "ABCD", "submitterIpi": "one", "version": "3.0" });
        let errors = validate_config_json(&config).unwrap_err();
        assert!(errors.len() >= 3);
    }

    #[test]
    fn test_valid_catalog() {
        let catalog = json!({
            "works": [{ "submitterWorkId": "W1", "title": "SONG", "transaction": 1 }],
            "shareholders": { "100000002": { "ipNumber": 100000002, "name": "SIMONE", "controlled": true } }
        });
        assert!(validate_catalog_json(&catalog).is_ok());
    }

    #[test]
    fn test_invalid_catalog() {
        let catalog = json!({ "works": [{ "title": 12 }] });
        assert!(validate_catalog_json(&catalog).is_err());
        assert!(!is_valid(&CATALOG_SCHEMA, &json!({ "works": "none" })));
    }
}
