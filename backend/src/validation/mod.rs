//! Validation engine.
//!
//! Two passes run on every work before it is written:
//!
//! - [`validate_work`] normalises defaultable header fields, checks the
//!   work's sub-records against the code tables and decides NWR vs REV
//!   from its cross-references.
//! - [`validate_shares`] checks the interested parties: controlled IPI
//!   numbers, writer presence, ownership totals and per-country collection
//!   totals after territory expansion.
//!
//! Both return a [`ValidationReport`]. The first failed rule stops the pass;
//! the caller decides whether to skip or hold the work. Nothing here
//! mutates the catalog.
//!
//! The [`schema`] helpers check catalog and configuration JSON documents
//! against the embedded JSON Schemas.

pub mod schema;
mod shares;
mod work;

use serde::Serialize;

pub use schema::{is_valid, validate, validate_catalog_json, validate_config_json};
pub use shares::{percentage_controlled, validate_shares};
pub use work::validate_work;

use crate::catalog::Catalog;
use crate::config::RegistrationConfig;
use crate::identity::IdentityResolver;
use crate::logs::LogEntry;
use crate::models::{Percentage, Work};
use crate::territory::CountryShares;

/// Ownership and collection totals computed while checking shares.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareTotals {
    pub pr_ownership: Percentage,
    pub mr_ownership: Percentage,
    pub sr_ownership: Percentage,
    /// Per-country collection totals after territory expansion.
    pub collection: CountryShares,
    pub writers: u32,
    pub controlled_writers: u32,
    pub publishers: u32,
    pub sub_publishers: u32,
    pub arrangers: u32,
}

/// Outcome of a validation pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub passed: bool,
    pub diagnostics: Vec<LogEntry>,
    pub totals: ShareTotals,
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self { passed: true, diagnostics: Vec::new(), totals: ShareTotals::default() }
    }
}

impl ValidationReport {
    fn warn(&mut self, message: impl Into<String>) {
        self.diagnostics.push(LogEntry::warning(message));
    }

    fn reject(mut self, message: impl Into<String>) -> Self {
        self.diagnostics.push(LogEntry::error(message));
        self.passed = false;
        self
    }

    /// Message of the rule that failed the pass.
    pub fn failure(&self) -> Option<&str> {
        if self.passed {
            return None;
        }
        self.diagnostics.iter().rev().find(|e| e.is_error()).map(|e| e.message.as_str())
    }
}

/// Run both passes on a copy of a catalog work.
///
/// Returns the normalised copy, ready to be written, with the combined
/// report. Share checks only run when the work-level pass succeeded.
pub fn validate_registration(
    work: &Work,
    catalog: &Catalog,
    config: &RegistrationConfig,
    identity: &dyn IdentityResolver,
) -> (Work, ValidationReport) {
    let mut work = work.clone();
    let mut report = validate_work(&mut work, catalog, config);
    if report.passed {
        let shares = validate_shares(&work, catalog, identity);
        report.diagnostics.extend(shares.diagnostics);
        report.passed = shares.passed;
        report.totals = shares.totals;
    }
    (work, report)
}
