//! Identity lookups injected into the parser and the validation engine.
//!
//! Both calls are synchronous and run in line with the pass that needs them.
//! `None` means "no opinion": the caller falls back to its own rule.

use std::collections::{HashMap, HashSet};

/// Port that resolves interested parties against an external registry.
pub trait IdentityResolver {
    /// Party number for a writer the source file left unidentified.
    fn resolve_unknown_writer(&self, last_name: &str, first_name: &str, society: Option<u16>) -> Option<u64>;

    /// Whether an IPI Name Number is known to the registry.
    fn ipi_exists(&self, ipi_name: u64) -> Option<bool>;
}

/// Resolver with no backing registry.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLookup;

impl IdentityResolver for NoLookup {
    fn resolve_unknown_writer(&self, _last_name: &str, _first_name: &str, _society: Option<u16>) -> Option<u64> {
        None
    }

    fn ipi_exists(&self, _ipi_name: u64) -> Option<bool> {
        None
    }
}

/// In-memory resolver, keyed by upper-cased `LAST/FIRST`.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    writers: HashMap<String, u64>,
    known_ipis: Option<HashSet<u64>>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_writer(mut self, last_name: &str, first_name: &str, ip_number: u64) -> Self {
        self.writers.insert(directory_key(last_name, first_name), ip_number);
        self
    }

    /// Restrict [`IdentityResolver::ipi_exists`] to the given numbers.
    pub fn with_known_ipis(mut self, ipis: impl IntoIterator<Item = u64>) -> Self {
        self.known_ipis = Some(ipis.into_iter().collect());
        self
    }
}

fn directory_key(last_name: &str, first_name: &str) -> String {
    format!("{}/{}", last_name.trim().to_uppercase(), first_name.trim().to_uppercase())
}

impl IdentityResolver for StaticDirectory {
    fn resolve_unknown_writer(&self, last_name: &str, first_name: &str, _society: Option<u16>) -> Option<u64> {
        self.writers.get(&directory_key(last_name, first_name)).copied()
    }

    fn ipi_exists(&self, ipi_name: u64) -> Option<bool> {
        self.known_ipis.as_ref().map(|known| known.contains(&ipi_name))
    }
}
