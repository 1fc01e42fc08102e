//! TIS territory tree and share territory resolution.
//!
//! The tree is embedded at compile time from `data/tis.json` and parsed once:
//!
//! ```text
//! 2136 WORLD
//! ├── 2100 AFRICA ── DZ, AO, ...
//! ├── 2101 AMERICA
//! │   ├── 2115 NORTH AMERICA ── CA, US, ...
//! │   └── ...
//! ├── 2120 EUROPE
//! │   ├── 2128 NORDIC COUNTRIES ── DK, FI, ...
//! │   └── FR, DE, ...
//! └── ...
//! ```
//!
//! Leaves carry ISO 3166 numeric codes as their TIS-N code and a 2-letter
//! alpha code. A share's territory entries fold, in list order, into a
//! country to collection-share map: an include entry writes every country it
//! expands to, an exclude entry removes them.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::models::{CollectionShares, Inclusion, TerritoryEntry};

/// TIS-N code of the whole world.
pub const WORLD: u16 = 2136;

/// The embedded territory tree.
pub static TERRITORIES: Lazy<TerritoryTree> = Lazy::new(|| {
    TerritoryTree::from_json(include_str!("../../data/tis.json")).expect("Invalid embedded TIS tree")
});

/// A node of the TIS tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Territory {
    /// TIS numeric code.
    pub tis_n: u16,
    /// TIS alpha code: ISO alpha-2 for countries, longer for aggregates.
    pub tis_a: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Territory>,
}

impl Territory {
    /// Countries are the nodes with a two-letter code.
    pub fn is_country(&self) -> bool {
        self.tis_a.len() == 2
    }
}

/// Country (ISO alpha-2) to aggregated collection shares.
pub type CountryShares = BTreeMap<String, CollectionShares>;

/// Read-only territory tree.
#[derive(Debug, Clone)]
pub struct TerritoryTree {
    root: Territory,
}

impl TerritoryTree {
    pub fn new(root: Territory) -> Self {
        Self { root }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn root(&self) -> &Territory {
        &self.root
    }

    /// Depth-first lookup by TIS numeric code. First match wins.
    pub fn find(&self, tis_n: u16) -> Option<&Territory> {
        find_node(&self.root, &|t| t.tis_n == tis_n)
    }

    /// Depth-first lookup by TIS alpha code, case-insensitive.
    pub fn find_alpha(&self, tis_a: &str) -> Option<&Territory> {
        let wanted = tis_a.trim().to_uppercase();
        find_node(&self.root, &|t| t.tis_a == wanted)
    }

    /// Whether `alpha` is the ISO code of a country in the tree.
    pub fn is_country(&self, alpha: &str) -> bool {
        alpha.len() == 2 && self.find_alpha(alpha).is_some_and(Territory::is_country)
    }

    /// Every country under `tis_n`, or the country itself. Unknown codes expand to nothing.
    pub fn expand(&self, tis_n: u16) -> Vec<&Territory> {
        let mut countries = Vec::new();
        if let Some(node) = self.find(tis_n) {
            let mut seen = HashSet::new();
            collect_countries(node, &mut seen, &mut countries);
        }
        countries
    }

    /// ISO codes of [`TerritoryTree::expand`].
    pub fn expand_codes(&self, tis_n: u16) -> Vec<String> {
        self.expand(tis_n).into_iter().map(|t| t.tis_a.clone()).collect()
    }

    /// Fold a share's territory entries, in order, into per-country shares.
    pub fn resolve<'a>(&self, entries: impl IntoIterator<Item = &'a TerritoryEntry>) -> CountryShares {
        let mut countries = CountryShares::new();
        for entry in entries {
            for country in self.expand(entry.tis) {
                match entry.indicator {
                    Inclusion::Include => {
                        countries.insert(country.tis_a.clone(), entry.collection);
                    }
                    Inclusion::Exclude => {
                        countries.remove(&country.tis_a);
                    }
                }
            }
        }
        countries
    }

    /// Replace a share's entries with one include entry per target country it covers.
    ///
    /// `targets` are ISO alpha-2 codes; countries the share does not collect in are dropped.
    pub fn rewrite<'a>(
        &self,
        entries: impl IntoIterator<Item = &'a TerritoryEntry>,
        targets: &[String],
    ) -> Vec<TerritoryEntry> {
        let resolved = self.resolve(entries);
        targets
            .iter()
            .filter_map(|alpha| {
                let alpha = alpha.trim().to_uppercase();
                let collection = resolved.get(&alpha)?;
                let country = self.find_alpha(&alpha)?;
                Some(TerritoryEntry::include(country.tis_n, *collection))
            })
            .collect()
    }
}

fn find_node<'t>(node: &'t Territory, matches: &dyn Fn(&Territory) -> bool) -> Option<&'t Territory> {
    if matches(node) {
        return Some(node);
    }
    node.children.iter().find_map(|child| find_node(child, matches))
}

fn collect_countries<'t>(node: &'t Territory, seen: &mut HashSet<u16>, out: &mut Vec<&'t Territory>) {
    if node.is_country() && seen.insert(node.tis_n) {
        out.push(node);
    }
    for child in &node.children {
        collect_countries(child, seen, out);
    }
}
