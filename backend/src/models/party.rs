//! Interested parties, their shares in works, and territory entries.

use serde::{Deserialize, Serialize};

use super::{Percentage, Role};

// =============================================================================
// Shareholder
// =============================================================================

/// A writer or publisher identity, shared by every [`Share`] citing its number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Shareholder {
    /// Interested party number. Synthetic for unidentified writers.
    pub ip_number: u64,
    /// Last name, or the publisher name.
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub first_name: String,
    /// Administered by the submitter.
    pub controlled: bool,
    /// IPI Name Number, when different from the IP number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipi_name: Option<u64>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ipi_base: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tax_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pr_society: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mr_society: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sr_society: Option<u16>,
    /// USA representation (A, B or S).
    #[serde(skip_serializing_if = "String::is_empty")]
    pub usa_license: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub personal_number: String,
    /// Identity not known to the submitter.
    pub unknown: bool,
    /// The IP number was synthesized rather than supplied.
    pub synthetic: bool,
}

impl Shareholder {
    pub fn new(ip_number: u64, name: impl Into<String>) -> Self {
        Self { ip_number, name: name.into(), ..Self::default() }
    }

    pub fn with_first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self
    }

    pub fn controlled(mut self) -> Self {
        self.controlled = true;
        self
    }

    pub fn with_societies(mut self, pr: Option<u16>, mr: Option<u16>, sr: Option<u16>) -> Self {
        self.pr_society = pr;
        self.mr_society = mr;
        self.sr_society = sr;
        self
    }

    /// The number to put in IPI Name fields.
    pub fn effective_ipi_name(&self) -> u64 {
        self.ipi_name.unwrap_or(self.ip_number)
    }

    pub fn display_name(&self) -> String {
        if self.first_name.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.first_name, self.name)
        }
    }
}

// =============================================================================
// Territory Entry
// =============================================================================

/// Whether a territory entry adds or removes countries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Inclusion {
    #[default]
    #[serde(rename = "I")]
    Include,
    #[serde(rename = "E")]
    Exclude,
}

impl Inclusion {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "I" => Some(Self::Include),
            "E" => Some(Self::Exclude),
            _ => None,
        }
    }

    pub fn to_code(&self) -> &'static str {
        match self {
            Self::Include => "I",
            Self::Exclude => "E",
        }
    }
}

/// Collection percentages for the three rights types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionShares {
    pub pr: Percentage,
    pub mr: Percentage,
    pub sr: Percentage,
}

impl CollectionShares {
    pub fn new(pr: f64, mr: f64, sr: f64) -> Self {
        Self {
            pr: Percentage::from_percent(pr),
            mr: Percentage::from_percent(mr),
            sr: Percentage::from_percent(sr),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.pr.is_zero() && self.mr.is_zero() && self.sr.is_zero()
    }

    pub fn accumulate(&mut self, other: &CollectionShares) {
        self.pr += other.pr;
        self.mr += other.mr;
        self.sr += other.sr;
    }
}

/// One collection territory of a share, keyed by TIS numeric code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TerritoryEntry {
    pub tis: u16,
    pub indicator: Inclusion,
    #[serde(flatten)]
    pub collection: CollectionShares,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shares_change: Option<bool>,
}

impl TerritoryEntry {
    pub fn include(tis: u16, collection: CollectionShares) -> Self {
        Self { tis, indicator: Inclusion::Include, collection, shares_change: None }
    }

    pub fn exclude(tis: u16) -> Self {
        Self { tis, indicator: Inclusion::Exclude, ..Self::default() }
    }
}

// =============================================================================
// Share
// =============================================================================

/// One ownership stake of one shareholder in one work.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Share {
    pub ip_number: u64,
    /// `None` when the source carried an unknown role code.
    pub role: Option<Role>,
    pub pr_ownership: Percentage,
    pub mr_ownership: Percentage,
    pub sr_ownership: Percentage,
    /// Chain-of-title link, which is the publisher sequence number.
    pub chain: u8,
    /// An extra chain this publisher also administers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub co_publisher: Option<u8>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub special_agreement: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub reversionary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_for_hire: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_recording_refusal: Option<bool>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub submitter_agreement: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub society_agreement: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub agreement_type: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub territories: Vec<TerritoryEntry>,
}

impl Share {
    pub fn new(ip_number: u64, role: Role) -> Self {
        Self { ip_number, role: Some(role), ..Self::default() }
    }

    pub fn with_ownership(mut self, pr: f64, mr: f64, sr: f64) -> Self {
        self.pr_ownership = Percentage::from_percent(pr);
        self.mr_ownership = Percentage::from_percent(mr);
        self.sr_ownership = Percentage::from_percent(sr);
        self
    }

    pub fn with_chain(mut self, chain: u8) -> Self {
        self.chain = chain;
        self
    }

    pub fn with_territory(mut self, entry: TerritoryEntry) -> Self {
        self.upsert_territory(entry);
        self
    }

    /// Insert an entry, replacing one with the same TIS code in place.
    pub fn upsert_territory(&mut self, entry: TerritoryEntry) {
        match self.territories.iter_mut().find(|t| t.tis == entry.tis) {
            Some(existing) => *existing = entry,
            None => self.territories.push(entry),
        }
    }

    pub fn has_ownership(&self) -> bool {
        !(self.pr_ownership + self.mr_ownership).is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_territory_replaces_in_place() {
        let mut share = Share::new(1, Role::Composer)
            .with_territory(TerritoryEntry::include(2136, CollectionShares::new(50.0, 50.0, 0.0)))
            .with_territory(TerritoryEntry::exclude(250));
        share.upsert_territory(TerritoryEntry::include(2136, CollectionShares::new(100.0, 0.0, 0.0)));

        assert_eq!(share.territories.len(), 2);
        assert_eq!(share.territories[0].tis, 2136);
        assert_eq!(share.territories[0].collection.pr, Percentage::FULL);
    }

    #[test]
    fn test_shareholder_display_name() {
        let writer = Shareholder::new(1, "Doe").with_first_name("Jane");
        assert_eq!(writer.display_name(), "Jane Doe");
        assert_eq!(writer.effective_ipi_name(), 1);
    }

    #[test]
    fn test_territory_entry_json() {
        let entry = TerritoryEntry::include(2136, CollectionShares::new(50.0, 100.0, 0.0));
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["indicator"], "I");
        assert_eq!(json["pr"], 50.0);
        let back: TerritoryEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }
}
