//! Domain models for CWR work registration.
//!
//! - [`Work`] - One composition submission with its sub-records and shares
//! - [`Shareholder`] - Interested party (writer or publisher) keyed by IP number
//! - [`Share`] - One party's stake in one work, with territory entries
//! - [`Role`] - CISAC role codes (Composer, Original Publisher, etc.)
//! - [`TransactionKind`] - OR-combinable NWR/REV/ISW/EXC/ACK bits
//! - [`Track`], [`Release`], [`Performer`] - Recording metadata
//! - [`Percentage`], [`Hms`] - Fixed-point CWR scalars

mod party;
mod recording;
mod values;
mod work;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

pub use party::{CollectionShares, Inclusion, Share, Shareholder, TerritoryEntry};
pub use recording::{Performer, Release, Track};
pub use values::{Hms, Percentage};
pub use work::{
    Acknowledgement, AdditionalInfo, AlternateTitle, CrossReference, InstrumentDetail,
    Instrumentation, MessageRecord, TitleKind, TitleRecord, TitleWriter, Work, WorkHeader,
    WorkOrigin,
};

// =============================================================================
// Role
// =============================================================================

/// Role of an interested party in a work.
///
/// Writer designation codes and publisher type codes share one vocabulary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Role {
    /// Composer (C)
    Composer,
    /// Author (A) - Lyrics writer
    Author,
    /// Composer and Author (CA)
    ComposerAuthor,
    /// Arranger (AR)
    Arranger,
    /// Adapter (AD)
    Adapter,
    /// Translator (TR)
    Translator,
    /// Sub-Author (SA)
    SubAuthor,
    /// Sub-Arranger (SR)
    SubArranger,
    /// Original Publisher (E)
    OriginalPublisher,
    /// Administrator (AM)
    Administrator,
    /// Acquirer (AQ)
    Acquirer,
    /// Substituted Publisher (ES)
    SubstitutedPublisher,
    /// Sub-Publisher (SE)
    SubPublisher,
    /// Income Participant (PA)
    IncomeParticipant,
}

/// Validation class of a [`Role`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleClass {
    Publisher,
    SubPublisher,
    Writer,
    Arranger,
    IncomeParticipant,
}

impl Role {
    /// Parse a CWR writer designation or publisher type code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "C" => Some(Self::Composer),
            "A" => Some(Self::Author),
            "CA" => Some(Self::ComposerAuthor),
            "AR" => Some(Self::Arranger),
            "AD" => Some(Self::Adapter),
            "TR" => Some(Self::Translator),
            "SA" => Some(Self::SubAuthor),
            "SR" => Some(Self::SubArranger),
            "E" => Some(Self::OriginalPublisher),
            "AM" => Some(Self::Administrator),
            "AQ" => Some(Self::Acquirer),
            "ES" => Some(Self::SubstitutedPublisher),
            "SE" => Some(Self::SubPublisher),
            "PA" => Some(Self::IncomeParticipant),
            _ => None,
        }
    }

    /// Convert to CISAC code.
    pub fn to_code(&self) -> &'static str {
        match self {
            Self::Composer => "C",
            Self::Author => "A",
            Self::ComposerAuthor => "CA",
            Self::Arranger => "AR",
            Self::Adapter => "AD",
            Self::Translator => "TR",
            Self::SubAuthor => "SA",
            Self::SubArranger => "SR",
            Self::OriginalPublisher => "E",
            Self::Administrator => "AM",
            Self::Acquirer => "AQ",
            Self::SubstitutedPublisher => "ES",
            Self::SubPublisher => "SE",
            Self::IncomeParticipant => "PA",
        }
    }

    pub fn class(&self) -> RoleClass {
        match self {
            Self::OriginalPublisher | Self::Administrator | Self::Acquirer | Self::SubstitutedPublisher => {
                RoleClass::Publisher
            }
            Self::SubPublisher => RoleClass::SubPublisher,
            Self::Composer | Self::Author | Self::ComposerAuthor => RoleClass::Writer,
            Self::Arranger | Self::Adapter | Self::Translator | Self::SubAuthor | Self::SubArranger => {
                RoleClass::Arranger
            }
            Self::IncomeParticipant => RoleClass::IncomeParticipant,
        }
    }

    /// Ordering key inside one chain of title: publishers first, then writers.
    pub fn priority(&self) -> u8 {
        match self {
            Self::OriginalPublisher => 0,
            Self::Administrator => 1,
            Self::Acquirer => 2,
            Self::SubstitutedPublisher => 3,
            Self::SubPublisher => 4,
            Self::IncomeParticipant => 5,
            Self::Composer | Self::Author | Self::ComposerAuthor => 6,
            Self::Arranger | Self::Adapter | Self::Translator | Self::SubAuthor | Self::SubArranger => 7,
        }
    }

    pub fn is_publisher(&self) -> bool {
        matches!(self.class(), RoleClass::Publisher | RoleClass::SubPublisher)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_code())
    }
}

// =============================================================================
// Transaction Types
// =============================================================================

/// Transaction header record types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TransactionType {
    /// New Works Registration (NWR)
    NewWork,
    /// Revised Registration (REV)
    Revision,
    /// Notification of ISWC assignment (ISW)
    IswcNotification,
    /// Existing Work in Conflict (EXC)
    Conflict,
}

impl TransactionType {
    /// Group emission order.
    pub const ALL: [TransactionType; 4] =
        [Self::NewWork, Self::Revision, Self::IswcNotification, Self::Conflict];

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "NWR" => Some(Self::NewWork),
            "REV" => Some(Self::Revision),
            "ISW" => Some(Self::IswcNotification),
            "EXC" => Some(Self::Conflict),
            _ => None,
        }
    }

    pub fn to_code(&self) -> &'static str {
        match self {
            Self::NewWork => "NWR",
            Self::Revision => "REV",
            Self::IswcNotification => "ISW",
            Self::Conflict => "EXC",
        }
    }

    pub fn bit(&self) -> TransactionKind {
        match self {
            Self::NewWork => TransactionKind::NWR,
            Self::Revision => TransactionKind::REV,
            Self::IswcNotification => TransactionKind::ISW,
            Self::Conflict => TransactionKind::EXC,
        }
    }
}

/// OR-combinable set of transaction bits carried by a [`Work`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionKind(u8);

impl TransactionKind {
    pub const EMPTY: TransactionKind = TransactionKind(0);
    pub const NWR: TransactionKind = TransactionKind(1);
    pub const REV: TransactionKind = TransactionKind(2);
    pub const ISW: TransactionKind = TransactionKind(4);
    pub const EXC: TransactionKind = TransactionKind(8);
    pub const ACK: TransactionKind = TransactionKind(16);

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: TransactionKind) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    pub fn insert(&mut self, other: TransactionKind) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: TransactionKind) {
        self.0 &= !other.0;
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn is_acknowledgement(self) -> bool {
        self.contains(Self::ACK)
    }

    /// The registration type, ignoring the ACK bit. Lowest bit wins.
    pub fn primary(self) -> Option<TransactionType> {
        TransactionType::ALL.into_iter().find(|t| self.contains(t.bit()))
    }

    /// Registration types present, in group emission order.
    pub fn types(self) -> impl Iterator<Item = TransactionType> {
        TransactionType::ALL.into_iter().filter(move |t| self.contains(t.bit()))
    }
}

impl BitOr for TransactionKind {
    type Output = TransactionKind;

    fn bitor(self, rhs: Self) -> Self::Output {
        TransactionKind(self.0 | rhs.0)
    }
}

impl BitOrAssign for TransactionKind {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl From<TransactionType> for TransactionKind {
    fn from(t: TransactionType) -> Self {
        t.bit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_codes_round_trip() {
        for code in ["C", "A", "CA", "AR", "AD", "TR", "SA", "SR", "E", "AM", "AQ", "ES", "SE", "PA"] {
            let role = Role::from_code(code).unwrap();
            assert_eq!(role.to_code(), code);
        }
        assert_eq!(Role::from_code(" ca "), Some(Role::ComposerAuthor));
        assert_eq!(Role::from_code("COMPOSITEUR"), None);
        assert_eq!(Role::from_code("XX"), None);
    }

    #[test]
    fn test_role_classes() {
        assert_eq!(Role::ComposerAuthor.class(), RoleClass::Writer);
        assert_eq!(Role::Translator.class(), RoleClass::Arranger);
        assert_eq!(Role::SubPublisher.class(), RoleClass::SubPublisher);
        assert!(Role::Acquirer.is_publisher());
        assert!(!Role::IncomeParticipant.is_publisher());
        assert!(Role::OriginalPublisher.priority() < Role::Composer.priority());
    }

    #[test]
    fn test_transaction_kind_bits() {
        let mut kind = TransactionKind::REV;
        kind |= TransactionKind::ACK;
        assert_eq!(kind.bits(), 18);
        assert!(kind.is_acknowledgement());
        assert_eq!(kind.primary(), Some(TransactionType::Revision));
        kind.remove(TransactionKind::ACK);
        assert_eq!(kind, TransactionKind::REV);
        assert!(!TransactionKind::EMPTY.contains(TransactionKind::EMPTY));
    }

    #[test]
    fn test_transaction_types_in_group_order() {
        let kind = TransactionKind::EXC | TransactionKind::NWR;
        let types: Vec<_> = kind.types().collect();
        assert_eq!(types, vec![TransactionType::NewWork, TransactionType::Conflict]);
    }
}
