//! Works and the work-level sub-records (ALT, ORN, COM/EWT/VER, INS, IND, ARI, XRF, ACK, MSG).
//!
//! The sub-record types double as record payloads in [`crate::record`]: a
//! decoded ALT line is an [`AlternateTitle`] and is stored in the work as is.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Hms, Share, TransactionKind, TransactionType};

// =============================================================================
// Work Header (NWR/REV/ISW/EXC)
// =============================================================================

/// Fields of a transaction header record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkHeader {
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub language: String,
    /// Submitter work number, the catalog key of the work.
    pub submitter_work_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub iswc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub copyright_number: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub distribution_category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<Hms>,
    /// Y, N or U.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub recorded: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text_music_relationship: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub composite_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub excerpt_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub music_arrangement: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub lyric_adaptation: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub contact_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub contact_id: String,
    /// CWR work type (FM for film and television music, etc).
    #[serde(skip_serializing_if = "String::is_empty")]
    pub work_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grand_rights: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composite_component_count: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub printed_edition_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exceptional_clause: Option<bool>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub opus_number: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub catalogue_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<bool>,
}

// =============================================================================
// Sub-records
// =============================================================================

/// Alternate title (ALT).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlternateTitle {
    pub title: String,
    pub title_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub language: String,
}

/// Work origin (ORN).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkOrigin {
    pub intended_purpose: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub production_title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cd_identifier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cut_number: Option<u16>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub library: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub bltvr: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub production_number: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub episode_title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub episode_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_of_production: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avi_society: Option<u16>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub audio_visual_number: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub isan: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub isan_episode: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub isan_check_1: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub isan_version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub isan_check_2: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub eidr: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub eidr_check: String,
}

/// Which title sub-record a [`TitleRecord`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TitleKind {
    /// Component of a composite (COM)
    Component,
    /// Entire work title for an excerpt (EWT)
    EntireWork,
    /// Original work title for a version (VER)
    OriginalWork,
}

impl TitleKind {
    pub fn to_code(&self) -> &'static str {
        match self {
            Self::Component => "COM",
            Self::EntireWork => "EWT",
            Self::OriginalWork => "VER",
        }
    }
}

/// A writer named on a COM/EWT/VER record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TitleWriter {
    pub last_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipi_name: Option<u64>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ipi_base: String,
}

/// Component, entire-work or original-work title (COM/EWT/VER).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TitleRecord {
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub iswc: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub language: String,
    pub writer_1: TitleWriter,
    pub writer_2: TitleWriter,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub source: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub submitter_work_id: String,
    /// Only carried by COM.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<Hms>,
}

/// Instrumentation summary (INS).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Instrumentation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voices: Option<u16>,
    pub standard_instrumentation: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// Instrumentation detail (IND).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstrumentDetail {
    pub instrument: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub players: Option<u16>,
}

/// Additional related information (ARI).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdditionalInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub society: Option<u16>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub work_number: String,
    pub type_of_right: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub subject: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub note: String,
}

/// External identifier for the work (XRF).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CrossReference {
    /// Society or organisation code.
    pub organisation: u16,
    pub identifier: String,
    /// W (work), R (recording), P (product) or V (video).
    pub identifier_type: String,
    /// Y (valid), U (link invalid) or N (identifier invalid).
    pub validity: String,
}

/// Acknowledgement (ACK).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Acknowledgement {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<Hms>,
    pub original_group_id: u32,
    pub original_transaction_sequence: u32,
    pub original_transaction_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub creation_title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub submitter_creation_number: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub recipient_creation_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_date: Option<NaiveDate>,
    pub transaction_status: String,
}

/// Message (MSG) returned by a society about a transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MessageRecord {
    pub message_type: String,
    pub original_record_sequence: u32,
    pub record_type: String,
    pub message_level: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub validation_number: String,
    pub text: String,
}

// =============================================================================
// Work
// =============================================================================

/// One composition submission.
///
/// Created on first registration or first decoded NWR/REV/ISW/EXC/ACK and
/// merged into on every later reference to the same id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Work {
    #[serde(flatten)]
    pub header: WorkHeader,
    pub transaction: TransactionKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alternate_titles: Vec<AlternateTitle>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub origins: Vec<WorkOrigin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<TitleRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entire_work: Option<TitleRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_work: Option<TitleRecord>,
    /// Indices into the catalog performer registry.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub performers: Vec<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub isrcs: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cross_references: Vec<CrossReference>,
    pub shares: Vec<Share>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub instrumentation: Vec<Instrumentation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub instrument_details: Vec<InstrumentDetail>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub additional_info: Vec<AdditionalInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acknowledgement: Option<Acknowledgement>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<MessageRecord>,
}

impl Work {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            header: WorkHeader {
                submitter_work_id: id.into(),
                title: title.into(),
                ..WorkHeader::default()
            },
            transaction: TransactionKind::NWR,
            ..Self::default()
        }
    }

    pub fn id(&self) -> &str {
        &self.header.submitter_work_id
    }

    pub fn title(&self) -> &str {
        &self.header.title
    }

    pub fn transaction_type(&self) -> Option<TransactionType> {
        self.transaction.primary()
    }

    pub fn title_record(&self, kind: TitleKind) -> Option<&TitleRecord> {
        match kind {
            TitleKind::Component => self.component.as_ref(),
            TitleKind::EntireWork => self.entire_work.as_ref(),
            TitleKind::OriginalWork => self.original_work.as_ref(),
        }
    }

    pub fn title_record_mut(&mut self, kind: TitleKind) -> &mut Option<TitleRecord> {
        match kind {
            TitleKind::Component => &mut self.component,
            TitleKind::EntireWork => &mut self.entire_work,
            TitleKind::OriginalWork => &mut self.original_work,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_work_defaults_to_nwr() {
        let work = Work::new("W1", "Song");
        assert_eq!(work.id(), "W1");
        assert_eq!(work.transaction_type(), Some(TransactionType::NewWork));
    }

    #[test]
    fn test_work_json_is_flat() {
        let work = Work::new("W1", "Song");
        let json = serde_json::to_value(&work).unwrap();
        assert_eq!(json["submitterWorkId"], "W1");
        assert_eq!(json["transaction"], 1);
        assert!(json.get("iswc").is_none());

        let back: Work = serde_json::from_value(json).unwrap();
        assert_eq!(back, work);
    }

    #[test]
    fn test_title_record_slots() {
        let mut work = Work::new("W1", "Song");
        *work.title_record_mut(TitleKind::OriginalWork) = Some(TitleRecord {
            title: "Original".into(),
            ..TitleRecord::default()
        });
        assert!(work.title_record(TitleKind::OriginalWork).is_some());
        assert!(work.title_record(TitleKind::Component).is_none());
    }
}
