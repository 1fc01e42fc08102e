//! Interested party records: SPU/OPU, SPT/OPT, SWR/OWR, SWT/OWT and PWR.
//!
//! Controlled (S..) and other (O..) variants share one layout and differ
//! only by tag, so each struct carries a `controlled` flag.

use serde::{Deserialize, Serialize};

use super::{CwrVersion, FixedWidth, LineReader, LineWriter};
use crate::models::{Inclusion, Percentage};

// =============================================================================
// SPU / OPU
// =============================================================================

/// Publisher controlled by the submitter (SPU) or other publisher (OPU).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PublisherRecord {
    pub controlled: bool,
    /// Publisher sequence number, the chain of title link.
    pub sequence: u8,
    pub ip_number: Option<u64>,
    pub name: String,
    pub unknown: Option<bool>,
    pub publisher_type: String,
    pub tax_id: String,
    pub ipi_name: Option<u64>,
    pub submitter_agreement: String,
    pub pr_society: Option<u16>,
    pub pr_share: Percentage,
    pub mr_society: Option<u16>,
    pub mr_share: Percentage,
    pub sr_society: Option<u16>,
    pub sr_share: Percentage,
    pub special_agreements: String,
    pub first_recording_refusal: Option<bool>,
    pub ipi_base: String,
    pub isac: String,
    pub society_agreement: String,
    pub agreement_type: String,
    pub usa_license: String,
}

impl FixedWidth for PublisherRecord {
    fn write(&self, w: &mut LineWriter, version: CwrVersion) {
        w.number("Publisher Sequence #", u64::from(self.sequence), 2);
        if self.controlled {
            w.number("Interested Party #", self.ip_number.unwrap_or(0), 9)
                .required("Publisher Name", &self.name, 45);
        } else {
            w.optional_number("Interested Party #", self.ip_number, 9).text(&self.name, 45);
        }
        w.flag(self.unknown)
            .text(&self.publisher_type, 2)
            .text(&self.tax_id, 9)
            .ipi_name("Publisher IPI Name #", self.ipi_name)
            .text(&self.submitter_agreement, 14)
            .society("PR Society", self.pr_society)
            .percentage("PR Ownership Share", self.pr_share)
            .society("MR Society", self.mr_society)
            .percentage("MR Ownership Share", self.mr_share)
            .society("SR Society", self.sr_society)
            .percentage("SR Ownership Share", self.sr_share)
            .text(&self.special_agreements, 1)
            .flag(self.first_recording_refusal)
            .blank(1)
            .text(&self.ipi_base, 13)
            .text(&self.isac, 14)
            .text(&self.society_agreement, 14)
            .text(&self.agreement_type, 2);
        if version >= CwrVersion::V21 {
            w.text(&self.usa_license, 1);
        }
    }

    fn read(r: &mut LineReader) -> Self {
        let sequence = r.number("Publisher Sequence #", 2) as u8;
        let ip_number = r.optional_number("Interested Party #", 9);
        let name = r.text(45);
        let unknown = r.flag();
        let publisher_type = r.text(2);
        let tax_id = r.text(9);
        let ipi_name = r.ipi_name("Publisher IPI Name #");
        let submitter_agreement = r.text(14);
        let pr_society = r.society("PR Society");
        let pr_share = r.percentage("PR Ownership Share");
        let mr_society = r.society("MR Society");
        let mr_share = r.percentage("MR Ownership Share");
        let sr_society = r.society("SR Society");
        let sr_share = r.percentage("SR Ownership Share");
        let special_agreements = r.text(1);
        let first_recording_refusal = r.flag();
        r.skip(1);
        Self {
            controlled: false,
            sequence,
            ip_number,
            name,
            unknown,
            publisher_type,
            tax_id,
            ipi_name,
            submitter_agreement,
            pr_society,
            pr_share,
            mr_society,
            mr_share,
            sr_society,
            sr_share,
            special_agreements,
            first_recording_refusal,
            ipi_base: r.text(13),
            isac: r.text(14),
            society_agreement: r.text(14),
            agreement_type: r.text(2),
            usa_license: r.text(1),
        }
    }
}

// =============================================================================
// SPT / OPT / SWT / OWT
// =============================================================================

/// Collection territory of a publisher (SPT/OPT) or writer (SWT/OWT).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TerritoryRecord {
    pub controlled: bool,
    pub ip_number: Option<u64>,
    pub pr: Percentage,
    pub mr: Percentage,
    pub sr: Percentage,
    pub indicator: Inclusion,
    pub tis: u16,
    pub shares_change: Option<bool>,
    /// Position among the territory records of the same party, from 1.
    pub sequence: u16,
}

impl TerritoryRecord {
    /// Publisher territories carry a six-space constant after the IP number.
    pub(crate) fn write_with(&self, w: &mut LineWriter, version: CwrVersion, publisher: bool) {
        w.optional_number("Interested Party #", self.ip_number, 9);
        if publisher {
            w.blank(6);
        }
        w.percentage("PR Collection Share", self.pr)
            .percentage("MR Collection Share", self.mr)
            .percentage("SR Collection Share", self.sr)
            .text(self.indicator.to_code(), 1)
            .number("TIS Numeric Code", u64::from(self.tis), 4);
        if version >= CwrVersion::V21 {
            w.flag(self.shares_change).number("Sequence #", u64::from(self.sequence), 3);
        }
    }

    pub(crate) fn read_with(r: &mut LineReader, controlled: bool, publisher: bool) -> Self {
        let ip_number = r.optional_number("Interested Party #", 9);
        if publisher {
            r.skip(6);
        }
        Self {
            controlled,
            ip_number,
            pr: r.percentage("PR Collection Share"),
            mr: r.percentage("MR Collection Share"),
            sr: r.percentage("SR Collection Share"),
            indicator: Inclusion::from_code(&r.text(1)).unwrap_or_default(),
            tis: r.number("TIS Numeric Code", 4) as u16,
            shares_change: r.flag(),
            sequence: r.number("Sequence #", 3) as u16,
        }
    }
}

// =============================================================================
// SWR / OWR
// =============================================================================

/// Writer controlled by the submitter (SWR) or other writer (OWR).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WriterRecord {
    pub controlled: bool,
    pub ip_number: Option<u64>,
    pub last_name: String,
    pub first_name: String,
    pub unknown: Option<bool>,
    pub designation: String,
    pub tax_id: String,
    pub ipi_name: Option<u64>,
    pub pr_society: Option<u16>,
    pub pr_share: Percentage,
    pub mr_society: Option<u16>,
    pub mr_share: Percentage,
    pub sr_society: Option<u16>,
    pub sr_share: Percentage,
    pub reversionary: String,
    pub first_recording_refusal: Option<bool>,
    pub work_for_hire: Option<bool>,
    pub ipi_base: String,
    pub personal_number: Option<u64>,
    pub usa_license: String,
}

impl FixedWidth for WriterRecord {
    fn write(&self, w: &mut LineWriter, version: CwrVersion) {
        if self.controlled {
            w.number("Interested Party #", self.ip_number.unwrap_or(0), 9)
                .required("Writer Last Name", &self.last_name, 45)
                .text(&self.first_name, 30)
                // Must be blank on SWR.
                .blank(1)
                .required("Writer Designation Code", &self.designation, 2);
        } else {
            w.optional_number("Interested Party #", self.ip_number, 9)
                .text(&self.last_name, 45)
                .text(&self.first_name, 30)
                .flag(self.unknown)
                .text(&self.designation, 2);
        }
        w.text(&self.tax_id, 9)
            .ipi_name("Writer IPI Name #", self.ipi_name)
            .society("PR Society", self.pr_society)
            .percentage("PR Ownership Share", self.pr_share)
            .society("MR Society", self.mr_society)
            .percentage("MR Ownership Share", self.mr_share)
            .society("SR Society", self.sr_society)
            .percentage("SR Ownership Share", self.sr_share)
            .text(&self.reversionary, 1)
            .flag(self.first_recording_refusal)
            .flag(self.work_for_hire)
            .blank(1)
            .text(&self.ipi_base, 13)
            .optional_number("Personal Number", self.personal_number, 12);
        if version >= CwrVersion::V21 {
            w.text(&self.usa_license, 1);
        }
    }

    fn read(r: &mut LineReader) -> Self {
        let ip_number = r.optional_number("Interested Party #", 9);
        let last_name = r.text(45);
        let first_name = r.text(30);
        let unknown = r.flag();
        let designation = r.text(2);
        let tax_id = r.text(9);
        let ipi_name = r.ipi_name("Writer IPI Name #");
        let pr_society = r.society("PR Society");
        let pr_share = r.percentage("PR Ownership Share");
        let mr_society = r.society("MR Society");
        let mr_share = r.percentage("MR Ownership Share");
        let sr_society = r.society("SR Society");
        let sr_share = r.percentage("SR Ownership Share");
        let reversionary = r.text(1);
        let first_recording_refusal = r.flag();
        let work_for_hire = r.flag();
        r.skip(1);
        Self {
            controlled: false,
            ip_number,
            last_name,
            first_name,
            unknown,
            designation,
            tax_id,
            ipi_name,
            pr_society,
            pr_share,
            mr_society,
            mr_share,
            sr_society,
            sr_share,
            reversionary,
            first_recording_refusal,
            work_for_hire,
            ipi_base: r.text(13),
            personal_number: r.optional_number("Personal Number", 12),
            usa_license: r.text(1),
        }
    }
}

// =============================================================================
// PWR
// =============================================================================

/// Publisher for writer: links a controlled writer to its original publisher.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PublisherForWriter {
    pub publisher_ip: Option<u64>,
    pub publisher_name: String,
    pub submitter_agreement: String,
    pub society_agreement: String,
    pub writer_ip: Option<u64>,
    /// Chain of title link, written from 2.2 on.
    pub publisher_sequence: Option<u8>,
}

impl FixedWidth for PublisherForWriter {
    fn write(&self, w: &mut LineWriter, version: CwrVersion) {
        w.number("Publisher IP #", self.publisher_ip.unwrap_or(0), 9)
            .required("Publisher Name", &self.publisher_name, 45)
            .text(&self.submitter_agreement, 14)
            .text(&self.society_agreement, 14);
        if version >= CwrVersion::V21 {
            w.optional_number("Writer IP #", self.writer_ip, 9);
        }
        if version >= CwrVersion::V22 {
            w.optional_number("Publisher Sequence #", self.publisher_sequence.map(u64::from), 2);
        }
    }

    fn read(r: &mut LineReader) -> Self {
        Self {
            publisher_ip: r.optional_number("Publisher IP #", 9),
            publisher_name: r.text(45),
            submitter_agreement: r.text(14),
            society_agreement: r.text(14),
            writer_ip: r.optional_number("Writer IP #", 9),
            publisher_sequence: r.optional_number("Publisher Sequence #", 2).map(|v| v as u8),
        }
    }
}
