use std::collections::HashSet;

use super::ValidationReport;
use crate::catalog::Catalog;
use crate::config::RegistrationConfig;
use crate::identifiers::{is_valid_ipi_base, is_valid_iswc, normalize_isrc, normalize_iswc};
use crate::models::{TitleKind, TransactionKind, Work};
use crate::vocabulary::{
    Lookup, FILM_WORK_TYPE, INTENDED_PURPOSES, LANGUAGE_TITLE_TYPES, TEXT_MUSIC_RELATIONSHIPS, TITLE_TYPES,
};

const LIBRARY_PURPOSE: &str = "LIB";

/// Normalise a work and check its work-level records.
///
/// Fills in the recorded indicator (`U`), version type (`ORI`),
/// distribution category (`POP`) and grand rights (`N`) when missing,
/// blanks ISWCs and IPI Base Numbers that fail their check digit,
/// drops duplicate performer references, blanks an unknown
/// text-music relationship, links ISRCs of tracks registered against
/// this work, keeps the latest cross-reference per organisation and
/// turns the transaction into a revision when one of them belongs to
/// the receiving society.
pub fn validate_work(work: &mut Work, catalog: &Catalog, config: &RegistrationConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    let header = &mut work.header;

    if header.recorded.trim().is_empty() {
        header.recorded = "U".to_string();
    }
    if header.version_type.trim().is_empty() {
        header.version_type = "ORI".to_string();
    }
    if header.distribution_category.trim().is_empty() {
        header.distribution_category = "POP".to_string();
    }
    if header.grand_rights.is_none() {
        header.grand_rights = Some(false);
    }
    check_iswc(&mut header.iswc, "Work", &mut report);

    for kind in [TitleKind::Component, TitleKind::EntireWork, TitleKind::OriginalWork] {
        if let Some(record) = work.title_record_mut(kind) {
            check_iswc(&mut record.iswc, kind.to_code(), &mut report);
            for writer in [&mut record.writer_1, &mut record.writer_2] {
                check_ipi_base(&mut writer.ipi_base, kind.to_code(), &mut report);
            }
        }
    }

    let mut seen = HashSet::new();
    work.performers.retain(|index| seen.insert(*index));

    for alt in &work.alternate_titles {
        let needs_language = LANGUAGE_TITLE_TYPES.contains(&alt.title_type.trim());
        if !TITLE_TYPES.contains(&alt.title_type) || (needs_language && alt.language.trim().is_empty()) {
            return report.reject("ALT: A language Code Must be entered if the Title Type is equal to 'OL' or 'AL'.");
        }
    }

    if TEXT_MUSIC_RELATIONSHIPS.lookup(&work.header.text_music_relationship) == Lookup::Unknown {
        report.warn(
            "Text Music Relationship entered was not found in the Text Music Relationship table - replaced with spaces",
        );
        work.header.text_music_relationship.clear();
    }

    for track in catalog.tracks() {
        if track.work_id.is_empty() || track.work_id != work.id() {
            continue;
        }
        let isrc = normalize_isrc(&track.isrc);
        if !work.isrcs.contains(&isrc) {
            work.isrcs.push(isrc);
        }
    }
    work.isrcs.retain(|isrc| !isrc.trim().is_empty());

    for origin in &work.origins {
        let purpose = origin.intended_purpose.trim();
        if purpose == LIBRARY_PURPOSE && origin.cd_identifier.trim().is_empty() {
            return report.reject("Intended Purpose equal to 'LIB' (Library Work) entered and CD Identifier missing.");
        }
        if !INTENDED_PURPOSES.contains(purpose) {
            return report.reject("Intended Purpose was not entered or was not found in the Intended Purpose Table.");
        }
    }

    if work.header.work_type.trim() == FILM_WORK_TYPE
        && !work.origins.iter().any(|o| !o.production_title.trim().is_empty())
    {
        return report.reject("CWR Work Type was set to 'FM' but there was no ORN record with a Production Title.");
    }

    // Latest entry per organisation wins.
    let mut organisations = HashSet::new();
    let mut references: Vec<_> = work
        .cross_references
        .drain(..)
        .rev()
        .filter(|xref| organisations.insert(xref.organisation))
        .collect();
    references.reverse();
    work.cross_references = references;

    if work.transaction.is_empty() {
        work.transaction = TransactionKind::NWR;
    }
    let revision_codes = config.revision_codes();
    let known_to_receiver = work.cross_references.iter().any(|xref| {
        Some(xref.organisation) == config.receiver_society || revision_codes.contains(&xref.organisation)
    });
    if known_to_receiver {
        work.transaction = TransactionKind::REV;
    }
    if work.acknowledgement.is_some() {
        work.transaction.insert(TransactionKind::ACK);
    }

    report
}

/// Normalise an ISWC in place, or blank it when the check digit fails.
fn check_iswc(iswc: &mut String, record: &str, report: &mut ValidationReport) {
    if iswc.trim().is_empty() {
        iswc.clear();
        return;
    }
    if is_valid_iswc(iswc) {
        *iswc = normalize_iswc(iswc);
    } else {
        report.warn(format!("{}: Invalid ISWC '{}' - replaced with spaces", record, iswc.trim()));
        iswc.clear();
    }
}

fn check_ipi_base(base: &mut String, record: &str, report: &mut ValidationReport) {
    if is_valid_ipi_base(base) {
        *base = base.trim().to_string();
    } else {
        report.warn(format!("{}: Invalid IPI Base Number '{}' - replaced with spaces", record, base.trim()));
        base.clear();
    }
}
