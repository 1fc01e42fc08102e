//! Work header and work-level detail records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{CwrVersion, FixedWidth, LineReader, LineWriter};
use crate::models::{
    AdditionalInfo, AlternateTitle, CrossReference, Hms, InstrumentDetail, Instrumentation,
    Performer, TitleKind, TitleRecord, TitleWriter, WorkHeader, WorkOrigin,
};

// =============================================================================
// NWR / REV / ISW / EXC
// =============================================================================

impl FixedWidth for WorkHeader {
    fn write(&self, w: &mut LineWriter, version: CwrVersion) {
        w.required("Work Title", &self.title, 60)
            .text(&self.language, 2)
            .required("Submitter Work #", &self.submitter_work_id, 14)
            .text(&self.iswc, 11)
            .date(self.copyright_date)
            .text(&self.copyright_number, 12)
            .required("Musical Work Distribution Category", &self.distribution_category, 3)
            .hms(self.duration)
            .required("Recorded Indicator", &self.recorded, 1)
            .text(&self.text_music_relationship, 3)
            .text(&self.composite_type, 3)
            .required("Version Type", &self.version_type, 3)
            .text(&self.excerpt_type, 3)
            .text(&self.music_arrangement, 3)
            .text(&self.lyric_adaptation, 3)
            .text(&self.contact_name, 30)
            .text(&self.contact_id, 10)
            .text(&self.work_type, 2)
            .flag(self.grand_rights)
            .optional_number("Composite Component Count", self.composite_component_count.map(u64::from), 3)
            .date(self.printed_edition_date)
            .flag(self.exceptional_clause)
            .text(&self.opus_number, 25)
            .text(&self.catalogue_number, 25);
        if version >= CwrVersion::V21 {
            w.flag(self.priority);
        }
    }

    fn read(r: &mut LineReader) -> Self {
        Self {
            title: r.text(60),
            language: r.text(2),
            submitter_work_id: r.text(14),
            iswc: r.text(11),
            copyright_date: r.date("Copyright Date"),
            copyright_number: r.text(12),
            distribution_category: r.text(3),
            duration: r.hms("Duration"),
            recorded: r.text(1),
            text_music_relationship: r.text(3),
            composite_type: r.text(3),
            version_type: r.text(3),
            excerpt_type: r.text(3),
            music_arrangement: r.text(3),
            lyric_adaptation: r.text(3),
            contact_name: r.text(30),
            contact_id: r.text(10),
            work_type: r.text(2),
            grand_rights: r.flag(),
            composite_component_count: r.optional_number("Composite Component Count", 3).map(|v| v as u16),
            printed_edition_date: r.date("Date of Publication of Printed Edition"),
            exceptional_clause: r.flag(),
            opus_number: r.text(25),
            catalogue_number: r.text(25),
            priority: r.flag(),
        }
    }
}

// =============================================================================
// ALT / PER
// =============================================================================

impl FixedWidth for AlternateTitle {
    fn write(&self, w: &mut LineWriter, _version: CwrVersion) {
        w.required("Alternate Title", &self.title, 60)
            .required("Title Type", &self.title_type, 2)
            .text(&self.language, 2);
    }

    fn read(r: &mut LineReader) -> Self {
        Self { title: r.text(60), title_type: r.text(2), language: r.text(2) }
    }
}

impl FixedWidth for Performer {
    fn write(&self, w: &mut LineWriter, _version: CwrVersion) {
        w.required("Performing Artist Last Name", &self.last_name, 45)
            .text(&self.first_name, 30)
            .ipi_name("Performing Artist IPI Name #", self.ipi_name)
            .text(&self.ipi_base, 13);
    }

    fn read(r: &mut LineReader) -> Self {
        Self {
            last_name: r.text(45),
            first_name: r.text(30),
            ipi_name: r.ipi_name("Performing Artist IPI Name #"),
            ipi_base: r.text(13),
        }
    }
}

// =============================================================================
// REC
// =============================================================================

/// Recording detail (REC). The last six fields exist from 2.2 on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordingDetail {
    pub first_release_date: Option<NaiveDate>,
    pub duration: Option<Hms>,
    pub album_title: String,
    pub album_label: String,
    pub catalog_number: String,
    pub ean: String,
    pub isrc: String,
    /// A (audio) or V (video).
    pub recording_format: String,
    /// A (analogue), D (digital) or U (unknown).
    pub recording_technique: String,
    pub media_type: String,
    pub recording_title: String,
    pub version_title: String,
    pub display_artist: String,
    pub record_label: String,
    pub isrc_validity: String,
    pub submitter_recording_id: String,
}

impl FixedWidth for RecordingDetail {
    fn write(&self, w: &mut LineWriter, version: CwrVersion) {
        w.date(self.first_release_date)
            .blank(60)
            .hms(self.duration)
            .blank(5)
            .text(&self.album_title, 60)
            .text(&self.album_label, 60)
            .text(&self.catalog_number, 18)
            .text(&self.ean, 13)
            .text(&self.isrc, 12)
            .text(&self.recording_format, 1)
            .text(&self.recording_technique, 1)
            .text(&self.media_type, 3);
        if version >= CwrVersion::V22 {
            w.text(&self.recording_title, 60)
                .text(&self.version_title, 60)
                .text(&self.display_artist, 60)
                .text(&self.record_label, 60)
                .text(&self.isrc_validity, 20)
                .text(&self.submitter_recording_id, 14);
        }
    }

    fn read(r: &mut LineReader) -> Self {
        let first_release_date = r.date("First Release Date");
        r.skip(60);
        let duration = r.hms("First Release Duration");
        r.skip(5);
        Self {
            first_release_date,
            duration,
            album_title: r.text(60),
            album_label: r.text(60),
            catalog_number: r.text(18),
            ean: r.text(13),
            isrc: r.text(12),
            recording_format: r.text(1),
            recording_technique: r.text(1),
            media_type: r.text(3),
            recording_title: r.text(60),
            version_title: r.text(60),
            display_artist: r.text(60),
            record_label: r.text(60),
            isrc_validity: r.text(20),
            submitter_recording_id: r.text(14),
        }
    }
}

// =============================================================================
// ORN
// =============================================================================

impl FixedWidth for WorkOrigin {
    fn write(&self, w: &mut LineWriter, version: CwrVersion) {
        w.required("Intended Purpose", &self.intended_purpose, 3)
            .text(&self.production_title, 60)
            .text(&self.cd_identifier, 15)
            .optional_number("Cut Number", self.cut_number.map(u64::from), 4);
        if version >= CwrVersion::V21 {
            w.text(&self.library, 60)
                .text(&self.bltvr, 1)
                .blank(25)
                .text(&self.production_number, 12)
                .text(&self.episode_title, 60)
                .text(&self.episode_number, 20)
                .optional_number("Year of Production", self.year_of_production.map(u64::from), 4)
                .society("AVI Society Code", self.avi_society)
                .text(&self.audio_visual_number, 15);
        }
        if version >= CwrVersion::V22 {
            w.text(&self.isan, 12)
                .text(&self.isan_episode, 4)
                .text(&self.isan_check_1, 1)
                .text(&self.isan_version, 8)
                .text(&self.isan_check_2, 1)
                .text(&self.eidr, 20)
                .text(&self.eidr_check, 1);
        }
    }

    fn read(r: &mut LineReader) -> Self {
        let intended_purpose = r.text(3);
        let production_title = r.text(60);
        let cd_identifier = r.text(15);
        let cut_number = r.optional_number("Cut Number", 4).map(|v| v as u16);
        let library = r.text(60);
        let bltvr = r.text(1);
        r.skip(25);
        Self {
            intended_purpose,
            production_title,
            cd_identifier,
            cut_number,
            library,
            bltvr,
            production_number: r.text(12),
            episode_title: r.text(60),
            episode_number: r.text(20),
            year_of_production: r.optional_number("Year of Production", 4).map(|v| v as u16),
            avi_society: r.society("AVI Society Code"),
            audio_visual_number: r.text(15),
            isan: r.text(12),
            isan_episode: r.text(4),
            isan_check_1: r.text(1),
            isan_version: r.text(8),
            isan_check_2: r.text(1),
            eidr: r.text(20),
            eidr_check: r.text(1),
        }
    }
}

// =============================================================================
// COM / EWT / VER
// =============================================================================

impl TitleRecord {
    /// COM orders its fields differently from EWT and VER and carries a duration.
    pub(crate) fn write_with(&self, w: &mut LineWriter, kind: TitleKind) {
        let (one, two) = (&self.writer_1, &self.writer_2);
        match kind {
            TitleKind::Component => {
                w.required("Title", &self.title, 60)
                    .text(&self.iswc, 11)
                    .text(&self.submitter_work_id, 14)
                    .hms(self.duration)
                    .required("Writer 1 Last Name", &one.last_name, 45)
                    .text(&one.first_name, 30)
                    .ipi_name("Writer 1 IPI Name #", one.ipi_name)
                    .text(&two.last_name, 45)
                    .text(&two.first_name, 30)
                    .ipi_name("Writer 2 IPI Name #", two.ipi_name)
                    .text(&one.ipi_base, 13)
                    .text(&two.ipi_base, 13);
            }
            TitleKind::EntireWork | TitleKind::OriginalWork => {
                w.required("Title", &self.title, 60)
                    .text(&self.iswc, 11)
                    .text(&self.language, 2)
                    .text(&one.last_name, 45)
                    .text(&one.first_name, 30)
                    .text(&self.source, 60)
                    .ipi_name("Writer 1 IPI Name #", one.ipi_name)
                    .text(&one.ipi_base, 13)
                    .text(&two.last_name, 45)
                    .text(&two.first_name, 30)
                    .ipi_name("Writer 2 IPI Name #", two.ipi_name)
                    .text(&two.ipi_base, 13)
                    .text(&self.submitter_work_id, 14);
            }
        }
    }

    pub(crate) fn read_with(r: &mut LineReader, kind: TitleKind) -> Self {
        match kind {
            TitleKind::Component => {
                let title = r.text(60);
                let iswc = r.text(11);
                let submitter_work_id = r.text(14);
                let duration = r.hms("Duration");
                let mut writer_1 = TitleWriter {
                    last_name: r.text(45),
                    first_name: r.text(30),
                    ipi_name: r.ipi_name("Writer 1 IPI Name #"),
                    ..TitleWriter::default()
                };
                let mut writer_2 = TitleWriter {
                    last_name: r.text(45),
                    first_name: r.text(30),
                    ipi_name: r.ipi_name("Writer 2 IPI Name #"),
                    ..TitleWriter::default()
                };
                writer_1.ipi_base = r.text(13);
                writer_2.ipi_base = r.text(13);
                Self { title, iswc, submitter_work_id, duration, writer_1, writer_2, ..Self::default() }
            }
            TitleKind::EntireWork | TitleKind::OriginalWork => {
                let title = r.text(60);
                let iswc = r.text(11);
                let language = r.text(2);
                let last_name = r.text(45);
                let first_name = r.text(30);
                let source = r.text(60);
                let writer_1 = TitleWriter {
                    last_name,
                    first_name,
                    ipi_name: r.ipi_name("Writer 1 IPI Name #"),
                    ipi_base: r.text(13),
                };
                let writer_2 = TitleWriter {
                    last_name: r.text(45),
                    first_name: r.text(30),
                    ipi_name: r.ipi_name("Writer 2 IPI Name #"),
                    ipi_base: r.text(13),
                };
                Self {
                    title,
                    iswc,
                    language,
                    writer_1,
                    writer_2,
                    source,
                    submitter_work_id: r.text(14),
                    duration: None,
                }
            }
        }
    }
}

// =============================================================================
// INS / IND / ARI / XRF
// =============================================================================

impl FixedWidth for Instrumentation {
    fn write(&self, w: &mut LineWriter, _version: CwrVersion) {
        w.optional_number("Number of Voices", self.voices.map(u64::from), 3)
            .text(&self.standard_instrumentation, 3)
            .text(&self.description, 50);
    }

    fn read(r: &mut LineReader) -> Self {
        Self {
            voices: r.optional_number("Number of Voices", 3).map(|v| v as u16),
            standard_instrumentation: r.text(3),
            description: r.text(50),
        }
    }
}

impl FixedWidth for InstrumentDetail {
    fn write(&self, w: &mut LineWriter, _version: CwrVersion) {
        w.required("Instrument Code", &self.instrument, 3)
            .optional_number("Number of Players", self.players.map(u64::from), 3);
    }

    fn read(r: &mut LineReader) -> Self {
        Self {
            instrument: r.text(3),
            players: r.optional_number("Number of Players", 3).map(|v| v as u16),
        }
    }
}

impl FixedWidth for AdditionalInfo {
    fn write(&self, w: &mut LineWriter, _version: CwrVersion) {
        w.number("Society #", self.society.map(u64::from).unwrap_or(0), 3)
            .text(&self.work_number, 14)
            .required("Type of Right", &self.type_of_right, 3)
            .text(&self.subject, 2)
            .text(&self.note, 160);
    }

    fn read(r: &mut LineReader) -> Self {
        Self {
            society: r.society("Society #"),
            work_number: r.text(14),
            type_of_right: r.text(3),
            subject: r.text(2),
            note: r.text(160),
        }
    }
}

impl FixedWidth for CrossReference {
    fn write(&self, w: &mut LineWriter, _version: CwrVersion) {
        w.number("Organisation Code", u64::from(self.organisation), 3)
            .required("Identifier", &self.identifier, 14)
            .required("Identifier Type", &self.identifier_type, 1)
            .required("Validity", &self.validity, 1);
    }

    fn read(r: &mut LineReader) -> Self {
        Self {
            organisation: r.number("Organisation Code", 3) as u16,
            identifier: r.text(14),
            identifier_type: r.text(1),
            validity: r.text(1),
        }
    }
}
