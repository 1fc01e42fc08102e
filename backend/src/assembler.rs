//! Transaction assembler: catalog to CWR text.
//!
//! One pass over the catalog produces the whole transmission:
//!
//! ```text
//! HDR
//! GRH NWR ── NWR SPU SPT ... SWR SWT PWR ... ALT PER REC ... ── GRT
//! GRH REV ── REV ...                                        ── GRT
//! TRL
//! ```
//!
//! Every work is validated first. Failing works are left out and logged,
//! the rest are grouped by transaction type in NWR, REV, ISW, EXC order.
//! Inside a transaction, shares are sorted controlled first, then by chain
//! of title, then by role so that each publisher precedes its writers.

use chrono::{Local, NaiveDateTime, Timelike};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::catalog::{Catalog, TEMPORARY_IP_LIMIT};
use crate::config::RegistrationConfig;
use crate::error::{AssemblyError, AssemblyResult};
use crate::identifiers::{is_valid_ean, is_valid_ipi_base, is_valid_ipi_name, is_valid_isrc, upc_to_ean};
use crate::identity::IdentityResolver;
use crate::logs::MessageLog;
use crate::models::{
    Hms, Inclusion, Role, RoleClass, Share, Shareholder, TitleKind, TitleRecord, TransactionKind, TransactionType,
    Work,
};
use crate::record::{
    Codec, CwrVersion, GroupHeader, GroupTrailer, PublisherForWriter, PublisherRecord, Record, RecordingDetail,
    Sequence, TerritoryRecord, TransmissionHeader, TransmissionTrailer, WriterRecord,
};
use crate::territory::TERRITORIES;
use crate::validation::validate_registration;

/// Sender type written in the HDR record.
const SENDER_TYPE_PUBLISHER: &str = "PB";

/// Recording format written in REC records (audio).
const AUDIO_FORMAT: &str = "A";

/// Output of [`assemble`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assembly {
    /// CWR text, CRLF-terminated lines.
    pub content: String,
    /// Ids of the works written, in order, without duplicates.
    pub work_ids: Vec<String>,
    pub log: MessageLog,
}

/// Assemble a CWR transmission dated now.
pub fn assemble(
    catalog: &Catalog,
    config: &RegistrationConfig,
    identity: &dyn IdentityResolver,
) -> AssemblyResult<Assembly> {
    assemble_at(catalog, config, identity, Local::now().naive_local())
}

/// Assemble a CWR transmission with a fixed creation timestamp.
pub fn assemble_at(
    catalog: &Catalog,
    config: &RegistrationConfig,
    identity: &dyn IdentityResolver,
    now: NaiveDateTime,
) -> AssemblyResult<Assembly> {
    if config.submitter_code.trim().is_empty() {
        return Err(AssemblyError::MissingSubmitterCode);
    }
    if config.submitter_ipi == 0 {
        return Err(AssemblyError::MissingSubmitterIpi);
    }
    let submitter = catalog
        .shareholder(config.submitter_ipi)
        .ok_or(AssemblyError::SubmitterNotRegistered(config.submitter_ipi))?;

    let mut out = Emitter::new(config.version);
    if config.receiver_society.is_none() {
        out.log.warning("WARNING: No receiver society specified!");
    }

    let sender_name = if config.submitter_name.trim().is_empty() {
        submitter.name.clone()
    } else {
        config.submitter_name.clone()
    };
    out.emit(&Record::TransmissionHeader(TransmissionHeader {
        sender_type: SENDER_TYPE_PUBLISHER.to_string(),
        sender_id: config.submitter_ipi,
        sender_name: (config.transliterate)(&sender_name),
        creation_date: Some(now.date()),
        creation_time: Hms::new(now.hour(), now.minute(), now.second()),
        transmission_date: Some(now.date()),
        character_set: config.character_set.clone(),
        cwr_revision: (config.version >= CwrVersion::V22).then_some(config.revision),
        software_package: config.software_package.clone(),
        software_version: config.software_version.clone(),
        ..TransmissionHeader::default()
    }));

    // Validate once, keep the normalised copies of the works that pass.
    let mut admitted = Vec::new();
    let mut present = TransactionKind::EMPTY;
    for (_, work) in catalog.works() {
        let (normalised, report) = validate_registration(work, catalog, config, identity);
        out.log.extend(report.diagnostics);
        if report.passed {
            present |= normalised.transaction;
            admitted.push(normalised);
        } else {
            out.log.error(format!("SKIPPING WORK - Title: {}", work.title()));
        }
    }

    let acknowledgement_groups = present.is_acknowledgement();
    let mut work_ids: Vec<String> = Vec::new();

    for transaction_type in present.types() {
        out.start_group();
        let group_header = GroupHeader {
            transaction_type: if acknowledgement_groups { "ACK" } else { transaction_type.to_code() }.to_string(),
            group_id: out.groups,
            ..GroupHeader::default()
        };
        out.emit(&Record::GroupHeader(group_header));

        for work in admitted.iter().filter(|w| w.transaction_type() == Some(transaction_type)) {
            out.start_transaction();
            if acknowledgement_groups && work.transaction.is_acknowledgement() {
                if let Some(ack) = &work.acknowledgement {
                    out.emit(&Record::Acknowledgement(ack.clone()));
                }
            }
            write_transaction(&mut out, catalog, config, work, transaction_type);
            out.end_transaction();
            if !work_ids.iter().any(|id| id == work.id()) {
                work_ids.push(work.id().to_string());
            }
        }

        let group_trailer = GroupTrailer {
            group_id: out.groups,
            transaction_count: out.group_transactions,
            record_count: out.group_records + 1,
            ..GroupTrailer::default()
        };
        out.emit(&Record::GroupTrailer(group_trailer));
    }

    let trailer = TransmissionTrailer {
        group_count: out.groups,
        transaction_count: out.transactions,
        record_count: out.records + 1,
    };
    out.emit(&Record::TransmissionTrailer(trailer));

    if work_ids.is_empty() {
        out.log.warning("No works passed validation; the transmission carries no transactions.");
    } else {
        out.log.success(format!("{} work(s) written", work_ids.len()));
    }

    Ok(Assembly { content: out.content, work_ids, log: out.log })
}

// =============================================================================
// Counters
// =============================================================================

struct Emitter {
    codec: Codec,
    content: String,
    log: MessageLog,
    /// Groups started so far, also the current group id.
    groups: u32,
    transactions: u32,
    records: u32,
    group_transactions: u32,
    group_records: u32,
    /// Record sequence inside the current transaction.
    sequence: u32,
}

impl Emitter {
    fn new(version: CwrVersion) -> Self {
        Self {
            codec: Codec::new(version),
            content: String::new(),
            log: MessageLog::new(),
            groups: 0,
            transactions: 0,
            records: 0,
            group_transactions: 0,
            group_records: 0,
            sequence: 0,
        }
    }

    fn version(&self) -> CwrVersion {
        self.codec.version()
    }

    fn start_group(&mut self) {
        self.groups += 1;
        self.group_transactions = 0;
        self.group_records = 0;
    }

    fn start_transaction(&mut self) {
        self.sequence = 0;
    }

    fn end_transaction(&mut self) {
        self.transactions += 1;
        self.group_transactions += 1;
    }

    fn emit(&mut self, record: &Record) {
        let encoded = self.codec.encode(record, Sequence::new(self.group_transactions, self.sequence));
        self.log.extend(encoded.diagnostics);
        self.content.push_str(&encoded.line);
        self.content.push_str("\r\n");
        self.sequence += 1;
        self.records += 1;
        self.group_records += 1;
    }
}

// =============================================================================
// Transactions
// =============================================================================

fn write_transaction(
    out: &mut Emitter,
    catalog: &Catalog,
    config: &RegistrationConfig,
    work: &Work,
    transaction_type: TransactionType,
) {
    let transliterate = config.transliterate;

    let mut header = work.header.clone();
    header.title = transliterate(&header.title);
    header.contact_name = config.contact_name.clone();
    header.contact_id = config.contact_id.clone();
    out.emit(&Record::Transaction(transaction_type, header));

    write_shares(out, catalog, config, work);

    for alt in &work.alternate_titles {
        let mut alt = alt.clone();
        alt.title = transliterate(&alt.title);
        out.emit(&Record::AlternateTitle(alt));
    }
    for kind in [TitleKind::EntireWork, TitleKind::OriginalWork] {
        if let Some(record) = work.title_record(kind) {
            out.emit(&Record::Title(kind, transliterated_title(record, transliterate)));
        }
    }
    for performer in work.performers.iter().filter_map(|index| catalog.performer(*index)) {
        let mut performer = performer.clone();
        performer.last_name = transliterate(&performer.last_name);
        performer.first_name = transliterate(&performer.first_name);
        performer.ipi_base = written_ipi_base(&mut out.log, &performer.last_name, &performer.ipi_base);
        out.emit(&Record::Performer(performer));
    }
    for recording in recordings(out, catalog, work) {
        out.emit(&Record::Recording(recording));
    }
    for origin in &work.origins {
        out.emit(&Record::WorkOrigin(origin.clone()));
    }
    for instrumentation in &work.instrumentation {
        out.emit(&Record::Instrumentation(instrumentation.clone()));
    }
    for detail in &work.instrument_details {
        out.emit(&Record::InstrumentDetail(detail.clone()));
    }
    if let Some(component) = work.title_record(TitleKind::Component) {
        out.emit(&Record::Title(TitleKind::Component, transliterated_title(component, transliterate)));
    }
    for info in &work.additional_info {
        out.emit(&Record::AdditionalInfo(info.clone()));
    }
    if out.version() >= CwrVersion::V22 {
        for reference in &work.cross_references {
            out.emit(&Record::CrossReference(reference.clone()));
        }
    }
}

fn transliterated_title(record: &TitleRecord, transliterate: fn(&str) -> String) -> TitleRecord {
    let mut record = record.clone();
    record.title = transliterate(&record.title);
    for writer in [&mut record.writer_1, &mut record.writer_2] {
        writer.last_name = transliterate(&writer.last_name);
        writer.first_name = transliterate(&writer.first_name);
    }
    record
}

/// IPI Name Number to write for a party: the explicit one, else its party
/// number when that is itself a valid IPI Name Number.
fn written_ipi_name(shareholder: &Shareholder) -> Option<u64> {
    shareholder
        .ipi_name
        .or_else(|| Some(shareholder.ip_number).filter(|ip| is_valid_ipi_name(*ip)))
}

/// IPI Base Number to write for a party, blanked when its check digit fails.
fn written_ipi_base(log: &mut MessageLog, name: &str, base: &str) -> String {
    if is_valid_ipi_base(base) {
        return base.trim().to_string();
    }
    log.warning(format!("Invalid IPI Base Number '{}' for '{}' - replaced with spaces", base.trim(), name));
    String::new()
}

fn share_order(share: &Share, catalog: &Catalog) -> (bool, u8, u8) {
    let controlled = catalog.shareholder(share.ip_number).is_some_and(|s| s.controlled);
    (!controlled, share.chain, share.role.map_or(u8::MAX, |r| r.priority()))
}

fn write_shares(out: &mut Emitter, catalog: &Catalog, config: &RegistrationConfig, work: &Work) {
    let transliterate = config.transliterate;
    let mut shares = work.shares.clone();
    shares.sort_by_key(|share| share_order(share, catalog));

    if let Some(targets) = config.rewrite_targets() {
        out.log.info(format!(
            "NOTICE: Re-writing collection shares for society #{} to be valid only in territories: {}",
            config.receiver_society.unwrap_or(0),
            targets.join(", ")
        ));
        for share in shares.iter_mut() {
            share.territories = TERRITORIES.rewrite(&share.territories, targets);
        }
    }

    let mut publishers: Vec<(&Share, &Shareholder)> = Vec::new();
    let mut writers: Vec<(&Share, &Shareholder)> = Vec::new();
    for share in &shares {
        let (Some(role), Some(party)) = (share.role, catalog.shareholder(share.ip_number)) else {
            continue;
        };
        match role.class() {
            RoleClass::Publisher => {
                if share.has_ownership() || !share.territories.is_empty() {
                    publishers.push((share, party));
                }
            }
            RoleClass::SubPublisher => {
                if share.territories.is_empty() {
                    out.log.info(format!(
                        "NOTICE: Sub-Publisher '{}' has no collection rights in the relevant territories - removed from CWR.",
                        party.name
                    ));
                } else {
                    publishers.push((share, party));
                }
            }
            RoleClass::Writer | RoleClass::Arranger => writers.push((share, party)),
            RoleClass::IncomeParticipant => {
                if !party.first_name.trim().is_empty() {
                    writers.push((share, party));
                } else if !share.territories.is_empty() {
                    publishers.push((share, party));
                }
            }
        }
    }

    // Chain of title: link number to original publisher (first) and co-publishers.
    let mut chains: BTreeMap<u8, Vec<u64>> = BTreeMap::new();
    let mut publisher_sequence: HashMap<u64, u8> = HashMap::new();

    for (share, party) in &publishers {
        if share.chain == 0 {
            out.log.warning(format!("No chain of title declared! (work: {})", work.title()));
        }
        let role = share.role.unwrap_or(Role::OriginalPublisher);
        if role == Role::OriginalPublisher {
            let chain = chains.entry(share.chain).or_default();
            chain.retain(|ip| *ip != party.ip_number);
            chain.insert(0, party.ip_number);
            publisher_sequence.insert(party.ip_number, share.chain);
        }
        if let Some(co) = share.co_publisher {
            chains.entry(co).or_default().push(party.ip_number);
        }
        let ipi_base = written_ipi_base(&mut out.log, &party.name, &party.ipi_base);

        out.emit(&Record::Publisher(PublisherRecord {
            controlled: party.controlled,
            sequence: share.chain,
            ip_number: Some(party.ip_number),
            name: transliterate(&party.name),
            unknown: (!party.controlled && party.unknown).then_some(true),
            publisher_type: role.to_code().to_string(),
            tax_id: party.tax_id.clone(),
            ipi_name: written_ipi_name(party),
            submitter_agreement: share.submitter_agreement.clone(),
            pr_society: party.pr_society,
            pr_share: share.pr_ownership,
            mr_society: party.mr_society,
            mr_share: share.mr_ownership,
            sr_society: party.sr_society,
            sr_share: share.sr_ownership,
            special_agreements: share.special_agreement.clone(),
            first_recording_refusal: share.first_recording_refusal,
            ipi_base,
            society_agreement: share.society_agreement.clone(),
            agreement_type: share.agreement_type.clone(),
            usa_license: party.usa_license.chars().take(1).collect(),
            ..PublisherRecord::default()
        }));

        if party.controlled || out.version() >= CwrVersion::V22 {
            for record in territory_records(share, party.controlled, Some(party.ip_number)) {
                out.emit(&Record::PublisherTerritory(record));
            }
        }
    }

    for (share, party) in &writers {
        let temporary = !party.controlled && party.ip_number < TEMPORARY_IP_LIMIT;
        let ip_number = (!temporary).then_some(party.ip_number);
        let ipi_base = written_ipi_base(&mut out.log, &party.name, &party.ipi_base);

        out.emit(&Record::Writer(WriterRecord {
            controlled: party.controlled,
            ip_number,
            last_name: transliterate(&party.name),
            first_name: transliterate(&party.first_name),
            unknown: (!party.controlled && party.unknown).then_some(true),
            designation: share.role.map(|r| r.to_code().to_string()).unwrap_or_default(),
            tax_id: party.tax_id.clone(),
            ipi_name: if temporary { None } else { written_ipi_name(party) },
            pr_society: party.pr_society,
            pr_share: share.pr_ownership,
            mr_society: party.mr_society,
            mr_share: share.mr_ownership,
            sr_society: party.sr_society,
            sr_share: share.sr_ownership,
            reversionary: share.reversionary.clone(),
            first_recording_refusal: share.first_recording_refusal,
            work_for_hire: share.work_for_hire,
            ipi_base,
            personal_number: party.personal_number.trim().parse().ok(),
            usa_license: party.usa_license.chars().take(1).collect(),
        }));

        if party.controlled || out.version() >= CwrVersion::V22 {
            for record in territory_records(share, party.controlled, ip_number) {
                out.emit(&Record::WriterTerritory(record));
            }
        }

        let linked = chains.get(&share.chain);
        if party.controlled || (out.version() >= CwrVersion::V22 && linked.is_some()) {
            for publisher_ip in linked.into_iter().flatten() {
                let publisher_name = catalog.shareholder(*publisher_ip).map(|p| p.name.as_str()).unwrap_or_default();
                out.emit(&Record::PublisherForWriter(PublisherForWriter {
                    publisher_ip: Some(*publisher_ip),
                    publisher_name: transliterate(publisher_name),
                    writer_ip: ip_number,
                    publisher_sequence: publisher_sequence.get(publisher_ip).copied(),
                    ..PublisherForWriter::default()
                }));
            }
        }
    }
}

fn territory_records(share: &Share, controlled: bool, ip_number: Option<u64>) -> Vec<TerritoryRecord> {
    share
        .territories
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let included = entry.indicator == Inclusion::Include;
            TerritoryRecord {
                controlled,
                ip_number,
                pr: if included { entry.collection.pr } else { Default::default() },
                mr: if included { entry.collection.mr } else { Default::default() },
                sr: if included { entry.collection.sr } else { Default::default() },
                indicator: entry.indicator,
                tis: entry.tis,
                shares_change: entry.shares_change,
                sequence: (i + 1) as u16,
            }
        })
        .collect()
}

// =============================================================================
// Recordings
// =============================================================================

fn recordings(out: &mut Emitter, catalog: &Catalog, work: &Work) -> Vec<RecordingDetail> {
    let extended = out.version() >= CwrVersion::V22;
    let mut result = Vec::new();

    for isrc in &work.isrcs {
        if !is_valid_isrc(isrc) {
            out.log.warning(format!(
                "ISRC '{}' attached to work '{}' is invalid -- skipping 'REC' entry.",
                isrc,
                work.title()
            ));
            continue;
        }

        let mut base = RecordingDetail {
            duration: work.header.duration,
            isrc: isrc.clone(),
            recording_format: AUDIO_FORMAT.to_string(),
            ..RecordingDetail::default()
        };

        let Some(track) = catalog.track(isrc) else {
            result.push(base);
            continue;
        };
        if base.duration.is_none() {
            base.duration = track.duration;
        }
        if extended {
            base.recording_title = track.title.clone();
            base.version_title = track.version_title.clone();
            base.display_artist = track.artist_name.clone();
            base.record_label = track.label_name.clone();
            base.submitter_recording_id = track.track_id.clone();
            base.isrc_validity = "Y".to_string();
        }
        if track.releases.is_empty() {
            result.push(base);
            continue;
        }

        for upc in &track.releases {
            let mut recording = base.clone();
            let ean = upc_to_ean(upc);
            if is_valid_ean(&ean) {
                recording.ean = ean;
            } else {
                out.log.warning(format!("Warning: EAN/UPC {:0>13} is invalid -- replacing with spaces.", upc));
            }
            if let Some(release) = catalog.release(upc) {
                recording.first_release_date = release.release_date;
                recording.album_title = release.title.clone();
                recording.album_label = release.label_name.clone();
                recording.catalog_number = release.catalog_number.clone();
                recording.media_type = release.media_type.clone();
            }
            result.push(recording);
        }
    }
    result
}
