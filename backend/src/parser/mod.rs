//! CWR transmission reader with encoding auto-detection.
//!
//! Reads CRLF-delimited fixed-width lines in one forward pass and replays
//! them onto a [`Catalog`] through a [`CatalogSession`], so reading and
//! writing share the same mutation primitives. Nothing here is fatal
//! except unreadable input: malformed fields, unknown tags and records
//! out of place become diagnostics in the catalog log.

use encoding_rs::Encoding;
use std::path::Path;

use crate::catalog::{Catalog, CatalogSession};
use crate::error::{CatalogResult, ReadError, ReadResult};
use crate::identity::IdentityResolver;
use crate::models::{
    Acknowledgement, CollectionShares, Release, Role, Share, Shareholder, TerritoryEntry, Track, TransactionKind,
    Work, WorkHeader,
};
use crate::record::{Codec, PublisherForWriter, PublisherRecord, Record, RecordingDetail, TerritoryRecord, WriterRecord};

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to a string using the named encoding.
///
/// Invalid UTF-8 is decoded lossily. Labels `encoding_rs` does not know
/// are an error.
pub fn decode_content(bytes: &[u8], encoding: &str) -> ReadResult<String> {
    let codec = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => encoding_rs::UTF_8,
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::ISO_8859_15,
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252,
        other => Encoding::for_label(other.as_bytes()).ok_or_else(|| ReadError::Encoding(other.to_string()))?,
    };
    Ok(codec.decode(bytes).0.into_owned())
}

/// Read a CWR file, detecting its character set.
///
/// # Example
/// ```ignore
/// use cwr::{read_cwr_file, NoLookup};
///
/// let catalog = read_cwr_file("CW240001ABC_021.V21", &NoLookup)?;
/// for (_, work) in catalog.works() {
///     println!("{} {}", work.id(), work.title());
/// }
/// ```
pub fn read_cwr_file<P: AsRef<Path>>(path: P, identity: &dyn IdentityResolver) -> ReadResult<Catalog> {
    let bytes = std::fs::read(path.as_ref())?;
    read_cwr_bytes(&bytes, identity)
}

/// Read CWR bytes, detecting their character set.
pub fn read_cwr_bytes(bytes: &[u8], identity: &dyn IdentityResolver) -> ReadResult<Catalog> {
    if bytes.is_empty() {
        return Err(ReadError::EmptyInput);
    }
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    read_cwr(&content, identity)
}

/// Read decoded CWR text into a new catalog.
///
/// Lines may end in CRLF or a bare LF. Reading stops after the TRL record.
pub fn read_cwr(content: &str, identity: &dyn IdentityResolver) -> ReadResult<Catalog> {
    if content.trim().is_empty() {
        return Err(ReadError::EmptyInput);
    }

    let mut catalog = Catalog::new();
    let mut reader = Reader { session: CatalogSession::new(&mut catalog), identity, codec: Codec::default() };

    for (index, raw) in content.split('\n').enumerate() {
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let line_number = index + 1;
        let decoded = reader.codec.decode(line);
        reader.log().extend(decoded.diagnostics);

        let finished = matches!(decoded.record, Record::TransmissionTrailer(_));
        if let Err(e) = reader.apply(decoded.record, line_number) {
            reader.log().error(format!("Line {}: {}", line_number, e));
        }
        if finished {
            break;
        }
    }

    log::debug!("Read {} works from CWR input", catalog.work_count());
    Ok(catalog)
}

// =============================================================================
// Record dispatch
// =============================================================================

struct Reader<'c, 'i> {
    session: CatalogSession<'c>,
    identity: &'i dyn IdentityResolver,
    codec: Codec,
}

impl Reader<'_, '_> {
    fn log(&mut self) -> &mut crate::logs::MessageLog {
        self.session.catalog_mut().log_mut()
    }

    fn apply(&mut self, record: Record, line_number: usize) -> CatalogResult<()> {
        match record {
            Record::TransmissionHeader(header) => {
                self.session.catalog_mut().transmission.header = Some(header);
            }
            Record::GroupHeader(group) => self.session.catalog_mut().transmission.groups.push(group),
            Record::GroupTrailer(trailer) => self.session.catalog_mut().transmission.group_trailers.push(trailer),
            Record::TransmissionTrailer(trailer) => {
                self.session.catalog_mut().transmission.trailer = Some(trailer);
            }
            Record::Transaction(transaction_type, header) => {
                self.session.register_work(Work { header, transaction: transaction_type.bit(), ..Work::default() });
            }
            Record::Acknowledgement(ack) => self.acknowledgement(ack)?,
            Record::Message(message) => self.session.add_message(message)?,
            Record::Publisher(publisher) => self.publisher(publisher)?,
            Record::Writer(writer) => self.writer(writer)?,
            Record::PublisherTerritory(territory) | Record::WriterTerritory(territory) => {
                self.session.add_territory(territory_entry(territory))?;
            }
            Record::PublisherForWriter(link) => self.publisher_for_writer(link)?,
            Record::AlternateTitle(title) => self.session.add_alternate_title(title)?,
            Record::WorkOrigin(origin) => self.session.add_origin(origin)?,
            Record::Instrumentation(instrumentation) => self.session.add_instrumentation(instrumentation)?,
            Record::InstrumentDetail(detail) => self.session.add_instrument_detail(detail)?,
            Record::Title(kind, title) => {
                self.session.set_title(kind, title)?;
            }
            Record::Performer(performer) => {
                self.session.add_performer(performer)?;
            }
            Record::Recording(recording) => self.recording(recording)?,
            Record::AdditionalInfo(info) => {
                self.session.add_additional_info(info)?;
            }
            Record::CrossReference(reference) => self.session.add_cross_reference(reference)?,
            Record::Unparsed { tag, .. } => {
                self.log().warning(format!("Skipping record type '{}' (line {})", tag, line_number));
            }
        }
        Ok(())
    }

    /// ACK opens the transaction it acknowledges; the work is keyed by the
    /// submitter creation number.
    fn acknowledgement(&mut self, ack: Acknowledgement) -> CatalogResult<()> {
        let work = Work {
            header: WorkHeader {
                submitter_work_id: ack.submitter_creation_number.trim().to_string(),
                title: ack.creation_title.clone(),
                ..WorkHeader::default()
            },
            transaction: TransactionKind::ACK,
            ..Work::default()
        };
        self.session.register_work(work);
        self.session.set_acknowledgement(ack)
    }

    fn publisher(&mut self, publisher: PublisherRecord) -> CatalogResult<()> {
        let ip_number = match publisher.ip_number.filter(|ip| *ip != 0) {
            Some(ip) => ip,
            None => self.session.catalog().synthetic_ip_number(self.identity, &publisher.name, "", publisher.pr_society),
        };

        self.session.add_shareholder(Shareholder {
            ip_number,
            name: publisher.name,
            controlled: publisher.controlled,
            ipi_name: publisher.ipi_name,
            ipi_base: publisher.ipi_base,
            tax_id: publisher.tax_id,
            pr_society: publisher.pr_society,
            mr_society: publisher.mr_society,
            sr_society: publisher.sr_society,
            usa_license: publisher.usa_license,
            unknown: publisher.unknown.unwrap_or(false),
            synthetic: publisher.ip_number.is_none(),
            ..Shareholder::default()
        });

        self.session.add_share(Share {
            ip_number,
            role: Role::from_code(&publisher.publisher_type),
            pr_ownership: publisher.pr_share,
            mr_ownership: publisher.mr_share,
            sr_ownership: publisher.sr_share,
            chain: publisher.sequence,
            special_agreement: publisher.special_agreements,
            first_recording_refusal: publisher.first_recording_refusal,
            submitter_agreement: publisher.submitter_agreement,
            society_agreement: publisher.society_agreement,
            agreement_type: publisher.agreement_type,
            ..Share::default()
        })?;
        Ok(())
    }

    fn writer(&mut self, writer: WriterRecord) -> CatalogResult<()> {
        let identified = writer.ip_number.filter(|ip| *ip != 0);
        let ip_number = match identified {
            Some(ip) => ip,
            None => self.session.catalog().synthetic_ip_number(
                self.identity,
                &writer.last_name,
                &writer.first_name,
                writer.pr_society,
            ),
        };

        self.session.add_shareholder(Shareholder {
            ip_number,
            name: writer.last_name,
            first_name: writer.first_name,
            controlled: writer.controlled,
            ipi_name: writer.ipi_name,
            ipi_base: writer.ipi_base,
            tax_id: writer.tax_id,
            pr_society: writer.pr_society,
            mr_society: writer.mr_society,
            sr_society: writer.sr_society,
            usa_license: writer.usa_license,
            personal_number: writer.personal_number.map(|n| n.to_string()).unwrap_or_default(),
            unknown: writer.unknown.unwrap_or(false),
            synthetic: identified.is_none(),
        });

        self.session.add_share(Share {
            ip_number,
            role: Role::from_code(&writer.designation),
            pr_ownership: writer.pr_share,
            mr_ownership: writer.mr_share,
            sr_ownership: writer.sr_share,
            reversionary: writer.reversionary,
            work_for_hire: writer.work_for_hire,
            first_recording_refusal: writer.first_recording_refusal,
            ..Share::default()
        })?;
        Ok(())
    }

    /// Link a writer to its publisher's chain of title.
    ///
    /// 2.2 files carry the publisher sequence number. Older ones only name
    /// the publisher, whose chain is looked up among the work's shares.
    fn publisher_for_writer(&mut self, link: PublisherForWriter) -> CatalogResult<()> {
        let work = self.session.current_work()?;
        let catalog = self.session.catalog_mut();

        let chain = match link.publisher_sequence.filter(|sequence| *sequence != 0) {
            Some(sequence) => Some(sequence),
            None => {
                let publisher_ip = link.publisher_ip;
                catalog
                    .work(work)?
                    .shares
                    .iter()
                    .filter(|share| Some(share.ip_number) == publisher_ip)
                    .map(|share| share.chain)
                    .last()
            }
        };
        let Some(chain) = chain else {
            let message = format!(
                "PWR: publisher {} not found in work '{}'",
                link.publisher_ip.unwrap_or(0),
                catalog.work(work)?.title()
            );
            catalog.log_mut().warning(message);
            return Ok(());
        };

        for share in catalog.work_mut(work)?.shares.iter_mut() {
            if Some(share.ip_number) == link.writer_ip {
                share.chain = chain;
            }
        }
        Ok(())
    }

    /// REC links the ISRC to the current work and feeds the track and
    /// release registries.
    fn recording(&mut self, recording: RecordingDetail) -> CatalogResult<()> {
        let work = self.session.current_work()?;
        self.session.add_isrc(&recording.isrc)?;

        let ean = recording.ean.trim().to_string();
        let catalog = self.session.catalog_mut();
        if !ean.is_empty() {
            catalog.add_release(Release {
                upc: ean.clone(),
                title: recording.album_title,
                label_name: recording.album_label,
                catalog_number: recording.catalog_number,
                release_date: recording.first_release_date,
                media_type: recording.media_type,
            });
        }

        if recording.isrc.trim().is_empty() {
            return Ok(());
        }
        let (work_id, iswc) = {
            let current = catalog.work(work)?;
            (current.id().to_string(), current.header.iswc.clone())
        };
        catalog.add_track(Track {
            isrc: recording.isrc,
            work_id,
            iswc,
            title: recording.recording_title,
            version_title: recording.version_title,
            artist_name: recording.display_artist,
            label_name: recording.record_label,
            duration: recording.duration,
            track_id: recording.submitter_recording_id,
            releases: if ean.is_empty() { Vec::new() } else { vec![ean] },
        });
        Ok(())
    }
}

fn territory_entry(territory: TerritoryRecord) -> TerritoryEntry {
    TerritoryEntry {
        tis: territory.tis,
        indicator: territory.indicator,
        collection: CollectionShares { pr: territory.pr, mr: territory.mr, sr: territory.sr },
        shares_change: territory.shares_change,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::assemble_at;
    use crate::config::RegistrationConfig;
    use crate::identity::{NoLookup, StaticDirectory};
    use crate::models::{MessageRecord, Percentage, TransactionType};
    use crate::record::{CwrVersion, Sequence};
    use crate::territory::WORLD;
    use chrono::NaiveDate;
    use std::io::Write;

    const PUBLISHER: u64 = 100000010;
    const WRITER: u64 = 100000002;

    fn encode(records: &[Record]) -> String {
        let codec = Codec::new(CwrVersion::V21);
        records
            .iter()
            .enumerate()
            .map(|(i, record)| codec.encode(record, Sequence::new(0, i as u32)).line + "\r\n")
            .collect()
    }

    fn new_work(id: &str, title: &str) -> Record {
        Record::Transaction(
            TransactionType::NewWork,
            WorkHeader { submitter_work_id: id.into(), title: title.into(), ..WorkHeader::default() },
        )
    }

    fn assembled() -> String {
        let mut catalog = Catalog::new();
        catalog.add_shareholder(Shareholder::new(PUBLISHER, "ACME MUSIC").controlled());
        catalog.add_shareholder(Shareholder::new(WRITER, "SIMONE").with_first_name("NINA").controlled());
        let work = catalog.add_work(Work::new("W1", "SONG"));
        let publisher = catalog
            .add_share(work, Share::new(PUBLISHER, Role::OriginalPublisher).with_ownership(50.0, 100.0, 0.0).with_chain(1))
            .unwrap();
        catalog
            .add_territory(publisher, TerritoryEntry::include(WORLD, CollectionShares::new(50.0, 100.0, 0.0)))
            .unwrap();
        let writer = catalog
            .add_share(work, Share::new(WRITER, Role::ComposerAuthor).with_ownership(50.0, 0.0, 0.0).with_chain(1))
            .unwrap();
        catalog
            .add_territory(writer, TerritoryEntry::include(WORLD, CollectionShares::new(50.0, 0.0, 0.0)))
            .unwrap();
        catalog.add_isrc(work, "USRC17607839").unwrap();
        catalog.add_track(Track { releases: vec!["036000291452".into()], ..Track::new("USRC17607839") });
        catalog.add_release(Release { upc: "036000291452".into(), title: "ALBUM".into(), ..Release::default() });

        let config = RegistrationConfig::new("ABC", PUBLISHER).with_receiver(21);
        let now = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap().and_hms_opt(12, 0, 0).unwrap();
        assemble_at(&catalog, &config, &NoLookup, now).unwrap().content
    }

    #[test]
    fn test_unknown_tag_is_skipped_once() {
        let catalog = read_cwr("ZZZ0000000000000000SOMETHING\r\n", &NoLookup).unwrap();
        assert_eq!(catalog.log().len(), 1);
        assert_eq!(catalog.log().last_message(), Some("Skipping record type 'ZZZ' (line 1)"));
        assert_eq!(catalog.work_count(), 0);
        assert_eq!(catalog.transmission, Default::default());
    }

    #[test]
    fn test_reads_assembled_transmission() {
        let catalog = read_cwr(&assembled(), &NoLookup).unwrap();
        assert!(!catalog.log().has_errors(), "{:?}", catalog.log().entries());

        let header = catalog.transmission.header.as_ref().unwrap();
        assert_eq!(header.sender_id, PUBLISHER);
        assert_eq!(header.sender_name, "ACME MUSIC");
        assert_eq!(catalog.transmission.groups.len(), 1);
        assert_eq!(catalog.transmission.trailer.as_ref().unwrap().record_count, 11);

        let handle = catalog.find_work("W1").unwrap();
        let work = catalog.work(handle).unwrap();
        assert_eq!(work.title(), "SONG");
        assert_eq!(work.transaction, TransactionKind::NWR);
        assert_eq!(work.shares.len(), 2);
        assert_eq!(work.shares[0].role, Some(Role::OriginalPublisher));
        assert_eq!(work.shares[0].territories[0].tis, WORLD);
        assert_eq!(work.shares[0].territories[0].collection.mr, Percentage::FULL);
        assert_eq!(work.shares[1].chain, 1);
        assert_eq!(work.isrcs, vec!["USRC17607839".to_string()]);

        assert!(catalog.shareholder(WRITER).unwrap().controlled);
        let track = catalog.track("USRC17607839").unwrap();
        assert_eq!(track.work_id, "W1");
        assert_eq!(track.releases, vec!["0036000291452".to_string()]);
        assert_eq!(catalog.release("0036000291452").unwrap().title, "ALBUM");
    }

    #[test]
    fn test_reading_stops_at_trailer() {
        let mut content = assembled();
        content.push_str(&encode(&[new_work("W2", "AFTER TRAILER")]));
        let catalog = read_cwr(&content, &NoLookup).unwrap();
        assert_eq!(catalog.work_count(), 1);
    }

    #[test]
    fn test_bare_line_feeds() {
        let content = assembled().replace("\r\n", "\n");
        let catalog = read_cwr(&content, &NoLookup).unwrap();
        assert!(catalog.find_work("W1").is_some());
    }

    #[test]
    fn test_publisher_chain_lookup_without_sequence() {
        let content = encode(&[
            new_work("W1", "SONG"),
            Record::Publisher(PublisherRecord {
                controlled: true,
                sequence: 3,
                ip_number: Some(PUBLISHER),
                name: "ACME MUSIC".into(),
                publisher_type: "E".into(),
                ..PublisherRecord::default()
            }),
            Record::Writer(WriterRecord {
                controlled: true,
                ip_number: Some(WRITER),
                last_name: "SIMONE".into(),
                designation: "CA".into(),
                ..WriterRecord::default()
            }),
            Record::PublisherForWriter(PublisherForWriter {
                publisher_ip: Some(PUBLISHER),
                publisher_name: "ACME MUSIC".into(),
                writer_ip: Some(WRITER),
                ..PublisherForWriter::default()
            }),
        ]);
        let catalog = read_cwr(&content, &NoLookup).unwrap();
        let work = catalog.work(catalog.find_work("W1").unwrap()).unwrap();
        assert_eq!(work.shares[1].chain, 3);
    }

    #[test]
    fn test_unidentified_writers_get_numbers() {
        let unidentified = Record::Writer(WriterRecord {
            last_name: "DOE".into(),
            first_name: "JANE".into(),
            designation: "CA".into(),
            ..WriterRecord::default()
        });
        let content = encode(&[new_work("W1", "SONG"), unidentified]);

        let catalog = read_cwr(&content, &NoLookup).unwrap();
        let party = catalog.shareholder(1).unwrap();
        assert!(party.synthetic);
        assert_eq!(party.name, "DOE");
        assert!(catalog.log().entries().iter().any(|e| e.message.contains("unidentified party JANE DOE")));

        let directory = StaticDirectory::new().with_writer("Doe", "Jane", 123456789);
        let catalog = read_cwr(&content, &directory).unwrap();
        assert!(catalog.shareholder(123456789).unwrap().synthetic);
        assert!(catalog.shareholder(1).is_none());
    }

    #[test]
    fn test_acknowledgement_and_messages() {
        let content = encode(&[
            Record::Acknowledgement(Acknowledgement {
                original_transaction_type: "NWR".into(),
                creation_title: "SONG".into(),
                submitter_creation_number: "W1".into(),
                transaction_status: "AS".into(),
                ..Acknowledgement::default()
            }),
            new_work("W1", "SONG"),
            Record::Message(MessageRecord {
                message_type: "F".into(),
                record_type: "NWR".into(),
                message_level: "T".into(),
                text: "Accepted".into(),
                ..MessageRecord::default()
            }),
        ]);
        let catalog = read_cwr(&content, &NoLookup).unwrap();
        assert_eq!(catalog.work_count(), 1);
        let work = catalog.work(catalog.find_work("W1").unwrap()).unwrap();
        assert!(work.transaction.is_acknowledgement());
        assert!(work.transaction.contains(TransactionKind::NWR));
        assert_eq!(work.acknowledgement.as_ref().unwrap().transaction_status, "AS");
        assert_eq!(work.messages.len(), 1);
    }

    #[test]
    fn test_records_before_any_work_are_reported() {
        let content = encode(&[Record::Writer(WriterRecord {
            ip_number: Some(WRITER),
            last_name: "SIMONE".into(),
            designation: "CA".into(),
            ..WriterRecord::default()
        })]);
        let catalog = read_cwr(&content, &NoLookup).unwrap();
        assert!(catalog.log().has_errors());
        assert!(catalog.log().last_message().unwrap().starts_with("Line 1:"));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(read_cwr("  \r\n", &NoLookup), Err(ReadError::EmptyInput)));
        assert!(matches!(read_cwr_bytes(b"", &NoLookup), Err(ReadError::EmptyInput)));
    }

    #[test]
    fn test_read_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(assembled().as_bytes()).unwrap();
        let catalog = read_cwr_file(file.path(), &NoLookup).unwrap();
        assert_eq!(catalog.work_count(), 1);
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        assert_eq!(decode_content(bytes, "iso-8859-1").unwrap(), "Société");
        assert!(matches!(decode_content(bytes, "x-no-such-charset"), Err(ReadError::Encoding(_))));
    }
}
