//! CWR record codec.
//!
//! Every CWR line is one record. Body records start with a 19-character prefix:
//!
//! ```text
//! NWR 00000000 00000000 Title...
//! ^^^ ^^^^^^^^ ^^^^^^^^
//! tag txn seq  rec seq
//! ```
//!
//! The transmission and group wrappers (HDR, GRH, GRT, TRL) carry only the tag.
//! Versions 2.0, 2.1 and 2.2 differ by optional trailing fields, so encoding
//! is parameterized by [`CwrVersion`] while decoding pads every line to the
//! widest layout and reads whatever is present.
//!
//! ## Example
//!
//! ```rust,ignore
//! use cwr::record::{Codec, CwrVersion, Record, Sequence};
//!
//! let codec = Codec::new(CwrVersion::V21);
//! let encoded = codec.encode(&record, Sequence::new(0, 1));
//! let decoded = codec.decode(&encoded.line);
//! assert_eq!(decoded.record, record);
//! ```

mod control;
mod field;
mod party;
mod work;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use control::{GroupHeader, GroupTrailer, TransmissionHeader, TransmissionTrailer};
pub use field::{LineReader, LineWriter};
pub use party::{PublisherForWriter, PublisherRecord, TerritoryRecord, WriterRecord};
pub use work::RecordingDetail;

use crate::logs::LogEntry;
use crate::models::{
    Acknowledgement, AdditionalInfo, AlternateTitle, CrossReference, InstrumentDetail,
    Instrumentation, MessageRecord, Performer, TitleKind, TitleRecord, TransactionType, WorkHeader,
    WorkOrigin,
};

// =============================================================================
// Version
// =============================================================================

/// Supported CWR revisions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CwrVersion {
    #[serde(rename = "2.0")]
    V20,
    #[default]
    #[serde(rename = "2.1")]
    V21,
    #[serde(rename = "2.2")]
    V22,
}

impl CwrVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V20 => "2.0",
            Self::V21 => "2.1",
            Self::V22 => "2.2",
        }
    }

    /// Version field of a group header (`02.10` for 2.1).
    pub fn group_version(&self) -> &'static str {
        match self {
            Self::V20 => "02.00",
            Self::V21 => "02.10",
            Self::V22 => "02.20",
        }
    }

    /// Two-digit form used in file names (`21` for 2.1).
    pub fn file_code(&self) -> &'static str {
        match self {
            Self::V20 => "20",
            Self::V21 => "21",
            Self::V22 => "22",
        }
    }
}

impl fmt::Display for CwrVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CwrVersion {
    type Err = String;

    /// Accepts `2.1`, `21`, `02.10` and the like.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits: String = s.trim().chars().filter(char::is_ascii_digit).collect();
        match digits.trim_start_matches('0') {
            "2" | "20" | "200" => Ok(Self::V20),
            "21" | "210" => Ok(Self::V21),
            "22" | "220" => Ok(Self::V22),
            _ => Err(format!("unsupported CWR version '{}'", s)),
        }
    }
}

// =============================================================================
// Record Types
// =============================================================================

/// Every record tag the codec knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    Hdr,
    Grh,
    Grt,
    Trl,
    Nwr,
    Rev,
    Isw,
    Exc,
    Ack,
    Msg,
    Spu,
    Opu,
    Spt,
    Opt,
    Swr,
    Owr,
    Swt,
    Owt,
    Pwr,
    Alt,
    Per,
    Rec,
    Orn,
    Com,
    Ewt,
    Ver,
    Ins,
    Ind,
    Ari,
    Xrf,
}

impl RecordType {
    pub fn from_tag(tag: &str) -> Option<Self> {
        let t = match tag.trim() {
            "HDR" => Self::Hdr,
            "GRH" => Self::Grh,
            "GRT" => Self::Grt,
            "TRL" => Self::Trl,
            "NWR" => Self::Nwr,
            "REV" => Self::Rev,
            "ISW" => Self::Isw,
            "EXC" => Self::Exc,
            "ACK" => Self::Ack,
            "MSG" => Self::Msg,
            "SPU" => Self::Spu,
            "OPU" => Self::Opu,
            "SPT" => Self::Spt,
            "OPT" => Self::Opt,
            "SWR" => Self::Swr,
            "OWR" => Self::Owr,
            "SWT" => Self::Swt,
            "OWT" => Self::Owt,
            "PWR" => Self::Pwr,
            "ALT" => Self::Alt,
            "PER" => Self::Per,
            "REC" => Self::Rec,
            "ORN" => Self::Orn,
            "COM" => Self::Com,
            "EWT" => Self::Ewt,
            "VER" => Self::Ver,
            "INS" => Self::Ins,
            "IND" => Self::Ind,
            "ARI" => Self::Ari,
            "XRF" => Self::Xrf,
            _ => return None,
        };
        Some(t)
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Self::Hdr => "HDR",
            Self::Grh => "GRH",
            Self::Grt => "GRT",
            Self::Trl => "TRL",
            Self::Nwr => "NWR",
            Self::Rev => "REV",
            Self::Isw => "ISW",
            Self::Exc => "EXC",
            Self::Ack => "ACK",
            Self::Msg => "MSG",
            Self::Spu => "SPU",
            Self::Opu => "OPU",
            Self::Spt => "SPT",
            Self::Opt => "OPT",
            Self::Swr => "SWR",
            Self::Owr => "OWR",
            Self::Swt => "SWT",
            Self::Owt => "OWT",
            Self::Pwr => "PWR",
            Self::Alt => "ALT",
            Self::Per => "PER",
            Self::Rec => "REC",
            Self::Orn => "ORN",
            Self::Com => "COM",
            Self::Ewt => "EWT",
            Self::Ver => "VER",
            Self::Ins => "INS",
            Self::Ind => "IND",
            Self::Ari => "ARI",
            Self::Xrf => "XRF",
        }
    }

    /// Wrapper records carry no sequence prefix.
    pub fn has_prefix(&self) -> bool {
        !matches!(self, Self::Hdr | Self::Grh | Self::Grt | Self::Trl)
    }

    /// Width of the longest layout across supported versions.
    pub fn max_width(&self) -> usize {
        match self {
            Self::Hdr => 167,
            Self::Grh => 28,
            Self::Grt => 37,
            Self::Trl => 24,
            Self::Nwr | Self::Rev | Self::Isw | Self::Exc => 260,
            Self::Ack => 159,
            Self::Msg => 185,
            Self::Spu | Self::Opu => 183,
            Self::Spt | Self::Opt => 58,
            Self::Swr | Self::Owr => 180,
            Self::Swt | Self::Owt => 52,
            Self::Pwr => 112,
            Self::Alt => 83,
            Self::Per => 118,
            Self::Rec => 540,
            Self::Orn => 348,
            Self::Com => 308,
            Self::Ewt | Self::Ver => 364,
            Self::Ins => 75,
            Self::Ind => 25,
            Self::Ari => 201,
            Self::Xrf => 38,
        }
    }

    pub fn transaction_type(&self) -> Option<TransactionType> {
        match self {
            Self::Nwr => Some(TransactionType::NewWork),
            Self::Rev => Some(TransactionType::Revision),
            Self::Isw => Some(TransactionType::IswcNotification),
            Self::Exc => Some(TransactionType::Conflict),
            _ => None,
        }
    }

    fn from_transaction(t: TransactionType) -> Self {
        match t {
            TransactionType::NewWork => Self::Nwr,
            TransactionType::Revision => Self::Rev,
            TransactionType::IswcNotification => Self::Isw,
            TransactionType::Conflict => Self::Exc,
        }
    }

    fn from_title(kind: TitleKind) -> Self {
        match kind {
            TitleKind::Component => Self::Com,
            TitleKind::EntireWork => Self::Ewt,
            TitleKind::OriginalWork => Self::Ver,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Transaction and record sequence numbers of a body record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sequence {
    pub transaction: u32,
    pub record: u32,
}

impl Sequence {
    pub fn new(transaction: u32, record: u32) -> Self {
        Self { transaction, record }
    }
}

// =============================================================================
// Record
// =============================================================================

/// A structured CWR record.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    TransmissionHeader(TransmissionHeader),
    GroupHeader(GroupHeader),
    GroupTrailer(GroupTrailer),
    TransmissionTrailer(TransmissionTrailer),
    Transaction(TransactionType, WorkHeader),
    Acknowledgement(Acknowledgement),
    Message(MessageRecord),
    Publisher(PublisherRecord),
    PublisherTerritory(TerritoryRecord),
    Writer(WriterRecord),
    WriterTerritory(TerritoryRecord),
    PublisherForWriter(PublisherForWriter),
    AlternateTitle(AlternateTitle),
    Performer(Performer),
    Recording(RecordingDetail),
    WorkOrigin(WorkOrigin),
    Title(TitleKind, TitleRecord),
    Instrumentation(Instrumentation),
    InstrumentDetail(InstrumentDetail),
    AdditionalInfo(AdditionalInfo),
    CrossReference(CrossReference),
    /// A line whose tag the codec does not know.
    Unparsed { tag: String, line: String },
}

impl Record {
    /// The tag this record is written with, `None` for [`Record::Unparsed`].
    pub fn record_type(&self) -> Option<RecordType> {
        let t = match self {
            Self::TransmissionHeader(_) => RecordType::Hdr,
            Self::GroupHeader(_) => RecordType::Grh,
            Self::GroupTrailer(_) => RecordType::Grt,
            Self::TransmissionTrailer(_) => RecordType::Trl,
            Self::Transaction(t, _) => RecordType::from_transaction(*t),
            Self::Acknowledgement(_) => RecordType::Ack,
            Self::Message(_) => RecordType::Msg,
            Self::Publisher(p) if p.controlled => RecordType::Spu,
            Self::Publisher(_) => RecordType::Opu,
            Self::PublisherTerritory(t) if t.controlled => RecordType::Spt,
            Self::PublisherTerritory(_) => RecordType::Opt,
            Self::Writer(w) if w.controlled => RecordType::Swr,
            Self::Writer(_) => RecordType::Owr,
            Self::WriterTerritory(t) if t.controlled => RecordType::Swt,
            Self::WriterTerritory(_) => RecordType::Owt,
            Self::PublisherForWriter(_) => RecordType::Pwr,
            Self::AlternateTitle(_) => RecordType::Alt,
            Self::Performer(_) => RecordType::Per,
            Self::Recording(_) => RecordType::Rec,
            Self::WorkOrigin(_) => RecordType::Orn,
            Self::Title(kind, _) => RecordType::from_title(*kind),
            Self::Instrumentation(_) => RecordType::Ins,
            Self::InstrumentDetail(_) => RecordType::Ind,
            Self::AdditionalInfo(_) => RecordType::Ari,
            Self::CrossReference(_) => RecordType::Xrf,
            Self::Unparsed { .. } => return None,
        };
        Some(t)
    }

    /// Three-character tag, including the tag of an unparsed line.
    pub fn tag(&self) -> &str {
        match self {
            Self::Unparsed { tag, .. } => tag,
            other => other.record_type().map(|t| t.tag()).unwrap_or_default(),
        }
    }
}

/// Result of [`Codec::encode`].
#[derive(Debug, Clone, PartialEq)]
pub struct Encoded {
    /// The line without its CRLF terminator. Empty for unsupported records.
    pub line: String,
    pub diagnostics: Vec<LogEntry>,
}

/// Result of [`Codec::decode`].
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub record: Record,
    pub sequence: Sequence,
    pub diagnostics: Vec<LogEntry>,
}

// =============================================================================
// Codec
// =============================================================================

/// Layout shared by every record struct.
pub(crate) trait FixedWidth: Sized {
    fn write(&self, w: &mut LineWriter, version: CwrVersion);
    fn read(r: &mut LineReader) -> Self;
}

/// Stateless encoder/decoder for one CWR version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Codec {
    version: CwrVersion,
}

impl Codec {
    pub fn new(version: CwrVersion) -> Self {
        Self { version }
    }

    pub fn version(&self) -> CwrVersion {
        self.version
    }

    /// Encode `record` as one line. Field problems become diagnostics.
    pub fn encode(&self, record: &Record, sequence: Sequence) -> Encoded {
        let Some(record_type) = record.record_type() else {
            let message = format!(
                "(Txn {}, Seq {}): Unsupported record type '{}'.",
                sequence.transaction,
                sequence.record,
                record.tag()
            );
            return Encoded { line: String::new(), diagnostics: vec![LogEntry::error(message)] };
        };

        let v = self.version;
        let mut w = LineWriter::new(record_type, sequence);
        match record {
            Record::TransmissionHeader(r) => r.write(&mut w, v),
            Record::GroupHeader(r) => r.write(&mut w, v),
            Record::GroupTrailer(r) => r.write(&mut w, v),
            Record::TransmissionTrailer(r) => r.write(&mut w, v),
            Record::Transaction(_, r) => r.write(&mut w, v),
            Record::Acknowledgement(r) => r.write(&mut w, v),
            Record::Message(r) => r.write(&mut w, v),
            Record::Publisher(r) => r.write(&mut w, v),
            Record::PublisherTerritory(r) => r.write_with(&mut w, v, true),
            Record::Writer(r) => r.write(&mut w, v),
            Record::WriterTerritory(r) => r.write_with(&mut w, v, false),
            Record::PublisherForWriter(r) => r.write(&mut w, v),
            Record::AlternateTitle(r) => r.write(&mut w, v),
            Record::Performer(r) => r.write(&mut w, v),
            Record::Recording(r) => r.write(&mut w, v),
            Record::WorkOrigin(r) => r.write(&mut w, v),
            Record::Title(kind, r) => r.write_with(&mut w, *kind),
            Record::Instrumentation(r) => r.write(&mut w, v),
            Record::InstrumentDetail(r) => r.write(&mut w, v),
            Record::AdditionalInfo(r) => r.write(&mut w, v),
            Record::CrossReference(r) => r.write(&mut w, v),
            Record::Unparsed { .. } => {}
        }

        let (line, diagnostics) = w.finish();
        Encoded { line, diagnostics }
    }

    /// Decode one line, without its terminator.
    ///
    /// Unknown tags come back as [`Record::Unparsed`] with no diagnostic;
    /// whoever drives the codec decides how to report them.
    pub fn decode(&self, line: &str) -> Decoded {
        let tag: String = line.chars().take(3).collect();
        let Some(record_type) = RecordType::from_tag(&tag) else {
            return Decoded {
                record: Record::Unparsed { tag, line: line.to_string() },
                sequence: Sequence::default(),
                diagnostics: Vec::new(),
            };
        };

        let mut r = LineReader::new(line, record_type.max_width());
        let sequence = r.prefix(record_type.has_prefix());
        let record = match record_type {
            RecordType::Hdr => Record::TransmissionHeader(FixedWidth::read(&mut r)),
            RecordType::Grh => Record::GroupHeader(FixedWidth::read(&mut r)),
            RecordType::Grt => Record::GroupTrailer(FixedWidth::read(&mut r)),
            RecordType::Trl => Record::TransmissionTrailer(FixedWidth::read(&mut r)),
            RecordType::Nwr | RecordType::Rev | RecordType::Isw | RecordType::Exc => {
                let transaction = record_type.transaction_type().unwrap_or(TransactionType::NewWork);
                Record::Transaction(transaction, FixedWidth::read(&mut r))
            }
            RecordType::Ack => Record::Acknowledgement(FixedWidth::read(&mut r)),
            RecordType::Msg => Record::Message(FixedWidth::read(&mut r)),
            RecordType::Spu | RecordType::Opu => {
                let mut publisher: PublisherRecord = FixedWidth::read(&mut r);
                publisher.controlled = record_type == RecordType::Spu;
                Record::Publisher(publisher)
            }
            RecordType::Spt | RecordType::Opt => {
                Record::PublisherTerritory(TerritoryRecord::read_with(&mut r, record_type == RecordType::Spt, true))
            }
            RecordType::Swr | RecordType::Owr => {
                let mut writer: WriterRecord = FixedWidth::read(&mut r);
                writer.controlled = record_type == RecordType::Swr;
                Record::Writer(writer)
            }
            RecordType::Swt | RecordType::Owt => {
                Record::WriterTerritory(TerritoryRecord::read_with(&mut r, record_type == RecordType::Swt, false))
            }
            RecordType::Pwr => Record::PublisherForWriter(FixedWidth::read(&mut r)),
            RecordType::Alt => Record::AlternateTitle(FixedWidth::read(&mut r)),
            RecordType::Per => Record::Performer(FixedWidth::read(&mut r)),
            RecordType::Rec => Record::Recording(FixedWidth::read(&mut r)),
            RecordType::Orn => Record::WorkOrigin(FixedWidth::read(&mut r)),
            RecordType::Com => Record::Title(TitleKind::Component, TitleRecord::read_with(&mut r, TitleKind::Component)),
            RecordType::Ewt => Record::Title(TitleKind::EntireWork, TitleRecord::read_with(&mut r, TitleKind::EntireWork)),
            RecordType::Ver => {
                Record::Title(TitleKind::OriginalWork, TitleRecord::read_with(&mut r, TitleKind::OriginalWork))
            }
            RecordType::Ins => Record::Instrumentation(FixedWidth::read(&mut r)),
            RecordType::Ind => Record::InstrumentDetail(FixedWidth::read(&mut r)),
            RecordType::Ari => Record::AdditionalInfo(FixedWidth::read(&mut r)),
            RecordType::Xrf => Record::CrossReference(FixedWidth::read(&mut r)),
        };

        Decoded { record, sequence, diagnostics: r.into_diagnostics() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parsing() {
        assert_eq!("2.1".parse::<CwrVersion>(), Ok(CwrVersion::V21));
        assert_eq!("02.20".parse::<CwrVersion>(), Ok(CwrVersion::V22));
        assert_eq!("20".parse::<CwrVersion>(), Ok(CwrVersion::V20));
        assert!("3.0".parse::<CwrVersion>().is_err());
        assert!(CwrVersion::V22 > CwrVersion::V21);
        assert_eq!(CwrVersion::V21.group_version(), "02.10");
    }

    #[test]
    fn test_record_type_tags() {
        for tag in ["HDR", "NWR", "SPU", "OWT", "XRF", "ACK"] {
            assert_eq!(RecordType::from_tag(tag).map(|t| t.tag()), Some(tag));
        }
        assert_eq!(RecordType::from_tag("AGR"), None);
        assert!(!RecordType::Grh.has_prefix());
        assert!(RecordType::Alt.has_prefix());
    }

    #[test]
    fn test_unknown_tag_decodes_to_unparsed() {
        let codec = Codec::default();
        let decoded = codec.decode("ZZZ0000000100000001whatever");
        assert_eq!(decoded.record.tag(), "ZZZ");
        assert!(matches!(decoded.record, Record::Unparsed { .. }));
        assert!(decoded.diagnostics.is_empty());
    }

    #[test]
    fn test_encoding_unparsed_yields_empty_line() {
        let codec = Codec::default();
        let record = Record::Unparsed { tag: "AGR".into(), line: "AGR...".into() };
        let encoded = codec.encode(&record, Sequence::new(3, 4));
        assert!(encoded.line.is_empty());
        assert_eq!(encoded.diagnostics.len(), 1);
        assert!(encoded.diagnostics[0].message.contains("(Txn 3, Seq 4): Unsupported record type 'AGR'."));
    }

    #[test]
    fn test_alt_round_trip() {
        let codec = Codec::default();
        let record = Record::AlternateTitle(AlternateTitle {
            title: "LA CHANSON".into(),
            title_type: "OL".into(),
            language: "FR".into(),
        });
        let encoded = codec.encode(&record, Sequence::new(2, 5));
        assert_eq!(encoded.line.len(), RecordType::Alt.max_width());
        let decoded = codec.decode(&encoded.line);
        assert_eq!(decoded.record, record);
        assert_eq!(decoded.sequence, Sequence::new(2, 5));
    }
}
