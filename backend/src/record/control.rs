//! Transmission and group wrappers (HDR, GRH, GRT, TRL) plus the
//! society-to-submitter records (ACK, MSG).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{CwrVersion, FixedWidth, LineReader, LineWriter};
use crate::models::{Acknowledgement, Hms, MessageRecord};

/// EDI standard version carried by every HDR.
pub const EDI_VERSION: &str = "01.10";

/// Largest IP number that fits the nine-digit Sender ID.
const SENDER_ID_MAX: u64 = 999_999_999;

// =============================================================================
// HDR
// =============================================================================

/// Transmission header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransmissionHeader {
    /// PB, SO, AA or WR. Holds the two leading digits of an 11-digit sender id once decoded.
    pub sender_type: String,
    pub sender_id: u64,
    pub sender_name: String,
    pub edi_version: String,
    pub creation_date: Option<NaiveDate>,
    pub creation_time: Option<Hms>,
    pub transmission_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub character_set: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cwr_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwr_revision: Option<u16>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub software_package: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub software_version: String,
}

impl FixedWidth for TransmissionHeader {
    fn write(&self, w: &mut LineWriter, version: CwrVersion) {
        // IPI Name Numbers longer than nine digits spill into the sender type.
        let (sender_type, sender_id) = if self.sender_id > SENDER_ID_MAX {
            (format!("{:02}", self.sender_id / (SENDER_ID_MAX + 1)), self.sender_id % (SENDER_ID_MAX + 1))
        } else {
            (self.sender_type.clone(), self.sender_id)
        };
        let edi_version = if self.edi_version.is_empty() { EDI_VERSION } else { &self.edi_version };

        w.required("Sender Type", &sender_type, 2)
            .number("Sender ID", sender_id, 9)
            .required("Sender Name", &self.sender_name, 45)
            .text(edi_version, 5)
            .date(self.creation_date)
            .hms(self.creation_time)
            .date(self.transmission_date);
        if version >= CwrVersion::V21 {
            w.text(&self.character_set, 15);
        }
        if version >= CwrVersion::V22 {
            let cwr_version = if self.cwr_version.is_empty() { version.as_str() } else { &self.cwr_version };
            w.text(cwr_version, 3)
                .optional_number("CWR Revision", self.cwr_revision.map(u64::from), 3)
                .text(&self.software_package, 30)
                .text(&self.software_version, 30);
        }
    }

    fn read(r: &mut LineReader) -> Self {
        let sender_type = r.text(2);
        let mut sender_id = r.number("Sender ID", 9);
        if sender_type.len() == 2 && sender_type.bytes().all(|b| b.is_ascii_digit()) {
            sender_id += sender_type.parse::<u64>().unwrap_or(0) * (SENDER_ID_MAX + 1);
        }
        Self {
            sender_type,
            sender_id,
            sender_name: r.text(45),
            edi_version: r.text(5),
            creation_date: r.date("Creation Date"),
            creation_time: r.hms("Creation Time"),
            transmission_date: r.date("Transmission Date"),
            character_set: r.text(15),
            cwr_version: r.text(3),
            cwr_revision: r.optional_number("CWR Revision", 3).map(|v| v as u16),
            software_package: r.text(30),
            software_version: r.text(30),
        }
    }
}

// =============================================================================
// GRH / GRT
// =============================================================================

/// Group header. One group per transaction type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GroupHeader {
    pub transaction_type: String,
    pub group_id: u32,
    /// `02.10` style version as written in the file.
    pub version: String,
    pub batch_request: u64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub distribution_type: String,
}

impl FixedWidth for GroupHeader {
    fn write(&self, w: &mut LineWriter, version: CwrVersion) {
        let group_version = if self.version.is_empty() { version.group_version() } else { &self.version };
        w.required("Transaction Type", &self.transaction_type, 3)
            .number("Group ID", u64::from(self.group_id), 5)
            .text(group_version, 5)
            .number("Batch Request", self.batch_request, 10)
            .text(&self.distribution_type, 2);
    }

    fn read(r: &mut LineReader) -> Self {
        Self {
            transaction_type: r.text(3),
            group_id: r.number("Group ID", 5) as u32,
            version: r.text(5),
            batch_request: r.number("Batch Request", 10),
            distribution_type: r.text(2),
        }
    }
}

/// Group trailer with the group's transaction and record counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GroupTrailer {
    pub group_id: u32,
    pub transaction_count: u32,
    /// Includes the GRH and GRT themselves.
    pub record_count: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monetary_value: Option<u64>,
}

impl FixedWidth for GroupTrailer {
    fn write(&self, w: &mut LineWriter, _version: CwrVersion) {
        w.number("Group ID", u64::from(self.group_id), 5)
            .number("Transaction Count", u64::from(self.transaction_count), 8)
            .number("Record Count", u64::from(self.record_count), 8)
            .text(&self.currency, 3)
            .optional_number("Total Monetary Value", self.monetary_value, 10);
    }

    fn read(r: &mut LineReader) -> Self {
        Self {
            group_id: r.number("Group ID", 5) as u32,
            transaction_count: r.number("Transaction Count", 8) as u32,
            record_count: r.number("Record Count", 8) as u32,
            currency: r.text(3),
            monetary_value: r.optional_number("Total Monetary Value", 10),
        }
    }
}

// =============================================================================
// TRL
// =============================================================================

/// Transmission trailer. Counts include HDR and TRL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransmissionTrailer {
    pub group_count: u32,
    pub transaction_count: u32,
    pub record_count: u32,
}

impl FixedWidth for TransmissionTrailer {
    fn write(&self, w: &mut LineWriter, _version: CwrVersion) {
        w.number("Group Count", u64::from(self.group_count), 5)
            .number("Transaction Count", u64::from(self.transaction_count), 8)
            .number("Record Count", u64::from(self.record_count), 8);
    }

    fn read(r: &mut LineReader) -> Self {
        Self {
            group_count: r.number("Group Count", 5) as u32,
            transaction_count: r.number("Transaction Count", 8) as u32,
            record_count: r.number("Record Count", 8) as u32,
        }
    }
}

// =============================================================================
// ACK / MSG
// =============================================================================

impl FixedWidth for Acknowledgement {
    fn write(&self, w: &mut LineWriter, _version: CwrVersion) {
        w.date(self.creation_date)
            .hms(self.creation_time)
            .number("Original Group ID", u64::from(self.original_group_id), 5)
            .number("Original Transaction Sequence #", u64::from(self.original_transaction_sequence), 8)
            .required("Original Transaction Type", &self.original_transaction_type, 3)
            .text(&self.creation_title, 60)
            .text(&self.submitter_creation_number, 20)
            .text(&self.recipient_creation_number, 20)
            .date(self.processing_date)
            .required("Transaction Status", &self.transaction_status, 2);
    }

    fn read(r: &mut LineReader) -> Self {
        Self {
            creation_date: r.date("Creation Date"),
            creation_time: r.hms("Creation Time"),
            original_group_id: r.number("Original Group ID", 5) as u32,
            original_transaction_sequence: r.number("Original Transaction Sequence #", 8) as u32,
            original_transaction_type: r.text(3),
            creation_title: r.text(60),
            submitter_creation_number: r.text(20),
            recipient_creation_number: r.text(20),
            processing_date: r.date("Processing Date"),
            transaction_status: r.text(2),
        }
    }
}

impl FixedWidth for MessageRecord {
    fn write(&self, w: &mut LineWriter, _version: CwrVersion) {
        w.required("Message Type", &self.message_type, 1)
            .number("Original Record Sequence #", u64::from(self.original_record_sequence), 8)
            .required("Record Type", &self.record_type, 3)
            .required("Message Level", &self.message_level, 1)
            .text(&self.validation_number, 3)
            .required("Message Text", &self.text, 150);
    }

    fn read(r: &mut LineReader) -> Self {
        Self {
            message_type: r.text(1),
            original_record_sequence: r.number("Original Record Sequence #", 8) as u32,
            record_type: r.text(3),
            message_level: r.text(1),
            validation_number: r.text(3),
            text: r.text(150),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::{Codec, Record, RecordType, Sequence};
    use super::*;

    fn header() -> TransmissionHeader {
        TransmissionHeader {
            sender_type: "PB".into(),
            sender_id: 123456789,
            sender_name: "ACME MUSIC".into(),
            edi_version: EDI_VERSION.into(),
            creation_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            creation_time: Hms::new(10, 30, 0),
            transmission_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            character_set: "UTF-8".into(),
            cwr_version: "2.2".into(),
            cwr_revision: Some(1),
            software_package: "cwr".into(),
            software_version: "0.1.0".into(),
        }
    }

    #[test]
    fn test_hdr_width_per_version() {
        let record = Record::TransmissionHeader(header());
        let v20 = Codec::new(CwrVersion::V20).encode(&record, Sequence::default());
        let v21 = Codec::new(CwrVersion::V21).encode(&record, Sequence::default());
        let v22 = Codec::new(CwrVersion::V22).encode(&record, Sequence::default());
        assert_eq!(v20.line.len(), 86);
        assert_eq!(v21.line.len(), 101);
        assert_eq!(v22.line.len(), RecordType::Hdr.max_width());
        assert!(v22.line.starts_with("HDRPB123456789ACME MUSIC"));
        assert_eq!(&v22.line[59..64], EDI_VERSION);
    }

    #[test]
    fn test_hdr_round_trip() {
        let codec = Codec::new(CwrVersion::V22);
        let record = Record::TransmissionHeader(header());
        let line = codec.encode(&record, Sequence::default()).line;
        let decoded = codec.decode(&line);
        assert_eq!(decoded.record, record);
        assert!(decoded.diagnostics.is_empty());
    }

    #[test]
    fn test_hdr_long_sender_id_spills_into_type() {
        let codec = Codec::new(CwrVersion::V21);
        let record = Record::TransmissionHeader(TransmissionHeader { sender_id: 12345678993, ..header() });
        let line = codec.encode(&record, Sequence::default()).line;
        assert_eq!(&line[3..14], "12345678993");
        match codec.decode(&line).record {
            Record::TransmissionHeader(h) => assert_eq!(h.sender_id, 12345678993),
            other => panic!("unexpected record {:?}", other),
        }
    }

    #[test]
    fn test_group_records() {
        let codec = Codec::new(CwrVersion::V21);
        let grh = Record::GroupHeader(GroupHeader {
            transaction_type: "NWR".into(),
            group_id: 1,
            ..GroupHeader::default()
        });
        let line = codec.encode(&grh, Sequence::default()).line;
        assert_eq!(line, "GRHNWR0000102.100000000000  ");

        let grt = Record::GroupTrailer(GroupTrailer {
            group_id: 1,
            transaction_count: 2,
            record_count: 12,
            ..GroupTrailer::default()
        });
        let line = codec.encode(&grt, Sequence::default()).line;
        assert!(line.starts_with("GRT000010000000200000012"));
        assert_eq!(codec.decode(&line).record, grt);
    }

    #[test]
    fn test_trl_round_trip() {
        let codec = Codec::default();
        let record = Record::TransmissionTrailer(TransmissionTrailer {
            group_count: 1,
            transaction_count: 3,
            record_count: 20,
        });
        let line = codec.encode(&record, Sequence::default()).line;
        assert_eq!(line, "TRL000010000000300000020");
        assert_eq!(codec.decode(&line).record, record);
    }

    #[test]
    fn test_ack_and_msg_round_trip() {
        let codec = Codec::default();
        let ack = Record::Acknowledgement(Acknowledgement {
            creation_date: NaiveDate::from_ymd_opt(2024, 1, 2),
            creation_time: Hms::new(8, 0, 0),
            original_group_id: 1,
            original_transaction_sequence: 4,
            original_transaction_type: "NWR".into(),
            creation_title: "SONG".into(),
            submitter_creation_number: "W0001".into(),
            recipient_creation_number: "R123".into(),
            processing_date: NaiveDate::from_ymd_opt(2024, 2, 2),
            transaction_status: "AS".into(),
        });
        let line = codec.encode(&ack, Sequence::new(4, 0)).line;
        assert_eq!(line.len(), RecordType::Ack.max_width());
        assert_eq!(codec.decode(&line).record, ack);

        let msg = Record::Message(MessageRecord {
            message_type: "T".into(),
            original_record_sequence: 3,
            record_type: "SWR".into(),
            message_level: "E".into(),
            validation_number: "012".into(),
            text: "Writer not on file".into(),
        });
        let line = codec.encode(&msg, Sequence::new(4, 1)).line;
        assert_eq!(line.len(), RecordType::Msg.max_width());
        assert_eq!(codec.decode(&line).record, msg);
    }
}
