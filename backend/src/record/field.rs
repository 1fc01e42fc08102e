//! Fixed-width field primitives shared by every record layout.
//!
//! [`LineWriter`] appends fields left to right, [`LineReader`] consumes them
//! in the same order. Both collect diagnostics instead of failing, so a bad
//! value never stops a line from being produced or read.

use chrono::NaiveDate;

use super::{RecordType, Sequence};
use crate::identifiers::{is_valid_ipi_name, parse_ipi_name};
use crate::logs::LogEntry;
use crate::models::{Hms, Percentage};

const DATE_FORMAT: &str = "%Y%m%d";

// =============================================================================
// Writer
// =============================================================================

/// Builds one fixed-width line.
#[derive(Debug)]
pub struct LineWriter {
    line: String,
    record_type: RecordType,
    sequence: Sequence,
    diagnostics: Vec<LogEntry>,
}

impl LineWriter {
    /// Start a line with its type tag and, for body records, the sequence prefix.
    pub fn new(record_type: RecordType, sequence: Sequence) -> Self {
        let mut line = String::with_capacity(record_type.max_width());
        line.push_str(record_type.tag());
        if record_type.has_prefix() {
            line.push_str(&format!("{:08}{:08}", sequence.transaction, sequence.record));
        }
        Self { line, record_type, sequence, diagnostics: Vec::new() }
    }

    fn context(&self) -> String {
        format!("(Txn {}, Seq {})", self.sequence.transaction, self.sequence.record)
    }

    fn warn(&mut self, message: String) {
        let entry = LogEntry::warning(format!("{}: {}", self.context(), message));
        self.diagnostics.push(entry);
    }

    /// Left-aligned text, space padded and truncated to `width` characters.
    pub fn text(&mut self, value: &str, width: usize) -> &mut Self {
        let mut count = 0;
        for c in value.chars().take(width) {
            self.line.push(c);
            count += 1;
        }
        self.line.extend(std::iter::repeat(' ').take(width - count));
        self
    }

    /// Text that must not be blank.
    pub fn required(&mut self, field: &str, value: &str, width: usize) -> &mut Self {
        if value.trim().is_empty() {
            let tag = self.record_type.tag();
            self.warn(format!("{} is mandatory in record type {}!", field, tag));
        }
        self.text(value, width)
    }

    /// Zero-padded number. Values too wide for the field are blanked.
    pub fn number(&mut self, field: &str, value: u64, width: usize) -> &mut Self {
        let max = 10u64.saturating_pow(width as u32) - 1;
        if value > max {
            self.warn(format!("{} exceeds maximum allowable value ({})!", field, max));
            return self.blank(width);
        }
        self.line.push_str(&format!("{:0width$}", value, width = width));
        self
    }

    /// Zero-padded number, or blanks when absent.
    pub fn optional_number(&mut self, field: &str, value: Option<u64>, width: usize) -> &mut Self {
        match value {
            Some(v) => self.number(field, v, width),
            None => self.blank(width),
        }
    }

    /// Three-digit society code, blank when absent or zero.
    pub fn society(&mut self, field: &str, value: Option<u16>) -> &mut Self {
        self.optional_number(field, value.filter(|v| *v > 0).map(u64::from), 3)
    }

    /// Five-digit percentage with two implied decimals.
    pub fn percentage(&mut self, field: &str, value: Percentage) -> &mut Self {
        self.number(field, u64::from(value.hundredths()), 5)
    }

    /// `YYYYMMDD`, blank when absent.
    pub fn date(&mut self, value: Option<NaiveDate>) -> &mut Self {
        match value {
            Some(d) => {
                let text = d.format(DATE_FORMAT).to_string();
                self.text(&text, 8)
            }
            None => self.blank(8),
        }
    }

    /// `HHMMSS`, blank when absent.
    pub fn hms(&mut self, value: Option<Hms>) -> &mut Self {
        match value {
            Some(t) => {
                let text = t.to_cwr();
                self.text(&text, 6)
            }
            None => self.blank(6),
        }
    }

    /// `Y`, `N`, or blank.
    pub fn flag(&mut self, value: Option<bool>) -> &mut Self {
        let code = match value {
            Some(true) => "Y",
            Some(false) => "N",
            None => "",
        };
        self.text(code, 1)
    }

    /// 11-digit IPI Name Number, blanked when zero or failing its checksum.
    pub fn ipi_name(&mut self, field: &str, value: Option<u64>) -> &mut Self {
        match value.filter(|v| *v > 0) {
            Some(v) if is_valid_ipi_name(v) => self.number(field, v, 11),
            Some(v) => {
                self.warn(format!("{} {:011} fails its check digits, replaced with spaces", field, v));
                self.blank(11)
            }
            None => self.blank(11),
        }
    }

    pub fn blank(&mut self, width: usize) -> &mut Self {
        self.line.extend(std::iter::repeat(' ').take(width));
        self
    }

    pub fn finish(self) -> (String, Vec<LogEntry>) {
        (self.line, self.diagnostics)
    }
}

// =============================================================================
// Reader
// =============================================================================

/// Consumes the fields of one fixed-width line.
#[derive(Debug)]
pub struct LineReader {
    chars: Vec<char>,
    pos: usize,
    record_type: String,
    sequence: Sequence,
    diagnostics: Vec<LogEntry>,
}

impl LineReader {
    /// Pad `line` to `width` so senders that trim trailing spaces still decode.
    pub fn new(line: &str, width: usize) -> Self {
        let mut chars: Vec<char> = line.chars().collect();
        if chars.len() < width {
            chars.resize(width, ' ');
        }
        let record_type: String = chars.iter().take(3).collect();
        Self {
            chars,
            pos: 0,
            record_type: record_type.trim().to_string(),
            sequence: Sequence::default(),
            diagnostics: Vec::new(),
        }
    }

    /// Consume the type tag and, when present, the sequence prefix.
    pub fn prefix(&mut self, has_sequence: bool) -> Sequence {
        self.skip(3);
        if has_sequence {
            let transaction = self.number("Transaction Sequence #", 8) as u32;
            let record = self.number("Record Sequence #", 8) as u32;
            self.sequence = Sequence { transaction, record };
        }
        self.sequence
    }

    fn warn(&mut self, message: String) {
        let entry = LogEntry::warning(format!(
            "{} (Txn {}, Seq {}): {}",
            self.record_type, self.sequence.transaction, self.sequence.record, message
        ));
        self.diagnostics.push(entry);
    }

    /// The next `width` characters, untrimmed.
    pub fn raw(&mut self, width: usize) -> String {
        let end = (self.pos + width).min(self.chars.len());
        let value: String = self.chars[self.pos..end].iter().collect();
        self.pos = end;
        value
    }

    pub fn skip(&mut self, width: usize) {
        self.pos = (self.pos + width).min(self.chars.len());
    }

    /// Trimmed text.
    pub fn text(&mut self, width: usize) -> String {
        self.raw(width).trim().to_string()
    }

    /// Number that defaults to zero when blank or malformed.
    pub fn number(&mut self, field: &str, width: usize) -> u64 {
        self.optional_number(field, width).unwrap_or(0)
    }

    /// Number, `None` when blank. Malformed values produce a diagnostic.
    pub fn optional_number(&mut self, field: &str, width: usize) -> Option<u64> {
        let raw = self.text(width);
        if raw.is_empty() {
            return None;
        }
        match raw.parse::<u64>() {
            Ok(v) if raw.bytes().all(|b| b.is_ascii_digit()) => Some(v),
            _ => {
                self.warn(format!("{} '{}' is not numeric", field, raw));
                None
            }
        }
    }

    /// Three-digit society code, `None` when blank or zero.
    pub fn society(&mut self, field: &str) -> Option<u16> {
        self.optional_number(field, 3).filter(|v| *v > 0).map(|v| v as u16)
    }

    pub fn percentage(&mut self, field: &str) -> Percentage {
        Percentage::from_hundredths(self.number(field, 5) as u32)
    }

    pub fn date(&mut self, field: &str) -> Option<NaiveDate> {
        let raw = self.text(8);
        if raw.is_empty() || raw.bytes().all(|b| b == b'0') {
            return None;
        }
        match NaiveDate::parse_from_str(&raw, DATE_FORMAT) {
            Ok(d) => Some(d),
            Err(_) => {
                self.warn(format!("{} '{}' is not a valid date", field, raw));
                None
            }
        }
    }

    pub fn hms(&mut self, field: &str) -> Option<Hms> {
        let raw = self.text(6);
        if raw.is_empty() {
            return None;
        }
        let parsed = Hms::from_cwr(&raw);
        if parsed.is_none() {
            self.warn(format!("{} '{}' is not a valid time", field, raw));
        }
        parsed
    }

    /// `Y` or `N`; anything else is `None`.
    pub fn flag(&mut self) -> Option<bool> {
        match self.text(1).as_str() {
            "Y" => Some(true),
            "N" => Some(false),
            _ => None,
        }
    }

    /// IPI Name Number. Values failing the checksum are dropped with a diagnostic.
    pub fn ipi_name(&mut self, field: &str) -> Option<u64> {
        let raw = self.text(11);
        if raw.is_empty() {
            return None;
        }
        match parse_ipi_name(&raw) {
            Some(0) => None,
            Some(v) if is_valid_ipi_name(v) => Some(v),
            _ => {
                self.warn(format!("{} '{}' is not a valid IPI Name Number", field, raw));
                None
            }
        }
    }

    pub fn into_diagnostics(self) -> Vec<LogEntry> {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_pads_and_truncates() {
        let mut w = LineWriter::new(RecordType::Alt, Sequence { transaction: 1, record: 2 });
        w.text("AB", 4).text("TOOLONG", 3);
        let (line, diagnostics) = w.finish();
        assert_eq!(line, "ALT0000000100000002AB  TOO");
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_writer_over_range_number_is_blanked() {
        let mut w = LineWriter::new(RecordType::Trl, Sequence::default());
        w.number("Group Count", 123456, 5);
        let (line, diagnostics) = w.finish();
        assert_eq!(line, "TRL     ");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("exceeds maximum allowable value"));
    }

    #[test]
    fn test_writer_blanks_bad_ipi() {
        let mut w = LineWriter::new(RecordType::Per, Sequence::default());
        w.ipi_name("IPI", Some(12345678994)).ipi_name("IPI", Some(12345678993));
        let (line, diagnostics) = w.finish();
        assert_eq!(&line[19..30], "           ");
        assert_eq!(&line[30..41], "12345678993");
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_writer_missing_required_field() {
        let mut w = LineWriter::new(RecordType::Alt, Sequence::default());
        w.required("Alternate Title", "", 60);
        let (_, diagnostics) = w.finish();
        assert!(diagnostics[0].message.contains("Alternate Title is mandatory in record type ALT"));
    }

    #[test]
    fn test_reader_pads_short_lines() {
        let mut r = LineReader::new("ALT0000000100000002AB", 30);
        let seq = r.prefix(true);
        assert_eq!(seq, Sequence { transaction: 1, record: 2 });
        assert_eq!(r.text(4), "AB");
        assert_eq!(r.text(5), "");
    }

    #[test]
    fn test_reader_non_numeric_count() {
        let mut r = LineReader::new("GRT0000100000X0100000003", 24);
        r.skip(3);
        assert_eq!(r.number("Group ID", 5), 1);
        assert_eq!(r.number("Transaction Count", 8), 0);
        let diagnostics = r.into_diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("not numeric"));
    }

    #[test]
    fn test_reader_dates_and_times() {
        let mut r = LineReader::new("20240229123456000000001999", 26);
        assert_eq!(r.date("Date"), NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(r.hms("Time").map(|t| t.to_cwr()), Some("123456".to_string()));
        assert_eq!(r.date("Blank Date"), None);
        assert_eq!(r.hms("Bad Time"), None);
        assert_eq!(r.into_diagnostics().len(), 1);
    }
}
