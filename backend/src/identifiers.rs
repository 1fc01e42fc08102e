//! Checksum validators for the identifiers carried in CWR files.
//!
//! | Identifier | Shape | Check |
//! |---|---|---|
//! | IPI Name Number | 11 digits | modulo 101 over the first nine digits, weights 10..2 |
//! | IPI Base Number | `I-NNNNNNNNN-C` | weighted modulo 10, `I` counts as 2 |
//! | ISWC | `TNNNNNNNNNC` | weighted modulo 10, `T` counts as 1 |
//! | ISRC | `CCXXXYYNNNNN` | country prefix must be a known ISO or agency code |
//! | EAN-13 / UPC-A | 13 or 12 digits | alternating 1/3 weights |
//!
//! All validators are pure and never panic on malformed input.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::territory::TERRITORIES;

static IPI_BASE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^I-[0-9]{9}-[0-9]$").expect("valid IPI base regex"));

static ISWC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^T[0-9]{10}$").expect("valid ISWC regex"));

static ISRC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{2}[A-Z0-9]{3}[0-9]{7}$").expect("valid ISRC regex"));

/// ISRC prefixes that are not ISO 3166 countries.
///
/// TC is also Turks and Caicos, kept for the TuneCore allocation. CS and YU
/// were issued before those countries were dissolved.
pub const ISRC_AGENCY_PREFIXES: [&str; 6] = ["TC", "CP", "DG", "ZZ", "CS", "YU"];

/// Largest value an 11-digit IPI Name Number field can hold.
pub const IPI_NAME_MAX: u64 = 99_999_999_999;

// =============================================================================
// IPI Name Number
// =============================================================================

/// Modulo-101 check digits for the nine-digit body of an IPI Name Number.
pub fn ipi_name_check_digits(body: u64) -> u64 {
    let digits = format!("{:09}", body % 1_000_000_000);
    let sum: u64 = digits
        .bytes()
        .zip((2..=10u64).rev())
        .map(|(b, weight)| u64::from(b - b'0') * weight)
        .sum();

    match sum % 101 {
        0 | 1 => 0,
        cs => 101 - cs,
    }
}

/// Append the check digits to a nine-digit body.
pub fn ipi_name_from_body(body: u64) -> u64 {
    (body % 1_000_000_000) * 100 + ipi_name_check_digits(body)
}

/// Whether `number` is a valid 11-digit IPI Name Number.
///
/// Zero is never valid.
pub fn is_valid_ipi_name(number: u64) -> bool {
    if number == 0 || number > IPI_NAME_MAX {
        return false;
    }
    number % 100 == ipi_name_check_digits(number / 100)
}

/// Parse an IPI Name Number from text, ignoring surrounding spaces.
pub fn parse_ipi_name(text: &str) -> Option<u64> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.len() > 11 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse().ok()
}

// =============================================================================
// IPI Base Number
// =============================================================================

/// Whether `base` is a valid IPI Base Number. An empty value is valid.
pub fn is_valid_ipi_base(base: &str) -> bool {
    let base = base.trim();
    if base.is_empty() {
        return true;
    }
    if !IPI_BASE_RE.is_match(base) {
        return false;
    }

    let digits: Vec<u32> = base.bytes().filter(u8::is_ascii_digit).map(|b| u32::from(b - b'0')).collect();
    let sum = 2 + digits[..9]
        .iter()
        .enumerate()
        .map(|(i, d)| (i as u32 + 1) * d)
        .sum::<u32>();

    weighted_check_digit(sum) == digits[9]
}

// =============================================================================
// ISWC
// =============================================================================

/// Check digit for the nine-digit body of an ISWC.
pub fn iswc_check_digit(body: &str) -> Option<u32> {
    if body.len() != 9 || !body.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let sum = 1 + body
        .bytes()
        .enumerate()
        .map(|(i, b)| (i as u32 + 1) * u32::from(b - b'0'))
        .sum::<u32>();
    Some(weighted_check_digit(sum))
}

/// Strip the usual ISWC punctuation (`T-034.524.680-1` becomes `T0345246801`).
pub fn normalize_iswc(iswc: &str) -> String {
    iswc.chars()
        .filter(|c| !matches!(c, '-' | '.' | ' '))
        .flat_map(char::to_uppercase)
        .collect()
}

/// Whether `iswc` is valid after normalization.
pub fn is_valid_iswc(iswc: &str) -> bool {
    let iswc = normalize_iswc(iswc);
    if !ISWC_RE.is_match(&iswc) {
        return false;
    }
    let check = u32::from(iswc.as_bytes()[10] - b'0');
    iswc_check_digit(&iswc[1..10]) == Some(check)
}

fn weighted_check_digit(sum: u32) -> u32 {
    match sum % 10 {
        0 => 0,
        cs => 10 - cs,
    }
}

// =============================================================================
// ISRC
// =============================================================================

/// Strip a leading `ISRC` label, dashes and spaces, and uppercase.
pub fn normalize_isrc(isrc: &str) -> String {
    let upper = isrc.trim().to_uppercase();
    let body = upper.strip_prefix("ISRC").unwrap_or(&upper);
    body.chars().filter(|c| !matches!(c, '-' | ' ')).collect()
}

/// Whether `isrc` is a well-formed ISRC with a known country prefix.
pub fn is_valid_isrc(isrc: &str) -> bool {
    if !ISRC_RE.is_match(isrc) {
        return false;
    }
    let prefix = &isrc[..2];
    ISRC_AGENCY_PREFIXES.contains(&prefix) || TERRITORIES.is_country(prefix)
}

// =============================================================================
// EAN / UPC
// =============================================================================

/// Whether `code` is a valid EAN-13 or UPC-A (12 digits) product code.
pub fn is_valid_ean(code: &str) -> bool {
    let code = code.trim();
    if !(code.len() == 12 || code.len() == 13) || !code.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    let digits: Vec<u32> = code.bytes().map(|b| u32::from(b - b'0')).collect();
    let (body, check) = digits.split_at(digits.len() - 1);
    let tripled_parity = if digits.len() == 12 { 0 } else { 1 };
    let sum: u32 = body
        .iter()
        .enumerate()
        .map(|(i, d)| if i % 2 == tripled_parity { d * 3 } else { *d })
        .sum();

    (10 - sum % 10) % 10 == check[0]
}

/// Convert a 12-digit UPC-A into its EAN-13 form. Other input is returned trimmed.
pub fn upc_to_ean(code: &str) -> String {
    let code = code.trim();
    if code.len() == 12 && code.bytes().all(|b| b.is_ascii_digit()) {
        format!("0{}", code)
    } else {
        code.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ipi_name_known_values() {
        assert!(is_valid_ipi_name(12345678993));
        assert!(is_valid_ipi_name(2504612374));
        assert!(!is_valid_ipi_name(12345678994));
        assert!(!is_valid_ipi_name(0));
    }

    #[test]
    fn test_ipi_name_accepts_exactly_the_check_digits() {
        for body in [1u64, 25_046_123, 123_456_789, 456_789_012, 987_654_321] {
            let check = ipi_name_check_digits(body);
            for candidate in 0..100 {
                let number = body * 100 + candidate;
                assert_eq!(is_valid_ipi_name(number), candidate == check, "{}", number);
            }
        }
    }

    #[test]
    fn test_ipi_name_from_body() {
        assert_eq!(ipi_name_from_body(123_456_789), 12345678993);
        assert!(is_valid_ipi_name(ipi_name_from_body(350_000_000)));
    }

    #[test]
    fn test_parse_ipi_name() {
        assert_eq!(parse_ipi_name(" 00250461237 "), Some(250461237));
        assert_eq!(parse_ipi_name(""), None);
        assert_eq!(parse_ipi_name("12A"), None);
    }

    #[test]
    fn test_ipi_base() {
        assert!(is_valid_ipi_base(""));
        assert!(is_valid_ipi_base("I-000000229-7"));
        assert!(is_valid_ipi_base("I-123456789-3"));
        assert!(!is_valid_ipi_base("I-123456789-4"));
        assert!(!is_valid_ipi_base("123456789"));
    }

    #[test]
    fn test_iswc() {
        assert!(is_valid_iswc("T0345246801"));
        assert!(is_valid_iswc("T-034.524.680-1"));
        assert!(is_valid_iswc("T1234567894"));
        assert!(!is_valid_iswc("T1234567890"));
        assert!(!is_valid_iswc("X0345246801"));
        assert_eq!(normalize_iswc("t-034.524.680-1"), "T0345246801");
    }

    #[test]
    fn test_iswc_only_one_check_digit_valid() {
        let valid: Vec<u32> = (0..10)
            .filter(|d| is_valid_iswc(&format!("T070000003{}", d)))
            .collect();
        assert_eq!(valid, vec![8]);
    }

    #[test]
    fn test_isrc() {
        assert!(is_valid_isrc("USRC17607839"));
        assert!(is_valid_isrc("GBAYE0601498"));
        assert!(is_valid_isrc("ZZABC1234567"));
        assert!(!is_valid_isrc("QQRC17607839"));
        assert!(!is_valid_isrc("USRC1760783"));
        assert_eq!(normalize_isrc("ISRC US-RC1-76-07839"), "USRC17607839");
    }

    #[test]
    fn test_ean_and_upc() {
        assert!(is_valid_ean("4006381333931"));
        assert!(is_valid_ean("036000291452"));
        assert!(!is_valid_ean("4006381333932"));
        assert!(!is_valid_ean("40063813339"));
        assert_eq!(upc_to_ean("036000291452"), "0036000291452");
        assert!(is_valid_ean(&upc_to_ean("036000291452")));
    }
}
