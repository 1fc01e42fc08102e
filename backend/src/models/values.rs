//! Scalar value types with CWR fixed-point semantics.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

// =============================================================================
// Percentage
// =============================================================================

/// A share percentage with two implied decimals, stored in hundredths.
///
/// `Percentage::from_percent(33.33)` holds `3333`, which is also how it is
/// written in a 5-digit CWR share field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Percentage(u32);

impl Percentage {
    pub const ZERO: Percentage = Percentage(0);
    pub const FULL: Percentage = Percentage(10_000);

    pub const fn from_hundredths(hundredths: u32) -> Self {
        Self(hundredths)
    }

    /// Build from a human percentage (`50.0` is 50%).
    ///
    /// Values whose shifted form exceeds 100% are taken to be already shifted,
    /// so `5000.0` is also 50%.
    pub fn from_percent(value: f64) -> Self {
        let value = value.abs();
        let shifted = (value * 100.0).round();
        if shifted > 10_000.0 {
            Self(value.round() as u32)
        } else {
            Self(shifted as u32)
        }
    }

    pub const fn hundredths(self) -> u32 {
        self.0
    }

    pub fn as_percent(self) -> f64 {
        f64::from(self.0) / 100.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl Add for Percentage {
    type Output = Percentage;

    fn add(self, rhs: Self) -> Self::Output {
        Percentage(self.0 + rhs.0)
    }
}

impl AddAssign for Percentage {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sum for Percentage {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Percentage::ZERO, Add::add)
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for Percentage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_percent())
    }
}

impl<'de> Deserialize<'de> for Percentage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        f64::deserialize(deserializer).map(Percentage::from_percent)
    }
}

// =============================================================================
// Hms
// =============================================================================

/// A time of day or a duration, written `HHMMSS` in CWR.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hms {
    seconds: u32,
}

/// Largest value six `HHMMSS` digits can carry.
const HMS_MAX_SECONDS: u32 = 99 * 3600 + 59 * 60 + 59;

impl Hms {
    pub fn new(hours: u32, minutes: u32, seconds: u32) -> Option<Self> {
        if minutes > 59 || seconds > 59 {
            return None;
        }
        Self::from_seconds(hours * 3600 + minutes * 60 + seconds)
    }

    pub fn from_seconds(seconds: u32) -> Option<Self> {
        (seconds <= HMS_MAX_SECONDS).then_some(Self { seconds })
    }

    pub fn total_seconds(self) -> u32 {
        self.seconds
    }

    pub fn hours(self) -> u32 {
        self.seconds / 3600
    }

    pub fn minutes(self) -> u32 {
        self.seconds / 60 % 60
    }

    pub fn secs(self) -> u32 {
        self.seconds % 60
    }

    /// The six-digit `HHMMSS` form.
    pub fn to_cwr(self) -> String {
        format!("{:02}{:02}{:02}", self.hours(), self.minutes(), self.secs())
    }

    /// Parse `HHMMSS`.
    pub fn from_cwr(text: &str) -> Option<Self> {
        if text.len() != 6 || !text.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let part = |range: std::ops::Range<usize>| text[range].parse::<u32>().ok();
        Self::new(part(0..2)?, part(2..4)?, part(4..6)?)
    }

    /// Current wall-clock time.
    pub fn now() -> Self {
        use chrono::Timelike;
        let now = chrono::Local::now();
        Self { seconds: now.hour() * 3600 + now.minute() * 60 + now.second() }
    }
}

impl fmt::Display for Hms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hours(), self.minutes(), self.secs())
    }
}

impl FromStr for Hms {
    type Err = String;

    /// Accepts `HH:MM:SS` or `HHMMSS`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.trim().chars().filter(|c| *c != ':').collect();
        Hms::from_cwr(&compact).ok_or_else(|| format!("invalid time '{}'", s))
    }
}

impl Serialize for Hms {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Hms {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_from_percent() {
        assert_eq!(Percentage::from_percent(50.0).hundredths(), 5000);
        assert_eq!(Percentage::from_percent(33.33).hundredths(), 3333);
        assert_eq!(Percentage::from_percent(100.0), Percentage::FULL);
    }

    #[test]
    fn test_percentage_already_shifted() {
        assert_eq!(Percentage::from_percent(5000.0).hundredths(), 5000);
        assert_eq!(Percentage::from_percent(10000.0), Percentage::FULL);
    }

    #[test]
    fn test_percentage_sum_and_display() {
        let total: Percentage = [33.33, 33.33, 33.34].iter().map(|p| Percentage::from_percent(*p)).sum();
        assert_eq!(total, Percentage::FULL);
        assert_eq!(Percentage::from_hundredths(506).to_string(), "5.06%");
    }

    #[test]
    fn test_percentage_serde() {
        let p: Percentage = serde_json::from_str("12.5").unwrap();
        assert_eq!(p.hundredths(), 1250);
        assert_eq!(serde_json::to_string(&p).unwrap(), "12.5");
    }

    #[test]
    fn test_hms_round_trip() {
        let d = Hms::from_cwr("000345").unwrap();
        assert_eq!(d.total_seconds(), 225);
        assert_eq!(d.to_cwr(), "000345");
        assert_eq!(d.to_string(), "00:03:45");
        assert_eq!("00:03:45".parse::<Hms>().unwrap(), d);
    }

    #[test]
    fn test_hms_rejects_bad_values() {
        assert!(Hms::from_cwr("006100").is_none());
        assert!(Hms::from_cwr("12ab00").is_none());
        assert!(Hms::from_cwr("1200").is_none());
    }
}
