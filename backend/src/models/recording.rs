//! Recording metadata: tracks keyed by ISRC, releases keyed by EAN/UPC, performers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Hms;

/// A sound recording, linked to works by ISRC or by work id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Track {
    pub isrc: String,
    /// Submitter work id this recording realises.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub work_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub iswc: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version_title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub artist_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub label_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<Hms>,
    /// Submitter recording identifier.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub track_id: String,
    /// EAN/UPC codes of the releases carrying this track.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub releases: Vec<String>,
}

impl Track {
    pub fn new(isrc: impl Into<String>) -> Self {
        Self { isrc: isrc.into(), ..Self::default() }
    }

    /// Fill blank fields from `other`, and append its release codes.
    pub fn merge(&mut self, other: Track) {
        fn fill(target: &mut String, source: String) {
            if target.is_empty() {
                *target = source;
            }
        }
        fill(&mut self.work_id, other.work_id);
        fill(&mut self.iswc, other.iswc);
        fill(&mut self.title, other.title);
        fill(&mut self.version_title, other.version_title);
        fill(&mut self.artist_name, other.artist_name);
        fill(&mut self.label_name, other.label_name);
        fill(&mut self.track_id, other.track_id);
        if self.duration.is_none() {
            self.duration = other.duration;
        }
        for release in other.releases {
            if !self.releases.contains(&release) {
                self.releases.push(release);
            }
        }
    }
}

/// A product (album, single) carrying tracks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Release {
    /// EAN-13 or UPC-A.
    pub upc: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub label_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub catalog_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub media_type: String,
}

impl Release {
    pub fn merge(&mut self, other: Release) {
        if self.title.is_empty() {
            self.title = other.title;
        }
        if self.label_name.is_empty() {
            self.label_name = other.label_name;
        }
        if self.catalog_number.is_empty() {
            self.catalog_number = other.catalog_number;
        }
        if self.release_date.is_none() {
            self.release_date = other.release_date;
        }
        if self.media_type.is_empty() {
            self.media_type = other.media_type;
        }
    }
}

/// A performing artist (PER).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Performer {
    pub last_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipi_name: Option<u64>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ipi_base: String,
}

impl Performer {
    pub fn new(last_name: impl Into<String>, first_name: impl Into<String>) -> Self {
        Self { last_name: last_name.into(), first_name: first_name.into(), ..Self::default() }
    }

    /// Same artist: equal non-zero IPI, or equal names when either IPI is missing.
    pub fn same_as(&self, other: &Performer) -> bool {
        match (self.ipi_name.filter(|n| *n > 0), other.ipi_name.filter(|n| *n > 0)) {
            (Some(a), Some(b)) => a == b,
            _ => {
                self.last_name.eq_ignore_ascii_case(&other.last_name)
                    && self.first_name.eq_ignore_ascii_case(&other.first_name)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_merge_fills_blanks() {
        let mut track = Track { title: "Kept".into(), ..Track::new("USRC17607839") };
        track.merge(Track {
            title: "Ignored".into(),
            artist_name: "Band".into(),
            releases: vec!["4006381333931".into()],
            ..Track::new("USRC17607839")
        });
        assert_eq!(track.title, "Kept");
        assert_eq!(track.artist_name, "Band");
        assert_eq!(track.releases, vec!["4006381333931".to_string()]);
    }

    #[test]
    fn test_performer_identity() {
        let a = Performer::new("Simone", "Nina");
        let b = Performer::new("SIMONE", "nina");
        assert!(a.same_as(&b));

        let with_ipi = Performer { ipi_name: Some(12345678993), ..a.clone() };
        let other_ipi = Performer { ipi_name: Some(45678901221), ..a.clone() };
        assert!(!with_ipi.same_as(&other_ipi));
        assert!(with_ipi.same_as(&b));
    }
}
