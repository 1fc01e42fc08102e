//! In-memory catalog of works, parties and recordings.
//!
//! The catalog is the shared model both directions work on: callers (or the
//! parser) populate it through the mutation calls below, the assembler reads
//! it. Every call that targets a work or a share takes an explicit handle.
//! For "act on the last thing I added" style code, see [`CatalogSession`].
//!
//! Business-rule problems found while mutating (an all-zero territory, a title
//! record without a title) are refused and recorded in the catalog's
//! [`MessageLog`]; only bad handles are `Err`.

mod session;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use session::CatalogSession;

use crate::error::{CatalogError, CatalogResult};
use crate::identifiers::normalize_isrc;
use crate::identity::IdentityResolver;
use crate::logs::MessageLog;
use crate::models::{
    Acknowledgement, AdditionalInfo, AlternateTitle, CrossReference, Inclusion, InstrumentDetail,
    Instrumentation, MessageRecord, Performer, Release, Share, Shareholder, TerritoryEntry,
    TitleKind, TitleRecord, Track, TransactionKind, Work, WorkOrigin,
};
use crate::record::{GroupHeader, GroupTrailer, TransmissionHeader, TransmissionTrailer};
use crate::vocabulary::TYPES_OF_RIGHT;

/// Party numbers below this are temporary and never written to a file.
pub const TEMPORARY_IP_LIMIT: u64 = 100_000_000;

/// 1-based position of a work in its catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkHandle(usize);

impl WorkHandle {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A share inside a work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShareHandle {
    pub work: WorkHandle,
    index: usize,
}

impl ShareHandle {
    /// 0-based position among the work's shares.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// File-level records seen while reading a transmission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Transmission {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<TransmissionHeader>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupHeader>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub group_trailers: Vec<GroupTrailer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trailer: Option<TransmissionTrailer>,
}

/// The catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Catalog {
    pub transmission: Transmission,
    works: Vec<Work>,
    shareholders: BTreeMap<u64, Shareholder>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    performers: Vec<Performer>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    tracks: BTreeMap<String, Track>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    releases: BTreeMap<String, Release>,
    #[serde(skip_serializing_if = "MessageLog::is_empty")]
    log: MessageLog,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut MessageLog {
        &mut self.log
    }

    // =========================================================================
    // Works
    // =========================================================================

    /// Append a work unconditionally.
    pub fn add_work(&mut self, work: Work) -> WorkHandle {
        self.works.push(work);
        WorkHandle(self.works.len())
    }

    /// Add a work, or merge it into the work with the same id.
    ///
    /// Merging OR-combines the transaction bits and takes the incoming
    /// header when it carries a title.
    pub fn register_work(&mut self, work: Work) -> WorkHandle {
        let Some(handle) = self.find_work(work.id()) else {
            return self.add_work(work);
        };
        let existing = &mut self.works[handle.0 - 1];
        existing.transaction |= work.transaction;
        if !work.header.title.is_empty() {
            existing.header = work.header;
        }
        handle
    }

    pub fn find_work(&self, id: &str) -> Option<WorkHandle> {
        let id = id.trim();
        if id.is_empty() {
            return None;
        }
        self.works.iter().position(|w| w.id() == id).map(|i| WorkHandle(i + 1))
    }

    pub fn work(&self, handle: WorkHandle) -> CatalogResult<&Work> {
        handle
            .0
            .checked_sub(1)
            .and_then(|i| self.works.get(i))
            .ok_or(CatalogError::UnknownWork(handle.0))
    }

    pub fn work_mut(&mut self, handle: WorkHandle) -> CatalogResult<&mut Work> {
        handle
            .0
            .checked_sub(1)
            .and_then(|i| self.works.get_mut(i))
            .ok_or(CatalogError::UnknownWork(handle.0))
    }

    /// Works in catalog order with their handles.
    pub fn works(&self) -> impl Iterator<Item = (WorkHandle, &Work)> {
        self.works.iter().enumerate().map(|(i, w)| (WorkHandle(i + 1), w))
    }

    pub fn work_count(&self) -> usize {
        self.works.len()
    }

    // =========================================================================
    // Shareholders and shares
    // =========================================================================

    /// Register a party. Returns `false` when the number is already known,
    /// in which case the existing record is kept as is.
    pub fn add_shareholder(&mut self, shareholder: Shareholder) -> bool {
        if self.shareholders.contains_key(&shareholder.ip_number) {
            return false;
        }
        if shareholder.ip_number < TEMPORARY_IP_LIMIT {
            self.log.warning(format!(
                "Warning: unidentified party {} (Temp IPI '{}' will be replaced with spaces)",
                shareholder.display_name(),
                shareholder.ip_number
            ));
        }
        self.shareholders.insert(shareholder.ip_number, shareholder);
        true
    }

    pub fn shareholder(&self, ip_number: u64) -> Option<&Shareholder> {
        self.shareholders.get(&ip_number)
    }

    pub fn shareholder_mut(&mut self, ip_number: u64) -> Option<&mut Shareholder> {
        self.shareholders.get_mut(&ip_number)
    }

    pub fn shareholders(&self) -> impl Iterator<Item = &Shareholder> {
        self.shareholders.values()
    }

    /// Party number for a writer with none: the identity strategy's answer,
    /// or one past the highest temporary number in use.
    pub fn synthetic_ip_number(
        &self,
        identity: &dyn IdentityResolver,
        last_name: &str,
        first_name: &str,
        society: Option<u16>,
    ) -> u64 {
        if let Some(ip) = identity.resolve_unknown_writer(last_name, first_name, society) {
            return ip;
        }
        self.shareholders.keys().copied().filter(|ip| *ip < TEMPORARY_IP_LIMIT).max().unwrap_or(0) + 1
    }

    /// Append a share. Its party must already be registered.
    pub fn add_share(&mut self, work: WorkHandle, share: Share) -> CatalogResult<ShareHandle> {
        if !self.shareholders.contains_key(&share.ip_number) {
            return Err(CatalogError::UnknownShareholder(share.ip_number));
        }
        let shares = &mut self.work_mut(work)?.shares;
        shares.push(share);
        Ok(ShareHandle { work, index: shares.len() - 1 })
    }

    pub fn share(&self, handle: ShareHandle) -> CatalogResult<&Share> {
        self.work(handle.work)?.shares.get(handle.index).ok_or(CatalogError::UnknownShare {
            work: handle.work.0,
            share: handle.index,
        })
    }

    pub fn share_mut(&mut self, handle: ShareHandle) -> CatalogResult<&mut Share> {
        self.work_mut(handle.work)?.shares.get_mut(handle.index).ok_or(CatalogError::UnknownShare {
            work: handle.work.0,
            share: handle.index,
        })
    }

    /// Handles of every share in a work, in order.
    pub fn share_handles(&self, work: WorkHandle) -> CatalogResult<Vec<ShareHandle>> {
        let count = self.work(work)?.shares.len();
        Ok((0..count).map(|index| ShareHandle { work, index }).collect())
    }

    /// Add or replace a territory entry. Include entries with no collection are refused.
    pub fn add_territory(&mut self, share: ShareHandle, entry: TerritoryEntry) -> CatalogResult<bool> {
        let target = self.share_mut(share)?;
        if entry.indicator == Inclusion::Include && entry.collection.is_zero() {
            let ip_number = target.ip_number;
            self.log.error(format!(
                "addTerritory: PR Collection Share, MR Collection Share, and SR Collection Share cannot all be zero for IPI {:09}.",
                ip_number
            ));
            return Ok(false);
        }
        target.upsert_territory(entry);
        Ok(true)
    }

    // =========================================================================
    // Work detail records
    // =========================================================================

    pub fn add_alternate_title(&mut self, work: WorkHandle, title: AlternateTitle) -> CatalogResult<()> {
        self.work_mut(work)?.alternate_titles.push(title);
        Ok(())
    }

    pub fn add_origin(&mut self, work: WorkHandle, origin: WorkOrigin) -> CatalogResult<()> {
        self.work_mut(work)?.origins.push(origin);
        Ok(())
    }

    pub fn add_instrumentation(&mut self, work: WorkHandle, instrumentation: Instrumentation) -> CatalogResult<()> {
        self.work_mut(work)?.instrumentation.push(instrumentation);
        Ok(())
    }

    pub fn add_instrument_detail(&mut self, work: WorkHandle, detail: InstrumentDetail) -> CatalogResult<()> {
        self.work_mut(work)?.instrument_details.push(detail);
        Ok(())
    }

    /// Set the COM, EWT or VER record. Records without a title are dropped.
    pub fn set_title(&mut self, work: WorkHandle, kind: TitleKind, record: TitleRecord) -> CatalogResult<bool> {
        let target = self.work_mut(work)?;
        if record.title.trim().is_empty() {
            let message = match kind {
                TitleKind::Component => "COM: No Title was entered - record dropped.",
                TitleKind::EntireWork => "EWT: Entire Work Title was missing - record dropped.",
                TitleKind::OriginalWork => "VER: Original Work Title was not entered.",
            };
            self.log.error(message);
            return Ok(false);
        }
        *target.title_record_mut(kind) = Some(record);
        Ok(true)
    }

    /// Add an ARI record after checking its mandatory combinations.
    pub fn add_additional_info(&mut self, work: WorkHandle, info: AdditionalInfo) -> CatalogResult<bool> {
        let target = self.work_mut(work)?;
        let problem = if info.society.is_none() {
            Some("ARI: Society # must be entered and must match an entry in the Society Code table or '000'.")
        } else if !TYPES_OF_RIGHT.contains(&info.type_of_right) {
            Some("ARI: Type of right must be entered and must be a valid right or 'ALL' for all.")
        } else if info.work_number.trim().is_empty() && info.note.trim().is_empty() {
            Some("ARI: Neither Work # or Note was entered.")
        } else if !info.note.trim().is_empty() && info.subject.trim().is_empty() {
            Some("ARI: Subject must be entered if Note is not blank, and must match an entry in the Subject table.")
        } else {
            None
        };
        if let Some(message) = problem {
            self.log.error(message);
            return Ok(false);
        }
        target.additional_info.push(info);
        Ok(true)
    }

    pub fn add_cross_reference(&mut self, work: WorkHandle, reference: CrossReference) -> CatalogResult<()> {
        self.work_mut(work)?.cross_references.push(reference);
        Ok(())
    }

    pub fn set_acknowledgement(&mut self, work: WorkHandle, acknowledgement: Acknowledgement) -> CatalogResult<()> {
        let target = self.work_mut(work)?;
        target.acknowledgement = Some(acknowledgement);
        target.transaction.insert(TransactionKind::ACK);
        Ok(())
    }

    pub fn add_message(&mut self, work: WorkHandle, message: MessageRecord) -> CatalogResult<()> {
        self.work_mut(work)?.messages.push(message);
        Ok(())
    }

    // =========================================================================
    // Performers and recordings
    // =========================================================================

    /// Register a performer, returning the index of the matching existing one if any.
    pub fn add_performer(&mut self, performer: Performer) -> usize {
        if let Some(index) = self.performers.iter().position(|p| p.same_as(&performer)) {
            return index;
        }
        self.performers.push(performer);
        self.performers.len() - 1
    }

    pub fn attach_performer(&mut self, work: WorkHandle, performer: usize) -> CatalogResult<()> {
        self.work_mut(work)?.performers.push(performer);
        Ok(())
    }

    pub fn performer(&self, index: usize) -> Option<&Performer> {
        self.performers.get(index)
    }

    pub fn performers(&self) -> &[Performer] {
        &self.performers
    }

    /// Add or merge a track, keyed by its normalized ISRC.
    pub fn add_track(&mut self, mut track: Track) -> String {
        let isrc = normalize_isrc(&track.isrc);
        track.isrc = isrc.clone();
        match self.tracks.get_mut(&isrc) {
            Some(existing) => existing.merge(track),
            None => {
                self.tracks.insert(isrc.clone(), track);
            }
        }
        isrc
    }

    /// Add or merge a release, keyed by EAN/UPC.
    pub fn add_release(&mut self, release: Release) -> String {
        let upc = release.upc.trim().to_string();
        match self.releases.get_mut(&upc) {
            Some(existing) => existing.merge(release),
            None => {
                self.releases.insert(upc.clone(), Release { upc: upc.clone(), ..release });
            }
        }
        upc
    }

    /// Link an ISRC to a work. Blank and repeated codes are ignored.
    pub fn add_isrc(&mut self, work: WorkHandle, isrc: &str) -> CatalogResult<()> {
        let isrc = normalize_isrc(isrc);
        let target = self.work_mut(work)?;
        if !isrc.is_empty() && !target.isrcs.contains(&isrc) {
            target.isrcs.push(isrc);
        }
        Ok(())
    }

    pub fn track(&self, isrc: &str) -> Option<&Track> {
        self.tracks.get(&normalize_isrc(isrc))
    }

    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    pub fn release(&self, upc: &str) -> Option<&Release> {
        self.releases.get(upc.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{NoLookup, StaticDirectory};
    use crate::models::{CollectionShares, Role, TransactionType};

    fn catalog_with_writer() -> (Catalog, WorkHandle) {
        let mut catalog = Catalog::new();
        catalog.add_shareholder(Shareholder::new(100000002, "SIMONE").with_first_name("NINA").controlled());
        let work = catalog.add_work(Work::new("W1", "SONG"));
        (catalog, work)
    }

    #[test]
    fn test_handles_are_one_based() {
        let (catalog, work) = catalog_with_writer();
        assert_eq!(work.index(), 1);
        assert_eq!(catalog.work(work).unwrap().id(), "W1");
        assert_eq!(catalog.work(WorkHandle(0)), Err(CatalogError::UnknownWork(0)));
        assert_eq!(catalog.work(WorkHandle(2)), Err(CatalogError::UnknownWork(2)));
    }

    #[test]
    fn test_register_work_merges_by_id() {
        let mut catalog = Catalog::new();
        let first = catalog.register_work(Work::new("W1", "SONG"));
        let mut revision = Work::new("W1", "SONG (NEW TITLE)");
        revision.transaction = TransactionType::Revision.bit();
        let second = catalog.register_work(revision);

        assert_eq!(first, second);
        assert_eq!(catalog.work_count(), 1);
        let work = catalog.work(first).unwrap();
        assert_eq!(work.title(), "SONG (NEW TITLE)");
        assert!(work.transaction.contains(TransactionKind::NWR));
        assert!(work.transaction.contains(TransactionKind::REV));
    }

    #[test]
    fn test_add_shareholder_is_idempotent() {
        let (mut catalog, _) = catalog_with_writer();
        assert!(!catalog.add_shareholder(Shareholder::new(100000002, "OTHER")));
        assert_eq!(catalog.shareholder(100000002).unwrap().name, "SIMONE");
        assert!(catalog.log().is_empty());

        assert!(catalog.add_shareholder(Shareholder::new(7, "UNKNOWN")));
        assert!(catalog.log().last_message().unwrap().contains("unidentified party"));
    }

    #[test]
    fn test_synthetic_ip_numbers() {
        let (mut catalog, _) = catalog_with_writer();
        assert_eq!(catalog.synthetic_ip_number(&NoLookup, "DOE", "JANE", None), 1);
        catalog.add_shareholder(Shareholder::new(41, "DOE"));
        assert_eq!(catalog.synthetic_ip_number(&NoLookup, "ROE", "JANE", None), 42);

        let directory = StaticDirectory::new().with_writer("ROE", "JANE", 100000099);
        assert_eq!(catalog.synthetic_ip_number(&directory, "ROE", "JANE", None), 100000099);
    }

    #[test]
    fn test_add_share_requires_registered_party() {
        let (mut catalog, work) = catalog_with_writer();
        let missing = catalog.add_share(work, Share::new(5, Role::Composer));
        assert_eq!(missing, Err(CatalogError::UnknownShareholder(5)));

        let share = catalog.add_share(work, Share::new(100000002, Role::ComposerAuthor)).unwrap();
        assert_eq!(share.index(), 0);
        assert_eq!(catalog.share(share).unwrap().role, Some(Role::ComposerAuthor));
    }

    #[test]
    fn test_add_territory_refuses_empty_include() {
        let (mut catalog, work) = catalog_with_writer();
        let share = catalog.add_share(work, Share::new(100000002, Role::ComposerAuthor)).unwrap();

        let refused = catalog.add_territory(share, TerritoryEntry::include(2136, CollectionShares::default()));
        assert_eq!(refused, Ok(false));
        assert!(catalog.log().has_errors());

        assert_eq!(catalog.add_territory(share, TerritoryEntry::exclude(250)), Ok(true));
        let accepted = catalog.add_territory(share, TerritoryEntry::include(2136, CollectionShares::new(50.0, 0.0, 0.0)));
        assert_eq!(accepted, Ok(true));
        assert_eq!(catalog.share(share).unwrap().territories.len(), 2);
    }

    #[test]
    fn test_set_title_requires_title() {
        let (mut catalog, work) = catalog_with_writer();
        assert_eq!(catalog.set_title(work, TitleKind::EntireWork, TitleRecord::default()), Ok(false));
        assert_eq!(catalog.log().last_message(), Some("EWT: Entire Work Title was missing - record dropped."));

        let record = TitleRecord { title: "SUITE".into(), ..TitleRecord::default() };
        assert_eq!(catalog.set_title(work, TitleKind::EntireWork, record), Ok(true));
        assert!(catalog.work(work).unwrap().entire_work.is_some());
    }

    #[test]
    fn test_additional_info_rules() {
        let (mut catalog, work) = catalog_with_writer();
        let valid = AdditionalInfo {
            society: Some(21),
            work_number: "123".into(),
            type_of_right: "PER".into(),
            ..AdditionalInfo::default()
        };
        assert_eq!(catalog.add_additional_info(work, valid.clone()), Ok(true));
        assert_eq!(catalog.add_additional_info(work, AdditionalInfo { society: None, ..valid.clone() }), Ok(false));
        assert_eq!(
            catalog.add_additional_info(work, AdditionalInfo { type_of_right: "XXX".into(), ..valid.clone() }),
            Ok(false)
        );
        assert_eq!(
            catalog.add_additional_info(work, AdditionalInfo { note: "late".into(), ..valid }),
            Ok(false)
        );
        assert_eq!(catalog.work(work).unwrap().additional_info.len(), 1);
    }

    #[test]
    fn test_performers_are_deduplicated() {
        let (mut catalog, work) = catalog_with_writer();
        let a = catalog.add_performer(Performer::new("SIMONE", "NINA"));
        let b = catalog.add_performer(Performer::new("Simone", "Nina"));
        let c = catalog.add_performer(Performer::new("DAVIS", "MILES"));
        assert_eq!(a, b);
        assert_ne!(a, c);
        catalog.attach_performer(work, a).unwrap();
        assert_eq!(catalog.work(work).unwrap().performers, vec![0]);
        assert_eq!(catalog.performers().len(), 2);
    }

    #[test]
    fn test_tracks_and_isrcs() {
        let (mut catalog, work) = catalog_with_writer();
        let key = catalog.add_track(Track::new("us-rc1-76-07839"));
        assert_eq!(key, "USRC17607839");
        catalog.add_track(Track { title: "SONG".into(), ..Track::new("USRC17607839") });
        assert_eq!(catalog.track("USRC17607839").unwrap().title, "SONG");

        catalog.add_isrc(work, "USRC17607839").unwrap();
        catalog.add_isrc(work, "US-RC1-76-07839").unwrap();
        catalog.add_isrc(work, "").unwrap();
        assert_eq!(catalog.work(work).unwrap().isrcs.len(), 1);
    }

    #[test]
    fn test_acknowledgement_sets_bit() {
        let (mut catalog, work) = catalog_with_writer();
        catalog.set_acknowledgement(work, Acknowledgement::default()).unwrap();
        assert!(catalog.work(work).unwrap().transaction.is_acknowledgement());
    }

    #[test]
    fn test_catalog_json_round_trip() {
        let (mut catalog, work) = catalog_with_writer();
        let share = catalog
            .add_share(work, Share::new(100000002, Role::ComposerAuthor).with_ownership(100.0, 100.0, 0.0))
            .unwrap();
        catalog
            .add_territory(share, TerritoryEntry::include(2136, CollectionShares::new(100.0, 100.0, 0.0)))
            .unwrap();
        let json = serde_json::to_string(&catalog).unwrap();
        let back: Catalog = serde_json::from_str(&json).unwrap();
        assert_eq!(back, catalog);
    }
}
