//! Cursor-style access to a [`Catalog`].

use super::{Catalog, ShareHandle, WorkHandle};
use crate::error::{CatalogError, CatalogResult};
use crate::models::{
    Acknowledgement, AdditionalInfo, AlternateTitle, CrossReference, InstrumentDetail,
    Instrumentation, MessageRecord, Performer, Share, Shareholder, TerritoryEntry, TitleKind,
    TitleRecord, Work, WorkOrigin,
};

/// Borrows a catalog and remembers the current work and share.
///
/// Adding a work selects it, and so does adding a share. Every
/// "current" call fails with [`CatalogError::NothingSelected`] until
/// something has been selected.
pub struct CatalogSession<'c> {
    catalog: &'c mut Catalog,
    work: Option<WorkHandle>,
    share: Option<ShareHandle>,
}

impl<'c> CatalogSession<'c> {
    pub fn new(catalog: &'c mut Catalog) -> Self {
        Self { catalog, work: None, share: None }
    }

    pub fn catalog(&self) -> &Catalog {
        self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut Catalog {
        self.catalog
    }

    pub fn select_work(&mut self, work: WorkHandle) -> CatalogResult<()> {
        self.catalog.work(work)?;
        self.work = Some(work);
        self.share = None;
        Ok(())
    }

    pub fn select_share(&mut self, share: ShareHandle) -> CatalogResult<()> {
        self.catalog.share(share)?;
        self.work = Some(share.work);
        self.share = Some(share);
        Ok(())
    }

    pub fn current_work(&self) -> CatalogResult<WorkHandle> {
        self.work.ok_or(CatalogError::NothingSelected("work"))
    }

    pub fn current_share(&self) -> CatalogResult<ShareHandle> {
        self.share.ok_or(CatalogError::NothingSelected("share"))
    }

    pub fn register_work(&mut self, work: Work) -> WorkHandle {
        let handle = self.catalog.register_work(work);
        self.work = Some(handle);
        self.share = None;
        handle
    }

    pub fn add_shareholder(&mut self, shareholder: Shareholder) -> bool {
        self.catalog.add_shareholder(shareholder)
    }

    pub fn add_share(&mut self, share: Share) -> CatalogResult<ShareHandle> {
        let handle = self.catalog.add_share(self.current_work()?, share)?;
        self.share = Some(handle);
        Ok(handle)
    }

    pub fn add_territory(&mut self, entry: TerritoryEntry) -> CatalogResult<bool> {
        let share = self.current_share()?;
        self.catalog.add_territory(share, entry)
    }

    pub fn add_alternate_title(&mut self, title: AlternateTitle) -> CatalogResult<()> {
        let work = self.current_work()?;
        self.catalog.add_alternate_title(work, title)
    }

    pub fn add_origin(&mut self, origin: WorkOrigin) -> CatalogResult<()> {
        let work = self.current_work()?;
        self.catalog.add_origin(work, origin)
    }

    pub fn add_instrumentation(&mut self, instrumentation: Instrumentation) -> CatalogResult<()> {
        let work = self.current_work()?;
        self.catalog.add_instrumentation(work, instrumentation)
    }

    pub fn add_instrument_detail(&mut self, detail: InstrumentDetail) -> CatalogResult<()> {
        let work = self.current_work()?;
        self.catalog.add_instrument_detail(work, detail)
    }

    pub fn set_title(&mut self, kind: TitleKind, record: TitleRecord) -> CatalogResult<bool> {
        let work = self.current_work()?;
        self.catalog.set_title(work, kind, record)
    }

    pub fn add_additional_info(&mut self, info: AdditionalInfo) -> CatalogResult<bool> {
        let work = self.current_work()?;
        self.catalog.add_additional_info(work, info)
    }

    pub fn add_cross_reference(&mut self, reference: CrossReference) -> CatalogResult<()> {
        let work = self.current_work()?;
        self.catalog.add_cross_reference(work, reference)
    }

    /// Register a performer and attach it to the current work.
    pub fn add_performer(&mut self, performer: Performer) -> CatalogResult<usize> {
        let work = self.current_work()?;
        let index = self.catalog.add_performer(performer);
        self.catalog.attach_performer(work, index)?;
        Ok(index)
    }

    pub fn add_isrc(&mut self, isrc: &str) -> CatalogResult<()> {
        let work = self.current_work()?;
        self.catalog.add_isrc(work, isrc)
    }

    pub fn set_acknowledgement(&mut self, acknowledgement: Acknowledgement) -> CatalogResult<()> {
        let work = self.current_work()?;
        self.catalog.set_acknowledgement(work, acknowledgement)
    }

    pub fn add_message(&mut self, message: MessageRecord) -> CatalogResult<()> {
        let work = self.current_work()?;
        self.catalog.add_message(work, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CollectionShares, Role};

    #[test]
    fn test_nothing_selected() {
        let mut catalog = Catalog::new();
        let mut session = CatalogSession::new(&mut catalog);
        assert_eq!(session.current_work(), Err(CatalogError::NothingSelected("work")));
        assert_eq!(
            session.add_territory(TerritoryEntry::exclude(250)),
            Err(CatalogError::NothingSelected("share"))
        );
        assert!(session.add_alternate_title(AlternateTitle::default()).is_err());
    }

    #[test]
    fn test_session_follows_last_added() {
        let mut catalog = Catalog::new();
        let mut session = CatalogSession::new(&mut catalog);
        session.add_shareholder(Shareholder::new(100000002, "SIMONE").controlled());
        session.add_shareholder(Shareholder::new(100000003, "DAVIS").controlled());

        let first = session.register_work(Work::new("W1", "ONE"));
        let a = session.add_share(Share::new(100000002, Role::Composer).with_ownership(50.0, 0.0, 0.0)).unwrap();
        session
            .add_territory(TerritoryEntry::include(2136, CollectionShares::new(50.0, 0.0, 0.0)))
            .unwrap();
        let b = session.add_share(Share::new(100000003, Role::Author).with_ownership(50.0, 0.0, 0.0)).unwrap();
        assert_eq!(session.current_share(), Ok(b));

        let second = session.register_work(Work::new("W2", "TWO"));
        assert_ne!(first, second);
        assert!(session.current_share().is_err());
        session.add_performer(Performer::new("SIMONE", "NINA")).unwrap();

        session.select_share(a).unwrap();
        assert_eq!(session.current_work(), Ok(first));
        session.add_territory(TerritoryEntry::exclude(250)).unwrap();

        let catalog = session.catalog();
        assert_eq!(catalog.share(a).unwrap().territories.len(), 2);
        assert!(catalog.share(b).unwrap().territories.is_empty());
        assert_eq!(catalog.work(second).unwrap().performers, vec![0]);
    }

    #[test]
    fn test_select_rejects_unknown_handles() {
        let mut other = Catalog::new();
        let foreign = other.add_work(Work::new("W9", "ELSEWHERE"));
        other.add_work(Work::new("W10", "ELSEWHERE TOO"));
        let foreign_two = other.find_work("W10").unwrap();

        let mut catalog = Catalog::new();
        let mut session = CatalogSession::new(&mut catalog);
        session.register_work(Work::new("W1", "ONE"));
        assert!(session.select_work(foreign).is_ok());
        assert_eq!(session.select_work(foreign_two), Err(CatalogError::UnknownWork(2)));
    }
}
