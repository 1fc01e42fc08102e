use super::{ShareTotals, ValidationReport};
use crate::catalog::{Catalog, TEMPORARY_IP_LIMIT};
use crate::identifiers::is_valid_ipi_name;
use crate::identity::IdentityResolver;
use crate::models::{Inclusion, Percentage, RoleClass, Share, Shareholder, Work};
use crate::territory::TERRITORIES;

/// 100% +/- 0.06%, in hundredths.
const TOTAL_MIN: u32 = 9_994;
const TOTAL_MAX: u32 = 10_006;

/// Cap on a publisher's performance collection share in any territory.
const PUBLISHER_PR_MAX: u32 = 5_000;

fn party_name(shareholder: &Shareholder) -> String {
    format!("{} {}", shareholder.name, shareholder.first_name).trim_end().to_string()
}

/// Check a work's shares and compute its ownership and collection totals.
pub fn validate_shares(work: &Work, catalog: &Catalog, identity: &dyn IdentityResolver) -> ValidationReport {
    let mut report = ValidationReport::default();
    let mut totals = ShareTotals::default();

    for share in &work.shares {
        let Some(shareholder) = catalog.shareholder(share.ip_number) else {
            report.totals = totals;
            return report.reject(format!(
                "Validation failed: interested party {:09} is not registered.",
                share.ip_number
            ));
        };
        let name = party_name(shareholder);

        if shareholder.controlled {
            let ipi_invalid = share.ip_number < TEMPORARY_IP_LIMIT
                || shareholder.ipi_name.is_some_and(|ipi| !is_valid_ipi_name(ipi));
            if ipi_invalid {
                report.totals = totals;
                return report.reject(format!(
                    "Validation failed: invalid IPI number for controlled writer {} ({:09}).",
                    name, share.ip_number
                ));
            }
            if identity.ipi_exists(shareholder.effective_ipi_name()) == Some(false) {
                report.totals = totals;
                return report.reject(format!(
                    "Validation failed: IPI number for controlled writer {} ({:09}) not found in database.",
                    name, share.ip_number
                ));
            }
        }

        totals.pr_ownership += share.pr_ownership;
        totals.mr_ownership += share.mr_ownership;
        totals.sr_ownership += share.sr_ownership;

        for (country, collection) in TERRITORIES.resolve(&share.territories) {
            if collection.is_zero() {
                report.totals = totals;
                return report.reject(format!(
                    "Validation failed: PR Collection Share, MR Collection Share, and SR Collection Share are all zero for {} ({:09}).",
                    name, share.ip_number
                ));
            }
            totals.collection.entry(country).or_default().accumulate(&collection);
        }

        let Some(role) = share.role else {
            report.totals = totals;
            return report.reject("Missing or invalid shareholder role!");
        };
        match role.class() {
            RoleClass::Publisher => {
                if !(share.pr_ownership + share.mr_ownership).is_zero() {
                    totals.publishers += 1;
                }
            }
            RoleClass::SubPublisher => totals.sub_publishers += 1,
            RoleClass::Writer => {
                totals.writers += 1;
                if shareholder.controlled {
                    totals.controlled_writers += 1;
                }
            }
            RoleClass::Arranger => totals.arrangers += 1,
            RoleClass::IncomeParticipant => {}
        }

        if role.is_publisher() {
            if let Some(message) = publisher_territory_problem(share, &name) {
                report.totals = totals;
                return report.reject(message);
            }
        }
    }

    report.totals = totals;
    let totals = &report.totals;

    if totals.writers < 1 {
        return report.reject("There must be at least one writer (Writer Designation Code = 'CA', 'A', 'C') in a work.");
    }
    if totals.controlled_writers < 1 {
        return report.reject("There must be at least one writer controlled by collecting submitter in a work.");
    }
    if work.header.version_type.trim() == "ORI" && totals.arrangers > 0 {
        return report.reject(
            "If Version Type is equal to 'ORI', there cannot be an SWR or OWR record that contains a Writer Designation Code equal to 'AR' (Arranger), 'AD': (Adapter), 'SR' (Sub-Arranger), 'SA' (Sub-Author), or 'TR' (Translator).",
        );
    }

    let ownership = [("PR", totals.pr_ownership), ("MR", totals.mr_ownership), ("SR", totals.sr_ownership)];
    for (rights, total) in ownership {
        if !total.is_zero() && !(TOTAL_MIN..=TOTAL_MAX).contains(&total.hundredths()) {
            return report.reject(format!("{} Ownership shares do not total zero or 100%.", rights));
        }
    }

    let exceeded = totals.collection.iter().find_map(|(country, c)| {
        [("PR", c.pr), ("MR", c.mr), ("SR", c.sr)]
            .into_iter()
            .find(|(_, share)| share.hundredths() > TOTAL_MAX)
            .map(|(rights, _)| (rights, country.clone()))
    });
    if let Some((rights, country)) = exceeded {
        return report.reject(format!(
            "{} Collection shares exceed 100% (+/- 0.06%) in territory '{}'.",
            rights, country
        ));
    }

    report
}

fn publisher_territory_problem(share: &Share, name: &str) -> Option<String> {
    for entry in share.territories.iter().filter(|t| t.indicator == Inclusion::Include) {
        let collection = &entry.collection;
        if collection.is_zero() {
            return Some(format!(
                "Validation failed: publisher {} ({:09}) declares no collection share in territory {}.",
                name, share.ip_number, entry.tis
            ));
        }
        if collection.pr.hundredths() > PUBLISHER_PR_MAX {
            return Some(format!(
                "Validation failed: PR Collection Share for publisher {} ({:09}) exceeds 50% in territory {}.",
                name, share.ip_number, entry.tis
            ));
        }
        if collection.mr.hundredths() > TOTAL_MAX || collection.sr.hundredths() > TOTAL_MAX {
            return Some(format!(
                "Validation failed: MR or SR Collection Share for publisher {} ({:09}) exceeds 100% in territory {}.",
                name, share.ip_number, entry.tis
            ));
        }
    }
    None
}

/// Performance ownership held by controlled parties.
pub fn percentage_controlled(work: &Work, catalog: &Catalog) -> Percentage {
    work.shares
        .iter()
        .filter(|share| catalog.shareholder(share.ip_number).is_some_and(|s| s.controlled))
        .map(|share| share.pr_ownership)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::WorkHandle;
    use crate::identity::{NoLookup, StaticDirectory};
    use crate::models::{CollectionShares, Role, TerritoryEntry};
    use crate::territory::WORLD;

    const WRITER: u64 = 100000002;
    const CO_WRITER: u64 = 100000003;
    const PUBLISHER: u64 = 100000010;

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.add_shareholder(Shareholder::new(WRITER, "SIMONE").with_first_name("NINA").controlled());
        catalog.add_shareholder(Shareholder::new(CO_WRITER, "DAVIS").with_first_name("MILES"));
        catalog.add_shareholder(Shareholder::new(PUBLISHER, "ACME MUSIC").controlled());
        catalog
    }

    fn world(pr: f64, mr: f64, sr: f64) -> TerritoryEntry {
        TerritoryEntry::include(WORLD, CollectionShares::new(pr, mr, sr))
    }

    fn work_with(catalog: &mut Catalog, shares: Vec<Share>) -> WorkHandle {
        let handle = catalog.add_work(Work::new("W1", "SONG"));
        for share in shares {
            catalog.add_share(handle, share).unwrap();
        }
        catalog.work_mut(handle).unwrap().header.version_type = "ORI".into();
        handle
    }

    fn check(catalog: &Catalog, handle: WorkHandle) -> ValidationReport {
        validate_shares(catalog.work(handle).unwrap(), catalog, &NoLookup)
    }

    #[test]
    fn test_minimal_valid_work() {
        let mut catalog = catalog();
        let handle = work_with(
            &mut catalog,
            vec![Share::new(WRITER, Role::ComposerAuthor)
                .with_ownership(100.0, 100.0, 0.0)
                .with_territory(world(100.0, 100.0, 0.0))],
        );
        let report = check(&catalog, handle);
        assert!(report.passed, "{:?}", report.diagnostics);
        assert_eq!(report.totals.writers, 1);
        assert_eq!(report.totals.controlled_writers, 1);
        assert_eq!(report.totals.pr_ownership, Percentage::FULL);
        assert_eq!(report.totals.collection["FR"].mr, Percentage::FULL);
    }

    #[test]
    fn test_ownership_imbalance_is_rejected() {
        let mut catalog = catalog();
        let handle = work_with(
            &mut catalog,
            vec![
                Share::new(WRITER, Role::Composer).with_ownership(40.0, 0.0, 0.0).with_territory(world(40.0, 0.0, 0.0)),
                Share::new(CO_WRITER, Role::Author).with_ownership(40.0, 0.0, 0.0).with_territory(world(40.0, 0.0, 0.0)),
            ],
        );
        let report = check(&catalog, handle);
        assert!(!report.passed);
        assert_eq!(report.failure(), Some("PR Ownership shares do not total zero or 100%."));
        assert_eq!(report.totals.pr_ownership.hundredths(), 8000);
    }

    #[test]
    fn test_ownership_tolerance() {
        for (total, passes) in [(99.94, true), (100.06, true), (99.93, false), (120.0, false)] {
            let mut catalog = catalog();
            let handle = work_with(
                &mut catalog,
                vec![
                    Share::new(WRITER, Role::Composer).with_ownership(50.0, 0.0, 0.0).with_territory(world(50.0, 0.0, 0.0)),
                    Share::new(CO_WRITER, Role::Author)
                        .with_ownership(total - 50.0, 0.0, 0.0)
                        .with_territory(world(40.0, 0.0, 0.0)),
                ],
            );
            assert_eq!(check(&catalog, handle).passed, passes, "total {}", total);
        }
    }

    #[test]
    fn test_collection_over_100_in_one_country() {
        let mut catalog = catalog();
        let handle = work_with(
            &mut catalog,
            vec![
                Share::new(WRITER, Role::Composer).with_ownership(50.0, 0.0, 0.0).with_territory(world(60.0, 0.0, 0.0)),
                Share::new(CO_WRITER, Role::Author)
                    .with_ownership(50.0, 0.0, 0.0)
                    .with_territory(TerritoryEntry::include(250, CollectionShares::new(50.0, 0.0, 0.0))),
            ],
        );
        let report = check(&catalog, handle);
        assert_eq!(report.failure(), Some("PR Collection shares exceed 100% (+/- 0.06%) in territory 'FR'."));
    }

    #[test]
    fn test_writer_rules() {
        let mut catalog = catalog();
        let handle = work_with(&mut catalog, vec![Share::new(CO_WRITER, Role::Composer).with_ownership(100.0, 0.0, 0.0)]);
        assert!(check(&catalog, handle).failure().unwrap().contains("controlled by collecting submitter"));

        let mut catalog = self::catalog();
        let handle = work_with(&mut catalog, vec![Share::new(PUBLISHER, Role::OriginalPublisher)]);
        assert!(check(&catalog, handle).failure().unwrap().contains("at least one writer"));

        let mut catalog = self::catalog();
        let handle = work_with(
            &mut catalog,
            vec![
                Share::new(WRITER, Role::Composer).with_ownership(100.0, 0.0, 0.0),
                Share::new(CO_WRITER, Role::Arranger),
            ],
        );
        assert!(check(&catalog, handle).failure().unwrap().starts_with("If Version Type is equal to 'ORI'"));
        catalog.work_mut(handle).unwrap().header.version_type = "MOD".into();
        assert!(check(&catalog, handle).passed);
    }

    #[test]
    fn test_missing_role() {
        let mut catalog = catalog();
        let mut share = Share::new(WRITER, Role::Composer);
        share.role = None;
        let handle = work_with(&mut catalog, vec![share]);
        assert_eq!(check(&catalog, handle).failure(), Some("Missing or invalid shareholder role!"));
    }

    #[test]
    fn test_controlled_ipi_checks() {
        let mut catalog = catalog();
        catalog.add_shareholder(Shareholder::new(12, "TEMP").controlled());
        let handle = work_with(&mut catalog, vec![Share::new(12, Role::Composer).with_ownership(100.0, 0.0, 0.0)]);
        assert!(check(&catalog, handle).failure().unwrap().contains("invalid IPI number"));

        let mut catalog = self::catalog();
        catalog.shareholder_mut(WRITER).unwrap().ipi_name = Some(12345678990);
        let handle = work_with(&mut catalog, vec![Share::new(WRITER, Role::Composer).with_ownership(100.0, 0.0, 0.0)]);
        assert!(check(&catalog, handle).failure().unwrap().contains("invalid IPI number"));

        catalog.shareholder_mut(WRITER).unwrap().ipi_name = Some(12345678993);
        assert!(check(&catalog, handle).passed);
        let directory = StaticDirectory::new().with_known_ipis([45678901221]);
        let report = validate_shares(catalog.work(handle).unwrap(), &catalog, &directory);
        assert!(report.failure().unwrap().contains("not found in database"));
    }

    #[test]
    fn test_publisher_collection_limits() {
        let writer = Share::new(WRITER, Role::ComposerAuthor)
            .with_ownership(50.0, 0.0, 0.0)
            .with_chain(1)
            .with_territory(world(50.0, 0.0, 0.0));

        let mut catalog = catalog();
        let publisher = Share::new(PUBLISHER, Role::OriginalPublisher)
            .with_ownership(50.0, 100.0, 0.0)
            .with_chain(1)
            .with_territory(world(50.0, 100.0, 0.0));
        let handle = work_with(&mut catalog, vec![publisher, writer.clone()]);
        let report = check(&catalog, handle);
        assert!(report.passed, "{:?}", report.diagnostics);
        assert_eq!(report.totals.publishers, 1);
        assert_eq!(percentage_controlled(catalog.work(handle).unwrap(), &catalog), Percentage::FULL);

        let mut catalog = self::catalog();
        let greedy = Share::new(PUBLISHER, Role::OriginalPublisher)
            .with_ownership(50.0, 100.0, 0.0)
            .with_territory(world(60.0, 100.0, 0.0));
        let handle = work_with(&mut catalog, vec![greedy, writer]);
        assert!(check(&catalog, handle).failure().unwrap().contains("exceeds 50%"));
    }
}
