//! Zone regeneration and cleanup against a [`TractStore`].

use std::collections::BTreeMap;

use crate::config::GridConfig;
use crate::errors::{TractError, WorkCompleted};
use crate::geometry::shell::{FailureCategory, ShellGeometryBuilder};
use crate::grid::generator::TractGridGenerator;
use crate::grid::tract::OrbitZone;
use crate::store::{StoreSession, TractStore, ZoneReplacement};

#[derive(Debug, Clone, PartialEq)]
pub struct RegenerationReport {
    pub zone: OrbitZone,
    pub tracts_inserted: usize,
    pub tracts_skipped: usize,
    pub shells_inserted: usize,
    pub shell_failures: BTreeMap<FailureCategory, usize>,
    pub polar_skipped: usize,
    /// Rows removed from the previous generation of this zone.
    pub tracts_replaced: usize,
    pub shells_replaced: usize,
}

impl RegenerationReport {
    pub fn shell_failures_total(&self) -> usize {
        self.shell_failures.values().sum()
    }
}

/// Rebuild one zone from scratch.
///
/// The store's capabilities are checked before anything is generated. The old
/// rows of the zone are replaced by the new ones in a single commit; if that
/// commit fails the run aborts with the work completed so far and the store
/// keeps its previous contents.
pub fn regenerate_zone<S: TractStore + ?Sized>(
    store: &mut S,
    config: &GridConfig,
) -> Result<RegenerationReport, TractError> {
    let zone = config.zone;
    let mut session = StoreSession::open(store, zone)?;

    let generator = TractGridGenerator::new(config.clone())?;
    let generation = generator.generate();
    for skipped in &generation.skipped {
        log::debug!("[degenerate] {}: {}", skipped.id, skipped.reason);
    }
    log::info!(
        "Generated {} {} tracts ({} bins skipped)",
        generation.tracts_generated(),
        zone,
        generation.tracts_skipped()
    );

    let build = ShellGeometryBuilder::from_config(config).build_all(&generation.tracts);
    let shell_failures = build.failure_counts();
    for (category, count) in &shell_failures {
        log::warn!("{} shells failed as {}", count, category);
    }
    log::info!(
        "Built {} shells ({} polar tracts left without geometry)",
        build.shells_built(),
        build.polar_skipped.len()
    );

    let completed = WorkCompleted {
        tracts_generated: generation.tracts_generated(),
        shells_built: build.shells_built(),
        rows_written: 0,
    };
    let tracts_skipped = generation.tracts_skipped();
    let polar_skipped = build.polar_skipped.len();

    session.stage(generation.tracts, build.shells);
    let replaced: ZoneReplacement = session.commit().map_err(|e| {
        log::error!("Regeneration of {} aborted: {}", zone, e);
        TractError::RunAborted {
            completed,
            reason: e.to_string(),
        }
    })?;

    log::info!(
        "Replaced {} tracts / {} shells with {} tracts / {} shells in {}",
        replaced.tracts_removed,
        replaced.shells_removed,
        replaced.tracts_inserted,
        replaced.shells_inserted,
        zone
    );

    Ok(RegenerationReport {
        zone,
        tracts_inserted: replaced.tracts_inserted,
        tracts_skipped,
        shells_inserted: replaced.shells_inserted,
        shell_failures,
        polar_skipped,
        tracts_replaced: replaced.tracts_removed,
        shells_replaced: replaced.shells_removed,
    })
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanupReport {
    pub kept: Option<OrbitZone>,
    pub removed: BTreeMap<OrbitZone, ZoneReplacement>,
}

impl CleanupReport {
    pub fn tracts_removed(&self) -> usize {
        self.removed.values().map(|r| r.tracts_removed).sum()
    }

    pub fn shells_removed(&self) -> usize {
        self.removed.values().map(|r| r.shells_removed).sum()
    }
}

/// Delete the tracts and shells of every zone except `keep`.
pub fn retain_zone<S: TractStore + ?Sized>(
    store: &mut S,
    keep: OrbitZone,
) -> Result<CleanupReport, TractError> {
    let mut report = CleanupReport {
        kept: Some(keep),
        removed: BTreeMap::new(),
    };

    for zone in store.zones()? {
        if zone == keep {
            continue;
        }
        let removed = store.remove_zone(zone)?;
        log::info!(
            "Removed {} tracts and {} shells from {}",
            removed.tracts_removed,
            removed.shells_removed,
            zone
        );
        report.removed.insert(zone, removed);
    }

    if report.removed.is_empty() {
        log::info!("Nothing to clean up; only {} present", keep);
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreCapabilities};

    fn small_config(zone: OrbitZone) -> GridConfig {
        GridConfig {
            altitude_range: match zone {
                OrbitZone::Leo => (400.0, 500.0),
                _ => (2000.0, 2100.0),
            },
            inclination_range: (160.0, 180.0),
            raan_range: (0.0, 20.0),
            ..GridConfig::for_zone(zone)
        }
    }

    #[test]
    fn test_regeneration_counts() {
        let mut store = MemoryStore::new();
        let report = regenerate_zone(&mut store, &small_config(OrbitZone::Leo)).unwrap();

        // 2 altitude x 4 inclination x 4 RAAN bins; inclinations 170..180 are polar
        assert_eq!(report.tracts_inserted, 32);
        assert_eq!(report.tracts_skipped, 0);
        assert_eq!(report.polar_skipped, 16);
        assert_eq!(report.shells_inserted, 16);
        assert_eq!(report.shell_failures_total(), 0);
        assert_eq!(report.tracts_replaced, 0);
    }

    #[test]
    fn test_regeneration_replaces_previous_rows() {
        let mut store = MemoryStore::new();
        let config = small_config(OrbitZone::Leo);
        regenerate_zone(&mut store, &config).unwrap();
        let first: Vec<String> = store
            .load_tracts(OrbitZone::Leo)
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();

        let report = regenerate_zone(&mut store, &config).unwrap();
        assert_eq!(report.tracts_replaced, 32);
        assert_eq!(report.shells_replaced, 16);

        let second: Vec<String> = store
            .load_tracts(OrbitZone::Leo)
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_schema_check_runs_before_any_change() {
        let mut store = MemoryStore::with_capabilities(StoreCapabilities::for_schema(1));
        let err = regenerate_zone(&mut store, &small_config(OrbitZone::Leo)).unwrap_err();
        assert!(matches!(err, TractError::Schema(_)));
        assert!(store.zones().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_config_aborts() {
        let mut store = MemoryStore::new();
        let config = GridConfig {
            altitude_bin_width: 0.0,
            ..small_config(OrbitZone::Leo)
        };
        assert!(matches!(
            regenerate_zone(&mut store, &config),
            Err(TractError::Config(_))
        ));
    }

    #[test]
    fn test_retain_zone() {
        let mut store = MemoryStore::new();
        regenerate_zone(&mut store, &small_config(OrbitZone::Leo)).unwrap();
        regenerate_zone(&mut store, &small_config(OrbitZone::Meo)).unwrap();

        let report = retain_zone(&mut store, OrbitZone::Leo).unwrap();
        assert_eq!(report.tracts_removed(), 32);
        assert_eq!(report.shells_removed(), 16);
        assert_eq!(store.zones().unwrap(), vec![OrbitZone::Leo]);

        let again = retain_zone(&mut store, OrbitZone::Leo).unwrap();
        assert!(again.removed.is_empty());
    }
}
