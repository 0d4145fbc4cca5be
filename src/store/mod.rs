//! Persistence boundary for tracts and shells.
//!
//! Rows are grouped per zone. A zone is always replaced as a whole, through a
//! [`StoreSession`] that either commits or leaves the store untouched.

pub mod json;
pub mod memory;

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::errors::TractError;
use crate::geometry::shell::VolumetricShell;
use crate::grid::tract::{OrbitZone, Tract};

pub use json::JsonStore;
pub use memory::MemoryStore;

pub const SCHEMA_VERSION: u32 = 2;

/// Columns a store can hold. Checked once when a session opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreCapabilities {
    pub segment_indices: bool,
    pub shell_geometry: bool,
    pub volume_estimate: bool,
}

impl StoreCapabilities {
    pub fn full() -> Self {
        StoreCapabilities {
            segment_indices: true,
            shell_geometry: true,
            volume_estimate: true,
        }
    }

    /// Capabilities implied by an on-disk schema version.
    pub fn for_schema(version: u32) -> Self {
        StoreCapabilities {
            segment_indices: version >= 1,
            shell_geometry: version >= 1,
            volume_estimate: version >= 2,
        }
    }

    pub fn require_full(&self) -> Result<(), TractError> {
        let missing: Vec<&str> = [
            ("segment indices", self.segment_indices),
            ("shell geometry", self.shell_geometry),
            ("volume estimate", self.volume_estimate),
        ]
        .iter()
        .filter(|(_, present)| !present)
        .map(|(name, _)| *name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(TractError::Schema(format!(
                "store cannot hold: {}",
                missing.join(", ")
            )))
        }
    }
}

/// Row counts touched by a zone replacement or removal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZoneReplacement {
    pub tracts_removed: usize,
    pub shells_removed: usize,
    pub tracts_inserted: usize,
    pub shells_inserted: usize,
}

pub trait TractStore {
    fn capabilities(&self) -> StoreCapabilities;

    fn zones(&self) -> Result<Vec<OrbitZone>, TractError>;

    fn load_tracts(&self, zone: OrbitZone) -> Result<Vec<Tract>, TractError>;

    fn load_shells(&self, zone: OrbitZone) -> Result<Vec<VolumetricShell>, TractError>;

    /// Delete every row of `zone`, then insert the given rows. Must not leave
    /// a partially replaced zone behind on failure.
    fn replace_zone(
        &mut self,
        zone: OrbitZone,
        tracts: Vec<Tract>,
        shells: Vec<VolumetricShell>,
    ) -> Result<ZoneReplacement, TractError>;

    fn remove_zone(&mut self, zone: OrbitZone) -> Result<ZoneReplacement, TractError>;
}

/// All rows of one zone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneRows {
    pub tracts: Vec<Tract>,
    pub shells: Vec<VolumetricShell>,
}

/// Whole-store contents, shared by the in-memory and file stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreDocument {
    pub schema_version: u32,
    pub zones: BTreeMap<OrbitZone, ZoneRows>,
}

impl Default for StoreDocument {
    fn default() -> Self {
        StoreDocument {
            schema_version: SCHEMA_VERSION,
            zones: BTreeMap::new(),
        }
    }
}

impl StoreDocument {
    pub fn replace_zone(
        &mut self,
        zone: OrbitZone,
        tracts: Vec<Tract>,
        shells: Vec<VolumetricShell>,
    ) -> Result<ZoneReplacement, TractError> {
        if let Some(stray) = tracts.iter().find(|t| t.zone != zone) {
            return Err(TractError::Store(format!(
                "tract {} belongs to {}, not {}",
                stray.id, stray.zone, zone
            )));
        }
        if let Some(degenerate) = tracts.iter().find(|t| t.is_degenerate()) {
            return Err(TractError::Store(format!(
                "refusing to persist degenerate tract {}",
                degenerate.id
            )));
        }

        let tract_ids: HashSet<&str> = tracts.iter().map(|t| t.id.as_str()).collect();
        let mut shelled: HashSet<&str> = HashSet::with_capacity(shells.len());
        for shell in &shells {
            if !tract_ids.contains(shell.tract_id.as_str()) {
                return Err(TractError::Store(format!(
                    "shell {} has no tract in this replacement",
                    shell.tract_id
                )));
            }
            if !shelled.insert(shell.tract_id.as_str()) {
                return Err(TractError::Store(format!(
                    "tract {} has more than one shell",
                    shell.tract_id
                )));
            }
            if let Some(reason) = shell.bounds().degeneracy() {
                return Err(TractError::Store(format!(
                    "refusing to persist degenerate shell {}: {}",
                    shell.tract_id, reason
                )));
            }
        }

        let previous = self.zones.remove(&zone).unwrap_or_default();
        let replacement = ZoneReplacement {
            tracts_removed: previous.tracts.len(),
            shells_removed: previous.shells.len(),
            tracts_inserted: tracts.len(),
            shells_inserted: shells.len(),
        };
        self.zones.insert(zone, ZoneRows { tracts, shells });
        Ok(replacement)
    }

    pub fn remove_zone(&mut self, zone: OrbitZone) -> ZoneReplacement {
        let previous = self.zones.remove(&zone).unwrap_or_default();
        ZoneReplacement {
            tracts_removed: previous.tracts.len(),
            shells_removed: previous.shells.len(),
            ..ZoneReplacement::default()
        }
    }

    pub fn rows(&self, zone: OrbitZone) -> Option<&ZoneRows> {
        self.zones.get(&zone)
    }
}

/// Scoped write access to one zone.
///
/// Opening checks the store's capabilities. Staged rows reach the store only
/// through [`StoreSession::commit`]; dropping the session without committing
/// discards them.
pub struct StoreSession<'s, S: TractStore + ?Sized> {
    store: &'s mut S,
    zone: OrbitZone,
    tracts: Vec<Tract>,
    shells: Vec<VolumetricShell>,
    committed: bool,
}

impl<'s, S: TractStore + ?Sized> StoreSession<'s, S> {
    pub fn open(store: &'s mut S, zone: OrbitZone) -> Result<Self, TractError> {
        store.capabilities().require_full()?;
        Ok(StoreSession {
            store,
            zone,
            tracts: Vec::new(),
            shells: Vec::new(),
            committed: false,
        })
    }

    pub fn stage(&mut self, tracts: Vec<Tract>, shells: Vec<VolumetricShell>) {
        self.tracts = tracts;
        self.shells = shells;
    }

    pub fn commit(mut self) -> Result<ZoneReplacement, TractError> {
        let tracts = std::mem::take(&mut self.tracts);
        let shells = std::mem::take(&mut self.shells);
        let replacement = self.store.replace_zone(self.zone, tracts, shells)?;
        self.committed = true;
        Ok(replacement)
    }
}

impl<S: TractStore + ?Sized> Drop for StoreSession<'_, S> {
    fn drop(&mut self) {
        if !self.committed {
            log::warn!(
                "Session for {} closed without commit; {} staged tracts discarded",
                self.zone,
                self.tracts.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::shell::build_shells;
    use crate::grid::tract::TractBounds;
    use chrono::Utc;

    fn tract(zone: OrbitZone, alt_min: f64) -> Tract {
        Tract::new(
            zone,
            TractBounds {
                alt_min,
                alt_max: alt_min + 50.0,
                inc_min: 45.0,
                inc_max: 50.0,
                raan_min: 90.0,
                raan_max: 95.0,
            },
            1.0,
            Utc::now(),
        )
    }

    #[test]
    fn test_capability_check() {
        assert!(StoreCapabilities::full().require_full().is_ok());
        let err = StoreCapabilities::for_schema(1).require_full().unwrap_err();
        assert!(err.to_string().contains("volume estimate"));
    }

    #[test]
    fn test_document_replaces_whole_zone() {
        let mut document = StoreDocument::default();
        let first = vec![tract(OrbitZone::Leo, 400.0), tract(OrbitZone::Leo, 450.0)];
        let shells = build_shells(&first).shells;
        document
            .replace_zone(OrbitZone::Leo, first, shells)
            .unwrap();

        let replacement = document
            .replace_zone(OrbitZone::Leo, vec![tract(OrbitZone::Leo, 500.0)], Vec::new())
            .unwrap();
        assert_eq!(replacement.tracts_removed, 2);
        assert_eq!(replacement.shells_removed, 2);
        assert_eq!(replacement.tracts_inserted, 1);
        assert_eq!(document.rows(OrbitZone::Leo).unwrap().tracts.len(), 1);
    }

    #[test]
    fn test_document_rejects_foreign_and_degenerate_rows() {
        let mut document = StoreDocument::default();
        assert!(document
            .replace_zone(OrbitZone::Leo, vec![tract(OrbitZone::Meo, 400.0)], Vec::new())
            .is_err());

        let mut flat = tract(OrbitZone::Leo, 500.0);
        flat.alt_max = flat.alt_min;
        assert!(document
            .replace_zone(OrbitZone::Leo, vec![flat], Vec::new())
            .is_err());
        assert!(document.rows(OrbitZone::Leo).is_none());
    }

    #[test]
    fn test_document_rejects_orphan_and_degenerate_shells() {
        let mut document = StoreDocument::default();
        let kept = vec![tract(OrbitZone::Leo, 400.0)];
        let other = vec![tract(OrbitZone::Leo, 450.0)];

        let orphan = build_shells(&other).shells;
        let err = document
            .replace_zone(OrbitZone::Leo, kept.clone(), orphan)
            .unwrap_err();
        assert!(err.to_string().contains("no tract"));

        let mut doubled = build_shells(&kept).shells;
        doubled.push(doubled[0].clone());
        assert!(document
            .replace_zone(OrbitZone::Leo, kept.clone(), doubled)
            .is_err());

        let mut flat = build_shells(&kept).shells;
        flat[0].inc_max = flat[0].inc_min;
        assert!(document
            .replace_zone(OrbitZone::Leo, kept.clone(), flat)
            .is_err());

        assert!(document.rows(OrbitZone::Leo).is_none());
        let shells = build_shells(&kept).shells;
        assert!(document.replace_zone(OrbitZone::Leo, kept, shells).is_ok());
    }

    #[test]
    fn test_uncommitted_session_leaves_store_untouched() {
        let mut store = MemoryStore::new();
        {
            let mut session = StoreSession::open(&mut store, OrbitZone::Leo).unwrap();
            session.stage(vec![tract(OrbitZone::Leo, 400.0)], Vec::new());
        }
        assert!(store.load_tracts(OrbitZone::Leo).unwrap().is_empty());

        let mut session = StoreSession::open(&mut store, OrbitZone::Leo).unwrap();
        session.stage(vec![tract(OrbitZone::Leo, 400.0)], Vec::new());
        session.commit().unwrap();
        assert_eq!(store.load_tracts(OrbitZone::Leo).unwrap().len(), 1);
    }

    #[test]
    fn test_session_refuses_incapable_store() {
        let mut store = MemoryStore::with_capabilities(StoreCapabilities::for_schema(1));
        assert!(matches!(
            StoreSession::open(&mut store, OrbitZone::Leo),
            Err(TractError::Schema(_))
        ));
    }
}
