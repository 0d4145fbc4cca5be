use crate::errors::TractError;
use crate::geometry::shell::VolumetricShell;
use crate::grid::tract::{OrbitZone, Tract};
use crate::store::{StoreCapabilities, StoreDocument, TractStore, ZoneReplacement};

/// Volatile store backed by a [`StoreDocument`].
#[derive(Debug, Clone)]
pub struct MemoryStore {
    document: StoreDocument,
    capabilities: StoreCapabilities,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_capabilities(StoreCapabilities::full())
    }

    pub fn with_capabilities(capabilities: StoreCapabilities) -> Self {
        MemoryStore {
            document: StoreDocument::default(),
            capabilities,
        }
    }

    pub fn document(&self) -> &StoreDocument {
        &self.document
    }
}

impl TractStore for MemoryStore {
    fn capabilities(&self) -> StoreCapabilities {
        self.capabilities
    }

    fn zones(&self) -> Result<Vec<OrbitZone>, TractError> {
        Ok(self.document.zones.keys().copied().collect())
    }

    fn load_tracts(&self, zone: OrbitZone) -> Result<Vec<Tract>, TractError> {
        Ok(self
            .document
            .rows(zone)
            .map(|rows| rows.tracts.clone())
            .unwrap_or_default())
    }

    fn load_shells(&self, zone: OrbitZone) -> Result<Vec<VolumetricShell>, TractError> {
        Ok(self
            .document
            .rows(zone)
            .map(|rows| rows.shells.clone())
            .unwrap_or_default())
    }

    fn replace_zone(
        &mut self,
        zone: OrbitZone,
        tracts: Vec<Tract>,
        shells: Vec<VolumetricShell>,
    ) -> Result<ZoneReplacement, TractError> {
        self.document.replace_zone(zone, tracts, shells)
    }

    fn remove_zone(&mut self, zone: OrbitZone) -> Result<ZoneReplacement, TractError> {
        Ok(self.document.remove_zone(zone))
    }
}
