use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::errors::TractError;
use crate::geometry::shell::VolumetricShell;
use crate::grid::tract::{OrbitZone, Tract};
use crate::store::{StoreCapabilities, StoreDocument, TractStore, ZoneReplacement};

/// Store persisted as a single JSON document.
///
/// Every mutation rewrites the file through a sibling temp file and a rename,
/// so readers see either the old or the new document. A failed write restores
/// the in-memory document as well.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    document: StoreDocument,
}

impl JsonStore {
    /// Open `path`, starting from an empty document if the file is missing.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, TractError> {
        let path = path.into();
        let document = if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            serde_json::from_reader(reader)?
        } else {
            log::debug!("No store at {}, starting empty", path.display());
            StoreDocument::default()
        };
        Ok(JsonStore { path, document })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn schema_version(&self) -> u32 {
        self.document.schema_version
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn persist(&self) -> Result<(), TractError> {
        let temp = self.temp_path();
        {
            let mut writer = BufWriter::new(File::create(&temp)?);
            serde_json::to_writer(&mut writer, &self.document)?;
            writer.flush()?;
        }
        fs::rename(&temp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&temp);
            TractError::Store(format!("replacing {}: {}", self.path.display(), e))
        })?;
        log::debug!("Wrote store {}", self.path.display());
        Ok(())
    }

    fn mutate<F>(&mut self, change: F) -> Result<ZoneReplacement, TractError>
    where
        F: FnOnce(&mut StoreDocument) -> Result<ZoneReplacement, TractError>,
    {
        let previous = self.document.clone();
        let outcome = change(&mut self.document).and_then(|replacement| {
            self.persist()?;
            Ok(replacement)
        });
        if outcome.is_err() {
            log::warn!("Rolling back store {}", self.path.display());
            self.document = previous;
        }
        outcome
    }
}

impl TractStore for JsonStore {
    fn capabilities(&self) -> StoreCapabilities {
        StoreCapabilities::for_schema(self.document.schema_version)
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
        self.mutate(|document| document.replace_zone(zone, tracts, shells))
    }

    fn remove_zone(&mut self, zone: OrbitZone) -> Result<ZoneReplacement, TractError> {
        self.mutate(|document| Ok(document.remove_zone(zone)))
    }
}
