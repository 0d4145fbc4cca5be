use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    ALTITUDE_BIN_WIDTH_KM, ARC_SEGMENT_COUNT, DEFAULT_WORKERS, INCLINATION_BIN_WIDTH_DEG,
    INCLINATION_MAX_DEG, MAX_BINS_PER_AXIS, MAX_TRACTS_PER_ZONE, POLAR_EXCLUSION_INC_DEG,
    RAAN_BIN_WIDTH_DEG, RAAN_MAX_DEG, VOLUME_UNIT_SCALE,
};
use crate::errors::TractError;
use crate::grid::tract::OrbitZone;

/// Parameters for one zone's grid, shell build and validation run.
///
/// Deserializes through [`GridConfigFile`]: fields left out fall back to the
/// defaults of the zone that was read, so `{"zone": "MEO"}` gets the MEO
/// altitude range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "GridConfigFile")]
pub struct GridConfig {
    pub zone: OrbitZone,
    /// km
    pub altitude_range: (f64, f64),
    /// degrees
    pub inclination_range: (f64, f64),
    /// degrees
    pub raan_range: (f64, f64),
    pub altitude_bin_width: f64,
    pub inclination_bin_width: f64,
    pub raan_bin_width: f64,
    /// Slots in the fixed angular lookup that segment indices point into.
    pub segment_count: u32,
    /// Tracts whose lower inclination bound reaches this get no shell.
    pub polar_exclusion_inc: f64,
    pub volume_unit_scale: f64,
    pub workers: usize,
}

/// A config file as written: every field optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfigFile {
    pub zone: Option<OrbitZone>,
    pub altitude_range: Option<(f64, f64)>,
    pub inclination_range: Option<(f64, f64)>,
    pub raan_range: Option<(f64, f64)>,
    pub altitude_bin_width: Option<f64>,
    pub inclination_bin_width: Option<f64>,
    pub raan_bin_width: Option<f64>,
    pub segment_count: Option<u32>,
    pub polar_exclusion_inc: Option<f64>,
    pub volume_unit_scale: Option<f64>,
    pub workers: Option<usize>,
}

impl GridConfigFile {
    pub fn read(path: &Path) -> Result<Self, TractError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Fill the gaps from the zone's defaults and validate.
    pub fn into_config(self) -> Result<GridConfig, TractError> {
        let config = GridConfig::from(self);
        config.validate()?;
        Ok(config)
    }
}

impl From<GridConfigFile> for GridConfig {
    fn from(file: GridConfigFile) -> Self {
        let defaults = GridConfig::for_zone(file.zone.unwrap_or(OrbitZone::Leo));
        GridConfig {
            zone: defaults.zone,
            altitude_range: file.altitude_range.unwrap_or(defaults.altitude_range),
            inclination_range: file.inclination_range.unwrap_or(defaults.inclination_range),
            raan_range: file.raan_range.unwrap_or(defaults.raan_range),
            altitude_bin_width: file.altitude_bin_width.unwrap_or(defaults.altitude_bin_width),
            inclination_bin_width: file
                .inclination_bin_width
                .unwrap_or(defaults.inclination_bin_width),
            raan_bin_width: file.raan_bin_width.unwrap_or(defaults.raan_bin_width),
            segment_count: file.segment_count.unwrap_or(defaults.segment_count),
            polar_exclusion_inc: file
                .polar_exclusion_inc
                .unwrap_or(defaults.polar_exclusion_inc),
            volume_unit_scale: file.volume_unit_scale.unwrap_or(defaults.volume_unit_scale),
            workers: file.workers.unwrap_or(defaults.workers),
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig::for_zone(OrbitZone::Leo)
    }
}

impl GridConfig {
    pub fn for_zone(zone: OrbitZone) -> Self {
        GridConfig {
            zone,
            altitude_range: zone.default_altitude_range(),
            inclination_range: (0.0, INCLINATION_MAX_DEG),
            raan_range: (0.0, RAAN_MAX_DEG),
            altitude_bin_width: ALTITUDE_BIN_WIDTH_KM,
            inclination_bin_width: INCLINATION_BIN_WIDTH_DEG,
            raan_bin_width: RAAN_BIN_WIDTH_DEG,
            segment_count: ARC_SEGMENT_COUNT,
            polar_exclusion_inc: POLAR_EXCLUSION_INC_DEG,
            volume_unit_scale: VOLUME_UNIT_SCALE,
            workers: DEFAULT_WORKERS,
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self, TractError> {
        GridConfigFile::read(path)?.into_config()
    }

    /// Width in degrees of one angular lookup slot.
    pub fn segment_span(&self) -> f64 {
        RAAN_MAX_DEG / self.segment_count as f64
    }

    pub fn validate(&self) -> Result<(), TractError> {
        check_range("altitude", self.altitude_range, 0.0, f64::MAX)?;
        check_range("inclination", self.inclination_range, 0.0, INCLINATION_MAX_DEG)?;
        check_range("RAAN", self.raan_range, 0.0, RAAN_MAX_DEG)?;

        let axes = [
            ("altitude", self.altitude_range, self.altitude_bin_width),
            ("inclination", self.inclination_range, self.inclination_bin_width),
            ("RAAN", self.raan_range, self.raan_bin_width),
        ];
        let mut total: usize = 1;
        for (axis, range, width) in axes {
            if !(width > 0.0) || !width.is_finite() {
                return Err(TractError::Config(format!(
                    "{} bin width must be positive, got {}",
                    axis, width
                )));
            }
            let bins = ((range.1 - range.0) / width).ceil();
            if !(bins <= MAX_BINS_PER_AXIS as f64) {
                return Err(TractError::Config(format!(
                    "{} axis would need {} bins, limit is {}",
                    axis, bins, MAX_BINS_PER_AXIS
                )));
            }
            total = total.saturating_mul(bins as usize);
        }
        if total > MAX_TRACTS_PER_ZONE {
            return Err(TractError::Config(format!(
                "grid would hold {} tracts, limit is {}",
                total, MAX_TRACTS_PER_ZONE
            )));
        }

        if self.segment_count == 0 {
            return Err(TractError::Config("segment count must be > 0".to_string()));
        }
        if self.workers == 0 {
            return Err(TractError::Config("workers must be > 0".to_string()));
        }
        if !(self.volume_unit_scale > 0.0) || !self.volume_unit_scale.is_finite() {
            return Err(TractError::Config(format!(
                "volume unit scale must be positive, got {}",
                self.volume_unit_scale
            )));
        }
        Ok(())
    }
}

fn check_range(axis: &str, range: (f64, f64), floor: f64, ceiling: f64) -> Result<(), TractError> {
    let (min, max) = range;
    if !min.is_finite() || !max.is_finite() || !(min < max) || min < floor || max > ceiling {
        return Err(TractError::Config(format!(
            "{} range {}..{} must be finite, increasing and within {}..{}",
            axis, min, max, floor, ceiling
        )));
    }
    Ok(())
}
