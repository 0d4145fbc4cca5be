use chrono::{DateTime, Utc};

use crate::config::GridConfig;
use crate::errors::TractError;
use crate::grid::tract::{tract_id, OrbitZone, Tract, TractBounds};

/// A candidate bin that was not turned into a tract.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedBin {
    pub id: String,
    pub reason: String,
}

/// Output of one grid generation run for a single zone.
#[derive(Debug, Clone)]
pub struct GridGeneration {
    pub zone: OrbitZone,
    pub tracts: Vec<Tract>,
    pub skipped: Vec<SkippedBin>,
}

impl GridGeneration {
    pub fn tracts_generated(&self) -> usize {
        self.tracts.len()
    }

    pub fn tracts_skipped(&self) -> usize {
        self.skipped.len()
    }
}

/// Splits the (altitude, inclination, RAAN) domain of one zone into
/// fixed-width bins and emits the cartesian product as tracts.
pub struct TractGridGenerator {
    config: GridConfig,
}

impl TractGridGenerator {
    pub fn new(config: GridConfig) -> Result<Self, TractError> {
        config.validate()?;
        Ok(TractGridGenerator { config })
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn generate(&self) -> GridGeneration {
        self.generate_at(Utc::now())
    }

    /// Same bins in the same order for the same config; only `created_at` varies.
    pub fn generate_at(&self, created_at: DateTime<Utc>) -> GridGeneration {
        let config = &self.config;
        let altitude_bins = bins(config.altitude_range, config.altitude_bin_width);
        let inclination_bins = bins(config.inclination_range, config.inclination_bin_width);
        let raan_bins = bins(config.raan_range, config.raan_bin_width);
        let segment_span = config.segment_span();

        let capacity = altitude_bins.len() * inclination_bins.len() * raan_bins.len();
        let mut tracts = Vec::with_capacity(capacity);
        let mut skipped = Vec::new();

        for &(alt_min, alt_max) in &altitude_bins {
            for &(inc_min, inc_max) in &inclination_bins {
                for &(raan_min, raan_max) in &raan_bins {
                    let bounds = TractBounds {
                        alt_min,
                        alt_max,
                        inc_min,
                        inc_max,
                        raan_min,
                        raan_max,
                    };
                    match bounds.degeneracy() {
                        Some(reason) => skipped.push(SkippedBin {
                            id: tract_id(config.zone, &bounds),
                            reason,
                        }),
                        None => tracts.push(Tract::new(
                            config.zone,
                            bounds,
                            segment_span,
                            created_at,
                        )),
                    }
                }
            }
        }

        GridGeneration {
            zone: config.zone,
            tracts,
            skipped,
        }
    }
}

/// Generate the grid for `zone` with the given altitude span and bin widths,
/// keeping every other setting at its default.
pub fn generate_tracts(
    zone: OrbitZone,
    altitude_range: (f64, f64),
    altitude_bin_width: f64,
    inclination_bin_width: f64,
    raan_bin_width: f64,
) -> Result<GridGeneration, TractError> {
    let config = GridConfig {
        altitude_range,
        altitude_bin_width,
        inclination_bin_width,
        raan_bin_width,
        ..GridConfig::for_zone(zone)
    };
    Ok(TractGridGenerator::new(config)?.generate())
}

/// Half-open steps of `width` from `range.0`, the last one clipped to `range.1`.
/// Bounds are computed from the step index so error does not accumulate.
fn bins(range: (f64, f64), width: f64) -> Vec<(f64, f64)> {
    let (start, end) = range;
    let count = ((end - start) / width).ceil() as usize;
    (0..count)
        .map(|i| {
            let min = start + i as f64 * width;
            let max = (start + (i + 1) as f64 * width).min(end);
            (min, max)
        })
        .collect()
}
