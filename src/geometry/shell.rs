use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::GridConfig;
use crate::constants::{POLAR_EXCLUSION_INC_DEG, VOLUME_UNIT_SCALE};
use crate::errors::TractError;
use crate::geometry::polygon::Polygon;
use crate::grid::tract::{Tract, TractBounds};
use crate::utils::vector3d::Vector3D;

/// Why a tract ended up without a shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FailureCategory {
    Degenerate,
    Invalid,
    Empty,
    ZeroArea,
    Exception,
}

impl FailureCategory {
    pub fn of(error: &TractError) -> Self {
        match error {
            TractError::DegenerateBin { .. } => FailureCategory::Degenerate,
            TractError::InvalidGeometry { .. } => FailureCategory::Invalid,
            TractError::EmptyGeometry { .. } => FailureCategory::Empty,
            TractError::ZeroArea { .. } => FailureCategory::ZeroArea,
            _ => FailureCategory::Exception,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FailureCategory::Degenerate => "degenerate",
            FailureCategory::Invalid => "invalid",
            FailureCategory::Empty => "empty",
            FailureCategory::ZeroArea => "zero-area",
            FailureCategory::Exception => "exception",
        }
    }
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ring in (RAAN, inclination, altitude) parameter space, not geographic space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShellGeometry {
    pub polygon: Polygon,
    pub is_valid: bool,
}

/// Geometric realization of one tract.
///
/// `volume_estimate` is ring area × altitude thickness × a unit scale. It is an
/// order-of-magnitude figure for comparing tracts, not a physical volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumetricShell {
    pub tract_id: String,
    pub geometry: ShellGeometry,
    pub alt_min: f64,
    pub alt_max: f64,
    pub inc_min: f64,
    pub inc_max: f64,
    pub raan_min: f64,
    pub raan_max: f64,
    pub volume_estimate: f64,
    pub created_at: DateTime<Utc>,
}

impl VolumetricShell {
    pub fn bounds(&self) -> TractBounds {
        TractBounds {
            alt_min: self.alt_min,
            alt_max: self.alt_max,
            inc_min: self.inc_min,
            inc_max: self.inc_max,
            raan_min: self.raan_min,
            raan_max: self.raan_max,
        }
    }
}

#[derive(Debug)]
pub enum ShellOutcome {
    Built(VolumetricShell),
    /// Extreme polar band; intentionally left without geometry.
    PolarSkip,
    Failed(TractError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShellFailure {
    pub tract_id: String,
    pub category: FailureCategory,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct ShellBuildReport {
    pub shells: Vec<VolumetricShell>,
    pub failures: Vec<ShellFailure>,
    pub polar_skipped: Vec<String>,
}

impl ShellBuildReport {
    pub fn shells_built(&self) -> usize {
        self.shells.len()
    }

    pub fn failure_counts(&self) -> BTreeMap<FailureCategory, usize> {
        let mut counts = BTreeMap::new();
        for failure in &self.failures {
            *counts.entry(failure.category).or_insert(0) += 1;
        }
        counts
    }

    pub fn skipped_ids(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.tract_id.as_str()).collect()
    }
}

pub struct ShellGeometryBuilder {
    polar_exclusion_inc: f64,
    volume_unit_scale: f64,
}

impl Default for ShellGeometryBuilder {
    fn default() -> Self {
        ShellGeometryBuilder::new(POLAR_EXCLUSION_INC_DEG, VOLUME_UNIT_SCALE)
    }
}

impl ShellGeometryBuilder {
    pub fn new(polar_exclusion_inc: f64, volume_unit_scale: f64) -> Self {
        ShellGeometryBuilder {
            polar_exclusion_inc,
            volume_unit_scale,
        }
    }

    pub fn from_config(config: &GridConfig) -> Self {
        ShellGeometryBuilder::new(config.polar_exclusion_inc, config.volume_unit_scale)
    }

    pub fn build(&self, tract: &Tract, created_at: DateTime<Utc>) -> ShellOutcome {
        let bounds = tract.bounds();
        if let Some(reason) = bounds.degeneracy() {
            return ShellOutcome::Failed(TractError::DegenerateBin {
                id: tract.id.clone(),
                reason,
            });
        }
        if bounds.inc_min >= self.polar_exclusion_inc {
            return ShellOutcome::PolarSkip;
        }

        let polygon = match rectangle_ring(&bounds).and_then(|p| validate_polygon(&tract.id, p)) {
            Ok(polygon) => polygon,
            Err(e) => return ShellOutcome::Failed(e),
        };

        let volume_estimate = polygon.area() * bounds.altitude_thickness() * self.volume_unit_scale;
        ShellOutcome::Built(VolumetricShell {
            tract_id: tract.id.clone(),
            geometry: ShellGeometry {
                polygon,
                is_valid: true,
            },
            alt_min: bounds.alt_min,
            alt_max: bounds.alt_max,
            inc_min: bounds.inc_min,
            inc_max: bounds.inc_max,
            raan_min: bounds.raan_min,
            raan_max: bounds.raan_max,
            volume_estimate,
            created_at,
        })
    }

    /// Build every tract independently. A failing tract is recorded under its
    /// category and the batch moves on.
    pub fn build_all(&self, tracts: &[Tract]) -> ShellBuildReport {
        let created_at = Utc::now();
        let mut report = ShellBuildReport::default();

        for tract in tracts {
            match self.build(tract, created_at) {
                ShellOutcome::Built(shell) => report.shells.push(shell),
                ShellOutcome::PolarSkip => {
                    log::trace!("[polar] {}", tract.id);
                    report.polar_skipped.push(tract.id.clone());
                }
                ShellOutcome::Failed(e) => {
                    let category = FailureCategory::of(&e);
                    log::warn!("[{}] {}: {}", category, tract.id, e);
                    report.failures.push(ShellFailure {
                        tract_id: tract.id.clone(),
                        category,
                        reason: e.to_string(),
                    });
                }
            }
        }

        log::debug!(
            "Built {} shells from {} tracts ({} polar, {} failed)",
            report.shells.len(),
            tracts.len(),
            report.polar_skipped.len(),
            report.failures.len()
        );
        report
    }
}

/// Build shells with the default polar threshold and unit scale.
pub fn build_shells(tracts: &[Tract]) -> ShellBuildReport {
    ShellGeometryBuilder::default().build_all(tracts)
}

/// Corners of the tract's RAAN × inclination box at its altitude midpoint,
/// closed back onto the first corner.
fn rectangle_ring(bounds: &TractBounds) -> Result<Polygon, TractError> {
    let altitude = bounds.altitude_midpoint();
    Polygon::new(vec![
        Vector3D::new(bounds.raan_min, bounds.inc_min, altitude),
        Vector3D::new(bounds.raan_max, bounds.inc_min, altitude),
        Vector3D::new(bounds.raan_max, bounds.inc_max, altitude),
        Vector3D::new(bounds.raan_min, bounds.inc_max, altitude),
        Vector3D::new(bounds.raan_min, bounds.inc_min, altitude),
    ])
}

/// Orient the ring counter-clockwise and require it to be non-empty, valid and
/// of positive area.
pub fn validate_polygon(id: &str, polygon: Polygon) -> Result<Polygon, TractError> {
    let polygon = polygon.oriented_ccw();
    if polygon.is_empty() {
        return Err(TractError::EmptyGeometry { id: id.to_string() });
    }
    if let Err(reason) = polygon.validity() {
        return Err(TractError::InvalidGeometry {
            id: id.to_string(),
            reason,
        });
    }
    if !(polygon.area() > 0.0) {
        return Err(TractError::ZeroArea { id: id.to_string() });
    }
    Ok(polygon)
}
