use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{
    GEO_ALTITUDE_MAX_KM, LEO_ALTITUDE_MAX_KM, LEO_ALTITUDE_MIN_KM, MEO_ALTITUDE_MAX_KM,
};
use crate::errors::TractError;
use crate::satellite::state::ParameterPoint;

/// Orbital regime a tract belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OrbitZone {
    #[serde(rename = "LEO")]
    Leo,
    #[serde(rename = "MEO")]
    Meo,
    #[serde(rename = "GEO")]
    Geo,
}

impl OrbitZone {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrbitZone::Leo => "LEO",
            OrbitZone::Meo => "MEO",
            OrbitZone::Geo => "GEO",
        }
    }

    /// Altitude span (km) the zone's grid covers by default.
    pub fn default_altitude_range(&self) -> (f64, f64) {
        match self {
            OrbitZone::Leo => (LEO_ALTITUDE_MIN_KM, LEO_ALTITUDE_MAX_KM),
            OrbitZone::Meo => (LEO_ALTITUDE_MAX_KM, MEO_ALTITUDE_MAX_KM),
            OrbitZone::Geo => (MEO_ALTITUDE_MAX_KM, GEO_ALTITUDE_MAX_KM),
        }
    }
}

impl fmt::Display for OrbitZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrbitZone {
    type Err = TractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LEO" => Ok(OrbitZone::Leo),
            "MEO" => Ok(OrbitZone::Meo),
            "GEO" => Ok(OrbitZone::Geo),
            other => Err(TractError::Config(format!("unknown orbit zone {:?}", other))),
        }
    }
}

/// Closed box in (altitude km, inclination °, RAAN °) parameter space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TractBounds {
    pub alt_min: f64,
    pub alt_max: f64,
    pub inc_min: f64,
    pub inc_max: f64,
    pub raan_min: f64,
    pub raan_max: f64,
}

impl TractBounds {
    /// Why the box has no interior, if it has none. NaN bounds count as degenerate.
    pub fn degeneracy(&self) -> Option<String> {
        let axes = [
            ("altitude", self.alt_min, self.alt_max),
            ("inclination", self.inc_min, self.inc_max),
            ("RAAN", self.raan_min, self.raan_max),
        ];
        axes.iter()
            .find(|(_, min, max)| !(max > min))
            .map(|(axis, min, max)| format!("{} bounds {}..{} are inverted or empty", axis, min, max))
    }

    pub fn is_degenerate(&self) -> bool {
        self.degeneracy().is_some()
    }

    pub fn altitude_midpoint(&self) -> f64 {
        (self.alt_min + self.alt_max) / 2.0
    }

    pub fn altitude_thickness(&self) -> f64 {
        self.alt_max - self.alt_min
    }

    /// Inclusive range test on all three axes. The RAAN coordinate is tried as
    /// v, v + 360 and v - 360; the first candidate inside the bounds is returned.
    pub fn contains(&self, point: &ParameterPoint) -> Option<f64> {
        let inside = |v: f64, min: f64, max: f64| v >= min && v <= max;
        if !inside(point.altitude, self.alt_min, self.alt_max)
            || !inside(point.inclination, self.inc_min, self.inc_max)
        {
            return None;
        }
        [point.raan, point.raan + 360.0, point.raan - 360.0]
            .into_iter()
            .find(|&raan| inside(raan, self.raan_min, self.raan_max))
    }
}

/// One cell of the parameter-space grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tract {
    pub id: String,
    pub alt_min: f64,
    pub alt_max: f64,
    pub inc_min: f64,
    pub inc_max: f64,
    pub raan_min: f64,
    pub raan_max: f64,
    pub zone: OrbitZone,
    pub segment_start_idx: u32,
    pub segment_end_idx: u32,
    pub created_at: DateTime<Utc>,
}

impl Tract {
    /// Build a tract from its bounds. `segment_span` is the width in degrees of
    /// one slot of the fixed angular lookup.
    pub fn new(
        zone: OrbitZone,
        bounds: TractBounds,
        segment_span: f64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Tract {
            id: tract_id(zone, &bounds),
            alt_min: bounds.alt_min,
            alt_max: bounds.alt_max,
            inc_min: bounds.inc_min,
            inc_max: bounds.inc_max,
            raan_min: bounds.raan_min,
            raan_max: bounds.raan_max,
            zone,
            segment_start_idx: (bounds.raan_min / segment_span).floor() as u32,
            segment_end_idx: (bounds.raan_max / segment_span).floor() as u32,
            created_at,
        }
    }

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

    pub fn is_degenerate(&self) -> bool {
        self.bounds().is_degenerate()
    }
}

/// Deterministic id: the same zone and bounds always give the same string.
pub fn tract_id(zone: OrbitZone, bounds: &TractBounds) -> String {
    format!(
        "{}-A{}-I{}-RAAN{}_{}",
        zone, bounds.alt_min, bounds.inc_min, bounds.raan_min, bounds.raan_max
    )
}
