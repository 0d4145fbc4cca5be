use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::TractError;
use crate::transform::coordinates::{normalize_degrees, GeodeticPosition};
use crate::transform::tle::TwoLineElement;

/// A location in tract parameter space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterPoint {
    /// km
    pub altitude: f64,
    /// degrees
    pub inclination: f64,
    /// degrees; not required to lie in [0, 360)
    pub raan: f64,
}

/// Element triple used for tract lookup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitalElements {
    pub inclination: f64,
    pub raan: f64,
    /// Semi-major axis minus the spherical Earth radius, km.
    pub altitude: f64,
}

/// Where a satellite's parameter point came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointSource {
    Elements,
    /// RAAN approximated from the propagated longitude.
    LongitudeProxy,
}

/// Read-only snapshot of a satellite at one epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SatelliteState {
    pub id: String,
    pub name: String,
    pub epoch: DateTime<Utc>,
    pub elements: Option<OrbitalElements>,
    pub position: Option<GeodeticPosition>,
    /// Inclination reported alongside a propagated position.
    pub propagated_inclination: Option<f64>,
}

impl SatelliteState {
    pub fn from_elements(
        id: impl Into<String>,
        name: impl Into<String>,
        epoch: DateTime<Utc>,
        elements: OrbitalElements,
    ) -> Self {
        SatelliteState {
            id: id.into(),
            name: name.into(),
            epoch,
            elements: Some(elements),
            position: None,
            propagated_inclination: None,
        }
    }

    /// Mean-element state straight from a TLE; no propagation involved.
    pub fn from_tle(tle: &TwoLineElement) -> Result<Self, TractError> {
        let elements = tle.elements()?;
        Ok(SatelliteState::from_elements(
            elements.norad_id.to_string(),
            tle.name.clone(),
            elements.epoch,
            OrbitalElements {
                inclination: elements.inclination,
                raan: elements.raan,
                altitude: elements.mean_altitude_km(),
            },
        ))
    }

    /// The point to test against tracts. Elements win when present; otherwise
    /// a propagated fix with an inclination is used, with the longitude in
    /// [0, 360) standing in for RAAN.
    pub fn parameter_point(&self) -> Option<(ParameterPoint, PointSource)> {
        if let Some(elements) = self.elements {
            let point = ParameterPoint {
                altitude: elements.altitude,
                inclination: elements.inclination,
                raan: elements.raan,
            };
            return point.is_finite().then_some((point, PointSource::Elements));
        }

        let position = self.position?;
        let inclination = self.propagated_inclination?;
        let point = ParameterPoint {
            altitude: position.altitude,
            inclination,
            raan: normalize_degrees(position.longitude),
        };
        point
            .is_finite()
            .then_some((point, PointSource::LongitudeProxy))
    }
}

impl ParameterPoint {
    pub fn is_finite(&self) -> bool {
        self.altitude.is_finite() && self.inclination.is_finite() && self.raan.is_finite()
    }
}
