//! Propagating element sets to an epoch, and the boundary for other propagators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::TractError;
use crate::satellite::state::{OrbitalElements, PointSource, SatelliteState};
use crate::transform::coordinates::{
    cartesian_to_geodetic, inertial_to_earth_fixed, GeodeticPosition,
};
use crate::transform::tle::TwoLineElement;
use crate::utils::vector3d::Vector3D;

/// What the propagation service reports for one satellite at one epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PropagatedFix {
    pub latitude: f64,
    pub longitude: f64,
    /// km
    pub altitude: f64,
    pub inclination: f64,
}

/// Anything that can turn an element set into a position at an epoch
/// (an SGP4 binding, a remote ephemeris service, a recorded fixture).
pub trait Propagator: Sync {
    fn propagate(
        &self,
        tle: &TwoLineElement,
        epoch: DateTime<Utc>,
    ) -> Result<PropagatedFix, TractError>;
}

/// SGP4 from the `sgp4` crate. Positions come out in TEME and are rotated to
/// Earth-fixed by mean sidereal time; the inclination is the osculating one
/// from the angular momentum vector.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sgp4Propagator;

impl Propagator for Sgp4Propagator {
    fn propagate(
        &self,
        tle: &TwoLineElement,
        epoch: DateTime<Utc>,
    ) -> Result<PropagatedFix, TractError> {
        let elements = tle.sgp4_elements()?;
        let failed = |reason: String| TractError::Propagation {
            satellite_id: elements.norad_id.to_string(),
            reason,
        };

        let constants =
            sgp4::Constants::from_elements(&elements).map_err(|e| failed(e.to_string()))?;
        let minutes =
            (epoch.naive_utc() - elements.datetime).num_milliseconds() as f64 / 60_000.0;
        let prediction = constants
            .propagate(sgp4::MinutesSinceEpoch(minutes))
            .map_err(|e| failed(e.to_string()))?;

        let [x, y, z] = prediction.position;
        let [vx, vy, vz] = prediction.velocity;
        let position = Vector3D::new(x, y, z);
        let momentum = position.cross(&Vector3D::new(vx, vy, vz));
        if !(momentum.magnitude() > 0.0) {
            return Err(failed("zero angular momentum".to_string()));
        }
        let inclination = (momentum.z / momentum.magnitude())
            .clamp(-1.0, 1.0)
            .acos()
            .to_degrees();

        let fix = cartesian_to_geodetic(inertial_to_earth_fixed(position, epoch))?;
        Ok(PropagatedFix {
            latitude: fix.latitude,
            longitude: fix.longitude,
            altitude: fix.altitude,
            inclination,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropagationFailure {
    pub satellite: String,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct PropagationBatch {
    pub states: Vec<SatelliteState>,
    pub failures: Vec<PropagationFailure>,
}

impl SatelliteState {
    pub fn from_fix(
        id: impl Into<String>,
        name: impl Into<String>,
        epoch: DateTime<Utc>,
        fix: PropagatedFix,
    ) -> Self {
        SatelliteState {
            id: id.into(),
            name: name.into(),
            epoch,
            elements: None,
            position: Some(GeodeticPosition {
                latitude: fix.latitude,
                longitude: fix.longitude,
                altitude: fix.altitude,
            }),
            propagated_inclination: Some(fix.inclination),
        }
    }
}

/// Propagate every catalog entry to `epoch`. A failing entry is recorded and
/// the rest of the batch carries on.
///
/// `point_source` decides which triple the resulting states are matched on.
/// [`SatelliteState::parameter_point`] always prefers mean elements when a
/// state has them, so with [`PointSource::Elements`] the decoded elements are
/// attached and the propagated fix is kept only as position. With
/// [`PointSource::LongitudeProxy`] no elements are attached and matching uses
/// the fix's altitude, inclination and longitude.
pub fn propagate_catalog<P: Propagator + ?Sized>(
    propagator: &P,
    catalog: &[TwoLineElement],
    epoch: DateTime<Utc>,
    point_source: PointSource,
) -> PropagationBatch {
    let mut batch = PropagationBatch::default();

    for tle in catalog {
        let elements = tle.elements().ok();
        let id = elements
            .map(|e| e.norad_id.to_string())
            .unwrap_or_else(|| tle.name.clone());

        match propagator.propagate(tle, epoch) {
            Ok(fix) => {
                let mut state = SatelliteState::from_fix(&id, &tle.name, epoch, fix);
                if point_source == PointSource::Elements {
                    state.elements = elements.map(|e| OrbitalElements {
                        inclination: e.inclination,
                        raan: e.raan,
                        altitude: e.mean_altitude_km(),
                    });
                }
                batch.states.push(state);
            }
            Err(e) => {
                log::warn!("Propagation failed for {} ({}): {}", tle.name, id, e);
                batch.failures.push(PropagationFailure {
                    satellite: id,
                    reason: e.to_string(),
                });
            }
        }
    }

    log::debug!(
        "Propagated {} of {} satellites",
        batch.states.len(),
        catalog.len()
    );
    batch
}
