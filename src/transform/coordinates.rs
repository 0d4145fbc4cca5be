//! Conversions between classical orbital elements, ECI Cartesian coordinates
//! and geodetic coordinates.
//!
//! Every public angle is in degrees. Radians only appear inside these functions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{
    EARTH_RADIUS_KM, EARTH_ROTATION_DEG_PER_DAY, GMST_AT_J2000_DEG, J2000_JULIAN_DATE,
    LATITUDE_CLAMP_DEG, POLE_SINGULARITY_EPSILON_KM, SECONDS_PER_DAY, UNIX_EPOCH_JULIAN_DATE,
};
use crate::errors::TractError;
use crate::utils::vector3d::Vector3D;

/// Position over a spherical Earth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeodeticPosition {
    /// Degrees, clamped to [-89.9, 89.9].
    pub latitude: f64,
    /// Degrees, in (-180, 180].
    pub longitude: f64,
    /// Kilometres above the mean spherical radius.
    pub altitude: f64,
}

/// Place a point on an orbit into the Earth-centered inertial frame.
///
/// The point starts at `(r cos ν, r sin ν, 0)` in the orbital plane and is then
/// rotated by the argument of periapsis about the plane normal, by the
/// inclination about the resulting x axis and by the RAAN about z, in that order.
pub fn elements_to_cartesian(
    radius: f64,
    inclination: f64,
    raan: f64,
    argument_of_periapsis: f64,
    true_anomaly: f64,
) -> Vector3D {
    let true_anomaly_rad = true_anomaly.to_radians();
    let in_plane = Vector3D::new(
        radius * true_anomaly_rad.cos(),
        radius * true_anomaly_rad.sin(),
        0.0,
    );

    in_plane
        .rotate_z(argument_of_periapsis.to_radians())
        .rotate_x(inclination.to_radians())
        .rotate_z(raan.to_radians())
}

/// Convert an ECI position (km) to latitude, longitude and altitude.
///
/// Points on the z axis have no defined longitude and return
/// [`TractError::CoordinateSingularity`].
pub fn cartesian_to_geodetic(position: Vector3D) -> Result<GeodeticPosition, TractError> {
    let Vector3D { x, y, z } = position;
    let planar = position.planar_magnitude();
    if !(planar > POLE_SINGULARITY_EPSILON_KM) {
        return Err(TractError::CoordinateSingularity { x, y, z });
    }

    let longitude = unwrap_longitude(y.atan2(x).to_degrees());
    let latitude = z
        .atan2(planar)
        .to_degrees()
        .clamp(-LATITUDE_CLAMP_DEG, LATITUDE_CLAMP_DEG);
    let altitude = position.magnitude() - EARTH_RADIUS_KM;

    Ok(GeodeticPosition {
        latitude,
        longitude,
        altitude,
    })
}

/// Elements straight to a geodetic fix.
pub fn elements_to_geodetic(
    radius: f64,
    inclination: f64,
    raan: f64,
    argument_of_periapsis: f64,
    true_anomaly: f64,
) -> Result<GeodeticPosition, TractError> {
    cartesian_to_geodetic(elements_to_cartesian(
        radius,
        inclination,
        raan,
        argument_of_periapsis,
        true_anomaly,
    ))
}

/// Shift a longitude into (-180, 180] with a single ±360 correction.
pub fn unwrap_longitude(longitude: f64) -> f64 {
    if longitude > 180.0 {
        longitude - 360.0
    } else if longitude <= -180.0 {
        longitude + 360.0
    } else {
        longitude
    }
}

/// Greenwich mean sidereal time at `at`, in [0, 360).
pub fn greenwich_sidereal_degrees(at: DateTime<Utc>) -> f64 {
    let julian_date =
        at.timestamp_millis() as f64 / 1000.0 / SECONDS_PER_DAY + UNIX_EPOCH_JULIAN_DATE;
    normalize_degrees(
        GMST_AT_J2000_DEG + EARTH_ROTATION_DEG_PER_DAY * (julian_date - J2000_JULIAN_DATE),
    )
}

/// Rotate an inertial position into the Earth-fixed frame at `at`.
pub fn inertial_to_earth_fixed(position: Vector3D, at: DateTime<Utc>) -> Vector3D {
    position.rotate_z(-greenwich_sidereal_degrees(at).to_radians())
}

/// Map any angle into [0, 360).
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}
