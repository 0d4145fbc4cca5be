// Physical Constants
pub const EARTH_RADIUS_KM: f64 = 6371.0; // km, mean spherical radius
pub const EARTH_MU_KM3_S2: f64 = 398_600.4418; // km³/s²
pub const SECONDS_PER_DAY: f64 = 86_400.0; // s

// Grid Domain
pub const LEO_ALTITUDE_MIN_KM: f64 = 200.0;
pub const LEO_ALTITUDE_MAX_KM: f64 = 2000.0;
pub const MEO_ALTITUDE_MAX_KM: f64 = 35_586.0;
pub const GEO_ALTITUDE_MAX_KM: f64 = 35_986.0;
pub const INCLINATION_MAX_DEG: f64 = 180.0;
pub const RAAN_MAX_DEG: f64 = 360.0;

// Bin Widths
pub const ALTITUDE_BIN_WIDTH_KM: f64 = 50.0;
pub const INCLINATION_BIN_WIDTH_DEG: f64 = 5.0;
pub const RAAN_BIN_WIDTH_DEG: f64 = 5.0;
pub const MAX_BINS_PER_AXIS: usize = 100_000;
pub const MAX_TRACTS_PER_ZONE: usize = 10_000_000;

// Angular lookup resolution: 360 segments of 1° each
pub const ARC_SEGMENT_COUNT: u32 = 360;

// Shell Geometry
pub const POLAR_EXCLUSION_INC_DEG: f64 = 170.0;
pub const VOLUME_UNIT_SCALE: f64 = 1000.0;

// Coordinate Transform
pub const LATITUDE_CLAMP_DEG: f64 = 89.9;
pub const POLE_SINGULARITY_EPSILON_KM: f64 = 1e-9;
pub const J2000_JULIAN_DATE: f64 = 2_451_545.0;
pub const UNIX_EPOCH_JULIAN_DATE: f64 = 2_440_587.5;
pub const GMST_AT_J2000_DEG: f64 = 280.460_618_37;
pub const EARTH_ROTATION_DEG_PER_DAY: f64 = 360.985_647_366_29;

// Boundary analysis tolerances
pub const ALTITUDE_BOUNDARY_TOLERANCE_KM: f64 = 1.0;
pub const INCLINATION_BOUNDARY_TOLERANCE_DEG: f64 = 0.5;
pub const RAAN_BOUNDARY_TOLERANCE_DEG: f64 = 0.5;

// Validation
pub const DEFAULT_WORKERS: usize = 8;
pub const EXCELLENT_ACCURACY_PERCENT: f64 = 95.0;
pub const EXCELLENT_COVERAGE_PERCENT: f64 = 90.0;
pub const GOOD_ACCURACY_PERCENT: f64 = 85.0;
pub const GOOD_COVERAGE_PERCENT: f64 = 80.0;
