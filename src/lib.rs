pub mod config;
pub mod constants;
pub mod errors;
pub mod geometry;
pub mod grid;
pub mod matching;
pub mod regeneration;
pub mod reporting;
pub mod satellite;
pub mod store;
pub mod transform;
pub mod utils;

pub use config::{GridConfig, GridConfigFile};
pub use constants::*;
pub use errors::{TractError, WorkCompleted};

// Grid and geometry
pub use geometry::polygon::Polygon;
pub use geometry::shell::{
    build_shells, FailureCategory, ShellBuildReport, ShellGeometryBuilder, VolumetricShell,
};
pub use grid::generator::{generate_tracts, GridGeneration, TractGridGenerator};
pub use grid::tract::{OrbitZone, Tract, TractBounds};

// Matching
pub use matching::matcher::{match_tracts, MatchResult, TractMatcher};
pub use matching::validation::{validate_consistency, ConsistencyReport, Mismatch};
pub use satellite::propagation::{
    propagate_catalog, PropagatedFix, Propagator, Sgp4Propagator,
};
pub use satellite::state::{OrbitalElements, ParameterPoint, PointSource, SatelliteState};

// Persistence and orchestration
pub use regeneration::{regenerate_zone, retain_zone, CleanupReport, RegenerationReport};
pub use store::{JsonStore, MemoryStore, StoreSession, TractStore};

// Reporting
pub use reporting::analysis::{
    boundary_analysis, coverage, distribution, Assessment, BoundaryKind, CoverageSummary,
};
pub use reporting::summary::RunSummary;

// Transforms
pub use transform::coordinates::{
    cartesian_to_geodetic, elements_to_cartesian, elements_to_geodetic, GeodeticPosition,
};
pub use transform::tle::{parse_catalog, TwoLineElement};

pub use utils::vector2d::Vector2D;
pub use utils::vector3d::Vector3D;
