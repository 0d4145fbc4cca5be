use thiserror::Error;

/// Work finished before a batch-level failure stopped a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkCompleted {
    pub tracts_generated: usize,
    pub shells_built: usize,
    pub rows_written: usize,
}

#[derive(Debug, Error)]
pub enum TractError {
    #[error("Degenerate bin {id}: {reason}")]
    DegenerateBin { id: String, reason: String },

    #[error("Invalid geometry for {id}: {reason}")]
    InvalidGeometry { id: String, reason: String },

    #[error("Empty geometry for {id}")]
    EmptyGeometry { id: String },

    #[error("Zero-area geometry for {id}")]
    ZeroArea { id: String },

    #[error("Geometry construction failed: {0}")]
    GeometryConstruction(String),

    #[error("Coordinate singularity at ({x}, {y}, {z}): longitude undefined")]
    CoordinateSingularity { x: f64, y: f64, z: f64 },

    #[error("TLE parse error: {0}")]
    TleParse(String),

    #[error("Propagation failed for {satellite_id}: {reason}")]
    Propagation { satellite_id: String, reason: String },

    #[error("Satellite {0} has no usable orbital parameters")]
    UnresolvedState(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store schema error: {0}")]
    Schema(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Run aborted after {completed:?}: {reason}")]
    RunAborted {
        completed: WorkCompleted,
        reason: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
