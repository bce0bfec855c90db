//! Error taxonomy for the risk-map and routing engine.
//!
//! Validation errors (`InvalidGrid`, `InvalidHeuristic`, `InvalidSignal`,
//! `InvalidRequest`) surface to the request boundary. `NoPath` is a normal
//! search outcome: `astar::search` returns `Ok(None)`, not `Err`; the
//! `NoPath` variant exists for callers in the external-glue layer that want
//! to report it uniformly alongside other errors. Cache/store failures
//! never cascade into computation errors -- the cold path is always a
//! valid fallback.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("grid cell {cell} is out of range for a grid with {cell_count} cells")]
    CellOutOfRange { cell: usize, cell_count: usize },

    #[error("safe zone set is empty")]
    NoSafeZones,

    #[error("safe zone cell {cell} is out of range for a grid with {cell_count} cells")]
    InvalidSafeZone { cell: usize, cell_count: usize },

    #[error("grid declares {rows}x{columns} = {expected} cells but {actual} cells were provided")]
    CellCountMismatch {
        rows: usize,
        columns: usize,
        expected: usize,
        actual: usize,
    },

    #[error("start cell {cell} has no outgoing connections and cannot be used to begin a search")]
    NonTraversableStart { cell: usize },

    #[error("unknown heuristic name {0:?}, must be one of manhattan, euclidean, octile")]
    InvalidHeuristic(String),

    #[error("time step is zero but period {period} is non-zero")]
    InvalidSignal { period: f64 },

    #[error("acceleration and time series have different lengths ({acc_len} vs {time_len})")]
    MismatchedSeriesLength { acc_len: usize, time_len: usize },

    #[error("multiple sensors were provided but not all of them carry a location")]
    MissingSensorLocation,

    #[error("no sensors were provided")]
    EmptySensorList,

    #[error(
        "structural and environmental risk vectors have different lengths ({structural} vs {environmental})"
    )]
    RiskVectorLengthMismatch {
        structural: usize,
        environmental: usize,
    },

    #[error("no path from the start cell to any safe zone")]
    NoPath,

    #[error("cache miss for key {0:?}")]
    CacheMiss(String),

    #[error("backing store unavailable: {0}")]
    StoreUnavailable(String),
}

pub type PlannerResult<T> = Result<T, PlannerError>;
