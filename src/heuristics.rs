//! Pure distance functions over 2D cell coordinates.
//!
//! Ported from `calculate_heuristic` in the original Python navigation
//! module: Manhattan and octile ("diagonal" there) assume 4- and
//! 8-connected movement respectively; Euclidean never overestimates true
//! grid distance and is the default.

use crate::error::PlannerError;
use serde::{Deserialize, Serialize};

/// A coordinate pair on the rasterised floorplan, row-major.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct RowCol {
    pub row: i64,
    pub col: i64,
}

impl RowCol {
    pub fn new(row: i64, col: i64) -> Self {
        RowCol { row, col }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Heuristic {
    Manhattan,
    Euclidean,
    Octile,
}

impl Heuristic {
    pub fn parse(name: &str) -> Result<Self, PlannerError> {
        match name.to_ascii_lowercase().as_str() {
            "manhattan" => Ok(Heuristic::Manhattan),
            "euclidean" => Ok(Heuristic::Euclidean),
            "octile" | "diagonal" => Ok(Heuristic::Octile),
            other => Err(PlannerError::InvalidHeuristic(other.to_string())),
        }
    }

    /// Distance between `a` and `b` under this heuristic.
    pub fn distance(self, a: RowCol, b: RowCol) -> f64 {
        let dr = (a.row - b.row).unsigned_abs() as f64;
        let dc = (a.col - b.col).unsigned_abs() as f64;

        match self {
            Heuristic::Manhattan => dr + dc,
            Heuristic::Euclidean => dr.hypot(dc),
            Heuristic::Octile => {
                let (lo, hi) = if dr < dc { (dr, dc) } else { (dc, dr) };
                hi + (std::f64::consts::SQRT_2 - 1.0) * lo
            }
        }
    }
}
