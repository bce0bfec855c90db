pub mod astar;
pub mod config;
pub mod error;
pub mod fragility;
pub mod frontier;
pub mod grid;
pub mod heuristics;
pub mod interfaces;
pub mod risk_engine;
pub mod spectral;
pub mod stamper;

pub use error::{PlannerError, PlannerResult};
pub use grid::{Cell, CellId, Grid, MapFile};
pub use heuristics::Heuristic;
