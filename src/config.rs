//! Deployment constants loaded from YAML (spec.md §6).
//!
//! Grounded on the teacher's `serde`-derived data files and the `gat`
//! workspace's `serde_yaml`-based scenario loader (see DESIGN.md); the
//! teacher itself has no analogous deployment-constants file, so only the
//! *shape* (a plain `serde` struct loaded from a document on disk) is
//! borrowed, not specific field names.

use crate::grid::Anchor;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Reference anchor parameters as they appear in a map's constants file,
/// before being resolved into an `Anchor` (spec.md §4.3).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReferenceConfig {
    pub cell: usize,
    pub h_px: f64,
    pub v_px: f64,
}

/// Deployment-wide constants for one building/scene (spec.md §6): which
/// component ids are load-bearing structural members, the reference anchor,
/// and the default damping used when an intensity-measure name omits one.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default = "default_structure_ids")]
    pub structure_ids: Vec<String>,
    pub reference: ReferenceConfig,
    #[serde(default = "default_damping_pct")]
    pub default_damping_pct: f64,
}

fn default_damping_pct() -> f64 {
    2.0
}

/// Default load-bearing component ids (Mongo ObjectId hex strings, ported
/// from `risks.py::Risk.STRUCTURE_IDS`).
fn default_structure_ids() -> Vec<String> {
    vec![
        "622204f35ed4ed1b0bb72c18".to_string(),
        "622204ff5ed4ed1b0bb72c1a".to_string(),
        "6222051d5ed4ed1b0bb72c1c".to_string(),
        "622205335ed4ed1b0bb72c1e".to_string(),
    ]
}

impl PlannerConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.display().to_string(), e))?;
        Self::from_yaml_str(&contents).map_err(ConfigError::Parse)
    }

    /// Resolves `self.reference` plus the grid's geometry into a usable
    /// `Anchor` (spec.md §4.3).
    pub fn resolve_anchor(&self, millimeter_per_pixel: f64, cell_size_cm: f64, columns: usize) -> Anchor {
        Anchor::from_reference(self.reference.cell, self.reference.h_px, self.reference.v_px, millimeter_per_pixel, cell_size_cm, columns)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    Io(String, #[source] std::io::Error),
    #[error("failed to parse config YAML: {0}")]
    Parse(#[source] serde_yaml::Error),
}
