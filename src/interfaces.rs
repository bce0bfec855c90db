//! External-surface shapes (spec.md §6): request/response bodies, map-name
//! canonicalisation, cache-key construction, and the documented retry
//! policy, all as plain data. No HTTP server or database/cache client is
//! implemented here -- the retrieval pack has no precedent for one in this
//! domain, and `spec.md` §1 scopes these collaborators out of the hard
//! engineering. `StructPersistenceStore`/`RiskCache` are trait seams only,
//! mirroring the teacher's injectable `PlannerRoomDataSource` pattern
//! (`room_data.rs`) for the live game API it doesn't implement either.

use crate::error::{PlannerError, PlannerResult};
use crate::risk_engine::Sensor;
use serde::{Deserialize, Serialize};

/// A named map as referenced by an incoming request. Canonicalises to one
/// of a small fixed set of known maps (ported from `app.py::_get_map_name`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MapName {
    A,
    B,
}

impl MapName {
    pub const MAP_A: &'static str = "2-Navigation_map_v1.0";
    pub const MAP_B: &'static str = "2-NavigationFile";

    pub fn canonical_name(&self) -> &'static str {
        match self {
            MapName::A => Self::MAP_A,
            MapName::B => Self::MAP_B,
        }
    }

    /// Canonicalises a free-form map identifier from a request into one of
    /// the known maps, defaulting to Map A when the identifier is absent or
    /// unrecognised (spec.md §6, ported from `_get_map_name`: any name
    /// containing "real" or equal to "map_a"/"map-a" selects Map A; any name
    /// containing "fictitious" or equal to "map_b"/"map-b" selects Map B).
    pub fn resolve(requested: Option<&str>) -> MapName {
        let requested = match requested {
            None => return MapName::A,
            Some(r) => r,
        };
        let lower = requested.to_ascii_lowercase();

        if lower == "real" || lower == "map_a" || lower == "map-a" || lower.contains("real") {
            MapName::A
        } else if lower == "fictitious" || lower == "map_b" || lower == "map-b" || lower.contains("fictitious") {
            MapName::B
        } else {
            MapName::A
        }
    }
}

/// Wire shape of one sensor in a request body (spec.md §6, ported from
/// `schemas.py::SensorData1`): `data` is `[acceleration series, time
/// series]`, and `name`/`type` are caller-facing metadata this engine
/// never reads.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SensorInput {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub data: Vec<Vec<f64>>,
    pub location: Option<(f64, f64)>,
}

impl SensorInput {
    /// Converts the wire shape into the `Sensor` the risk engine consumes
    /// (spec.md §3 "Sensor Record"). Fails with `MismatchedSeriesLength`
    /// when `data` isn't exactly the `[acceleration, time]` pair.
    pub fn into_sensor(self) -> PlannerResult<Sensor> {
        let mut series = self.data;
        if series.len() != 2 {
            return Err(PlannerError::MismatchedSeriesLength { acc_len: series.len(), time_len: 2 });
        }
        let time = series.pop().expect("length checked above");
        let acceleration = series.pop().expect("length checked above");
        Ok(Sensor { acceleration, time, location: self.location })
    }
}

/// Body of a risk-computation request (spec.md §6, ported from
/// `schemas.py::SensorInput1`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RiskRequest {
    pub map_name: Option<String>,
    pub sensors: Option<Vec<SensorInput>>,
    pub ambiental_risk: Option<Vec<u8>>,
}

/// One floor's entry in a risk-computation response's `map` array (spec.md
/// §6).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Floor {
    pub floor: u32,
    pub risk_values: Vec<u8>,
}

/// Body of a risk-computation response (spec.md §6, ported from
/// `risks.py::update_risks`'s `out` dict): the combined per-cell risk
/// vector for the ground floor, plus the documented single-element stub
/// for floor 1 (this engine only ever computes one floor's risk map).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RiskResponse {
    pub personal_protection_equipment: String,
    pub map: Vec<Floor>,
}

impl RiskResponse {
    /// Builds the documented response body from a combined ground-floor
    /// risk vector (spec.md §6).
    pub fn new(risk_values: Vec<u8>) -> Self {
        RiskResponse {
            personal_protection_equipment: "placeholder".to_string(),
            map: vec![Floor { floor: 0, risk_values }, Floor { floor: 1, risk_values: vec![0] }],
        }
    }
}

/// Combines a structural risk vector with an optional environmental
/// (ambiental) one (spec.md §6, ported from `app.py::put_risks`): cells
/// belonging to a structural component have their environmental
/// contribution zeroed before the two vectors are merged under a
/// cell-wise max.
pub fn combine_structural_and_environmental(
    structural: &[u8],
    ambiental: Option<&[u8]>,
    structural_cells: &std::collections::HashSet<usize>,
) -> PlannerResult<Vec<u8>> {
    let ambiental = match ambiental {
        None => return Ok(structural.to_vec()),
        Some(a) => a,
    };
    if structural.len() != ambiental.len() {
        return Err(PlannerError::RiskVectorLengthMismatch { structural: structural.len(), environmental: ambiental.len() });
    }

    let mut ambiental = ambiental.to_vec();
    for &idx in structural_cells {
        if idx < ambiental.len() {
            ambiental[idx] = 0;
        }
    }

    Ok(structural.iter().zip(ambiental.iter()).map(|(&s, &a)| s.max(a)).collect())
}

/// Redis-style cache keys used across a risk-computation run (spec.md §6,
/// ported from the literal key strings in `app.py`/`risks.py`).
pub struct CacheKeys;

impl CacheKeys {
    pub fn inventory(redis_inventory_key: &str) -> String {
        format!("inventory_{redis_inventory_key}")
    }

    pub fn structural_risk() -> &'static str {
        "structural_risk"
    }

    pub fn ambiental_risk() -> &'static str {
        "ambiental_risk"
    }
}

/// The documented retry policy for outbound HTTP calls (spec.md §6, ported
/// from `utils.py::requests_retry_session`), captured as data rather than
/// wired into an HTTP client.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    pub total_attempts: u32,
    pub backoff_factor: f64,
    pub status_forcelist: &'static [u16],
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy { total_attempts: 3, backoff_factor: 0.3, status_forcelist: &[500, 502, 504] }
    }
}

/// Seam for a backing inventory/structural-risk store. No implementation
/// is provided here; a real deployment supplies one backed by whatever
/// database or cache the deployment uses (spec.md §1/§6).
pub trait StructPersistenceStore {
    fn load_inventory(&self, key: &str) -> PlannerResult<Option<crate::risk_engine::InventorySnapshot>>;
    fn save_inventory(&self, key: &str, snapshot: &crate::risk_engine::InventorySnapshot) -> PlannerResult<()>;
}

/// Seam for the structural/ambiental risk vector cache (spec.md §4.7/§6).
pub trait RiskCache {
    fn load_structural_risk(&self, key: &str) -> PlannerResult<Option<Vec<u8>>>;
    fn save_structural_risk(&self, key: &str, risk: &[u8]) -> PlannerResult<()>;
}
