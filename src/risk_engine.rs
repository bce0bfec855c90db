//! Orchestrates the inventory walk that builds a structural risk vector
//! (spec.md §4, ported from `original_source/src/risks.py::Risk`).
//!
//! Each component contributes a stamp (core/halo cell sets) and a risk
//! level derived from its fragility curve and the shaking intensity at its
//! location; stamps are merged into a shared `RiskVector` under the
//! max-merge rule from `stamper.rs`.

use crate::error::{PlannerError, PlannerResult};
use crate::fragility::{self, DamageState, IntensityMeasure};
use crate::grid::Grid;
use crate::spectral;
use crate::stamper::{Footprint, RiskVector, Stamp};
use fnv::FnvHashMap;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One sensor's recorded motion plus, for multi-sensor deployments, its
/// plan-view location (spec.md §4.4).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Sensor {
    pub acceleration: Vec<f64>,
    pub time: Vec<f64>,
    pub location: Option<(f64, f64)>,
}

/// One component's plan-view footprint (spec.md §4.1/§4.6).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ComponentLocation {
    pub top_left: (f64, f64),
    pub bottom_right: (f64, f64),
    pub influence_radius_cm: f64,
}

/// One component's full inventory record (spec.md §4.1).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Component {
    pub id: String,
    pub locations: Vec<ComponentLocation>,
    pub damage_states: Vec<DamageState>,
    pub im_name: String,
}

/// A snapshot of one inventory run, keyed by component id, kept so a later
/// run can be recomputed without re-fetching the inventory (spec.md §4.7,
/// ported from `Risk.inventory_cache`).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InventorySnapshot {
    pub components: FnvHashMap<String, Component>,
}

/// Result of walking one inventory against one grid (spec.md §4).
pub struct RiskMap {
    pub risk: RiskVector,
    /// Cell ids belonging to a structural (`STRUCTURE_IDS`) component.
    pub structural_cells: HashSet<crate::grid::CellId>,
}

/// Selects the component's most severe damage state: the one with the
/// largest mean (`ORDER BY mean DESC LIMIT 1` in the original's Mongo
/// query, ported here as a plain max-by-mean scan).
fn most_severe_damage_state(states: &[DamageState]) -> Option<DamageState> {
    states.iter().copied().fold(None, |best, candidate| match best {
        None => Some(candidate),
        Some(b) if candidate.mean > b.mean => Some(candidate),
        Some(b) => Some(b),
    })
}

/// Selects which sensor's time history to use for a component centred at
/// `position`: the sole sensor if there is exactly one, otherwise the one
/// nearest the component's centroid (spec.md §4.4 step, ported from
/// `Risk.compute_earthquake_intensity`).
fn select_sensor<'a>(sensors: &'a [Sensor], position: (f64, f64, f64, f64)) -> PlannerResult<&'a Sensor> {
    if sensors.is_empty() {
        return Err(PlannerError::EmptySensorList);
    }
    if sensors.len() == 1 {
        return Ok(&sensors[0]);
    }

    let center_x = (position.0 + position.2) / 2.0;
    let center_y = (position.1 + position.3) / 2.0;

    let mut best: Option<(&Sensor, f64)> = None;
    for sensor in sensors {
        let (sx, sy) = sensor.location.ok_or(PlannerError::MissingSensorLocation)?;
        let dist = ((center_x - sx).powi(2) + (center_y - sy).powi(2)).sqrt();
        best = match best {
            None => Some((sensor, dist)),
            Some((_, best_dist)) if dist < best_dist => Some((sensor, dist)),
            Some(existing) => Some(existing),
        };
    }
    Ok(best.expect("sensors is non-empty").0)
}

/// Computes the shaking intensity `Ia` at a component's location for the
/// fragility curve's intensity measure (spec.md §4.4).
fn earthquake_intensity(sensors: Option<&[Sensor]>, im: IntensityMeasure, position: (f64, f64, f64, f64)) -> PlannerResult<f64> {
    let sensors = match sensors {
        None => return Ok(0.0),
        Some(s) => s,
    };
    let sensor = select_sensor(sensors, position)?;
    spectral::sa(&sensor.acceleration, &sensor.time, im.period, im.damping)
}

/// Builds the risk vector for `grid` from `components`, optionally guided
/// by `sensors` (absent means every intensity defaults to zero, matching
/// `Risk.sensors is None` in the original) and a set of structural
/// component ids (spec.md §4, §4.6, §4.7).
pub fn compute_risk_map(grid: &Grid, components: &[Component], sensors: Option<&[Sensor]>, structure_ids: &HashSet<String>) -> PlannerResult<RiskMap> {
    let mut risk = RiskVector::zeroed(grid.cell_count());
    let mut structural_cells = HashSet::new();

    for component in components {
        let damage = most_severe_damage_state(&component.damage_states);
        let im = IntensityMeasure::parse(&component.im_name);
        let is_structural = structure_ids.contains(&component.id);

        for location in &component.locations {
            let footprint = Footprint {
                top_left: location.top_left,
                bottom_right: location.bottom_right,
                influence_radius_cm: location.influence_radius_cm,
            };
            let stamp = Stamp::compute(grid, footprint);

            if is_structural {
                structural_cells.extend(stamp.core.iter().copied());
            }

            let core_risk = match damage {
                None => 0,
                Some(ds) if ds.mean == 0.0 => 0,
                Some(ds) => {
                    let position = (location.top_left.0, location.top_left.1, location.bottom_right.0, location.bottom_right.1);
                    let ia = earthquake_intensity(sensors, im, position)?;
                    fragility::risk_level(ds, ia)
                }
            };
            let halo_risk = fragility::halo_risk(core_risk);

            debug!("risk_engine: component {} core={} halo={} ({} core cells, {} halo cells)", component.id, core_risk, halo_risk, stamp.core.len(), stamp.halo.len());

            risk.apply_stamp(&stamp, core_risk, halo_risk);
        }
    }

    debug!("risk_engine: walked {} components, {} structural cells tagged", components.len(), structural_cells.len());
    Ok(RiskMap { risk, structural_cells })
}

/// Max-merges a previously cached structural risk vector into `risk`
/// (spec.md §4.7, ported from `Risk.combine_structural_risks_with_cached`).
pub fn combine_with_cached_structural_risk(risk: &mut RiskVector, cached: &[u8]) -> PlannerResult<()> {
    if risk.len() != cached.len() {
        return Err(PlannerError::RiskVectorLengthMismatch { structural: risk.len(), environmental: cached.len() });
    }
    debug!("risk_engine: combining with cached structural risk vector");
    risk.merge_max(cached);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Anchor, Cell};

    fn open_grid(rows: usize, columns: usize) -> Grid {
        let mut cells = Vec::with_capacity(rows * columns);
        for id in 0..rows * columns {
            cells.push(Cell { id, connections: vec![id] });
        }
        let mut safe_zones = HashSet::new();
        safe_zones.insert(rows * columns - 1);
        let anchor = Anchor { x_offset_cm: 0.0, y_offset_cm: 0.0 };
        Grid::new(rows, columns, 10.0, 1.0, safe_zones, cells, anchor, None).unwrap()
    }

    #[test]
    fn most_severe_picks_largest_mean() {
        let states = vec![DamageState { mean: 0.1, dispersion: 0.3 }, DamageState { mean: 0.4, dispersion: 0.5 }, DamageState { mean: 0.2, dispersion: 0.3 }];
        let severe = most_severe_damage_state(&states).unwrap();
        assert_eq!(severe.mean, 0.4);
    }

    #[test]
    fn no_sensors_means_zero_intensity() {
        let position = (0.0, 0.0, 10.0, 10.0);
        let ia = earthquake_intensity(None, IntensityMeasure { period: 0.0, damping: 0.02 }, position).unwrap();
        assert_eq!(ia, 0.0);
    }

    #[test]
    fn single_sensor_is_used_without_location() {
        let sensors = vec![Sensor { acceleration: vec![0.1, 0.2, -0.1, 0.0, 0.3], time: vec![0.0, 0.01, 0.02, 0.03, 0.04], location: None }];
        let position = (0.0, 0.0, 10.0, 10.0);
        let ia = earthquake_intensity(Some(&sensors), IntensityMeasure { period: 0.0, damping: 0.02 }, position).unwrap();
        assert!(ia >= 0.0);
    }

    #[test]
    fn multiple_sensors_require_locations() {
        let sensors = vec![
            Sensor { acceleration: vec![0.1, 0.2], time: vec![0.0, 0.01], location: Some((0.0, 0.0)) },
            Sensor { acceleration: vec![0.1, 0.2], time: vec![0.0, 0.01], location: None },
        ];
        let position = (0.0, 0.0, 10.0, 10.0);
        let err = earthquake_intensity(Some(&sensors), IntensityMeasure { period: 0.0, damping: 0.02 }, position).unwrap_err();
        assert!(matches!(err, PlannerError::MissingSensorLocation));
    }

    #[test]
    fn compute_risk_map_tags_structural_cells() {
        let grid = open_grid(10, 10);
        let component = Component {
            id: "structural-1".to_string(),
            locations: vec![ComponentLocation { top_left: (20.0, 20.0), bottom_right: (40.0, 40.0), influence_radius_cm: 0.0 }],
            damage_states: vec![DamageState { mean: 0.3, dispersion: 0.4 }],
            im_name: "PGA".to_string(),
        };
        let mut structure_ids = HashSet::new();
        structure_ids.insert("structural-1".to_string());

        let map = compute_risk_map(&grid, &[component], None, &structure_ids).unwrap();
        assert!(!map.structural_cells.is_empty());
        // No sensors -> Ia == 0 -> risk level 0 everywhere.
        assert!(map.risk.as_slice().iter().all(|&r| r == 0));
    }

    #[test]
    fn structural_cells_exclude_halo() {
        let grid = open_grid(10, 10);
        let component = Component {
            id: "structural-1".to_string(),
            locations: vec![ComponentLocation { top_left: (20.0, 20.0), bottom_right: (40.0, 40.0), influence_radius_cm: 15.0 }],
            damage_states: vec![DamageState { mean: 0.3, dispersion: 0.4 }],
            im_name: "PGA".to_string(),
        };
        let mut structure_ids = HashSet::new();
        structure_ids.insert("structural-1".to_string());

        let footprint = crate::stamper::Footprint { top_left: (20.0, 20.0), bottom_right: (40.0, 40.0), influence_radius_cm: 15.0 };
        let stamp = crate::stamper::Stamp::compute(&grid, footprint);
        assert!(!stamp.halo.is_empty());

        let map = compute_risk_map(&grid, &[component], None, &structure_ids).unwrap();
        assert_eq!(map.structural_cells, stamp.core);
        for halo_only in stamp.halo.difference(&stamp.core) {
            assert!(!map.structural_cells.contains(halo_only));
        }
    }

    #[test]
    fn zero_mean_short_circuits_before_intensity_lookup() {
        let grid = open_grid(10, 10);
        // A sensor list that would error in `earthquake_intensity` (missing
        // location on a multi-sensor request) must never be consulted when
        // the damage state's mean is zero.
        let sensors = vec![
            Sensor { acceleration: vec![0.1, 0.2], time: vec![0.0, 0.01], location: Some((0.0, 0.0)) },
            Sensor { acceleration: vec![0.1, 0.2], time: vec![0.0, 0.01], location: None },
        ];
        let component = Component {
            id: "zero-mean".to_string(),
            locations: vec![ComponentLocation { top_left: (20.0, 20.0), bottom_right: (40.0, 40.0), influence_radius_cm: 0.0 }],
            damage_states: vec![DamageState { mean: 0.0, dispersion: 0.4 }],
            im_name: "PGA".to_string(),
        };
        let map = compute_risk_map(&grid, &[component], Some(&sensors), &HashSet::new()).unwrap();
        assert!(map.risk.as_slice().iter().all(|&r| r == 0));
    }

    #[test]
    fn combine_with_cached_rejects_length_mismatch() {
        let mut risk = RiskVector::zeroed(4);
        let err = combine_with_cached_structural_risk(&mut risk, &[1, 2, 3]).unwrap_err();
        assert!(matches!(err, PlannerError::RiskVectorLengthMismatch { .. }));
    }

    #[test]
    fn combine_with_cached_applies_max_merge() {
        let mut risk = RiskVector::from_values(vec![1, 5, 0, 2]);
        combine_with_cached_structural_risk(&mut risk, &[3, 2, 8, 1]).unwrap();
        assert_eq!(risk.as_slice(), &[3, 5, 8, 2]);
    }
}
