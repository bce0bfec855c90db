//! Rasterised floorplan: dimensions, per-cell adjacency, safe zones, and
//! the pixel/cm coordinate transforms used to project world-cm rectangles
//! onto cell ids.
//!
//! `cells` is a flat `Vec` indexed by `row * columns + col` rather than a
//! `HashMap`, the same dense-array idiom the teacher crate uses for
//! room-sized data (`RoomDataArray<T>` in `terrain.rs`) -- every cell in
//! the rectangle is always present, so hashing would only cost more.

use crate::error::{PlannerError, PlannerResult};
use crate::heuristics::RowCol;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub type CellId = usize;

/// One cell's adjacency. An empty `connections` set marks a non-traversable
/// obstacle.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Cell {
    pub id: CellId,
    pub connections: Vec<CellId>,
}

/// Locates cell 0 in world-cm coordinates, derived from a reference cell id
/// and its known pixel position (spec.md §4.3).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Anchor {
    /// World-cm x offset of the centre of cell 0 (`ref_h` in the original).
    pub x_offset_cm: f64,
    /// World-cm y offset of the centre of cell 0 (`ref_v` in the original).
    pub y_offset_cm: f64,
}

impl Anchor {
    /// `reference_cell` is a cell whose centre is known to sit at
    /// `(h_px, v_px)` in pixels; `millimeter_per_pixel` and `cell_size_cm`
    /// convert that into the world-cm offset of cell 0's centre.
    pub fn from_reference(
        reference_cell: CellId,
        h_px: f64,
        v_px: f64,
        millimeter_per_pixel: f64,
        cell_size_cm: f64,
        columns: usize,
    ) -> Self {
        let ref_h_cm = h_px * millimeter_per_pixel / 10.0;
        let ref_v_cm = v_px * millimeter_per_pixel / 10.0;

        let row = reference_cell / columns;
        let col = reference_cell % columns;

        let y_offset_cm = ref_v_cm - (row as f64) * cell_size_cm - cell_size_cm / 2.0;
        let x_offset_cm = ref_h_cm - (col as f64) * cell_size_cm - cell_size_cm / 2.0;

        Anchor { x_offset_cm, y_offset_cm }
    }
}

/// On-disk shape of a map file (spec.md §6: "Map file (JSON)"), before the
/// anchor has been resolved against a `config::ReferenceConfig`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MapFile {
    pub rows: usize,
    pub columns: usize,
    pub cell_size_cm: f64,
    pub millimeter_per_pixel: f64,
    pub safe_zones: HashSet<CellId>,
    pub cells: Vec<Cell>,
    pub scene_name: Option<String>,
}

impl MapFile {
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Resolves this map file into a validated `Grid`, given the anchor
    /// computed from the deployment's reference configuration.
    pub fn into_grid(self, anchor: Anchor) -> PlannerResult<Grid> {
        Grid::new(self.rows, self.columns, self.cell_size_cm, self.millimeter_per_pixel, self.safe_zones, self.cells, anchor, self.scene_name)
    }
}

#[derive(Clone, Debug)]
pub struct Grid {
    pub rows: usize,
    pub columns: usize,
    pub cell_size_cm: f64,
    pub millimeter_per_pixel: f64,
    pub safe_zones: HashSet<CellId>,
    pub cells: Vec<Cell>,
    pub anchor: Anchor,
    pub scene_name: Option<String>,
}

impl Grid {
    pub fn new(
        rows: usize,
        columns: usize,
        cell_size_cm: f64,
        millimeter_per_pixel: f64,
        safe_zones: HashSet<CellId>,
        cells: Vec<Cell>,
        anchor: Anchor,
        scene_name: Option<String>,
    ) -> PlannerResult<Self> {
        let cell_count = rows * columns;

        if cells.len() != cell_count {
            return Err(PlannerError::CellCountMismatch {
                rows,
                columns,
                expected: cell_count,
                actual: cells.len(),
            });
        }

        if safe_zones.is_empty() {
            return Err(PlannerError::NoSafeZones);
        }

        for &zone in &safe_zones {
            if zone >= cell_count {
                return Err(PlannerError::InvalidSafeZone { cell: zone, cell_count });
            }
        }

        for cell in &cells {
            for &conn in &cell.connections {
                if conn >= cell_count {
                    return Err(PlannerError::CellOutOfRange { cell: conn, cell_count });
                }
            }
        }

        let grid = Grid {
            rows,
            columns,
            cell_size_cm,
            millimeter_per_pixel,
            safe_zones,
            cells,
            anchor,
            scene_name,
        };

        Ok(grid)
    }

    pub fn cell_count(&self) -> usize {
        self.rows * self.columns
    }

    #[inline]
    pub fn row_col(&self, id: CellId) -> RowCol {
        RowCol::new((id / self.columns) as i64, (id % self.columns) as i64)
    }

    pub fn connections(&self, id: CellId) -> &[CellId] {
        &self.cells[id].connections
    }

    pub fn is_traversable(&self, id: CellId) -> bool {
        !self.cells[id].connections.is_empty()
    }

    /// Validates that `start` is in range and has a non-empty connection
    /// set, as required before beginning a search (spec.md §3 invariant).
    pub fn validate_start(&self, start: CellId) -> PlannerResult<()> {
        let cell_count = self.cell_count();
        if start >= cell_count {
            return Err(PlannerError::CellOutOfRange { cell: start, cell_count });
        }
        if !self.is_traversable(start) {
            return Err(PlannerError::NonTraversableStart { cell: start });
        }
        Ok(())
    }

    /// Converts a world-cm coordinate to the (possibly out-of-range)
    /// signed row/col it falls in, without clamping. The offset from the
    /// anchor is rounded to the nearest whole centimetre before dividing by
    /// `cell_size_cm`, matching `_get_cell_id`'s `round(x - ref, 0)` (spec.md
    /// §3 clarifications).
    fn to_cell_coord(&self, x_cm: f64, y_cm: f64, round_up: bool) -> (i64, i64) {
        let rel_x = (x_cm - self.anchor.x_offset_cm).round() / self.cell_size_cm;
        let rel_y = (y_cm - self.anchor.y_offset_cm).round() / self.cell_size_cm;
        if round_up {
            (rel_x.ceil() as i64, rel_y.ceil() as i64)
        } else {
            (rel_x.floor() as i64, rel_y.floor() as i64)
        }
    }

    /// Enumerates all cell ids whose centre falls within the axis-aligned
    /// rectangle `[top_left, bottom_right)` (world cm), inclusive-lower /
    /// exclusive-upper on both axes, optionally clamping the lower bound
    /// at 0 (used for influence-radius expansion, spec.md §4.6).
    pub fn rect_to_cells(
        &self,
        top_left: (f64, f64),
        bottom_right: (f64, f64),
        clamp_lower_at_zero: bool,
    ) -> Vec<CellId> {
        let (mut x_start, mut y_start) = self.to_cell_coord(top_left.0, top_left.1, false);
        let (x_end, y_end) = self.to_cell_coord(bottom_right.0, bottom_right.1, true);

        if clamp_lower_at_zero {
            x_start = x_start.max(0);
            y_start = y_start.max(0);
        }

        let mut out = Vec::new();
        for row in y_start..y_end {
            if row < 0 || row as usize >= self.rows {
                continue;
            }
            for col in x_start..x_end {
                if col < 0 || col as usize >= self.columns {
                    continue;
                }
                out.push(row as usize * self.columns + col as usize);
            }
        }
        out
    }
}
