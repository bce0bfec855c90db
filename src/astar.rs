//! Risk-aware A* search over a `Grid` (spec.md §4.8).
//!
//! Shaped after the teacher's `layers/road_network.rs::find_path`: dense
//! per-cell `cost_so_far`/`came_from` arrays indexed by `CellId` rather than
//! a `HashMap`, an explicit unseen/frontier/visited state machine, and an
//! optional cancellation predicate generalized from the teacher's
//! `CpuBudget` (there it is polled once per tick; here the search is a
//! single synchronous call, so the predicate is polled once per pop).
//!
//! Ported from `original_source/navigation/astar.py::Astar`. Movement cost
//! between adjacent cells is the chosen heuristic's own distance function
//! (not a flat per-step cost); risk only multiplies the distance-to-goal
//! term of the ranking function, never the accumulated path cost. This
//! makes the search inadmissible when `account_risk` is set -- a deliberate
//! design choice, not a bug (see DESIGN.md).

use crate::error::PlannerResult;
use crate::frontier::PriorityFrontier;
use crate::grid::{CellId, Grid};
use crate::heuristics::Heuristic;
use log::{debug, info};

/// One cell's membership in the search.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum State {
    Unseen,
    Frontier,
    Visited,
}

/// A discovered route from `start` to one of the grid's safe zones.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    pub cells: Vec<CellId>,
    pub cost: f64,
}

/// Tuning knobs for one search (spec.md §4.8 parameters).
#[derive(Copy, Clone, Debug)]
pub struct SearchOptions {
    pub heuristic: Heuristic,
    /// When true, the ranking function weights distance-to-goal by
    /// `risk[v]` instead of `1`, biasing the search toward low-risk cells.
    pub account_risk: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions { heuristic: Heuristic::Euclidean, account_risk: false }
    }
}

/// Finds a path from `start` to the nearest safe zone under the ranking
/// function `f(v) = g(v) + k(v)*h(v)`, `k(v) = risk[v]` when
/// `account_risk` else `1` (spec.md §4.8). Returns `Ok(None)` when no safe
/// zone is reachable from `start` (spec.md §7: `NoPath` is not an error).
pub fn find_path(
    grid: &Grid,
    start: CellId,
    risk: &[u8],
    options: SearchOptions,
    should_cancel: Option<&dyn Fn() -> bool>,
) -> PlannerResult<Option<Path>> {
    grid.validate_start(start)?;

    let cell_count = grid.cell_count();
    let mut state = vec![State::Unseen; cell_count];
    let mut cost_so_far = vec![f64::INFINITY; cell_count];
    let mut came_from: Vec<CellId> = (0..cell_count).collect();

    cost_so_far[start] = 0.0;
    came_from[start] = start;
    state[start] = State::Frontier;

    let mut frontier = PriorityFrontier::new();
    frontier.insert(start, rank(grid, start, 0.0, risk, options));

    let mut expanded = 0usize;

    while let Some(current) = frontier.pop_min() {
        if grid.safe_zones.contains(&current) {
            let path = reconstruct(&came_from, start, current, cost_so_far[current]);
            info!("astar: reached safe zone {} from {} in {} expansions, cost={:.3}", current, start, expanded, path.cost);
            return Ok(Some(path));
        }

        if state[current] == State::Visited {
            continue;
        }
        state[current] = State::Visited;
        expanded += 1;

        if let Some(cancel) = should_cancel {
            if cancel() {
                debug!("astar: search from {} cancelled after {} expansions", start, expanded);
                return Ok(None);
            }
        }

        let current_rc = grid.row_col(current);

        for &next in grid.connections(current) {
            let step_cost = options.heuristic.distance(current_rc, grid.row_col(next));
            let tentative = cost_so_far[current] + step_cost;

            if tentative < cost_so_far[next] {
                if state[next] == State::Visited {
                    continue;
                }

                cost_so_far[next] = tentative;
                came_from[next] = current;
                state[next] = State::Frontier;

                frontier.insert(next, rank(grid, next, tentative, risk, options));
            }
        }
    }

    debug!("astar: frontier exhausted from {} after {} expansions, no safe zone reached", start, expanded);
    Ok(None)
}

/// Ranking value `f(v) = g(v) + k(v)*h(v)` for cell `v` already known to
/// cost `g` from the start (spec.md §4.8 step 4, `_compute_f_value`).
fn rank(grid: &Grid, v: CellId, g: f64, risk: &[u8], options: SearchOptions) -> f64 {
    let h = heuristic_to_nearest_goal(grid, v, options.heuristic);
    let k = if options.account_risk { risk[v] as f64 } else { 1.0 };
    g + k * h
}

/// Minimum heuristic distance from `from` to any safe zone.
fn heuristic_to_nearest_goal(grid: &Grid, from: CellId, heuristic: Heuristic) -> f64 {
    let from_rc = grid.row_col(from);
    grid.safe_zones
        .iter()
        .map(|&goal| heuristic.distance(from_rc, grid.row_col(goal)))
        .fold(f64::INFINITY, f64::min)
}

/// Walks `came_from` back to `start` (which is its own predecessor, the
/// sentinel the loop above seeds), then reverses into start-to-goal order.
fn reconstruct(came_from: &[CellId], start: CellId, goal: CellId, cost: f64) -> Path {
    let mut cells = vec![goal];
    let mut current = goal;
    while current != start {
        current = came_from[current];
        cells.push(current);
    }
    cells.reverse();
    Path { cells, cost }
}
