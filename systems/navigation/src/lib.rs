#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Grid navigation for agents moving through the arena.
//!
//! Path queries never read the live collider index. Callers take a
//! [`snapshot_footprints`] copy and hand it to [`find_path`], to a
//! [`PathCache`], or across the [`PathWorker`] boundary, so a mutation of the
//! arena during the same tick cannot affect a search in progress.

mod astar;
mod cache;
mod grid;
mod worker;

use maze_arena_core::{Aabb, Footprint, WorkerOptions};
use serde::{Deserialize, Serialize};

pub use astar::find_path;
pub use cache::{CacheOptions, PathCache};
pub use worker::{handle_request, PathDispatcher, PathWorker, WorkerError};

/// Tuning knobs for a single path query.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathOptions {
    /// Edge length of a navigation cell.
    pub cell_size: f32,
    /// Distance the grid extends beyond the start and goal.
    pub search_radius: f32,
    /// Safety margin added around every obstacle footprint.
    pub clearance: f32,
    /// Colliders whose top is at or below this height never block movement.
    pub climbable_height: f32,
    /// Upper bound on expanded cells before the search gives up.
    pub max_expansions: usize,
    /// Upper bound on the number of cells in the occupancy grid.
    pub max_cells: usize,
}

impl Default for PathOptions {
    fn default() -> Self {
        Self {
            cell_size: 1.0,
            search_radius: 20.0,
            clearance: 0.5,
            climbable_height: 0.5,
            max_expansions: 50_000,
            max_cells: 1_000_000,
        }
    }
}

impl PathOptions {
    /// Options carried across the worker boundary.
    #[must_use]
    pub fn worker_options(&self) -> WorkerOptions {
        WorkerOptions {
            grid_size: self.cell_size,
            radius: self.search_radius,
            clearance: self.clearance,
            max_expansions: self.max_expansions,
        }
    }
}

impl From<WorkerOptions> for PathOptions {
    fn from(options: WorkerOptions) -> Self {
        Self {
            cell_size: options.grid_size,
            search_radius: options.radius,
            clearance: options.clearance,
            max_expansions: options.max_expansions,
            ..Self::default()
        }
    }
}

/// Copies the ground footprint of every collider taller than the climbable height.
#[must_use]
pub fn snapshot_footprints<'a, I>(colliders: I, options: &PathOptions) -> Vec<Footprint>
where
    I: IntoIterator<Item = &'a Aabb>,
{
    colliders
        .into_iter()
        .filter(|aabb| aabb.max.y > options.climbable_height)
        .map(Aabb::footprint)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_arena_core::{HalfExtents, WorldPosition};

    #[test]
    fn low_colliders_are_left_out_of_snapshots() {
        let curb = Aabb::from_center(
            WorldPosition::new(0.0, 0.15, 0.0),
            HalfExtents::new(2.0, 0.15, 2.0),
        );
        let wall = Aabb::from_center(
            WorldPosition::new(5.0, 1.5, 0.0),
            HalfExtents::new(0.5, 1.5, 3.0),
        );

        let footprints = snapshot_footprints([&curb, &wall], &PathOptions::default());

        assert_eq!(footprints, vec![wall.footprint()]);
    }

    #[test]
    fn worker_options_round_trip_the_shared_fields() {
        let options = PathOptions {
            cell_size: 0.5,
            search_radius: 12.0,
            ..PathOptions::default()
        };
        let restored = PathOptions::from(options.worker_options());
        assert_eq!(restored, options);
    }
}
