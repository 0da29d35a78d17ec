//! Four-directional A* over an [`OccupancyGrid`].

use std::{cmp::Reverse, collections::BinaryHeap};

use maze_arena_core::{Footprint, WorldPoint};
use tracing::debug;

use crate::{
    grid::{GridCell, OccupancyGrid},
    PathOptions,
};

const NO_PARENT: usize = usize::MAX;

/// Plans a route from `start` to `goal` around the provided obstacle footprints.
///
/// The first waypoint is `start`, the last is `goal`, and every waypoint in
/// between is the center of a grid cell. An empty result means the goal is
/// unreachable within the grid or the expansion budget; it is not an error.
#[must_use]
pub fn find_path(
    start: WorldPoint,
    goal: WorldPoint,
    obstacles: &[Footprint],
    options: &PathOptions,
) -> Vec<WorldPoint> {
    let Some(grid) = OccupancyGrid::build(start, goal, obstacles, options) else {
        return Vec::new();
    };

    let from = grid.cell_of(start);
    let to = grid.cell_of(goal);
    if from == to {
        return vec![start, goal];
    }

    match search(&grid, from, to, options.max_expansions) {
        Some(cells) => {
            let mut path = Vec::with_capacity(cells.len());
            path.push(start);
            path.extend(
                cells[1..cells.len() - 1]
                    .iter()
                    .map(|cell| grid.center(*cell)),
            );
            path.push(goal);
            path
        }
        None => Vec::new(),
    }
}

/// Returns the cell sequence from `from` to `to`, both included.
///
/// Blocked cells are never entered, except for `to` itself; `from` is always
/// usable as the origin.
fn search(
    grid: &OccupancyGrid,
    from: GridCell,
    to: GridCell,
    max_expansions: usize,
) -> Option<Vec<GridCell>> {
    let goal_index = grid.index(to);
    let mut best = vec![u32::MAX; grid.len()];
    let mut parent = vec![NO_PARENT; grid.len()];
    let mut closed = vec![false; grid.len()];
    let mut open = BinaryHeap::new();
    let mut sequence: u64 = 0;
    let mut expansions = 0usize;

    let start_index = grid.index(from);
    best[start_index] = 0;
    open.push(Reverse((manhattan(from, to), sequence, start_index)));

    while let Some(Reverse((_, _, index))) = open.pop() {
        if closed[index] {
            continue;
        }
        if index == goal_index {
            return Some(reconstruct(grid, &parent, goal_index));
        }
        closed[index] = true;

        expansions += 1;
        if expansions > max_expansions {
            debug!(max_expansions, "path search exhausted its expansion budget");
            return None;
        }

        let cell = grid.cell_at(index);
        let cost = best[index].saturating_add(1);
        for next in grid.neighbours(cell) {
            let next_index = grid.index(next);
            if closed[next_index] || (next_index != goal_index && grid.is_blocked(next)) {
                continue;
            }
            if cost < best[next_index] {
                best[next_index] = cost;
                parent[next_index] = index;
                sequence += 1;
                open.push(Reverse((
                    cost.saturating_add(manhattan(next, to)),
                    sequence,
                    next_index,
                )));
            }
        }
    }

    None
}

fn reconstruct(grid: &OccupancyGrid, parent: &[usize], goal_index: usize) -> Vec<GridCell> {
    let mut cells = Vec::new();
    let mut index = goal_index;
    while index != NO_PARENT {
        cells.push(grid.cell_at(index));
        index = parent[index];
    }
    cells.reverse();
    cells
}

fn manhattan(a: GridCell, b: GridCell) -> u32 {
    let distance = a.column.abs_diff(b.column) + a.row.abs_diff(b.row);
    u32::try_from(distance).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_floor_walks_a_shortest_manhattan_route() {
        let path = find_path(
            WorldPoint::new(0.2, 0.2),
            WorldPoint::new(4.7, 2.3),
            &[],
            &PathOptions::default(),
        );

        assert_eq!(path.first(), Some(&WorldPoint::new(0.2, 0.2)));
        assert_eq!(path.last(), Some(&WorldPoint::new(4.7, 2.3)));
        // 4 columns and 2 rows apart: 6 moves, 5 intermediate cells.
        assert_eq!(path.len(), 7);
    }

    #[test]
    fn shared_cell_returns_both_endpoints() {
        let path = find_path(
            WorldPoint::new(0.1, 0.1),
            WorldPoint::new(0.9, 0.8),
            &[],
            &PathOptions::default(),
        );
        assert_eq!(
            path,
            vec![WorldPoint::new(0.1, 0.1), WorldPoint::new(0.9, 0.8)]
        );
    }

    #[test]
    fn expansion_budget_bounds_the_search() {
        let wall = Footprint::new(WorldPoint::new(2.0, -30.0), WorldPoint::new(3.0, 30.0));
        let options = PathOptions {
            max_expansions: 10,
            ..PathOptions::default()
        };
        let path = find_path(
            WorldPoint::new(0.0, 0.0),
            WorldPoint::new(5.0, 0.0),
            &[wall],
            &options,
        );
        assert!(path.is_empty());
    }

    #[test]
    fn blocked_endpoints_are_still_usable() {
        let crate_box = Footprint::new(WorldPoint::new(-0.4, -0.4), WorldPoint::new(0.4, 0.4));
        let path = find_path(
            WorldPoint::new(0.0, 0.0),
            WorldPoint::new(6.0, 0.0),
            &[crate_box],
            &PathOptions::default(),
        );
        assert_eq!(path.first(), Some(&WorldPoint::new(0.0, 0.0)));
        assert_eq!(path.last(), Some(&WorldPoint::new(6.0, 0.0)));

        let reversed = find_path(
            WorldPoint::new(6.0, 0.0),
            WorldPoint::new(0.0, 0.0),
            &[crate_box],
            &PathOptions::default(),
        );
        assert!(!reversed.is_empty());
    }
}
