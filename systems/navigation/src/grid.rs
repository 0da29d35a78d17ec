//! Local occupancy grid built around a single path query.

use maze_arena_core::{Footprint, WorldPoint};
use tracing::debug;

use crate::PathOptions;

/// Integer index of a cell in an [`OccupancyGrid`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct GridCell {
    pub(crate) column: usize,
    pub(crate) row: usize,
}

/// Blocked flags for a square-celled window of the arena floor.
#[derive(Debug)]
pub(crate) struct OccupancyGrid {
    origin: WorldPoint,
    cell_size: f32,
    columns: usize,
    rows: usize,
    blocked: Vec<bool>,
}

#[derive(Clone, Copy, Debug)]
struct Bounds {
    min: WorldPoint,
    max: WorldPoint,
}

impl Bounds {
    fn around(start: WorldPoint, goal: WorldPoint, padding: f32) -> Self {
        Self {
            min: WorldPoint::new(start.x.min(goal.x) - padding, start.z.min(goal.z) - padding),
            max: WorldPoint::new(start.x.max(goal.x) + padding, start.z.max(goal.z) + padding),
        }
    }

    fn include(&mut self, footprint: &Footprint) {
        self.min.x = self.min.x.min(footprint.min.x);
        self.min.z = self.min.z.min(footprint.min.z);
        self.max.x = self.max.x.max(footprint.max.x);
        self.max.z = self.max.z.max(footprint.max.z);
    }

    /// Snaps outward to multiples of `cell` and returns the resulting dimensions.
    fn snapped(self, cell: f32) -> (Self, usize, usize) {
        let min = WorldPoint::new(
            (self.min.x / cell).floor() * cell,
            (self.min.z / cell).floor() * cell,
        );
        let max = WorldPoint::new(
            (self.max.x / cell).ceil() * cell,
            (self.max.z / cell).ceil() * cell,
        );
        let columns = (((max.x - min.x) / cell).round() as usize).max(1);
        let rows = (((max.z - min.z) / cell).round() as usize).max(1);
        (Self { min, max }, columns, rows)
    }
}

impl OccupancyGrid {
    /// Builds the grid spanning `start`, `goal`, the search radius, and every
    /// obstacle, marking cells that overlap an obstacle inflated by the clearance.
    ///
    /// Returns `None` when the options are unusable or the window is too large.
    pub(crate) fn build(
        start: WorldPoint,
        goal: WorldPoint,
        obstacles: &[Footprint],
        options: &PathOptions,
    ) -> Option<Self> {
        let cell = options.cell_size;
        if !(cell.is_finite() && cell > 0.0) {
            return None;
        }
        if ![start.x, start.z, goal.x, goal.z]
            .iter()
            .all(|value| value.is_finite())
        {
            return None;
        }

        let window = Bounds::around(start, goal, options.search_radius.max(0.0) + cell);
        let mut bounds = window;
        for footprint in obstacles {
            bounds.include(footprint);
        }

        let (mut snapped, mut columns, mut rows) = bounds.snapped(cell);
        if columns.saturating_mul(rows) > options.max_cells {
            debug!(
                columns,
                rows,
                "obstacle extents exceed cell budget; using search window"
            );
            (snapped, columns, rows) = window.snapped(cell);
            if columns.saturating_mul(rows) > options.max_cells {
                debug!(columns, rows, "search window exceeds cell budget");
                return None;
            }
        }

        let mut grid = Self {
            origin: snapped.min,
            cell_size: cell,
            columns,
            rows,
            blocked: vec![false; columns * rows],
        };
        for footprint in obstacles {
            grid.block(&footprint.expanded(options.clearance));
        }

        Some(grid)
    }

    fn block(&mut self, footprint: &Footprint) {
        let Some((first_column, last_column)) = span(
            footprint.min.x,
            footprint.max.x,
            self.origin.x,
            self.cell_size,
            self.columns,
        ) else {
            return;
        };
        let Some((first_row, last_row)) = span(
            footprint.min.z,
            footprint.max.z,
            self.origin.z,
            self.cell_size,
            self.rows,
        ) else {
            return;
        };

        for row in first_row..=last_row {
            for column in first_column..=last_column {
                let cell = GridCell { column, row };
                if self.footprint_of(cell).intersects(footprint) {
                    self.blocked[row * self.columns + column] = true;
                }
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.blocked.len()
    }

    pub(crate) const fn index(&self, cell: GridCell) -> usize {
        cell.row * self.columns + cell.column
    }

    pub(crate) const fn cell_at(&self, index: usize) -> GridCell {
        GridCell {
            column: index % self.columns,
            row: index / self.columns,
        }
    }

    pub(crate) fn is_blocked(&self, cell: GridCell) -> bool {
        self.blocked[self.index(cell)]
    }

    /// Cell containing `point`, clamped into the grid.
    pub(crate) fn cell_of(&self, point: WorldPoint) -> GridCell {
        let column = ((point.x - self.origin.x) / self.cell_size).floor();
        let row = ((point.z - self.origin.z) / self.cell_size).floor();
        GridCell {
            column: clamp_index(column, self.columns),
            row: clamp_index(row, self.rows),
        }
    }

    pub(crate) fn center(&self, cell: GridCell) -> WorldPoint {
        WorldPoint::new(
            self.origin.x + (cell.column as f32 + 0.5) * self.cell_size,
            self.origin.z + (cell.row as f32 + 0.5) * self.cell_size,
        )
    }

    /// Orthogonal neighbours in east, west, south, north order.
    pub(crate) fn neighbours(&self, cell: GridCell) -> impl Iterator<Item = GridCell> + '_ {
        const STEPS: [(isize, isize); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
        STEPS.iter().filter_map(move |(dx, dz)| {
            let column = cell.column.checked_add_signed(*dx)?;
            let row = cell.row.checked_add_signed(*dz)?;
            (column < self.columns && row < self.rows)
                .then_some(GridCell { column, row })
        })
    }

    fn footprint_of(&self, cell: GridCell) -> Footprint {
        let min = WorldPoint::new(
            self.origin.x + cell.column as f32 * self.cell_size,
            self.origin.z + cell.row as f32 * self.cell_size,
        );
        Footprint::new(
            min,
            WorldPoint::new(min.x + self.cell_size, min.z + self.cell_size),
        )
    }
}

fn clamp_index(value: f32, len: usize) -> usize {
    if value <= 0.0 {
        0
    } else {
        (value as usize).min(len - 1)
    }
}

/// Inclusive range of cells along one axis that may overlap `[low, high]`.
fn span(low: f32, high: f32, origin: f32, cell: f32, len: usize) -> Option<(usize, usize)> {
    let first = ((low - origin) / cell).floor();
    let last = ((high - origin) / cell).ceil() - 1.0;
    if last < 0.0 || first >= len as f32 || last < first {
        return None;
    }
    Some((clamp_index(first, len), clamp_index(last, len)))
}
