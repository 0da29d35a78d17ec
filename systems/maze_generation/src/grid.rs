//! Wall matrices of the logical maze grid and their traversal queries.

use std::collections::VecDeque;

/// Interior edge between two adjacent cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) enum Edge {
    /// Wall between `(row, col)` and `(row, col + 1)`.
    Vertical { row: usize, col: usize },
    /// Wall between `(row, col)` and `(row + 1, col)`.
    Horizontal { row: usize, col: usize },
}

/// Presence flags for every interior wall of a square grid.
///
/// `vertical` holds `size` rows of `size - 1` entries; `horizontal` holds
/// `size - 1` rows of `size` entries. Both are stored row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct WallGrid {
    size: usize,
    vertical: Vec<bool>,
    horizontal: Vec<bool>,
}

impl WallGrid {
    pub(crate) fn filled(size: usize) -> Self {
        let inner = size.saturating_sub(1);
        Self {
            size,
            vertical: vec![true; size * inner],
            horizontal: vec![true; inner * size],
        }
    }

    pub(crate) const fn size(&self) -> usize {
        self.size
    }

    /// Every interior edge, vertical walls first, row-major.
    pub(crate) fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        let inner = self.size.saturating_sub(1);
        let vertical = (0..self.size)
            .flat_map(move |row| (0..inner).map(move |col| Edge::Vertical { row, col }));
        let horizontal = (0..inner)
            .flat_map(move |row| (0..self.size).map(move |col| Edge::Horizontal { row, col }));
        vertical.chain(horizontal)
    }

    pub(crate) fn present(&self) -> impl Iterator<Item = Edge> + '_ {
        self.edges().filter(|edge| self.has_wall(*edge))
    }

    pub(crate) fn wall_count(&self) -> usize {
        self.vertical.iter().chain(&self.horizontal).filter(|wall| **wall).count()
    }

    pub(crate) fn has_wall(&self, edge: Edge) -> bool {
        match edge {
            Edge::Vertical { row, col } => self.vertical[self.vertical_index(row, col)],
            Edge::Horizontal { row, col } => self.horizontal[row * self.size + col],
        }
    }

    pub(crate) fn set_wall(&mut self, edge: Edge, present: bool) {
        match edge {
            Edge::Vertical { row, col } => {
                let index = self.vertical_index(row, col);
                self.vertical[index] = present;
            }
            Edge::Horizontal { row, col } => {
                let index = row * self.size + col;
                self.horizontal[index] = present;
            }
        }
    }

    /// Edge separating two orthogonally adjacent cells.
    pub(crate) fn edge_between(a: (usize, usize), b: (usize, usize)) -> Option<Edge> {
        let ((row_a, col_a), (row_b, col_b)) = (a, b);
        if row_a == row_b && col_a.abs_diff(col_b) == 1 {
            Some(Edge::Vertical {
                row: row_a,
                col: col_a.min(col_b),
            })
        } else if col_a == col_b && row_a.abs_diff(row_b) == 1 {
            Some(Edge::Horizontal {
                row: row_a.min(row_b),
                col: col_a,
            })
        } else {
            None
        }
    }

    /// In-bounds orthogonal neighbours of a cell in north, west, east, south order.
    pub(crate) fn neighbours(&self, (row, col): (usize, usize)) -> Vec<(usize, usize)> {
        let mut cells = Vec::with_capacity(4);
        if row > 0 {
            cells.push((row - 1, col));
        }
        if col > 0 {
            cells.push((row, col - 1));
        }
        if col + 1 < self.size {
            cells.push((row, col + 1));
        }
        if row + 1 < self.size {
            cells.push((row + 1, col));
        }
        cells
    }

    /// Reports whether every west-edge cell reaches the east edge and every
    /// north-edge cell reaches the south edge through open edges.
    pub(crate) fn is_traversable(&self) -> bool {
        if self.size == 0 {
            return true;
        }
        let last = self.size - 1;

        let from_east = self.reachable((0..self.size).map(|row| (row, last)));
        let west_connected = (0..self.size).all(|row| from_east[row * self.size]);

        let from_south = self.reachable((0..self.size).map(|col| (last, col)));
        let north_connected = (0..self.size).all(|col| from_south[col]);

        west_connected && north_connected
    }

    /// Breadth-first flood from the provided cells, indexed `row * size + col`.
    fn reachable(&self, sources: impl Iterator<Item = (usize, usize)>) -> Vec<bool> {
        let mut seen = vec![false; self.size * self.size];
        let mut queue = VecDeque::new();
        for cell in sources {
            let index = cell.0 * self.size + cell.1;
            if !seen[index] {
                seen[index] = true;
                queue.push_back(cell);
            }
        }

        while let Some(cell) = queue.pop_front() {
            for next in self.neighbours(cell) {
                let index = next.0 * self.size + next.1;
                if seen[index] {
                    continue;
                }
                let open = Self::edge_between(cell, next)
                    .is_some_and(|edge| !self.has_wall(edge));
                if open {
                    seen[index] = true;
                    queue.push_back(next);
                }
            }
        }

        seen
    }

    fn vertical_index(&self, row: usize, col: usize) -> usize {
        row * self.size.saturating_sub(1) + col
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filled_grid_blocks_every_crossing() {
        let grid = WallGrid::filled(4);
        assert_eq!(grid.wall_count(), 24);
        assert_eq!(grid.edges().count(), 24);
        assert!(!grid.is_traversable());
    }

    #[test]
    fn single_corridors_satisfy_edge_reachability() {
        let mut grid = WallGrid::filled(3);
        for col in 0..2 {
            grid.set_wall(Edge::Vertical { row: 0, col }, false);
        }
        for row in 0..2 {
            grid.set_wall(Edge::Horizontal { row, col: 0 }, false);
        }
        assert!(grid.is_traversable());

        grid.set_wall(Edge::Horizontal { row: 1, col: 0 }, true);
        assert!(!grid.is_traversable());
    }

    #[test]
    fn edges_between_adjacent_cells_only() {
        assert_eq!(
            WallGrid::edge_between((2, 1), (2, 2)),
            Some(Edge::Vertical { row: 2, col: 1 })
        );
        assert_eq!(
            WallGrid::edge_between((1, 3), (0, 3)),
            Some(Edge::Horizontal { row: 0, col: 3 })
        );
        assert_eq!(WallGrid::edge_between((0, 0), (1, 1)), None);
    }

    #[test]
    fn single_cell_grid_is_trivially_traversable() {
        let grid = WallGrid::filled(1);
        assert_eq!(grid.wall_count(), 0);
        assert!(grid.is_traversable());
    }
}
