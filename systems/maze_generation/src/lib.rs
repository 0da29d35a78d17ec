#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic maze generation system.
//!
//! The generator carves a randomized spanning tree through a fully walled
//! square grid, opens a few extra loops, keeps spawn lanes clear, and then
//! grows the wall set back toward a target coverage while both edge-to-edge
//! crossings stay open.

mod grid;

use std::f32::consts::FRAC_PI_2;

use maze_arena_core::{
    ColliderEntry, Footprint, HalfExtents, RandomSource, Seed, WallSegment, WorldPosition,
    RNG_STREAM_MAZE,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::grid::{Edge, WallGrid};

/// Straight axis a fairness lane runs along.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaneAxis {
    /// Lane parallel to the x axis, positioned by its z offset.
    X,
    /// Lane parallel to the z axis, positioned by its x offset.
    Z,
}

/// Spawn line that walls must keep clear of.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FairnessZone {
    /// Circle centered on the arena origin.
    Ring {
        /// Radius of the circle.
        radius: f32,
    },
    /// Straight line crossing the whole arena.
    Lane {
        /// Axis the lane runs along.
        axis: LaneAxis,
        /// Offset of the lane on the other axis.
        offset: f32,
    },
}

/// Tuning knobs for maze generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeConfig {
    /// Number of cells along each side of the logical grid.
    pub grid_size: usize,
    /// Edge length of the square arena centered on the origin.
    pub arena_size: f32,
    /// Thickness of every wall segment.
    pub wall_thickness: f32,
    /// Height of every wall segment.
    pub wall_height: f32,
    /// Walls removed after the spanning tree to create alternate routes.
    pub extra_openings: u32,
    /// Fraction of the arena floor the balancer grows walls toward.
    pub target_coverage: f32,
    /// Fraction of the arena floor walls may never exceed.
    pub max_coverage: f32,
    /// Upper bound on walls tentatively added while balancing.
    pub balance_attempts: u32,
    /// Spawn lines kept free of walls.
    pub fairness_zones: Vec<FairnessZone>,
    /// Clearance kept between walls and every fairness zone.
    pub fairness_margin: f32,
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            grid_size: 6,
            arena_size: 60.0,
            wall_thickness: 1.2,
            wall_height: 3.5,
            extra_openings: 4,
            target_coverage: 0.16,
            max_coverage: 0.20,
            balance_attempts: 1200,
            fairness_zones: vec![FairnessZone::Ring { radius: 24.0 }],
            fairness_margin: 1.0,
        }
    }
}

impl MazeConfig {
    /// Edge length of one logical cell.
    #[must_use]
    pub fn cell_size(&self) -> f32 {
        self.arena_size / self.grid_size.max(1) as f32
    }

    /// Floor area covered by a single wall segment.
    #[must_use]
    pub fn segment_area(&self) -> f32 {
        self.cell_size() * self.wall_thickness
    }

    fn arena_area(&self) -> f64 {
        f64::from(self.arena_size) * f64::from(self.arena_size)
    }

    fn edge_center(&self, edge: Edge) -> (f32, f32) {
        let half = self.arena_size * 0.5;
        let cell = self.cell_size();
        match edge {
            Edge::Vertical { row, col } => (
                -half + (col as f32 + 1.0) * cell,
                -half + (row as f32 + 0.5) * cell,
            ),
            Edge::Horizontal { row, col } => (
                -half + (col as f32 + 0.5) * cell,
                -half + (row as f32 + 1.0) * cell,
            ),
        }
    }

    fn segment(&self, edge: Edge) -> WallSegment {
        let (x, z) = self.edge_center(edge);
        let half_extents = HalfExtents::new(
            self.cell_size() * 0.5,
            self.wall_height * 0.5,
            self.wall_thickness * 0.5,
        );
        let rotation_y = match edge {
            Edge::Vertical { .. } => FRAC_PI_2,
            Edge::Horizontal { .. } => 0.0,
        };
        WallSegment::new(
            WorldPosition::new(x, self.wall_height * 0.5, z),
            half_extents,
            rotation_y,
        )
    }

    /// Reports whether a wall on `edge` would come within the fairness margin
    /// of any zone.
    fn crowds_fairness_zone(&self, edge: Edge) -> bool {
        let footprint = self.segment(edge).world_aabb().footprint();

        self.fairness_zones.iter().any(|zone| match *zone {
            FairnessZone::Ring { radius } => ring_gap(&footprint, radius) <= self.fairness_margin,
            FairnessZone::Lane { axis, offset } => {
                let (low, high) = match axis {
                    LaneAxis::X => (footprint.min.z, footprint.max.z),
                    LaneAxis::Z => (footprint.min.x, footprint.max.x),
                };
                let gap = (low - offset).max(offset - high).max(0.0);
                gap <= self.fairness_margin
            }
        })
    }
}

/// Pure system that turns a random stream into a maze wall layout.
#[derive(Clone, Debug, Default)]
pub struct MazeGenerator {
    config: MazeConfig,
}

impl MazeGenerator {
    /// Creates a generator with the provided tuning.
    #[must_use]
    pub fn new(config: MazeConfig) -> Self {
        Self { config }
    }

    /// Tuning used by the generator.
    #[must_use]
    pub fn config(&self) -> &MazeConfig {
        &self.config
    }

    /// Builds a maze from the `maze` stream of `seed`.
    #[must_use]
    pub fn build_from_seed(&self, seed: &Seed) -> MazeLayout {
        let mut rng = RandomSource::derive_namespaced(seed, RNG_STREAM_MAZE);
        self.build(&mut rng)
    }

    /// Builds a maze drawing every random choice from `rng`.
    pub fn build(&self, rng: &mut RandomSource) -> MazeLayout {
        let config = &self.config;
        let mut grid = WallGrid::filled(config.grid_size.max(1));

        carve_spanning_tree(&mut grid, rng);
        open_extra_loops(&mut grid, config.extra_openings, rng);

        let protected: Vec<Edge> = grid
            .edges()
            .filter(|edge| config.crowds_fairness_zone(*edge))
            .collect();
        for edge in &protected {
            grid.set_wall(*edge, false);
        }

        let carved = grid.clone();
        let balance = balance_coverage(&mut grid, config, &protected, rng);
        trim_to_cap(&mut grid, config, rng);

        if !grid.is_traversable() {
            warn!("maze lost its crossings after balancing; carving fallback corridor");
            carve_corridor(&mut grid);
            if !grid.is_traversable() {
                grid = carved;
                carve_corridor(&mut grid);
            }
        }

        let walls: Vec<WallSegment> = grid.present().map(|edge| config.segment(edge)).collect();
        let layout = MazeLayout {
            config: config.clone(),
            grid,
            walls,
        };

        debug!(
            walls = layout.walls.len(),
            protected = protected.len(),
            coverage = layout.coverage(),
            balance_attempts = balance.attempts,
            balance_rejected = balance.rejected,
            "maze generated"
        );

        layout
    }
}

/// Wall layout produced by [`MazeGenerator`].
#[derive(Clone, Debug, PartialEq)]
pub struct MazeLayout {
    config: MazeConfig,
    grid: WallGrid,
    walls: Vec<WallSegment>,
}

impl MazeLayout {
    /// Number of cells along each side of the grid.
    #[must_use]
    pub fn grid_size(&self) -> usize {
        self.grid.size()
    }

    /// Reports whether a wall separates `(row, col)` from `(row, col + 1)`.
    #[must_use]
    pub fn has_vertical_wall(&self, row: usize, col: usize) -> bool {
        row < self.grid.size()
            && col + 1 < self.grid.size()
            && self.grid.has_wall(Edge::Vertical { row, col })
    }

    /// Reports whether a wall separates `(row, col)` from `(row + 1, col)`.
    #[must_use]
    pub fn has_horizontal_wall(&self, row: usize, col: usize) -> bool {
        row + 1 < self.grid.size()
            && col < self.grid.size()
            && self.grid.has_wall(Edge::Horizontal { row, col })
    }

    /// Wall segments, vertical walls first, each group row-major.
    #[must_use]
    pub fn walls(&self) -> &[WallSegment] {
        &self.walls
    }

    /// Total floor area covered by the walls.
    #[must_use]
    pub fn wall_area(&self) -> f32 {
        self.walls.iter().map(WallSegment::footprint_area).sum()
    }

    /// Fraction of the arena floor covered by the walls.
    #[must_use]
    pub fn coverage(&self) -> f32 {
        let area = self.config.arena_area();
        if area <= 0.0 {
            return 0.0;
        }
        (f64::from(self.wall_area()) / area) as f32
    }

    /// Reports whether both edge-to-edge crossings are open.
    #[must_use]
    pub fn is_traversable(&self) -> bool {
        self.grid.is_traversable()
    }

    /// Renders the grid with `+`, `---`, and `|` glyphs, north row first.
    #[must_use]
    pub fn to_ascii(&self) -> String {
        let size = self.grid.size();
        let mut out = String::new();

        for row in 0..size {
            for col in 0..size {
                out.push('+');
                let closed = row == 0 || self.has_horizontal_wall(row - 1, col);
                out.push_str(if closed { "---" } else { "   " });
            }
            out.push_str("+\n");

            for col in 0..size {
                let closed = col == 0 || self.has_vertical_wall(row, col - 1);
                out.push(if closed { '|' } else { ' ' });
                out.push_str("   ");
            }
            out.push_str("|\n");
        }

        for _ in 0..size {
            out.push_str("+---");
        }
        out.push_str("+\n");
        out
    }
}

/// Distance between a rectangle and the circle of `radius` around the origin,
/// zero when the circle passes through the rectangle.
fn ring_gap(footprint: &Footprint, radius: f32) -> f32 {
    let near_x = footprint.min.x.max(-footprint.max.x).max(0.0);
    let near_z = footprint.min.z.max(-footprint.max.z).max(0.0);
    let nearest = (near_x * near_x + near_z * near_z).sqrt();
    if nearest > radius {
        return nearest - radius;
    }

    let far_x = footprint.min.x.abs().max(footprint.max.x.abs());
    let far_z = footprint.min.z.abs().max(footprint.max.z.abs());
    let farthest = (far_x * far_x + far_z * far_z).sqrt();
    (radius - farthest).max(0.0)
}

#[derive(Clone, Copy, Debug, Default)]
struct BalanceReport {
    attempts: u32,
    rejected: u32,
}

/// Randomized Prim carve leaving exactly one route between any two cells.
fn carve_spanning_tree(grid: &mut WallGrid, rng: &mut RandomSource) {
    let size = grid.size();
    let mut visited = vec![false; size * size];
    let mut queued = vec![false; size * size];
    let mut frontier: Vec<(usize, usize)> = Vec::new();

    let start = rng.next_index(size * size);
    let start = (start / size, start % size);
    visited[start.0 * size + start.1] = true;
    for next in grid.neighbours(start) {
        queued[next.0 * size + next.1] = true;
        frontier.push(next);
    }

    while !frontier.is_empty() {
        let cell = frontier.swap_remove(rng.next_index(frontier.len()));
        let links: Vec<(usize, usize)> = grid
            .neighbours(cell)
            .into_iter()
            .filter(|next| visited[next.0 * size + next.1])
            .collect();
        if let Some(link) = rng.pick(&links) {
            if let Some(edge) = WallGrid::edge_between(cell, *link) {
                grid.set_wall(edge, false);
            }
        }
        visited[cell.0 * size + cell.1] = true;

        for next in grid.neighbours(cell) {
            let index = next.0 * size + next.1;
            if !visited[index] && !queued[index] {
                queued[index] = true;
                frontier.push(next);
            }
        }
    }
}

fn open_extra_loops(grid: &mut WallGrid, openings: u32, rng: &mut RandomSource) {
    for _ in 0..openings {
        let present: Vec<Edge> = grid.present().collect();
        match rng.pick(&present) {
            Some(edge) => grid.set_wall(*edge, false),
            None => break,
        }
    }
}

/// Adds random walls toward the target coverage, reverting any addition that
/// closes an edge-to-edge crossing.
///
/// Adding walls only removes routes, so a rejected edge is never retried.
fn balance_coverage(
    grid: &mut WallGrid,
    config: &MazeConfig,
    protected: &[Edge],
    rng: &mut RandomSource,
) -> BalanceReport {
    let target = config.arena_area() * f64::from(config.target_coverage);
    let segment = f64::from(config.segment_area());
    let mut candidates: Vec<Edge> = grid
        .edges()
        .filter(|edge| !grid.has_wall(*edge) && !protected.contains(edge))
        .collect();
    let mut report = BalanceReport::default();

    while report.attempts < config.balance_attempts && !candidates.is_empty() {
        if grid.wall_count() as f64 * segment >= target {
            break;
        }
        report.attempts += 1;

        let edge = candidates.swap_remove(rng.next_index(candidates.len()));
        grid.set_wall(edge, true);
        if !grid.is_traversable() {
            grid.set_wall(edge, false);
            report.rejected += 1;
        }
    }

    report
}

fn trim_to_cap(grid: &mut WallGrid, config: &MazeConfig, rng: &mut RandomSource) {
    let cap = config.arena_area() * f64::from(config.max_coverage);
    let segment = f64::from(config.segment_area());

    while grid.wall_count() as f64 * segment > cap {
        let present: Vec<Edge> = grid.present().collect();
        match rng.pick(&present) {
            Some(edge) => grid.set_wall(*edge, false),
            None => break,
        }
    }
}

/// Clears the middle row and column so both crossings run straight through.
fn carve_corridor(grid: &mut WallGrid) {
    let size = grid.size();
    let middle = size / 2;
    for col in 0..size.saturating_sub(1) {
        grid.set_wall(Edge::Vertical { row: middle, col }, false);
    }
    for row in 0..size.saturating_sub(1) {
        grid.set_wall(Edge::Horizontal { row, col: middle }, false);
    }
}
