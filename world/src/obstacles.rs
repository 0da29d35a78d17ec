//! Ownership of destructible props and authored level content.

use maze_arena_core::{
    Aabb, AgentId, AgentPosition, ColliderEntry, ColliderId, ColliderIndex, ColliderOwner,
    HalfExtents, LevelLayout, ObstacleId, ObstacleKind, RandomSource, WallSegment, WorldPosition,
};
use tracing::debug;

use crate::placement::{try_place, PlacementConfig};

/// Destructible prop owned by the arena until it is destroyed.
#[derive(Clone, Debug, PartialEq)]
pub struct Destructible {
    id: ObstacleId,
    kind: ObstacleKind,
    position: WorldPosition,
    rotation_y: f32,
    half_extents: HalfExtents,
    hit_points: u32,
    collider: Option<ColliderId>,
}

impl Destructible {
    /// Authored prop whose bounds follow its exact rotation.
    pub(crate) fn new(
        id: ObstacleId,
        kind: ObstacleKind,
        position: WorldPosition,
        rotation_y: f32,
    ) -> Self {
        let half_extents = kind.half_extents().rotated_y(rotation_y);
        Self::with_extents(id, kind, position, rotation_y, half_extents)
    }

    /// Randomly scattered prop.
    ///
    /// Props free to take any angle are bounded by their enclosing circle, so
    /// placement never depends on the platform's `cos` and `sin`.
    pub(crate) fn scattered(
        id: ObstacleId,
        kind: ObstacleKind,
        position: WorldPosition,
        rotation_y: f32,
    ) -> Self {
        let half_extents = if kind.snaps_to_right_angles() {
            kind.half_extents().rotated_y(rotation_y)
        } else {
            kind.half_extents().enclosing_y()
        };
        Self::with_extents(id, kind, position, rotation_y, half_extents)
    }

    fn with_extents(
        id: ObstacleId,
        kind: ObstacleKind,
        position: WorldPosition,
        rotation_y: f32,
        half_extents: HalfExtents,
    ) -> Self {
        Self {
            id,
            kind,
            position,
            rotation_y,
            half_extents,
            hit_points: kind.hit_points(),
            collider: None,
        }
    }

    /// Identifier allocated by the arena.
    #[must_use]
    pub const fn id(&self) -> ObstacleId {
        self.id
    }

    /// Type of the prop.
    #[must_use]
    pub const fn kind(&self) -> ObstacleKind {
        self.kind
    }

    /// Center of the prop.
    #[must_use]
    pub const fn position(&self) -> WorldPosition {
        self.position
    }

    /// Rotation around the vertical axis, in radians.
    #[must_use]
    pub const fn rotation_y(&self) -> f32 {
        self.rotation_y
    }

    /// Remaining hit points.
    #[must_use]
    pub const fn hit_points(&self) -> u32 {
        self.hit_points
    }

    /// Axis-aligned half-extents of the prop's collider.
    #[must_use]
    pub const fn half_extents(&self) -> HalfExtents {
        self.half_extents
    }
}

impl ColliderEntry for Destructible {
    fn world_aabb(&self) -> Aabb {
        Aabb::from_center(self.position, self.half_extents())
    }
}

/// Outcome of a scatter pass before it is flushed into the colliders.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct ScatterReport {
    pub(crate) staged: usize,
    pub(crate) skipped: usize,
}

/// Counts of the entities created by a layout load.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct LayoutSummary {
    pub(crate) walls: usize,
    pub(crate) ramp_steps: usize,
    pub(crate) obstacles: usize,
    pub(crate) enemy_spawns: usize,
}

/// Agent caught inside an explosion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct BlastHit {
    pub(crate) agent: AgentId,
    pub(crate) distance_squared: f32,
}

/// Result of damaging a prop.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum DamageOutcome {
    Damaged {
        remaining: u32,
    },
    Destroyed {
        destructible: Destructible,
        destroyed_total: u32,
        blast: Vec<BlastHit>,
    },
}

/// Scatters, loads, and destroys the props and authored structures of an arena.
///
/// Placement stages props in a pending batch; [`ObstaclePlacementManager::flush`]
/// merges the whole batch into the collider index at once so a generation pass
/// produces a single collider change.
#[derive(Debug, Default)]
pub(crate) struct ObstaclePlacementManager {
    config: PlacementConfig,
    destructibles: Vec<Destructible>,
    pending: Vec<Destructible>,
    layout_walls: Vec<WallSegment>,
    ramp_steps: Vec<WallSegment>,
    enemy_spawns: Vec<WorldPosition>,
    player_spawn: Option<WorldPosition>,
    next_id: u32,
    destroyed: u32,
}

impl ObstaclePlacementManager {
    pub(crate) fn new(config: PlacementConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Stages a full scatter pass drawn from `rng`.
    pub(crate) fn scatter(
        &mut self,
        rng: &mut RandomSource,
        colliders: &ColliderIndex,
    ) -> ScatterReport {
        let mut report = ScatterReport::default();

        for kind in ObstacleKind::ALL {
            for _ in 0..self.config.count(kind) {
                let id = ObstacleId::new(self.next_id);
                match try_place(id, kind, &self.config, rng, colliders, &self.pending) {
                    Some(destructible) => {
                        self.next_id = self.next_id.wrapping_add(1);
                        self.pending.push(destructible);
                        report.staged += 1;
                    }
                    None => {
                        debug!(
                            kind = kind.name(),
                            attempts = self.config.attempts_per_prop,
                            "no free position found; skipping prop"
                        );
                        report.skipped += 1;
                    }
                }
            }
        }

        report
    }

    /// Merges the pending batch into the collider index, returning its size.
    pub(crate) fn flush(&mut self, colliders: &mut ColliderIndex) -> usize {
        let flushed = self.pending.len();
        for mut destructible in self.pending.drain(..) {
            let owner = ColliderOwner::Obstacle(destructible.id);
            destructible.collider = Some(colliders.insert(owner, &destructible));
            self.destructibles.push(destructible);
        }
        flushed
    }

    /// Instantiates an authored layout, registering every structure as a collider.
    pub(crate) fn load_from_map(
        &mut self,
        layout: &LevelLayout,
        colliders: &mut ColliderIndex,
    ) -> LayoutSummary {
        for wall in &layout.walls {
            let segment = wall.segment();
            let _ = colliders.insert(ColliderOwner::LayoutWall, &segment);
            self.layout_walls.push(segment);
        }

        let mut ramp_steps = 0;
        for ramp in &layout.ramps {
            for step in ramp.step_segments() {
                let _ = colliders.insert(ColliderOwner::RampStep, &step);
                self.ramp_steps.push(step);
                ramp_steps += 1;
            }
        }

        for authored in &layout.obstacles {
            let id = ObstacleId::new(self.next_id);
            self.next_id = self.next_id.wrapping_add(1);
            self.pending.push(Destructible::new(
                id,
                authored.kind,
                authored.position,
                authored.rotation_y,
            ));
        }
        let obstacles = self.flush(colliders);

        self.enemy_spawns.extend_from_slice(&layout.enemy_spawns);
        if layout.player_spawn.is_some() {
            self.player_spawn = layout.player_spawn;
        }

        LayoutSummary {
            walls: layout.walls.len(),
            ramp_steps,
            obstacles,
            enemy_spawns: layout.enemy_spawns.len(),
        }
    }

    /// Removes `amount` hit points from a prop, destroying it at zero.
    ///
    /// Returns `None` when no live prop carries the identifier.
    pub(crate) fn damage(
        &mut self,
        id: ObstacleId,
        amount: u32,
        agents: &[AgentPosition],
        colliders: &mut ColliderIndex,
    ) -> Option<DamageOutcome> {
        let index = self
            .destructibles
            .iter()
            .position(|destructible| destructible.id == id)?;

        let remaining = self.destructibles[index].hit_points.saturating_sub(amount);
        if remaining > 0 {
            self.destructibles[index].hit_points = remaining;
            return Some(DamageOutcome::Damaged { remaining });
        }

        let mut destructible = self.destructibles.remove(index);
        destructible.hit_points = 0;
        if let Some(collider) = destructible.collider.take() {
            let _ = colliders.remove(collider);
        }
        self.destroyed = self.destroyed.saturating_add(1);

        let blast = match destructible.kind.blast_radius() {
            Some(radius) => blast_hits(&destructible, radius, agents),
            None => Vec::new(),
        };

        Some(DamageOutcome::Destroyed {
            destructible,
            destroyed_total: self.destroyed,
            blast,
        })
    }

    /// Forgets every prop, authored structure, and spawn point.
    pub(crate) fn clear(&mut self) {
        self.destructibles.clear();
        self.pending.clear();
        self.layout_walls.clear();
        self.ramp_steps.clear();
        self.enemy_spawns.clear();
        self.player_spawn = None;
    }

    pub(crate) fn config(&self) -> &PlacementConfig {
        &self.config
    }

    pub(crate) fn destructibles(&self) -> &[Destructible] {
        &self.destructibles
    }

    pub(crate) fn layout_walls(&self) -> &[WallSegment] {
        &self.layout_walls
    }

    pub(crate) fn ramp_steps(&self) -> &[WallSegment] {
        &self.ramp_steps
    }

    pub(crate) fn enemy_spawns(&self) -> &[WorldPosition] {
        &self.enemy_spawns
    }

    pub(crate) fn player_spawn(&self) -> Option<WorldPosition> {
        self.player_spawn
    }

    pub(crate) fn destroyed(&self) -> u32 {
        self.destroyed
    }
}

fn blast_hits(source: &Destructible, radius: f32, agents: &[AgentPosition]) -> Vec<BlastHit> {
    let center = source.position.planar();
    let radius_squared = radius * radius;
    agents
        .iter()
        .filter_map(|agent| {
            let distance_squared = center.distance_squared(agent.position);
            (distance_squared <= radius_squared).then_some(BlastHit {
                agent: agent.agent,
                distance_squared,
            })
        })
        .collect()
}
