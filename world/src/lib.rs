#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Maze Arena.

mod obstacles;
mod placement;

use maze_arena_core::{
    ColliderIndex, ColliderOwner, Command, Event, RandomSource, WallSegment, RNG_STREAM_OBSTACLES,
    WELCOME_BANNER,
};
use tracing::debug;

use crate::obstacles::{DamageOutcome, ObstaclePlacementManager};

pub use obstacles::Destructible;
pub use placement::PlacementConfig;

/// Represents the authoritative Maze Arena world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    colliders: ColliderIndex,
    maze_walls: Vec<WallSegment>,
    obstacles: ObstaclePlacementManager,
    revision: u64,
}

impl World {
    /// Creates an empty arena using the default placement tuning.
    #[must_use]
    pub fn new() -> Self {
        Self::with_placement(PlacementConfig::default())
    }

    /// Creates an empty arena that scatters props with the provided tuning.
    #[must_use]
    pub fn with_placement(config: PlacementConfig) -> Self {
        Self {
            banner: WELCOME_BANNER,
            colliders: ColliderIndex::new(),
            maze_walls: Vec::new(),
            obstacles: ObstaclePlacementManager::new(config),
            revision: 0,
        }
    }

    fn clear(&mut self) {
        self.colliders.clear();
        self.maze_walls.clear();
        self.obstacles.clear();
    }

    fn notify_colliders_changed(&mut self, out_events: &mut Vec<Event>) {
        self.revision = self.revision.saturating_add(1);
        out_events.push(Event::CollidersChanged {
            revision: self.revision,
            colliders: self.colliders.snapshot(),
        });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Every structural change to the colliders is followed by exactly one
/// [`Event::CollidersChanged`], emitted after the command's other events.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ClearArena => {
            world.clear();
            out_events.push(Event::ArenaCleared);
            world.notify_colliders_changed(out_events);
        }
        Command::InstallWalls { walls } => {
            let removed = world.colliders.remove_owned_by(ColliderOwner::MazeWall);
            for wall in &walls {
                let _ = world.colliders.insert(ColliderOwner::MazeWall, wall);
            }
            debug!(removed, installed = walls.len(), "maze walls replaced");
            world.maze_walls = walls;
            out_events.push(Event::WallsInstalled {
                count: world.maze_walls.len(),
            });
            world.notify_colliders_changed(out_events);
        }
        Command::ScatterObstacles { seed } => {
            let mut rng = RandomSource::derive_namespaced(&seed, RNG_STREAM_OBSTACLES);
            let report = world.obstacles.scatter(&mut rng, &world.colliders);
            let placed = world.obstacles.flush(&mut world.colliders);
            debug!(
                seed = seed.as_str(),
                staged = report.staged,
                placed,
                skipped = report.skipped,
                "obstacles scattered"
            );
            out_events.push(Event::ObstaclesScattered {
                placed,
                skipped: report.skipped,
            });
            if placed > 0 {
                world.notify_colliders_changed(out_events);
            }
        }
        Command::LoadLayout { layout } => {
            world.clear();
            let summary = world.obstacles.load_from_map(&layout, &mut world.colliders);
            debug!(
                walls = summary.walls,
                ramp_steps = summary.ramp_steps,
                obstacles = summary.obstacles,
                "layout loaded"
            );
            out_events.push(Event::LayoutLoaded {
                walls: summary.walls,
                ramp_steps: summary.ramp_steps,
                obstacles: summary.obstacles,
                enemy_spawns: summary.enemy_spawns,
            });
            world.notify_colliders_changed(out_events);
        }
        Command::DamageObstacle {
            obstacle,
            amount,
            agents,
        } => match world
            .obstacles
            .damage(obstacle, amount, &agents, &mut world.colliders)
        {
            None => {
                debug!(
                    obstacle = obstacle.get(),
                    "damage ignored for unknown obstacle"
                );
            }
            Some(DamageOutcome::Damaged { remaining }) => {
                out_events.push(Event::ObstacleDamaged {
                    obstacle,
                    remaining,
                });
            }
            Some(DamageOutcome::Destroyed {
                destructible,
                destroyed_total,
                blast,
            }) => {
                out_events.push(Event::ObstacleDestroyed {
                    obstacle,
                    kind: destructible.kind(),
                    position: destructible.position(),
                    destroyed_total,
                });
                out_events.extend(blast.into_iter().map(|hit| Event::BlastReached {
                    source: obstacle,
                    agent: hit.agent,
                    distance_squared: hit.distance_squared,
                }));
                world.notify_colliders_changed(out_events);
            }
        },
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{Destructible, World};
    use maze_arena_core::{Aabb, ColliderIndex, ObstacleId, WallSegment, WorldPosition};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Live collider collection shared with navigation and physics consumers.
    #[must_use]
    pub fn colliders(world: &World) -> &ColliderIndex {
        &world.colliders
    }

    /// Copies the bounding boxes of every collider in insertion order.
    #[must_use]
    pub fn collider_snapshot(world: &World) -> Vec<Aabb> {
        world.colliders.snapshot()
    }

    /// Revision carried by the most recent collider change notification.
    #[must_use]
    pub fn collider_revision(world: &World) -> u64 {
        world.revision
    }

    /// Maze walls installed by the most recent generation pass.
    #[must_use]
    pub fn maze_walls(world: &World) -> &[WallSegment] {
        &world.maze_walls
    }

    /// Walls instantiated from an authored layout.
    #[must_use]
    pub fn layout_walls(world: &World) -> &[WallSegment] {
        world.obstacles.layout_walls()
    }

    /// Ramp steps instantiated from an authored layout.
    #[must_use]
    pub fn ramp_steps(world: &World) -> &[WallSegment] {
        world.obstacles.ramp_steps()
    }

    /// Destructible props still standing, in placement order.
    #[must_use]
    pub fn obstacles(world: &World) -> &[Destructible] {
        world.obstacles.destructibles()
    }

    /// Looks up a standing prop by identifier.
    #[must_use]
    pub fn obstacle(world: &World, id: ObstacleId) -> Option<&Destructible> {
        world
            .obstacles
            .destructibles()
            .iter()
            .find(|destructible| destructible.id() == id)
    }

    /// Enemy spawn points registered by an authored layout.
    #[must_use]
    pub fn enemy_spawns(world: &World) -> &[WorldPosition] {
        world.obstacles.enemy_spawns()
    }

    /// Player spawn point registered by an authored layout.
    #[must_use]
    pub fn player_spawn(world: &World) -> Option<WorldPosition> {
        world.obstacles.player_spawn()
    }

    /// Number of props destroyed since the world was created.
    #[must_use]
    pub fn destroyed_count(world: &World) -> u32 {
        world.obstacles.destroyed()
    }

    /// Fraction of the arena floor covered by installed maze walls.
    #[must_use]
    pub fn wall_coverage(world: &World) -> f32 {
        let arena = world.obstacles.config().arena_size;
        let area = arena * arena;
        if area <= 0.0 {
            return 0.0;
        }
        let covered: f32 = world
            .maze_walls
            .iter()
            .map(WallSegment::footprint_area)
            .sum();
        covered / area
    }
}
