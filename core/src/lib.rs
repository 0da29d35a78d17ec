#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Maze Arena engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative arena world, and pure systems. Systems such as the maze
//! generator submit [`Command`] values describing desired mutations, the world
//! executes those commands via its `apply` entry point, and then broadcasts
//! [`Event`] values. Every structural change to the shared [`ColliderIndex`]
//! is announced by exactly one [`Event::CollidersChanged`] carrying a snapshot
//! of the full collider collection.

use serde::{Deserialize, Serialize};

mod colliders;
mod geometry;
mod layout;
mod protocol;
mod random;

pub use colliders::{ColliderEntry, ColliderId, ColliderIndex, ColliderOwner, IndexedCollider};
pub use geometry::{Aabb, Footprint, HalfExtents, WorldPoint, WorldPosition, RIGHT_ANGLE_TOLERANCE};
pub use layout::{LayoutError, LayoutObstacle, LayoutRamp, LayoutWall, LevelLayout};
pub use protocol::{PathRequestMessage, PathResponseMessage, RequestId, WorkerOptions};
pub use random::{hash_seed, RandomSource, Seed};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Maze Arena.";

/// Random stream namespace consumed by the maze generator.
pub const RNG_STREAM_MAZE: &str = "maze";

/// Random stream namespace consumed by obstacle placement.
pub const RNG_STREAM_OBSTACLES: &str = "obstacles";

/// Commands that express all permissible arena mutations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Removes every wall, ramp, obstacle, and spawn from the arena.
    ClearArena,
    /// Replaces all previously installed maze walls with the provided set.
    InstallWalls {
        /// Wall segments emitted by the maze generator.
        walls: Vec<WallSegment>,
    },
    /// Scatters destructible props using the obstacle stream of `seed`.
    ScatterObstacles {
        /// Seed whose `obstacles` namespace drives placement.
        seed: Seed,
    },
    /// Replaces the arena contents with an authored layout.
    LoadLayout {
        /// Resolved layout to instantiate.
        layout: LevelLayout,
    },
    /// Applies damage to a destructible prop.
    DamageObstacle {
        /// Prop receiving the damage.
        obstacle: ObstacleId,
        /// Hit points removed.
        amount: u32,
        /// Agents that may be caught by an explosion.
        agents: Vec<AgentPosition>,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that the arena was emptied.
    ArenaCleared,
    /// Confirms that maze walls were installed.
    WallsInstalled {
        /// Number of wall segments now present.
        count: usize,
    },
    /// Reports the outcome of a scatter pass.
    ObstaclesScattered {
        /// Props that found a non-overlapping position.
        placed: usize,
        /// Props dropped after exhausting their attempt budget.
        skipped: usize,
    },
    /// Confirms that an authored layout was instantiated.
    LayoutLoaded {
        /// Number of walls created.
        walls: usize,
        /// Number of ramp steps created.
        ramp_steps: usize,
        /// Number of destructible props created.
        obstacles: usize,
        /// Number of enemy spawn points registered.
        enemy_spawns: usize,
    },
    /// Reports that a prop absorbed damage and survived.
    ObstacleDamaged {
        /// Prop that was hit.
        obstacle: ObstacleId,
        /// Hit points left.
        remaining: u32,
    },
    /// Reports that a prop was destroyed and removed from the colliders.
    ///
    /// Consumers decide whether the destruction grants a reward drop.
    ObstacleDestroyed {
        /// Prop that was destroyed.
        obstacle: ObstacleId,
        /// Type of the destroyed prop.
        kind: ObstacleKind,
        /// Position the prop occupied.
        position: WorldPosition,
        /// Props destroyed in this world so far, including this one.
        destroyed_total: u32,
    },
    /// Reports an agent inside the blast radius of an exploding prop.
    BlastReached {
        /// Prop that exploded.
        source: ObstacleId,
        /// Agent caught by the blast.
        agent: AgentId,
        /// Squared planar distance from the blast center.
        distance_squared: f32,
    },
    /// Announces the complete collider collection after a structural change.
    CollidersChanged {
        /// Monotonic revision of the collider collection.
        revision: u64,
        /// Bounding boxes of every collider in insertion order.
        colliders: Vec<Aabb>,
    },
}

/// Unique identifier assigned to a navigating agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(u32);

impl AgentId {
    /// Creates a new agent identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a destructible prop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObstacleId(u32);

impl ObstacleId {
    /// Creates a new obstacle identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Planar position of an agent supplied alongside damage commands.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentPosition {
    /// Agent being described.
    pub agent: AgentId,
    /// Current planar position of the agent.
    pub position: WorldPoint,
}

/// Types of destructible props.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObstacleKind {
    /// Cubic supply crate.
    Crate,
    /// Long low barrier that only stands square to the arena axes.
    Barricade,
    /// Explosive barrel.
    Barrel,
}

impl ObstacleKind {
    /// Every kind in scatter order.
    pub const ALL: [ObstacleKind; 3] = [Self::Crate, Self::Barricade, Self::Barrel];

    /// Unrotated half-extents of the prop.
    #[must_use]
    pub const fn half_extents(self) -> HalfExtents {
        match self {
            Self::Crate => HalfExtents::new(0.75, 0.75, 0.75),
            Self::Barricade => HalfExtents::new(1.5, 0.6, 0.3),
            Self::Barrel => HalfExtents::new(0.5, 0.6, 0.5),
        }
    }

    /// Hit points a fresh prop starts with.
    #[must_use]
    pub const fn hit_points(self) -> u32 {
        match self {
            Self::Crate => 3,
            Self::Barricade => 5,
            Self::Barrel => 2,
        }
    }

    /// Height of the prop's center when resting on the ground.
    #[must_use]
    pub const fn default_y(self) -> f32 {
        self.half_extents().y
    }

    /// Reports whether the prop only takes 0° or 90° rotations.
    #[must_use]
    pub const fn snaps_to_right_angles(self) -> bool {
        matches!(self, Self::Barricade)
    }

    /// Radius of the explosion triggered on destruction, if any.
    #[must_use]
    pub const fn blast_radius(self) -> Option<f32> {
        match self {
            Self::Barrel => Some(4.0),
            Self::Crate | Self::Barricade => None,
        }
    }

    /// Name used by authored layouts.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Crate => "crate",
            Self::Barricade => "barricade",
            Self::Barrel => "barrel",
        }
    }

    /// Parses a layout name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

/// Oriented box volume used for maze walls, authored walls, and ramp steps.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WallSegment {
    center: WorldPosition,
    half_extents: HalfExtents,
    rotation_y: f32,
}

impl WallSegment {
    /// Creates a wall from its center, local half-extents, and yaw.
    #[must_use]
    pub const fn new(center: WorldPosition, half_extents: HalfExtents, rotation_y: f32) -> Self {
        Self {
            center,
            half_extents,
            rotation_y,
        }
    }

    /// Center of the volume.
    #[must_use]
    pub const fn center(&self) -> WorldPosition {
        self.center
    }

    /// Half-extents along the wall's local axes.
    #[must_use]
    pub const fn half_extents(&self) -> HalfExtents {
        self.half_extents
    }

    /// Rotation around the vertical axis, in radians.
    #[must_use]
    pub const fn rotation_y(&self) -> f32 {
        self.rotation_y
    }

    /// Ground area covered by the wall, independent of rotation.
    #[must_use]
    pub fn footprint_area(&self) -> f32 {
        4.0 * self.half_extents.x * self.half_extents.z
    }
}

impl ColliderEntry for WallSegment {
    fn world_aabb(&self) -> Aabb {
        Aabb::from_center(self.center, self.half_extents.rotated_y(self.rotation_y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{de::DeserializeOwned, Serialize};
    use std::f32::consts::FRAC_PI_2;

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn install_walls_command_round_trips_through_bincode() {
        let wall = WallSegment::new(
            WorldPosition::new(5.0, 1.75, -3.0),
            HalfExtents::new(5.0, 1.75, 0.6),
            FRAC_PI_2,
        );
        assert_round_trip(&Command::InstallWalls { walls: vec![wall] });
    }

    #[test]
    fn damage_command_round_trips_through_bincode() {
        assert_round_trip(&Command::DamageObstacle {
            obstacle: ObstacleId::new(4),
            amount: 2,
            agents: vec![AgentPosition {
                agent: AgentId::new(9),
                position: WorldPoint::new(1.0, 2.0),
            }],
        });
    }

    #[test]
    fn path_messages_round_trip_through_bincode() {
        assert_round_trip(&PathResponseMessage {
            id: RequestId::new(11),
            path: vec![WorldPoint::new(0.0, 0.0), WorldPoint::new(1.5, 0.5)],
        });
    }

    #[test]
    fn rotated_wall_aabb_swaps_extents() {
        let wall = WallSegment::new(
            WorldPosition::new(0.0, 1.0, 0.0),
            HalfExtents::new(5.0, 1.0, 0.5),
            FRAC_PI_2,
        );
        let aabb = wall.world_aabb();
        assert_eq!(aabb.min, WorldPosition::new(-0.5, 0.0, -5.0));
        assert_eq!(aabb.max, WorldPosition::new(0.5, 2.0, 5.0));
        assert_eq!(wall.footprint_area(), 10.0);
    }

    #[test]
    fn obstacle_names_parse_back() {
        for kind in ObstacleKind::ALL {
            assert_eq!(ObstacleKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(ObstacleKind::from_name("tank"), None);
    }

    #[test]
    fn only_barrels_explode() {
        assert_eq!(ObstacleKind::Barrel.blast_radius(), Some(4.0));
        assert!(ObstacleKind::Crate.blast_radius().is_none());
        assert!(ObstacleKind::Barricade.snaps_to_right_angles());
    }
}
