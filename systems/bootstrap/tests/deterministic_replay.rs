use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use maze_arena_core::{Aabb, AgentId, AgentPosition, Command, Event, Seed, WorldPoint};
use maze_arena_system_bootstrap::{ArenaConfig, Bootstrap};
use maze_arena_world::{self as world, query};

#[test]
fn generation_replays_identically() {
    let first = replay("replay");
    let second = replay("replay");

    assert_eq!(first, second, "arena replay diverged");
    assert_eq!(first.fingerprint(), second.fingerprint());
}

#[test]
fn different_seeds_produce_different_arenas() {
    assert_ne!(replay("north").fingerprint(), replay("south").fingerprint());
}

#[test]
fn regeneration_discards_the_previous_arena() {
    let config = ArenaConfig::default();
    let bootstrap = Bootstrap::new(&config);
    let mut world = config.build_world();
    let mut events = Vec::new();

    let _ = bootstrap.generate(&mut world, &Seed::from("old"), &mut events);
    let _ = bootstrap.generate(&mut world, &Seed::from("new"), &mut events);

    let mut fresh = config.build_world();
    let _ = bootstrap.generate(&mut fresh, &Seed::from("new"), &mut Vec::new());

    assert_eq!(
        query::collider_snapshot(&world),
        query::collider_snapshot(&fresh)
    );
}

fn replay(seed: &str) -> ReplayOutcome {
    let config = ArenaConfig::default();
    let bootstrap = Bootstrap::new(&config);
    let mut world = config.build_world();
    let mut events = Vec::new();

    let _ = bootstrap.generate(&mut world, &Seed::from(seed), &mut events);

    let targets: Vec<_> = query::obstacles(&world)
        .iter()
        .take(3)
        .map(|prop| (prop.id(), prop.position().planar()))
        .collect();
    for (obstacle, position) in targets {
        world::apply(
            &mut world,
            Command::DamageObstacle {
                obstacle,
                amount: 10,
                agents: vec![AgentPosition {
                    agent: AgentId::new(1),
                    position: WorldPoint::new(position.x + 1.0, position.z),
                }],
            },
            &mut events,
        );
    }

    ReplayOutcome {
        colliders: query::collider_snapshot(&world)
            .iter()
            .map(AabbBits::from)
            .collect(),
        events: events.iter().map(EventRecord::from).collect(),
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ReplayOutcome {
    colliders: Vec<AabbBits>,
    events: Vec<EventRecord>,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct AabbBits([u32; 6]);

impl From<&Aabb> for AabbBits {
    fn from(aabb: &Aabb) -> Self {
        Self([
            aabb.min.x.to_bits(),
            aabb.min.y.to_bits(),
            aabb.min.z.to_bits(),
            aabb.max.x.to_bits(),
            aabb.max.y.to_bits(),
            aabb.max.z.to_bits(),
        ])
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum EventRecord {
    Cleared,
    WallsInstalled { count: usize },
    Scattered { placed: usize, skipped: usize },
    Destroyed { obstacle: u32, total: u32 },
    Blast { source: u32, distance_bits: u32 },
    CollidersChanged { revision: u64, count: usize },
    Other,
}

impl From<&Event> for EventRecord {
    fn from(event: &Event) -> Self {
        match event {
            Event::ArenaCleared => Self::Cleared,
            Event::WallsInstalled { count } => Self::WallsInstalled { count: *count },
            Event::ObstaclesScattered { placed, skipped } => Self::Scattered {
                placed: *placed,
                skipped: *skipped,
            },
            Event::ObstacleDestroyed {
                obstacle,
                destroyed_total,
                ..
            } => Self::Destroyed {
                obstacle: obstacle.get(),
                total: *destroyed_total,
            },
            Event::BlastReached {
                source,
                distance_squared,
                ..
            } => Self::Blast {
                source: source.get(),
                distance_bits: distance_squared.to_bits(),
            },
            Event::CollidersChanged {
                revision,
                colliders,
            } => Self::CollidersChanged {
                revision: *revision,
                count: colliders.len(),
            },
            Event::LayoutLoaded { .. } | Event::ObstacleDamaged { .. } => Self::Other,
        }
    }
}
