#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that prepares a Maze Arena.

use maze_arena_core::{Command, Event, Seed};
use maze_arena_system_maze_generation::{MazeConfig, MazeGenerator, MazeLayout};
use maze_arena_system_navigation::{CacheOptions, PathOptions};
use maze_arena_world::{self as world, query, PlacementConfig, World};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Failure to read an arena configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The text is not a valid configuration document.
    #[error("arena configuration is invalid: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Every tuning surface of an arena, loadable from partial JSON.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Maze generation tuning.
    pub maze: MazeConfig,
    /// Prop scatter tuning.
    pub placement: PlacementConfig,
    /// Path query tuning.
    pub path: PathOptions,
    /// Path cache tuning.
    pub cache: CacheOptions,
}

impl ArenaConfig {
    /// Parses a configuration document; omitted fields keep their defaults.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Creates an empty world that scatters props with this configuration.
    #[must_use]
    pub fn build_world(&self) -> World {
        World::with_placement(self.placement.clone())
    }
}

/// Produces the commands that turn a seed into a playable arena.
#[derive(Debug, Default)]
pub struct Bootstrap {
    generator: MazeGenerator,
}

impl Bootstrap {
    /// Creates a bootstrap system using the maze tuning of `config`.
    #[must_use]
    pub fn new(config: &ArenaConfig) -> Self {
        Self {
            generator: MazeGenerator::new(config.maze.clone()),
        }
    }

    /// Derives the banner that should be shown when the experience starts.
    #[must_use]
    pub fn welcome_banner<'world>(&self, world: &'world World) -> &'world str {
        query::welcome_banner(world)
    }

    /// Builds the maze for `seed` and the commands that install it.
    ///
    /// The commands clear the arena, install the maze walls, and scatter props
    /// around them, in that order.
    #[must_use]
    pub fn plan(&self, seed: &Seed) -> (MazeLayout, Vec<Command>) {
        let layout = self.generator.build_from_seed(seed);
        let commands = vec![
            Command::ClearArena,
            Command::InstallWalls {
                walls: layout.walls().to_vec(),
            },
            Command::ScatterObstacles { seed: seed.clone() },
        ];
        (layout, commands)
    }

    /// Regenerates `world` from `seed`, returning the maze that was installed.
    pub fn generate(
        &self,
        world: &mut World,
        seed: &Seed,
        out_events: &mut Vec<Event>,
    ) -> MazeLayout {
        let (layout, commands) = self.plan(seed);
        for command in commands {
            world::apply(world, command, out_events);
        }
        info!(
            seed = seed.as_str(),
            walls = layout.walls().len(),
            coverage = layout.coverage(),
            obstacles = query::obstacles(world).len(),
            "arena generated"
        );
        layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_installs_walls_before_scattering() {
        let bootstrap = Bootstrap::default();
        let mut world = World::new();
        let mut events = Vec::new();

        let layout = bootstrap.generate(&mut world, &Seed::from("order"), &mut events);

        assert_eq!(events[0], Event::ArenaCleared);
        assert_eq!(
            events[2],
            Event::WallsInstalled {
                count: layout.walls().len(),
            }
        );
        assert!(matches!(events[4], Event::ObstaclesScattered { .. }));
        assert_eq!(query::maze_walls(&world), layout.walls());
        assert_eq!(bootstrap.welcome_banner(&world), "Welcome to Maze Arena.");
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config = ArenaConfig::from_json_str(r#"{ "placement": { "crates": 2 } }"#)
            .expect("valid config");

        assert_eq!(config.placement.crates, 2);
        assert_eq!(config.placement.barrels, PlacementConfig::default().barrels);
        assert_eq!(config.maze, MazeConfig::default());
        assert!(ArenaConfig::from_json_str("[").is_err());
    }
}
