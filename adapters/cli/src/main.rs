#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that builds and inspects Maze Arena layouts.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use maze_arena_core::{Command, Event, LevelLayout, Seed, WorldPoint};
use maze_arena_system_bootstrap::{ArenaConfig, Bootstrap};
use maze_arena_system_navigation::{find_path, snapshot_footprints, PathWorker};
use maze_arena_world::{self as world, query, World};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const WORKER_WAIT: Duration = Duration::from_secs(30);

/// Builds procedural arenas, loads authored ones, and plans paths through them.
#[derive(Debug, Parser)]
#[command(name = "maze-arena", version)]
struct Cli {
    /// JSON file overriding any subset of the arena configuration.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Generate an arena from a seed and print its maze.
    Generate {
        /// Seed text; the same seed always yields the same arena.
        #[arg(long)]
        seed: String,
        /// Print every wall segment as JSON.
        #[arg(long)]
        walls: bool,
    },
    /// Load an authored layout file and summarize it.
    Load {
        /// Path to the layout JSON document.
        #[arg(long)]
        layout: PathBuf,
    },
    /// Generate an arena and plan a path across it.
    Path {
        /// Seed text of the arena.
        #[arg(long)]
        seed: String,
        /// Start point as `x,z`.
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        from: WorldPoint,
        /// Goal point as `x,z`.
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        to: WorldPoint,
        /// Plan on a background worker thread instead of inline.
        #[arg(long)]
        worker: bool,
    },
}

/// Entry point for the Maze Arena command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "maze_arena=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        CliCommand::Generate { seed, walls } => generate(&config, &Seed::new(seed), walls),
        CliCommand::Load { layout } => load(&config, &layout),
        CliCommand::Path {
            seed,
            from,
            to,
            worker,
        } => plan(&config, &Seed::new(seed), from, to, worker),
    }
}

fn load_config(path: Option<&Path>) -> Result<ArenaConfig> {
    let Some(path) = path else {
        return Ok(ArenaConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    ArenaConfig::from_json_str(&text)
        .with_context(|| format!("failed to parse config {}", path.display()))
}

fn generate(config: &ArenaConfig, seed: &Seed, print_walls: bool) -> Result<()> {
    let bootstrap = Bootstrap::new(config);
    let mut world = config.build_world();
    let mut events = Vec::new();
    let layout = bootstrap.generate(&mut world, seed, &mut events);

    println!("{}", bootstrap.welcome_banner(&world));
    print!("{}", layout.to_ascii());
    println!(
        "seed {}: {} walls, coverage {:.3}, traversable {}",
        seed,
        layout.walls().len(),
        layout.coverage(),
        layout.is_traversable()
    );
    for event in &events {
        if let Event::ObstaclesScattered { placed, skipped } = event {
            println!("obstacles: {placed} placed, {skipped} skipped");
        }
    }
    println!("colliders: {}", query::colliders(&world).len());

    if print_walls {
        println!(
            "{}",
            serde_json::to_string_pretty(layout.walls())
                .context("failed to encode walls")?
        );
    }
    Ok(())
}

fn load(config: &ArenaConfig, path: &Path) -> Result<()> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read layout {}", path.display()))?;
    let layout = LevelLayout::from_json_str(&text)
        .with_context(|| format!("failed to parse layout {}", path.display()))?;

    let mut world = config.build_world();
    let mut events = Vec::new();
    world::apply(&mut world, Command::LoadLayout { layout }, &mut events);

    println!("{}", query::welcome_banner(&world));
    println!(
        "walls: {}, ramp steps: {}, obstacles: {}, enemy spawns: {}",
        query::layout_walls(&world).len(),
        query::ramp_steps(&world).len(),
        query::obstacles(&world).len(),
        query::enemy_spawns(&world).len()
    );
    match query::player_spawn(&world) {
        Some(spawn) => println!("player spawn: ({}, {}, {})", spawn.x, spawn.y, spawn.z),
        None => println!("player spawn: none"),
    }
    println!("colliders: {}", query::colliders(&world).len());
    Ok(())
}

fn plan(
    config: &ArenaConfig,
    seed: &Seed,
    from: WorldPoint,
    to: WorldPoint,
    use_worker: bool,
) -> Result<()> {
    let mut world = config.build_world();
    let _ = Bootstrap::new(config).generate(&mut world, seed, &mut Vec::new());
    let path = route(&world, config, from, to, use_worker)?;

    if path.is_empty() {
        println!(
            "no path from ({}, {}) to ({}, {})",
            from.x, from.z, to.x, to.z
        );
        return Ok(());
    }
    info!(waypoints = path.len(), "path planned");
    println!(
        "{}",
        serde_json::to_string_pretty(&path)
            .context("failed to encode path")?
    );
    Ok(())
}

fn route(
    world: &World,
    config: &ArenaConfig,
    from: WorldPoint,
    to: WorldPoint,
    use_worker: bool,
) -> Result<Vec<WorldPoint>> {
    let obstacles = snapshot_footprints(query::colliders(world).aabbs(), &config.path);
    if !use_worker {
        return Ok(find_path(from, to, &obstacles, &config.path));
    }

    let mut worker = PathWorker::spawn(1).context("failed to start path worker")?;
    let id = worker.dispatch(from, to, obstacles, &config.path)?;
    let response = worker.recv_timeout(WORKER_WAIT)?;
    if response.id != id {
        bail!(
            "path worker answered request {} instead of {}",
            response.id.get(),
            id.get()
        );
    }
    Ok(response.path)
}

fn parse_point(text: &str) -> Result<WorldPoint, String> {
    let (x, z) = text
        .split_once(',')
        .ok_or_else(|| format!("expected `x,z`, got `{text}`"))?;
    let x: f32 = x
        .trim()
        .parse()
        .map_err(|_| format!("invalid x in `{text}`"))?;
    let z: f32 = z
        .trim()
        .parse()
        .map_err(|_| format!("invalid z in `{text}`"))?;
    Ok(WorldPoint::new(x, z))
}
