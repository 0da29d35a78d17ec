use std::{
    collections::{hash_map::DefaultHasher, VecDeque},
    hash::{Hash, Hasher},
};

use maze_arena_core::{ColliderEntry, Footprint, RandomSource, Seed, WallSegment, RNG_STREAM_MAZE};
use maze_arena_system_maze_generation::{
    FairnessZone, LaneAxis, MazeConfig, MazeGenerator, MazeLayout,
};

fn fingerprint(walls: &[WallSegment]) -> u64 {
    let mut hasher = DefaultHasher::new();
    for wall in walls {
        let center = wall.center();
        let half = wall.half_extents();
        for value in [
            center.x,
            center.y,
            center.z,
            half.x,
            half.y,
            half.z,
            wall.rotation_y(),
        ] {
            value.to_bits().hash(&mut hasher);
        }
    }
    hasher.finish()
}

/// Cells reachable from `sources`, walking the layout's wall matrices.
fn flood(layout: &MazeLayout, sources: &[(usize, usize)]) -> Vec<Vec<bool>> {
    let size = layout.grid_size();
    let mut seen = vec![vec![false; size]; size];
    let mut queue: VecDeque<(usize, usize)> = sources.iter().copied().collect();
    for &(row, col) in sources {
        seen[row][col] = true;
    }

    while let Some((row, col)) = queue.pop_front() {
        let mut open = Vec::new();
        if col + 1 < size && !layout.has_vertical_wall(row, col) {
            open.push((row, col + 1));
        }
        if col > 0 && !layout.has_vertical_wall(row, col - 1) {
            open.push((row, col - 1));
        }
        if row + 1 < size && !layout.has_horizontal_wall(row, col) {
            open.push((row + 1, col));
        }
        if row > 0 && !layout.has_horizontal_wall(row - 1, col) {
            open.push((row - 1, col));
        }
        for (next_row, next_col) in open {
            if !seen[next_row][next_col] {
                seen[next_row][next_col] = true;
                queue.push_back((next_row, next_col));
            }
        }
    }

    seen
}

fn both_crossings_open(layout: &MazeLayout) -> bool {
    let size = layout.grid_size();
    let last = size - 1;
    let east: Vec<_> = (0..size).map(|row| (row, last)).collect();
    let south: Vec<_> = (0..size).map(|col| (last, col)).collect();

    let from_east = flood(layout, &east);
    let from_south = flood(layout, &south);
    (0..size).all(|row| from_east[row][0]) && (0..size).all(|col| from_south[0][col])
}

/// Distance between a wall's footprint and the circle of `radius` around the
/// origin, zero when the circle touches the footprint.
fn distance_to_ring(footprint: &Footprint, radius: f32) -> f32 {
    let axis_gap = |low: f32, high: f32| {
        if low > 0.0 {
            low
        } else if high < 0.0 {
            -high
        } else {
            0.0
        }
    };
    let nearest = axis_gap(footprint.min.x, footprint.max.x)
        .hypot(axis_gap(footprint.min.z, footprint.max.z));

    let farthest = [footprint.min.x, footprint.max.x]
        .iter()
        .flat_map(|x| [footprint.min.z, footprint.max.z].map(|z| x.hypot(z)))
        .fold(0.0_f32, f32::max);

    if nearest > radius {
        nearest - radius
    } else if farthest < radius {
        radius - farthest
    } else {
        0.0
    }
}

#[test]
fn same_seed_builds_identical_walls() {
    let generator = MazeGenerator::default();
    let seed = Seed::from("determinism");

    let first = generator.build_from_seed(&seed);
    let second = generator.build_from_seed(&seed);

    assert_eq!(first, second);
    assert_eq!(fingerprint(first.walls()), fingerprint(second.walls()));
}

#[test]
fn seeded_build_draws_from_the_maze_stream() {
    let generator = MazeGenerator::default();
    let seed = Seed::from("streams");
    let mut rng = RandomSource::derive_namespaced(&seed, RNG_STREAM_MAZE);

    assert_eq!(generator.build_from_seed(&seed), generator.build(&mut rng));
}

#[test]
fn different_seeds_diverge() {
    let generator = MazeGenerator::default();
    let first = generator.build_from_seed(&Seed::from("alpha"));
    let second = generator.build_from_seed(&Seed::from("beta"));

    assert_ne!(fingerprint(first.walls()), fingerprint(second.walls()));
}

#[test]
fn every_sampled_maze_keeps_both_crossings_open() {
    let generator = MazeGenerator::default();
    for index in 0..32 {
        let layout = generator.build_from_seed(&Seed::from(format!("crossing-{index}")));
        assert!(both_crossings_open(&layout), "seed {index} blocked a crossing");
        assert!(layout.is_traversable());
    }
}

#[test]
fn crossings_stay_open_across_grid_sizes() {
    for grid_size in 2..=12 {
        let generator = MazeGenerator::new(MazeConfig {
            grid_size,
            ..MazeConfig::default()
        });
        for index in 0..16 {
            let seed = Seed::from(format!("size-{grid_size}-{index}"));
            let layout = generator.build_from_seed(&seed);
            assert!(
                both_crossings_open(&layout),
                "grid {grid_size} seed {index} blocked a crossing"
            );
        }
    }
}

#[test]
fn coverage_stays_under_cap_and_grows_past_the_tree() {
    let config = MazeConfig::default();
    let generator = MazeGenerator::new(config.clone());

    for index in 0..24u32 {
        let layout = generator.build_from_seed(&Seed::from(index));
        let coverage = layout.coverage();
        assert!(
            coverage <= config.max_coverage + 1e-6,
            "seed {index} covered {coverage}"
        );
        // A bare spanning tree with loops leaves 21 walls; balancing adds more.
        assert!(
            layout.walls().len() > 21,
            "seed {index} was not balanced: {} walls",
            layout.walls().len()
        );
        // The spawn ring crosses 20 of the 60 segments, so balancing stops
        // short of the target.
        assert!(layout.walls().len() <= 40);
        assert!(coverage < config.target_coverage);
        assert!((layout.wall_area() - layout.walls().len() as f32 * 12.0).abs() < 1e-2);
    }
}

#[test]
fn tight_cap_trims_balanced_walls() {
    let config = MazeConfig {
        target_coverage: 0.3,
        max_coverage: 0.05,
        fairness_zones: Vec::new(),
        ..MazeConfig::default()
    };
    let generator = MazeGenerator::new(config);

    for index in 0..20u32 {
        let layout = generator.build_from_seed(&Seed::from(index));
        assert!(layout.coverage() <= 0.05 + 1e-6);
        assert!(layout.is_traversable());
    }
}

#[test]
fn walls_stay_clear_of_the_spawn_ring() {
    let config = MazeConfig::default();
    let generator = MazeGenerator::new(config.clone());

    for index in 0..50u32 {
        let layout = generator.build_from_seed(&Seed::from(format!("ring-{index}")));
        for wall in layout.walls() {
            let gap = distance_to_ring(&wall.world_aabb().footprint(), 24.0);
            assert!(
                gap > config.fairness_margin,
                "seed {index}: wall at {:?} is {gap} from the ring",
                wall.center()
            );
        }
    }
}

#[test]
fn lanes_keep_their_line_open() {
    let config = MazeConfig {
        fairness_zones: vec![FairnessZone::Lane {
            axis: LaneAxis::Z,
            offset: 0.0,
        }],
        ..MazeConfig::default()
    };
    let margin = config.fairness_margin;
    let generator = MazeGenerator::new(config);
    let layout = generator.build_from_seed(&Seed::from("lane"));

    for wall in layout.walls() {
        let footprint = wall.world_aabb().footprint();
        assert!(footprint.min.x > margin || footprint.max.x < -margin);
    }
}

#[test]
fn walls_are_emitted_inside_the_arena() {
    let layout = MazeGenerator::default().build_from_seed(&Seed::from("inside"));
    for wall in layout.walls() {
        let aabb = wall.world_aabb();
        assert!(aabb.min.x >= -30.6 && aabb.max.x <= 30.6);
        assert!(aabb.min.z >= -30.6 && aabb.max.z <= 30.6);
        assert_eq!(aabb.min.y, 0.0);
        assert_eq!(aabb.max.y, 3.5);
    }
}

#[test]
fn ascii_rendering_matches_wall_matrices() {
    let layout = MazeGenerator::default().build_from_seed(&Seed::from("ascii"));
    let text = layout.to_ascii();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 13);
    assert!(lines.iter().all(|line| line.len() == 25));
    assert_eq!(lines[0], "+---+---+---+---+---+---+");

    let interior_vertical = lines
        .iter()
        .skip(1)
        .step_by(2)
        .map(|line| line[1..24].matches('|').count())
        .sum::<usize>();
    let vertical_walls = (0..6)
        .flat_map(|row| (0..5).map(move |col| (row, col)))
        .filter(|(row, col)| layout.has_vertical_wall(*row, *col))
        .count();
    assert_eq!(interior_vertical, vertical_walls);
}

#[test]
fn config_deserializes_partial_json() {
    let config: MazeConfig = serde_json::from_str(
        r#"{ "grid_size": 8, "fairness_zones": [ { "kind": "lane", "axis": "x", "offset": 4.0 } ] }"#,
    )
    .expect("valid config");

    assert_eq!(config.grid_size, 8);
    assert_eq!(config.arena_size, 60.0);
    assert_eq!(
        config.fairness_zones,
        vec![FairnessZone::Lane {
            axis: LaneAxis::X,
            offset: 4.0,
        }]
    );
}
