//! Rejection sampling used to scatter destructible props.

use std::f64::consts::{FRAC_PI_2, TAU};

use maze_arena_core::{
    ColliderEntry, ColliderIndex, ObstacleId, ObstacleKind, RandomSource, WorldPosition,
};
use serde::{Deserialize, Serialize};

use crate::obstacles::Destructible;

/// Tuning knobs for procedural prop scattering.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Edge length of the square arena centered on the origin.
    pub arena_size: f32,
    /// Distance from the arena edge that props never cross.
    pub edge_margin: f32,
    /// Gap kept between a prop and anything else.
    pub spacing: f32,
    /// Samples drawn per prop before it is skipped.
    pub attempts_per_prop: u32,
    /// Number of crates scattered per pass.
    pub crates: u32,
    /// Number of barricades scattered per pass.
    pub barricades: u32,
    /// Number of barrels scattered per pass.
    pub barrels: u32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            arena_size: 60.0,
            edge_margin: 3.0,
            spacing: 0.25,
            attempts_per_prop: 28,
            crates: 10,
            barricades: 6,
            barrels: 6,
        }
    }
}

impl PlacementConfig {
    /// Number of props of `kind` scattered per pass.
    #[must_use]
    pub fn count(&self, kind: ObstacleKind) -> u32 {
        match kind {
            ObstacleKind::Crate => self.crates,
            ObstacleKind::Barricade => self.barricades,
            ObstacleKind::Barrel => self.barrels,
        }
    }

    /// Half-size of the square region props are sampled from.
    #[must_use]
    pub fn inner_half_extent(&self) -> f32 {
        (self.arena_size * 0.5 - self.edge_margin).max(0.0)
    }
}

/// Samples a position for one prop, rejecting overlaps with `existing`
/// colliders and with props `staged` earlier in the same pass.
///
/// Returns `None` once the attempt budget is spent.
pub(crate) fn try_place(
    id: ObstacleId,
    kind: ObstacleKind,
    config: &PlacementConfig,
    rng: &mut RandomSource,
    existing: &ColliderIndex,
    staged: &[Destructible],
) -> Option<Destructible> {
    let bound = f64::from(config.inner_half_extent());

    for _ in 0..config.attempts_per_prop {
        let x = rng.next_range(-bound, bound) as f32;
        let z = rng.next_range(-bound, bound) as f32;
        let rotation_y = sample_rotation(kind, rng);
        let position = WorldPosition::new(x, kind.default_y(), z);
        let candidate = Destructible::scattered(id, kind, position, rotation_y);
        let probe = candidate.world_aabb().expanded_horizontally(config.spacing);

        if existing.overlaps(&probe) {
            continue;
        }
        if staged
            .iter()
            .any(|placed| placed.world_aabb().intersects(&probe))
        {
            continue;
        }

        return Some(candidate);
    }

    None
}

fn sample_rotation(kind: ObstacleKind, rng: &mut RandomSource) -> f32 {
    if kind.snaps_to_right_angles() {
        if rng.next_bool(0.5) {
            FRAC_PI_2 as f32
        } else {
            0.0
        }
    } else {
        rng.next_range(0.0, TAU) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_arena_core::{Aabb, ColliderOwner, Footprint, Seed, WorldPoint};

    #[test]
    fn barricades_only_take_right_angles() {
        let mut rng = RandomSource::derive(&Seed::from("rotations"));
        for _ in 0..64 {
            let rotation = sample_rotation(ObstacleKind::Barricade, &mut rng);
            assert!(rotation == 0.0 || rotation == FRAC_PI_2 as f32);
        }
    }

    #[test]
    fn fully_blocked_arena_yields_none() {
        let config = PlacementConfig::default();
        let mut existing = ColliderIndex::new();
        let half = config.arena_size;
        let _ = existing.insert(
            ColliderOwner::LayoutWall,
            &Aabb::from_footprint(
                Footprint::new(WorldPoint::new(-half, -half), WorldPoint::new(half, half)),
                0.0,
                10.0,
            ),
        );
        let mut rng = RandomSource::derive(&Seed::from("blocked"));
        let placed = try_place(
            ObstacleId::new(0),
            ObstacleKind::Crate,
            &config,
            &mut rng,
            &existing,
            &[],
        );
        assert!(placed.is_none());
    }

    #[test]
    fn samples_stay_inside_inner_bounds() {
        let config = PlacementConfig::default();
        let existing = ColliderIndex::new();
        let mut rng = RandomSource::derive(&Seed::from("bounds"));
        let bound = config.inner_half_extent();
        for index in 0..32 {
            let prop = try_place(
                ObstacleId::new(index),
                ObstacleKind::Barrel,
                &config,
                &mut rng,
                &existing,
                &[],
            )
            .expect("empty arena always has room");
            assert!(prop.position().x.abs() <= bound);
            assert!(prop.position().z.abs() <= bound);
        }
    }
}
