//! Authored level layouts loaded in place of procedural generation.
//!
//! Parsing is lenient: a field with a missing or non-numeric value falls back
//! to the documented default for that field, and an entry that is not an
//! object (or names an unknown shape or obstacle type) is skipped. Only text
//! that is not JSON at all is rejected.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::{HalfExtents, ObstacleKind, WallSegment, WorldPosition};

const DEFAULT_WALL_WIDTH: f32 = 4.0;
const DEFAULT_WALL_HEIGHT: f32 = 3.0;
const DEFAULT_WALL_DEPTH: f32 = 0.5;
const DEFAULT_RAMP_WIDTH: f32 = 4.0;
const DEFAULT_RAMP_STEPS: u32 = 4;
const MAX_RAMP_STEPS: u32 = 64;
const DEFAULT_STEP_HEIGHT: f32 = 0.35;
const DEFAULT_STEP_DEPTH: f32 = 1.0;

/// Errors raised while reading layout text.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// The text could not be parsed as JSON.
    #[error("layout is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Fully resolved level description with every default applied.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelLayout {
    /// Box walls.
    pub walls: Vec<LayoutWall>,
    /// Stepped ramps.
    pub ramps: Vec<LayoutRamp>,
    /// Destructible props.
    pub obstacles: Vec<LayoutObstacle>,
    /// Enemy spawn points.
    pub enemy_spawns: Vec<WorldPosition>,
    /// Player spawn point, when provided.
    pub player_spawn: Option<WorldPosition>,
}

impl LevelLayout {
    /// Parses layout JSON text, defaulting malformed fields.
    pub fn from_json_str(text: &str) -> Result<Self, LayoutError> {
        let value: Value = serde_json::from_str(text)?;
        Ok(Self::from_value(&value))
    }

    /// Resolves a parsed JSON document into a layout.
    ///
    /// A document that is not an object yields an empty layout.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let Some(root) = value.as_object() else {
            warn!("layout root is not an object; loading an empty arena");
            return Self::default();
        };

        let walls = objects(root, "walls").filter_map(parse_wall).collect();
        let ramps = objects(root, "ramps").map(parse_ramp).collect();
        let obstacles = objects(root, "obstacles")
            .filter_map(parse_obstacle)
            .collect();
        let enemy_spawns = objects(root, "enemySpawns").map(parse_position).collect();
        let player_spawn = root
            .get("playerSpawn")
            .and_then(Value::as_object)
            .map(parse_position);

        Self {
            walls,
            ramps,
            obstacles,
            enemy_spawns,
            player_spawn,
        }
    }

    /// Reports whether the layout contains nothing to instantiate.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.walls.is_empty()
            && self.ramps.is_empty()
            && self.obstacles.is_empty()
            && self.enemy_spawns.is_empty()
            && self.player_spawn.is_none()
    }
}

/// Box wall authored in a layout.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutWall {
    /// Size along the local x axis.
    pub width: f32,
    /// Vertical size.
    pub height: f32,
    /// Size along the local z axis.
    pub depth: f32,
    /// Center of the box.
    pub center: WorldPosition,
    /// Rotation around the vertical axis, in radians.
    pub rotation_y: f32,
}

impl LayoutWall {
    /// Wall volume described by this entry.
    #[must_use]
    pub fn segment(&self) -> WallSegment {
        WallSegment::new(
            self.center,
            HalfExtents::new(self.width * 0.5, self.height * 0.5, self.depth * 0.5),
            self.rotation_y,
        )
    }
}

/// Stepped ramp made of stacked boxes ascending along its local z axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutRamp {
    /// Width of every step.
    pub width: f32,
    /// Number of steps.
    pub steps: u32,
    /// Height gained per step.
    pub step_height: f32,
    /// Depth of every step.
    pub step_depth: f32,
    /// Ground-level center of the ramp.
    pub base: WorldPosition,
    /// Rotation around the vertical axis, in radians.
    pub rotation_y: f32,
}

impl LayoutRamp {
    /// Volumes of the individual steps, lowest first.
    #[must_use]
    pub fn step_segments(&self) -> Vec<WallSegment> {
        let (sin, cos) = self.rotation_y.sin_cos();
        let middle = (self.steps as f32 - 1.0) * 0.5;
        (0..self.steps)
            .map(|index| {
                let offset = (index as f32 - middle) * self.step_depth;
                let height = (index + 1) as f32 * self.step_height;
                let center = WorldPosition::new(
                    self.base.x + offset * sin,
                    self.base.y + height * 0.5,
                    self.base.z + offset * cos,
                );
                WallSegment::new(
                    center,
                    HalfExtents::new(self.width * 0.5, height * 0.5, self.step_depth * 0.5),
                    self.rotation_y,
                )
            })
            .collect()
    }
}

/// Destructible prop authored in a layout.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutObstacle {
    /// Type of prop.
    pub kind: ObstacleKind,
    /// Center of the prop.
    pub position: WorldPosition,
    /// Rotation around the vertical axis, in radians.
    pub rotation_y: f32,
}

fn objects<'a>(
    root: &'a Map<String, Value>,
    key: &'a str,
) -> impl Iterator<Item = &'a Map<String, Value>> + 'a {
    let entries: &'a [Value] = match root.get(key) {
        Some(Value::Array(entries)) => entries.as_slice(),
        Some(_) => {
            warn!(section = key, "layout section is not a list; ignoring it");
            &[]
        }
        None => &[],
    };

    entries.iter().filter_map(move |entry| {
        let object = entry.as_object();
        if object.is_none() {
            warn!(section = key, "skipping layout entry that is not an object");
        }
        object
    })
}

fn number(entry: &Map<String, Value>, keys: &[&str], default: f32) -> f32 {
    keys.iter()
        .find_map(|key| entry.get(*key).and_then(Value::as_f64))
        .filter(|value| value.is_finite())
        .map_or(default, |value| value as f32)
}

fn parse_wall(entry: &Map<String, Value>) -> Option<LayoutWall> {
    if let Some(shape) = entry.get("shape").and_then(Value::as_str) {
        if shape != "box" {
            warn!(shape, "skipping wall with unsupported shape");
            return None;
        }
    }

    let height = number(entry, &["h"], DEFAULT_WALL_HEIGHT);
    Some(LayoutWall {
        width: number(entry, &["w"], DEFAULT_WALL_WIDTH),
        height,
        depth: number(entry, &["d"], DEFAULT_WALL_DEPTH),
        center: WorldPosition::new(
            number(entry, &["x"], 0.0),
            number(entry, &["y"], height * 0.5),
            number(entry, &["z"], 0.0),
        ),
        rotation_y: number(entry, &["rotY"], 0.0),
    })
}

fn parse_ramp(entry: &Map<String, Value>) -> LayoutRamp {
    let steps = number(entry, &["steps"], DEFAULT_RAMP_STEPS as f32)
        .round()
        .clamp(1.0, MAX_RAMP_STEPS as f32) as u32;
    LayoutRamp {
        width: number(entry, &["w"], DEFAULT_RAMP_WIDTH),
        steps,
        step_height: number(entry, &["stepH", "h"], DEFAULT_STEP_HEIGHT),
        step_depth: number(entry, &["stepD", "d"], DEFAULT_STEP_DEPTH),
        base: parse_position(entry),
        rotation_y: number(entry, &["rotY"], 0.0),
    }
}

fn parse_obstacle(entry: &Map<String, Value>) -> Option<LayoutObstacle> {
    let name = entry.get("type").and_then(Value::as_str).unwrap_or("crate");
    let Some(kind) = ObstacleKind::from_name(name) else {
        warn!(kind = name, "skipping obstacle with unknown type");
        return None;
    };

    Some(LayoutObstacle {
        kind,
        position: WorldPosition::new(
            number(entry, &["x"], 0.0),
            number(entry, &["y"], kind.default_y()),
            number(entry, &["z"], 0.0),
        ),
        rotation_y: number(entry, &["rotY"], 0.0),
    })
}

fn parse_position(entry: &Map<String, Value>) -> WorldPosition {
    WorldPosition::new(
        number(entry, &["x"], 0.0),
        number(entry, &["y"], 0.0),
        number(entry, &["z"], 0.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ColliderEntry;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let layout = LevelLayout::from_json_str(
            r#"{
                "walls": [{ "shape": "box", "x": 2 }],
                "obstacles": [{ "type": "barrel", "x": 1, "z": -1 }],
                "ramps": [{}],
                "enemySpawns": [{ "x": 3 }],
                "playerSpawn": { "z": 4 }
            }"#,
        )
        .expect("valid json");

        let wall = layout.walls[0];
        assert_eq!(wall.width, DEFAULT_WALL_WIDTH);
        assert_eq!(wall.center, WorldPosition::new(2.0, 1.5, 0.0));
        assert_eq!(layout.obstacles[0].position.y, 0.6);
        assert_eq!(layout.ramps[0].steps, DEFAULT_RAMP_STEPS);
        assert_eq!(layout.enemy_spawns, vec![WorldPosition::new(3.0, 0.0, 0.0)]);
        assert_eq!(layout.player_spawn, Some(WorldPosition::new(0.0, 0.0, 4.0)));
    }

    #[test]
    fn garbled_fields_are_defaulted_not_fatal() {
        let layout = LevelLayout::from_json_str(
            r#"{
                "walls": [{ "w": "wide", "h": null, "x": 1 }, 7, { "shape": "sphere" }],
                "obstacles": [{ "type": "tank" }, { "type": "crate", "rotY": "left" }],
                "enemySpawns": "nowhere"
            }"#,
        )
        .expect("valid json");

        assert_eq!(layout.walls.len(), 1);
        assert_eq!(layout.walls[0].width, DEFAULT_WALL_WIDTH);
        assert_eq!(layout.walls[0].height, DEFAULT_WALL_HEIGHT);
        assert_eq!(layout.obstacles.len(), 1);
        assert_eq!(layout.obstacles[0].rotation_y, 0.0);
        assert!(layout.enemy_spawns.is_empty());
    }

    #[test]
    fn ramp_aliases_accept_short_keys() {
        let layout =
            LevelLayout::from_json_str(r#"{ "ramps": [{ "steps": 3, "h": 0.5, "d": 2 }] }"#)
                .expect("valid json");
        let ramp = layout.ramps[0];
        assert_eq!(ramp.step_height, 0.5);
        assert_eq!(ramp.step_depth, 2.0);
    }

    #[test]
    fn ramp_steps_ascend_along_local_axis() {
        let ramp = LayoutRamp {
            width: 2.0,
            steps: 3,
            step_height: 0.5,
            step_depth: 1.0,
            base: WorldPosition::new(0.0, 0.0, 0.0),
            rotation_y: 0.0,
        };
        let steps = ramp.step_segments();
        assert_eq!(steps.len(), 3);
        let tops: Vec<f32> = steps.iter().map(|step| step.world_aabb().max.y).collect();
        assert_eq!(tops, vec![0.5, 1.0, 1.5]);
        let centers: Vec<f32> = steps.iter().map(|step| step.center().z).collect();
        assert_eq!(centers, vec![-1.0, 0.0, 1.0]);
    }

    #[test]
    fn non_object_root_yields_empty_layout() {
        let layout = LevelLayout::from_json_str("[1, 2, 3]").expect("valid json");
        assert!(layout.is_empty());
    }

    #[test]
    fn invalid_json_is_rejected() {
        assert!(matches!(
            LevelLayout::from_json_str("{ walls: "),
            Err(LayoutError::InvalidJson(_))
        ));
    }
}
