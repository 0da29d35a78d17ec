//! Message protocol spoken across the background path worker boundary.
//!
//! Requests carry owned obstacle snapshots so nothing mutable is shared with
//! the worker. Responses echo the request identifier; callers correlate by it
//! because responses to different requests may arrive in any order.

use serde::{Deserialize, Serialize};

use crate::{Footprint, WorldPoint};

/// Identifier correlating a worker response with its request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(u64);

impl RequestId {
    /// Creates a request identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Grid options transmitted with every request.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkerOptions {
    /// Edge length of a navigation cell.
    pub grid_size: f32,
    /// Search radius added around the start and goal.
    pub radius: f32,
    /// Safety margin added around every obstacle.
    pub clearance: f32,
    /// Upper bound on expanded cells before the search gives up.
    pub max_expansions: usize,
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self {
            grid_size: 1.0,
            radius: 20.0,
            clearance: 0.5,
            max_expansions: 50_000,
        }
    }
}

/// Path query dispatched to the worker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathRequestMessage {
    /// Correlation identifier.
    pub id: RequestId,
    /// Exact start coordinates.
    pub start: WorldPoint,
    /// Exact goal coordinates.
    pub goal: WorldPoint,
    /// Blocking obstacle footprints captured when the request was made.
    pub obstacles: Vec<Footprint>,
    /// Grid options.
    #[serde(default)]
    pub opts: WorkerOptions,
}

/// Result returned by the worker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathResponseMessage {
    /// Identifier of the request this answers.
    pub id: RequestId,
    /// Waypoints, empty when the goal is unreachable.
    pub path: Vec<WorldPoint>,
}
