//! Per-agent memoization of planned paths.

use std::{collections::HashMap, sync::Arc, time::Duration};

use maze_arena_core::{AgentId, Footprint, WorldPoint};
use serde::{Deserialize, Serialize};

use crate::{find_path, PathOptions};

/// Tuning knobs for [`PathCache`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheOptions {
    /// Time a computed path stays valid.
    pub cache_for: Duration,
    /// Distance at which an agent counts as having reached a waypoint.
    pub arrive_radius: f32,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            cache_for: Duration::from_millis(500),
            arrive_radius: 0.25,
        }
    }
}

#[derive(Clone, Debug)]
struct CacheEntry {
    path: Arc<[WorldPoint]>,
    computed_at: Duration,
    cursor: usize,
}

/// Remembers the most recent path of every agent.
///
/// Time is supplied by the caller as the elapsed duration since an arbitrary
/// epoch. Paths are shared through [`Arc`], so a caller may compare two
/// results with [`Arc::ptr_eq`] to learn whether a recomputation happened.
#[derive(Debug, Default)]
pub struct PathCache {
    options: CacheOptions,
    path_options: PathOptions,
    entries: HashMap<AgentId, CacheEntry>,
}

impl PathCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new(options: CacheOptions, path_options: PathOptions) -> Self {
        Self {
            options,
            path_options,
            entries: HashMap::new(),
        }
    }

    /// Returns the cached path of `agent` while it is fresher than
    /// `cache_for`, otherwise plans a new one and caches it.
    ///
    /// A recomputed path restarts the waypoint cursor.
    pub fn recompute_if_stale(
        &mut self,
        agent: AgentId,
        start: WorldPoint,
        goal: WorldPoint,
        obstacles: &[Footprint],
        now: Duration,
    ) -> Arc<[WorldPoint]> {
        if let Some(entry) = self.entries.get(&agent) {
            if now.saturating_sub(entry.computed_at) < self.options.cache_for {
                return Arc::clone(&entry.path);
            }
        }

        let path: Arc<[WorldPoint]> = find_path(start, goal, obstacles, &self.path_options).into();
        let _ = self.entries.insert(
            agent,
            CacheEntry {
                path: Arc::clone(&path),
                computed_at: now,
                cursor: 1,
            },
        );
        path
    }

    /// Advances the waypoint cursor of `agent` past every waypoint it has
    /// reached and returns the waypoint it should head for.
    ///
    /// Once the path is exhausted the final waypoint is returned repeatedly.
    /// Returns `None` when the agent has no cached path or the path is empty.
    pub fn next_waypoint(&mut self, agent: AgentId, position: WorldPoint) -> Option<WorldPoint> {
        let entry = self.entries.get_mut(&agent)?;
        let last = entry.path.len().checked_sub(1)?;
        let arrive = self.options.arrive_radius * self.options.arrive_radius;

        entry.cursor = entry.cursor.min(last);
        while entry.cursor < last && entry.path[entry.cursor].distance_squared(position) <= arrive {
            entry.cursor += 1;
        }

        Some(entry.path[entry.cursor])
    }

    /// Cached path of `agent`, regardless of staleness.
    #[must_use]
    pub fn path(&self, agent: AgentId) -> Option<Arc<[WorldPoint]>> {
        self.entries.get(&agent).map(|entry| Arc::clone(&entry.path))
    }

    /// Forgets everything cached for `agent`.
    pub fn clear(&mut self, agent: AgentId) {
        let _ = self.entries.remove(&agent);
    }

    /// Number of agents with a cached path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether no agent has a cached path.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
