//! Shared collider collection read by navigation and external physics.

use serde::{Deserialize, Serialize};

use crate::{Aabb, ObstacleId};

/// Anything that can report a world-space bounding box.
pub trait ColliderEntry {
    /// Axis-aligned bounds of the entry in world space.
    fn world_aabb(&self) -> Aabb;
}

impl ColliderEntry for Aabb {
    fn world_aabb(&self) -> Aabb {
        *self
    }
}

/// Identifier assigned to an entry when it joins a [`ColliderIndex`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColliderId(u32);

impl ColliderId {
    /// Creates a collider identifier with the provided numeric value.
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

/// Records which structure contributed a collider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColliderOwner {
    /// Wall segment emitted by the maze generator.
    MazeWall,
    /// Wall loaded from an authored layout.
    LayoutWall,
    /// Single step of an authored ramp.
    RampStep,
    /// Destructible prop.
    Obstacle(ObstacleId),
}

/// Collider stored inside the index.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IndexedCollider {
    id: ColliderId,
    owner: ColliderOwner,
    aabb: Aabb,
}

impl IndexedCollider {
    /// Identifier allocated by the index.
    #[must_use]
    pub const fn id(&self) -> ColliderId {
        self.id
    }

    /// Structure that contributed the collider.
    #[must_use]
    pub const fn owner(&self) -> ColliderOwner {
        self.owner
    }

    /// World-space bounds captured on insertion.
    #[must_use]
    pub const fn aabb(&self) -> &Aabb {
        &self.aabb
    }
}

/// Insertion-ordered collection of world-space bounding boxes.
///
/// Entries keep their relative order across removals, so iteration is stable
/// between mutations.
#[derive(Clone, Debug, Default)]
pub struct ColliderIndex {
    entries: Vec<IndexedCollider>,
    next_id: u32,
}

impl ColliderIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the entry's bounds and returns the allocated identifier.
    pub fn insert<E>(&mut self, owner: ColliderOwner, entry: &E) -> ColliderId
    where
        E: ColliderEntry + ?Sized,
    {
        let id = ColliderId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.entries.push(IndexedCollider {
            id,
            owner,
            aabb: entry.world_aabb(),
        });
        id
    }

    /// Removes the collider with the provided identifier.
    pub fn remove(&mut self, id: ColliderId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    /// Removes every collider contributed by `owner`, returning the count.
    pub fn remove_owned_by(&mut self, owner: ColliderOwner) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.owner != owner);
        before - self.entries.len()
    }

    /// Removes every collider.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of colliders currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether the index holds no colliders.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the stored colliders in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &IndexedCollider> {
        self.entries.iter()
    }

    /// Iterates over the stored bounding boxes in insertion order.
    pub fn aabbs(&self) -> impl Iterator<Item = &Aabb> {
        self.entries.iter().map(|entry| &entry.aabb)
    }

    /// Copies the bounding boxes so queries are unaffected by later mutation.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Aabb> {
        self.aabbs().copied().collect()
    }

    /// Reports whether `aabb` overlaps any stored collider.
    #[must_use]
    pub fn overlaps(&self, aabb: &Aabb) -> bool {
        self.aabbs().any(|existing| existing.intersects(aabb))
    }
}
