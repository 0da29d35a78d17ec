//! Deterministic random streams derived from string seeds.
//!
//! Every consumer that needs randomness owns its own [`RandomSource`]. Streams
//! are derived from a [`Seed`], optionally suffixed with a namespace, so the
//! maze generator and the obstacle scatter never observe each other's draws.
//! Only 32-bit integer arithmetic is involved in producing a draw; the unit
//! interval conversion is a single IEEE-754 division, keeping sequences
//! identical on every platform.

use std::fmt;

use serde::{Deserialize, Serialize};

const SEED_MIX_INITIAL: u32 = 1_779_033_703;
const SEED_MIX_UNIT: u32 = 3_432_918_353;
const SEED_AVALANCHE_FIRST: u32 = 2_246_822_507;
const SEED_AVALANCHE_SECOND: u32 = 3_266_489_909;
const STATE_INCREMENT: u32 = 0x6d2b_79f5;
const UNIT_SCALE: f64 = 4_294_967_296.0;

/// Immutable token from which random streams are derived.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Seed(String);

impl Seed {
    /// Creates a seed from the provided text.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Text that is hashed when deriving streams.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Seed for the `namespace` stream, formed as `seed:namespace`.
    #[must_use]
    pub fn namespaced(&self, namespace: &str) -> Self {
        Self(format!("{}:{namespace}", self.0))
    }
}

impl From<&str> for Seed {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Seed {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u32> for Seed {
    fn from(value: u32) -> Self {
        Self(value.to_string())
    }
}

impl From<u64> for Seed {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Deterministic multiply-xorshift generator over a 32-bit state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RandomSource {
    state: u32,
}

impl RandomSource {
    /// Derives the stream identified by `seed`.
    #[must_use]
    pub fn derive(seed: &Seed) -> Self {
        Self {
            state: hash_seed(seed.as_str()),
        }
    }

    /// Derives the stream identified by `seed` within `namespace`.
    ///
    /// The result equals `derive(&seed.namespaced(namespace))`.
    #[must_use]
    pub fn derive_namespaced(seed: &Seed, namespace: &str) -> Self {
        Self::derive(&seed.namespaced(namespace))
    }

    /// Advances the stream and returns the raw 32-bit output.
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(STATE_INCREMENT);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// Returns a value in `[0, 1)`.
    pub fn next_unit(&mut self) -> f64 {
        f64::from(self.next_u32()) / UNIT_SCALE
    }

    /// Returns an integer in `[min, max]`. Returns `min` when `max <= min`.
    pub fn next_int(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }

        let span = i64::from(max) - i64::from(min) + 1;
        let offset = (self.next_unit() * span as f64).floor() as i64;
        let value = i64::from(min) + offset.clamp(0, span - 1);
        value as i32
    }

    /// Returns an index in `[0, len)`, or zero for an empty range.
    pub fn next_index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }

        let offset = (self.next_unit() * len as f64).floor() as usize;
        offset.min(len - 1)
    }

    /// Returns a value in `[min, max)`. Returns `min` for an empty range.
    pub fn next_range(&mut self, min: f64, max: f64) -> f64 {
        if max <= min {
            return min;
        }

        min + self.next_unit() * (max - min)
    }

    /// Returns `true` with the provided probability.
    pub fn next_bool(&mut self, probability: f64) -> bool {
        self.next_unit() < probability
    }

    /// Picks a uniformly random element from the slice.
    pub fn pick<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        if slice.is_empty() {
            return None;
        }

        slice.get(self.next_index(slice.len()))
    }

    /// Shuffles the slice in place (Fisher-Yates).
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for index in (1..slice.len()).rev() {
            let swap_index = self.next_index(index + 1);
            slice.swap(index, swap_index);
        }
    }
}

/// Hashes seed text into the initial generator state.
///
/// Mixes UTF-16 code units so that seeds produce the same state as
/// string-hashing tools that operate on UTF-16 text.
#[must_use]
pub fn hash_seed(seed: &str) -> u32 {
    let unit_count = seed.encode_utf16().count() as u32;
    let mut hash = SEED_MIX_INITIAL ^ unit_count;
    for unit in seed.encode_utf16() {
        hash = (hash ^ u32::from(unit)).wrapping_mul(SEED_MIX_UNIT);
        hash = hash.rotate_left(13);
    }
    hash = (hash ^ (hash >> 16)).wrapping_mul(SEED_AVALANCHE_FIRST);
    hash = (hash ^ (hash >> 13)).wrapping_mul(SEED_AVALANCHE_SECOND);
    hash ^ (hash >> 16)
}
