//! Strongly-typed identifiers.
//!
//! Newtype wrappers prevent accidental mixing of particle indices
//! with anchor slot indices.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Index into the solver's particle arrays.
///
/// Particle identity is the vertex's position in the generated mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ParticleId(pub u32);

/// Index of an anchor slot (one per external pose source).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AnchorSlot(pub usize);

impl ParticleId {
    /// Returns the raw index as `usize` for array indexing.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl AnchorSlot {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl From<u32> for ParticleId {
    fn from(val: u32) -> Self {
        Self(val)
    }
}

impl From<usize> for AnchorSlot {
    fn from(val: usize) -> Self {
        Self(val)
    }
}

impl fmt::Display for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

impl fmt::Display for AnchorSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "anchor{}", self.0)
    }
}
