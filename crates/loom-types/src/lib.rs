//! # loom-types
//!
//! Shared types, identifiers, error types, and simulation defaults
//! for the loom fabric simulator.
//!
//! This crate has no domain logic; it defines the vocabulary
//! that all other loom crates share.

pub mod constants;
pub mod error;
pub mod ids;

pub use error::{FabricError, FabricResult};
pub use ids::{AnchorSlot, ParticleId};
