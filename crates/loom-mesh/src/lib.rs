//! # loom-mesh
//!
//! Fabric mesh representation and its deterministic construction.
//!
//! ## Key Types
//!
//! - [`FabricMesh`]: Named vertex list plus triangle index triples.
//!   A vertex's position in the list is the particle's identity.
//! - [`Topology`]: Unique edges and interior (two-triangle) edges,
//!   used by solvers to build stretching and bending constraints.
//! - [`generators::rectangular`]: The rectangular grid generator.

pub mod generators;
pub mod mesh;
pub mod topology;

pub use mesh::FabricMesh;
pub use topology::Topology;
