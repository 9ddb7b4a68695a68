//! # loom-solver
//!
//! Position-based dynamics for the fabric.
//!
//! ## Key Types
//!
//! - [`PbdSolver`]: The solver interface the scheduler, attachment
//!   manager and render sampler drive. Everything above this crate
//!   talks to a `dyn PbdSolver`.
//! - [`SolverFactory`]: Builds a solver from a freshly generated mesh
//!   on (re)configuration.
//! - [`XpbdCloth`]: XPBD cloth with stretching and bending distance
//!   constraints, area-weighted masses and nearest-particle pinning.
//! - [`ClothParams`]: Material and attachment parameters.

pub mod config;
pub mod constraints;
pub mod state;
pub mod strategy;
pub mod xpbd;

pub use config::ClothParams;
pub use state::ParticleState;
pub use strategy::{PbdSolver, SolverFactory};
pub use xpbd::{XpbdCloth, XpbdClothFactory};
