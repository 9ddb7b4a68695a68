//! Solver interface: the seam between orchestration and physics.
//!
//! The scheduler drives one sub-step as:
//!
//! ```text
//! solver.pre_solve(sub_dt, gravity)?;
//! solver.solve(sub_dt)?;
//! solver.post_solve(sub_dt)?;
//! ```
//!
//! Anchors drive `attach_nearest` until it returns a particle, then
//! `update_attached_pose` for that particle on every later pose.

use glam::Vec3;
use loom_mesh::FabricMesh;
use loom_types::{FabricResult, ParticleId};

use crate::config::ClothParams;

/// Trait for position-based dynamics solvers.
///
/// Implementations own the deformed particle positions. Callers must
/// serialize all access externally; none of these methods lock.
pub trait PbdSolver: Send {
    /// Integrate external forces and predict positions.
    fn pre_solve(&mut self, dt: f32, gravity: Vec3) -> FabricResult<()>;

    /// Project constraints on the predicted positions.
    fn solve(&mut self, dt: f32) -> FabricResult<()>;

    /// Derive velocities from the corrected positions.
    ///
    /// Returns [`FabricError::SolverFault`](loom_types::FabricError::SolverFault)
    /// if the state is no longer finite.
    fn post_solve(&mut self, dt: f32) -> FabricResult<()>;

    /// Pin the particle nearest to `point`, if one qualifies.
    ///
    /// `None` is a normal outcome ("nothing near enough"); the caller
    /// retries on its next pose.
    fn attach_nearest(&mut self, point: Vec3) -> Option<ParticleId>;

    /// Move a pinned particle's target to `point`.
    fn update_attached_pose(&mut self, id: ParticleId, point: Vec3) -> FabricResult<()>;

    /// Current particle positions, indexable by particle id.
    fn positions(&self) -> &[Vec3];

    /// Stretching-edge index pairs used for wireframe sampling.
    fn edges(&self) -> &[[u32; 2]];

    /// Returns the solver's name.
    fn name(&self) -> &str;
}

/// Builds a solver for a newly generated mesh.
///
/// Invoked on every reconfiguration, before the old solver is swapped out.
pub trait SolverFactory: Send + Sync {
    fn build(&self, mesh: &FabricMesh, params: &ClothParams) -> FabricResult<Box<dyn PbdSolver>>;
}

impl<F> SolverFactory for F
where
    F: Fn(&FabricMesh, &ClothParams) -> FabricResult<Box<dyn PbdSolver>> + Send + Sync,
{
    fn build(&self, mesh: &FabricMesh, params: &ClothParams) -> FabricResult<Box<dyn PbdSolver>> {
        self(mesh, params)
    }
}
