//! XPBD cloth.
//!
//! Implements [`PbdSolver`] with per-edge stretching and wing-to-wing
//! bending distance constraints. An anchor pins a particle by zeroing
//! its inverse mass; pinned particles follow their anchor exactly.

use glam::Vec3;
use loom_mesh::{FabricMesh, Topology};
use loom_types::{FabricError, FabricResult, ParticleId};

use crate::config::ClothParams;
use crate::constraints::DistanceConstraints;
use crate::state::ParticleState;
use crate::strategy::{PbdSolver, SolverFactory};

/// XPBD cloth built from a [`FabricMesh`].
pub struct XpbdCloth {
    state: ParticleState,
    stretching: DistanceConstraints,
    bending: DistanceConstraints,
    stretching_compliance: f32,
    bending_compliance: f32,
    attach_radius: f32,
}

impl XpbdCloth {
    /// Builds the cloth: particle masses from density, constraints from
    /// the mesh topology, rest lengths from the initial vertices.
    pub fn new(mesh: &FabricMesh, params: &ClothParams) -> FabricResult<Self> {
        params.validate()?;
        let mut state = ParticleState::from_mesh(mesh, params.density as f32)?;
        state.ground_height = params.ground_height.map(|h| h as f32);

        let topology = Topology::build(mesh);
        let stretching = DistanceConstraints::stretching(&topology, &mesh.vertices);
        let bending = DistanceConstraints::bending(&topology, &mesh.vertices);

        tracing::debug!(
            mesh = %mesh.name,
            particles = state.particle_count(),
            stretching = stretching.len(),
            bending = bending.len(),
            "xpbd cloth built"
        );

        Ok(Self {
            state,
            stretching,
            bending,
            stretching_compliance: params.stretching_compliance as f32,
            bending_compliance: params.bending_compliance as f32,
            attach_radius: params.attach_radius as f32,
        })
    }

    /// Read access to the particle buffers.
    pub fn state(&self) -> &ParticleState {
        &self.state
    }

    /// Number of bending constraints.
    pub fn bending_count(&self) -> usize {
        self.bending.len()
    }
}

impl PbdSolver for XpbdCloth {
    fn pre_solve(&mut self, dt: f32, gravity: Vec3) -> FabricResult<()> {
        self.state.integrate(dt, gravity);
        Ok(())
    }

    fn solve(&mut self, dt: f32) -> FabricResult<()> {
        let ParticleState { pos, inv_mass, .. } = &mut self.state;
        self.stretching.project(pos, inv_mass, self.stretching_compliance, dt);
        self.bending.project(pos, inv_mass, self.bending_compliance, dt);
        Ok(())
    }

    fn post_solve(&mut self, dt: f32) -> FabricResult<()> {
        self.state.update_velocities(dt);
        if let Some(i) = self.state.first_non_finite() {
            return Err(FabricError::SolverFault(format!(
                "particle {} left the finite range: pos={:?} vel={:?}",
                i, self.state.pos[i], self.state.vel[i]
            )));
        }
        Ok(())
    }

    fn attach_nearest(&mut self, point: Vec3) -> Option<ParticleId> {
        let id = self.state.nearest_free(point, self.attach_radius)?;
        let i = id.index();
        self.state.inv_mass[i] = 0.0;
        self.state.vel[i] = Vec3::ZERO;
        self.state.pos[i] = point;
        self.state.prev[i] = point;
        Some(id)
    }

    fn update_attached_pose(&mut self, id: ParticleId, point: Vec3) -> FabricResult<()> {
        let i = self.state.check(id)?;
        self.state.pos[i] = point;
        Ok(())
    }

    fn positions(&self) -> &[Vec3] {
        &self.state.pos
    }

    fn edges(&self) -> &[[u32; 2]] {
        &self.stretching.ids
    }

    fn name(&self) -> &str {
        "xpbd_cloth"
    }
}

/// Factory producing an [`XpbdCloth`] for each new mesh.
#[derive(Debug, Clone, Copy, Default)]
pub struct XpbdClothFactory;

impl SolverFactory for XpbdClothFactory {
    fn build(&self, mesh: &FabricMesh, params: &ClothParams) -> FabricResult<Box<dyn PbdSolver>> {
        Ok(Box::new(XpbdCloth::new(mesh, params)?))
    }
}
