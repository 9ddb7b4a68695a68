//! Particle state: per-particle buffers mutated by the solver.
//!
//! Separate from the mesh topology (which is immutable after generation).

use glam::Vec3;
use loom_mesh::FabricMesh;
use loom_types::{FabricError, FabricResult, ParticleId};

/// Per-particle simulation buffers.
///
/// All arrays have length `particle_count`. A particle with
/// `inv_mass == 0.0` is pinned: integration skips it and constraint
/// projection never moves it.
#[derive(Debug, Clone)]
pub struct ParticleState {
    /// Current positions.
    pub pos: Vec<Vec3>,
    /// Positions at the start of the current sub-step.
    pub prev: Vec<Vec3>,
    /// Velocities.
    pub vel: Vec<Vec3>,
    /// Inverse masses; 0 = pinned.
    pub inv_mass: Vec<f32>,
    /// Optional ground plane height along Z.
    pub ground_height: Option<f32>,
}

impl ParticleState {
    /// Initialize state from a mesh and an areal density.
    ///
    /// Each triangle spreads a third of its mass (`area * density`) to
    /// each of its vertices; inverse masses accumulate accordingly.
    pub fn from_mesh(mesh: &FabricMesh, density: f32) -> FabricResult<Self> {
        mesh.validate()?;
        let n = mesh.vertex_count();

        let mut inv_mass = vec![0.0f32; n];
        for t in 0..mesh.triangle_count() {
            let mass = mesh.triangle_area(t) * density;
            let p_inv_mass = if mass > 0.0 { 1.0 / mass / 3.0 } else { 0.0 };
            for idx in mesh.triangle(t) {
                inv_mass[idx as usize] += p_inv_mass;
            }
        }

        Ok(Self {
            pos: mesh.vertices.clone(),
            prev: mesh.vertices.clone(),
            vel: vec![Vec3::ZERO; n],
            inv_mass,
            ground_height: None,
        })
    }

    /// Number of particles.
    #[inline]
    pub fn particle_count(&self) -> usize {
        self.pos.len()
    }

    /// Returns true if the particle is pinned.
    #[inline]
    pub fn is_pinned(&self, id: ParticleId) -> bool {
        self.inv_mass[id.index()] == 0.0
    }

    /// Bounds-checks a particle id.
    pub fn check(&self, id: ParticleId) -> FabricResult<usize> {
        let i = id.index();
        if i >= self.pos.len() {
            return Err(FabricError::UnknownParticle {
                id: id.0,
                count: self.pos.len(),
            });
        }
        Ok(i)
    }

    /// Explicit integration: `v += g·dt`, `p += v·dt`, with ground clamping.
    pub fn integrate(&mut self, dt: f32, gravity: Vec3) {
        for i in 0..self.pos.len() {
            if self.inv_mass[i] == 0.0 {
                continue;
            }
            self.vel[i] += gravity * dt;
            self.prev[i] = self.pos[i];
            self.pos[i] += self.vel[i] * dt;

            if let Some(ground) = self.ground_height {
                if self.pos[i].z < ground {
                    self.pos[i] = self.prev[i];
                    self.pos[i].z = ground;
                }
            }
        }
    }

    /// Update velocities from position change: `v = (p - p_prev) / dt`.
    pub fn update_velocities(&mut self, dt: f32) {
        let inv_dt = 1.0 / dt;
        for i in 0..self.pos.len() {
            if self.inv_mass[i] == 0.0 {
                continue;
            }
            self.vel[i] = (self.pos[i] - self.prev[i]) * inv_dt;
        }
    }

    /// Index of the first particle with a non-finite position or velocity.
    pub fn first_non_finite(&self) -> Option<usize> {
        (0..self.pos.len()).find(|&i| !self.pos[i].is_finite() || !self.vel[i].is_finite())
    }

    /// Nearest unpinned particle to `point` within `radius`.
    pub fn nearest_free(&self, point: Vec3, radius: f32) -> Option<ParticleId> {
        let mut best: Option<(usize, f32)> = None;
        let radius_sq = radius * radius;
        for (i, p) in self.pos.iter().enumerate() {
            if self.inv_mass[i] == 0.0 {
                continue;
            }
            let d2 = p.distance_squared(point);
            if d2 > radius_sq {
                continue;
            }
            if best.map_or(true, |(_, best_d2)| d2 < best_d2) {
                best = Some((i, d2));
            }
        }
        best.map(|(i, _)| ParticleId(i as u32))
    }

    /// Kinetic energy of the free particles: `0.5 * Σ m_i * |v_i|²`.
    pub fn kinetic_energy(&self) -> f64 {
        let mut energy = 0.0f64;
        for i in 0..self.pos.len() {
            if self.inv_mass[i] > 0.0 {
                let m = 1.0 / self.inv_mass[i] as f64;
                energy += 0.5 * m * self.vel[i].length_squared() as f64;
            }
        }
        energy
    }
}
