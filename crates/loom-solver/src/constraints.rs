//! XPBD distance constraints.
//!
//! Both stretching (mesh edges) and bending (wing-to-wing distance
//! across interior edges) are expressed as distance constraints with a
//! rest length captured from the initial mesh and a compliance.

use glam::Vec3;
use loom_mesh::Topology;
use loom_types::constants::EPSILON;

/// A set of distance constraints sharing one compliance.
#[derive(Debug, Clone, Default)]
pub struct DistanceConstraints {
    /// Particle index pairs.
    pub ids: Vec<[u32; 2]>,
    /// Rest lengths, one per pair.
    pub rest_lengths: Vec<f32>,
}

impl DistanceConstraints {
    /// Builds constraints for `ids`, measuring rest lengths in `rest`.
    pub fn new(ids: Vec<[u32; 2]>, rest: &[Vec3]) -> Self {
        let rest_lengths = ids
            .iter()
            .map(|&[a, b]| rest[a as usize].distance(rest[b as usize]))
            .collect();
        Self { ids, rest_lengths }
    }

    /// Stretching constraints along every unique mesh edge.
    pub fn stretching(topology: &Topology, rest: &[Vec3]) -> Self {
        Self::new(topology.edges.clone(), rest)
    }

    /// Bending constraints between the wing vertices of interior edges.
    pub fn bending(topology: &Topology, rest: &[Vec3]) -> Self {
        let ids = topology
            .interior_edges
            .iter()
            .map(|ie| [ie.wing_a, ie.wing_b])
            .collect();
        Self::new(ids, rest)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// One Gauss-Seidel pass of XPBD projection.
    ///
    /// `alpha = compliance / dt²`; each pair is moved along its gradient
    /// by `-C / (w0 + w1 + alpha)` weighted by inverse mass.
    pub fn project(&self, pos: &mut [Vec3], inv_mass: &[f32], compliance: f32, dt: f32) {
        let alpha = compliance / (dt * dt);
        for (&[a, b], &rest) in self.ids.iter().zip(&self.rest_lengths) {
            let (a, b) = (a as usize, b as usize);
            let w = inv_mass[a] + inv_mass[b];
            if w == 0.0 {
                continue;
            }
            let delta = pos[a] - pos[b];
            let len = delta.length();
            if len < EPSILON {
                continue;
            }
            let grad = delta / len;
            let c = len - rest;
            let s = -c / (w + alpha);
            pos[a] += grad * (s * inv_mass[a]);
            pos[b] -= grad * (s * inv_mass[b]);
        }
    }
}
