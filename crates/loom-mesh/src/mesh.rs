//! Core fabric mesh type.
//!
//! Vertices are stored as an ordered `Vec<Vec3>`; insertion order
//! defines particle identity for the solver. Triangles index into
//! that list. Topology is never mutated after creation; the solver
//! owns subsequent deformation of positions.

use glam::Vec3;
use loom_types::{FabricError, FabricResult};
use serde::{Deserialize, Serialize};

/// A named triangle mesh used to seed a fabric solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FabricMesh {
    /// Human-readable mesh name (e.g. `"cloth"`).
    pub name: String,
    /// Rest positions. Index = particle id.
    pub vertices: Vec<Vec3>,
    /// Triangle vertex indices, each `[v0, v1, v2]`.
    pub face_tri_ids: Vec<[u32; 3]>,
}

impl FabricMesh {
    /// Returns the number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.face_tri_ids.len()
    }

    /// Returns the three vertex indices of triangle `t`.
    #[inline]
    pub fn triangle(&self, t: usize) -> [u32; 3] {
        self.face_tri_ids[t]
    }

    /// Returns the rest position of vertex `i`.
    #[inline]
    pub fn position(&self, i: usize) -> Vec3 {
        self.vertices[i]
    }

    /// Area of triangle `t` in its rest configuration.
    pub fn triangle_area(&self, t: usize) -> f32 {
        let [a, b, c] = self.triangle(t);
        let p0 = self.vertices[a as usize];
        let p1 = self.vertices[b as usize];
        let p2 = self.vertices[c as usize];
        0.5 * (p1 - p0).cross(p2 - p0).length()
    }

    /// Validates mesh integrity.
    ///
    /// Checks:
    /// - Triangle indices are within bounds
    /// - No degenerate triangles (repeated vertex indices)
    /// - All vertex coordinates are finite
    pub fn validate(&self) -> FabricResult<()> {
        let n = self.vertices.len();

        for (i, v) in self.vertices.iter().enumerate() {
            if !v.is_finite() {
                return Err(FabricError::InvalidMesh(format!(
                    "Vertex {} has a non-finite coordinate: {:?}",
                    i, v
                )));
            }
        }

        for (t, tri) in self.face_tri_ids.iter().enumerate() {
            if let Some(&idx) = tri.iter().find(|&&idx| idx as usize >= n) {
                return Err(FabricError::InvalidMesh(format!(
                    "Triangle {} references vertex {} (vertex count: {})",
                    t, idx, n
                )));
            }
            let [a, b, c] = *tri;
            if a == b || b == c || a == c {
                return Err(FabricError::InvalidMesh(format!(
                    "Triangle {} has repeated vertex indices: [{}, {}, {}]",
                    t, a, b, c
                )));
            }
        }

        Ok(())
    }
}
