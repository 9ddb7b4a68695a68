//! Edge adjacency of a fabric mesh.
//!
//! Unique edges become stretching constraints and wireframe segments;
//! each interior edge contributes one bending pair, its two wing vertices.

use std::collections::BTreeMap;

use crate::mesh::FabricMesh;

/// Edge lists derived from a mesh's triangles.
///
/// Edges are `[lo, hi]` with `lo < hi`, sorted ascending, so two builds
/// of the same mesh always agree.
#[derive(Debug, Clone)]
pub struct Topology {
    pub edges: Vec<[u32; 2]>,
    /// Number of triangles touching each entry of `edges`.
    pub edge_valence: Vec<u32>,
    pub interior_edges: Vec<InteriorEdge>,
}

/// An edge shared by two triangles, plus the vertex each triangle has
/// off the edge.
///
/// ```text
///        wing_a
///        /    \
///     v0 ────── v1
///        \    /
///        wing_b
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteriorEdge {
    pub v0: u32,
    pub v1: u32,
    pub wing_a: u32,
    pub wing_b: u32,
}

impl Topology {
    pub fn build(mesh: &FabricMesh) -> Self {
        // Per edge: valence plus the off-edge vertex of the first two faces.
        let mut adjacency: BTreeMap<[u32; 2], (u32, [u32; 2])> = BTreeMap::new();
        for tri in &mesh.face_tri_ids {
            for k in 0..3 {
                let (a, b, off) = (tri[k], tri[(k + 1) % 3], tri[(k + 2) % 3]);
                let entry = adjacency
                    .entry([a.min(b), a.max(b)])
                    .or_insert((0, [off, off]));
                if entry.0 == 1 {
                    entry.1[1] = off;
                }
                entry.0 += 1;
            }
        }

        let mut topology = Self {
            edges: Vec::with_capacity(adjacency.len()),
            edge_valence: Vec::with_capacity(adjacency.len()),
            interior_edges: Vec::new(),
        };
        for ([v0, v1], (valence, [wing_a, wing_b])) in adjacency {
            topology.edges.push([v0, v1]);
            topology.edge_valence.push(valence);
            if valence == 2 {
                topology.interior_edges.push(InteriorEdge { v0, v1, wing_a, wing_b });
            }
        }
        topology
    }

    /// Edges on the fabric border (one adjacent triangle).
    pub fn boundary_edge_count(&self) -> usize {
        self.edge_valence.iter().filter(|&&v| v == 1).count()
    }

    /// No edge is shared by more than two triangles.
    pub fn is_manifold(&self) -> bool {
        self.edge_valence.iter().all(|&v| v <= 2)
    }
}
