//! Procedural fabric generators.
//!
//! The rectangular generator produces a deterministic, resolution-driven
//! grid centred on the origin in the XY plane at a fixed height.

use glam::Vec3;
use loom_types::{FabricError, FabricResult};

use crate::mesh::FabricMesh;

/// Grid dimensions derived from a fabric size and resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridDims {
    /// Cells along X (`floor(width * resolution)`).
    pub nx: usize,
    /// Cells along Y (`floor(height * resolution)`).
    pub ny: usize,
}

impl GridDims {
    /// Computes cell counts, rejecting non-positive or non-finite inputs
    /// and grids with more vertices than a `u32` particle id can address.
    pub fn new(width: f64, height: f64, resolution: f64) -> FabricResult<Self> {
        for (label, value) in [("width", width), ("height", height), ("resolution", resolution)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(FabricError::InvalidConfiguration(format!(
                    "Fabric {label} must be positive and finite, got {value}"
                )));
            }
        }

        let nx = (width * resolution).floor();
        let ny = (height * resolution).floor();
        if nx < 1.0 || ny < 1.0 {
            return Err(FabricError::InvalidConfiguration(format!(
                "Fabric {width}x{height} at resolution {resolution} spans no grid cell"
            )));
        }

        let too_large = || {
            FabricError::InvalidConfiguration(format!(
                "Fabric {width}x{height} at resolution {resolution} exceeds {} particles",
                u32::MAX
            ))
        };
        // Particle ids are u32; bound the cell counts before any cast.
        let max = u32::MAX as f64;
        if nx >= max || ny >= max {
            return Err(too_large());
        }
        let dims = Self {
            nx: nx as usize,
            ny: ny as usize,
        };
        (dims.nx + 1)
            .checked_mul(dims.ny + 1)
            .filter(|&v| v <= u32::MAX as usize)
            .ok_or_else(too_large)?;
        Ok(dims)
    }

    /// Total vertex count, `(nx + 1) * (ny + 1)`.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        (self.nx + 1) * (self.ny + 1)
    }

    /// Total triangle count, `2 * nx * ny`.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        2 * self.nx * self.ny
    }

    /// Linear vertex index of grid node `(i, j)`; `i` walks X, `j` walks Y.
    #[inline]
    pub fn index(&self, i: usize, j: usize) -> u32 {
        (i * (self.ny + 1) + j) as u32
    }
}

/// `count + 1` values spaced evenly from `start` to `end` inclusive.
fn linspace(start: f64, end: f64, count: usize) -> impl Iterator<Item = f64> {
    let step = (end - start) / count as f64;
    (0..=count).map(move |i| start + i as f64 * step)
}

/// Generates a flat rectangular fabric at height `initial_height`.
///
/// X coordinates run from `+width/2` down to `-width/2`, Y coordinates
/// from `+height/2` down to `-height/2`. Vertex `(i, j)` lands at index
/// `i * (ny + 1) + j`. Every cell contributes a lower triangle
/// `{v(i,k), v(i,k+1), v(i+1,k)}` and an upper triangle
/// `{v(i,k+1), v(i+1,k+1), v(i+1,k)}`.
///
/// # Example
/// ```
/// use loom_mesh::generators::rectangular;
/// let mesh = rectangular("cloth", 2.0, 2.0, 1.0, 10.0).unwrap();
/// assert_eq!(mesh.vertex_count(), 441);
/// assert_eq!(mesh.triangle_count(), 800);
/// ```
pub fn rectangular(
    name: &str,
    width: f64,
    height: f64,
    initial_height: f64,
    resolution: f64,
) -> FabricResult<FabricMesh> {
    if !initial_height.is_finite() {
        return Err(FabricError::InvalidConfiguration(format!(
            "Initial height must be finite, got {initial_height}"
        )));
    }
    let dims = GridDims::new(width, height, resolution)?;

    let xs: Vec<f64> = linspace(width / 2.0, -width / 2.0, dims.nx).collect();
    let ys: Vec<f64> = linspace(height / 2.0, -height / 2.0, dims.ny).collect();

    let mut vertices = Vec::with_capacity(dims.vertex_count());
    for &x in &xs {
        for &y in &ys {
            vertices.push(Vec3::new(x as f32, y as f32, initial_height as f32));
        }
    }

    let mut face_tri_ids = Vec::with_capacity(dims.triangle_count());
    for i in 0..dims.nx {
        for k in 0..dims.ny {
            // Lower
            face_tri_ids.push([dims.index(i, k), dims.index(i, k + 1), dims.index(i + 1, k)]);
            // Upper
            face_tri_ids.push([
                dims.index(i, k + 1),
                dims.index(i + 1, k + 1),
                dims.index(i + 1, k),
            ]);
        }
    }

    Ok(FabricMesh {
        name: name.to_string(),
        vertices,
        face_tri_ids,
    })
}
