//! Synthetic anchors for `loom run`.
//!
//! Each anchor starts above a fabric corner and is steered through a
//! short list of waypoints by a clipped proportional velocity law,
//! `u = v_desired − K·(q − q_desired)`.

use glam::Vec3;
use loom_mesh::FabricMesh;

/// Velocity command toward `desired`, clipped per axis to `vel_limit`.
pub fn control_law(
    desired: Vec3,
    desired_vel: Vec3,
    position: Vec3,
    gain: f32,
    vel_limit: Vec3,
) -> Vec3 {
    let u = desired_vel - gain * (position - desired);
    u.clamp(-vel_limit, vel_limit)
}

#[derive(Debug, Clone)]
struct Anchor {
    position: Vec3,
    waypoints: Vec<Vec3>,
    next: usize,
}

/// A group of anchors cycling through waypoints.
#[derive(Debug, Clone)]
pub struct AnchorSwarm {
    anchors: Vec<Anchor>,
    gain: f32,
    vel_limit: Vec3,
    tolerance: f32,
}

impl AnchorSwarm {
    /// One anchor per slot, placed on the mesh corners in turn.
    ///
    /// Poses are reported in anchor coordinates, i.e. `z_offset` below
    /// the fabric, so the simulator's offset lands them on the corners.
    /// Each anchor lifts by `lift`, pulls 20% toward the centre, then returns.
    pub fn around_fabric(
        mesh: &FabricMesh,
        count: usize,
        z_offset: f32,
        lift: f32,
        gain: f32,
        vel_limit: f32,
    ) -> Self {
        let corners = corner_positions(mesh);
        let particles = mesh.vertex_count().max(1) as f32;
        let centre = mesh.vertices.iter().copied().sum::<Vec3>() / particles;

        let anchors = (0..count)
            .map(|slot| {
                let corner = corners
                    .get(slot % corners.len().max(1))
                    .copied()
                    .unwrap_or(Vec3::ZERO);
                let start = corner - Vec3::Z * z_offset;
                let raised = start + Vec3::Z * lift;
                let inward = raised + (centre - corner).with_z(0.0) * 0.2;
                Anchor {
                    position: start,
                    waypoints: vec![raised, inward, raised, start],
                    next: 0,
                }
            })
            .collect();

        Self {
            anchors,
            gain,
            vel_limit: Vec3::splat(vel_limit),
            tolerance: 0.01,
        }
    }

    /// Integrates every anchor over `dt` and returns the new poses.
    pub fn step(&mut self, dt: f32) -> Vec<Vec3> {
        for anchor in &mut self.anchors {
            let target = anchor.waypoints[anchor.next];
            let u = control_law(target, Vec3::ZERO, anchor.position, self.gain, self.vel_limit);
            anchor.position += u * dt;
            if anchor.position.distance(target) < self.tolerance {
                anchor.next = (anchor.next + 1) % anchor.waypoints.len();
            }
        }
        self.poses()
    }

    pub fn poses(&self) -> Vec<Vec3> {
        self.anchors.iter().map(|a| a.position).collect()
    }
}

/// The four grid corners, in vertex order.
fn corner_positions(mesh: &FabricMesh) -> Vec<Vec3> {
    let Some(last) = mesh.vertex_count().checked_sub(1) else {
        return Vec::new();
    };
    let first = mesh.position(0);
    // Vertices along the first column share its X coordinate.
    let column = mesh
        .vertices
        .iter()
        .take_while(|v| v.x == first.x)
        .count();
    let mut corners = vec![
        first,
        mesh.position(column - 1),
        mesh.position(last + 1 - column),
        mesh.position(last),
    ];
    corners.dedup();
    corners
}
