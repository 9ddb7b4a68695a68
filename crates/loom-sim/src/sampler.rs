//! Copies solver geometry into render frames.

use std::time::{SystemTime, UNIX_EPOCH};

use loom_render::{Marker, SurfaceFrame};
use loom_solver::PbdSolver;

/// Builds a [`SurfaceFrame`] from the solver's current state.
///
/// [`RenderSampler::sample`] only reads and copies, so it is cheap to
/// call under the simulation guard; publishing happens afterwards.
#[derive(Debug, Clone)]
pub struct RenderSampler {
    frame_id: String,
    sequence: u64,
}

impl RenderSampler {
    pub fn new(frame_id: &str) -> Self {
        Self {
            frame_id: frame_id.to_string(),
            sequence: 0,
        }
    }

    /// Copies one point per particle and both endpoints of every edge.
    pub fn sample(&mut self, solver: &dyn PbdSolver) -> SurfaceFrame {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default();

        let positions = solver.positions();
        let points: Vec<[f32; 3]> = positions.iter().map(|p| p.to_array()).collect();

        let edges = solver.edges();
        let mut segments = Vec::with_capacity(edges.len() * 2);
        let mut dropped = 0usize;
        for &[a, b] in edges {
            match (positions.get(a as usize), positions.get(b as usize)) {
                (Some(pa), Some(pb)) => {
                    segments.push(pa.to_array());
                    segments.push(pb.to_array());
                }
                _ => dropped += 1,
            }
        }
        if dropped > 0 {
            tracing::warn!(
                solver = solver.name(),
                dropped,
                particles = positions.len(),
                "Skipped edges referencing missing particles"
            );
        }

        let frame = SurfaceFrame {
            sequence: self.sequence,
            points: Marker::points(&self.frame_id, stamp, points),
            wireframe: Marker::line_list(&self.frame_id, stamp, segments),
        };
        self.sequence += 1;
        frame
    }

    pub fn frame_id(&self) -> &str {
        &self.frame_id
    }

    /// Frames sampled so far.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}
