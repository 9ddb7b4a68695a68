//! Marker types for the point cloud and wireframe outputs.

use serde::{Deserialize, Serialize};

/// RGBA colour, components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// Primitive interpretation of a marker's point list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerKind {
    /// Every point is drawn on its own.
    Points,
    /// Consecutive point pairs are drawn as segments.
    LineList,
}

/// One visualization primitive in a coordinate frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    /// Stable marker id within a frame (0 = points, 1 = wireframe).
    pub id: u32,
    pub kind: MarkerKind,
    /// Coordinate-space identifier (e.g. `"map"`).
    pub frame_id: String,
    /// Wall-clock timestamp, seconds since the Unix epoch.
    pub stamp: f64,
    pub points: Vec<[f32; 3]>,
    /// Point size, or line width for [`MarkerKind::LineList`].
    pub scale: f32,
    pub color: Color,
}

impl Marker {
    pub const POINTS_ID: u32 = 0;
    pub const LINES_ID: u32 = 1;

    const POINT_SCALE: f32 = 0.01;
    const LINE_WIDTH: f32 = 0.005;
    const POINT_COLOR: Color = Color::rgba(1.0, 0.5, 0.0, 1.0);
    const LINE_COLOR: Color = Color::rgba(0.0, 1.0, 0.0, 1.0);

    /// Point-cloud marker, one point per particle.
    pub fn points(frame_id: &str, stamp: f64, points: Vec<[f32; 3]>) -> Self {
        Self {
            id: Self::POINTS_ID,
            kind: MarkerKind::Points,
            frame_id: frame_id.to_string(),
            stamp,
            points,
            scale: Self::POINT_SCALE,
            color: Self::POINT_COLOR,
        }
    }

    /// Line-list marker, two points per segment.
    pub fn line_list(frame_id: &str, stamp: f64, points: Vec<[f32; 3]>) -> Self {
        Self {
            id: Self::LINES_ID,
            kind: MarkerKind::LineList,
            frame_id: frame_id.to_string(),
            stamp,
            points,
            scale: Self::LINE_WIDTH,
            color: Self::LINE_COLOR,
        }
    }

    /// Number of primitives (points or segments).
    pub fn primitive_count(&self) -> usize {
        match self.kind {
            MarkerKind::Points => self.points.len(),
            MarkerKind::LineList => self.points.len() / 2,
        }
    }
}

/// Everything published for one render tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceFrame {
    /// Render tick counter, starting at 0 for each simulator configuration.
    pub sequence: u64,
    pub points: Marker,
    pub wireframe: Marker,
}
