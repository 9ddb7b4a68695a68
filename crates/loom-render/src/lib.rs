//! # loom-render
//!
//! Visualization output for sampled fabric geometry.
//!
//! Each render tick produces a [`SurfaceFrame`] carrying two markers:
//! a point cloud (one point per particle) and a line list (one segment
//! per stretching edge). How a frame is encoded is the sink's concern.

pub mod json_exporter;
pub mod marker;
pub mod sink;

pub use json_exporter::JsonLinesExporter;
pub use marker::{Color, Marker, MarkerKind, SurfaceFrame};
pub use sink::{HeadlessSink, MemorySink, VisualizationSink};
