//! Visualization sink trait and in-process sinks.
//!
//! The sampler hands each frame to a sink once per render tick. The
//! headless sink discards frames, serving as a no-op for benchmarks
//! and CI.

use std::sync::{Arc, Mutex};

use loom_types::FabricResult;

use crate::marker::SurfaceFrame;

/// Trait for consumers of sampled fabric geometry.
///
/// # Implementations
/// - [`HeadlessSink`]: Discards frames
/// - [`MemorySink`]: Keeps frames in memory
/// - [`JsonLinesExporter`](crate::JsonLinesExporter): Streams frames as JSON lines
pub trait VisualizationSink: Send {
    /// Publish one frame.
    fn publish(&mut self, frame: &SurfaceFrame) -> FabricResult<()>;

    /// Flush buffers, close files, etc.
    fn finalize(&mut self) -> FabricResult<()> {
        Ok(())
    }

    /// Returns the sink name.
    fn name(&self) -> &str;

    /// Returns the number of frames published.
    fn frame_count(&self) -> u64;
}

/// Headless sink. Counts and discards frames.
#[derive(Debug, Default)]
pub struct HeadlessSink {
    frames: u64,
}

impl HeadlessSink {
    pub fn new() -> Self {
        Self { frames: 0 }
    }
}

impl VisualizationSink for HeadlessSink {
    fn publish(&mut self, _frame: &SurfaceFrame) -> FabricResult<()> {
        self.frames += 1;
        Ok(())
    }

    fn name(&self) -> &str {
        "headless"
    }

    fn frame_count(&self) -> u64 {
        self.frames
    }
}

/// Keeps every published frame; clones share the same storage so a
/// caller can inspect frames after boxing the sink.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    frames: Arc<Mutex<Vec<SurfaceFrame>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the frames published so far.
    pub fn frames(&self) -> Vec<SurfaceFrame> {
        match self.frames.lock() {
            Ok(frames) => frames.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// The most recent frame, if any.
    pub fn last(&self) -> Option<SurfaceFrame> {
        self.frames().pop()
    }
}

impl VisualizationSink for MemorySink {
    fn publish(&mut self, frame: &SurfaceFrame) -> FabricResult<()> {
        match self.frames.lock() {
            Ok(mut frames) => frames.push(frame.clone()),
            Err(poisoned) => poisoned.into_inner().push(frame.clone()),
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }

    fn frame_count(&self) -> u64 {
        match self.frames.lock() {
            Ok(frames) => frames.len() as u64,
            Err(poisoned) => poisoned.into_inner().len() as u64,
        }
    }
}
