//! JSON-lines frame exporter.
//!
//! Writes one JSON object per render tick so a long-running session
//! can be tailed or replayed frame by frame.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use loom_types::{FabricError, FabricResult};

use crate::marker::SurfaceFrame;
use crate::sink::VisualizationSink;

/// Streams frames to any writer as newline-delimited JSON.
pub struct JsonLinesExporter<W: Write + Send> {
    writer: W,
    frames: u64,
}

impl JsonLinesExporter<BufWriter<File>> {
    /// Creates (or truncates) `path` and writes frames to it.
    pub fn create(path: impl AsRef<Path>) -> FabricResult<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write + Send> JsonLinesExporter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, frames: 0 }
    }

    /// Consumes the exporter, returning the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> VisualizationSink for JsonLinesExporter<W> {
    fn publish(&mut self, frame: &SurfaceFrame) -> FabricResult<()> {
        serde_json::to_writer(&mut self.writer, frame).map_err(|e| {
            FabricError::Serialization(format!("JSON serialization failed: {e}"))
        })?;
        self.writer.write_all(b"\n")?;
        self.frames += 1;
        Ok(())
    }

    fn finalize(&mut self) -> FabricResult<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "json_lines"
    }

    fn frame_count(&self) -> u64 {
        self.frames
    }
}
