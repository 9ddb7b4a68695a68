//! Integration tests for loom-render.

use loom_render::marker::{Marker, MarkerKind, SurfaceFrame};
use loom_render::sink::{HeadlessSink, MemorySink, VisualizationSink};
use loom_render::JsonLinesExporter;

fn sample_frame(sequence: u64) -> SurfaceFrame {
    let points = vec![[0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [0.0, 1.0, 1.0]];
    let lines = vec![[0.0, 0.0, 1.0], [1.0, 0.0, 1.0]];
    SurfaceFrame {
        sequence,
        points: Marker::points("map", 12.5, points),
        wireframe: Marker::line_list("map", 12.5, lines),
    }
}

#[test]
fn marker_constructors() {
    let frame = sample_frame(0);
    assert_eq!(frame.points.id, Marker::POINTS_ID);
    assert_eq!(frame.points.kind, MarkerKind::Points);
    assert_eq!(frame.points.primitive_count(), 3);
    assert_eq!(frame.wireframe.id, Marker::LINES_ID);
    assert_eq!(frame.wireframe.kind, MarkerKind::LineList);
    assert_eq!(frame.wireframe.primitive_count(), 1);
    assert_eq!(frame.points.frame_id, "map");
    assert!(frame.wireframe.scale < frame.points.scale);
}

#[test]
fn headless_counts_frames() {
    let mut sink = HeadlessSink::new();
    assert_eq!(sink.name(), "headless");
    assert_eq!(sink.frame_count(), 0);
    sink.publish(&sample_frame(0)).unwrap();
    sink.publish(&sample_frame(1)).unwrap();
    assert_eq!(sink.frame_count(), 2);
    sink.finalize().unwrap();
}

#[test]
fn memory_sink_shares_storage() {
    let recorder = MemorySink::new();
    let mut boxed: Box<dyn VisualizationSink> = Box::new(recorder.clone());
    boxed.publish(&sample_frame(0)).unwrap();
    boxed.publish(&sample_frame(1)).unwrap();

    assert_eq!(recorder.frame_count(), 2);
    assert_eq!(recorder.last().unwrap().sequence, 1);
}

#[test]
fn json_lines_one_object_per_frame() {
    let mut exporter = JsonLinesExporter::new(Vec::new());
    exporter.publish(&sample_frame(0)).unwrap();
    exporter.publish(&sample_frame(1)).unwrap();
    exporter.finalize().unwrap();
    assert_eq!(exporter.frame_count(), 2);

    let bytes = exporter.into_inner();
    let text = String::from_utf8(bytes).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);

    let recovered: SurfaceFrame = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(recovered, sample_frame(1));
}

#[test]
fn json_lines_to_file() {
    let path = std::env::temp_dir().join(format!("loom_render_{}.jsonl", std::process::id()));
    {
        let mut exporter = JsonLinesExporter::create(&path).unwrap();
        exporter.publish(&sample_frame(0)).unwrap();
        exporter.finalize().unwrap();
    }
    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), 1);
    std::fs::remove_file(&path).ok();
}
