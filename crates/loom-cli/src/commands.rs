//! CLI command implementations.

use std::fs::File;
use std::io::BufWriter;
use std::thread;
use std::time::{Duration, Instant};

use loom_mesh::{generators, Topology};
use loom_render::{HeadlessSink, JsonLinesExporter, VisualizationSink};
use loom_sim::{FabricConfig, FabricNode};
use loom_solver::XpbdClothFactory;
use loom_types::AnchorSlot;

use crate::anchors::AnchorSwarm;

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Options for `loom run`.
pub struct RunOptions<'a> {
    pub config: Option<&'a str>,
    pub duration: f64,
    pub output: Option<&'a str>,
    pub pose_rate: f64,
    pub gain: f32,
    pub vel_limit: f32,
}

fn load_config(path: Option<&str>) -> Result<FabricConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => FabricConfig::from_path(path)?,
        None => FabricConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

/// Run the node with synthetic anchors for a fixed wall-clock duration.
pub fn run(opts: &RunOptions<'_>) -> CliResult {
    let mut config = load_config(opts.config)?;
    config.active = true;
    for (label, value) in [("duration", opts.duration), ("pose rate", opts.pose_rate)] {
        if !value.is_finite() || value <= 0.0 {
            return Err(format!("{label} must be positive, got {value}").into());
        }
    }
    let period = Duration::try_from_secs_f64(1.0 / opts.pose_rate)
        .map_err(|e| format!("pose rate {} has no usable period: {e}", opts.pose_rate))?;
    let total = Duration::try_from_secs_f64(opts.duration)?;

    let sink: Box<dyn VisualizationSink> = match opts.output {
        Some(path) => Box::new(JsonLinesExporter::create(path)?),
        None => Box::new(HeadlessSink::new()),
    };

    println!("Loom Simulation");
    println!("───────────────");
    println!(
        "Fabric: {} × {} m @ {} cells/m, {} anchors",
        config.fabric.width,
        config.fabric.height,
        config.fabric.resolution,
        config.anchor_count()
    );

    let mut node = FabricNode::launch(config.clone(), XpbdClothFactory, sink)?;
    let mesh = node.simulator().mesh()?;
    let mut swarm = AnchorSwarm::around_fabric(
        &mesh,
        config.anchor_count(),
        config.anchors.z_offset as f32,
        0.3,
        opts.gain,
        opts.vel_limit,
    );

    let start = Instant::now();
    while start.elapsed() < total {
        for (slot, pose) in swarm.step(period.as_secs_f32()).into_iter().enumerate() {
            node.push_pose(AnchorSlot(slot), pose)?;
        }
        if node.fault().is_some() {
            break;
        }
        thread::sleep(period);
    }

    let session = node.simulator().session()?;
    let fault = node.fault();
    node.shutdown()?;
    if let Some(fault) = fault {
        return Err(fault.into());
    }

    let attached = session.slots.iter().filter(|s| s.is_attached()).count();
    println!();
    println!("Ticks:           {}", session.ticks);
    println!("Step dt:         {:.6} s", session.step_dt);
    println!("Rate locked:     {}", session.auto_rate_locked);
    println!("Anchors bound:   {attached}/{}", session.slots.len());
    if let Some(path) = opts.output {
        println!("Frames written:  {path}");
    }
    Ok(())
}

/// Generate the configured fabric and print its statistics.
pub fn mesh(config_path: Option<&str>, json_path: Option<&str>) -> CliResult {
    let config = load_config(config_path)?;
    let fabric = &config.fabric;
    let mesh = generators::rectangular(
        &fabric.name,
        fabric.width,
        fabric.height,
        fabric.initial_height,
        fabric.resolution,
    )?;
    mesh.validate()?;
    let topology = Topology::build(&mesh);
    let area: f32 = (0..mesh.triangle_count()).map(|t| mesh.triangle_area(t)).sum();

    println!("Mesh '{}'", mesh.name);
    println!("  Particles:      {}", mesh.vertex_count());
    println!("  Triangles:      {}", mesh.triangle_count());
    println!("  Edges:          {}", topology.edges.len());
    println!("  Interior edges: {}", topology.interior_edges.len());
    println!("  Boundary edges: {}", topology.boundary_edge_count());
    println!("  Manifold:       {}", topology.is_manifold());
    println!("  Area:           {area:.4} m²");

    if let Some(path) = json_path {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, &mesh)?;
        println!("  Written to:     {path}");
    }
    Ok(())
}

/// Validate a config file.
pub fn validate(path: &str) -> CliResult {
    let config = load_config(Some(path))?;
    let dims = generators::GridDims::new(
        config.fabric.width,
        config.fabric.height,
        config.fabric.resolution,
    )?;
    println!("✓ {path} is valid");
    println!(
        "  {} particles, {} triangles, {} anchors, {} sub-steps",
        dims.vertex_count(),
        dims.triangle_count(),
        config.anchor_count(),
        config.simulation.sub_steps
    );
    Ok(())
}

/// Print the default configuration.
pub fn default_config() -> CliResult {
    print!("{}", FabricConfig::default().to_toml_string()?);
    Ok(())
}
