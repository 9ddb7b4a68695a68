//! Simulator configuration.
//!
//! One validated struct replaces the parameter-server round trip: every
//! option the node recognizes lives here, loaded from TOML and checked
//! by [`FabricConfig::validate`] before any mesh or solver is built.

use std::path::Path;
use std::time::Duration;

use glam::Vec3;
use loom_mesh::generators::GridDims;
use loom_solver::ClothParams;
use loom_types::constants::{
    DEFAULT_ANCHOR_COUNT, DEFAULT_RENDER_RATE, DEFAULT_SIMULATION_RATE, DEFAULT_STEPS,
    DEFAULT_STEP_DT, DEFAULT_SUB_STEPS, GRAVITY,
};
use loom_types::{FabricError, FabricResult};
use serde::{Deserialize, Serialize};

/// Complete simulator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FabricConfig {
    /// Runs the pipeline (timers and pose inputs) when true.
    pub active: bool,
    /// One-shot session reset; cleared after it is applied.
    pub reset: bool,
    pub simulation: SimulationSection,
    pub fabric: FabricSection,
    pub render: RenderSection,
    pub anchors: AnchorSection,
}

/// Scheduler parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSection {
    /// Gravity vector (m/s²).
    pub gravity: [f64; 3],
    /// Nominal seconds per top-level step.
    pub step_dt: f64,
    /// Adopt the measured mean tick duration as `step_dt` and tick period, once.
    pub auto_rate: bool,
    /// PBD sub-steps per top-level step.
    pub sub_steps: u32,
    /// Top-level steps per tick.
    pub steps: u32,
    /// Initial simulation tick rate (Hz).
    pub rate_hz: f64,
}

/// Fabric geometry and material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FabricSection {
    pub name: String,
    /// Extent along X (m).
    pub width: f64,
    /// Extent along Y (m).
    pub height: f64,
    /// Areal density (kg/m²).
    pub density: f64,
    /// Grid cells per metre.
    pub resolution: f64,
    pub bending_compliance: f64,
    /// Initial Z of every particle (m).
    pub initial_height: f64,
    /// Maximum anchor-to-particle distance for attachment (m).
    pub attach_radius: f64,
    pub ground_height: Option<f64>,
}

/// Render sampling and output tagging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSection {
    /// Render tick rate (Hz).
    pub rate_hz: f64,
    /// Output topic for the fabric markers.
    pub points_topic: String,
    /// Coordinate frame the markers are expressed in.
    pub frame_id: String,
}

/// Anchor pose inputs. One slot per topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorSection {
    /// Added to every pose's Z before use (m).
    pub z_offset: f64,
    pub pose_topics: Vec<String>,
}

impl Default for FabricConfig {
    fn default() -> Self {
        Self {
            active: true,
            reset: false,
            simulation: SimulationSection::default(),
            fabric: FabricSection::default(),
            render: RenderSection::default(),
            anchors: AnchorSection::default(),
        }
    }
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            gravity: [0.0, 0.0, -GRAVITY],
            step_dt: DEFAULT_STEP_DT,
            auto_rate: true,
            sub_steps: DEFAULT_SUB_STEPS,
            steps: DEFAULT_STEPS,
            rate_hz: DEFAULT_SIMULATION_RATE,
        }
    }
}

impl Default for FabricSection {
    fn default() -> Self {
        let cloth = ClothParams::default();
        Self {
            name: "cloth".to_string(),
            width: 2.0,
            height: 2.0,
            density: cloth.density,
            resolution: 10.0,
            bending_compliance: cloth.bending_compliance,
            initial_height: 1.0,
            attach_radius: cloth.attach_radius,
            ground_height: cloth.ground_height,
        }
    }
}

impl Default for RenderSection {
    fn default() -> Self {
        Self {
            rate_hz: DEFAULT_RENDER_RATE,
            points_topic: "cloth_points".to_string(),
            frame_id: "map".to_string(),
        }
    }
}

impl Default for AnchorSection {
    fn default() -> Self {
        Self {
            z_offset: 1.0,
            pose_topics: (1..=DEFAULT_ANCHOR_COUNT)
                .map(|i| format!("d{i}/ground_truth/odom"))
                .collect(),
        }
    }
}

impl FabricConfig {
    /// Parses a TOML document; missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> FabricResult<Self> {
        toml::from_str(text)
            .map_err(|e| FabricError::Serialization(format!("Invalid config TOML: {e}")))
    }

    /// Reads and parses a TOML config file.
    pub fn from_path(path: impl AsRef<Path>) -> FabricResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Serializes to TOML.
    pub fn to_toml_string(&self) -> FabricResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| FabricError::Serialization(format!("Config TOML encoding failed: {e}")))
    }

    /// Checks every option; nothing is built from an invalid config.
    pub fn validate(&self) -> FabricResult<()> {
        let sim = &self.simulation;
        if sim.gravity.iter().any(|g| !g.is_finite()) {
            return Err(invalid("Gravity components must be finite"));
        }
        positive("step_dt", sim.step_dt)?;
        if sim.sub_steps == 0 {
            return Err(invalid("sub_steps must be >= 1"));
        }
        if sim.steps == 0 {
            return Err(invalid("steps must be >= 1"));
        }
        rate("simulation rate", sim.rate_hz)?;
        rate("render rate", self.render.rate_hz)?;

        let fabric = &self.fabric;
        GridDims::new(fabric.width, fabric.height, fabric.resolution)?;
        if !fabric.initial_height.is_finite() {
            return Err(invalid("initial_height must be finite"));
        }
        self.cloth_params().validate()?;

        if self.render.frame_id.trim().is_empty() {
            return Err(invalid("render frame_id must not be empty"));
        }
        if !self.anchors.z_offset.is_finite() {
            return Err(invalid("anchor z_offset must be finite"));
        }
        if let Some(i) = self.anchors.pose_topics.iter().position(|t| t.trim().is_empty()) {
            return Err(invalid(&format!("anchor pose topic {i} is empty")));
        }
        Ok(())
    }

    /// Material parameters handed to the solver factory.
    pub fn cloth_params(&self) -> ClothParams {
        ClothParams {
            density: self.fabric.density,
            bending_compliance: self.fabric.bending_compliance,
            stretching_compliance: 0.0,
            attach_radius: self.fabric.attach_radius,
            ground_height: self.fabric.ground_height,
        }
    }

    /// Gravity as a solver vector.
    pub fn gravity(&self) -> Vec3 {
        let [x, y, z] = self.simulation.gravity;
        Vec3::new(x as f32, y as f32, z as f32)
    }

    /// Number of anchor slots.
    pub fn anchor_count(&self) -> usize {
        self.anchors.pose_topics.len()
    }

    /// Initial simulation tick period. Zero for a rate `validate` rejects.
    pub fn simulation_period(&self) -> Duration {
        period_of(self.simulation.rate_hz).unwrap_or_default()
    }

    /// Render tick period. Zero for a rate `validate` rejects.
    pub fn render_period(&self) -> Duration {
        period_of(self.render.rate_hz).unwrap_or_default()
    }

    /// True when `other` differs only in the `active` / `reset` toggles,
    /// i.e. applying it needs no mesh or solver rebuild.
    pub fn same_model(&self, other: &FabricConfig) -> bool {
        self.simulation == other.simulation
            && self.fabric == other.fabric
            && self.render == other.render
            && self.anchors == other.anchors
    }
}

fn invalid(msg: &str) -> FabricError {
    FabricError::InvalidConfiguration(msg.to_string())
}

fn positive(label: &str, value: f64) -> FabricResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(FabricError::InvalidConfiguration(format!(
            "{label} must be positive and finite, got {value}"
        )));
    }
    Ok(())
}

fn period_of(rate_hz: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(1.0 / rate_hz).ok()
}

/// A rate must be positive and its reciprocal a representable period.
fn rate(label: &str, value: f64) -> FabricResult<()> {
    positive(label, value)?;
    if period_of(value).is_none() {
        return Err(FabricError::InvalidConfiguration(format!(
            "{label} {value} Hz has no representable period"
        )));
    }
    Ok(())
}
