//! Cloth material configuration.
//!
//! Parameters that control the XPBD cloth: mass density, constraint
//! compliances, and how close an anchor must be to grab a particle.

use loom_types::{FabricError, FabricResult};
use serde::{Deserialize, Serialize};

/// Configuration for the XPBD cloth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClothParams {
    /// Areal density (kg/m²). Particle mass is a third of the area of
    /// each adjacent triangle times this density.
    pub density: f64,

    /// Compliance of the bending constraints (m/N). 0 = rigid.
    pub bending_compliance: f64,

    /// Compliance of the stretching constraints (m/N). 0 = inextensible.
    pub stretching_compliance: f64,

    /// Maximum distance (m) from an anchor to the particle it grabs.
    pub attach_radius: f64,

    /// Optional ground plane height along Z.
    pub ground_height: Option<f64>,
}

impl Default for ClothParams {
    fn default() -> Self {
        Self {
            density: 5.0,
            bending_compliance: 1.0,
            stretching_compliance: 0.0,
            attach_radius: 0.1,
            ground_height: Some(0.0),
        }
    }
}

impl ClothParams {
    /// Rejects negative compliances and non-positive density or radius.
    pub fn validate(&self) -> FabricResult<()> {
        if !self.density.is_finite() || self.density <= 0.0 {
            return Err(FabricError::InvalidConfiguration(format!(
                "Fabric density must be positive, got {}",
                self.density
            )));
        }
        for (label, value) in [
            ("bending compliance", self.bending_compliance),
            ("stretching compliance", self.stretching_compliance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(FabricError::InvalidConfiguration(format!(
                    "Fabric {label} must be non-negative, got {value}"
                )));
            }
        }
        if !self.attach_radius.is_finite() || self.attach_radius <= 0.0 {
            return Err(FabricError::InvalidConfiguration(format!(
                "Attach radius must be positive, got {}",
                self.attach_radius
            )));
        }
        if let Some(ground) = self.ground_height {
            if !ground.is_finite() {
                return Err(FabricError::InvalidConfiguration(
                    "Ground height must be finite".into(),
                ));
            }
        }
        Ok(())
    }
}
