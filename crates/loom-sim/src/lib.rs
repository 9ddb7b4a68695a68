//! # loom-sim
//!
//! Real-time orchestration of an anchored fabric.
//!
//! ## Key Types
//!
//! - [`FabricConfig`]: Validated configuration, loaded from TOML.
//! - [`FabricSimulator`]: Mesh, solver and session behind one guard.
//! - [`Scheduler`]: Fixed sub-stepping plus one-shot rate calibration.
//! - [`AttachmentManager`]: Anchor slots lazily bound to particles.
//! - [`RenderSampler`]: Copies geometry into point and wireframe markers.
//! - [`FabricNode`]: Timers and pose queues around a simulator.

pub mod attachment;
pub mod config;
pub mod guard;
pub mod node;
pub mod sampler;
pub mod scheduler;
pub mod simulator;
pub mod timer;

pub use attachment::{AttachmentManager, AttachmentState, PoseOutcome};
pub use config::FabricConfig;
pub use guard::SimulationGuard;
pub use node::FabricNode;
pub use sampler::RenderSampler;
pub use scheduler::{Calibration, Scheduler, TickReport};
pub use simulator::{FabricSimulator, SessionSnapshot};
pub use timer::PeriodicTimer;
