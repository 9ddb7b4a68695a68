//! Error types for the loom simulator.
//!
//! All crates return `FabricResult<T>` from fallible operations.
//! A failed nearest-particle attachment is not an error; solvers
//! report it as `None`.

use thiserror::Error;

/// Unified error type for the loom simulator.
#[derive(Debug, Error)]
pub enum FabricError {
    /// Geometry, resolution, rate or count is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Mesh data is malformed or inconsistent.
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    /// The solver reached an invalid state (e.g. non-finite positions).
    #[error("Solver fault: {0}")]
    SolverFault(String),

    /// A particle id does not exist in the current solver.
    #[error("Unknown particle {id} (particle count: {count})")]
    UnknownParticle {
        id: u32,
        count: usize,
    },

    /// An anchor slot index is out of range.
    #[error("Unknown anchor slot {slot} (slot count: {count})")]
    UnknownAnchor {
        slot: usize,
        count: usize,
    },

    /// A thread panicked while holding the simulation guard.
    #[error("Simulation guard poisoned by a panicked holder")]
    GuardPoisoned,

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias for `Result<T, FabricError>`.
pub type FabricResult<T> = Result<T, FabricError>;
