//! Shared simulation guard.

use std::sync::{Arc, Mutex, MutexGuard};

use loom_types::{FabricError, FabricResult};

/// Mutual-exclusion handle shared by every path that touches solver state.
///
/// Simulation ticks, render sampling, anchor poses and reconfiguration
/// each hold the guard for their whole critical section, so a render
/// sample never observes a partially advanced tick. Clones share one lock.
///
/// The lock is not reentrant: acquire it once per public entry point.
#[derive(Debug, Clone, Default)]
pub struct SimulationGuard {
    lock: Arc<Mutex<()>>,
}

impl SimulationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks until the guard is held.
    pub fn lock(&self) -> FabricResult<MutexGuard<'_, ()>> {
        self.lock.lock().map_err(|_| FabricError::GuardPoisoned)
    }

    /// True when both handles share the same lock.
    pub fn same_lock(&self, other: &SimulationGuard) -> bool {
        Arc::ptr_eq(&self.lock, &other.lock)
    }
}
