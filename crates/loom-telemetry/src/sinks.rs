//! Event sinks: in-memory collectors and a `tracing` forwarder.

use std::sync::{Arc, Mutex};

use crate::events::{EventKind, SimulationEvent};

/// Consumer of simulator events. Called from `EventBus::flush`.
pub trait EventSink: Send {
    fn handle(&mut self, event: &SimulationEvent);

    /// Called once when the simulator shuts down.
    fn finalize(&mut self) {}

    fn name(&self) -> &str;
}

/// Keeps every event in a public `Vec`.
#[derive(Debug, Default)]
pub struct VecSink {
    pub events: Vec<SimulationEvent>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for VecSink {
    fn handle(&mut self, event: &SimulationEvent) {
        self.events.push(event.clone());
    }

    fn name(&self) -> &str {
        "vec_sink"
    }
}

/// A collecting sink whose events stay readable after the sink is
/// boxed into a bus.
#[derive(Clone, Default)]
pub struct SharedVecSink {
    events: Arc<Mutex<Vec<SimulationEvent>>>,
}

impl SharedVecSink {
    /// Creates an empty shared sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events received so far.
    pub fn events(&self) -> Vec<SimulationEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl EventSink for SharedVecSink {
    fn handle(&mut self, event: &SimulationEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }

    fn name(&self) -> &str {
        "shared_vec_sink"
    }
}

/// Forwards events to `tracing`.
///
/// Rebuilds are always logged at info; everything else uses the
/// configured level.
pub struct TracingSink {
    level: tracing::Level,
}

impl TracingSink {
    pub fn new(level: tracing::Level) -> Self {
        Self { level }
    }

    fn routine(&self, event: &SimulationEvent) {
        if self.level == tracing::Level::TRACE {
            tracing::trace!(tick = event.tick, event = ?event.kind, "simulation event");
        } else if self.level == tracing::Level::DEBUG {
            tracing::debug!(tick = event.tick, event = ?event.kind, "simulation event");
        } else {
            tracing::info!(tick = event.tick, event = ?event.kind, "simulation event");
        }
    }
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::new(tracing::Level::DEBUG)
    }
}

impl EventSink for TracingSink {
    fn handle(&mut self, event: &SimulationEvent) {
        match event.kind {
            EventKind::Reconfigured { particles, triangles } => {
                tracing::info!(particles, triangles, "fabric rebuilt");
            }
            _ => self.routine(event),
        }
    }

    fn name(&self) -> &str {
        "tracing_sink"
    }
}
