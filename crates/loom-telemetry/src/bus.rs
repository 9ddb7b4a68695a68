//! Event bus for simulator telemetry.
//!
//! Producers queue events on an mpsc channel while they hold the
//! simulation guard; [`EventBus::flush`] drains the queue into every
//! registered sink at the end of the critical section.

use std::sync::mpsc::{channel, Receiver, Sender};

use crate::events::{EventKind, SimulationEvent};
use crate::sinks::EventSink;

pub struct EventBus {
    tx: Sender<SimulationEvent>,
    rx: Receiver<SimulationEvent>,
    sinks: Vec<Box<dyn EventSink>>,
    enabled: bool,
    delivered: u64,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Self {
            tx,
            rx,
            sinks: Vec::new(),
            enabled: true,
            delivered: 0,
        }
    }

    /// Builder form of [`EventBus::add_sink`].
    pub fn with_sink(mut self, sink: Box<dyn EventSink>) -> Self {
        self.add_sink(sink);
        self
    }

    pub fn add_sink(&mut self, sink: Box<dyn EventSink>) {
        tracing::trace!(sink = sink.name(), "Telemetry sink registered");
        self.sinks.push(sink);
    }

    /// While disabled, `emit` drops events instead of queuing them.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Queues an event for the next flush.
    pub fn emit(&self, event: SimulationEvent) {
        if self.enabled {
            // Cannot fail: `rx` is owned by the same bus.
            let _ = self.tx.send(event);
        }
    }

    /// Shorthand for `emit(SimulationEvent::new(tick, kind))`.
    pub fn publish(&self, tick: u64, kind: EventKind) {
        self.emit(SimulationEvent::new(tick, kind));
    }

    /// Delivers every queued event to every sink, in emission order.
    ///
    /// Returns how many events were drained.
    pub fn flush(&mut self) -> usize {
        let queued: Vec<SimulationEvent> = self.rx.try_iter().collect();
        for event in &queued {
            self.sinks.iter_mut().for_each(|sink| sink.handle(event));
        }
        self.delivered += queued.len() as u64;
        queued.len()
    }

    /// Drains the queue, then lets each sink close its resources.
    pub fn finalize(&mut self) {
        self.flush();
        self.sinks.iter_mut().for_each(|sink| sink.finalize());
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Events drained by `flush` since the bus was created.
    pub fn delivered(&self) -> u64 {
        self.delivered
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
