//! Runtime host: timers, pose inputs and the active/reset toggles.

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use glam::Vec3;
use loom_render::VisualizationSink;
use loom_solver::SolverFactory;
use loom_types::{AnchorSlot, FabricError, FabricResult};

use crate::config::FabricConfig;
use crate::guard::SimulationGuard;
use crate::simulator::FabricSimulator;
use crate::timer::PeriodicTimer;

/// How often an idle pose worker checks its stop flag.
const POSE_POLL: Duration = Duration::from_millis(20);

type SharedSink = Arc<Mutex<Box<dyn VisualizationSink>>>;
type FaultSlot = Arc<Mutex<Option<String>>>;

/// Queue feeding one anchor slot, drained by its own worker thread.
struct PoseInput {
    sender: mpsc::Sender<Vec3>,
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl PoseInput {
    fn spawn(simulator: Arc<FabricSimulator>, slot: AnchorSlot) -> FabricResult<Self> {
        let (sender, receiver) = mpsc::channel::<Vec3>();
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let worker = thread::Builder::new()
            .name(format!("loom-{slot}"))
            .spawn(move || {
                while !flag.load(Ordering::Acquire) {
                    match receiver.recv_timeout(POSE_POLL) {
                        Ok(pose) => {
                            if let Err(e) = simulator.on_anchor_pose(slot, pose) {
                                tracing::warn!(%slot, error = %e, "Anchor pose rejected");
                            }
                        }
                        Err(RecvTimeoutError::Timeout) => {}
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            })?;
        Ok(Self {
            sender,
            stop,
            worker: Some(worker),
        })
    }

    fn stop(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("Pose worker panicked");
            }
        }
    }
}

/// Hosts a [`FabricSimulator`] the way a long-running node does.
///
/// While active, a simulation timer ticks the simulator at its current
/// period, a render timer samples it and publishes to the sink, and each
/// anchor slot has a pose queue. Deactivating stops and joins all of them.
pub struct FabricNode {
    simulator: Arc<FabricSimulator>,
    sink: SharedSink,
    active: bool,
    timers: Vec<PeriodicTimer>,
    pose_inputs: Vec<PoseInput>,
    fault: FaultSlot,
}

impl FabricNode {
    /// Wraps an existing simulator. The node starts inactive.
    pub fn new(simulator: Arc<FabricSimulator>, sink: Box<dyn VisualizationSink>) -> Self {
        Self {
            simulator,
            sink: Arc::new(Mutex::new(sink)),
            active: false,
            timers: Vec::new(),
            pose_inputs: Vec::new(),
            fault: Arc::new(Mutex::new(None)),
        }
    }

    /// Builds a simulator for `config` and applies its toggles.
    pub fn launch(
        config: FabricConfig,
        factory: impl SolverFactory + 'static,
        sink: Box<dyn VisualizationSink>,
    ) -> FabricResult<Self> {
        let simulator = FabricSimulator::new(config.clone(), SimulationGuard::new(), factory)?;
        let mut node = Self::new(Arc::new(simulator), sink);
        node.apply(config)?;
        Ok(node)
    }

    /// Applies a configuration update.
    ///
    /// Model changes rebuild mesh and solver; `active` starts or stops
    /// the pipeline on a transition only; `reset` clears the session once
    /// and is not retained. Returns the config as retained.
    pub fn apply(&mut self, mut config: FabricConfig) -> FabricResult<FabricConfig> {
        config.validate()?;
        let reset = std::mem::take(&mut config.reset);

        let current = self.simulator.config()?;
        if !current.same_model(&config) {
            self.simulator.reconfigure(config.clone())?;
            if self.active && current.anchor_count() != config.anchor_count() {
                self.stop_pose_inputs();
                self.start_pose_inputs(config.anchor_count())?;
            }
        }

        match (self.active, config.active) {
            (false, true) => self.activate(config.anchor_count())?,
            (true, false) => self.deactivate(),
            _ => {}
        }

        if reset {
            self.simulator.reset()?;
        }
        Ok(config)
    }

    /// Queue for poses of `slot`, while active.
    pub fn pose_sender(&self, slot: AnchorSlot) -> Option<mpsc::Sender<Vec3>> {
        self.pose_inputs
            .get(slot.index())
            .map(|input| input.sender.clone())
    }

    /// Enqueues one pose for `slot`.
    pub fn push_pose(&self, slot: AnchorSlot, pose: Vec3) -> FabricResult<()> {
        let input = self
            .pose_inputs
            .get(slot.index())
            .ok_or(FabricError::UnknownAnchor {
                slot: slot.index(),
                count: self.pose_inputs.len(),
            })?;
        input
            .sender
            .send(pose)
            .map_err(|_| FabricError::SolverFault(format!("{slot} pose worker has exited")))
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Error that stopped a timer, if any.
    pub fn fault(&self) -> Option<String> {
        self.fault.lock().ok().and_then(|f| f.clone())
    }

    pub fn simulator(&self) -> &Arc<FabricSimulator> {
        &self.simulator
    }

    /// Number of running timers plus pose workers.
    pub fn worker_count(&self) -> usize {
        self.timers.iter().filter(|t| t.is_running()).count() + self.pose_inputs.len()
    }

    /// Deactivates, then finalizes the sink and telemetry.
    pub fn shutdown(&mut self) -> FabricResult<()> {
        self.deactivate();
        {
            let mut sink = self.sink.lock().map_err(|_| FabricError::GuardPoisoned)?;
            tracing::info!(sink = sink.name(), frames = sink.frame_count(), "Closing sink");
            sink.finalize()?;
        }
        self.simulator.finalize_telemetry()
    }

    fn activate(&mut self, anchors: usize) -> FabricResult<()> {
        if let Ok(mut fault) = self.fault.lock() {
            *fault = None;
        }
        let started = self
            .start_timers()
            .and_then(|_| self.start_pose_inputs(anchors));
        if let Err(e) = started {
            self.stop_all();
            return Err(e);
        }
        self.active = true;
        tracing::info!(anchors, "Fabric node activated");
        Ok(())
    }

    fn deactivate(&mut self) {
        if !self.active {
            return;
        }
        self.stop_all();
        self.active = false;
        tracing::info!("Fabric node deactivated");
    }

    fn stop_all(&mut self) {
        for timer in &mut self.timers {
            timer.stop();
        }
        self.timers.clear();
        self.stop_pose_inputs();
    }

    fn start_timers(&mut self) -> FabricResult<()> {
        let fallback = self.simulator.simulation_period()?;
        let period_sim = Arc::clone(&self.simulator);
        let tick_sim = Arc::clone(&self.simulator);
        let fault = Arc::clone(&self.fault);
        let simulate = PeriodicTimer::start(
            "loom-simulate",
            move || period_sim.simulation_period().unwrap_or(fallback),
            move || match tick_sim.simulate_tick() {
                Ok(_) => ControlFlow::Continue(()),
                Err(e) => {
                    tracing::error!(error = %e, "Simulation tick failed; stopping timer");
                    record_fault(&fault, &e);
                    ControlFlow::Break(())
                }
            },
        )?;
        self.timers.push(simulate);

        // Both periods are re-read every cycle so a reconfigure applies live.
        let render_fallback = self.simulator.render_period()?;
        let period_sim = Arc::clone(&self.simulator);
        let render_sim = Arc::clone(&self.simulator);
        let sink = Arc::clone(&self.sink);
        let fault = Arc::clone(&self.fault);
        let render = PeriodicTimer::start(
            "loom-render",
            move || period_sim.render_period().unwrap_or(render_fallback),
            move || {
                let frame = match render_sim.render_sample() {
                    Ok(frame) => frame,
                    Err(e) => {
                        tracing::error!(error = %e, "Render sample failed; stopping render timer");
                        record_fault(&fault, &e);
                        return ControlFlow::Break(());
                    }
                };
                let Ok(mut sink) = sink.lock() else {
                    record_fault(&fault, &FabricError::GuardPoisoned);
                    return ControlFlow::Break(());
                };
                if let Err(e) = sink.publish(&frame) {
                    tracing::warn!(sink = sink.name(), error = %e, "Frame publish failed");
                }
                ControlFlow::Continue(())
            },
        )?;
        self.timers.push(render);
        Ok(())
    }

    fn start_pose_inputs(&mut self, anchors: usize) -> FabricResult<()> {
        for slot in 0..anchors {
            let input = PoseInput::spawn(Arc::clone(&self.simulator), AnchorSlot(slot))?;
            self.pose_inputs.push(input);
        }
        Ok(())
    }

    fn stop_pose_inputs(&mut self) {
        for input in &mut self.pose_inputs {
            input.stop();
        }
        self.pose_inputs.clear();
    }
}

impl Drop for FabricNode {
    fn drop(&mut self) {
        self.stop_all();
    }
}

fn record_fault(slot: &FaultSlot, error: &FabricError) {
    if let Ok(mut fault) = slot.lock() {
        fault.get_or_insert_with(|| error.to_string());
    }
}
