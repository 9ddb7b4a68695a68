//! The fabric simulator: one mesh, one solver, one session.
//!
//! Every public method that reads or writes solver state takes the
//! [`SimulationGuard`] first and the session lock second, and holds both
//! for its whole critical section. No method calls another public method
//! while holding them.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use glam::Vec3;
use loom_mesh::{generators, FabricMesh};
use loom_render::{SurfaceFrame, VisualizationSink};
use loom_solver::{PbdSolver, SolverFactory};
use loom_telemetry::{EventBus, EventKind, EventSink, TracingSink};
use loom_types::{AnchorSlot, FabricError, FabricResult};

use crate::attachment::{AttachmentManager, AttachmentState, PoseOutcome};
use crate::config::FabricConfig;
use crate::guard::SimulationGuard;
use crate::sampler::RenderSampler;
use crate::scheduler::{Scheduler, TickReport};

/// Read-only view of the scheduling and attachment bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub step_dt: f64,
    pub sub_steps: u32,
    pub steps: u32,
    pub auto_rate_locked: bool,
    pub frame_count: u32,
    pub time_sum: f64,
    pub ticks: u64,
    pub tick_period: Duration,
    pub slots: Vec<AttachmentState>,
}

struct Session {
    config: FabricConfig,
    mesh: FabricMesh,
    solver: Box<dyn PbdSolver>,
    scheduler: Scheduler,
    anchors: AttachmentManager,
    sampler: RenderSampler,
}

struct Inner {
    session: Session,
    telemetry: EventBus,
}

/// Anchored fabric simulator.
///
/// Shared across the simulation timer, the render timer and the pose
/// workers behind an `Arc`; all methods take `&self`.
pub struct FabricSimulator {
    guard: SimulationGuard,
    factory: Box<dyn SolverFactory>,
    inner: Mutex<Inner>,
}

impl FabricSimulator {
    /// Builds the mesh and solver for `config` and starts a session.
    pub fn new(
        config: FabricConfig,
        guard: SimulationGuard,
        factory: impl SolverFactory + 'static,
    ) -> FabricResult<Self> {
        config.validate()?;
        let factory: Box<dyn SolverFactory> = Box::new(factory);
        let session = build_session(factory.as_ref(), config)?;

        let telemetry = EventBus::new().with_sink(Box::new(TracingSink::default()));

        tracing::info!(
            particles = session.mesh.vertex_count(),
            triangles = session.mesh.triangle_count(),
            solver = session.solver.name(),
            "Fabric simulator ready"
        );

        Ok(Self {
            guard,
            factory,
            inner: Mutex::new(Inner { session, telemetry }),
        })
    }

    /// Rebuilds mesh and solver from `config` and starts a fresh session.
    ///
    /// The new mesh and solver are built before the guard is taken and
    /// swapped in as one unit; on error the running session is untouched.
    /// Anchor slots come back unattached and calibration starts over.
    pub fn reconfigure(&self, config: FabricConfig) -> FabricResult<()> {
        config.validate()?;
        let session = build_session(self.factory.as_ref(), config)?;
        let particles = session.mesh.vertex_count();
        let triangles = session.mesh.triangle_count();

        let (_guard, mut inner) = self.enter()?;
        inner.session = session;
        inner
            .telemetry
            .publish(0, EventKind::Reconfigured { particles, triangles });
        inner.telemetry.flush();
        Ok(())
    }

    /// Runs one scheduler tick under the guard.
    ///
    /// Solver errors propagate; the tick's duration is then not recorded.
    pub fn simulate_tick(&self) -> FabricResult<TickReport> {
        let (_guard, mut inner) = self.enter()?;
        let Inner { session, telemetry } = &mut *inner;

        let report = session.scheduler.tick(session.solver.as_mut())?;
        telemetry.publish(
            report.tick,
            EventKind::TickCompleted {
                wall_time: report.wall_time,
                sub_steps: report.sub_steps,
            },
        );
        if let Some(c) = report.calibration {
            telemetry.publish(
                report.tick,
                EventKind::RateCalibrated {
                    mean_tick: c.mean_tick,
                    applied: c.applied,
                },
            );
        }
        telemetry.flush();
        Ok(report)
    }

    /// Copies the current geometry into a frame under the guard.
    pub fn render_sample(&self) -> FabricResult<SurfaceFrame> {
        let (_guard, mut inner) = self.enter()?;
        let session = &mut inner.session;
        Ok(session.sampler.sample(session.solver.as_ref()))
    }

    /// Samples under the guard, then publishes after releasing it.
    pub fn render_tick(&self, sink: &mut dyn VisualizationSink) -> FabricResult<u64> {
        let frame = self.render_sample()?;
        sink.publish(&frame)?;
        Ok(frame.sequence)
    }

    /// Applies one anchor pose to its slot under the guard.
    pub fn on_anchor_pose(&self, slot: AnchorSlot, pose: Vec3) -> FabricResult<PoseOutcome> {
        let (_guard, mut inner) = self.enter()?;
        let Inner { session, telemetry } = &mut *inner;

        let outcome = session
            .anchors
            .on_pose(slot, pose, session.solver.as_mut())?;
        if let PoseOutcome::Attached(id) = outcome {
            telemetry.publish(
                session.scheduler.ticks(),
                EventKind::AnchorAttached {
                    slot: slot.index(),
                    particle: id.0,
                },
            );
            telemetry.flush();
        }
        Ok(outcome)
    }

    /// Clears calibration and attachment bookkeeping.
    ///
    /// Particle positions, velocities and pins are left as they are;
    /// `step_dt` keeps its current value.
    pub fn reset(&self) -> FabricResult<()> {
        let (_guard, mut inner) = self.enter()?;
        let Inner { session, telemetry } = &mut *inner;
        session.scheduler.reset();
        session.anchors.reset();
        telemetry.publish(0, EventKind::SessionReset);
        telemetry.flush();
        tracing::info!("Simulation session reset");
        Ok(())
    }

    pub fn session(&self) -> FabricResult<SessionSnapshot> {
        let (_guard, inner) = self.enter()?;
        let s = &inner.session;
        Ok(SessionSnapshot {
            step_dt: s.scheduler.step_dt(),
            sub_steps: s.scheduler.sub_steps(),
            steps: s.scheduler.steps(),
            auto_rate_locked: s.scheduler.is_locked(),
            frame_count: s.scheduler.frame_count(),
            time_sum: s.scheduler.time_sum(),
            ticks: s.scheduler.ticks(),
            tick_period: s.scheduler.tick_period(),
            slots: s.anchors.states().to_vec(),
        })
    }

    /// Current simulation tick period; changes once auto-rate locks.
    pub fn simulation_period(&self) -> FabricResult<Duration> {
        let (_guard, inner) = self.enter()?;
        Ok(inner.session.scheduler.tick_period())
    }

    pub fn render_period(&self) -> FabricResult<Duration> {
        let (_guard, inner) = self.enter()?;
        Ok(inner.session.config.render_period())
    }

    /// The configuration of the running session.
    pub fn config(&self) -> FabricResult<FabricConfig> {
        let (_guard, inner) = self.enter()?;
        Ok(inner.session.config.clone())
    }

    pub fn mesh(&self) -> FabricResult<FabricMesh> {
        let (_guard, inner) = self.enter()?;
        Ok(inner.session.mesh.clone())
    }

    /// Copy of the current particle positions.
    pub fn positions(&self) -> FabricResult<Vec<Vec3>> {
        let (_guard, inner) = self.enter()?;
        Ok(inner.session.solver.positions().to_vec())
    }

    /// Runs `f` against the solver under the guard.
    pub fn with_solver<R>(&self, f: impl FnOnce(&dyn PbdSolver) -> R) -> FabricResult<R> {
        let (_guard, inner) = self.enter()?;
        Ok(f(inner.session.solver.as_ref()))
    }

    /// Registers an additional telemetry sink.
    pub fn add_event_sink(&self, sink: Box<dyn EventSink>) -> FabricResult<()> {
        let (_guard, mut inner) = self.enter()?;
        inner.telemetry.add_sink(sink);
        Ok(())
    }

    /// Flushes and finalizes every telemetry sink.
    pub fn finalize_telemetry(&self) -> FabricResult<()> {
        let (_guard, mut inner) = self.enter()?;
        inner.telemetry.finalize();
        Ok(())
    }

    /// The guard this simulator serializes on.
    pub fn guard(&self) -> &SimulationGuard {
        &self.guard
    }

    fn enter(&self) -> FabricResult<(MutexGuard<'_, ()>, MutexGuard<'_, Inner>)> {
        let guard = self.guard.lock()?;
        let inner = self.inner.lock().map_err(|_| FabricError::GuardPoisoned)?;
        Ok((guard, inner))
    }
}

fn build_session(factory: &dyn SolverFactory, config: FabricConfig) -> FabricResult<Session> {
    let fabric = &config.fabric;
    let mesh = generators::rectangular(
        &fabric.name,
        fabric.width,
        fabric.height,
        fabric.initial_height,
        fabric.resolution,
    )?;
    let solver = factory.build(&mesh, &config.cloth_params())?;
    if solver.positions().len() != mesh.vertex_count() {
        return Err(FabricError::SolverFault(format!(
            "Solver '{}' exposes {} particles for a {}-vertex mesh",
            solver.name(),
            solver.positions().len(),
            mesh.vertex_count()
        )));
    }
    let count = mesh.vertex_count();
    if let Some(edge) = solver.edges().iter().find(|e| e.iter().any(|&v| v as usize >= count)) {
        return Err(FabricError::SolverFault(format!(
            "Solver '{}' edge {:?} references a particle beyond {count}",
            solver.name(),
            edge
        )));
    }

    Ok(Session {
        scheduler: Scheduler::from_config(&config),
        anchors: AttachmentManager::new(config.anchor_count(), config.anchors.z_offset),
        sampler: RenderSampler::new(&config.render.frame_id),
        mesh,
        solver,
        config,
    })
}
