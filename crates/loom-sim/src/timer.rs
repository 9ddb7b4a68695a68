//! Periodic callback thread.

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use loom_types::FabricResult;

/// Runs a callback on its own thread at a period that is re-read before
/// every cycle, so a changed period applies from the next invocation.
///
/// The first invocation happens one period after start. A callback that
/// overruns its period is followed immediately by the next one, without
/// catch-up bursts. Returning [`ControlFlow::Break`] ends the timer.
pub struct PeriodicTimer {
    name: String,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl PeriodicTimer {
    pub fn start<P, F>(name: &str, mut period: P, mut callback: F) -> FabricResult<Self>
    where
        P: FnMut() -> Duration + Send + 'static,
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                let mut deadline = Instant::now();
                loop {
                    deadline += period();
                    let now = Instant::now();
                    if deadline < now {
                        deadline = now;
                    }
                    if !sleep_until(deadline, &flag) {
                        break;
                    }
                    if callback().is_break() {
                        break;
                    }
                }
                flag.store(true, Ordering::Release);
            })?;

        tracing::debug!(timer = name, "Timer started");
        Ok(Self {
            name: name.to_string(),
            stop,
            handle: Some(handle),
        })
    }

    /// Signals the thread and waits for it to exit. Idempotent.
    pub fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        self.stop.store(true, Ordering::Release);
        handle.thread().unpark();
        if handle.join().is_err() {
            tracing::error!(timer = %self.name, "Timer thread panicked");
        }
        tracing::debug!(timer = %self.name, "Timer stopped");
    }

    /// True until stopped or until the callback breaks.
    pub fn is_running(&self) -> bool {
        self.handle.is_some() && !self.stop.load(Ordering::Acquire)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for PeriodicTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Parks until `deadline`. Returns false if stopped first.
fn sleep_until(deadline: Instant, stop: &AtomicBool) -> bool {
    loop {
        if stop.load(Ordering::Acquire) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::park_timeout(deadline - now);
    }
}
