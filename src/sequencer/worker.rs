//! Dedicated print worker thread.

use std::thread::{self, JoinHandle};

use embedded_hal::delay::DelayNs;
use tracing::info;

use super::{FrameSequencer, PrintMonitor, PrintPlan, PrintReport};
use crate::error::{message, Result, SafetyError};
use crate::output::SignalOutput;
use crate::safety::{CancelToken, SafetyInterlock};
use crate::stage::StageAxis;

const WORKER_NAME: &str = "print-worker";

/// Runs prints off the caller's thread.
pub struct PrintWorker;

impl PrintWorker {
    /// Start `plan` on a new worker thread.
    ///
    /// The interlock is taken on the calling thread, so a second start while
    /// this print runs fails immediately.
    ///
    /// # Errors
    ///
    /// Returns `SafetyError::ConcurrentPrint` if a print is already running,
    /// or `SafetyError::WorkerUnavailable` if the thread cannot be spawned.
    pub fn start<Z, OUT, DELAY>(
        mut sequencer: FrameSequencer<Z, OUT, DELAY>,
        plan: PrintPlan,
    ) -> Result<PrintHandle<Z, OUT, DELAY>>
    where
        Z: StageAxis + Send + 'static,
        OUT: SignalOutput + Send + 'static,
        DELAY: DelayNs + Send + 'static,
    {
        let token = sequencer.interlock().acquire()?;
        let interlock = sequencer.interlock().clone();
        let monitor = sequencer.monitor().clone();

        let thread = thread::Builder::new()
            .name(WORKER_NAME.into())
            .spawn(move || {
                let report = sequencer.run_with_token(&plan, token);
                (report, sequencer)
            })
            .map_err(|e| SafetyError::WorkerUnavailable(message(&e.to_string())))?;

        info!(worker = WORKER_NAME, "print worker started");
        Ok(PrintHandle {
            thread,
            interlock,
            monitor,
        })
    }
}

/// Handle to a print running on a worker thread.
pub struct PrintHandle<Z, OUT, DELAY>
where
    Z: StageAxis,
    OUT: SignalOutput,
    DELAY: DelayNs,
{
    thread: JoinHandle<(PrintReport, FrameSequencer<Z, OUT, DELAY>)>,
    interlock: SafetyInterlock,
    monitor: PrintMonitor,
}

impl<Z, OUT, DELAY> PrintHandle<Z, OUT, DELAY>
where
    Z: StageAxis,
    OUT: SignalOutput,
    DELAY: DelayNs,
{
    /// Request a stop at the next layer checkpoint.
    pub fn cancel(&self) {
        self.interlock.request_cancel();
    }

    /// Stop signal that can be handed to other threads.
    pub fn cancel_token(&self) -> CancelToken {
        self.interlock.cancel_token()
    }

    /// Live position, layer and state of the print.
    pub fn monitor(&self) -> &PrintMonitor {
        &self.monitor
    }

    /// Whether the worker has finished.
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Wait for the print and take the hardware back.
    ///
    /// # Errors
    ///
    /// Returns `SafetyError::WorkerUnavailable` if the worker panicked.
    pub fn join(self) -> Result<(PrintReport, FrameSequencer<Z, OUT, DELAY>)> {
        self.thread
            .join()
            .map_err(|_| SafetyError::WorkerUnavailable(message("print worker panicked")).into())
    }
}

impl<Z, OUT, DELAY> core::fmt::Debug for PrintHandle<Z, OUT, DELAY>
where
    Z: StageAxis,
    OUT: SignalOutput,
    DELAY: DelayNs,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PrintHandle")
            .field("state", &self.monitor.state())
            .field("layer", &self.monitor.layer())
            .field("finished", &self.is_finished())
            .finish()
    }
}
