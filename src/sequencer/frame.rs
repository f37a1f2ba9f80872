//! Layer-by-layer print execution.

use embedded_hal::delay::DelayNs;
use tracing::{debug, error, info, warn};

use super::{FrameState, PrintMonitor, PrintOutcome, PrintPlan, PrintReport, Recovery};
use crate::config::Nanometers;
use crate::error::{OutputError, Result};
use crate::output::{Channel, SignalOutput};
use crate::safety::{force_power_off, PrintToken, SafetyInterlock};
use crate::stage::StageAxis;

/// How the layer loop ended without an error.
enum Ending {
    Completed,
    Aborted,
}

#[derive(Debug, Default)]
struct Progress {
    restore_point: Option<Nanometers>,
    axis_commanded: bool,
    last_completed: Option<usize>,
    layers_cycled: usize,
}

/// Drives one print through `Init -> (MovingZ -> Streaming -> Settling)* -> terminal`.
///
/// Generic over:
/// - `Z`: axial stage axis
/// - `OUT`: three-channel analog output
/// - `DELAY`: delay provider for the settle dwell
///
/// Cancellation is cooperative: the flag is only evaluated at the end of
/// each layer's `Settling` step, so a layer in flight is never torn.
pub struct FrameSequencer<Z, OUT, DELAY>
where
    Z: StageAxis,
    OUT: SignalOutput,
    DELAY: DelayNs,
{
    stage: Z,
    output: OUT,
    delay: DELAY,
    interlock: SafetyInterlock,
    monitor: PrintMonitor,
    state: FrameState,
}

impl<Z, OUT, DELAY> FrameSequencer<Z, OUT, DELAY>
where
    Z: StageAxis,
    OUT: SignalOutput,
    DELAY: DelayNs,
{
    /// Create a sequencer over the axial stage and output.
    pub fn new(stage: Z, output: OUT, delay: DELAY, interlock: SafetyInterlock) -> Self {
        Self {
            stage,
            output,
            delay,
            interlock,
            monitor: PrintMonitor::new(),
            state: FrameState::Init,
        }
    }

    /// Interlock guarding this sequencer.
    pub fn interlock(&self) -> &SafetyInterlock {
        &self.interlock
    }

    /// Monitor for position, layer and state.
    pub fn monitor(&self) -> &PrintMonitor {
        &self.monitor
    }

    /// Current state.
    pub fn state(&self) -> FrameState {
        self.state
    }

    /// Axial stage.
    pub fn stage(&self) -> &Z {
        &self.stage
    }

    /// Axial stage (mutable).
    pub fn stage_mut(&mut self) -> &mut Z {
        &mut self.stage
    }

    /// Analog output.
    pub fn output(&self) -> &OUT {
        &self.output
    }

    /// Analog output (mutable).
    pub fn output_mut(&mut self) -> &mut OUT {
        &mut self.output
    }

    /// Release the hardware.
    pub fn into_parts(self) -> (Z, OUT, DELAY) {
        (self.stage, self.output, self.delay)
    }

    /// Run a print to its terminal outcome.
    ///
    /// Hardware faults, cancellation and late validation failures are all
    /// reported through the returned [`PrintReport`].
    ///
    /// # Errors
    ///
    /// Returns `SafetyError::ConcurrentPrint` if another print holds the
    /// interlock; nothing is moved or emitted in that case.
    pub fn run(&mut self, plan: &PrintPlan) -> Result<PrintReport> {
        let token = self.interlock.acquire()?;
        Ok(self.run_with_token(plan, token))
    }

    /// Run a print with a permit already taken from this sequencer's interlock.
    pub(crate) fn run_with_token(&mut self, plan: &PrintPlan, token: PrintToken) -> PrintReport {
        let job = token.job();
        self.state = FrameState::Init;
        self.monitor.set_state(FrameState::Init);
        self.monitor.set_layer(None);
        info!(job, layers = plan.layer_count(), "print started");

        let mut progress = Progress::default();
        let result = self.execute(plan, &mut progress);

        let return_on_complete = plan.config().axial.return_on_complete;
        let tolerance = plan.config().axial.tolerance;
        let (outcome, recovery) = match result {
            Ok(Ending::Completed) => {
                let recovery = self.recover(&progress, tolerance, return_on_complete);
                self.enter(FrameState::Complete);
                (
                    PrintOutcome::Completed {
                        last_layer: progress.last_completed.unwrap_or(0),
                    },
                    recovery,
                )
            }
            Ok(Ending::Aborted) => {
                self.enter(FrameState::Aborted);
                let recovery = self.recover(&progress, tolerance, true);
                (
                    PrintOutcome::Aborted {
                        last_completed: progress.last_completed,
                    },
                    recovery,
                )
            }
            Err(e) => {
                error!(job, error = %e, state = %self.state, "print failed");
                self.enter(FrameState::Error);
                let recovery = self.recover(&progress, tolerance, true);
                (
                    PrintOutcome::Failed {
                        last_completed: progress.last_completed,
                        error: e,
                    },
                    recovery,
                )
            }
        };

        self.interlock.release(token);
        info!(
            job,
            outcome = outcome.state().name(),
            last_completed = ?outcome.last_completed_layer(),
            "print finished"
        );

        PrintReport {
            outcome,
            restore_point: progress.restore_point,
            recovery,
            layers_cycled: progress.layers_cycled,
        }
    }

    fn execute(&mut self, plan: &PrintPlan, progress: &mut Progress) -> Result<Ending> {
        let restore_point = self.stage.get_position()?;
        progress.restore_point = Some(restore_point);
        self.monitor.set_position(restore_point);
        debug!(restore_nm = restore_point.0, "restore point captured");

        force_power_off(&mut self.output)?;
        self.output
            .configure(&plan.config().channels, plan.geometry().sample_rate_hz())?;
        plan.check_axial_targets(restore_point)?;

        let axial = &plan.config().axial;
        let compiler = plan.compiler();
        let last_layer = plan.layer_count().saturating_sub(1);

        for layer in 0..plan.layer_count() {
            self.monitor.set_layer(Some(layer));
            let buffer = compiler.compile(plan.volume().layer(layer))?;

            self.enter(FrameState::MovingZ);
            let target = axial.layer_target(restore_point, layer);
            info!(
                layer,
                target_nm = target.0,
                samples = buffer.len(),
                stream_ms = buffer.duration().as_secs_f64() * 1e3,
                "layer start"
            );
            progress.axis_commanded = true;
            self.stage.move_to(target, axial.tolerance, true)?;
            self.monitor.set_position(self.stage.get_position()?);

            self.enter(FrameState::Streaming);
            if buffer.is_empty() {
                debug!(layer, "no lit rows, streaming skipped");
            } else {
                match self.output.write(&buffer) {
                    Ok(()) => {}
                    Err(OutputError::Interrupted { emitted })
                        if self.interlock.is_cancel_requested() =>
                    {
                        warn!(layer, emitted, "streaming interrupted by cancellation");
                        return Ok(Ending::Aborted);
                    }
                    Err(e) => return Err(e.into()),
                }
            }

            self.enter(FrameState::Settling);
            if axial.settle_us > 0 {
                self.delay.delay_us(axial.settle_us);
            }
            progress.last_completed = Some(layer);
            progress.layers_cycled += 1;
            debug!(layer, "layer complete");

            // Cancellation checkpoint
            match FrameState::after_settling(self.interlock.is_cancel_requested(), layer == last_layer)
            {
                FrameState::Aborted => {
                    info!(layer, "cancellation honored at checkpoint");
                    return Ok(Ending::Aborted);
                }
                FrameState::Complete => return Ok(Ending::Completed),
                _ => {}
            }
        }

        Ok(Ending::Completed)
    }

    /// Zero power, park the scan axes, then return to the restore point if
    /// the axis was moved.
    ///
    /// Each step is attempted even if the one before it failed.
    fn recover(
        &mut self,
        progress: &Progress,
        tolerance: Option<Nanometers>,
        return_to_restore: bool,
    ) -> Recovery {
        let mut recovery = Recovery::default();

        match force_power_off(&mut self.output) {
            Ok(()) => recovery.power_zeroed = true,
            Err(e) => error!(error = %e, "failed to force power off"),
        }

        recovery.scan_parked = true;
        for channel in [Channel::FastAxis, Channel::SlowAxis] {
            if let Err(e) = self.output.set_channel_level(channel, 0.0) {
                warn!(?channel, error = %e, "failed to park scan axis");
                recovery.scan_parked = false;
            }
        }

        if !return_to_restore || !progress.axis_commanded {
            return recovery;
        }
        let Some(restore_point) = progress.restore_point else {
            warn!("no restore point captured, axial return skipped");
            return recovery;
        };

        match self.stage.move_to(restore_point, tolerance, true) {
            Ok(()) => {
                recovery.returned_to_restore_point = true;
                self.monitor.set_position(restore_point);
                info!(restore_nm = restore_point.0, "returned to restore point");
            }
            Err(e) => error!(error = %e, "failed to return to restore point"),
        }

        recovery
    }

    fn enter(&mut self, next: FrameState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {} -> {}",
            self.state,
            next
        );
        debug!(from = %self.state, to = %next, "state transition");
        self.state = next;
        self.monitor.set_state(next);
    }
}

impl<Z, OUT, DELAY> core::fmt::Debug for FrameSequencer<Z, OUT, DELAY>
where
    Z: StageAxis,
    OUT: SignalOutput,
    DELAY: DelayNs,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FrameSequencer")
            .field("state", &self.state)
            .field("monitor", &self.monitor)
            .finish_non_exhaustive()
    }
}
