//! Manual jog and laser control, locked out while a print runs.

use tracing::debug;

use super::SafetyInterlock;
use crate::config::{AxisLimits, Nanometers};
use crate::error::Result;
use crate::output::{Channel, SignalOutput};
use crate::stage::StageAxis;

/// Gate for non-print motion and power requests.
///
/// Every request except [`stop`](Self::stop) is rejected with
/// `SafetyError::ManualControlLocked` while the interlock is held. An
/// accepted request keeps prints from acquiring the interlock until its
/// hardware call returns.
#[derive(Debug)]
pub struct ManualControl<Z, OUT> {
    interlock: SafetyInterlock,
    stage: Z,
    output: OUT,
    limits: Option<AxisLimits>,
}

impl<Z, OUT> ManualControl<Z, OUT>
where
    Z: StageAxis,
    OUT: SignalOutput,
{
    /// Create a gate over one stage axis and the output.
    pub fn new(interlock: SafetyInterlock, stage: Z, output: OUT) -> Self {
        Self {
            interlock,
            stage,
            output,
            limits: None,
        }
    }

    /// Reject jog targets outside `limits`.
    pub fn with_limits(mut self, limits: AxisLimits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// True while a print holds the interlock.
    pub fn is_locked(&self) -> bool {
        self.interlock.is_held()
    }

    /// Jog to an absolute position.
    pub fn move_to(&mut self, target: Nanometers) -> Result<()> {
        let _access = self.interlock.manual_access("move_to")?;
        if let Some(limits) = &self.limits {
            limits.check(target)?;
        }
        debug!(target_nm = target.0, "manual move");
        self.stage.move_to(target, None, false)?;
        Ok(())
    }

    /// Jog relative to the current position.
    pub fn move_by(&mut self, delta: Nanometers) -> Result<()> {
        let _access = self.interlock.manual_access("move_by")?;
        let target = self.stage.get_position()? + delta;
        if let Some(limits) = &self.limits {
            limits.check(target)?;
        }
        debug!(delta_nm = delta.0, "manual jog");
        self.stage.move_by(delta)?;
        Ok(())
    }

    /// Home the axis.
    pub fn home(&mut self) -> Result<()> {
        let _access = self.interlock.manual_access("home")?;
        self.stage.home()?;
        Ok(())
    }

    /// Stop the axis. Always allowed.
    pub fn stop(&mut self) -> Result<()> {
        self.stage.stop()?;
        Ok(())
    }

    /// Set the power channel drive level directly.
    pub fn set_laser(&mut self, level: f64) -> Result<()> {
        let _access = self.interlock.manual_access("set_laser")?;
        self.output.set_channel_level(Channel::Power, level)?;
        Ok(())
    }

    /// Current stage position.
    pub fn position(&mut self) -> Result<Nanometers> {
        Ok(self.stage.get_position()?)
    }

    /// Release the wrapped stage and output.
    pub fn into_inner(self) -> (Z, OUT) {
        (self.stage, self.output)
    }
}
