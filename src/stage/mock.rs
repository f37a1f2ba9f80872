//! In-memory stage axis for dry runs and tests.

use tracing::debug;

use super::StageAxis;
use crate::config::{AxisLimits, Nanometers};
use crate::error::MotionError;

/// Stage axis that moves instantly and records every commanded target.
#[derive(Debug, Clone, Default)]
pub struct MockStage {
    position: Nanometers,
    limits: Option<AxisLimits>,
    moves: Vec<Nanometers>,
    fail_on_move: Option<usize>,
    homed: bool,
    stops: usize,
    closed: bool,
}

impl MockStage {
    /// Create a stage at `position` with unbounded travel.
    pub fn new(position: Nanometers) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Reject targets outside `limits`.
    pub fn with_limits(mut self, limits: AxisLimits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Fail the move with 0-based index `index` with a hardware fault.
    pub fn fail_on_move(mut self, index: usize) -> Self {
        self.fail_on_move = Some(index);
        self
    }

    /// Current position without going through the trait.
    pub fn position(&self) -> Nanometers {
        self.position
    }

    /// Every target commanded so far, including failed ones.
    pub fn moves(&self) -> &[Nanometers] {
        &self.moves
    }

    /// Whether `home` has been called.
    pub fn is_homed(&self) -> bool {
        self.homed
    }

    /// Number of `stop` calls.
    pub fn stop_count(&self) -> usize {
        self.stops
    }

    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl StageAxis for MockStage {
    fn get_position(&mut self) -> Result<Nanometers, MotionError> {
        Ok(self.position)
    }

    fn move_to(
        &mut self,
        target: Nanometers,
        _tolerance: Option<Nanometers>,
        _wait_for_settled: bool,
    ) -> Result<(), MotionError> {
        let index = self.moves.len();
        self.moves.push(target);

        if self.fail_on_move == Some(index) {
            return Err(MotionError::fault("mock stage fault"));
        }
        if let Some(limits) = &self.limits {
            limits.check(target)?;
        }

        debug!(target_nm = target.0, "mock stage move");
        self.position = target;
        Ok(())
    }

    fn move_by(&mut self, delta: Nanometers) -> Result<(), MotionError> {
        let target = self.position + delta;
        self.move_to(target, None, true)
    }

    fn home(&mut self) -> Result<(), MotionError> {
        self.homed = true;
        self.position = Nanometers(0);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), MotionError> {
        self.stops += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), MotionError> {
        self.closed = true;
        Ok(())
    }
}
