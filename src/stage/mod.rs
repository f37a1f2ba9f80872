//! Stage axis interface.
//!
//! One [`StageAxis`] per physical axis. Concrete hardware adapters live
//! outside this crate; [`MockStage`] is an in-memory stand-in.

mod mock;

pub use mock::MockStage;

use crate::config::Nanometers;
use crate::error::MotionError;

/// A single positioning axis.
pub trait StageAxis {
    /// Current position.
    fn get_position(&mut self) -> Result<Nanometers, MotionError>;

    /// Move to an absolute position.
    ///
    /// With `wait_for_settled` the call blocks until the axis reports it is
    /// within `tolerance` of the target (adapter default when `None`).
    ///
    /// # Errors
    ///
    /// Fails on a hardware fault or an out-of-bounds target.
    fn move_to(
        &mut self,
        target: Nanometers,
        tolerance: Option<Nanometers>,
        wait_for_settled: bool,
    ) -> Result<(), MotionError>;

    /// Move relative to the current position.
    fn move_by(&mut self, delta: Nanometers) -> Result<(), MotionError>;

    /// Run the axis homing sequence.
    fn home(&mut self) -> Result<(), MotionError>;

    /// Stop any motion immediately.
    fn stop(&mut self) -> Result<(), MotionError>;

    /// Release the hardware connection.
    fn close(&mut self) -> Result<(), MotionError>;
}

impl<T: StageAxis + ?Sized> StageAxis for &mut T {
    fn get_position(&mut self) -> Result<Nanometers, MotionError> {
        (**self).get_position()
    }

    fn move_to(
        &mut self,
        target: Nanometers,
        tolerance: Option<Nanometers>,
        wait_for_settled: bool,
    ) -> Result<(), MotionError> {
        (**self).move_to(target, tolerance, wait_for_settled)
    }

    fn move_by(&mut self, delta: Nanometers) -> Result<(), MotionError> {
        (**self).move_by(delta)
    }

    fn home(&mut self) -> Result<(), MotionError> {
        (**self).home()
    }

    fn stop(&mut self) -> Result<(), MotionError> {
        (**self).stop()
    }

    fn close(&mut self) -> Result<(), MotionError> {
        (**self).close()
    }
}
