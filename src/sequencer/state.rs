//! Frame sequencer states and terminal outcomes.

use crate::config::Nanometers;
use crate::error::Error;

/// Sequencer states.
///
/// `Init -> MovingZ -> Streaming -> Settling -> (MovingZ | Complete | Aborted)`,
/// with `Error` reachable from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameState {
    /// Not running, or capturing the restore point and forcing power off
    #[default]
    Init,
    /// Moving the axial actuator to the current layer
    MovingZ,
    /// Streaming the current layer's waveform
    Streaming,
    /// Post-layer dwell, then the cancellation checkpoint
    Settling,
    /// Every layer printed
    Complete,
    /// Stopped at a checkpoint by request
    Aborted,
    /// Stopped by a hardware or validation failure
    Error,
}

impl FrameState {
    /// Lowercase state name for logs.
    pub const fn name(self) -> &'static str {
        match self {
            FrameState::Init => "init",
            FrameState::MovingZ => "moving_z",
            FrameState::Streaming => "streaming",
            FrameState::Settling => "settling",
            FrameState::Complete => "complete",
            FrameState::Aborted => "aborted",
            FrameState::Error => "error",
        }
    }

    /// Check if this is a terminal state.
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            FrameState::Complete | FrameState::Aborted | FrameState::Error
        )
    }

    /// State entered at the end of `Settling`.
    ///
    /// A pending cancellation wins over completion.
    pub const fn after_settling(cancel_requested: bool, last_layer: bool) -> Self {
        if cancel_requested {
            FrameState::Aborted
        } else if last_layer {
            FrameState::Complete
        } else {
            FrameState::MovingZ
        }
    }

    /// Check if `next` is a legal successor of this state.
    pub const fn can_transition_to(self, next: FrameState) -> bool {
        match (self, next) {
            (FrameState::Init, FrameState::MovingZ)
            | (FrameState::MovingZ, FrameState::Streaming)
            | (FrameState::Streaming, FrameState::Settling)
            | (FrameState::Settling, FrameState::MovingZ)
            | (FrameState::Settling, FrameState::Complete) => true,
            (from, FrameState::Aborted | FrameState::Error) => !from.is_terminal(),
            (from, FrameState::Init) => from.is_terminal(),
            _ => false,
        }
    }

    pub(crate) const fn from_u8(value: u8) -> Self {
        match value {
            1 => FrameState::MovingZ,
            2 => FrameState::Streaming,
            3 => FrameState::Settling,
            4 => FrameState::Complete,
            5 => FrameState::Aborted,
            6 => FrameState::Error,
            _ => FrameState::Init,
        }
    }

    pub(crate) const fn as_u8(self) -> u8 {
        match self {
            FrameState::Init => 0,
            FrameState::MovingZ => 1,
            FrameState::Streaming => 2,
            FrameState::Settling => 3,
            FrameState::Complete => 4,
            FrameState::Aborted => 5,
            FrameState::Error => 6,
        }
    }
}

impl core::fmt::Display for FrameState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Terminal outcome of one print job.
#[derive(Debug, Clone, PartialEq)]
pub enum PrintOutcome {
    /// Every layer printed.
    Completed {
        /// Index of the final layer
        last_layer: usize,
    },
    /// Stopped by a cancellation request.
    Aborted {
        /// Last fully printed layer, if any
        last_completed: Option<usize>,
    },
    /// Stopped by a hardware or validation failure.
    Failed {
        /// Last fully printed layer, if any
        last_completed: Option<usize>,
        /// Failure that ended the job
        error: Error,
    },
}

impl PrintOutcome {
    /// Last fully printed layer, if any.
    pub fn last_completed_layer(&self) -> Option<usize> {
        match self {
            PrintOutcome::Completed { last_layer } => Some(*last_layer),
            PrintOutcome::Aborted { last_completed } => *last_completed,
            PrintOutcome::Failed { last_completed, .. } => *last_completed,
        }
    }

    /// Terminal sequencer state for this outcome.
    pub fn state(&self) -> FrameState {
        match self {
            PrintOutcome::Completed { .. } => FrameState::Complete,
            PrintOutcome::Aborted { .. } => FrameState::Aborted,
            PrintOutcome::Failed { .. } => FrameState::Error,
        }
    }

    /// Check for a completed print.
    pub fn is_completed(&self) -> bool {
        matches!(self, PrintOutcome::Completed { .. })
    }

    /// Failure that ended the job, if any.
    pub fn error(&self) -> Option<&Error> {
        match self {
            PrintOutcome::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// What the recovery path managed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Recovery {
    /// Power channel confirmed at zero.
    pub power_zeroed: bool,
    /// Fast and slow scan axes driven back to zero.
    pub scan_parked: bool,
    /// Axial actuator commanded back to the restore point successfully.
    /// False if the axis was never moved.
    pub returned_to_restore_point: bool,
}

/// Result of a print job.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintReport {
    /// Terminal outcome.
    pub outcome: PrintOutcome,
    /// Axial position captured at `Init`, if it could be read.
    pub restore_point: Option<Nanometers>,
    /// Recovery steps that succeeded.
    pub recovery: Recovery,
    /// Layers that went through a full `MovingZ -> Streaming -> Settling` cycle.
    pub layers_cycled: usize,
}
