//! Print execution: plan validation, the frame state machine and the
//! worker thread that runs it.

mod frame;
mod monitor;
mod plan;
mod state;
mod worker;

pub use frame::FrameSequencer;
pub use monitor::PrintMonitor;
pub use plan::PrintPlan;
pub use state::{FrameState, PrintOutcome, PrintReport, Recovery};
pub use worker::{PrintHandle, PrintWorker};
