//! Print safety: the single-print interlock, cancellation and the manual
//! control lockout.

mod interlock;
mod manual;

pub use interlock::{force_power_off, CancelToken, ManualGuard, PrintToken, SafetyInterlock};
pub use manual::ManualControl;
