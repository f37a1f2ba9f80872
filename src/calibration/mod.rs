//! Power modulator calibration.
//!
//! Maps normalized exposure dose to the modulator's normalized drive level.

mod table;

pub use table::{CalibrationEntry, CalibrationTable};
