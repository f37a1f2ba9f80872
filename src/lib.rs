//! # pointscan-print
//!
//! Print execution pipeline for point-scan lithography.
//!
//! ## Features
//!
//! - **Configuration-driven**: Scan, axial stepping, output channels and axis
//!   limits from TOML files
//! - **Validated input**: Voxel doses clamped to 1, negatives rejected before
//!   anything moves
//! - **Raster compilation**: Each layer becomes three equal-length drive-level
//!   buffers with blanked flyback
//! - **Layer sequencing**: Axial step, stream, settle, with cooperative
//!   cancellation at layer boundaries
//! - **Fail-safe recovery**: Power forced to zero and the axis returned to
//!   its restore point on abort or error
//! - **Hardware-agnostic**: `StageAxis` and `SignalOutput` traits, with mock
//!   adapters for dry runs
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pointscan_print::{
//!     CalibrationTable, FrameSequencer, PrintPlan, SafetyInterlock, VoxelVolume,
//! };
//!
//! let config = pointscan_print::load_config("print.toml")?;
//! let calibration = CalibrationTable::load("aom_calibration.csv")?;
//! let volume = VoxelVolume::load_npy("part.npy")?;
//!
//! let plan = PrintPlan::new(volume, &config, calibration)?;
//! let mut sequencer = FrameSequencer::new(z_stage, daq, delay, SafetyInterlock::new());
//! let report = sequencer.run(&plan)?;
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables TOML file loading
//! - `defmt`: Derives `defmt::Format` for state and channel enums

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Errors carry bounded heapless messages
#![allow(clippy::result_large_err)]

// Core modules
pub mod calibration;
pub mod config;
pub mod error;
pub mod output;
pub mod safety;
pub mod scan;
pub mod sequencer;
pub mod shared;
pub mod stage;
pub mod volume;

// Re-exports for ergonomic API
pub use calibration::{CalibrationEntry, CalibrationTable};
pub use config::{validate_config, AxialConfig, AxisLimits, ChannelMap, PrintConfig, ScanConfig};
pub use error::{Error, Result};
pub use output::{Channel, MockOutput, SignalOutput};
pub use safety::{
    force_power_off, CancelToken, ManualControl, ManualGuard, PrintToken, SafetyInterlock,
};
pub use scan::{ScanGeometry, WaveformBuffer, WaveformCompiler};
pub use sequencer::{
    FrameSequencer, FrameState, PrintHandle, PrintMonitor, PrintOutcome, PrintPlan, PrintReport,
    PrintWorker, Recovery,
};
pub use shared::Shared;
pub use stage::{MockStage, StageAxis};
pub use volume::{VolumeShape, VoxelVolume};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};

// Unit types
pub use config::units::{Micrometers, Nanometers};
