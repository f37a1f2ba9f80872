//! Configuration module for the print pipeline.
//!
//! Provides types for loading and validating scan, axial, channel and
//! axis-limit configuration from TOML files (with `std` feature) or
//! pre-built values.

mod axial;
mod channels;
mod limits;
#[cfg(feature = "std")]
mod loader;
mod scan;
mod system;
pub mod units;
mod validation;

pub use axial::{AxialConfig, AxialDirection};
pub use channels::{Channel, ChannelConfig, ChannelMap};
pub use limits::AxisLimits;
pub use scan::{ActuatorConfig, ScanConfig};
pub use system::PrintConfig;
pub use validation::validate_config;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

// Re-export unit types at config level
pub use units::{Micrometers, Nanometers};
