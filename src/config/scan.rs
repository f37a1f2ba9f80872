//! Raster scan configuration from TOML.

use serde::Deserialize;

use super::units::Micrometers;

/// Scale and range of one scanning actuator.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ActuatorConfig {
    /// Physical displacement per unit drive level (µm).
    pub um_per_unit: f64,

    /// Largest drive level magnitude the actuator accepts.
    #[serde(default = "default_max_drive")]
    pub max_drive: f64,
}

fn default_max_drive() -> f64 {
    1.0
}

impl ActuatorConfig {
    /// Create a new actuator configuration.
    pub const fn new(um_per_unit: f64, max_drive: f64) -> Self {
        Self {
            um_per_unit,
            max_drive,
        }
    }

    /// Drive level needed to reach half of `span` on either side of center.
    #[inline]
    pub fn half_span_drive(&self, span: Micrometers) -> f64 {
        span.0 / (2.0 * self.um_per_unit)
    }
}

/// Raster scan parameters shared by every layer of a print.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Field of view along the fast axis.
    #[serde(rename = "fov_x_um")]
    pub fov_x: Micrometers,

    /// Field of view along the slow axis.
    #[serde(rename = "fov_y_um")]
    pub fov_y: Micrometers,

    /// Dwell time per sample (µs).
    pub dwell_us: f64,

    /// Fast-axis flyback time between rows (µs); sets the blanking count.
    pub flyback_us: f64,

    /// Doses at or below this are emitted as exactly zero power.
    pub zero_dose_tolerance: f64,

    /// Drop rows whose power samples are all zero.
    pub skip_dark_rows: bool,

    /// Fast-axis actuator.
    pub fast_axis: ActuatorConfig,

    /// Slow-axis actuator.
    pub slow_axis: ActuatorConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            fov_x: Micrometers(650.0),
            fov_y: Micrometers(650.0),
            dwell_us: 5.0,
            flyback_us: 1094.0,
            zero_dose_tolerance: 1e-10,
            skip_dark_rows: false,
            fast_axis: ActuatorConfig::new(613.0, 1.0),
            slow_axis: ActuatorConfig::new(748.0, 1.0),
        }
    }
}

impl ScanConfig {
    /// Dwell time per sample in seconds.
    #[inline]
    pub fn dwell_seconds(&self) -> f64 {
        self.dwell_us * 1e-6
    }

    /// Output sample rate in Hz.
    #[inline]
    pub fn sample_rate_hz(&self) -> f64 {
        1.0 / self.dwell_seconds()
    }

    /// Blanking samples per row: whole dwell periods that fit in the flyback time.
    #[inline]
    pub fn blanking_samples(&self) -> usize {
        libm::floor(self.flyback_us / self.dwell_us) as usize
    }
}
