//! Per-print raster geometry.

use core::time::Duration;

use crate::config::{ActuatorConfig, Micrometers, ScanConfig};
use crate::error::{ConfigError, Result, ValidationError};

/// Raster geometry derived from scan configuration and volume shape.
///
/// Drive levels sweep symmetrically around the actuator center: the fast
/// axis covers `[-h_x, +h_x]` within each row and the slow axis steps over
/// `[-h_y, +h_y]` once per row.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanGeometry {
    rows: usize,
    columns: usize,
    blanking: usize,
    fast_half_span: f64,
    slow_half_span: f64,
    sample_interval_s: f64,
    zero_dose_tolerance: f64,
    skip_dark_rows: bool,
}

impl ScanGeometry {
    /// Derive geometry for a `rows x columns` layer.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::FieldOfViewExceedsRange` if either field of
    /// view needs more drive than its actuator allows, and
    /// `ValidationError::EmptyVolume` for a zero pixel count.
    pub fn new(scan: &ScanConfig, rows: usize, columns: usize) -> Result<Self> {
        if rows == 0 || columns == 0 {
            return Err(ValidationError::EmptyVolume {
                shape: (rows, columns, 1),
            }
            .into());
        }
        if !scan.dwell_us.is_finite() || scan.dwell_us <= 0.0 {
            return Err(ConfigError::NotPositive {
                field: "scan.dwell_us",
                value: scan.dwell_us,
            }
            .into());
        }

        let fast_half_span = half_span("fast_axis", &scan.fast_axis, scan.fov_x)?;
        let slow_half_span = half_span("slow_axis", &scan.slow_axis, scan.fov_y)?;

        Ok(Self {
            rows,
            columns,
            blanking: scan.blanking_samples(),
            fast_half_span,
            slow_half_span,
            sample_interval_s: scan.dwell_seconds(),
            zero_dose_tolerance: scan.zero_dose_tolerance,
            skip_dark_rows: scan.skip_dark_rows,
        })
    }

    /// Slow-axis row count (Y).
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Active fast-axis samples per row (m).
    #[inline]
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Blanking samples per row (b).
    #[inline]
    pub fn blanking(&self) -> usize {
        self.blanking
    }

    /// Samples per row including blanking.
    #[inline]
    pub fn samples_per_row(&self) -> usize {
        self.columns + self.blanking
    }

    /// Samples in a full layer: `Y * (m + b)`.
    #[inline]
    pub fn samples_per_layer(&self) -> usize {
        self.rows * self.samples_per_row()
    }

    /// Seconds between samples.
    #[inline]
    pub fn sample_interval_s(&self) -> f64 {
        self.sample_interval_s
    }

    /// Output sample rate in Hz.
    #[inline]
    pub fn sample_rate_hz(&self) -> f64 {
        1.0 / self.sample_interval_s
    }

    /// Doses at or below this compile to zero power.
    #[inline]
    pub fn zero_dose_tolerance(&self) -> f64 {
        self.zero_dose_tolerance
    }

    /// Whether all-dark rows are dropped from compiled buffers.
    #[inline]
    pub fn skip_dark_rows(&self) -> bool {
        self.skip_dark_rows
    }

    /// Fast-axis drive level at the start of each row.
    #[inline]
    pub fn fast_start(&self) -> f64 {
        -self.fast_half_span
    }

    /// Fast-axis drive level for column `i`.
    pub fn fast_level(&self, column: usize) -> f64 {
        linspace_at(-self.fast_half_span, self.fast_half_span, self.columns, column)
    }

    /// Slow-axis drive level held during row `row`.
    pub fn slow_level(&self, row: usize) -> f64 {
        linspace_at(-self.slow_half_span, self.slow_half_span, self.rows, row)
    }

    /// Streaming time for one full layer.
    pub fn layer_duration(&self) -> Duration {
        Duration::from_secs_f64(self.samples_per_layer() as f64 * self.sample_interval_s)
    }
}

fn half_span(axis: &'static str, actuator: &ActuatorConfig, fov: Micrometers) -> Result<f64> {
    let required = actuator.half_span_drive(fov);
    if !required.is_finite() || libm::fabs(required) > actuator.max_drive {
        return Err(ValidationError::FieldOfViewExceedsRange {
            axis,
            required,
            max: actuator.max_drive,
        }
        .into());
    }
    Ok(libm::fabs(required))
}

/// Value `i` of `n` evenly spaced points from `start` to `end` inclusive.
fn linspace_at(start: f64, end: f64, n: usize, i: usize) -> f64 {
    if n <= 1 {
        return start;
    }
    start + (end - start) * (i as f64) / ((n - 1) as f64)
}
