//! Layer-to-waveform compilation.

use core::time::Duration;

use ndarray::ArrayView2;
use tracing::{debug, trace};

use super::ScanGeometry;
use crate::calibration::CalibrationTable;
use crate::config::Channel;
use crate::error::{OutputError, Result, ValidationError};

/// Three equal-length drive-level sequences sampled at a fixed interval.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformBuffer {
    fast: Vec<f64>,
    slow: Vec<f64>,
    power: Vec<f64>,
    sample_interval_s: f64,
}

impl WaveformBuffer {
    /// Assemble a buffer from per-channel samples.
    ///
    /// # Errors
    ///
    /// Returns `OutputError::LengthMismatch` if the channels differ in
    /// length, or `OutputError::InvalidSampleRate` for a non-positive
    /// interval.
    pub fn new(
        fast: Vec<f64>,
        slow: Vec<f64>,
        power: Vec<f64>,
        sample_interval_s: f64,
    ) -> core::result::Result<Self, OutputError> {
        if fast.len() != slow.len() || fast.len() != power.len() {
            return Err(OutputError::LengthMismatch {
                fast: fast.len(),
                slow: slow.len(),
                power: power.len(),
            });
        }
        if !sample_interval_s.is_finite() || sample_interval_s <= 0.0 {
            return Err(OutputError::InvalidSampleRate(1.0 / sample_interval_s));
        }
        Ok(Self {
            fast,
            slow,
            power,
            sample_interval_s,
        })
    }

    /// Fast-axis drive levels.
    pub fn fast(&self) -> &[f64] {
        &self.fast
    }

    /// Slow-axis drive levels.
    pub fn slow(&self) -> &[f64] {
        &self.slow
    }

    /// Power drive levels.
    pub fn power(&self) -> &[f64] {
        &self.power
    }

    /// Samples for one channel.
    pub fn channel(&self, channel: Channel) -> &[f64] {
        match channel {
            Channel::FastAxis => &self.fast,
            Channel::SlowAxis => &self.slow,
            Channel::Power => &self.power,
        }
    }

    /// Sample count (identical on every channel).
    pub fn len(&self) -> usize {
        self.power.len()
    }

    /// True if the buffer has no samples.
    pub fn is_empty(&self) -> bool {
        self.power.is_empty()
    }

    /// Seconds between samples.
    pub fn sample_interval_s(&self) -> f64 {
        self.sample_interval_s
    }

    /// Sample rate in Hz.
    pub fn sample_rate_hz(&self) -> f64 {
        1.0 / self.sample_interval_s
    }

    /// Time needed to emit the whole buffer.
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.len() as f64 * self.sample_interval_s)
    }

    /// `(fast, slow, power)` tuples in emission order.
    pub fn samples(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.fast
            .iter()
            .zip(&self.slow)
            .zip(&self.power)
            .map(|((&f, &s), &p)| (f, s, p))
    }
}

/// Compiles 2-D dose layers into raster waveforms.
///
/// Each row emits `m` active samples sweeping the fast axis left to right,
/// then `b` blanking samples with the fast axis parked at its start level
/// and power forced to zero. The slow axis holds one level per row.
#[derive(Debug)]
pub struct WaveformCompiler<'a> {
    geometry: &'a ScanGeometry,
    calibration: &'a CalibrationTable,
    fast_ramp: Vec<f64>,
}

impl<'a> WaveformCompiler<'a> {
    /// Create a compiler for one print's geometry.
    pub fn new(geometry: &'a ScanGeometry, calibration: &'a CalibrationTable) -> Self {
        let fast_ramp = (0..geometry.columns())
            .map(|i| geometry.fast_level(i))
            .collect();
        Self {
            geometry,
            calibration,
            fast_ramp,
        }
    }

    /// Geometry this compiler targets.
    pub fn geometry(&self) -> &ScanGeometry {
        self.geometry
    }

    /// Calibrated power drive level for one dose.
    ///
    /// Doses at or below the zero-dose tolerance yield exactly `0.0`.
    pub fn power_level(&self, dose: f64) -> Result<f64> {
        if dose <= self.geometry.zero_dose_tolerance() && dose >= 0.0 {
            return Ok(0.0);
        }
        Ok(self.calibration.lookup(dose)?)
    }

    /// Compile one layer indexed `(row, column)`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::LayerShapeMismatch` if the layer does not
    /// match the geometry, or a calibration error for a dose outside [0, 1].
    pub fn compile(&self, layer: ArrayView2<'_, f64>) -> Result<WaveformBuffer> {
        let geometry = self.geometry;
        let expected = (geometry.rows(), geometry.columns());
        if layer.dim() != expected {
            return Err(ValidationError::LayerShapeMismatch {
                expected,
                actual: layer.dim(),
            }
            .into());
        }

        let capacity = geometry.samples_per_layer();
        let mut fast = Vec::with_capacity(capacity);
        let mut slow = Vec::with_capacity(capacity);
        let mut power = Vec::with_capacity(capacity);
        let fast_start = geometry.fast_start();
        let mut dark_rows = 0usize;

        for (row, doses) in layer.outer_iter().enumerate() {
            let row_start = power.len();
            let slow_level = geometry.slow_level(row);
            let mut lit = false;

            for (&fast_level, &dose) in self.fast_ramp.iter().zip(doses.iter()) {
                let level = self.power_level(dose)?;
                lit |= level != 0.0;
                fast.push(fast_level);
                slow.push(slow_level);
                power.push(level);
            }

            if geometry.skip_dark_rows() && !lit {
                fast.truncate(row_start);
                slow.truncate(row_start);
                power.truncate(row_start);
                dark_rows += 1;
                trace!(row, "skipped dark row");
                continue;
            }

            // Flyback: fast axis parked, beam blanked.
            for _ in 0..geometry.blanking() {
                fast.push(fast_start);
                slow.push(slow_level);
                power.push(0.0);
            }
        }

        debug!(
            samples = power.len(),
            rows = geometry.rows(),
            dark_rows,
            "compiled layer waveform"
        );
        Ok(WaveformBuffer::new(fast, slow, power, geometry.sample_interval_s())?)
    }
}
