//! Validated print request.

use core::time::Duration;
use std::sync::Arc;

use tracing::info;

use crate::calibration::CalibrationTable;
use crate::config::{validate_config, AxisLimits, Nanometers, PrintConfig};
use crate::error::{ConfigError, Result, ValidationError};
use crate::scan::{ScanGeometry, WaveformCompiler};
use crate::volume::VoxelVolume;

/// Everything a print needs, validated before any motion or output.
///
/// Building a plan fails on a malformed configuration or a field of view
/// the scanning actuators cannot reach.
#[derive(Debug, Clone)]
pub struct PrintPlan {
    volume: VoxelVolume,
    geometry: ScanGeometry,
    calibration: Arc<CalibrationTable>,
    config: PrintConfig,
}

impl PrintPlan {
    /// Validate a volume against the configuration.
    pub fn new(
        volume: VoxelVolume,
        config: &PrintConfig,
        calibration: impl Into<Arc<CalibrationTable>>,
    ) -> Result<Self> {
        validate_config(config)?;

        let shape = volume.shape();
        let geometry = ScanGeometry::new(&config.scan, shape.rows, shape.columns)?;

        let dark_layers = (0..volume.layer_count())
            .filter(|&layer| volume.is_layer_empty(layer))
            .count();
        info!(
            shape = %shape,
            dark_layers,
            samples_per_layer = geometry.samples_per_layer(),
            blanking = geometry.blanking(),
            "print plan validated"
        );

        Ok(Self {
            volume,
            geometry,
            calibration: calibration.into(),
            config: config.clone(),
        })
    }

    /// Dose volume.
    pub fn volume(&self) -> &VoxelVolume {
        &self.volume
    }

    /// Raster geometry shared by every layer.
    pub fn geometry(&self) -> &ScanGeometry {
        &self.geometry
    }

    /// Calibration used for power levels.
    pub fn calibration(&self) -> &CalibrationTable {
        &self.calibration
    }

    /// Configuration the plan was validated against.
    pub fn config(&self) -> &PrintConfig {
        &self.config
    }

    /// Number of layers to print.
    pub fn layer_count(&self) -> usize {
        self.volume.layer_count()
    }

    /// Compiler bound to this plan's geometry and calibration.
    pub fn compiler(&self) -> WaveformCompiler<'_> {
        WaveformCompiler::new(&self.geometry, &self.calibration)
    }

    /// Limits of the configured axial axis.
    pub fn axial_limits(&self) -> Result<AxisLimits> {
        self.config
            .axial_limits()
            .copied()
            .ok_or_else(|| ConfigError::AxisNotFound(self.config.axial.axis.clone()).into())
    }

    /// Axial target of every layer, lowest layer first.
    pub fn axial_targets(&self, restore_point: Nanometers) -> impl Iterator<Item = Nanometers> + '_ {
        (0..self.layer_count()).map(move |k| self.config.axial.layer_target(restore_point, k))
    }

    /// Reject a restore point that would drive any layer out of the axial limits.
    pub fn check_axial_targets(&self, restore_point: Nanometers) -> Result<()> {
        let limits = self.axial_limits()?;
        for (layer, target) in self.axial_targets(restore_point).enumerate() {
            if !limits.contains(target) {
                return Err(ValidationError::AxialTargetOutOfRange {
                    layer,
                    target: target.0,
                    min: limits.min.0,
                    max: limits.max.0,
                }
                .into());
            }
        }
        Ok(())
    }

    /// Streaming time for the whole print, ignoring axial moves.
    ///
    /// An upper bound when dark rows are skipped.
    pub fn estimated_streaming_time(&self) -> Duration {
        streaming_time(
            self.geometry.samples_per_layer(),
            self.layer_count(),
            self.geometry.sample_interval_s(),
        )
    }
}

/// Saturates at `Duration::MAX`.
fn streaming_time(samples_per_layer: usize, layers: usize, sample_interval_s: f64) -> Duration {
    let seconds = samples_per_layer as f64 * layers as f64 * sample_interval_s;
    Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
}
