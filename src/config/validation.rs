//! Configuration validation.

use crate::error::{ConfigError, Error, Result};

use super::scan::ActuatorConfig;
use super::PrintConfig;

/// Validate a print configuration.
///
/// Checks:
/// - Scan timing, field of view and actuator scales are positive
/// - Axial step is positive and the axial axis has limits
/// - Channel amplitudes are positive
/// - Axis limits are valid (min < max)
pub fn validate_config(config: &PrintConfig) -> Result<()> {
    let scan = &config.scan;
    positive("fov_x_um", scan.fov_x.0)?;
    positive("fov_y_um", scan.fov_y.0)?;
    positive("dwell_us", scan.dwell_us)?;
    non_negative("flyback_us", scan.flyback_us)?;
    non_negative("zero_dose_tolerance", scan.zero_dose_tolerance)?;
    validate_actuator(&scan.fast_axis)?;
    validate_actuator(&scan.slow_axis)?;

    positive("step_um", config.axial.step.0)?;

    for (channel, channel_config) in config.channels.iter() {
        positive(channel.name(), channel_config.amplitude)?;
    }

    for (_, limits) in config.limits.iter() {
        if !limits.is_valid() {
            return Err(Error::Config(ConfigError::InvalidLimits {
                min: limits.min.0,
                max: limits.max.0,
            }));
        }
    }

    if config.axial_limits().is_none() {
        return Err(Error::Config(ConfigError::AxisNotFound(
            config.axial.axis.clone(),
        )));
    }

    Ok(())
}

fn validate_actuator(actuator: &ActuatorConfig) -> Result<()> {
    positive("um_per_unit", actuator.um_per_unit)?;
    positive("max_drive", actuator.max_drive)?;
    Ok(())
}

fn positive(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::Config(ConfigError::NotPositive { field, value }))
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::Config(ConfigError::Negative { field, value }))
    }
}
