//! Per-axis position limits.

use serde::Deserialize;

use super::units::Nanometers;
use crate::error::MotionError;

/// Allowed travel for one stage axis, in nanometers.
///
/// Targets outside the range are rejected, never clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AxisLimits {
    /// Minimum allowed position.
    #[serde(rename = "min_nm")]
    pub min: Nanometers,

    /// Maximum allowed position.
    #[serde(rename = "max_nm")]
    pub max: Nanometers,
}

impl AxisLimits {
    /// Create new axis limits.
    pub fn new(min: Nanometers, max: Nanometers) -> Self {
        Self { min, max }
    }

    /// Check if limits are valid (min < max).
    pub fn is_valid(&self) -> bool {
        self.min < self.max
    }

    /// Check if a position is within limits (inclusive).
    pub fn contains(&self, position: Nanometers) -> bool {
        position >= self.min && position <= self.max
    }

    /// Reject a target outside the limits.
    pub fn check(&self, target: Nanometers) -> Result<Nanometers, MotionError> {
        if self.contains(target) {
            Ok(target)
        } else {
            Err(MotionError::OutOfBounds {
                target: target.0,
                min: self.min.0,
                max: self.max.0,
            })
        }
    }
}
