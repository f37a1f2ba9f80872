//! Axial (layer-to-layer) motion configuration from TOML.

use heapless::String;
use serde::Deserialize;

use super::units::{Micrometers, Nanometers};

/// Physical direction in which successive layers advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum AxialDirection {
    /// Positive stage coordinates.
    #[default]
    Up,
    /// Negative stage coordinates.
    Down,
}

impl AxialDirection {
    /// Sign applied to the layer offset.
    #[inline]
    pub const fn sign(self) -> i64 {
        match self {
            AxialDirection::Up => 1,
            AxialDirection::Down => -1,
        }
    }
}

/// Axial stepping between layers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AxialConfig {
    /// Axis name; must have an entry in `[limits]`.
    pub axis: String<16>,

    /// Distance between successive layers.
    #[serde(rename = "step_um")]
    pub step: Micrometers,

    /// Direction of travel as layers progress.
    pub direction: AxialDirection,

    /// Positioning tolerance passed to the stage (None = adapter default).
    #[serde(rename = "tolerance_nm")]
    pub tolerance: Option<Nanometers>,

    /// Dwell after each layer before the cancellation checkpoint (µs).
    pub settle_us: u32,

    /// Return to the restore point after a completed print.
    pub return_on_complete: bool,
}

impl Default for AxialConfig {
    fn default() -> Self {
        Self {
            axis: String::try_from("z").unwrap_or_default(),
            step: Micrometers(1.5),
            direction: AxialDirection::Up,
            tolerance: None,
            settle_us: 0,
            return_on_complete: true,
        }
    }
}

impl AxialConfig {
    /// Signed offset of `layer` from the restore point.
    pub fn layer_offset(&self, layer: usize) -> Nanometers {
        self.step.to_nanometers() * (layer as i64) * self.direction.sign()
    }

    /// Axial target for `layer` given the restore point.
    pub fn layer_target(&self, restore_point: Nanometers, layer: usize) -> Nanometers {
        restore_point + self.layer_offset(layer)
    }
}
