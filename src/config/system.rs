//! Print configuration - root configuration structure.

use heapless::{FnvIndexMap, String};
use serde::Deserialize;

use super::axial::AxialConfig;
use super::channels::ChannelMap;
use super::limits::AxisLimits;
use super::scan::ScanConfig;
use super::units::Nanometers;

/// Root configuration structure from TOML.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PrintConfig {
    /// Raster scan parameters.
    pub scan: ScanConfig,

    /// Layer-to-layer axial motion.
    pub axial: AxialConfig,

    /// Analog output channel mapping.
    pub channels: ChannelMap,

    /// Named per-axis position limits.
    pub limits: FnvIndexMap<String<16>, AxisLimits, 8>,
}

impl PrintConfig {
    /// Get the limits of an axis by name.
    pub fn axis_limits(&self, name: &str) -> Option<&AxisLimits> {
        self.limits
            .iter()
            .find(|(k, _)| k.as_str() == name)
            .map(|(_, v)| v)
    }

    /// Limits of the axis used for layer stepping.
    pub fn axial_limits(&self) -> Option<&AxisLimits> {
        self.axis_limits(self.axial.axis.as_str())
    }

    /// List all axis names with limits.
    pub fn axis_names(&self) -> impl Iterator<Item = &str> {
        self.limits.keys().map(|s| s.as_str())
    }
}

impl Default for PrintConfig {
    fn default() -> Self {
        let mut limits = FnvIndexMap::new();
        for (name, min, max) in [
            ("x", -45_000_000, 45_000_000),
            ("y", -45_000_000, 45_000_000),
            ("z", -5_000_000, 5_000_000),
        ] {
            let _ = limits.insert(
                String::try_from(name).unwrap_or_default(),
                AxisLimits::new(Nanometers(min), Nanometers(max)),
            );
        }

        Self {
            scan: ScanConfig::default(),
            axial: AxialConfig::default(),
            channels: ChannelMap::default(),
            limits,
        }
    }
}
