//! Analog output channel mapping from TOML.

use heapless::String;
use serde::Deserialize;

/// Logical output channel driven by the print pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    /// Fast-axis scanning actuator.
    FastAxis,
    /// Slow-axis scanning actuator.
    SlowAxis,
    /// Power modulator (laser intensity).
    Power,
}

impl Channel {
    /// All channels in output order.
    pub const ALL: [Channel; 3] = [Channel::FastAxis, Channel::SlowAxis, Channel::Power];

    /// Configuration key of the channel.
    pub const fn name(self) -> &'static str {
        match self {
            Channel::FastAxis => "fast_axis",
            Channel::SlowAxis => "slow_axis",
            Channel::Power => "power",
        }
    }
}

/// Physical output and amplitude for one channel.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChannelConfig {
    /// Physical output identifier (e.g. `Dev1/ao0`).
    pub output: String<32>,

    /// Voltage produced by a drive level of 1.0.
    #[serde(rename = "amplitude_v")]
    pub amplitude: f64,
}

impl ChannelConfig {
    fn new(output: &str, amplitude: f64) -> Self {
        Self {
            output: String::try_from(output).unwrap_or_default(),
            amplitude,
        }
    }
}

/// Named channel to physical output mapping.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChannelMap {
    /// Fast-axis actuator output.
    pub fast_axis: ChannelConfig,
    /// Slow-axis actuator output.
    pub slow_axis: ChannelConfig,
    /// Power modulator output.
    pub power: ChannelConfig,
}

impl Default for ChannelMap {
    fn default() -> Self {
        Self {
            fast_axis: ChannelConfig::new("Dev1/ao0", 1.4),
            slow_axis: ChannelConfig::new("Dev1/ao1", 1.4),
            power: ChannelConfig::new("Dev1/ao2", 3.0),
        }
    }
}

impl ChannelMap {
    /// Get the configuration of a channel.
    pub fn get(&self, channel: Channel) -> &ChannelConfig {
        match channel {
            Channel::FastAxis => &self.fast_axis,
            Channel::SlowAxis => &self.slow_axis,
            Channel::Power => &self.power,
        }
    }

    /// Iterate channels with their configuration, in output order.
    pub fn iter(&self) -> impl Iterator<Item = (Channel, &ChannelConfig)> {
        Channel::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    /// Scale a drive level to volts, clipped to the channel amplitude.
    pub fn to_volts(&self, channel: Channel, level: f64) -> f64 {
        let amplitude = self.get(channel).amplitude;
        (level * amplitude).clamp(-amplitude, amplitude)
    }
}
