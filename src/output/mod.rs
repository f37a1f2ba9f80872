//! Multi-channel analog output interface.
//!
//! [`SignalOutput`] streams compiled waveforms across the fast-axis,
//! slow-axis and power channels in lockstep, and sets single channels
//! immediately outside of streaming.

mod mock;

pub use crate::config::{Channel, ChannelMap};
pub use mock::{MockOutput, WriteRecord};

use crate::error::OutputError;
use crate::scan::WaveformBuffer;

/// Synchronized multi-channel analog output.
pub trait SignalOutput {
    /// Bind logical channels to physical outputs at a per-job sample rate.
    fn configure(&mut self, channels: &ChannelMap, sample_rate_hz: f64)
        -> Result<(), OutputError>;

    /// Emit a buffer on all three channels; blocks until fully emitted.
    ///
    /// # Errors
    ///
    /// Fails on a hardware fault, or with `OutputError::Interrupted` if the
    /// adapter stopped early.
    fn write(&mut self, buffer: &WaveformBuffer) -> Result<(), OutputError>;

    /// Set one channel's drive level immediately (not buffered).
    fn set_channel_level(&mut self, channel: Channel, level: f64) -> Result<(), OutputError>;
}

impl<T: SignalOutput + ?Sized> SignalOutput for &mut T {
    fn configure(
        &mut self,
        channels: &ChannelMap,
        sample_rate_hz: f64,
    ) -> Result<(), OutputError> {
        (**self).configure(channels, sample_rate_hz)
    }

    fn write(&mut self, buffer: &WaveformBuffer) -> Result<(), OutputError> {
        (**self).write(buffer)
    }

    fn set_channel_level(&mut self, channel: Channel, level: f64) -> Result<(), OutputError> {
        (**self).set_channel_level(channel, level)
    }
}

/// Check a sample rate before handing it to hardware.
pub fn check_sample_rate(sample_rate_hz: f64) -> Result<f64, OutputError> {
    if sample_rate_hz.is_finite() && sample_rate_hz > 0.0 {
        Ok(sample_rate_hz)
    } else {
        Err(OutputError::InvalidSampleRate(sample_rate_hz))
    }
}
