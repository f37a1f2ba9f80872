//! In-memory analog output for dry runs and tests.

use core::fmt;

use tracing::debug;

use super::{check_sample_rate, Channel, ChannelMap, SignalOutput};
use crate::error::OutputError;
use crate::scan::WaveformBuffer;

type WriteHook = Box<dyn FnMut(usize) -> Result<(), OutputError> + Send>;

/// Summary of one streamed buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteRecord {
    /// Sample count per channel.
    pub samples: usize,
    /// Largest power drive level in the buffer.
    pub peak_power: f64,
    /// Power level of every sample is exactly zero.
    pub power_all_zero: bool,
}

/// Output that accepts buffers instantly and records what it was sent.
///
/// Channel levels rest at the last streamed sample, as real hardware holds
/// its final value.
#[derive(Default)]
pub struct MockOutput {
    channels: Option<ChannelMap>,
    sample_rate_hz: Option<f64>,
    levels: [f64; 3],
    level_history: Vec<(Channel, f64)>,
    writes: Vec<WriteRecord>,
    fail_on_write: Option<usize>,
    on_write: Option<WriteHook>,
}

impl MockOutput {
    /// Create an unconfigured output with every channel at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the write with 0-based index `index` with a hardware fault.
    pub fn fail_on_write(mut self, index: usize) -> Self {
        self.fail_on_write = Some(index);
        self
    }

    /// Run `hook` with the write index before each write is accepted.
    ///
    /// An error from the hook is returned from `write` and the buffer is
    /// not recorded.
    pub fn on_write<F>(mut self, hook: F) -> Self
    where
        F: FnMut(usize) -> Result<(), OutputError> + Send + 'static,
    {
        self.on_write = Some(Box::new(hook));
        self
    }

    /// Current level of a channel.
    pub fn level(&self, channel: Channel) -> f64 {
        self.levels[index(channel)]
    }

    /// Every immediate `set_channel_level` call in order.
    pub fn level_history(&self) -> &[(Channel, f64)] {
        &self.level_history
    }

    /// Buffers accepted so far.
    pub fn writes(&self) -> &[WriteRecord] {
        &self.writes
    }

    /// Sample rate from the last `configure`.
    pub fn sample_rate_hz(&self) -> Option<f64> {
        self.sample_rate_hz
    }

    /// Channel map from the last `configure`.
    pub fn channels(&self) -> Option<&ChannelMap> {
        self.channels.as_ref()
    }
}

fn index(channel: Channel) -> usize {
    match channel {
        Channel::FastAxis => 0,
        Channel::SlowAxis => 1,
        Channel::Power => 2,
    }
}

impl SignalOutput for MockOutput {
    fn configure(
        &mut self,
        channels: &ChannelMap,
        sample_rate_hz: f64,
    ) -> Result<(), OutputError> {
        self.sample_rate_hz = Some(check_sample_rate(sample_rate_hz)?);
        self.channels = Some(channels.clone());
        Ok(())
    }

    fn write(&mut self, buffer: &WaveformBuffer) -> Result<(), OutputError> {
        if self.channels.is_none() {
            return Err(OutputError::fault("output not configured"));
        }

        let write_index = self.writes.len();
        if self.fail_on_write == Some(write_index) {
            return Err(OutputError::fault("mock output fault"));
        }
        if let Some(hook) = self.on_write.as_mut() {
            hook(write_index)?;
        }

        let mut record = WriteRecord {
            samples: 0,
            peak_power: 0.0,
            power_all_zero: true,
        };
        for (fast, slow, power) in buffer.samples() {
            record.samples += 1;
            record.peak_power = record.peak_power.max(power);
            record.power_all_zero &= power == 0.0;
            self.levels = [fast, slow, power];
        }
        self.writes.push(record);

        debug!(write_index, samples = buffer.len(), "mock output write");
        Ok(())
    }

    fn set_channel_level(&mut self, channel: Channel, level: f64) -> Result<(), OutputError> {
        self.levels[index(channel)] = level;
        self.level_history.push((channel, level));
        Ok(())
    }
}

impl fmt::Debug for MockOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockOutput")
            .field("sample_rate_hz", &self.sample_rate_hz)
            .field("levels", &self.levels)
            .field("writes", &self.writes.len())
            .field("fail_on_write", &self.fail_on_write)
            .field("on_write", &self.on_write.is_some())
            .finish()
    }
}
