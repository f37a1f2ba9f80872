//! Hardware handles shared between the print worker and other threads.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::Nanometers;
use crate::error::{MotionError, OutputError};
use crate::output::{Channel, ChannelMap, SignalOutput};
use crate::scan::WaveformBuffer;
use crate::stage::StageAxis;

/// Cloneable, thread-safe handle to one hardware adapter.
///
/// Both the print worker and the interactive surface can hold a clone; each
/// call locks the adapter for its duration.
#[derive(Debug, Default)]
pub struct Shared<T>(Arc<Mutex<T>>);

impl<T> Shared<T> {
    /// Wrap an adapter.
    pub fn new(inner: T) -> Self {
        Self(Arc::new(Mutex::new(inner)))
    }

    /// Lock the adapter, or `None` if a previous holder panicked.
    pub fn lock(&self) -> Option<MutexGuard<'_, T>> {
        self.0.lock().ok()
    }

    /// Run `f` with the adapter locked.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.lock().map(|mut guard| f(&mut guard))
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

fn poisoned_stage() -> MotionError {
    MotionError::fault("stage handle poisoned")
}

fn poisoned_output() -> OutputError {
    OutputError::fault("output handle poisoned")
}

impl<T: StageAxis> StageAxis for Shared<T> {
    fn get_position(&mut self) -> Result<Nanometers, MotionError> {
        self.with(|s| s.get_position()).ok_or_else(poisoned_stage)?
    }

    fn move_to(
        &mut self,
        target: Nanometers,
        tolerance: Option<Nanometers>,
        wait_for_settled: bool,
    ) -> Result<(), MotionError> {
        self.with(|s| s.move_to(target, tolerance, wait_for_settled))
            .ok_or_else(poisoned_stage)?
    }

    fn move_by(&mut self, delta: Nanometers) -> Result<(), MotionError> {
        self.with(|s| s.move_by(delta)).ok_or_else(poisoned_stage)?
    }

    fn home(&mut self) -> Result<(), MotionError> {
        self.with(|s| s.home()).ok_or_else(poisoned_stage)?
    }

    fn stop(&mut self) -> Result<(), MotionError> {
        self.with(|s| s.stop()).ok_or_else(poisoned_stage)?
    }

    fn close(&mut self) -> Result<(), MotionError> {
        self.with(|s| s.close()).ok_or_else(poisoned_stage)?
    }
}

impl<T: SignalOutput> SignalOutput for Shared<T> {
    fn configure(
        &mut self,
        channels: &ChannelMap,
        sample_rate_hz: f64,
    ) -> Result<(), OutputError> {
        self.with(|o| o.configure(channels, sample_rate_hz))
            .ok_or_else(poisoned_output)?
    }

    fn write(&mut self, buffer: &WaveformBuffer) -> Result<(), OutputError> {
        self.with(|o| o.write(buffer)).ok_or_else(poisoned_output)?
    }

    fn set_channel_level(&mut self, channel: Channel, level: f64) -> Result<(), OutputError> {
        self.with(|o| o.set_channel_level(channel, level))
            .ok_or_else(poisoned_output)?
    }
}
