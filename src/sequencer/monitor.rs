//! Lock-free view of a running print for other threads.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;

use super::FrameState;
use crate::config::Nanometers;

const NO_LAYER: usize = usize::MAX;

#[derive(Debug)]
struct Inner {
    position_nm: AtomicI64,
    position_known: AtomicBool,
    layer: AtomicUsize,
    state: AtomicU8,
}

/// Axial position, layer and state published by the sequencer.
///
/// Clones observe the same print. Reads never block the worker.
#[derive(Debug, Clone)]
pub struct PrintMonitor {
    inner: Arc<Inner>,
}

impl Default for PrintMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl PrintMonitor {
    /// Create a monitor with nothing published.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                position_nm: AtomicI64::new(0),
                position_known: AtomicBool::new(false),
                layer: AtomicUsize::new(NO_LAYER),
                state: AtomicU8::new(FrameState::Init.as_u8()),
            }),
        }
    }

    /// Last axial position reported by the stage.
    pub fn position(&self) -> Option<Nanometers> {
        if self.inner.position_known.load(Ordering::Acquire) {
            Some(Nanometers(self.inner.position_nm.load(Ordering::Acquire)))
        } else {
            None
        }
    }

    /// Layer currently being printed.
    pub fn layer(&self) -> Option<usize> {
        match self.inner.layer.load(Ordering::Acquire) {
            NO_LAYER => None,
            layer => Some(layer),
        }
    }

    /// Current sequencer state.
    pub fn state(&self) -> FrameState {
        FrameState::from_u8(self.inner.state.load(Ordering::Acquire))
    }

    pub(crate) fn set_position(&self, position: Nanometers) {
        self.inner.position_nm.store(position.0, Ordering::Release);
        self.inner.position_known.store(true, Ordering::Release);
    }

    pub(crate) fn set_layer(&self, layer: Option<usize>) {
        self.inner
            .layer
            .store(layer.unwrap_or(NO_LAYER), Ordering::Release);
    }

    pub(crate) fn set_state(&self, state: FrameState) {
        self.inner.state.store(state.as_u8(), Ordering::Release);
    }
}
