//! Single-permit print interlock and cooperative cancellation.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::error::{OutputError, Result, SafetyError};
use crate::output::{Channel, SignalOutput};

#[derive(Debug, Default)]
struct Inner {
    gate: Mutex<()>,
    held: AtomicBool,
    cancel: AtomicBool,
    jobs: AtomicU64,
}

/// Mutual exclusion between print jobs and manual control.
///
/// At most one [`PrintToken`] exists at a time. While it is held, manual
/// motion and laser requests are rejected, and the cancellation flag may be
/// raised from any thread.
#[derive(Debug, Clone, Default)]
pub struct SafetyInterlock {
    inner: Arc<Inner>,
}

impl SafetyInterlock {
    /// Create a released interlock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the single print permit.
    ///
    /// Clears any cancellation left over from a previous job.
    ///
    /// # Errors
    ///
    /// Returns `SafetyError::ConcurrentPrint` if a print already holds it.
    pub fn acquire(&self) -> Result<PrintToken> {
        // Waits out any manual request already in flight.
        let _gate = self.lock_gate();
        if self
            .inner
            .held
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("print rejected: interlock already held");
            return Err(SafetyError::ConcurrentPrint.into());
        }

        self.inner.cancel.store(false, Ordering::Release);
        let job = self.inner.jobs.fetch_add(1, Ordering::AcqRel) + 1;
        info!(job, "interlock acquired");
        Ok(PrintToken {
            interlock: self.clone(),
            job,
        })
    }

    /// Give the permit back. Equivalent to dropping the token.
    pub fn release(&self, token: PrintToken) {
        drop(token);
    }

    /// Hold off print acquisition for the life of the returned guard.
    ///
    /// Non-print paths take this before touching hardware so no print can
    /// start between the lock check and the hardware call.
    ///
    /// # Errors
    ///
    /// Returns `SafetyError::ManualControlLocked` if a print holds the permit.
    pub fn manual_access(&self, request: &'static str) -> Result<ManualGuard<'_>> {
        let gate = self.lock_gate();
        if self.is_held() {
            warn!(request, "manual request rejected during print");
            return Err(SafetyError::ManualControlLocked.into());
        }
        Ok(ManualGuard { _gate: gate })
    }

    fn lock_gate(&self) -> MutexGuard<'_, ()> {
        // The gate guards no data, so a poisoned lock is still usable.
        self.inner.gate.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// True while a print holds the permit.
    pub fn is_held(&self) -> bool {
        self.inner.held.load(Ordering::Acquire)
    }

    /// Ask the running print to stop at its next checkpoint. Idempotent.
    pub fn request_cancel(&self) {
        if !self.inner.cancel.swap(true, Ordering::AcqRel) {
            info!("cancellation requested");
        }
    }

    /// Whether cancellation has been requested.
    pub fn is_cancel_requested(&self) -> bool {
        self.inner.cancel.load(Ordering::Acquire)
    }

    /// Handle that can only raise and read the cancellation flag.
    pub fn cancel_token(&self) -> CancelToken {
        CancelToken {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Proof of holding the print permit; releases it on drop.
#[derive(Debug)]
pub struct PrintToken {
    interlock: SafetyInterlock,
    job: u64,
}

impl PrintToken {
    /// Sequence number of the job holding this token.
    pub fn job(&self) -> u64 {
        self.job
    }

    /// Interlock the token belongs to.
    pub fn interlock(&self) -> &SafetyInterlock {
        &self.interlock
    }
}

impl Drop for PrintToken {
    fn drop(&mut self) {
        self.interlock.inner.held.store(false, Ordering::Release);
        info!(job = self.job, "interlock released");
    }
}

/// Manual access window; no print can acquire the interlock while it lives.
#[derive(Debug)]
pub struct ManualGuard<'a> {
    _gate: MutexGuard<'a, ()>,
}

/// External stop signal for a running print.
#[derive(Debug, Clone)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

impl CancelToken {
    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        if !self.inner.cancel.swap(true, Ordering::AcqRel) {
            info!("cancellation requested");
        }
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancel.load(Ordering::Acquire)
    }
}

/// Drive the power channel to zero.
pub fn force_power_off<OUT>(output: &mut OUT) -> core::result::Result<(), OutputError>
where
    OUT: SignalOutput + ?Sized,
{
    output.set_channel_level(Channel::Power, 0.0)?;
    debug!("power channel forced to zero");
    Ok(())
}
