use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use spin::{Mutex, MutexGuard};

use crate::pmic::PmicError;

/// Cooperative cancellation signal for interruptible waits.
#[derive(Debug, Default)]
pub struct CancelToken {
    cancelled: AtomicBool,
}

impl CancelToken {
    pub const fn new() -> Self {
        Self {
            cancelled: AtomicBool::new(false),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Binary lock with interruptible acquisition and an acquisition counter.
pub struct EventLock<T> {
    inner: Mutex<T>,
    acquisitions: AtomicUsize,
}

impl<T> EventLock<T> {
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(value),
            acquisitions: AtomicUsize::new(0),
        }
    }

    /// Acquires the lock without waiting.
    pub fn try_lock(&self) -> Result<MutexGuard<'_, T>, PmicError> {
        let guard = self.inner.try_lock().ok_or(PmicError::LockUnavailable)?;
        self.acquisitions.fetch_add(1, Ordering::Relaxed);
        Ok(guard)
    }

    /// Waits for the lock until it is acquired or `cancel` fires.
    pub fn lock_interruptible(&self, cancel: &CancelToken) -> Result<MutexGuard<'_, T>, PmicError> {
        loop {
            if cancel.is_cancelled() {
                return Err(PmicError::Interrupted);
            }
            if let Some(guard) = self.inner.try_lock() {
                self.acquisitions.fetch_add(1, Ordering::Relaxed);
                return Ok(guard);
            }
            core::hint::spin_loop();
        }
    }

    /// Number of successful acquisitions since creation.
    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::Relaxed)
    }

    pub fn is_locked(&self) -> bool {
        self.inner.is_locked()
    }
}
