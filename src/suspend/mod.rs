//! Priority-ordered suspend/resume notifier chain.
//!
//! Handlers are called in ascending level order when the system goes to
//! sleep and in the exact reverse order when it wakes up. Both directions run
//! as deferred tasks on a single-worker queue driven by
//! [`SuspendChain::run_pending`].

mod chain;
mod queue;

pub use chain::SuspendChain;
pub use queue::SuspendWork;

/// Target power state of a [`SuspendChain::request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerState {
    On,
    Standby,
    Mem,
}

/// Flavor of suspend handed to the handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuspendMode {
    Normal,
    /// Requested through [`PowerState::Standby`]; the chain itself still
    /// treats it as a memory suspend.
    Standby,
}

/// Participant in the suspend chain. Both callbacks default to no-ops.
pub trait SuspendHandler: Sync {
    fn suspend(&self, _mode: SuspendMode) {}

    fn resume(&self) {}
}

/// Platform services the chain needs around a suspend cycle.
pub trait SuspendPlatform {
    /// Keeps the system awake until released.
    fn acquire_wake_guard(&self);

    fn release_wake_guard(&self);

    /// Flushes dirty filesystem data after the handlers suspended.
    fn sync(&self);
}

/// Platform with nothing to guard or sync.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPlatform;

impl SuspendPlatform for NoPlatform {
    fn acquire_wake_guard(&self) {}

    fn release_wake_guard(&self) {}

    fn sync(&self) {}
}

/// Handle returned by [`SuspendChain::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuspendError {
    /// No free handler slot left.
    ChainFull,
}

impl core::fmt::Display for SuspendError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SuspendError::ChainFull => write!(f, "suspend chain is full"),
        }
    }
}
