use core::cell::Cell;
use core::sync::atomic::{AtomicU32, Ordering};

use heapless::Vec;

use super::{
    HandlerId, PowerState, SuspendError, SuspendHandler, SuspendMode, SuspendPlatform,
    queue::{SuspendWork, WorkQueue},
};

const SUSPEND_REQUESTED: u8 = 0x1;
const SUSPENDED: u8 = 0x2;
const REQUESTED_AND_SUSPENDED: u8 = SUSPEND_REQUESTED | SUSPENDED;

#[derive(Debug, Clone, Copy)]
struct ChainState {
    flags: u8,
    mode: SuspendMode,
    last_mode: Option<SuspendMode>,
    requested: PowerState,
}

struct Entry<'a> {
    id: HandlerId,
    level: i32,
    handler: &'a dyn SuspendHandler,
}

/// Ordered suspend/resume notifier chain.
///
/// `N` bounds the number of registered handlers. The platform's worker
/// context calls [`run_pending`](Self::run_pending) whenever
/// [`request`](Self::request) queued work.
pub struct SuspendChain<'a, P: SuspendPlatform, const N: usize> {
    platform: P,
    state: critical_section::Mutex<Cell<ChainState>>,
    handlers: spin::Mutex<Vec<Entry<'a>, N>>,
    queue: WorkQueue,
    worker: spin::Mutex<()>,
    next_id: AtomicU32,
}

impl<'a, P: SuspendPlatform, const N: usize> core::fmt::Debug for SuspendChain<'a, P, N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self.load();
        f.debug_struct("SuspendChain")
            .field("flags", &state.flags)
            .field("requested", &state.requested)
            .field("pending", &self.queue.len())
            .finish_non_exhaustive()
    }
}

impl<'a, P: SuspendPlatform, const N: usize> SuspendChain<'a, P, N> {
    pub const fn new(platform: P) -> Self {
        Self {
            platform,
            state: critical_section::Mutex::new(Cell::new(ChainState {
                flags: 0,
                mode: SuspendMode::Normal,
                last_mode: None,
                requested: PowerState::On,
            })),
            handlers: spin::Mutex::new(Vec::new()),
            queue: WorkQueue::new(),
            worker: spin::Mutex::new(()),
            next_id: AtomicU32::new(0),
        }
    }

    fn load(&self) -> ChainState {
        critical_section::with(|cs| self.state.borrow(cs).get())
    }

    /// Adds `handler` at `level`, after any handlers already at that level.
    ///
    /// If the chain is currently suspended the handler's `suspend` runs right
    /// away so it joins in the same state as everyone else.
    pub fn register(
        &self,
        level: i32,
        handler: &'a dyn SuspendHandler,
    ) -> Result<HandlerId, SuspendError> {
        let mut handlers = self.handlers.lock();
        if handlers.is_full() {
            return Err(SuspendError::ChainFull);
        }

        let state = self.load();
        if state.flags & SUSPENDED != 0 {
            handler.suspend(state.mode);
        }

        let id = HandlerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let pos = handlers
            .iter()
            .position(|e| e.level > level)
            .unwrap_or(handlers.len());
        handlers
            .insert(pos, Entry { id, level, handler })
            .map_err(|_| SuspendError::ChainFull)?;

        debug!("suspend handler {:?} at level {}", id, level);
        Ok(id)
    }

    /// Removes a handler. Unknown ids are ignored.
    pub fn unregister(&self, id: HandlerId) {
        let mut handlers = self.handlers.lock();
        if let Some(pos) = handlers.iter().position(|e| e.id == id) {
            handlers.remove(pos);
        }
    }

    /// Requests a transition to `state`.
    ///
    /// Going to sleep from on queues the suspend task; waking from sleep
    /// takes the wake guard and queues the resume task. A sleep request with
    /// a different mode than the cycle still being undone first waits for the
    /// queue to drain. Must not be called from a handler.
    pub fn request(&self, state: PowerState) {
        let (target, mode) = match state {
            PowerState::Standby => (PowerState::Mem, SuspendMode::Standby),
            other => (other, SuspendMode::Normal),
        };

        let current = self.load();
        info!("suspend request {:?} -> {:?} ({:?})", current.requested, target, mode);

        let going_to_sleep = current.flags & SUSPEND_REQUESTED == 0 && target != PowerState::On;
        if going_to_sleep
            && current.flags & SUSPENDED != 0
            && current.last_mode.is_some_and(|last| last != mode)
        {
            debug!("mode change while suspended, flushing");
            self.flush();
        }

        critical_section::with(|cs| {
            let cell = self.state.borrow(cs);
            let mut s = cell.get();
            let old_sleep = s.flags & SUSPEND_REQUESTED != 0;
            s.mode = mode;

            if !old_sleep && target != PowerState::On {
                s.flags |= SUSPEND_REQUESTED;
                self.queue.enqueue(cs, SuspendWork::Suspend);
            } else if old_sleep && target == PowerState::On {
                s.flags &= !SUSPEND_REQUESTED;
                self.platform.acquire_wake_guard();
                self.queue.enqueue(cs, SuspendWork::Resume);
            }

            if target != PowerState::On {
                s.last_mode = Some(mode);
            }
            s.requested = target;
            cell.set(s);
        });
    }

    /// The state of the most recent [`request`](Self::request), with
    /// `Standby` reported as `Mem`.
    pub fn requested_state(&self) -> PowerState {
        self.load().requested
    }

    /// True while the suspend task has run and no resume task has undone it.
    pub fn is_suspended(&self) -> bool {
        self.load().flags & SUSPENDED != 0
    }

    /// Number of queued tasks not yet started.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Worker entry point: runs queued tasks in order until the queue is
    /// empty. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let _worker = self.worker.lock();
        let mut ran = 0;
        while let Some(work) = self.queue.pop() {
            match work {
                SuspendWork::Suspend => self.suspend_task(),
                SuspendWork::Resume => self.resume_task(),
            }
            ran += 1;
        }
        ran
    }

    /// Blocks until the task in flight, if any, and everything queued behind
    /// it have completed.
    pub fn flush(&self) {
        let ran = self.run_pending();
        trace!("flushed {} suspend tasks", ran);
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    fn suspend_task(&self) {
        let handlers = self.handlers.lock();
        let applied = critical_section::with(|cs| {
            let cell = self.state.borrow(cs);
            let mut s = cell.get();
            if s.flags != SUSPEND_REQUESTED {
                return Err(s.flags);
            }
            s.flags |= SUSPENDED;
            cell.set(s);
            Ok(s.mode)
        });

        match applied {
            Ok(mode) => {
                debug!("suspend: calling {} handlers ({:?})", handlers.len(), mode);
                for entry in handlers.iter() {
                    entry.handler.suspend(mode);
                }
                drop(handlers);
                self.platform.sync();
            }
            Err(flags) => {
                drop(handlers);
                debug!("suspend aborted, state {:#x}", flags);
            }
        }

        critical_section::with(|cs| {
            if self.state.borrow(cs).get().flags == REQUESTED_AND_SUSPENDED {
                self.platform.release_wake_guard();
            }
        });
    }

    fn resume_task(&self) {
        let handlers = self.handlers.lock();
        let proceed = critical_section::with(|cs| {
            let cell = self.state.borrow(cs);
            let mut s = cell.get();
            if s.flags != SUSPENDED {
                return false;
            }
            s.flags &= !SUSPENDED;
            cell.set(s);
            true
        });

        if !proceed {
            debug!("resume aborted");
            return;
        }

        debug!("resume: calling {} handlers", handlers.len());
        for entry in handlers.iter().rev() {
            entry.handler.resume();
        }
    }
}
