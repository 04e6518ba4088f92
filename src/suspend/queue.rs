use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Deque;

/// Deferred task of the suspend chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuspendWork {
    Suspend,
    Resume,
}

/// Pending work in submission order.
///
/// A task that is already queued is not queued again, so both tasks fit in
/// two slots. A task counts as pending only until the worker pops it.
pub(crate) struct WorkQueue {
    items: Mutex<RefCell<Deque<SuspendWork, 2>>>,
}

impl WorkQueue {
    pub(crate) const fn new() -> Self {
        Self {
            items: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Returns false if `work` was already pending.
    pub(crate) fn enqueue(&self, cs: critical_section::CriticalSection<'_>, work: SuspendWork) -> bool {
        let mut items = self.items.borrow_ref_mut(cs);
        if items.iter().any(|w| *w == work) {
            return false;
        }
        items.push_back(work).is_ok()
    }

    pub(crate) fn pop(&self) -> Option<SuspendWork> {
        critical_section::with(|cs| self.items.borrow_ref_mut(cs).pop_front())
    }

    pub(crate) fn len(&self) -> usize {
        critical_section::with(|cs| self.items.borrow_ref(cs).len())
    }
}
