//! Suspend chain example: ordered sleep and wake
//!
//! This example demonstrates:
//! - Registering handlers at different levels
//! - Suspend running in ascending level order, resume in reverse
//! - Platform hooks for the wake guard and filesystem sync
//! - A handler registered while suspended joining the cycle

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use pmic_core::prelude::*;

// ============ Platform ============

#[derive(Default)]
struct Platform {
    acquired: AtomicUsize,
    released: AtomicUsize,
    syncs: AtomicUsize,
}

impl SuspendPlatform for Platform {
    fn acquire_wake_guard(&self) {
        self.acquired.fetch_add(1, Ordering::SeqCst);
    }

    fn release_wake_guard(&self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }

    fn sync(&self) {
        self.syncs.fetch_add(1, Ordering::SeqCst);
    }
}

// ============ Handlers ============

/// Records the order in which the chain calls it.
struct Stage<'l> {
    name: &'static str,
    log: &'l Mutex<Vec<String>>,
}

impl SuspendHandler for Stage<'_> {
    fn suspend(&self, mode: SuspendMode) {
        self.log.lock().unwrap().push(format!("suspend {} ({mode:?})", self.name));
    }

    fn resume(&self) {
        self.log.lock().unwrap().push(format!("resume {}", self.name));
    }
}

pub fn main() {
    let log = Mutex::new(Vec::new());
    let backlight = Stage { name: "backlight", log: &log };
    let touch = Stage { name: "touch", log: &log };
    let audio = Stage { name: "audio", log: &log };

    let chain: SuspendChain<'_, Platform, 8> = SuspendChain::new(Platform::default());
    chain.register(150, &touch).unwrap();
    chain.register(50, &backlight).unwrap();

    // ========== Go to Sleep ==========
    chain.request(PowerState::Mem);
    // The platform's worker runs the queued task
    assert_eq!(chain.run_pending(), 1);
    assert!(chain.is_suspended());
    assert_eq!(chain.platform().syncs.load(Ordering::SeqCst), 1);
    // The guard is dropped once the handlers are down
    assert_eq!(chain.platform().released.load(Ordering::SeqCst), 1);

    // Late registration is suspended on the spot
    chain.register(100, &audio).unwrap();

    // ========== Wake Up ==========
    chain.request(PowerState::On);
    assert_eq!(chain.platform().acquired.load(Ordering::SeqCst), 1);
    chain.run_pending();
    assert!(!chain.is_suspended());

    let log = log.lock().unwrap().clone();
    for line in &log {
        println!("{line}");
    }
    assert_eq!(
        log,
        [
            "suspend backlight (Normal)",
            "suspend touch (Normal)",
            "suspend audio (Normal)",
            "resume touch",
            "resume audio",
            "resume backlight",
        ]
    );
}
