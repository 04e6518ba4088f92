//! Event notifier registry.
//!
//! Subscribers are linked into one ordered list per event type. Delivery walks
//! event types in ascending index order and, within one type, calls handlers in
//! registration order. Every handler receives the full pending mask and picks
//! out the bits it cares about.

use core::sync::atomic::{AtomicU32, Ordering};

use heapless::Vec;

use crate::pmic::{
    PmicError,
    lock::{CancelToken, EventLock},
};

/// Number of distinct event types (one per status bit).
pub const EVENT_TYPE_COUNT: usize = 32;

/// Index of one event-status bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventType(pub u8);

impl EventType {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn is_valid(self) -> bool {
        self.index() < EVENT_TYPE_COUNT
    }

    /// Mask bit of this event, or zero if the index is out of range.
    #[inline]
    const fn bit(self) -> u32 {
        if self.is_valid() { 1 << self.0 } else { 0 }
    }
}

/// Pending-event bitmask assembled from the four event-status registers.
///
/// Bit `i` of status byte `k` maps to mask bit `8k + i`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventMask(pub u32);

impl EventMask {
    pub const NONE: EventMask = EventMask(0);

    #[inline]
    pub const fn from_status_bytes(bytes: [u8; 4]) -> Self {
        Self(u32::from_le_bytes(bytes))
    }

    #[inline]
    pub const fn status_bytes(&self) -> [u8; 4] {
        self.0.to_le_bytes()
    }

    #[inline]
    pub const fn of(event: EventType) -> Self {
        Self(event.bit())
    }

    #[inline]
    pub const fn with(self, event: EventType) -> Self {
        Self(self.0 | event.bit())
    }

    #[inline]
    pub const fn contains(&self, event: EventType) -> bool {
        self.0 & event.bit() != 0
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Iterates the set event types in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = EventType> + '_ {
        (0..EVENT_TYPE_COUNT as u8)
            .map(EventType)
            .filter(|e| self.contains(*e))
    }
}

macro_rules! event_types {
    ($($name:ident = $idx:literal),* $(,)?) => {
        impl EventType {
            $(pub const $name: EventType = EventType($idx);)*

            /// Symbolic name of the event, for diagnostics.
            pub const fn name(&self) -> &'static str {
                match self.0 {
                    $($idx => stringify!($name),)*
                    _ => "INVALID",
                }
            }
        }

        impl EventMask {
            paste::paste! {
                $(
                    #[doc = "Returns true if the `" $name "` bit is set."]
                    #[inline]
                    pub const fn [<$name:lower>](&self) -> bool {
                        self.0 & (1 << $idx) != 0
                    }
                )*
            }
        }
    };
}

event_types! {
    DCIN_DET = 0,
    VBUS_DET = 1,
    DCIN_REM = 2,
    VBUS_REM = 3,
    VDD_LOW = 4,
    ALARM = 5,
    SEQ_RDY = 6,
    COMP_1V2 = 7,
    ONKEY = 8,
    ID_FLOAT = 9,
    ID_GND = 10,
    CHG_END = 11,
    TBAT = 12,
    ADC_EOM = 13,
    PEN_DOWN = 14,
    TSI_READY = 15,
    GPI0 = 16,
    GPI1 = 17,
    GPI2 = 18,
    GPI3 = 19,
    GPI4 = 20,
    GPI5 = 21,
    GPI6 = 22,
    GPI7 = 23,
    GPI8 = 24,
    GPI9 = 25,
    GPI10 = 26,
    GPI11 = 27,
    GPI12 = 28,
    GPI13 = 29,
    GPI14 = 30,
    GPI15 = 31,
}

/// Receives pending-event notifications.
///
/// Called from the worker context with the registry lock held: handlers must
/// be quick and must not register or unregister subscriptions.
pub trait EventHandler: Sync {
    fn on_event(&self, events: EventMask);
}

/// Stable handle returned by registration, used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u32);

#[derive(Clone, Copy)]
struct Subscription<'a> {
    id: SubscriptionId,
    handler: &'a dyn EventHandler,
}

type Lists<'a, const N: usize> = [Vec<Subscription<'a>, N>; EVENT_TYPE_COUNT];

/// Per-event-type ordered subscriber lists.
///
/// `N` bounds the number of subscribers per event type. The registry only
/// borrows handlers; their owners keep them alive for `'a`.
pub struct EventRegistry<'a, const N: usize> {
    lists: EventLock<Lists<'a, N>>,
    occupied: AtomicU32,
    next_id: AtomicU32,
}

impl<'a, const N: usize> core::fmt::Debug for EventRegistry<'a, N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventRegistry")
            .field("occupied", &EventMask(self.occupied.load(Ordering::Relaxed)))
            .finish_non_exhaustive()
    }
}

impl<'a, const N: usize> Default for EventRegistry<'a, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, const N: usize> EventRegistry<'a, N> {
    pub const fn new() -> Self {
        Self {
            lists: EventLock::new([const { Vec::new() }; EVENT_TYPE_COUNT]),
            occupied: AtomicU32::new(0),
            next_id: AtomicU32::new(0),
        }
    }

    /// Subscribes `handler` to `event` without waiting for the registry lock.
    pub fn register(
        &self,
        event: EventType,
        handler: &'a dyn EventHandler,
    ) -> Result<SubscriptionId, PmicError> {
        if !event.is_valid() {
            return Err(PmicError::InvalidEventType);
        }
        let mut lists = self.lists.try_lock()?;
        self.link(&mut lists, event, handler)
    }

    /// Subscribes `handler` to `event`, waiting for the registry lock until
    /// `cancel` fires.
    pub fn register_interruptible(
        &self,
        event: EventType,
        handler: &'a dyn EventHandler,
        cancel: &CancelToken,
    ) -> Result<SubscriptionId, PmicError> {
        if !event.is_valid() {
            return Err(PmicError::InvalidEventType);
        }
        let mut lists = self.lists.lock_interruptible(cancel)?;
        self.link(&mut lists, event, handler)
    }

    fn link(
        &self,
        lists: &mut Lists<'a, N>,
        event: EventType,
        handler: &'a dyn EventHandler,
    ) -> Result<SubscriptionId, PmicError> {
        let list = &mut lists[event.index()];
        let duplicate = list.iter().any(|s| {
            core::ptr::addr_eq(
                s.handler as *const dyn EventHandler,
                handler as *const dyn EventHandler,
            )
        });
        if duplicate {
            return Err(PmicError::InvalidHandler);
        }

        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        list.push(Subscription { id, handler })
            .map_err(|_| PmicError::RegistryFull)?;
        self.occupied.fetch_or(event.bit(), Ordering::Release);

        debug!("subscribed {:?} to {}", id, event.name());
        Ok(id)
    }

    /// Removes a subscription. Unknown or already removed ids are a no-op.
    pub fn unregister(&self, id: SubscriptionId) -> Result<(), PmicError> {
        let mut lists = self.lists.try_lock()?;
        self.unlink(&mut lists, id);
        Ok(())
    }

    pub fn unregister_interruptible(
        &self,
        id: SubscriptionId,
        cancel: &CancelToken,
    ) -> Result<(), PmicError> {
        let mut lists = self.lists.lock_interruptible(cancel)?;
        self.unlink(&mut lists, id);
        Ok(())
    }

    fn unlink(&self, lists: &mut Lists<'a, N>, id: SubscriptionId) {
        for (idx, list) in lists.iter_mut().enumerate() {
            if let Some(pos) = list.iter().position(|s| s.id == id) {
                list.remove(pos);
                if list.is_empty() {
                    self.occupied.fetch_and(!(1 << idx), Ordering::Release);
                }
                debug!("unsubscribed {:?}", id);
                return;
            }
        }
    }

    /// True if at least one handler is subscribed to `event`. Lock-free.
    pub fn has_subscribers(&self, event: EventType) -> bool {
        self.occupied.load(Ordering::Acquire) & event.bit() != 0
    }

    /// Number of registry lock acquisitions so far.
    pub fn lock_acquisitions(&self) -> usize {
        self.lists.acquisitions()
    }

    /// Delivers `events` to the subscribers of every set bit.
    ///
    /// The registry lock is taken once per set event type and held while
    /// that type's handlers run. A set `PEN_DOWN` bit with no subscribers is
    /// skipped without touching the lock.
    pub fn dispatch(&self, events: EventMask, cancel: &CancelToken) -> Result<(), PmicError> {
        for event in events.iter() {
            if event == EventType::PEN_DOWN && !self.has_subscribers(event) {
                continue;
            }

            let lists = self.lists.lock_interruptible(cancel).inspect_err(|_| {
                warn!("registry lock wait interrupted at {}", event.name());
            })?;
            for sub in lists[event.index()].iter() {
                sub.handler.on_event(events);
            }
        }
        Ok(())
    }
}
