//! Test support utilities - only compiled in test builds.

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, AtomicUsize, Ordering};

use critical_section::Mutex;
use embedded_hal::delay::DelayNs;
use heapless::{String, Vec};

use crate::pmic::{
    Pmic,
    builder::PmicBuilder,
    events::{EventHandler, EventMask},
    irq::{IrqLine, IrqTrigger},
    registers::RegisterMap,
    regs,
    subdevice::SubdeviceRegistrar,
    transport::{BusBinding, BusKind, RegMsg, Transport},
};

pub type TestRegisters = RegisterMap<MockTransport, { regs::REGISTER_COUNT }>;
pub type TestPmic<'a> = Pmic<'a, MockTransport, MockIrq, CountingDelay, 4>;

/// Device wired to mocks, claiming `binding` instead of the global one.
pub fn test_pmic(binding: &BusBinding) -> TestPmic<'_> {
    PmicBuilder::new()
        .binding(binding)
        .transport(MockTransport::new())
        .irq_line(MockIrq::new())
        .delay(CountingDelay::default())
        .build()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockBusError;

/// Register file behind a fake bus.
///
/// The event registers are write-1-to-clear, like the real part.
pub struct MockTransport {
    pub regs: [u8; 256],
    pub kind: BusKind,
    pub reads: usize,
    pub writes: usize,
    pub batch_reads: usize,
    pub batch_writes: usize,
    pub fail_reads: bool,
    pub fail_writes: bool,
    /// Every register write in bus order, single or batched.
    pub write_log: Vec<RegMsg, 64>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            regs: [0; 256],
            kind: BusKind::I2c,
            reads: 0,
            writes: 0,
            batch_reads: 0,
            batch_writes: 0,
            fail_reads: false,
            fail_writes: false,
            write_log: Vec::new(),
        }
    }

    /// Total bus transactions of any kind.
    pub fn calls(&self) -> usize {
        self.reads + self.writes + self.batch_reads + self.batch_writes
    }

    /// Sets a register behind the driver's back.
    pub fn set(&mut self, addr: u16, value: u8) {
        self.regs[addr as usize] = value;
    }

    pub fn get(&self, addr: u16) -> u8 {
        self.regs[addr as usize]
    }

    fn store(&mut self, addr: u16, value: u8) {
        let slot = &mut self.regs[addr as usize];
        if (regs::EVENTA..regs::EVENTA + regs::EVENT_REG_COUNT as u16).contains(&addr) {
            *slot &= !value;
        } else {
            *slot = value;
        }
        let _ = self.write_log.push(RegMsg::new(addr, value));
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MockTransport {
    type Error = MockBusError;

    fn bus_kind(&self) -> BusKind {
        self.kind
    }

    fn read(&mut self, addr: u16) -> Result<u8, Self::Error> {
        self.reads += 1;
        if self.fail_reads {
            return Err(MockBusError);
        }
        Ok(self.get(addr))
    }

    fn write(&mut self, addr: u16, value: u8) -> Result<(), Self::Error> {
        self.writes += 1;
        if self.fail_writes {
            return Err(MockBusError);
        }
        self.store(addr, value);
        Ok(())
    }

    fn read_many(&mut self, msgs: &mut [RegMsg]) -> Result<(), Self::Error> {
        self.batch_reads += 1;
        if self.fail_reads {
            return Err(MockBusError);
        }
        for msg in msgs.iter_mut() {
            msg.data = self.get(msg.addr);
        }
        Ok(())
    }

    fn write_many(&mut self, msgs: &[RegMsg]) -> Result<(), Self::Error> {
        self.batch_writes += 1;
        if self.fail_writes {
            return Err(MockBusError);
        }
        for msg in msgs {
            self.store(msg.addr, msg.data);
        }
        Ok(())
    }
}

const NO_TRIGGER: u8 = u8::MAX;

/// Interrupt line that records what the driver did to it.
#[derive(Debug)]
pub struct MockIrq {
    depth: AtomicUsize,
    enables: AtomicUsize,
    disables: AtomicUsize,
    frees: AtomicUsize,
    trigger: AtomicU8,
    wake: AtomicBool,
    fail_request: AtomicBool,
}

impl MockIrq {
    pub fn new() -> Self {
        Self {
            depth: AtomicUsize::new(0),
            enables: AtomicUsize::new(0),
            disables: AtomicUsize::new(0),
            frees: AtomicUsize::new(0),
            trigger: AtomicU8::new(NO_TRIGGER),
            wake: AtomicBool::new(false),
            fail_request: AtomicBool::new(false),
        }
    }

    /// Make the next `request` fail.
    pub fn fail_request(&self) {
        self.fail_request.store(true, Ordering::SeqCst);
    }

    pub fn is_enabled(&self) -> bool {
        self.depth.load(Ordering::SeqCst) == 0
    }

    pub fn is_wake_enabled(&self) -> bool {
        self.wake.load(Ordering::SeqCst)
    }

    pub fn trigger(&self) -> Option<IrqTrigger> {
        match self.trigger.load(Ordering::SeqCst) {
            0 => Some(IrqTrigger::LevelLow),
            1 => Some(IrqTrigger::LevelHigh),
            2 => Some(IrqTrigger::EdgeFalling),
            3 => Some(IrqTrigger::EdgeRising),
            _ => None,
        }
    }

    pub fn enables(&self) -> usize {
        self.enables.load(Ordering::SeqCst)
    }

    pub fn disables(&self) -> usize {
        self.disables.load(Ordering::SeqCst)
    }

    pub fn frees(&self) -> usize {
        self.frees.load(Ordering::SeqCst)
    }
}

impl Default for MockIrq {
    fn default() -> Self {
        Self::new()
    }
}

impl IrqLine for MockIrq {
    type Error = ();

    fn request(&self, trigger: IrqTrigger) -> Result<(), Self::Error> {
        if self.fail_request.load(Ordering::SeqCst) {
            return Err(());
        }
        let raw = match trigger {
            IrqTrigger::LevelLow => 0,
            IrqTrigger::LevelHigh => 1,
            IrqTrigger::EdgeFalling => 2,
            IrqTrigger::EdgeRising => 3,
        };
        self.trigger.store(raw, Ordering::SeqCst);
        Ok(())
    }

    fn free(&self) {
        self.frees.fetch_add(1, Ordering::SeqCst);
        self.trigger.store(NO_TRIGGER, Ordering::SeqCst);
    }

    fn enable(&self) {
        self.enables.fetch_add(1, Ordering::SeqCst);
        let _ = self
            .depth
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |d| d.checked_sub(1));
    }

    fn disable_nosync(&self) {
        self.disables.fetch_add(1, Ordering::SeqCst);
        self.depth.fetch_add(1, Ordering::SeqCst);
    }

    fn enable_wake(&self) {
        self.wake.store(true, Ordering::SeqCst);
    }
}

/// Delay source that only adds up the requested time.
#[derive(Debug, Default)]
pub struct CountingDelay {
    pub total_ns: u64,
}

impl DelayNs for CountingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}

/// Sub-device registrar that records names and can fail on the n-th add.
#[derive(Debug, Default)]
pub struct MockRegistrar {
    pub names: Vec<String<16>, 16>,
    pub count: usize,
    pub fail_on: Option<usize>,
}

impl SubdeviceRegistrar for MockRegistrar {
    type Error = ();

    fn add_device(&mut self, name: &str, _config: Option<&[u8]>) -> Result<(), Self::Error> {
        if self.fail_on == Some(self.count) {
            return Err(());
        }
        let mut owned = String::new();
        owned.push_str(name).map_err(|_| ())?;
        self.names.push(owned).map_err(|_| ())?;
        self.count += 1;
        Ok(())
    }
}

/// Shared record of handler invocations, in call order.
pub struct CallLog {
    calls: Mutex<RefCell<Vec<u32, 32>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(RefCell::new(Vec::new())),
        }
    }

    pub fn push(&self, id: u32) {
        critical_section::with(|cs| {
            let _ = self.calls.borrow_ref_mut(cs).push(id);
        });
    }

    pub fn ids(&self) -> Vec<u32, 32> {
        critical_section::with(|cs| self.calls.borrow_ref(cs).clone())
    }
}

impl Default for CallLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Event handler that logs its id and keeps the last mask it saw.
pub struct RecordingHandler<'l> {
    id: u32,
    log: &'l CallLog,
    last: AtomicU32,
}

impl<'l> RecordingHandler<'l> {
    pub fn new(id: u32, log: &'l CallLog) -> Self {
        Self {
            id,
            log,
            last: AtomicU32::new(0),
        }
    }

    pub fn last_mask(&self) -> EventMask {
        EventMask(self.last.load(Ordering::SeqCst))
    }
}

impl EventHandler for RecordingHandler<'_> {
    fn on_event(&self, events: EventMask) {
        self.last.store(events.bits(), Ordering::SeqCst);
        self.log.push(self.id);
    }
}
