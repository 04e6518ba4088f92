//! Basic example: bring-up and one interrupt cycle
//!
//! This example demonstrates:
//! - Building a device with the typestate builder
//! - Bring-up with sub-device registration and chip-revision probing
//! - Subscribing a handler to an event type
//! - Top half / bottom half split of one interrupt
//! - Cached register reads

use std::cell::Cell;
use std::sync::atomic::{AtomicU32, Ordering};

use embedded_hal::delay::DelayNs;
use pmic_core::pmic::{Subdevice, regs};
use pmic_core::prelude::*;

// ============ Simulated Hardware ============

/// Register file behind an I2C bus. Event registers are write-1-to-clear.
struct SimBus {
    regs: [u8; regs::REGISTER_COUNT],
    transfers: usize,
}

impl SimBus {
    fn new() -> Self {
        let mut file = [0; regs::REGISTER_COUNT];
        file[regs::CHIPID as usize] = regs::CHIPID_MRC_BB;
        Self { regs: file, transfers: 0 }
    }

    fn store(&mut self, addr: u16, value: u8) {
        let slot = &mut self.regs[addr as usize];
        if (regs::EVENTA..=regs::EVENTD).contains(&addr) {
            *slot &= !value;
        } else {
            *slot = value;
        }
    }
}

impl Transport for SimBus {
    type Error = ();

    fn bus_kind(&self) -> BusKind {
        BusKind::I2c
    }

    fn read(&mut self, addr: u16) -> Result<u8, ()> {
        self.transfers += 1;
        Ok(self.regs[addr as usize])
    }

    fn write(&mut self, addr: u16, value: u8) -> Result<(), ()> {
        self.transfers += 1;
        self.store(addr, value);
        Ok(())
    }

    fn read_many(&mut self, msgs: &mut [RegMsg]) -> Result<(), ()> {
        self.transfers += 1;
        for m in msgs.iter_mut() {
            m.data = self.regs[m.addr as usize];
        }
        Ok(())
    }

    fn write_many(&mut self, msgs: &[RegMsg]) -> Result<(), ()> {
        self.transfers += 1;
        for m in msgs {
            self.store(m.addr, m.data);
        }
        Ok(())
    }
}

/// Interrupt line that only tracks whether it is masked.
#[derive(Default)]
struct SimLine {
    masked: Cell<bool>,
}

impl IrqLine for SimLine {
    type Error = ();

    fn request(&self, trigger: IrqTrigger) -> Result<(), ()> {
        assert_eq!(trigger, IrqTrigger::LevelLow);
        Ok(())
    }

    fn free(&self) {}

    fn enable(&self) {
        self.masked.set(false);
    }

    fn disable_nosync(&self) {
        self.masked.set(true);
    }

    fn enable_wake(&self) {}
}

struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

/// Prints each function block instead of creating a platform device.
struct PrintRegistrar;

impl SubdeviceRegistrar for PrintRegistrar {
    type Error = ();

    fn add_device(&mut self, name: &str, _config: Option<&[u8]>) -> Result<(), ()> {
        println!("  sub-device {name}");
        Ok(())
    }
}

// ============ Event Handler ============

/// Counts power-key presses.
#[derive(Default)]
struct PowerKey {
    presses: AtomicU32,
}

impl EventHandler for PowerKey {
    fn on_event(&self, events: EventMask) {
        if events.onkey() {
            self.presses.fetch_add(1, Ordering::Relaxed);
        }
    }
}

pub fn main() {
    let power_key = PowerKey::default();
    let binding = BusBinding::new();

    let pmic = PmicBuilder::new()
        .binding(&binding)
        .transport(SimBus::new())
        .irq_line(SimLine::default())
        .delay(NoDelay)
        .build::<4>();

    // ========== Bring-up ==========
    let subdevices = [Subdevice::new("pmic-rtc"), Subdevice::new("pmic-onkey")];
    pmic.init(&mut PrintRegistrar, &subdevices).unwrap();
    assert_eq!(pmic.chip_version(), ChipVersion::Bb);

    pmic.register_event(EventType::ONKEY, &power_key).unwrap();

    // ========== One Interrupt Cycle ==========
    // The part asserts ONKEY (EVENTB bit 0) and pulls the line low
    pmic.with_registers(|r| r.transport_mut().regs[regs::EVENTB as usize] = 0x01);

    // Interrupt context: mask and hand off
    assert_eq!(pmic.handle_irq(), IrqReturn::WakeThread);
    assert!(pmic.irq_line().masked.get());

    // Worker context: drain, dispatch, clear, rearm
    pmic.run_bottom_half().unwrap();

    assert_eq!(power_key.presses.load(Ordering::Relaxed), 1);
    assert!(!pmic.irq_line().masked.get());
    pmic.with_registers(|r| assert_eq!(r.transport().regs[regs::EVENTB as usize], 0));

    // ========== Cached Reads ==========
    // Control registers are cached after the first access
    let before = pmic.with_registers(|r| r.transport().transfers);
    let first = pmic.with_registers(|r| r.read(regs::CONTROLB)).unwrap();
    let second = pmic.with_registers(|r| r.read(regs::CONTROLB)).unwrap();
    let after = pmic.with_registers(|r| r.transport().transfers);
    assert_eq!(first, second);
    assert!(after - before <= 1);

    pmic.teardown();
    println!("power key pressed {} time(s)", power_key.presses.load(Ordering::Relaxed));
}
