//! A `no_std`, no-alloc core driver for serial-bus power-management ICs.
//!
//! This crate provides cached register access over SPI or I2C, fan-out of
//! hardware interrupt events to registered handlers, and an ordered
//! suspend/resume notifier chain.
//!
//! # Features
//!
//! - **Register cache** - Non-volatile registers are served from memory after the first access
//! - **Batch transfers** - Up to 32 registers per bus transaction
//! - **Event registry** - Per-event subscriber lists with stable handles
//! - **Interrupt pipeline** - Top half masks, bottom half drains, dispatches, clears and re-arms
//! - **Suspend chain** - Priority-ordered suspend and reverse-ordered resume
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  handle_irq()   ┌──────────────────────────────┐
//! │  IRQ line    │────────────────▶│  top half: mask line         │
//! │  (level low) │                 └──────────────┬───────────────┘
//! │              │                                │ wake worker
//! │              │                 ┌──────────────▼───────────────┐
//! │              │                 │  run_bottom_half()           │
//! │              │                 │   read EVENTA..D (one batch) │
//! │              │                 │   dispatch to handlers       │
//! │              │                 │   write back set bits        │
//! │              │◀────────────────│   settle, unmask             │
//! └──────────────┘     enable      └──────────────────────────────┘
//! ```
//!
//! - **Register access** goes through [`Pmic::with_registers`](pmic::Pmic::with_registers),
//!   which holds the device lock for the whole closure
//! - **Handlers** run in worker context with the registry lock held and may read registers
//! - **The line is unmasked** on every exit path of the bottom half, errors included
//!
//! # Example
//!
//! ```rust
//! use embedded_hal::delay::DelayNs;
//! use pmic_core::pmic::NoSubdevices;
//! use pmic_core::prelude::*;
//!
//! struct FakeBus([u8; 256]);
//!
//! impl Transport for FakeBus {
//!     type Error = ();
//!     fn bus_kind(&self) -> BusKind { BusKind::I2c }
//!     fn read(&mut self, addr: u16) -> Result<u8, ()> { Ok(self.0[addr as usize]) }
//!     fn write(&mut self, addr: u16, value: u8) -> Result<(), ()> {
//!         self.0[addr as usize] = value;
//!         Ok(())
//!     }
//!     fn read_many(&mut self, msgs: &mut [RegMsg]) -> Result<(), ()> {
//!         msgs.iter_mut().for_each(|m| m.data = self.0[m.addr as usize]);
//!         Ok(())
//!     }
//!     fn write_many(&mut self, msgs: &[RegMsg]) -> Result<(), ()> {
//!         msgs.iter().for_each(|m| self.0[m.addr as usize] = m.data);
//!         Ok(())
//!     }
//! }
//!
//! struct Line;
//!
//! impl IrqLine for Line {
//!     type Error = ();
//!     fn request(&self, _trigger: IrqTrigger) -> Result<(), ()> { Ok(()) }
//!     fn free(&self) {}
//!     fn enable(&self) {}
//!     fn disable_nosync(&self) {}
//!     fn enable_wake(&self) {}
//! }
//!
//! struct NoDelay;
//!
//! impl DelayNs for NoDelay {
//!     fn delay_ns(&mut self, _ns: u32) {}
//! }
//!
//! struct PowerKey;
//!
//! impl EventHandler for PowerKey {
//!     fn on_event(&self, events: EventMask) {
//!         if events.onkey() {
//!             // debounce, report key press...
//!         }
//!     }
//! }
//!
//! static POWER_KEY: PowerKey = PowerKey;
//!
//! let pmic = PmicBuilder::new()
//!     .transport(FakeBus([0; 256]))
//!     .irq_line(Line)
//!     .delay(NoDelay)
//!     .build::<4>();
//!
//! pmic.init(&mut NoSubdevices, &[]).unwrap();
//! pmic.register_event(EventType::ONKEY, &POWER_KEY).unwrap();
//!
//! // Interrupt context
//! if pmic.handle_irq() == IrqReturn::WakeThread {
//!     // Worker context
//!     pmic.run_bottom_half().unwrap();
//! }
//! ```

#![deny(unsafe_code)]
#![no_std]

#[macro_use]
extern crate log;

pub mod pmic;
pub mod suspend;

pub mod prelude {
    pub use crate::pmic::prelude::*;
    pub use crate::suspend::{
        HandlerId, PowerState, SuspendChain, SuspendHandler, SuspendMode, SuspendPlatform,
    };
}
