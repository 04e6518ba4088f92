use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use embedded_hal::delay::DelayNs;
use spin::Mutex;

use crate::pmic::{
    PmicError,
    config::PmicConfig,
    events::{EventHandler, EventMask, EventRegistry, EventType, SubscriptionId},
    irq::{IrqLine, IrqReturn, IrqTrigger, PipelineCell, PipelineState, RearmGuard},
    lock::CancelToken,
    policy::VolatilityPolicy,
    registers::RegisterMap,
    regs,
    subdevice::{Subdevice, SubdeviceRegistrar},
    transport::{BusBinding, RegMsg, Transport},
};

/// Silicon revision read from the chip-ID register at init.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ChipVersion {
    Unknown = 0,
    Aa = 1,
    Bb = 2,
}

impl ChipVersion {
    pub fn from_chip_id(chip_id: u8) -> Self {
        match chip_id & regs::CHIPID_MRC {
            regs::CHIPID_MRC_AA => ChipVersion::Aa,
            regs::CHIPID_MRC_BB => ChipVersion::Bb,
            _ => ChipVersion::Unknown,
        }
    }

    fn from_raw(raw: u8) -> Self {
        match raw {
            1 => ChipVersion::Aa,
            2 => ChipVersion::Bb,
            _ => ChipVersion::Unknown,
        }
    }
}

/// Register cache type covering both pages.
pub type Registers<T> = RegisterMap<T, { regs::REGISTER_COUNT }>;

/// One power-management device instance.
///
/// Owns the cached register map behind the device lock, the event registry,
/// and the interrupt pipeline. Share it by reference between the interrupt
/// handler, the bottom-half worker and sub-device drivers.
///
/// `N` bounds the subscribers per event type.
pub struct Pmic<'a, T, L, D, const N: usize>
where
    T: Transport,
    L: IrqLine,
    D: DelayNs,
{
    registers: Mutex<Registers<T>>,
    events: EventRegistry<'a, N>,
    irq: L,
    delay: Mutex<D>,
    config: PmicConfig,
    binding: &'a BusBinding,
    pending: AtomicBool,
    pipeline: PipelineCell,
    chip_version: AtomicU8,
    irq_requested: AtomicBool,
    cancel: CancelToken,
}

impl<'a, T, L, D, const N: usize> core::fmt::Debug for Pmic<'a, T, L, D, N>
where
    T: Transport,
    L: IrqLine,
    D: DelayNs,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Pmic")
            .field("chip_version", &self.chip_version())
            .field("pipeline", &self.pipeline.get())
            .finish_non_exhaustive()
    }
}

impl<'a, T, L, D, const N: usize> Pmic<'a, T, L, D, N>
where
    T: Transport,
    L: IrqLine,
    D: DelayNs,
{
    pub(crate) fn new<P: VolatilityPolicy>(
        transport: T,
        policy: &P,
        irq: L,
        delay: D,
        config: PmicConfig,
        binding: &'a BusBinding,
    ) -> Self {
        Self {
            registers: Mutex::new(RegisterMap::new(transport, policy)),
            events: EventRegistry::new(),
            irq,
            delay: Mutex::new(delay),
            config,
            binding,
            pending: AtomicBool::new(false),
            pipeline: PipelineCell::new(),
            chip_version: AtomicU8::new(ChipVersion::Unknown as u8),
            irq_requested: AtomicBool::new(false),
            cancel: CancelToken::new(),
        }
    }

    /// Runs `f` with the device lock held.
    ///
    /// Every register access goes through here so that cache and transport
    /// are serialized. Must not be called from interrupt context.
    pub fn with_registers<R>(&self, f: impl FnOnce(&mut Registers<T>) -> R) -> R {
        let mut registers = self.registers.lock();
        f(&mut registers)
    }

    /// Brings the device up.
    ///
    /// Claims the bus binding, registers `subdevices`, programs the interrupt
    /// masks and power-key debounce, probes the silicon revision, then
    /// requests the interrupt line (level-low) and marks it wake-capable.
    ///
    /// A device that was torn down may be brought up again.
    pub fn init<R: SubdeviceRegistrar>(
        &self,
        registrar: &mut R,
        subdevices: &[Subdevice<'_>],
    ) -> Result<(), PmicError> {
        self.cancel.reset();

        let kind = self.with_registers(|r| r.transport().bus_kind());
        self.binding.bind(kind).inspect_err(|_| {
            error!("{kind:?} transport rejected: bus already bound to {:?}", self.binding.bound());
        })?;

        for sub in subdevices {
            registrar.add_device(sub.name, sub.config).map_err(|e| {
                error!("failed to add sub-device {}: {e:?}", sub.name);
                PmicError::SubdeviceFailed
            })?;
        }

        let chip_id = self.with_registers(|r| {
            let [a, b, c] = self.config.irq_masks;
            r.write(regs::IRQMASKA, a)?;
            r.write(regs::IRQMASKB, b)?;
            r.write(regs::IRQMASKC, c)?;

            if let Some(code) = self.config.debounce {
                r.update_bits(
                    regs::CONTROLC,
                    regs::CONTROLC_DEBOUNCING | regs::CONTROLC_PMFB2PIN,
                    code & regs::CONTROLC_DEBOUNCING,
                )?;
            }

            r.read(regs::CHIPID)
        })?;

        let version = ChipVersion::from_chip_id(chip_id);
        self.chip_version.store(version as u8, Ordering::Release);
        info!("chip id {chip_id:#04x}, revision {version:?}");

        self.irq.request(IrqTrigger::LevelLow).map_err(|e| {
            error!("interrupt request failed: {e:?}");
            PmicError::IrqRequestFailed
        })?;
        self.irq_requested.store(true, Ordering::Release);
        self.irq.enable_wake();

        Ok(())
    }

    /// Releases the interrupt line and aborts pending registry waits.
    ///
    /// Safe to call more than once.
    pub fn teardown(&self) {
        self.cancel.cancel();
        if self.irq_requested.swap(false, Ordering::AcqRel) {
            self.irq.free();
            info!("interrupt line released");
        }
    }

    /// Top half. Masks the line and flags the bottom half; never blocks.
    pub fn handle_irq(&self) -> IrqReturn {
        if self.pending.swap(true, Ordering::AcqRel) {
            return IrqReturn::None;
        }
        self.irq.disable_nosync();
        self.pipeline.set(PipelineState::Triggered);
        IrqReturn::WakeThread
    }

    /// Bottom half, run from the worker after [`handle_irq`](Self::handle_irq).
    ///
    /// Reads the four event registers, delivers the assembled mask to the
    /// subscribers, acknowledges the asserted bits and unmasks the line. A
    /// zero mask is a spurious trigger and returns quietly. Whatever fails,
    /// the line is unmasked before returning.
    pub fn run_bottom_half(&self) -> Result<(), PmicError> {
        if !self.pending.swap(false, Ordering::AcqRel) {
            return Ok(());
        }

        let rearm = RearmGuard::new(&self.irq, &self.pipeline);

        self.pipeline.set(PipelineState::Draining);
        let mut status = [
            RegMsg::read(regs::EVENTA),
            RegMsg::read(regs::EVENTB),
            RegMsg::read(regs::EVENTC),
            RegMsg::read(regs::EVENTD),
        ];
        self.with_registers(|r| r.read_many(&mut status))?;

        let events = EventMask::from_status_bytes(status.map(|m| m.data));
        if events.is_empty() {
            debug!("spurious interrupt");
            return Ok(());
        }

        self.pipeline.set(PipelineState::Dispatching);
        debug!("events {:#010x}", events.bits());
        let delivered = self.events.dispatch(events, &self.cancel);

        self.pipeline.set(PipelineState::Clearing);
        self.with_registers(|r| {
            status
                .iter()
                .filter(|m| m.data != 0)
                .try_for_each(|m| r.write(m.addr, m.data))
        })?;

        self.pipeline.set(PipelineState::Rearming);
        self.delay.lock().delay_us(self.config.settle_delay_us);
        drop(rearm);

        delivered
    }

    /// Subscribes `handler` to `event`; fails with `LockUnavailable` if the
    /// registry is busy.
    pub fn register_event(
        &self,
        event: EventType,
        handler: &'a dyn EventHandler,
    ) -> Result<SubscriptionId, PmicError> {
        self.events.register(event, handler)
    }

    /// Subscribes `handler` to `event`, waiting for the registry until
    /// `cancel` fires.
    pub fn register_event_interruptible(
        &self,
        event: EventType,
        handler: &'a dyn EventHandler,
        cancel: &CancelToken,
    ) -> Result<SubscriptionId, PmicError> {
        self.events.register_interruptible(event, handler, cancel)
    }

    pub fn unregister_event(&self, id: SubscriptionId) -> Result<(), PmicError> {
        self.events.unregister(id)
    }

    pub fn events(&self) -> &EventRegistry<'a, N> {
        &self.events
    }

    pub fn chip_version(&self) -> ChipVersion {
        ChipVersion::from_raw(self.chip_version.load(Ordering::Acquire))
    }

    /// Sets the shutdown bit in CONTROLB.
    pub fn power_off(&self) -> Result<(), PmicError> {
        self.with_registers(|r| {
            let value = r.read(regs::CONTROLB)? | regs::CONTROLB_SHUTDOWN;
            info!("shutdown: CONTROLB={value:#04x}");
            r.write(regs::CONTROLB, value)
        })
    }

    pub fn pipeline_state(&self) -> PipelineState {
        self.pipeline.get()
    }

    pub fn irq_line(&self) -> &L {
        &self.irq
    }

    pub fn config(&self) -> &PmicConfig {
        &self.config
    }
}
