use bitmaps::{Bits, BitsImpl};

use crate::pmic::{
    PmicError,
    cache::{RegisterCache, RegisterEntry},
    policy::VolatilityPolicy,
    regs,
    transport::{RegMsg, Transport},
};

/// Cached register access on top of a [`Transport`].
///
/// Reads of a register with a valid cached copy never touch the bus. Writes
/// always go to the bus and update the cache only after the bus reports
/// success. Obtained through [`Pmic::with_registers`](crate::pmic::Pmic::with_registers),
/// which holds the device lock for the duration of the closure.
pub struct RegisterMap<T, const N: usize>
where
    T: Transport,
    BitsImpl<N>: Bits,
{
    transport: T,
    cache: RegisterCache<N>,
}

impl<T, const N: usize> core::fmt::Debug for RegisterMap<T, N>
where
    T: Transport,
    BitsImpl<N>: Bits,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RegisterMap")
            .field("valid", &self.cache.valid_count())
            .finish_non_exhaustive()
    }
}

fn check_address(addr: u16) -> Result<(), PmicError> {
    if regs::is_valid_address(addr) {
        Ok(())
    } else {
        Err(PmicError::InvalidRegister)
    }
}

fn check_batch(msgs: &[RegMsg]) -> Result<(), PmicError> {
    if msgs.len() > regs::MAX_BATCH {
        return Err(PmicError::TooManyRegisters);
    }
    msgs.iter().try_for_each(|m| check_address(m.addr))
}

fn bus_failure<E: core::fmt::Debug>(op: &str, addr: u16, err: E) -> PmicError {
    warn!("{op} at {addr:#04x} failed: {err:?}");
    PmicError::TransportFailure
}

impl<T, const N: usize> RegisterMap<T, N>
where
    T: Transport,
    BitsImpl<N>: Bits,
{
    pub(crate) fn new<P: VolatilityPolicy>(transport: T, policy: &P) -> Self {
        Self {
            transport,
            cache: RegisterCache::new(policy),
        }
    }

    /// Reads one register, from the cache when a valid copy exists.
    pub fn read(&mut self, addr: u16) -> Result<u8, PmicError> {
        check_address(addr)?;

        if let Some(value) = self.cache.lookup(addr) {
            return Ok(value);
        }

        let value = self
            .transport
            .read(addr)
            .map_err(|e| bus_failure("read", addr, e))?;
        self.cache.store(addr, value);
        Ok(value)
    }

    /// Writes one register; the cache is updated only on bus success.
    pub fn write(&mut self, addr: u16, value: u8) -> Result<(), PmicError> {
        check_address(addr)?;

        self.transport
            .write(addr, value)
            .map_err(|e| bus_failure("write", addr, e))?;
        self.cache.store(addr, value);
        Ok(())
    }

    /// Reads every message's register from the bus in one batch.
    ///
    /// Batch reads always hit the bus. On success each non-volatile entry is
    /// cached; on failure each is invalidated, since the aggregate result does
    /// not say which transfers completed.
    pub fn read_many(&mut self, msgs: &mut [RegMsg]) -> Result<(), PmicError> {
        check_batch(msgs)?;
        let first = msgs.first().map_or(0, |m| m.addr);

        match self.transport.read_many(msgs) {
            Ok(()) => {
                msgs.iter().for_each(|m| self.cache.store(m.addr, m.data));
                Ok(())
            }
            Err(e) => {
                msgs.iter().for_each(|m| self.cache.invalidate(m.addr));
                Err(bus_failure("batch read", first, e))
            }
        }
    }

    /// Writes every message in one batch, with the same cache rule as
    /// [`read_many`](Self::read_many).
    pub fn write_many(&mut self, msgs: &[RegMsg]) -> Result<(), PmicError> {
        check_batch(msgs)?;
        let first = msgs.first().map_or(0, |m| m.addr);

        match self.transport.write_many(msgs) {
            Ok(()) => {
                msgs.iter().for_each(|m| self.cache.store(m.addr, m.data));
                Ok(())
            }
            Err(e) => {
                msgs.iter().for_each(|m| self.cache.invalidate(m.addr));
                Err(bus_failure("batch write", first, e))
            }
        }
    }

    /// Read-modify-write of the bits selected by `mask`. Returns the new value.
    pub fn update_bits(&mut self, addr: u16, mask: u8, bits: u8) -> Result<u8, PmicError> {
        let old = self.read(addr)?;
        let new = (old & !mask) | (bits & mask);
        if new != old {
            self.write(addr, new)?;
        }
        Ok(new)
    }

    /// Snapshot of the cache slot for `addr`.
    pub fn entry(&self, addr: u16) -> Option<RegisterEntry> {
        self.cache.entry(addr)
    }

    /// Forces the next read of `addr` onto the bus.
    pub fn invalidate(&mut self, addr: u16) {
        self.cache.invalidate(addr);
    }

    /// Drops every cached value, e.g. after the device has been reset.
    pub fn invalidate_all(&mut self) {
        self.cache.invalidate_all();
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}
