//! Serial-bus transport seam.
//!
//! All register I/O funnels through a [`Transport`]. The concrete backend is
//! either SPI or I2C, carried as the [`Bus`] tagged union. Only one bus kind
//! may be bound per [`BusBinding`]; the first device to initialize claims it.

use core::sync::atomic::{AtomicU8, Ordering};

use crate::pmic::PmicError;

pub mod i2c;
pub mod spi;

pub use i2c::I2cTransport;
pub use spi::SpiTransport;

/// One register address/value pair of a single or batch transfer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RegMsg {
    pub addr: u16,
    pub data: u8,
}

impl RegMsg {
    #[inline]
    pub const fn new(addr: u16, data: u8) -> Self {
        Self { addr, data }
    }

    /// A read request; `data` is filled in by the transport.
    #[inline]
    pub const fn read(addr: u16) -> Self {
        Self { addr, data: 0 }
    }
}

/// Which serial bus a transport drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusKind {
    Spi,
    I2c,
}

/// Raw register I/O over a serial control bus.
///
/// Implementations perform no retries and no caching. Batch calls report one
/// aggregate result for the whole request.
pub trait Transport {
    type Error: core::fmt::Debug;

    /// The bus this transport drives.
    fn bus_kind(&self) -> BusKind;

    fn read(&mut self, addr: u16) -> Result<u8, Self::Error>;

    fn write(&mut self, addr: u16, value: u8) -> Result<(), Self::Error>;

    /// Reads every message's register, storing the result in `data`.
    fn read_many(&mut self, msgs: &mut [RegMsg]) -> Result<(), Self::Error>;

    /// Writes every message's `data` to its register.
    fn write_many(&mut self, msgs: &[RegMsg]) -> Result<(), Self::Error>;
}

/// Error of either bus backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError<SE, IE> {
    Spi(SE),
    I2c(IE),
}

/// Transport selected at bring-up: an SPI or an I2C backend.
pub enum Bus<S, I> {
    Spi(S),
    I2c(I),
}

impl<S, I> Transport for Bus<S, I>
where
    S: Transport,
    I: Transport,
{
    type Error = BusError<S::Error, I::Error>;

    fn bus_kind(&self) -> BusKind {
        match self {
            Bus::Spi(_) => BusKind::Spi,
            Bus::I2c(_) => BusKind::I2c,
        }
    }

    fn read(&mut self, addr: u16) -> Result<u8, Self::Error> {
        match self {
            Bus::Spi(t) => t.read(addr).map_err(BusError::Spi),
            Bus::I2c(t) => t.read(addr).map_err(BusError::I2c),
        }
    }

    fn write(&mut self, addr: u16, value: u8) -> Result<(), Self::Error> {
        match self {
            Bus::Spi(t) => t.write(addr, value).map_err(BusError::Spi),
            Bus::I2c(t) => t.write(addr, value).map_err(BusError::I2c),
        }
    }

    fn read_many(&mut self, msgs: &mut [RegMsg]) -> Result<(), Self::Error> {
        match self {
            Bus::Spi(t) => t.read_many(msgs).map_err(BusError::Spi),
            Bus::I2c(t) => t.read_many(msgs).map_err(BusError::I2c),
        }
    }

    fn write_many(&mut self, msgs: &[RegMsg]) -> Result<(), Self::Error> {
        match self {
            Bus::Spi(t) => t.write_many(msgs).map_err(BusError::Spi),
            Bus::I2c(t) => t.write_many(msgs).map_err(BusError::I2c),
        }
    }
}

const UNBOUND: u8 = 0;
const BOUND_SPI: u8 = 1;
const BOUND_I2C: u8 = 2;

/// Exclusive claim of one bus kind.
///
/// The first [`bind`](Self::bind) wins; later binds of the same kind succeed,
/// binds of the other kind fail with [`PmicError::TransportAlreadyBound`].
#[derive(Debug)]
pub struct BusBinding {
    state: AtomicU8,
}

/// Process-wide binding used by devices that are not given their own.
pub static BUS_BINDING: BusBinding = BusBinding::new();

impl BusBinding {
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(UNBOUND),
        }
    }

    pub fn bind(&self, kind: BusKind) -> Result<(), PmicError> {
        let want = match kind {
            BusKind::Spi => BOUND_SPI,
            BusKind::I2c => BOUND_I2C,
        };

        match self
            .state
            .compare_exchange(UNBOUND, want, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => Ok(()),
            Err(current) if current == want => Ok(()),
            Err(_) => Err(PmicError::TransportAlreadyBound),
        }
    }

    /// The bus kind currently bound, if any.
    pub fn bound(&self) -> Option<BusKind> {
        match self.state.load(Ordering::Acquire) {
            BOUND_SPI => Some(BusKind::Spi),
            BOUND_I2C => Some(BusKind::I2c),
            _ => None,
        }
    }
}

impl Default for BusBinding {
    fn default() -> Self {
        Self::new()
    }
}
