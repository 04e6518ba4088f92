use embedded_hal::spi::SpiDevice;

use crate::pmic::{
    regs,
    transport::{BusKind, RegMsg, Transport},
};

const READ_FLAG: u8 = 0x01;
const PAGE_SELECT: u8 = 0x80;

/// Two-byte SPI framing: `(reg << 1) | rw` followed by the data byte.
///
/// Only seven register address bits fit in the command byte, so page 1 is
/// reached by flipping the page-control register first. The selected page is
/// tracked to avoid redundant page switches.
pub struct SpiTransport<D> {
    dev: D,
    page: u8,
}

impl<D: SpiDevice> SpiTransport<D> {
    /// Wraps a device assumed to be on page 0, as after reset.
    pub fn new(dev: D) -> Self {
        Self { dev, page: 0 }
    }

    pub fn release(self) -> D {
        self.dev
    }

    fn select_page(&mut self, addr: u16) -> Result<u8, D::Error> {
        let page = u8::from(addr > regs::PAGE0_END);
        if page != self.page {
            // The page-control register sits at local offset 0 of both pages.
            self.dev.write(&[0, page * PAGE_SELECT])?;
            self.page = page;
        }
        Ok((addr & 0x7F) as u8)
    }
}

impl<D: SpiDevice> Transport for SpiTransport<D> {
    type Error = D::Error;

    fn bus_kind(&self) -> BusKind {
        BusKind::Spi
    }

    fn read(&mut self, addr: u16) -> Result<u8, Self::Error> {
        let reg = self.select_page(addr)?;
        let mut frame = [(reg << 1) | READ_FLAG, 0];
        self.dev.transfer_in_place(&mut frame)?;
        Ok(frame[1])
    }

    fn write(&mut self, addr: u16, value: u8) -> Result<(), Self::Error> {
        let reg = self.select_page(addr)?;
        self.dev.write(&[reg << 1, value])
    }

    fn read_many(&mut self, msgs: &mut [RegMsg]) -> Result<(), Self::Error> {
        for msg in msgs.iter_mut() {
            msg.data = self.read(msg.addr)?;
        }
        Ok(())
    }

    fn write_many(&mut self, msgs: &[RegMsg]) -> Result<(), Self::Error> {
        for msg in msgs {
            self.write(msg.addr, msg.data)?;
        }
        Ok(())
    }
}
