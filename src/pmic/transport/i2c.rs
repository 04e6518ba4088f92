use embedded_hal::i2c::I2c;

use crate::pmic::transport::{BusKind, RegMsg, Transport};

/// Default 7-bit slave address of the device.
pub const DEFAULT_ADDRESS: u8 = 0x48;

/// I2C framing: register address byte, then data.
///
/// I2C carries a full 8-bit register address, so both pages are reached
/// directly without page switching.
pub struct I2cTransport<I> {
    bus: I,
    address: u8,
}

impl<I: I2c> I2cTransport<I> {
    pub fn new(bus: I) -> Self {
        Self::with_address(bus, DEFAULT_ADDRESS)
    }

    pub fn with_address(bus: I, address: u8) -> Self {
        Self { bus, address }
    }

    pub fn release(self) -> I {
        self.bus
    }
}

impl<I: I2c> Transport for I2cTransport<I> {
    type Error = I::Error;

    fn bus_kind(&self) -> BusKind {
        BusKind::I2c
    }

    fn read(&mut self, addr: u16) -> Result<u8, Self::Error> {
        let mut buf = [0u8; 1];
        self.bus.write_read(self.address, &[addr as u8], &mut buf)?;
        Ok(buf[0])
    }

    fn write(&mut self, addr: u16, value: u8) -> Result<(), Self::Error> {
        self.bus.write(self.address, &[addr as u8, value])
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

#[cfg(test)]
mod tests {
    use embedded_hal::i2c::{ErrorKind, ErrorType, Operation};

    use super::*;
    use crate::pmic::regs;

    /// Tiny register file behind an I2C slave address.
    struct FakeI2c {
        regs: [u8; 256],
        pointer: usize,
        address: u8,
    }

    impl FakeI2c {
        fn new(address: u8) -> Self {
            Self {
                regs: [0; 256],
                pointer: 0,
                address,
            }
        }
    }

    impl ErrorType for FakeI2c {
        type Error = ErrorKind;
    }

    impl I2c for FakeI2c {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), ErrorKind> {
            if address != self.address {
                return Err(ErrorKind::Other);
            }
            for op in operations {
                match op {
                    Operation::Write(bytes) => {
                        self.pointer = bytes[0] as usize;
                        if let Some(&value) = bytes.get(1) {
                            self.regs[self.pointer] = value;
                        }
                    }
                    Operation::Read(buf) => {
                        for b in buf.iter_mut() {
                            *b = self.regs[self.pointer];
                        }
                    }
                }
            }
            Ok(())
        }
    }

    #[test]
    fn write_then_read_both_pages() {
        let mut t = I2cTransport::new(FakeI2c::new(DEFAULT_ADDRESS));

        t.write(regs::CONTROLA, 0x11).unwrap();
        t.write(regs::CHIPID, 0xA3).unwrap();

        assert_eq!(t.read(regs::CONTROLA).unwrap(), 0x11);
        assert_eq!(t.read(regs::CHIPID).unwrap(), 0xA3);
    }

    #[test]
    fn wrong_address_surfaces_bus_error() {
        let mut t = I2cTransport::with_address(FakeI2c::new(0x49), DEFAULT_ADDRESS);
        assert_eq!(t.read(regs::CONTROLA), Err(ErrorKind::Other));
    }

    #[test]
    fn batch_round_trip() {
        let mut t = I2cTransport::new(FakeI2c::new(DEFAULT_ADDRESS));
        t.write_many(&[RegMsg::new(regs::COUNTS, 5), RegMsg::new(regs::COUNTMI, 6)])
            .unwrap();

        let mut msgs = [RegMsg::read(regs::COUNTS), RegMsg::read(regs::COUNTMI)];
        t.read_many(&mut msgs).unwrap();
        assert_eq!(msgs[0].data, 5);
        assert_eq!(msgs[1].data, 6);
    }
}
