use crate::pmic::regs;

/// Decides which registers the hardware may change on its own.
///
/// Volatile registers are never served from the cache.
pub trait VolatilityPolicy {
    /// Returns true if the register at `addr` must always be read from the bus.
    fn is_volatile(&self, addr: u16) -> bool;
}

/// Volatility map of the stock register layout.
///
/// Status, event, fault-log, ADC result, touchscreen sample and RTC counter
/// registers are volatile; everything else only changes on explicit writes.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultVolatility {}

const VOLATILE_RANGES: &[(u16, u16)] = &[
    (regs::STATUSA, regs::FAULTLOG),
    (regs::ADCMAN, regs::ADCMAN),
    (regs::ADCRESL, regs::VDDRES),
    (regs::ICHGAV, regs::ICHGAV),
    (regs::TBATRES, regs::TBATRES),
    (regs::ADCIN4RES, regs::ADCIN4RES),
    (regs::ADCIN5RES, regs::ADCIN5RES),
    (regs::ADCIN6RES, regs::ADCIN6RES),
    (regs::TJUNCRES, regs::TJUNCRES),
    (regs::TSIXMSB, regs::TSIZMSB),
    (regs::COUNTS, regs::COUNTY),
];

impl VolatilityPolicy for DefaultVolatility {
    fn is_volatile(&self, addr: u16) -> bool {
        VOLATILE_RANGES
            .iter()
            .any(|&(start, end)| addr >= start && addr <= end)
    }
}

/// Policy that disables caching entirely.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllVolatile {}

impl VolatilityPolicy for AllVolatile {
    fn is_volatile(&self, _addr: u16) -> bool {
        true
    }
}

/// Policy that caches every register.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoneVolatile {}

impl VolatilityPolicy for NoneVolatile {
    fn is_volatile(&self, _addr: u16) -> bool {
        false
    }
}
