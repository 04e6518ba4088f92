use bitmaps::{Bits, BitsImpl, Bitmap};

use crate::pmic::policy::VolatilityPolicy;

/// Whether the hardware may change a register on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Volatility {
    Volatile,
    NonVolatile,
}

/// Whether a cached value mirrors the hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Invalid,
    Valid,
}

/// Snapshot of one cache slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterEntry {
    pub address: u16,
    pub volatility: Volatility,
    pub cache_status: CacheStatus,
    pub cached_value: u8,
}

/// Shadow of the non-volatile device registers, indexed by address.
///
/// Holds no lock of its own; callers serialize access through the device lock.
/// A volatile slot is never marked valid, so it can never short-circuit a read.
pub(crate) struct RegisterCache<const N: usize>
where
    BitsImpl<N>: Bits,
{
    values: [u8; N],
    valid: Bitmap<N>,
    volatile: Bitmap<N>,
}

impl<const N: usize> RegisterCache<N>
where
    BitsImpl<N>: Bits,
{
    pub(crate) fn new<P: VolatilityPolicy>(policy: &P) -> Self {
        let mut volatile = Bitmap::new();
        for addr in 0..N {
            if policy.is_volatile(addr as u16) {
                volatile.set(addr, true);
            }
        }

        Self {
            values: [0; N],
            valid: Bitmap::new(),
            volatile,
        }
    }

    #[inline]
    fn slot(addr: u16) -> Option<usize> {
        let idx = addr as usize;
        (idx < N).then_some(idx)
    }

    pub(crate) fn is_volatile(&self, addr: u16) -> bool {
        Self::slot(addr).is_none_or(|idx| self.volatile.get(idx))
    }

    /// Returns the cached value if the slot holds a valid copy.
    pub(crate) fn lookup(&self, addr: u16) -> Option<u8> {
        let idx = Self::slot(addr)?;
        self.valid.get(idx).then(|| self.values[idx])
    }

    /// Records a value observed on (or written to) the bus.
    ///
    /// Volatile slots are left untouched.
    pub(crate) fn store(&mut self, addr: u16, value: u8) {
        if let Some(idx) = Self::slot(addr) {
            if !self.volatile.get(idx) {
                self.values[idx] = value;
                self.valid.set(idx, true);
            }
        }
    }

    pub(crate) fn invalidate(&mut self, addr: u16) {
        if let Some(idx) = Self::slot(addr) {
            self.valid.set(idx, false);
        }
    }

    pub(crate) fn invalidate_all(&mut self) {
        self.valid = Bitmap::new();
    }

    pub(crate) fn valid_count(&self) -> usize {
        self.valid.len()
    }

    pub(crate) fn entry(&self, addr: u16) -> Option<RegisterEntry> {
        let idx = Self::slot(addr)?;
        Some(RegisterEntry {
            address: addr,
            volatility: if self.volatile.get(idx) {
                Volatility::Volatile
            } else {
                Volatility::NonVolatile
            },
            cache_status: if self.valid.get(idx) {
                CacheStatus::Valid
            } else {
                CacheStatus::Invalid
            },
            cached_value: self.values[idx],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pmic::policy::{AllVolatile, DefaultVolatility, NoneVolatile};
    use crate::pmic::regs;

    type TestCache = RegisterCache<{ regs::REGISTER_COUNT }>;

    #[test]
    fn new_cache_has_no_valid_entries() {
        let cache = TestCache::new(&NoneVolatile::default());
        assert_eq!(cache.valid_count(), 0);
        assert_eq!(cache.lookup(regs::CONTROLA), None);
    }

    #[test]
    fn store_marks_non_volatile_valid() {
        let mut cache = TestCache::new(&DefaultVolatility::default());
        cache.store(regs::CONTROLA, 0x5A);

        assert_eq!(cache.lookup(regs::CONTROLA), Some(0x5A));
        let entry = cache.entry(regs::CONTROLA).unwrap();
        assert_eq!(entry.volatility, Volatility::NonVolatile);
        assert_eq!(entry.cache_status, CacheStatus::Valid);
        assert_eq!(entry.cached_value, 0x5A);
    }

    #[test]
    fn store_skips_volatile_entries() {
        let mut cache = TestCache::new(&DefaultVolatility::default());
        cache.store(regs::EVENTA, 0xFF);

        assert_eq!(cache.lookup(regs::EVENTA), None);
        let entry = cache.entry(regs::EVENTA).unwrap();
        assert_eq!(entry.volatility, Volatility::Volatile);
        assert_eq!(entry.cache_status, CacheStatus::Invalid);
        assert_eq!(entry.cached_value, 0);
    }

    #[test]
    fn all_volatile_never_caches() {
        let mut cache = TestCache::new(&AllVolatile::default());
        cache.store(regs::CONTROLB, 0x01);
        assert_eq!(cache.lookup(regs::CONTROLB), None);
        assert_eq!(cache.valid_count(), 0);
    }

    #[test]
    fn invalidate_scenarios() {
        let mut cache = TestCache::new(&NoneVolatile::default());
        cache.store(regs::CONTROLA, 1);
        cache.store(regs::CONTROLB, 2);
        assert_eq!(cache.valid_count(), 2);

        cache.invalidate(regs::CONTROLA);
        assert_eq!(cache.lookup(regs::CONTROLA), None);
        assert_eq!(cache.lookup(regs::CONTROLB), Some(2));

        cache.invalidate_all();
        assert_eq!(cache.valid_count(), 0);
    }

    #[test]
    fn addresses_past_the_table_are_uncached() {
        let mut cache = RegisterCache::<16>::new(&NoneVolatile::default());
        cache.store(20, 0xAA);
        assert_eq!(cache.lookup(20), None);
        assert!(cache.is_volatile(20));
        assert!(cache.entry(20).is_none());
    }
}
