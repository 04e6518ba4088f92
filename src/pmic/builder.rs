use embedded_hal::delay::DelayNs;

use crate::pmic::{
    Pmic,
    config::PmicConfig,
    irq::IrqLine,
    policy::{DefaultVolatility, VolatilityPolicy},
    transport::{BUS_BINDING, BusBinding, Transport},
};

// Builder states
pub struct NeedTransport;
pub struct NeedIrqLine;
pub struct NeedDelay;
pub struct Ready;

/// Typestate builder for [`Pmic`].
///
/// Transport, interrupt line and delay source must be supplied in that
/// order; volatility policy, configuration and bus binding are optional.
pub struct PmicBuilder<'a, T, L, D, P, State> {
    transport: T,
    irq: L,
    delay: D,
    policy: P,
    config: PmicConfig,
    binding: &'a BusBinding,
    _state: core::marker::PhantomData<State>,
}

impl PmicBuilder<'static, (), (), (), DefaultVolatility, NeedTransport> {
    pub fn new() -> Self {
        PmicBuilder {
            transport: (),
            irq: (),
            delay: (),
            policy: DefaultVolatility::default(),
            config: PmicConfig::default(),
            binding: &BUS_BINDING,
            _state: core::marker::PhantomData,
        }
    }
}

impl Default for PmicBuilder<'static, (), (), (), DefaultVolatility, NeedTransport> {
    fn default() -> Self {
        Self::new()
    }
}

// Optional settings, available in any state
impl<'a, T, L, D, P, State> PmicBuilder<'a, T, L, D, P, State> {
    pub fn config(mut self, config: PmicConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the default volatility map.
    pub fn volatility<Q: VolatilityPolicy>(self, policy: Q) -> PmicBuilder<'a, T, L, D, Q, State> {
        PmicBuilder {
            transport: self.transport,
            irq: self.irq,
            delay: self.delay,
            policy,
            config: self.config,
            binding: self.binding,
            _state: core::marker::PhantomData,
        }
    }

    /// Claim bus exclusivity on `binding` instead of the process-wide one.
    pub fn binding<'b>(self, binding: &'b BusBinding) -> PmicBuilder<'b, T, L, D, P, State> {
        PmicBuilder {
            transport: self.transport,
            irq: self.irq,
            delay: self.delay,
            policy: self.policy,
            config: self.config,
            binding,
            _state: core::marker::PhantomData,
        }
    }
}

// Set transport
impl<'a, P> PmicBuilder<'a, (), (), (), P, NeedTransport> {
    pub fn transport<T: Transport>(self, transport: T) -> PmicBuilder<'a, T, (), (), P, NeedIrqLine> {
        PmicBuilder {
            transport,
            irq: (),
            delay: (),
            policy: self.policy,
            config: self.config,
            binding: self.binding,
            _state: core::marker::PhantomData,
        }
    }
}

// Set interrupt line
impl<'a, T, P> PmicBuilder<'a, T, (), (), P, NeedIrqLine>
where
    T: Transport,
{
    pub fn irq_line<L: IrqLine>(self, irq: L) -> PmicBuilder<'a, T, L, (), P, NeedDelay> {
        PmicBuilder {
            transport: self.transport,
            irq,
            delay: (),
            policy: self.policy,
            config: self.config,
            binding: self.binding,
            _state: core::marker::PhantomData,
        }
    }
}

// Set delay source
impl<'a, T, L, P> PmicBuilder<'a, T, L, (), P, NeedDelay>
where
    T: Transport,
    L: IrqLine,
{
    pub fn delay<D: DelayNs>(self, delay: D) -> PmicBuilder<'a, T, L, D, P, Ready> {
        PmicBuilder {
            transport: self.transport,
            irq: self.irq,
            delay,
            policy: self.policy,
            config: self.config,
            binding: self.binding,
            _state: core::marker::PhantomData,
        }
    }
}

// Build the device
impl<'a, T, L, D, P> PmicBuilder<'a, T, L, D, P, Ready>
where
    T: Transport,
    L: IrqLine,
    D: DelayNs,
    P: VolatilityPolicy,
{
    /// Builds the device. `N` bounds the subscribers per event type.
    ///
    /// Nothing touches the bus until [`Pmic::init`].
    pub fn build<const N: usize>(self) -> Pmic<'a, T, L, D, N> {
        Pmic::new(
            self.transport,
            &self.policy,
            self.irq,
            self.delay,
            self.config,
            self.binding,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pmic::policy::AllVolatile;
    use crate::pmic::regs;
    use crate::pmic::test_support::{CountingDelay, MockIrq, MockTransport};

    #[test]
    fn test_simple_builder() {
        let binding = BusBinding::new();
        let pmic = PmicBuilder::new()
            .binding(&binding)
            .transport(MockTransport::new())
            .irq_line(MockIrq::new())
            .delay(CountingDelay::default())
            .build::<4>();

        assert_eq!(pmic.config(), &PmicConfig::default());
        // Built but not initialized: nothing claimed yet
        assert_eq!(binding.bound(), None);
    }

    #[test]
    fn test_builder_with_custom_policy_and_config() {
        let binding = BusBinding::new();
        let config = PmicConfig {
            irq_masks: [0x00, 0x00, 0x00],
            debounce: None,
            settle_delay_us: 10,
        };
        let pmic = PmicBuilder::new()
            .config(config)
            .volatility(AllVolatile::default())
            .binding(&binding)
            .transport(MockTransport::new())
            .irq_line(MockIrq::new())
            .delay(CountingDelay::default())
            .build::<2>();

        assert_eq!(pmic.config().settle_delay_us, 10);
        pmic.with_registers(|r| {
            r.write(regs::CONTROLA, 1).unwrap();
            r.read(regs::CONTROLA).unwrap();
            // Nothing is cached under the all-volatile policy
            assert_eq!(r.transport().reads, 1);
        });
    }
}
