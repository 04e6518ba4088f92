/// Bring-up and runtime tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PmicConfig {
    /// Values written to IRQMASKA, IRQMASKB and IRQMASKC at init. A set bit
    /// masks the source.
    pub irq_masks: [u8; 3],
    /// Power-key debounce code programmed into CONTROLC at init, or `None`
    /// to leave CONTROLC alone.
    pub debounce: Option<u8>,
    /// Settle time between clearing the event registers and unmasking the
    /// interrupt line, to avoid false re-triggers.
    pub settle_delay_us: u32,
}

/// Everything masked except `ONKEY` and `ADC_EOM` (IRQMASKB bits 0 and 5).
pub const DEFAULT_IRQ_MASKS: [u8; 3] = [0xFF, 0xDE, 0xFF];
/// 10 ms debounce.
pub const DEFAULT_DEBOUNCE: u8 = 0x04;
pub const DEFAULT_SETTLE_DELAY_US: u32 = 50;

impl Default for PmicConfig {
    fn default() -> Self {
        Self {
            irq_masks: DEFAULT_IRQ_MASKS,
            debounce: Some(DEFAULT_DEBOUNCE),
            settle_delay_us: DEFAULT_SETTLE_DELAY_US,
        }
    }
}
