use core::sync::atomic::{AtomicU8, Ordering};

/// Electrical trigger type requested for the interrupt line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqTrigger {
    LevelLow,
    LevelHigh,
    EdgeFalling,
    EdgeRising,
}

/// Outcome reported by the top-half handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqReturn {
    /// Not ours (line already masked by a pending run).
    None,
    /// Handled; the platform must schedule the bottom half.
    WakeThread,
}

/// Platform interrupt line the device's IRQ output is wired to.
///
/// `enable`/`disable_nosync` nest like a depth counter on most platforms;
/// the driver always pairs them one-to-one.
pub trait IrqLine {
    type Error: core::fmt::Debug;

    fn request(&self, trigger: IrqTrigger) -> Result<(), Self::Error>;

    fn free(&self);

    fn enable(&self);

    /// Masks the line without waiting for running handlers. Must be callable
    /// from interrupt context.
    fn disable_nosync(&self);

    /// Marks the line as a system wake-up source.
    fn enable_wake(&self);
}

/// Where the interrupt pipeline currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PipelineState {
    Armed = 0,
    Triggered = 1,
    Draining = 2,
    Dispatching = 3,
    Clearing = 4,
    Rearming = 5,
}

#[derive(Debug)]
pub(crate) struct PipelineCell(AtomicU8);

impl PipelineCell {
    pub(crate) const fn new() -> Self {
        Self(AtomicU8::new(PipelineState::Armed as u8))
    }

    pub(crate) fn set(&self, state: PipelineState) {
        trace!("irq pipeline -> {:?}", state);
        self.0.store(state as u8, Ordering::Release);
    }

    pub(crate) fn get(&self) -> PipelineState {
        match self.0.load(Ordering::Acquire) {
            1 => PipelineState::Triggered,
            2 => PipelineState::Draining,
            3 => PipelineState::Dispatching,
            4 => PipelineState::Clearing,
            5 => PipelineState::Rearming,
            _ => PipelineState::Armed,
        }
    }
}

/// Re-enables the line when dropped, so every exit path of a pipeline run
/// leaves the interrupt unmasked.
pub(crate) struct RearmGuard<'l, L: IrqLine> {
    line: &'l L,
    state: &'l PipelineCell,
}

impl<'l, L: IrqLine> RearmGuard<'l, L> {
    pub(crate) fn new(line: &'l L, state: &'l PipelineCell) -> Self {
        Self { line, state }
    }
}

impl<L: IrqLine> Drop for RearmGuard<'_, L> {
    fn drop(&mut self) {
        self.state.set(PipelineState::Rearming);
        self.line.enable();
        self.state.set(PipelineState::Armed);
    }
}
