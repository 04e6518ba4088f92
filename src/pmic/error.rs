/// Calendar field rejected by RTC validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeField {
    Seconds,
    Minutes,
    Hours,
    Day,
    Month,
    Year,
}

/// Errors that can occur during register access, event registration and bring-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PmicError {
    /// Address outside both register pages.
    InvalidRegister,
    /// Batch request exceeds the maximum message count.
    TooManyRegisters,
    /// Bus-level I/O error reported by the transport.
    TransportFailure,
    /// Event type index is not below the event type count.
    InvalidEventType,
    /// Handler is already subscribed to this event type.
    InvalidHandler,
    /// No free subscriber slot left for this event type.
    RegistryFull,
    /// Registry lock is held elsewhere.
    LockUnavailable,
    /// Waiting for the registry lock was cancelled.
    Interrupted,
    /// Another bus kind already owns the transport binding.
    TransportAlreadyBound,
    /// The interrupt line could not be requested.
    IrqRequestFailed,
    /// A sub-device could not be registered.
    SubdeviceFailed,
    /// RTC time failed calendar validation.
    InvalidTime(TimeField),
}

impl core::fmt::Display for PmicError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PmicError::InvalidRegister => write!(f, "register address outside both pages"),
            PmicError::TooManyRegisters => write!(f, "batch request exceeds maximum count"),
            PmicError::TransportFailure => write!(f, "bus transport failure"),
            PmicError::InvalidEventType => write!(f, "invalid event type"),
            PmicError::InvalidHandler => write!(f, "handler already subscribed"),
            PmicError::RegistryFull => write!(f, "event subscriber list is full"),
            PmicError::LockUnavailable => write!(f, "registry lock unavailable"),
            PmicError::Interrupted => write!(f, "lock acquisition interrupted"),
            PmicError::TransportAlreadyBound => {
                write!(f, "transport already bound to another bus kind")
            }
            PmicError::IrqRequestFailed => write!(f, "interrupt line request failed"),
            PmicError::SubdeviceFailed => write!(f, "sub-device registration failed"),
            PmicError::InvalidTime(field) => write!(f, "invalid rtc time field: {field:?}"),
        }
    }
}
