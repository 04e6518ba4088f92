pub mod builder;
pub(crate) mod cache;
pub mod config;
pub mod device;
pub mod error;
pub mod events;
pub mod irq;
pub mod lock;
pub mod policy;
pub mod registers;
pub mod regs;
pub mod rtc;
pub mod subdevice;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use builder::PmicBuilder;
pub use cache::{CacheStatus, RegisterEntry, Volatility};
pub use config::PmicConfig;
pub use device::{ChipVersion, Pmic, Registers};
pub use error::{PmicError, TimeField};
pub use events::{EventHandler, EventMask, EventRegistry, EventType, SubscriptionId};
pub use irq::{IrqLine, IrqReturn, IrqTrigger, PipelineState};
pub use lock::{CancelToken, EventLock};
pub use policy::{AllVolatile, DefaultVolatility, NoneVolatile, VolatilityPolicy};
pub use registers::RegisterMap;
pub use rtc::RtcTime;
pub use subdevice::{DEFAULT_SUBDEVICES, NoSubdevices, Subdevice, SubdeviceRegistrar};
pub use transport::{BUS_BINDING, Bus, BusBinding, BusError, BusKind, RegMsg, Transport};

pub mod prelude {
    pub use super::{
        BusBinding, BusKind, CancelToken, ChipVersion, EventHandler, EventMask, EventType,
        IrqLine, IrqReturn, IrqTrigger, Pmic, PmicBuilder, PmicConfig, PmicError, RegMsg,
        RtcTime, SubdeviceRegistrar, Transport, VolatilityPolicy,
    };
}
