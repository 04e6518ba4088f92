//! Register address map.
//!
//! The device exposes two contiguous pages of byte-wide registers. Address
//! `0x00` and `0x80` are page-control registers and are not directly
//! accessible through the cache layer.

/// First addressable register of page 0.
pub const PAGE0_START: u16 = 0x01;
/// Last addressable register of page 0.
pub const PAGE0_END: u16 = 0x7F;
/// First addressable register of page 1.
pub const PAGE1_START: u16 = 0x81;
/// Last addressable register of page 1.
pub const PAGE1_END: u16 = 0xBF;

/// Number of cache slots needed to cover both pages by address.
pub const REGISTER_COUNT: usize = PAGE1_END as usize + 1;

/// Maximum number of messages in one batch request.
pub const MAX_BATCH: usize = 32;

/// Returns true if `addr` lies inside one of the two register pages.
#[inline]
pub const fn is_valid_address(addr: u16) -> bool {
    (addr >= PAGE0_START && addr <= PAGE0_END) || (addr >= PAGE1_START && addr <= PAGE1_END)
}

pub const PAGECON0: u16 = 0x00;

pub const STATUSA: u16 = 0x01;
pub const STATUSB: u16 = 0x02;
pub const STATUSC: u16 = 0x03;
pub const STATUSD: u16 = 0x04;

/// First of the four consecutive event-status registers.
pub const EVENTA: u16 = 0x05;
pub const EVENTB: u16 = 0x06;
pub const EVENTC: u16 = 0x07;
pub const EVENTD: u16 = 0x08;
/// Number of event-status registers.
pub const EVENT_REG_COUNT: usize = 4;

pub const FAULTLOG: u16 = 0x09;

pub const IRQMASKA: u16 = 0x0A;
pub const IRQMASKB: u16 = 0x0B;
pub const IRQMASKC: u16 = 0x0C;
pub const IRQMASKD: u16 = 0x0D;

pub const CONTROLA: u16 = 0x0E;
pub const CONTROLB: u16 = 0x0F;
pub const CONTROLC: u16 = 0x10;
pub const CONTROLD: u16 = 0x11;

pub const CONTROLB_SHUTDOWN: u8 = 1 << 1;
pub const CONTROLC_DEBOUNCING: u8 = 0x07;
pub const CONTROLC_PMFB2PIN: u8 = 1 << 3;

pub const ADCMAN: u16 = 0x51;
pub const ADCCONT: u16 = 0x52;
pub const ADCRESL: u16 = 0x53;
pub const ADCRESH: u16 = 0x54;
pub const VDDRES: u16 = 0x55;
pub const ICHGAV: u16 = 0x57;
pub const TBATRES: u16 = 0x5A;
pub const ADCIN4RES: u16 = 0x5F;
pub const ADCIN5RES: u16 = 0x62;
pub const ADCIN6RES: u16 = 0x65;
pub const TJUNCRES: u16 = 0x68;

pub const TSICONTA: u16 = 0x69;
pub const TSICONTB: u16 = 0x6A;
pub const TSIXMSB: u16 = 0x6B;
pub const TSIYMSB: u16 = 0x6C;
pub const TSILSB: u16 = 0x6D;
pub const TSIZMSB: u16 = 0x6E;

pub const COUNTS: u16 = 0x6F;
pub const COUNTMI: u16 = 0x70;
pub const COUNTH: u16 = 0x71;
pub const COUNTD: u16 = 0x72;
pub const COUNTMO: u16 = 0x73;
pub const COUNTY: u16 = 0x74;

pub const COUNTS_MONITOR: u8 = 1 << 6;
pub const COUNTS_SEC: u8 = 0x3F;
pub const COUNTMI_MIN: u8 = 0x3F;
pub const COUNTH_HOUR: u8 = 0x1F;
pub const COUNTD_DAY: u8 = 0x1F;
pub const COUNTMO_MONTH: u8 = 0x0F;
pub const COUNTY_YEAR: u8 = 0x3F;

pub const PAGECON128: u16 = 0x80;

pub const CHIPID: u16 = 0x81;
/// Mask revision field of the chip-ID register.
pub const CHIPID_MRC: u8 = 0xF0;
pub const CHIPID_MRC_AA: u8 = 0x80;
pub const CHIPID_MRC_BB: u8 = 0xA0;
