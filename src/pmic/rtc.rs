use embedded_hal::delay::DelayNs;

use crate::pmic::{
    Pmic, PmicError,
    error::TimeField,
    irq::IrqLine,
    regs,
    transport::{RegMsg, Transport},
};

/// Calendar time in the platform's broken-down convention: `mon` counts from
/// 0 and `year` from 1900.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RtcTime {
    pub sec: u8,
    pub min: u8,
    pub hour: u8,
    pub mday: u8,
    pub mon: u8,
    pub year: u16,
}

/// The counter's year register holds years since 2000.
const CHIP_EPOCH: u16 = 100;
const CHIP_YEAR_MAX: u8 = regs::COUNTY_YEAR;

/// Time as encoded in the counter registers: month 1..=12, year since 2000.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ChipTime {
    sec: u8,
    min: u8,
    hour: u8,
    day: u8,
    month: u8,
    year: u8,
}

impl ChipTime {
    fn from_rtc(time: &RtcTime) -> Result<Self, PmicError> {
        let year = time
            .year
            .checked_sub(CHIP_EPOCH)
            .and_then(|y| u8::try_from(y).ok())
            .ok_or(PmicError::InvalidTime(TimeField::Year))?;
        let chip = Self {
            sec: time.sec,
            min: time.min,
            hour: time.hour,
            day: time.mday,
            month: time.mon.saturating_add(1),
            year,
        };
        chip.validate()?;
        Ok(chip)
    }

    fn to_rtc(self) -> RtcTime {
        RtcTime {
            sec: self.sec,
            min: self.min,
            hour: self.hour,
            mday: self.day,
            mon: self.month - 1,
            year: u16::from(self.year) + CHIP_EPOCH,
        }
    }

    fn validate(&self) -> Result<(), PmicError> {
        let bad = |field| Err(PmicError::InvalidTime(field));

        if self.sec > 59 {
            return bad(TimeField::Seconds);
        }
        if self.min > 59 {
            return bad(TimeField::Minutes);
        }
        if self.hour > 23 {
            return bad(TimeField::Hours);
        }
        if self.day == 0 {
            return bad(TimeField::Day);
        }
        if !(1..=12).contains(&self.month) {
            return bad(TimeField::Month);
        }
        if self.year > CHIP_YEAR_MAX {
            return bad(TimeField::Year);
        }
        if self.day > days_in_month(self.month, 2000 + u16::from(self.year)) {
            return bad(TimeField::Day);
        }
        Ok(())
    }

    fn messages(&self) -> [RegMsg; 6] {
        [
            RegMsg::new(regs::COUNTS, regs::COUNTS_MONITOR | self.sec),
            RegMsg::new(regs::COUNTMI, self.min),
            RegMsg::new(regs::COUNTH, self.hour),
            RegMsg::new(regs::COUNTD, self.day),
            RegMsg::new(regs::COUNTMO, self.month),
            RegMsg::new(regs::COUNTY, self.year),
        ]
    }

    fn from_messages(msgs: &[RegMsg; 6]) -> Self {
        Self {
            sec: msgs[0].data & regs::COUNTS_SEC,
            min: msgs[1].data & regs::COUNTMI_MIN,
            hour: msgs[2].data & regs::COUNTH_HOUR,
            day: msgs[3].data & regs::COUNTD_DAY,
            month: msgs[4].data & regs::COUNTMO_MONTH,
            year: msgs[5].data & regs::COUNTY_YEAR,
        }
    }
}

fn is_leap(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(month: u8, year: u16) -> u8 {
    match month {
        2 if is_leap(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

impl<'a, T, L, D, const N: usize> Pmic<'a, T, L, D, N>
where
    T: Transport,
    L: IrqLine,
    D: DelayNs,
{
    /// Loads `time` into the counter in one burst and sets the monitor bit.
    ///
    /// Times before 2000 or past the counter's range are rejected without
    /// touching the bus.
    pub fn rtc_set_time(&self, time: &RtcTime) -> Result<(), PmicError> {
        let chip = ChipTime::from_rtc(time).inspect_err(|e| debug!("rtc set rejected: {e}"))?;
        self.with_registers(|r| r.write_many(&chip.messages()))
    }

    /// Reads the counter in one burst.
    pub fn rtc_get_time(&self) -> Result<RtcTime, PmicError> {
        let mut msgs = [
            RegMsg::read(regs::COUNTS),
            RegMsg::read(regs::COUNTMI),
            RegMsg::read(regs::COUNTH),
            RegMsg::read(regs::COUNTD),
            RegMsg::read(regs::COUNTMO),
            RegMsg::read(regs::COUNTY),
        ];
        self.with_registers(|r| r.read_many(&mut msgs))?;

        let chip = ChipTime::from_messages(&msgs);
        chip.validate()?;
        Ok(chip.to_rtc())
    }

    /// True once the counter has been loaded since the last power loss.
    pub fn rtc_is_valid(&self) -> Result<bool, PmicError> {
        let counts = self.with_registers(|r| r.read(regs::COUNTS))?;
        Ok(counts & regs::COUNTS_MONITOR != 0)
    }
}
