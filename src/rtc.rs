use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use zerocopy::byteorder::little_endian::U16;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// The RTC record exactly as it crosses the wire: 8 bytes, seconds first,
/// 16-bit little-endian year last.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct RtcTimeRaw {
    pub second: u8,
    pub minute: u8,
    pub hour: u8,
    pub day: u8,
    /// Day of the week, 0 = Sunday.
    pub week: u8,
    pub month: u8,
    pub year: U16,
}

/// Calendar time kept by the hub's on-board clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RtcTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    /// Day of the week, 0 = Sunday.
    pub week: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl RtcTime {
    /// Build a clock time from calendar fields, deriving the weekday.
    /// Returns `None` for an invalid date.
    pub fn from_ymd_hms(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Option<Self> {
        let date = NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)?;
        Some(Self {
            year,
            month,
            day,
            week: date.weekday().num_days_from_sunday() as u8,
            hour,
            minute,
            second,
        })
    }

    pub fn from_datetime(dt: NaiveDateTime) -> Self {
        Self {
            year: dt.year() as u16,
            month: dt.month() as u8,
            day: dt.day() as u8,
            week: dt.weekday().num_days_from_sunday() as u8,
            hour: dt.hour() as u8,
            minute: dt.minute() as u8,
            second: dt.second() as u8,
        }
    }

    /// `None` if the stored fields do not form a valid date-time.
    pub fn to_datetime(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year as i32, self.month as u32, self.day as u32)?
            .and_hms_opt(self.hour as u32, self.minute as u32, self.second as u32)
    }
}

impl From<RtcTimeRaw> for RtcTime {
    fn from(raw: RtcTimeRaw) -> Self {
        Self {
            year: raw.year.get(),
            month: raw.month,
            day: raw.day,
            week: raw.week,
            hour: raw.hour,
            minute: raw.minute,
            second: raw.second,
        }
    }
}

impl From<RtcTime> for RtcTimeRaw {
    fn from(time: RtcTime) -> Self {
        Self {
            second: time.second,
            minute: time.minute,
            hour: time.hour,
            day: time.day,
            week: time.week,
            month: time.month,
            year: U16::new(time.year),
        }
    }
}

impl fmt::Display for RtcTime {
    /// Renders as `YYYY/MM/DD W HH:MM:SS`, e.g. `2022/08/09 2 09:08:00`
    /// for Tuesday, August 9, 2022.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{:02}/{:02} {} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.week, self.hour, self.minute, self.second
        )
    }
}
