//! Time handling of Chapter 10 packets.
//!
//! Every packet header carries a 48 bit relative time counter (RTC) which counts at 10 MHz.
//! Packets with a secondary header additionally carry an absolute time, either in the
//! IRIG-106 Chapter 4 binary weighted format or in the IEEE-1588 format. Absolute times are
//! represented with [chrono::DateTime] in UTC.
use arbitrary_int::u2;
use chrono::{DateTime, NaiveDate, TimeDelta, Utc};

use crate::layout::{PacketFlags, RTC_LEN};

/// The RTC is a 48 bit counter.
pub const RTC_BITS: u32 = 48;
pub const RTC_MASK: u64 = (1 << RTC_BITS) - 1;
/// Frequency of the relative time counter.
pub const RTC_FREQUENCY_HZ: u64 = 10_000_000;
pub const NANOS_PER_RTC_TICK: i64 = 1_000_000_000 / RTC_FREQUENCY_HZ as i64;

/// Decode a 48 bit RTC stored least significant byte first.
///
/// The RTC byte order is fixed by the standard and does not depend on the platform.
#[inline]
pub fn rtc_from_le_bytes(raw: &[u8; RTC_LEN]) -> u64 {
    let mut full = [0; 8];
    full[..RTC_LEN].copy_from_slice(raw);
    u64::from_le_bytes(full)
}

/// Encode the lower 48 bits of `rtc` least significant byte first.
#[inline]
pub fn rtc_to_le_bytes(rtc: u64) -> [u8; RTC_LEN] {
    let full = (rtc & RTC_MASK).to_le_bytes();
    let mut raw = [0; RTC_LEN];
    raw.copy_from_slice(&full[..RTC_LEN]);
    raw
}

/// Signed distance in RTC ticks from `from` to `to`, taking a single 48 bit rollover into
/// account.
pub fn rtc_delta(from: u64, to: u64) -> i64 {
    let diff = to.wrapping_sub(from) & RTC_MASK;
    if diff >= 1 << (RTC_BITS - 1) {
        diff as i64 - (1i64 << RTC_BITS)
    } else {
        diff as i64
    }
}

/// Convert a number of RTC ticks to a [TimeDelta].
#[inline]
pub fn rtc_ticks_to_delta(ticks: i64) -> TimeDelta {
    TimeDelta::nanoseconds(ticks * NANOS_PER_RTC_TICK)
}

/// Pairs an RTC value with the absolute time it corresponds to, usually taken from a time
/// packet. Other RTC values are converted relative to this reference.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeReference {
    pub rtc: u64,
    pub time: DateTime<Utc>,
}

impl TimeReference {
    pub fn new(rtc: u64, time: DateTime<Utc>) -> Self {
        Self {
            rtc: rtc & RTC_MASK,
            time,
        }
    }

    /// Absolute time of the given RTC value. Returns [None] if the result is outside of the
    /// range supported by [chrono].
    pub fn rtc_to_absolute(&self, rtc: u64) -> Option<DateTime<Utc>> {
        self.time
            .checked_add_signed(rtc_ticks_to_delta(rtc_delta(self.rtc, rtc)))
    }

    /// RTC value of the given absolute time, wrapped to 48 bits.
    pub fn absolute_to_rtc(&self, time: DateTime<Utc>) -> Option<u64> {
        let nanos = time.signed_duration_since(self.time).num_nanoseconds()?;
        let ticks = nanos / NANOS_PER_RTC_TICK;
        Some((self.rtc as i64).wrapping_add(ticks) as u64 & RTC_MASK)
    }
}

/// Time encoding of the intra-packet time stamps of a packet.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimeEncoding {
    /// 48 bit relative time counter.
    Ch10Relative,
    /// IRIG-106 Chapter 4 binary weighted time.
    Ch4Binary,
    /// IEEE-1588 seconds and nanoseconds.
    Ieee1588,
    /// The secondary time format field contains a value this library does not interpret. The
    /// raw field value is returned.
    Unknown(u8),
}

impl TimeEncoding {
    pub fn from_flags(flags: PacketFlags) -> Self {
        if !flags.ipts_from_secondary_time() {
            return TimeEncoding::Ch10Relative;
        }
        Self::from_secondary_time_format(flags.secondary_time_format())
    }

    pub fn from_secondary_time_format(format: u2) -> Self {
        match format.value() {
            0 => TimeEncoding::Ch4Binary,
            1 => TimeEncoding::Ieee1588,
            other => TimeEncoding::Unknown(other),
        }
    }
}

/// Decoded 8 byte time of the secondary header or of an intra-packet time stamp.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SecondaryHeaderTime {
    /// Chapter 4 binary weighted time, counted from the start of the year.
    Ch4Binary {
        /// Time in units of 10 milliseconds.
        ten_ms: u32,
        microseconds: u16,
    },
    /// IEEE-1588 time, counted from the Unix epoch.
    Ieee1588 { seconds: u32, nanoseconds: u32 },
}

impl SecondaryHeaderTime {
    /// Decode the raw 8 byte time for the given secondary time format. Returns the raw format
    /// value if the format is not supported.
    pub fn from_bytes(format: u2, raw: &[u8; 8]) -> Result<Self, u8> {
        let word = |idx: usize| u16::from_le_bytes([raw[idx * 2], raw[idx * 2 + 1]]);
        match TimeEncoding::from_secondary_time_format(format) {
            TimeEncoding::Ch4Binary => Ok(SecondaryHeaderTime::Ch4Binary {
                ten_ms: ((word(1) as u32) << 16) | word(2) as u32,
                microseconds: word(3),
            }),
            TimeEncoding::Ieee1588 => Ok(SecondaryHeaderTime::Ieee1588 {
                nanoseconds: u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]),
                seconds: u32::from_le_bytes([raw[4], raw[5], raw[6], raw[7]]),
            }),
            _ => Err(format.value()),
        }
    }

    /// Secondary time format value which describes this time.
    pub fn format(&self) -> u2 {
        match self {
            SecondaryHeaderTime::Ch4Binary { .. } => u2::new(0),
            SecondaryHeaderTime::Ieee1588 { .. } => u2::new(1),
        }
    }

    pub fn to_bytes(&self) -> [u8; 8] {
        let mut raw = [0; 8];
        match self {
            SecondaryHeaderTime::Ch4Binary {
                ten_ms,
                microseconds,
            } => {
                raw[2..4].copy_from_slice(&((ten_ms >> 16) as u16).to_le_bytes());
                raw[4..6].copy_from_slice(&(*ten_ms as u16).to_le_bytes());
                raw[6..8].copy_from_slice(&microseconds.to_le_bytes());
            }
            SecondaryHeaderTime::Ieee1588 {
                seconds,
                nanoseconds,
            } => {
                raw[0..4].copy_from_slice(&nanoseconds.to_le_bytes());
                raw[4..8].copy_from_slice(&seconds.to_le_bytes());
            }
        }
        raw
    }

    /// Absolute time. Chapter 4 times do not contain a year, so the year the recording was
    /// made in has to be supplied. It is ignored for IEEE-1588 times.
    pub fn to_datetime(&self, year: i32) -> Option<DateTime<Utc>> {
        match self {
            SecondaryHeaderTime::Ch4Binary {
                ten_ms,
                microseconds,
            } => {
                let start_of_year = NaiveDate::from_ymd_opt(year, 1, 1)?
                    .and_hms_opt(0, 0, 0)?
                    .and_utc();
                let offset = TimeDelta::milliseconds(*ten_ms as i64 * 10)
                    + TimeDelta::microseconds(*microseconds as i64);
                start_of_year.checked_add_signed(offset)
            }
            SecondaryHeaderTime::Ieee1588 {
                seconds,
                nanoseconds,
            } => DateTime::from_timestamp(*seconds as i64, *nanoseconds),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone, Timelike};

    #[test]
    fn test_rtc_bytes() {
        let raw = rtc_to_le_bytes(0xAB12_3456_789A_BCDE);
        assert_eq!(raw, [0xDE, 0xBC, 0x9A, 0x78, 0x56, 0x34]);
        assert_eq!(rtc_from_le_bytes(&raw), 0x3456_789A_BCDE);
    }

    #[test]
    fn test_rtc_delta_rollover() {
        assert_eq!(rtc_delta(100, 250), 150);
        assert_eq!(rtc_delta(250, 100), -150);
        assert_eq!(rtc_delta(RTC_MASK - 4, 5), 10);
        assert_eq!(rtc_delta(5, RTC_MASK - 4), -10);
    }

    #[test]
    fn test_rtc_to_absolute() {
        let reference_time = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let reference = TimeReference::new(1_000_000, reference_time);
        let later = reference.rtc_to_absolute(1_000_000 + 25_000_000).unwrap();
        assert_eq!(later, reference_time + TimeDelta::milliseconds(2500));
        let earlier = reference.rtc_to_absolute(1_000_000 - 10).unwrap();
        assert_eq!(earlier, reference_time - TimeDelta::microseconds(1));
        assert_eq!(reference.absolute_to_rtc(later), Some(26_000_000));
    }

    #[test]
    fn test_rtc_to_absolute_across_rollover() {
        let reference_time = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let reference = TimeReference::new(RTC_MASK, reference_time);
        let after_rollover = reference.rtc_to_absolute(9).unwrap();
        assert_eq!(after_rollover, reference_time + TimeDelta::microseconds(1));
        assert_eq!(reference.absolute_to_rtc(after_rollover), Some(9));
    }

    #[test]
    fn test_time_encoding_from_flags() {
        let flags = PacketFlags::new_with_raw_value(0);
        assert_eq!(TimeEncoding::from_flags(flags), TimeEncoding::Ch10Relative);
        let flags = flags.with_secondary_time_format(u2::new(1));
        assert_eq!(TimeEncoding::from_flags(flags), TimeEncoding::Ch10Relative);
        let flags = flags.with_ipts_from_secondary_time(true);
        assert_eq!(TimeEncoding::from_flags(flags), TimeEncoding::Ieee1588);
        let flags = flags.with_secondary_time_format(u2::new(0));
        assert_eq!(TimeEncoding::from_flags(flags), TimeEncoding::Ch4Binary);
        let flags = flags.with_secondary_time_format(u2::new(3));
        assert_eq!(TimeEncoding::from_flags(flags), TimeEncoding::Unknown(3));
    }

    #[test]
    fn test_ch4_binary_time() {
        // Day 32 (February 1st), 01:02:03.040 plus 56 microseconds.
        let ten_ms = ((31 * 86_400 + 3_723) * 100 + 4) as u32;
        let time = SecondaryHeaderTime::Ch4Binary {
            ten_ms,
            microseconds: 56,
        };
        let raw = time.to_bytes();
        assert_eq!(&raw[0..2], &[0, 0]);
        assert_eq!(
            SecondaryHeaderTime::from_bytes(u2::new(0), &raw),
            Ok(time)
        );
        let datetime = time.to_datetime(2023).unwrap();
        assert_eq!(datetime.month(), 2);
        assert_eq!(datetime.day(), 1);
        assert_eq!(datetime.hour(), 1);
        assert_eq!(datetime.minute(), 2);
        assert_eq!(datetime.second(), 3);
        assert_eq!(datetime.nanosecond(), 40_056_000);
    }

    #[test]
    fn test_ieee1588_time() {
        let time = SecondaryHeaderTime::Ieee1588 {
            seconds: 1_700_000_000,
            nanoseconds: 123_456_789,
        };
        let raw = time.to_bytes();
        assert_eq!(&raw[0..4], &123_456_789u32.to_le_bytes());
        let decoded = SecondaryHeaderTime::from_bytes(u2::new(1), &raw).unwrap();
        assert_eq!(decoded, time);
        assert_eq!(decoded.format(), u2::new(1));
        let datetime = decoded.to_datetime(0).unwrap();
        assert_eq!(datetime.timestamp(), 1_700_000_000);
        assert_eq!(datetime.timestamp_subsec_nanos(), 123_456_789);
    }

    #[test]
    fn test_unsupported_secondary_time_format() {
        assert_eq!(
            SecondaryHeaderTime::from_bytes(u2::new(2), &[0; 8]),
            Err(2)
        );
    }
}
