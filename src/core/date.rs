//! Allocation-free date formatting for headers, cookies and logs.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

const WEEKDAYS: [&[u8; 3]; 7] = [b"Thu", b"Fri", b"Sat", b"Sun", b"Mon", b"Tue", b"Wed"];
const MONTHS: [&[u8; 3]; 12] = [
    b"Jan", b"Feb", b"Mar", b"Apr", b"May", b"Jun", b"Jul", b"Aug", b"Sep", b"Oct", b"Nov", b"Dec",
];

/// Last second a four-digit year can express: 9999-12-31 23:59:59 UTC.
pub const MAX_DATE_SECS: u64 = 253_402_300_799;

/// Latest instant [`HttpDate`] can render.
#[inline]
pub fn max_date() -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(MAX_DATE_SECS)
}

/// Broken-down UTC calendar time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Civil {
    year: u16,
    month: u8,
    day: u8,
    hours: u8,
    minutes: u8,
    seconds: u8,
    weekday: u8,
}

impl Civil {
    /// Split seconds since UNIX_EPOCH. Later times clamp to [`MAX_DATE_SECS`].
    fn from_secs(secs: u64) -> Self {
        let secs = secs.min(MAX_DATE_SECS);
        let day_secs = secs % 86400;
        let hours = (day_secs / 3600) as u8;
        let minutes = ((day_secs % 3600) / 60) as u8;
        let seconds = (day_secs % 60) as u8;

        let days = secs / 86400;
        // 1970-01-01 was a Thursday
        let weekday = (days % 7) as u8;

        let mut year = 1970u16;
        let mut remaining = days as i64;
        loop {
            let year_days = if is_leap_year(year) { 366 } else { 365 };
            if remaining < year_days {
                break;
            }
            remaining -= year_days;
            year += 1;
        }

        let month_days: [u8; 12] = if is_leap_year(year) {
            [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31]
        } else {
            [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31]
        };

        let mut month = 1u8;
        for &days_in_month in &month_days {
            if remaining < days_in_month as i64 {
                break;
            }
            remaining -= days_in_month as i64;
            month += 1;
        }

        Self {
            year,
            month,
            day: (remaining + 1) as u8,
            hours,
            minutes,
            seconds,
            weekday,
        }
    }
}

/// RFC 1123 date as used by `Last-Modified`, `Expires` and cookies.
///
/// Format: `Mon, 26 Jul 1997 05:00:00 GMT` (always 29 bytes).
#[derive(Clone, Copy)]
pub struct HttpDate {
    buf: [u8; 29],
}

impl HttpDate {
    /// Current time.
    #[inline]
    pub fn now() -> Self {
        Self::from_system_time(SystemTime::now())
    }

    /// Times before the epoch clamp to the epoch.
    pub fn from_system_time(time: SystemTime) -> Self {
        let since = time.duration_since(UNIX_EPOCH).unwrap_or_default();
        Self::from_civil(Civil::from_secs(since.as_secs()))
    }

    fn from_civil(c: Civil) -> Self {
        let mut buf = [0u8; 29];
        buf[0..3].copy_from_slice(WEEKDAYS[c.weekday as usize]);
        buf[3] = b',';
        buf[4] = b' ';
        write_u8_padded(&mut buf[5..7], c.day);
        buf[7] = b' ';
        buf[8..11].copy_from_slice(MONTHS[(c.month - 1) as usize]);
        buf[11] = b' ';
        write_u16_padded(&mut buf[12..16], c.year);
        buf[16] = b' ';
        write_u8_padded(&mut buf[17..19], c.hours);
        buf[19] = b':';
        write_u8_padded(&mut buf[20..22], c.minutes);
        buf[22] = b':';
        write_u8_padded(&mut buf[23..25], c.seconds);
        buf[25..29].copy_from_slice(b" GMT");
        Self { buf }
    }

    /// Get the date as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        // Only ASCII is ever written into buf
        std::str::from_utf8(&self.buf).unwrap_or_default()
    }
}

impl std::fmt::Display for HttpDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Debug for HttpDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ISO 8601 timestamp with milliseconds, UTC: `2024-12-28T15:04:05.123Z`.
#[derive(Clone, Copy)]
pub struct Iso8601Timestamp {
    buf: [u8; 24],
}

impl Iso8601Timestamp {
    #[inline]
    pub fn now() -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self::from_duration(now)
    }

    /// Create from a Duration since UNIX_EPOCH.
    pub fn from_duration(duration: Duration) -> Self {
        let c = Civil::from_secs(duration.as_secs());
        let millis = duration.subsec_millis() as u16;

        let mut buf = [0u8; 24];
        write_u16_padded(&mut buf[0..4], c.year);
        buf[4] = b'-';
        write_u8_padded(&mut buf[5..7], c.month);
        buf[7] = b'-';
        write_u8_padded(&mut buf[8..10], c.day);
        buf[10] = b'T';
        write_u8_padded(&mut buf[11..13], c.hours);
        buf[13] = b':';
        write_u8_padded(&mut buf[14..16], c.minutes);
        buf[16] = b':';
        write_u8_padded(&mut buf[17..19], c.seconds);
        buf[19] = b'.';
        buf[20] = b'0' + ((millis / 100) % 10) as u8;
        buf[21] = b'0' + ((millis / 10) % 10) as u8;
        buf[22] = b'0' + (millis % 10) as u8;
        buf[23] = b'Z';

        Self { buf }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.buf).unwrap_or_default()
    }
}

impl std::fmt::Display for Iso8601Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[inline]
const fn is_leap_year(year: u16) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Write a 4-digit year to buffer (0000-9999).
#[inline]
fn write_u16_padded(buf: &mut [u8], val: u16) {
    buf[0] = b'0' + ((val / 1000) % 10) as u8;
    buf[1] = b'0' + ((val / 100) % 10) as u8;
    buf[2] = b'0' + ((val / 10) % 10) as u8;
    buf[3] = b'0' + (val % 10) as u8;
}

/// Write a 2-digit value to buffer (00-99).
#[inline]
fn write_u8_padded(buf: &mut [u8], val: u8) {
    buf[0] = b'0' + (val / 10);
    buf[1] = b'0' + (val % 10);
}
