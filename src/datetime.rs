//! Calendar date/time for the RTC's 2000..=2099 window
//!
//! Features:
//! - Conversion between calendar fields, days since 2000-01-01, seconds since
//!   2000 and Unix time
//! - Day of week (0 = Sunday)
//! - Template rendering (`YYYY-MM-DD hh:mm:ss`, `DDD DD MMM`, ...) and
//!   ISO-8601 timestamps into `heapless` strings
//! - Span arithmetic with [`TimeSpan`]
//!
//! Day-of-month is only checked against 1..=31. Feeding 31 for a 30-day
//! month produces a consistent day count that lands in the next month.

use core::cmp::Ordering;
use core::fmt::{self, Write};
use core::hash::{Hash, Hasher};

use heapless::String;

use crate::timespan::TimeSpan;

pub const SECONDS_PER_DAY: i64 = 86_400;

/// Unix time of 2000-01-01T00:00:00
pub const SECONDS_FROM_1970_TO_2000: i64 = 946_684_800;

/// Seconds since 2000 of 2099-12-31T23:59:59
pub const MAX_SECONDS_SINCE_2000: i64 = 36_525 * SECONDS_PER_DAY - 1;

/// January to November; December is never needed by the day counting.
const DAYS_IN_MONTH: [u8; 11] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30];

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Leap years in 2000..=2099 are exactly the multiples of four.
const fn is_leap(year_offset: u8) -> bool {
    year_offset % 4 == 0
}

/// Output layout for [`DateTime::timestamp`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimestampFormat {
    /// `YYYY-MM-DDThh:mm:ss`
    Full,
    /// `YYYY-MM-DD`
    Date,
    /// `hh:mm:ss`
    Time,
}

/// A wall-clock instant between 2000-01-01T00:00:00 and 2099-12-31T23:59:59.
///
/// No time zone is attached. Equality, ordering and hashing all go through
/// [`DateTime::seconds_since_2000`].
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DateTime {
    year_offset: u8, // years after 2000
    month: u8,       // 1..=12
    day: u8,         // 1..=31
    hour: u8,        // 0..=23
    minute: u8,      // 0..=59
    second: u8,      // 0..=59
}

impl DateTime {
    /// Build from calendar fields.
    ///
    /// `year` is either a full year (2000..=2099) or an offset from 2000
    /// (0..=99). Returns `None` when any field is outside its range.
    pub const fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Option<Self> {
        let year_offset = if year >= 2000 { year - 2000 } else { year };
        if year_offset > 99
            || month == 0
            || month > 12
            || day == 0
            || day > 31
            || hour > 23
            || minute > 59
            || second > 59
        {
            return None;
        }
        Some(Self::from_raw(year_offset as u8, month, day, hour, minute, second))
    }

    /// Unchecked construction used by the register codec, which must accept
    /// whatever bytes the chip hands back.
    pub(crate) const fn from_raw(year_offset: u8, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self { year_offset, month, day, hour, minute, second }
    }

    /// Inverse of [`DateTime::seconds_since_2000`]. `None` outside 2000..=2099.
    pub fn from_seconds_since_2000(seconds: i64) -> Option<Self> {
        if !(0..=MAX_SECONDS_SINCE_2000).contains(&seconds) {
            return None;
        }

        let second = (seconds % 60) as u8;
        let minutes = seconds / 60;
        let minute = (minutes % 60) as u8;
        let hours = minutes / 60;
        let hour = (hours % 24) as u8;
        let mut days = (hours / 24) as u32;

        let mut year_offset = 0u8;
        loop {
            let year_len = if is_leap(year_offset) { 366 } else { 365 };
            if days < year_len {
                break;
            }
            days -= year_len;
            year_offset += 1;
        }

        let leap = is_leap(year_offset);
        let mut month = 1u8;
        while month < 12 {
            let mut month_len = u32::from(DAYS_IN_MONTH[usize::from(month - 1)]);
            if leap && month == 2 {
                month_len += 1;
            }
            if days < month_len {
                break;
            }
            days -= month_len;
            month += 1;
        }

        Some(Self::from_raw(year_offset, month, days as u8 + 1, hour, minute, second))
    }

    /// Build from seconds since 1970-01-01. `None` outside 2000..=2099.
    pub fn from_unixtime(unixtime: i64) -> Option<Self> {
        Self::from_seconds_since_2000(unixtime.checked_sub(SECONDS_FROM_1970_TO_2000)?)
    }

    /// Parse the compiler-style pair `("Dec 26 2009", "12:34:56")`.
    ///
    /// The tens digit of a two-digit field may be a space (`"Jan  1 2024"`).
    pub fn from_build_strings(date: &str, time: &str) -> Option<Self> {
        let date = date.as_bytes();
        let time = time.as_bytes();
        if date.len() < 11 || time.len() < 8 {
            return None;
        }

        let month = MONTH_NAMES.iter().position(|name| name.as_bytes() == &date[..3])? as u8 + 1;
        let day = two_digits(&date[4..6])?;
        let century = two_digits(&date[7..9])?;
        let year = u16::from(century) * 100 + u16::from(two_digits(&date[9..11])?);
        let hour = two_digits(&time[0..2])?;
        let minute = two_digits(&time[3..5])?;
        let second = two_digits(&time[6..8])?;

        Self::new(year, month, day, hour, minute, second)
    }

    pub const fn year(&self) -> u16 {
        2000 + self.year_offset as u16
    }

    /// Years after 2000, as stored in the chip's year register
    pub const fn year_offset(&self) -> u8 {
        self.year_offset
    }

    pub const fn month(&self) -> u8 {
        self.month
    }

    pub const fn day(&self) -> u8 {
        self.day
    }

    pub const fn hour(&self) -> u8 {
        self.hour
    }

    pub const fn minute(&self) -> u8 {
        self.minute
    }

    pub const fn second(&self) -> u8 {
        self.second
    }

    /// Days elapsed since 2000-01-01 (which is day 0).
    pub fn days_since_2000(&self) -> u32 {
        let years = u32::from(self.year_offset);
        let mut days = u32::from(self.day);
        // `take` caps the walk at the table length for garbage month values
        for month_len in DAYS_IN_MONTH.iter().take(usize::from(self.month.saturating_sub(1))) {
            days += u32::from(*month_len);
        }
        if self.month > 2 && is_leap(self.year_offset) {
            days += 1;
        }
        (days + 365 * years + (years + 3) / 4).saturating_sub(1)
    }

    pub fn seconds_since_2000(&self) -> i64 {
        i64::from(self.days_since_2000()) * SECONDS_PER_DAY
            + i64::from(self.hour) * 3_600
            + i64::from(self.minute) * 60
            + i64::from(self.second)
    }

    /// Seconds since 1970-01-01T00:00:00
    pub fn unixtime(&self) -> i64 {
        self.seconds_since_2000() + SECONDS_FROM_1970_TO_2000
    }

    /// Day of week, 0 = Sunday. 2000-01-01 was a Saturday.
    pub fn day_of_week(&self) -> u8 {
        ((self.days_since_2000() + 6) % 7) as u8
    }

    /// Three-letter English month name, `None` for an out-of-range month.
    pub fn month_name(&self) -> Option<&'static str> {
        MONTH_NAMES.get(usize::from(self.month.checked_sub(1)?)).copied()
    }

    /// Three-letter English weekday name.
    pub fn weekday_name(&self) -> &'static str {
        DAY_NAMES[usize::from(self.day_of_week())]
    }

    pub fn checked_add(&self, span: TimeSpan) -> Option<Self> {
        Self::from_seconds_since_2000(self.seconds_since_2000() + i64::from(span.total_seconds()))
    }

    pub fn checked_sub(&self, span: TimeSpan) -> Option<Self> {
        Self::from_seconds_since_2000(self.seconds_since_2000() - i64::from(span.total_seconds()))
    }

    /// `self - earlier` as a span; `None` if it does not fit in an `i32`
    /// (about 68 years).
    pub fn span_since(&self, earlier: &DateTime) -> Option<TimeSpan> {
        let delta = self.seconds_since_2000() - earlier.seconds_since_2000();
        i32::try_from(delta).ok().map(TimeSpan::new)
    }

    /// Render `template`, replacing tokens left to right:
    ///
    /// | token  | output                 |
    /// |--------|------------------------|
    /// | `YYYY` | 4-digit year           |
    /// | `YY`   | 2-digit year           |
    /// | `MMM`  | month name (`Jan`)     |
    /// | `MM`   | 2-digit month          |
    /// | `DDD`  | weekday name (`Sun`)   |
    /// | `DD`   | 2-digit day            |
    /// | `hh`   | 2-digit hour           |
    /// | `mm`   | 2-digit minute         |
    /// | `ss`   | 2-digit second         |
    ///
    /// Everything else is copied through unchanged.
    pub fn write_formatted<W: Write>(&self, template: &str, out: &mut W) -> fmt::Result {
        let mut rest = template;
        while let Some(ch) = rest.chars().next() {
            let consumed = match Token::at(rest) {
                Some((token, len)) => {
                    self.write_token(token, out)?;
                    len
                }
                None => {
                    out.write_char(ch)?;
                    ch.len_utf8()
                }
            };
            rest = &rest[consumed..];
        }
        Ok(())
    }

    /// [`DateTime::write_formatted`] into a fixed-capacity string.
    ///
    /// Errors when the rendered text does not fit in `N` bytes.
    pub fn format<const N: usize>(&self, template: &str) -> Result<String<N>, fmt::Error> {
        let mut output = String::new();
        self.write_formatted(template, &mut output)?;
        Ok(output)
    }

    /// ISO-8601 style timestamp
    pub fn timestamp(&self, layout: TimestampFormat) -> String<20> {
        let mut output = String::new();
        // At most 19 bytes: every field decodes to at most two digits and the
        // year to four, so the write cannot run out of capacity.
        let _ = match layout {
            TimestampFormat::Full => write!(output, "{}", self),
            TimestampFormat::Date => write!(output, "{:04}-{:02}-{:02}", self.year(), self.month, self.day),
            TimestampFormat::Time => write!(output, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second),
        };
        output
    }

    fn write_token<W: Write>(&self, token: Token, out: &mut W) -> fmt::Result {
        match token {
            Token::Year4 => write!(out, "{:04}", self.year()),
            Token::Year2 => write!(out, "{:02}", self.year_offset % 100),
            Token::MonthName => out.write_str(self.month_name().unwrap_or("???")),
            Token::Month => write!(out, "{:02}", self.month),
            Token::WeekdayName => out.write_str(self.weekday_name()),
            Token::Day => write!(out, "{:02}", self.day),
            Token::Hour => write!(out, "{:02}", self.hour),
            Token::Minute => write!(out, "{:02}", self.minute),
            Token::Second => write!(out, "{:02}", self.second),
        }
    }
}

impl Default for DateTime {
    /// 2000-01-01T00:00:00
    fn default() -> Self {
        Self::from_raw(0, 1, 1, 0, 0, 0)
    }
}

impl PartialEq for DateTime {
    fn eq(&self, other: &Self) -> bool {
        self.seconds_since_2000() == other.seconds_since_2000()
    }
}

impl Eq for DateTime {}

impl PartialOrd for DateTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DateTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.seconds_since_2000().cmp(&other.seconds_since_2000())
    }
}

impl Hash for DateTime {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.seconds_since_2000().hash(state);
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            self.year(),
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second
        )
    }
}

#[derive(Clone, Copy)]
enum Token {
    Year4,
    Year2,
    MonthName,
    Month,
    WeekdayName,
    Day,
    Hour,
    Minute,
    Second,
}

impl Token {
    /// Longest pattern first within each letter.
    const PATTERNS: [(&'static str, Token); 9] = [
        ("YYYY", Token::Year4),
        ("YY", Token::Year2),
        ("MMM", Token::MonthName),
        ("MM", Token::Month),
        ("DDD", Token::WeekdayName),
        ("DD", Token::Day),
        ("hh", Token::Hour),
        ("mm", Token::Minute),
        ("ss", Token::Second),
    ];

    fn at(text: &str) -> Option<(Token, usize)> {
        Self::PATTERNS
            .iter()
            .find(|(pattern, _)| text.starts_with(*pattern))
            .map(|(pattern, token)| (*token, pattern.len()))
    }
}

/// Two ASCII digits, the first of which may be a space.
fn two_digits(pair: &[u8]) -> Option<u8> {
    let &[tens, ones] = pair else {
        return None;
    };
    let tens = match tens {
        b' ' => 0,
        b'0'..=b'9' => tens - b'0',
        _ => return None,
    };
    if !ones.is_ascii_digit() {
        return None;
    }
    Some(tens * 10 + (ones - b'0'))
}
