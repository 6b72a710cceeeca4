//! Signed elapsed-time quantity with one-second resolution.

use core::ops::{Add, Neg, Sub};

/// A signed number of seconds.
///
/// The component accessors decompose the total with truncating division, so
/// every component carries the sign of the total and
/// `days*86400 + hours*3600 + minutes*60 + seconds == total_seconds()`
/// always holds. A span of -90 minutes is 0 days, -1 hours, -30 minutes,
/// 0 seconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeSpan(i32);

impl TimeSpan {
    pub const ZERO: Self = Self(0);

    pub const fn new(seconds: i32) -> Self {
        Self(seconds)
    }

    /// Build from components, e.g. 3h45m is `from_parts(0, 3, 45, 0)`.
    ///
    /// Components may have mixed signs. `None` if the total overflows `i32`.
    pub fn from_parts(days: i16, hours: i8, minutes: i8, seconds: i8) -> Option<Self> {
        let total = i64::from(days) * 86_400
            + i64::from(hours) * 3_600
            + i64::from(minutes) * 60
            + i64::from(seconds);
        i32::try_from(total).ok().map(Self)
    }

    /// Whole days
    pub const fn days(&self) -> i16 {
        (self.0 / 86_400) as i16
    }

    /// Hours within the day, -23..=23
    pub const fn hours(&self) -> i8 {
        (self.0 / 3_600 % 24) as i8
    }

    /// Minutes within the hour, -59..=59
    pub const fn minutes(&self) -> i8 {
        (self.0 / 60 % 60) as i8
    }

    /// Seconds within the minute, -59..=59
    pub const fn seconds(&self) -> i8 {
        (self.0 % 60) as i8
    }

    pub const fn total_seconds(&self) -> i32 {
        self.0
    }

    /// `None` on `i32` overflow
    pub const fn checked_add(self, rhs: TimeSpan) -> Option<TimeSpan> {
        match self.0.checked_add(rhs.0) {
            Some(total) => Some(TimeSpan(total)),
            None => None,
        }
    }

    /// `None` on `i32` overflow
    pub const fn checked_sub(self, rhs: TimeSpan) -> Option<TimeSpan> {
        match self.0.checked_sub(rhs.0) {
            Some(total) => Some(TimeSpan(total)),
            None => None,
        }
    }
}

// The operators follow integer semantics and panic on overflow in debug
// builds; use `checked_add` / `checked_sub` near the `i32` limits.

impl From<i32> for TimeSpan {
    fn from(seconds: i32) -> Self {
        Self(seconds)
    }
}

impl Add for TimeSpan {
    type Output = TimeSpan;

    fn add(self, rhs: TimeSpan) -> TimeSpan {
        TimeSpan(self.0 + rhs.0)
    }
}

impl Sub for TimeSpan {
    type Output = TimeSpan;

    fn sub(self, rhs: TimeSpan) -> TimeSpan {
        TimeSpan(self.0 - rhs.0)
    }
}

impl Neg for TimeSpan {
    type Output = TimeSpan;

    fn neg(self) -> TimeSpan {
        TimeSpan(-self.0)
    }
}
