//! # dsrtc
//!
//! Blocking `embedded-hal` 1.0 driver for the DS1307, DS3231 and DS3232
//! real-time clocks.
//!
//! ## Layout:
//! - `datetime` / `timespan`: calendar arithmetic for 2000..=2099
//! - `drivers::registers`: BCD and alarm/square-wave/status bit codec
//! - `drivers::rtc`: raw register access over I2C
//! - `middleware::rtc_api`: `RtcSession`, a cached view of one chip
//! - `hardware`: bus address and chip variant
//!
//! Logging goes through `defmt` or `log` when the matching feature is enabled.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod datetime;
pub mod drivers;
pub mod hardware;
pub mod middleware;
pub mod timespan;

pub use datetime::{DateTime, TimestampFormat};
pub use drivers::model::RtcModel;
pub use drivers::registers::{Alarm, AlarmConfig, AlarmMode, DayMatch, FieldSet, SquareWave, StatusFlag};
pub use drivers::rtc::{Error, Rtc};
pub use hardware::{RtcConfig, DEFAULT_ADDRESS};
pub use middleware::rtc_api::{RtcSession, RtcState};
pub use timespan::TimeSpan;
