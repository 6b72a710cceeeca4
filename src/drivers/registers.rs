//! DS1307 / DS3231 / DS3232 register codec
//!
//! Pure translation between register bytes and crate types; nothing here
//! touches the bus. Decoding accepts any byte pattern. Encoding refuses
//! values the addressed variant cannot represent.
//!
//! Alarm registers interleave mode bits with BCD data: bit 7 of each alarm
//! byte marks that field as "don't care" and bit 6 of the day byte selects
//! day-of-week instead of date. Outside this module alarms are plain
//! [`AlarmConfig`] values.

use core::ops::BitOr;

use crate::datetime::DateTime;
use crate::drivers::model::RtcModel;

/// Register map (DS3231 layout unless noted)
pub mod reg {
    // Timekeeping (BCD)
    pub const SECONDS: u8 = 0x00; // bit7: CH on DS1307
    pub const MINUTES: u8 = 0x01;
    pub const HOURS: u8 = 0x02;   // bit6: 12h mode, unused here
    pub const WEEKDAY: u8 = 0x03;
    pub const DATE: u8 = 0x04;
    pub const MONTH: u8 = 0x05;   // bit7: century on DS323x
    pub const YEAR: u8 = 0x06;

    // Alarms
    pub const ALARM1_SECONDS: u8 = 0x07;
    pub const ALARM1_MINUTES: u8 = 0x08;
    pub const ALARM1_HOURS: u8 = 0x09;
    pub const ALARM1_DAY: u8 = 0x0A;
    pub const ALARM2_MINUTES: u8 = 0x0B;
    pub const ALARM2_HOURS: u8 = 0x0C;
    pub const ALARM2_DAY: u8 = 0x0D;

    pub const CONTROL: u8 = 0x0E;
    pub const STATUS: u8 = 0x0F;
    pub const AGING_OFFSET: u8 = 0x10;
    pub const TEMP_MSB: u8 = 0x11;
    pub const TEMP_LSB: u8 = 0x12;

    pub const DS1307_CONTROL: u8 = 0x07;
}

/// DS3231/DS3232 control register (0x0E)
pub mod control_bits {
    pub const EOSC: u8 = 0x80;  // oscillator stops on battery when set
    pub const BBSQW: u8 = 0x40;
    pub const CONV: u8 = 0x20;
    pub const RS2: u8 = 0x10;
    pub const RS1: u8 = 0x08;
    pub const INTCN: u8 = 0x04; // INT/SQW pin driven by alarms when set
    pub const A2IE: u8 = 0x02;
    pub const A1IE: u8 = 0x01;
}

/// DS3231/DS3232 status register (0x0F)
pub mod status_bits {
    pub const OSF: u8 = 0x80;
    pub const EN32KHZ: u8 = 0x08;
    pub const BSY: u8 = 0x04;
    pub const A2F: u8 = 0x02;
    pub const A1F: u8 = 0x01;
}

/// DS1307 control register (0x07)
pub mod ds1307_control_bits {
    pub const OUT: u8 = 0x80;  // pin level while the square wave is off
    pub const SQWE: u8 = 0x10;
    pub const RS1: u8 = 0x02;
    pub const RS0: u8 = 0x01;
}

const WILDCARD_BIT: u8 = 0x80;
const WEEKDAY_BIT: u8 = 0x40;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CodecError {
    /// Not representable on the addressed chip variant
    Unsupported,
    /// A field lies outside its calendar range
    OutOfRange,
}

/// Convert BCD to binary
pub const fn bcd_to_bin(bcd: u8) -> u8 {
    bcd - 6 * (bcd >> 4)
}

/// Convert binary (0..=99) to BCD
pub const fn bin_to_bcd(bin: u8) -> u8 {
    bin.wrapping_add(6 * (bin / 10))
}

/// Decode the seven time registers (0x00..=0x06).
///
/// The weekday register is ignored; it is recomputed from the date.
pub fn decode_time(raw: &[u8; 7]) -> DateTime {
    DateTime::from_raw(
        bcd_to_bin(raw[6]),
        bcd_to_bin(raw[5] & 0x1F),
        bcd_to_bin(raw[4] & 0x3F),
        bcd_to_bin(raw[2] & 0x3F),
        bcd_to_bin(raw[1] & 0x7F),
        bcd_to_bin(raw[0] & 0x7F),
    )
}

/// Encode the seven time registers (0x00..=0x06), weekday written as zero.
pub fn encode_time(datetime: &DateTime) -> [u8; 7] {
    [
        bin_to_bcd(datetime.second()),
        bin_to_bcd(datetime.minute()),
        bin_to_bcd(datetime.hour()),
        bin_to_bcd(0),
        bin_to_bcd(datetime.day()),
        bin_to_bcd(datetime.month()),
        bin_to_bcd(datetime.year_offset()),
    ]
}

/// DS3231 temperature registers to hundredths of a degree Celsius.
///
/// 10-bit two's complement, 0.25 °C per step, fraction in bits 7:6 of the LSB.
pub const fn decode_temperature(msb: u8, lsb: u8) -> i16 {
    let quarters = ((msb as i8 as i16) << 2) | (lsb >> 6) as i16;
    quarters * 25
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Alarm {
    One,
    Two,
}

impl Alarm {
    pub const fn enable_bit(self) -> u8 {
        match self {
            Alarm::One => control_bits::A1IE,
            Alarm::Two => control_bits::A2IE,
        }
    }

    pub const fn triggered_flag(self) -> StatusFlag {
        match self {
            Alarm::One => StatusFlag::Alarm1Triggered,
            Alarm::Two => StatusFlag::Alarm2Triggered,
        }
    }
}

/// Set of alarm fields
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FieldSet(u8);

impl FieldSet {
    pub const EMPTY: Self = Self(0);
    pub const SECOND: Self = Self(0b0001);
    pub const MINUTE: Self = Self(0b0010);
    pub const HOUR: Self = Self(0b0100);
    pub const DAY: Self = Self(0b1000);

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for FieldSet {
    type Output = FieldSet;

    fn bitor(self, rhs: FieldSet) -> FieldSet {
        self.union(rhs)
    }
}

/// What the alarm's day field is compared against
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DayMatch {
    /// Day of month, 1..=31
    #[default]
    Date,
    /// Day of week, 1..=7
    Weekday,
}

/// How an alarm matches the clock.
///
/// Fields in `wildcards` match every value, so the alarm fires on every tick
/// of the smallest fixed field. Alarm 2 has no seconds register and always
/// fires at second 00.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmMode {
    pub wildcards: FieldSet,
    pub day_match: DayMatch,
    pub enabled: bool,
}

const ALL_FIELDS: FieldSet = FieldSet::SECOND.union(FieldSet::MINUTE).union(FieldSet::HOUR).union(FieldSet::DAY);

impl AlarmMode {
    pub const DISABLED: Self = Self::fixed(FieldSet::EMPTY, DayMatch::Date).disabled();

    // Alarm 1
    /// Every second
    pub const EVERY_SECOND: Self = Self::fixed(ALL_FIELDS, DayMatch::Date);
    /// Every minute at a fixed second
    pub const FIXED_S: Self = Self::fixed(FieldSet::MINUTE.union(FieldSet::HOUR).union(FieldSet::DAY), DayMatch::Date);
    /// Every hour at a fixed minute and second
    pub const FIXED_MS: Self = Self::fixed(FieldSet::HOUR.union(FieldSet::DAY), DayMatch::Date);
    /// Every day at a fixed time
    pub const FIXED_HMS: Self = Self::fixed(FieldSet::DAY, DayMatch::Date);
    /// Every month on a fixed date and time
    pub const FIXED_DATE_HMS: Self = Self::fixed(FieldSet::EMPTY, DayMatch::Date);
    /// Every week on a fixed weekday and time
    pub const FIXED_WEEKDAY_HMS: Self = Self::fixed(FieldSet::EMPTY, DayMatch::Weekday);

    // Alarm 2
    /// Every minute at second 00
    pub const EVERY_MINUTE: Self = Self::fixed(FieldSet::MINUTE.union(FieldSet::HOUR).union(FieldSet::DAY), DayMatch::Date);
    /// Every hour at a fixed minute
    pub const FIXED_M: Self = Self::fixed(FieldSet::HOUR.union(FieldSet::DAY), DayMatch::Date);
    /// Every day at a fixed hour and minute
    pub const FIXED_HM: Self = Self::fixed(FieldSet::DAY, DayMatch::Date);
    pub const FIXED_DATE_HM: Self = Self::fixed(FieldSet::EMPTY, DayMatch::Date);
    pub const FIXED_WEEKDAY_HM: Self = Self::fixed(FieldSet::EMPTY, DayMatch::Weekday);

    /// Enabled mode with the given wildcards
    pub const fn fixed(wildcards: FieldSet, day_match: DayMatch) -> Self {
        Self { wildcards, day_match, enabled: true }
    }

    pub const fn disabled(self) -> Self {
        Self { enabled: false, ..self }
    }

    /// Wildcards must cover every field above the smallest wildcard
    /// (second < minute < hour < day). Alarm 2 has no seconds field.
    pub fn is_rate(self, has_seconds: bool) -> bool {
        if !has_seconds && self.wildcards.contains(FieldSet::SECOND) {
            return false;
        }
        let mut below = false;
        for field in [FieldSet::SECOND, FieldSet::MINUTE, FieldSet::HOUR, FieldSet::DAY] {
            let wild = self.wildcards.contains(field);
            if below && !wild {
                return false;
            }
            below = wild;
        }
        true
    }

    const fn wildcard_bit(self, field: FieldSet) -> u8 {
        if self.wildcards.contains(field) {
            WILDCARD_BIT
        } else {
            0
        }
    }
}

impl Default for AlarmMode {
    fn default() -> Self {
        Self::DISABLED
    }
}

/// One alarm's mode and match values. `second` is always 0 for alarm 2.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmConfig {
    pub mode: AlarmMode,
    pub second: u8,
    pub minute: u8,
    pub hour: u8,
    /// Date (1..=31) or weekday (1..=7) depending on `mode.day_match`
    pub day: u8,
}

impl AlarmConfig {
    pub const fn new(mode: AlarmMode, second: u8, minute: u8, hour: u8, day: u8) -> Self {
        Self { mode, second, minute, hour, day }
    }

    /// The mode must be one of the chip's alarm rates, and fixed fields must
    /// be in range. Wildcard fields are stored as given.
    fn validate(&self, has_seconds: bool) -> Result<(), CodecError> {
        if !self.mode.is_rate(has_seconds) {
            return Err(CodecError::Unsupported);
        }
        let fixed = |field| !self.mode.wildcards.contains(field);
        let day_range = match self.mode.day_match {
            DayMatch::Date => 1..=31,
            DayMatch::Weekday => 1..=7,
        };
        if (has_seconds && fixed(FieldSet::SECOND) && self.second > 59)
            || (fixed(FieldSet::MINUTE) && self.minute > 59)
            || (fixed(FieldSet::HOUR) && self.hour > 23)
            || (fixed(FieldSet::DAY) && !day_range.contains(&self.day))
        {
            return Err(CodecError::OutOfRange);
        }
        Ok(())
    }

    fn encode_day(&self) -> u8 {
        let weekday = match self.mode.day_match {
            DayMatch::Date => 0,
            DayMatch::Weekday => WEEKDAY_BIT,
        };
        (bin_to_bcd(self.day) & 0x3F) | self.mode.wildcard_bit(FieldSet::DAY) | weekday
    }
}

/// Alarm 1 registers 0x07..=0x0A
pub fn encode_alarm1(config: &AlarmConfig) -> Result<[u8; 4], CodecError> {
    config.validate(true)?;
    let mode = config.mode;
    Ok([
        (bin_to_bcd(config.second) & 0x7F) | mode.wildcard_bit(FieldSet::SECOND),
        (bin_to_bcd(config.minute) & 0x7F) | mode.wildcard_bit(FieldSet::MINUTE),
        (bin_to_bcd(config.hour) & 0x3F) | mode.wildcard_bit(FieldSet::HOUR),
        config.encode_day(),
    ])
}

/// Alarm 2 registers 0x0B..=0x0D
pub fn encode_alarm2(config: &AlarmConfig) -> Result<[u8; 3], CodecError> {
    config.validate(false)?;
    let mode = config.mode;
    Ok([
        (bin_to_bcd(config.minute) & 0x7F) | mode.wildcard_bit(FieldSet::MINUTE),
        (bin_to_bcd(config.hour) & 0x3F) | mode.wildcard_bit(FieldSet::HOUR),
        config.encode_day(),
    ])
}

fn decode_wildcard(byte: u8, field: FieldSet) -> FieldSet {
    if byte & WILDCARD_BIT != 0 {
        field
    } else {
        FieldSet::EMPTY
    }
}

fn decode_day_match(day: u8) -> DayMatch {
    if day & WEEKDAY_BIT != 0 {
        DayMatch::Weekday
    } else {
        DayMatch::Date
    }
}

/// Alarm 1 from registers 0x07..=0x0A and the control register.
pub fn decode_alarm1(raw: &[u8; 4], control: u8) -> AlarmConfig {
    let wildcards = decode_wildcard(raw[0], FieldSet::SECOND)
        | decode_wildcard(raw[1], FieldSet::MINUTE)
        | decode_wildcard(raw[2], FieldSet::HOUR)
        | decode_wildcard(raw[3], FieldSet::DAY);
    AlarmConfig {
        mode: AlarmMode {
            wildcards,
            day_match: decode_day_match(raw[3]),
            enabled: control & Alarm::One.enable_bit() != 0,
        },
        second: bcd_to_bin(raw[0] & 0x7F),
        minute: bcd_to_bin(raw[1] & 0x7F),
        hour: bcd_to_bin(raw[2] & 0x3F),
        day: bcd_to_bin(raw[3] & 0x3F),
    }
}

/// Alarm 2 from registers 0x0B..=0x0D and the control register.
pub fn decode_alarm2(raw: &[u8; 3], control: u8) -> AlarmConfig {
    let wildcards = decode_wildcard(raw[0], FieldSet::MINUTE)
        | decode_wildcard(raw[1], FieldSet::HOUR)
        | decode_wildcard(raw[2], FieldSet::DAY);
    AlarmConfig {
        mode: AlarmMode {
            wildcards,
            day_match: decode_day_match(raw[2]),
            enabled: control & Alarm::Two.enable_bit() != 0,
        },
        second: 0,
        minute: bcd_to_bin(raw[0] & 0x7F),
        hour: bcd_to_bin(raw[1] & 0x3F),
        day: bcd_to_bin(raw[2] & 0x3F),
    }
}

/// Square-wave output mode
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SquareWave {
    /// Output off, pin held low (DS1307 only)
    OffLow,
    /// Output off, pin held high. On DS323x the pin becomes the alarm interrupt.
    OffHigh,
    Hz1,
    /// DS3231/DS3232 only
    Hz1024,
    Hz4096,
    Hz8192,
    /// DS1307 only
    Hz32768,
}

/// Bits to keep (`and`) and bits to set (`or`) in the control register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlPatch {
    pub and: u8,
    pub or: u8,
}

impl ControlPatch {
    pub const fn apply(self, control: u8) -> u8 {
        (control & self.and) | self.or
    }
}

/// Control register patch selecting `mode` on `model`.
pub fn encode_square_wave(model: RtcModel, mode: SquareWave) -> Result<ControlPatch, CodecError> {
    let (and, or) = match model {
        RtcModel::Ds1307 => {
            use ds1307_control_bits::*;
            match mode {
                SquareWave::OffLow => (!(OUT | SQWE), 0),
                SquareWave::OffHigh => (!SQWE, OUT),
                SquareWave::Hz1 => (!(RS1 | RS0), SQWE),
                SquareWave::Hz4096 => (!RS1, SQWE | RS0),
                SquareWave::Hz8192 => (!RS0, SQWE | RS1),
                SquareWave::Hz32768 => (0xFF, SQWE | RS1 | RS0),
                SquareWave::Hz1024 => return Err(CodecError::Unsupported),
            }
        }
        RtcModel::Ds3231 | RtcModel::Ds3232 => {
            use control_bits::*;
            match mode {
                SquareWave::OffHigh => (0xFF, INTCN),
                SquareWave::Hz1 => (!(RS2 | RS1 | INTCN), 0),
                SquareWave::Hz1024 => (!(RS2 | INTCN), RS1),
                SquareWave::Hz4096 => (!(RS1 | INTCN), RS2),
                SquareWave::Hz8192 => (!INTCN, RS2 | RS1),
                SquareWave::OffLow | SquareWave::Hz32768 => return Err(CodecError::Unsupported),
            }
        }
    };
    Ok(ControlPatch { and, or })
}

/// Square-wave mode currently selected by a control register value.
pub fn decode_square_wave(model: RtcModel, control: u8) -> SquareWave {
    match model {
        RtcModel::Ds1307 => {
            use ds1307_control_bits::*;
            if control & SQWE == 0 {
                return if control & OUT != 0 { SquareWave::OffHigh } else { SquareWave::OffLow };
            }
            match control & (RS1 | RS0) {
                0 => SquareWave::Hz1,
                RS0 => SquareWave::Hz4096,
                RS1 => SquareWave::Hz8192,
                _ => SquareWave::Hz32768,
            }
        }
        RtcModel::Ds3231 | RtcModel::Ds3232 => {
            use control_bits::*;
            if control & INTCN != 0 {
                return SquareWave::OffHigh;
            }
            match control & (RS2 | RS1) {
                0 => SquareWave::Hz1,
                RS1 => SquareWave::Hz1024,
                RS2 => SquareWave::Hz4096,
                _ => SquareWave::Hz8192,
            }
        }
    }
}

/// Single-bit flags in the DS323x status register
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusFlag {
    /// Oscillator stopped at some point, e.g. after losing both supplies
    OscillatorStopped,
    Alarm1Triggered,
    Alarm2Triggered,
}

impl StatusFlag {
    pub const fn mask(self) -> u8 {
        match self {
            StatusFlag::OscillatorStopped => status_bits::OSF,
            StatusFlag::Alarm1Triggered => status_bits::A1F,
            StatusFlag::Alarm2Triggered => status_bits::A2F,
        }
    }
}

pub const fn decode_status_flag(status: u8, flag: StatusFlag) -> bool {
    status & flag.mask() != 0
}

/// `status` with only `flag` changed.
pub const fn encode_status_flag(status: u8, flag: StatusFlag, set: bool) -> u8 {
    if set {
        status | flag.mask()
    } else {
        status & !flag.mask()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datetime::TimestampFormat;

    const DS1307_MODES: [SquareWave; 6] = [
        SquareWave::OffLow,
        SquareWave::OffHigh,
        SquareWave::Hz1,
        SquareWave::Hz4096,
        SquareWave::Hz8192,
        SquareWave::Hz32768,
    ];

    const DS3231_MODES: [SquareWave; 5] = [
        SquareWave::OffHigh,
        SquareWave::Hz1,
        SquareWave::Hz1024,
        SquareWave::Hz4096,
        SquareWave::Hz8192,
    ];

    #[test]
    fn test_bcd_conversion() {
        assert_eq!(bcd_to_bin(0x23), 23);
        assert_eq!(bcd_to_bin(0x59), 59);
        assert_eq!(bin_to_bcd(23), 0x23);
        assert_eq!(bin_to_bcd(59), 0x59);
        for value in 0..=99u8 {
            assert_eq!(bcd_to_bin(bin_to_bcd(value)), value);
        }
        for tens in 0..=9u8 {
            for ones in 0..=9u8 {
                let byte = (tens << 4) | ones;
                assert_eq!(bin_to_bcd(bcd_to_bin(byte)), byte);
            }
        }
    }

    #[test]
    fn test_any_byte_decodes() {
        for byte in 0..=255u8 {
            let value = decode_time(&[byte; 7]);
            let _ = value.seconds_since_2000();
            let _ = value.day_of_week();
            let _: Result<heapless::String<64>, _> = value.format("DDD DD MMM YYYY hh:mm:ss");
            assert_eq!(value.timestamp(TimestampFormat::Full).len(), 19);
            let _ = decode_alarm1(&[byte; 4], byte);
            let _ = decode_alarm2(&[byte; 3], byte);
            let _ = decode_square_wave(RtcModel::Ds1307, byte);
            let _ = decode_square_wave(RtcModel::Ds3231, byte);
        }
    }

    #[test]
    fn test_decode_time_masks_flag_bits() {
        let value = decode_time(&[0x80, 0x30, 0x15, 0x04, 0x14, 0x83, 0x24]);
        assert_eq!(value.year(), 2024);
        assert_eq!(value.month(), 3);
        assert_eq!(value.day(), 14);
        assert_eq!(value.hour(), 15);
        assert_eq!(value.minute(), 30);
        assert_eq!(value.second(), 0);
    }

    #[test]
    fn test_encode_time_zero_weekday() {
        let value = DateTime::new(2024, 2, 29, 23, 59, 58).unwrap();
        assert_eq!(encode_time(&value), [0x58, 0x59, 0x23, 0x00, 0x29, 0x02, 0x24]);
    }

    #[test]
    fn test_alarm1_fixed_hms_packing() {
        let config = AlarmConfig::new(AlarmMode::FIXED_HMS, 30, 15, 8, 1);
        let raw = encode_alarm1(&config).unwrap();
        assert_eq!(raw, [0x30, 0x15, 0x08, 0x81]);
        assert_eq!(raw[0] & WILDCARD_BIT, 0);
        assert_eq!(raw[1] & WILDCARD_BIT, 0);
        assert_eq!(raw[2] & WILDCARD_BIT, 0);
        assert_eq!(raw[3] & WILDCARD_BIT, WILDCARD_BIT);

        let decoded = decode_alarm1(&raw, control_bits::A1IE);
        assert_eq!(decoded, config);
        assert!(decoded.mode.wildcards.contains(FieldSet::DAY));
        assert!(!decoded.mode.wildcards.contains(FieldSet::HOUR));
    }

    #[test]
    fn test_alarm1_every_second_and_weekday() {
        let raw = encode_alarm1(&AlarmConfig::new(AlarmMode::EVERY_SECOND, 0, 0, 0, 1)).unwrap();
        assert!(raw.iter().all(|byte| byte & WILDCARD_BIT != 0));

        let config = AlarmConfig::new(AlarmMode::FIXED_WEEKDAY_HMS, 5, 4, 23, 7);
        let raw = encode_alarm1(&config).unwrap();
        assert_eq!(raw, [0x05, 0x04, 0x23, 0x47]);
        assert_eq!(decode_alarm1(&raw, control_bits::A1IE), config);
    }

    #[test]
    fn test_alarm1_enable_comes_from_control() {
        let raw = encode_alarm1(&AlarmConfig::new(AlarmMode::FIXED_MS, 0, 30, 0, 1)).unwrap();
        assert!(!decode_alarm1(&raw, control_bits::A2IE).mode.enabled);
        assert!(decode_alarm1(&raw, control_bits::A1IE).mode.enabled);
    }

    #[test]
    fn test_alarm2_packing() {
        let config = AlarmConfig::new(AlarmMode::FIXED_WEEKDAY_HM, 0, 45, 7, 3);
        let raw = encode_alarm2(&config).unwrap();
        assert_eq!(raw, [0x45, 0x07, 0x43]);
        assert_eq!(decode_alarm2(&raw, control_bits::A2IE), config);

        let raw = encode_alarm2(&AlarmConfig::new(AlarmMode::EVERY_MINUTE, 0, 0, 0, 1)).unwrap();
        assert_eq!(raw, [0x80, 0x80, 0x81]);
    }

    #[test]
    fn test_alarm2_ignores_seconds() {
        let decoded = decode_alarm2(&encode_alarm2(&AlarmConfig::new(AlarmMode::FIXED_HM, 42, 1, 2, 1)).unwrap(), 0);
        assert_eq!(decoded.second, 0);
    }

    #[test]
    fn test_alarm_field_ranges() {
        assert_eq!(encode_alarm1(&AlarmConfig::new(AlarmMode::FIXED_HMS, 60, 0, 0, 1)), Err(CodecError::OutOfRange));
        assert_eq!(encode_alarm1(&AlarmConfig::new(AlarmMode::FIXED_HMS, 0, 0, 24, 1)), Err(CodecError::OutOfRange));
        assert_eq!(encode_alarm1(&AlarmConfig::new(AlarmMode::FIXED_WEEKDAY_HMS, 0, 0, 0, 8)), Err(CodecError::OutOfRange));
        assert_eq!(encode_alarm2(&AlarmConfig::new(AlarmMode::FIXED_DATE_HM, 0, 0, 0, 0)), Err(CodecError::OutOfRange));
        // wildcard day is not checked
        assert!(encode_alarm1(&AlarmConfig::new(AlarmMode::FIXED_HMS, 0, 0, 0, 0)).is_ok());
    }

    #[test]
    fn test_alarm_rates_only() {
        let second_only = AlarmMode::fixed(FieldSet::SECOND, DayMatch::Date);
        assert_eq!(encode_alarm1(&AlarmConfig::new(second_only, 0, 15, 8, 1)), Err(CodecError::Unsupported));

        let hour_gap = AlarmMode::fixed(FieldSet::MINUTE | FieldSet::DAY, DayMatch::Date);
        assert_eq!(encode_alarm1(&AlarmConfig::new(hour_gap, 0, 0, 8, 1)), Err(CodecError::Unsupported));
        assert_eq!(encode_alarm2(&AlarmConfig::new(hour_gap, 0, 0, 8, 1)), Err(CodecError::Unsupported));

        // seconds wildcard on alarm 2, even with everything else wild
        assert_eq!(encode_alarm2(&AlarmConfig::new(AlarmMode::EVERY_SECOND, 0, 0, 0, 1)), Err(CodecError::Unsupported));

        for mode in [
            AlarmMode::EVERY_SECOND,
            AlarmMode::FIXED_S,
            AlarmMode::FIXED_MS,
            AlarmMode::FIXED_HMS,
            AlarmMode::FIXED_DATE_HMS,
            AlarmMode::FIXED_WEEKDAY_HMS,
        ] {
            assert!(mode.is_rate(true));
        }
        for mode in [
            AlarmMode::EVERY_MINUTE,
            AlarmMode::FIXED_M,
            AlarmMode::FIXED_HM,
            AlarmMode::FIXED_DATE_HM,
            AlarmMode::FIXED_WEEKDAY_HM,
        ] {
            assert!(mode.is_rate(false));
        }
    }

    #[test]
    fn test_square_wave_bijection() {
        for (model, modes) in [(RtcModel::Ds1307, &DS1307_MODES[..]), (RtcModel::Ds3231, &DS3231_MODES[..])] {
            for &mode in modes {
                let patch = encode_square_wave(model, mode).unwrap();
                for start in [0x00u8, 0xFF, 0x5A, 0xA5] {
                    assert_eq!(decode_square_wave(model, patch.apply(start)), mode);
                }
            }
        }
    }

    #[test]
    fn test_square_wave_unsupported() {
        assert_eq!(encode_square_wave(RtcModel::Ds1307, SquareWave::Hz1024), Err(CodecError::Unsupported));
        assert_eq!(encode_square_wave(RtcModel::Ds3231, SquareWave::Hz32768), Err(CodecError::Unsupported));
        assert_eq!(encode_square_wave(RtcModel::Ds3232, SquareWave::OffLow), Err(CodecError::Unsupported));
    }

    #[test]
    fn test_square_wave_keeps_alarm_enables() {
        let patch = encode_square_wave(RtcModel::Ds3231, SquareWave::Hz4096).unwrap();
        let control = control_bits::INTCN | control_bits::A1IE | control_bits::A2IE;
        assert_eq!(patch.apply(control), control_bits::RS2 | control_bits::A1IE | control_bits::A2IE);
    }

    #[test]
    fn test_status_flag_read_modify_write() {
        let status = status_bits::OSF | status_bits::A2F | status_bits::A1F;
        assert!(decode_status_flag(status, StatusFlag::OscillatorStopped));

        let cleared = encode_status_flag(status, StatusFlag::OscillatorStopped, false);
        assert_eq!(cleared, 0b0000_0011);
        assert!(decode_status_flag(cleared, StatusFlag::Alarm1Triggered));
        assert!(decode_status_flag(cleared, StatusFlag::Alarm2Triggered));

        assert_eq!(encode_status_flag(0x00, StatusFlag::Alarm2Triggered, true), 0x02);
    }

    #[test]
    fn test_temperature() {
        assert_eq!(decode_temperature(0x19, 0x40), 2525);
        assert_eq!(decode_temperature(0x00, 0x00), 0);
        assert_eq!(decode_temperature(0xFF, 0xC0), -25);
        assert_eq!(decode_temperature(0xE6, 0x00), -2600);
    }
}
