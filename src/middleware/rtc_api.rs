//! RTC middleware: wraps the raw driver and keeps a cached copy of the
//! device registers.
//!
//! `refresh()` reads every register the variant has in one burst and replaces
//! the cache; getters never touch the bus. Write operations update the
//! matching cache field only after the bus transaction succeeded.

use embedded_hal::i2c::I2c;

use crate::datetime::DateTime;
use crate::drivers::model::RtcModel;
use crate::drivers::registers::{
    control_bits, decode_alarm1, decode_alarm2, decode_square_wave, decode_status_flag,
    decode_temperature, decode_time, encode_alarm1, encode_alarm2, encode_square_wave,
    encode_status_flag, reg, Alarm, AlarmConfig, SquareWave, StatusFlag,
};
use crate::drivers::rtc::{Error, Rtc};
use crate::hardware::RtcConfig;

const MAX_REFRESH_LEN: usize = 19;

/// Cached device state as of the last successful `refresh()`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RtcState {
    pub datetime: DateTime,
    /// Hundredths of a degree Celsius; `None` on DS1307
    pub temperature: Option<i16>,
    pub alarm1: AlarmConfig,
    pub alarm2: AlarmConfig,
    pub square_wave: SquareWave,
    /// Crystal aging trim; `None` on DS1307
    pub aging_offset: Option<i8>,
    /// Oscillator-stop flag; `None` on DS1307
    pub lost_power: Option<bool>,
}

impl Default for RtcState {
    fn default() -> Self {
        Self {
            datetime: DateTime::default(),
            temperature: None,
            alarm1: AlarmConfig::default(),
            alarm2: AlarmConfig::default(),
            square_wave: SquareWave::OffHigh,
            aging_offset: None,
            lost_power: None,
        }
    }
}

/// `N` bytes of a refresh burst starting at register `start`
fn take<const N: usize>(raw: &[u8], start: u8) -> [u8; N] {
    core::array::from_fn(|i| raw.get(usize::from(start) + i).copied().unwrap_or(0))
}

fn decode_alarm(alarm: Alarm, raw: &[u8; 4], control: u8) -> AlarmConfig {
    match alarm {
        Alarm::One => decode_alarm1(raw, control),
        Alarm::Two => decode_alarm2(&take::<3>(raw, 0), control),
    }
}

/// One RTC chip plus its register cache
pub struct RtcSession<I2C> {
    driver: Rtc<I2C>,
    state: RtcState,
    generation: u32,
}

impl<I2C> RtcSession<I2C>
where
    I2C: I2c,
{
    /// No bus traffic until the first `refresh()`.
    pub fn new(i2c: I2C, config: RtcConfig) -> Self {
        Self {
            driver: Rtc::new(i2c, config),
            state: RtcState::default(),
            generation: 0,
        }
    }

    pub fn model(&self) -> RtcModel {
        self.driver.model()
    }

    pub fn config(&self) -> RtcConfig {
        RtcConfig::new(self.driver.model()).with_address(self.driver.address())
    }

    /// Give the bus back
    pub fn release(self) -> I2C {
        self.driver.release()
    }

    /// Re-read the device and replace the cache.
    ///
    /// On failure the cache and generation keep their previous values.
    pub fn refresh(&mut self) -> Result<(), Error<I2C::Error>> {
        let model = self.driver.model();
        let mut buffer = [0u8; MAX_REFRESH_LEN];
        let raw = &mut buffer[..model.refresh_len()];
        self.driver.read_registers(reg::SECONDS, raw)?;

        let datetime = decode_time(&take::<7>(raw, reg::SECONDS));
        let control = raw[usize::from(model.control_register())];
        let mut state = RtcState {
            datetime,
            square_wave: decode_square_wave(model, control),
            ..RtcState::default()
        };

        if model.has_status_register() {
            let status = raw[usize::from(reg::STATUS)];
            let lost_power = decode_status_flag(status, StatusFlag::OscillatorStopped);
            if lost_power {
                warn!("{} oscillator stopped flag set, time may be invalid", model.name());
            }
            state.alarm1 = decode_alarm1(&take::<4>(raw, reg::ALARM1_SECONDS), control);
            state.alarm2 = decode_alarm2(&take::<3>(raw, reg::ALARM2_MINUTES), control);
            state.aging_offset = Some(raw[usize::from(reg::AGING_OFFSET)] as i8);
            state.temperature = Some(decode_temperature(
                raw[usize::from(reg::TEMP_MSB)],
                raw[usize::from(reg::TEMP_LSB)],
            ));
            state.lost_power = Some(lost_power);
        }

        self.state = state;
        self.generation = self.generation.wrapping_add(1);
        trace!("{} refreshed, generation {}", model.name(), self.generation);
        Ok(())
    }

    /// Bumped by every successful `refresh()`
    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn state(&self) -> &RtcState {
        &self.state
    }

    pub fn now(&self) -> DateTime {
        self.state.datetime
    }

    pub fn second(&self) -> u8 {
        self.state.datetime.second()
    }

    pub fn minute(&self) -> u8 {
        self.state.datetime.minute()
    }

    pub fn hour(&self) -> u8 {
        self.state.datetime.hour()
    }

    pub fn day(&self) -> u8 {
        self.state.datetime.day()
    }

    pub fn month(&self) -> u8 {
        self.state.datetime.month()
    }

    pub fn year(&self) -> u16 {
        self.state.datetime.year()
    }

    /// 0 = Sunday
    pub fn day_of_week(&self) -> u8 {
        self.state.datetime.day_of_week()
    }

    pub fn temperature(&self) -> Option<i16> {
        self.state.temperature
    }

    pub fn alarm(&self, alarm: Alarm) -> AlarmConfig {
        match alarm {
            Alarm::One => self.state.alarm1,
            Alarm::Two => self.state.alarm2,
        }
    }

    pub fn square_wave(&self) -> SquareWave {
        self.state.square_wave
    }

    pub fn aging_offset(&self) -> Option<i8> {
        self.state.aging_offset
    }

    /// Set the clock and the cached time.
    pub fn adjust(&mut self, datetime: &DateTime) -> Result<(), Error<I2C::Error>> {
        debug!("{} adjust to {}", self.driver.model().name(), datetime.seconds_since_2000());
        self.driver.write_datetime(datetime)?;
        self.state.datetime = *datetime;
        Ok(())
    }

    /// Program and enable an alarm. Also switches the INT/SQW pin to
    /// interrupt mode, which stops any square-wave output.
    pub fn set_alarm(&mut self, alarm: Alarm, config: AlarmConfig) -> Result<(), Error<I2C::Error>> {
        self.require(self.driver.model().has_alarms(), "alarms")?;
        if !config.mode.enabled {
            return self.disable_alarm(alarm);
        }

        let mut raw = [0u8; 4];
        let (register, len) = match alarm {
            Alarm::One => {
                raw = encode_alarm1(&config)?;
                (reg::ALARM1_SECONDS, 4)
            }
            Alarm::Two => {
                raw[..3].copy_from_slice(&encode_alarm2(&config)?);
                (reg::ALARM2_MINUTES, 3)
            }
        };
        self.driver.write_registers(register, &raw[..len])?;
        let control = self
            .driver
            .modify_register(reg::CONTROL, |c| c | control_bits::INTCN | alarm.enable_bit())?;

        *self.alarm_slot(alarm) = decode_alarm(alarm, &raw, control);
        self.state.square_wave = decode_square_wave(self.driver.model(), control);
        debug!("alarm {:?} set, control {:#x}", alarm, control);
        Ok(())
    }

    /// Clear only this alarm's interrupt enable bit.
    pub fn disable_alarm(&mut self, alarm: Alarm) -> Result<(), Error<I2C::Error>> {
        self.require(self.driver.model().has_alarms(), "alarms")?;
        self.driver.modify_register(reg::CONTROL, |c| c & !alarm.enable_bit())?;
        self.alarm_slot(alarm).mode.enabled = false;
        Ok(())
    }

    /// Acknowledge a fired alarm so the INT pin is released.
    pub fn clear_alarm_flag(&mut self, alarm: Alarm) -> Result<(), Error<I2C::Error>> {
        self.require(self.driver.model().has_alarms(), "alarms")?;
        let flag = alarm.triggered_flag();
        self.driver
            .modify_register(reg::STATUS, |s| encode_status_flag(s, flag, false))?;
        Ok(())
    }

    /// Reads the status register; not cached.
    pub fn alarm_triggered(&mut self, alarm: Alarm) -> Result<bool, Error<I2C::Error>> {
        self.require(self.driver.model().has_alarms(), "alarms")?;
        let status = self.driver.read_register(reg::STATUS)?;
        Ok(decode_status_flag(status, alarm.triggered_flag()))
    }

    /// Whether the oscillator stopped since the flag was last cleared.
    pub fn lost_power(&mut self) -> Result<bool, Error<I2C::Error>> {
        self.require(self.driver.model().has_status_register(), "lost power flag")?;
        let status = self.driver.read_register(reg::STATUS)?;
        let lost = decode_status_flag(status, StatusFlag::OscillatorStopped);
        self.state.lost_power = Some(lost);
        Ok(lost)
    }

    pub fn clear_lost_power(&mut self) -> Result<(), Error<I2C::Error>> {
        self.require(self.driver.model().has_status_register(), "lost power flag")?;
        self.driver.modify_register(reg::STATUS, |s| {
            encode_status_flag(s, StatusFlag::OscillatorStopped, false)
        })?;
        self.state.lost_power = Some(false);
        Ok(())
    }

    /// Alarm enable bits are left alone.
    pub fn set_square_wave(&mut self, mode: SquareWave) -> Result<(), Error<I2C::Error>> {
        let model = self.driver.model();
        let patch = match encode_square_wave(model, mode) {
            Ok(patch) => patch,
            Err(err) => {
                warn!("square wave {:?} not supported on {}", mode, model.name());
                return Err(err.into());
            }
        };
        let control = self
            .driver
            .modify_register(model.control_register(), |c| patch.apply(c))?;
        self.state.square_wave = decode_square_wave(model, control);
        Ok(())
    }

    /// Read battery-backed RAM byte `address` (0-based within the variant's window).
    pub fn read_ram(&mut self, address: u8) -> Result<u8, Error<I2C::Error>> {
        let register = self.ram_register(address)?;
        self.driver.read_register(register)
    }

    pub fn write_ram(&mut self, address: u8, value: u8) -> Result<(), Error<I2C::Error>> {
        let register = self.ram_register(address)?;
        self.driver.write_register(register, value)
    }

    /// Crystal trim, roughly 0.1 ppm per step; positive values slow the clock.
    pub fn set_aging_offset(&mut self, offset: i8) -> Result<(), Error<I2C::Error>> {
        self.require(self.driver.model().has_temperature(), "aging offset")?;
        self.driver.write_register(reg::AGING_OFFSET, offset as u8)?;
        self.state.aging_offset = Some(offset);
        Ok(())
    }

    /// Keep the oscillator running on battery (EOSC cleared).
    pub fn enable_battery(&mut self) -> Result<(), Error<I2C::Error>> {
        self.require(self.driver.model().has_status_register(), "battery control")?;
        self.driver
            .modify_register(reg::CONTROL, |c| c & !control_bits::EOSC)?;
        Ok(())
    }

    /// Stop the oscillator when running on battery (EOSC set).
    pub fn disable_battery(&mut self) -> Result<(), Error<I2C::Error>> {
        self.require(self.driver.model().has_status_register(), "battery control")?;
        self.driver
            .modify_register(reg::CONTROL, |c| c | control_bits::EOSC)?;
        Ok(())
    }

    fn ram_register(&self, address: u8) -> Result<u8, Error<I2C::Error>> {
        let model = self.driver.model();
        let Some(window) = model.ram_window() else {
            warn!("{} has no user RAM", model.name());
            return Err(Error::Unsupported);
        };
        window.register_for(address).ok_or(Error::OutOfRange)
    }

    fn require(&self, supported: bool, feature: &'static str) -> Result<(), Error<I2C::Error>> {
        if supported {
            Ok(())
        } else {
            warn!("{} not supported on {}", feature, self.driver.model().name());
            Err(Error::Unsupported)
        }
    }

    fn alarm_slot(&mut self, alarm: Alarm) -> &mut AlarmConfig {
        match alarm {
            Alarm::One => &mut self.state.alarm1,
            Alarm::Two => &mut self.state.alarm2,
        }
    }
}
