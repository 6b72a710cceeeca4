//! DS1307 / DS3231 / DS3232 I2C register driver
//!
//! Features:
//! - Burst reads via register pointer + repeated start (`write_read`)
//! - Single-transaction burst writes of up to seven data bytes
//! - Read-modify-write helper for control and status bits
//! - Time read/write through the register codec
//!
//! Caching and variant-aware operations live in `middleware::rtc_api`.

use embedded_hal::i2c::I2c;

use crate::datetime::DateTime;
use crate::drivers::model::RtcModel;
use crate::drivers::registers::{decode_time, encode_time, reg, CodecError};
use crate::hardware::RtcConfig;

/// Largest payload `write_registers` sends in one transaction.
pub const MAX_WRITE_LEN: usize = 7;

/// Driver errors
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Transport failure, including short reads
    I2c(E),
    /// The chip variant lacks the feature
    Unsupported,
    /// RAM address, alarm field or payload length out of range
    OutOfRange,
}

impl<E> From<CodecError> for Error<E> {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Unsupported => Error::Unsupported,
            CodecError::OutOfRange => Error::OutOfRange,
        }
    }
}

/// Register-level driver owning the bus handle
pub struct Rtc<I2C> {
    i2c: I2C,
    address: u8,
    model: RtcModel,
}

impl<I2C> Rtc<I2C>
where
    I2C: I2c,
{
    pub fn new(i2c: I2C, config: RtcConfig) -> Self {
        Self {
            i2c,
            address: config.address(),
            model: config.model(),
        }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn model(&self) -> RtcModel {
        self.model
    }

    /// Give the bus back
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Read a single register
    pub fn read_register(&mut self, register: u8) -> Result<u8, Error<I2C::Error>> {
        let mut buffer = [0u8; 1];
        self.read_registers(register, &mut buffer)?;
        Ok(buffer[0])
    }

    /// Read `buffer.len()` consecutive registers starting at `register`
    pub fn read_registers(&mut self, register: u8, buffer: &mut [u8]) -> Result<(), Error<I2C::Error>> {
        self.i2c
            .write_read(self.address, &[register], buffer)
            .map_err(Error::I2c)
    }

    /// Write a single register
    pub fn write_register(&mut self, register: u8, value: u8) -> Result<(), Error<I2C::Error>> {
        self.write_registers(register, &[value])
    }

    /// Write consecutive registers starting at `register` in one transaction
    pub fn write_registers(&mut self, register: u8, data: &[u8]) -> Result<(), Error<I2C::Error>> {
        if data.len() > MAX_WRITE_LEN {
            return Err(Error::OutOfRange);
        }
        let mut buffer = [0u8; MAX_WRITE_LEN + 1];
        buffer[0] = register;
        buffer[1..=data.len()].copy_from_slice(data);
        self.i2c
            .write(self.address, &buffer[..=data.len()])
            .map_err(Error::I2c)
    }

    /// Read `register`, apply `f`, write the result back. Returns the new value.
    pub fn modify_register<F>(&mut self, register: u8, f: F) -> Result<u8, Error<I2C::Error>>
    where
        F: FnOnce(u8) -> u8,
    {
        let old = self.read_register(register)?;
        let new = f(old);
        trace!("rtc reg {:#x}: {:#x} -> {:#x}", register, old, new);
        self.write_register(register, new)?;
        Ok(new)
    }

    pub fn read_datetime(&mut self) -> Result<DateTime, Error<I2C::Error>> {
        let mut buffer = [0u8; 7];
        self.read_registers(reg::SECONDS, &mut buffer)?;
        Ok(decode_time(&buffer))
    }

    /// Write all seven time registers; also restarts a halted DS1307 oscillator.
    pub fn write_datetime(&mut self, datetime: &DateTime) -> Result<(), Error<I2C::Error>> {
        self.write_registers(reg::SECONDS, &encode_time(datetime))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    const ADDR: u8 = 0x68;

    fn rtc(expectations: &[I2cTransaction]) -> Rtc<I2cMock> {
        Rtc::new(I2cMock::new(expectations), RtcConfig::new(RtcModel::Ds3231))
    }

    #[test]
    fn test_read_datetime() {
        let mut dev = rtc(&[I2cTransaction::write_read(
            ADDR,
            vec![reg::SECONDS],
            vec![0x45, 0x30, 0x15, 0x00, 0x29, 0x02, 0x24],
        )]);
        let now = dev.read_datetime().unwrap();
        assert_eq!(now, DateTime::new(2024, 2, 29, 15, 30, 45).unwrap());
        dev.release().done();
    }

    #[test]
    fn test_write_datetime_single_transaction() {
        let mut dev = rtc(&[I2cTransaction::write(
            ADDR,
            vec![reg::SECONDS, 0x00, 0x05, 0x12, 0x00, 0x07, 0x07, 0x25],
        )]);
        dev.write_datetime(&DateTime::new(2025, 7, 7, 12, 5, 0).unwrap()).unwrap();
        dev.release().done();
    }

    #[test]
    fn test_modify_register() {
        let mut dev = rtc(&[
            I2cTransaction::write_read(ADDR, vec![reg::STATUS], vec![0x83]),
            I2cTransaction::write(ADDR, vec![reg::STATUS, 0x03]),
        ]);
        assert_eq!(dev.modify_register(reg::STATUS, |s| s & !0x80).unwrap(), 0x03);
        dev.release().done();
    }

    #[test]
    fn test_bus_error_propagates() {
        let mut dev = rtc(&[
            I2cTransaction::write_read(ADDR, vec![reg::CONTROL], vec![0x00]).with_error(ErrorKind::Other),
        ]);
        assert_eq!(dev.modify_register(reg::CONTROL, |c| c | 0x04), Err(Error::I2c(ErrorKind::Other)));
        dev.release().done();
    }

    #[test]
    fn test_write_too_long() {
        let mut dev = rtc(&[]);
        assert_eq!(dev.write_registers(0x14, &[0u8; 8]), Err(Error::OutOfRange));
        dev.release().done();
    }

    #[test]
    fn test_custom_address() {
        let config = RtcConfig::new(RtcModel::Ds1307).with_address(0x69);
        let mut dev = Rtc::new(I2cMock::new(&[I2cTransaction::write_read(0x69, vec![0x07], vec![0x10])]), config);
        assert_eq!(dev.address(), 0x69);
        assert_eq!(dev.read_register(reg::DS1307_CONTROL).unwrap(), 0x10);
        dev.release().done();
    }
}
