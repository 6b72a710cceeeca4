//! Register-compatible chip variants and what each one supports.

use crate::drivers::registers::reg;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RtcModel {
    /// Time, square wave and 56 bytes of battery-backed RAM
    Ds1307,
    /// Time, two alarms, square wave, temperature sensor
    Ds3231,
    /// DS3231 plus 236 bytes of battery-backed SRAM
    Ds3232,
}

/// User RAM exposed as addresses `0..len`, mapped onto registers starting at `start`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RamWindow {
    pub start: u8,
    pub len: u8,
}

impl RamWindow {
    /// Register address backing RAM byte `address`, if inside the window.
    pub const fn register_for(self, address: u8) -> Option<u8> {
        if address < self.len {
            Some(self.start + address)
        } else {
            None
        }
    }
}

impl RtcModel {
    pub const fn name(self) -> &'static str {
        match self {
            RtcModel::Ds1307 => "DS1307",
            RtcModel::Ds3231 => "DS3231",
            RtcModel::Ds3232 => "DS3232",
        }
    }

    /// Address of the register holding the square-wave bits.
    pub const fn control_register(self) -> u8 {
        match self {
            RtcModel::Ds1307 => reg::DS1307_CONTROL,
            RtcModel::Ds3231 | RtcModel::Ds3232 => reg::CONTROL,
        }
    }

    pub const fn has_alarms(self) -> bool {
        !matches!(self, RtcModel::Ds1307)
    }

    pub const fn has_temperature(self) -> bool {
        !matches!(self, RtcModel::Ds1307)
    }

    /// Status register with the oscillator-stop and alarm flags (0x0F)
    pub const fn has_status_register(self) -> bool {
        !matches!(self, RtcModel::Ds1307)
    }

    pub const fn ram_window(self) -> Option<RamWindow> {
        match self {
            RtcModel::Ds1307 => Some(RamWindow { start: 0x08, len: 56 }),  // 0x08..=0x3F
            RtcModel::Ds3231 => None,
            RtcModel::Ds3232 => Some(RamWindow { start: 0x14, len: 236 }), // 0x14..=0xFF
        }
    }

    /// Bytes read from register 0x00 by a full refresh.
    pub const fn refresh_len(self) -> usize {
        match self {
            RtcModel::Ds1307 => 8,                        // time + control
            RtcModel::Ds3231 | RtcModel::Ds3232 => 19,    // time .. temperature LSB
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ram_windows() {
        let ds1307 = RtcModel::Ds1307.ram_window().unwrap();
        assert_eq!(ds1307.register_for(0), Some(0x08));
        assert_eq!(ds1307.register_for(55), Some(0x3F));
        assert_eq!(ds1307.register_for(56), None);

        let ds3232 = RtcModel::Ds3232.ram_window().unwrap();
        assert_eq!(ds3232.register_for(0), Some(0x14));
        assert_eq!(ds3232.register_for(235), Some(0xFF));
        assert_eq!(ds3232.register_for(236), None);

        assert!(RtcModel::Ds3231.ram_window().is_none());
    }

    #[test]
    fn test_capabilities() {
        assert!(!RtcModel::Ds1307.has_alarms());
        assert!(!RtcModel::Ds1307.has_temperature());
        assert!(RtcModel::Ds3231.has_alarms() && RtcModel::Ds3232.has_temperature());
        assert_eq!(RtcModel::Ds1307.control_register(), 0x07);
        assert_eq!(RtcModel::Ds3232.control_register(), 0x0E);
    }
}
