//! # Hardware configuration
//!
//! Bus address and chip variant for one RTC. Passed to the driver or session
//! at construction; nothing here is global.

use crate::drivers::model::RtcModel;

/// Fixed 7-bit I2C address of the DS1307, DS3231 and DS3232
pub const DEFAULT_ADDRESS: u8 = 0x68;

/// Per-device configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RtcConfig {
    /// 7-bit I2C address
    pub address: u8,
    /// Chip variant; selects the register layout and feature set
    pub model: RtcModel,
}

impl RtcConfig {
    /// Configuration for `model` at [`DEFAULT_ADDRESS`]
    pub const fn new(model: RtcModel) -> Self {
        Self { address: DEFAULT_ADDRESS, model }
    }

    /// Same configuration on another address, e.g. behind an address translator
    pub const fn with_address(self, address: u8) -> Self {
        Self { address, ..self }
    }

    pub const fn address(&self) -> u8 {
        self.address
    }

    pub const fn model(&self) -> RtcModel {
        self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_accessors() {
        let config = RtcConfig::new(RtcModel::Ds3232);
        assert_eq!(config.address(), 0x68);
        assert_eq!(config.model(), RtcModel::Ds3232);

        let moved = config.with_address(0x69);
        assert_eq!(moved.address(), 0x69);
        assert_eq!(moved.model(), RtcModel::Ds3232);
    }
}
