//! The fixed set of fields a sensor button reports.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Host classification hint describing how a numeric reading aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateClass {
    Measurement,
}

impl fmt::Display for StateClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Measurement => f.write_str("measurement"),
        }
    }
}

/// A known snapshot key that maps to one sensor entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorField {
    BatteryPercentage,
    BatteryLow,
    Model,
    FirmwareVersion,
    HardwareVersion,
    Nickname,
    Mac,
    DeviceId,
    Rssi,
    SignalLevel,
    AtLowBattery,
}

impl SensorField {
    /// Every known field, in entity creation order.
    pub const ALL: [Self; 11] = [
        Self::BatteryPercentage,
        Self::BatteryLow,
        Self::Model,
        Self::FirmwareVersion,
        Self::HardwareVersion,
        Self::Nickname,
        Self::Mac,
        Self::DeviceId,
        Self::Rssi,
        Self::SignalLevel,
        Self::AtLowBattery,
    ];

    /// The snapshot key for this field.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::BatteryPercentage => "battery_percentage",
            Self::BatteryLow => "battery_low",
            Self::Model => "model",
            Self::FirmwareVersion => "firmware_version",
            Self::HardwareVersion => "hardware_version",
            Self::Nickname => "nickname",
            Self::Mac => "mac",
            Self::DeviceId => "device_id",
            Self::Rssi => "rssi",
            Self::SignalLevel => "signal_level",
            Self::AtLowBattery => "at_low_battery",
        }
    }

    /// Suffix appended to the device nickname to build the entity name.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::BatteryPercentage => "Battery",
            Self::BatteryLow => "Battery Low",
            Self::Model => "Model",
            Self::FirmwareVersion => "Firmware Version",
            Self::HardwareVersion => "Hardware Version",
            Self::Nickname => "Nickname",
            Self::Mac => "MAC Address",
            Self::DeviceId => "Device ID",
            Self::Rssi => "Signal Strength (RSSI)",
            Self::SignalLevel => "Signal Level",
            Self::AtLowBattery => "Low Battery Warning",
        }
    }

    #[must_use]
    pub fn unit(self) -> Option<&'static str> {
        match self {
            Self::BatteryPercentage => Some("%"),
            Self::Rssi => Some("dBm"),
            _ => None,
        }
    }

    #[must_use]
    pub fn state_class(self) -> Option<StateClass> {
        match self {
            Self::BatteryPercentage | Self::Rssi | Self::SignalLevel => {
                Some(StateClass::Measurement)
            }
            _ => None,
        }
    }
}

impl fmt::Display for SensorField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
