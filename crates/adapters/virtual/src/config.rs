//! Simulated hub configuration.

use serde::Deserialize;

use tapohub_domain::device::ChildDevice;
use tapohub_domain::sensor::{SensorValue, Snapshot};

/// Configuration for the simulated hub.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Child devices registered under the hub, in listing order.
    pub devices: Vec<SimulatedDeviceConfig>,
}

/// One simulated child device.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SimulatedDeviceConfig {
    /// Left empty to simulate a record the hub lists without an identifier.
    pub device_id: Option<String>,
    pub nickname: Option<String>,
    /// Readings returned by every poll until changed.
    pub readings: Snapshot,
}

impl SimulatedDeviceConfig {
    /// The record the hub lists for this device.
    #[must_use]
    pub fn record(&self) -> ChildDevice {
        let mut builder = ChildDevice::builder();
        if let Some(id) = &self.device_id {
            builder = builder.device_id(id.clone());
        }
        if let Some(nickname) = &self.nickname {
            builder = builder.nickname(nickname.clone());
        }
        if let Some(model) = self.readings.get_key("model") {
            builder = builder.extra("model", serde_json::json!(model.to_string()));
        }
        builder
            .extra("category", serde_json::json!("subg.trigger.button"))
            .build()
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            devices: vec![
                demo_device("802E6B7A01", "Hallway", "AA:BB:CC:00:00:01", 100, -58),
                demo_device("802E6B7A02", "Desk", "AA:BB:CC:00:00:02", 64, -71),
            ],
        }
    }
}

fn demo_device(
    id: &str,
    nickname: &str,
    mac: &str,
    battery: i64,
    rssi: i64,
) -> SimulatedDeviceConfig {
    let readings: Snapshot = [
        ("battery_percentage", SensorValue::Int(battery)),
        ("battery_low", SensorValue::Bool(battery < 20)),
        ("model", SensorValue::from("S200B")),
        (
            "firmware_version",
            SensorValue::from("1.12.0 Build 230512 Rel.163523"),
        ),
        ("hardware_version", SensorValue::from("1.0")),
        ("nickname", SensorValue::from(nickname)),
        ("mac", SensorValue::from(mac)),
        ("device_id", SensorValue::from(id)),
        ("rssi", SensorValue::Int(rssi)),
        ("signal_level", SensorValue::Int(if rssi > -65 { 3 } else { 2 })),
        ("at_low_battery", SensorValue::Bool(battery < 20)),
    ]
    .into_iter()
    .collect();

    SimulatedDeviceConfig {
        device_id: Some(id.to_string()),
        nickname: Some(nickname.to_string()),
        readings,
    }
}
