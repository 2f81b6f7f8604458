//! Simulated hub: an in-memory stand-in for the vendor API.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::{Mutex, PoisonError, RwLock};
use std::time::Duration;

use tapohub_app::ports::{AuthClock, TapoApi};
use tapohub_domain::device::ChildDevice;
use tapohub_domain::error::ApiError;
use tapohub_domain::sensor::{SensorValue, Snapshot};
use tapohub_domain::time::{Timestamp, now};

use crate::config::SimulatorConfig;

/// Scripted outcome of the next sensor fetch for a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    /// The hub answers without data.
    Missing,
    /// The client reports its own timeout.
    Timeout,
    /// The transport fails.
    Error,
    /// The hub rejects the session.
    Unauthorized,
    /// The request never completes.
    Hang,
}

/// Kind of press reported by a sensor button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressKind {
    SingleClick,
    DoubleClick,
    Rotation,
}

impl PressKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SingleClick => "single_click",
            Self::DoubleClick => "double_click",
            Self::Rotation => "rotation",
        }
    }
}

/// One recorded press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonPress {
    pub kind: PressKind,
    pub at: Timestamp,
}

struct Device {
    record: ChildDevice,
    readings: Snapshot,
}

/// In-memory hub serving a fixed set of child devices.
pub struct SimulatedHub {
    devices: RwLock<Vec<Device>>,
    script: Mutex<HashMap<String, VecDeque<FailureMode>>>,
    presses: Mutex<HashMap<String, ButtonPress>>,
    auth_clock: AuthClock,
}

impl SimulatedHub {
    /// Build a hub from configuration and log in.
    #[must_use]
    pub fn new(config: &SimulatorConfig) -> Self {
        let devices = config
            .devices
            .iter()
            .map(|device| Device {
                record: device.record(),
                readings: device.readings.clone(),
            })
            .collect();
        let hub = Self {
            devices: RwLock::new(devices),
            script: Mutex::new(HashMap::new()),
            presses: Mutex::new(HashMap::new()),
            auth_clock: AuthClock::new(),
        };
        hub.reauthenticate();
        hub
    }

    /// Record a fresh successful login.
    pub fn reauthenticate(&self) {
        self.auth_clock.record_now();
        tracing::debug!("simulated hub authenticated");
    }

    /// Change one reading of a device; unknown devices are ignored.
    pub fn set_reading(&self, device_id: &str, key: &str, value: impl Into<SensorValue>) {
        let mut devices = self.devices.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(device) = devices
            .iter_mut()
            .find(|d| d.record.device_id() == Some(device_id))
        {
            device.readings.insert(key, value);
        }
    }

    /// Replace every reading of a device.
    pub fn replace_readings(&self, device_id: &str, readings: Snapshot) {
        let mut devices = self.devices.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(device) = devices
            .iter_mut()
            .find(|d| d.record.device_id() == Some(device_id))
        {
            device.readings = readings;
        }
    }

    /// Make the next fetch for `device_id` fail in the given way.
    pub fn fail_next(&self, device_id: &str, mode: FailureMode) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(device_id.to_string())
            .or_default()
            .push_back(mode);
    }

    /// Record a press on a device's button.
    pub fn press(&self, device_id: &str, kind: PressKind) {
        tracing::debug!(device_id, kind = kind.as_str(), "simulated button press");
        self.presses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(device_id.to_string(), ButtonPress { kind, at: now() });
    }

    /// Most recent press of a device's button.
    #[must_use]
    pub fn last_press(&self, device_id: &str) -> Option<ButtonPress> {
        self.presses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(device_id)
            .copied()
    }

    fn next_failure(&self, device_id: &str) -> Option<FailureMode> {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(device_id)
            .and_then(VecDeque::pop_front)
    }

    fn readings(&self, device_id: &str) -> Option<Snapshot> {
        self.devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|d| d.record.device_id() == Some(device_id))
            .map(|d| d.readings.clone())
    }
}

impl TapoApi for SimulatedHub {
    fn get_all_child_devices(
        &self,
    ) -> impl Future<Output = Result<Vec<ChildDevice>, ApiError>> + Send {
        let records: Vec<ChildDevice> = self
            .devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|d| d.record.clone())
            .collect();
        async { Ok(records) }
    }

    fn get_sensor_data(
        &self,
        device_id: &str,
    ) -> impl Future<Output = Result<Option<Snapshot>, ApiError>> + Send {
        let failure = self.next_failure(device_id);
        let readings = self.readings(device_id);
        async move {
            match failure {
                None => Ok(readings),
                Some(FailureMode::Missing) => Ok(None),
                Some(FailureMode::Timeout) => Err(ApiError::Timeout(Duration::from_secs(5))),
                Some(FailureMode::Error) => {
                    let io = std::io::Error::new(
                        std::io::ErrorKind::ConnectionReset,
                        "hub reset the connection",
                    );
                    Err(ApiError::Transport(Box::new(io)))
                }
                Some(FailureMode::Unauthorized) => Err(ApiError::Unauthorized),
                Some(FailureMode::Hang) => std::future::pending().await,
            }
        }
    }

    fn auth_clock(&self) -> Option<AuthClock> {
        Some(self.auth_clock.clone())
    }
}
