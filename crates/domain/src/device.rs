//! Child device: a sensor button registered under a vendor hub.

use serde::{Deserialize, Serialize};

/// Display label used when the hub reports no nickname.
pub const UNKNOWN_NICKNAME: &str = "Unknown";

/// A child device record as listed by the hub.
///
/// Only `device_id` and `nickname` are interpreted; every other key the hub
/// sends is kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChildDevice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ChildDevice {
    /// Create a builder for constructing a [`ChildDevice`].
    #[must_use]
    pub fn builder() -> ChildDeviceBuilder {
        ChildDeviceBuilder::default()
    }

    /// The stable device identifier, if the hub reported a non-empty one.
    #[must_use]
    pub fn device_id(&self) -> Option<&str> {
        self.device_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Label used to prefix entity names.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.nickname.as_deref().unwrap_or(UNKNOWN_NICKNAME)
    }
}

/// Step-by-step builder for [`ChildDevice`].
#[derive(Debug, Default)]
pub struct ChildDeviceBuilder {
    device_id: Option<String>,
    nickname: Option<String>,
    extra: serde_json::Map<String, serde_json::Value>,
}

impl ChildDeviceBuilder {
    #[must_use]
    pub fn device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    #[must_use]
    pub fn nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }

    #[must_use]
    pub fn extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    #[must_use]
    pub fn build(self) -> ChildDevice {
        ChildDevice {
            device_id: self.device_id,
            nickname: self.nickname,
            extra: self.extra,
        }
    }
}
