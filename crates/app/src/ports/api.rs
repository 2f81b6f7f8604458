//! Vendor API port: what the adapter needs from a hub client.

use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

use tapohub_domain::device::ChildDevice;
use tapohub_domain::error::ApiError;
use tapohub_domain::sensor::Snapshot;
use tapohub_domain::time::{Timestamp, now};

/// Client for a vendor hub and its child devices.
///
/// Authentication, transport and retries are the implementor's concern.
pub trait TapoApi: Send + Sync {
    /// List every child device registered under the hub.
    fn get_all_child_devices(
        &self,
    ) -> impl Future<Output = Result<Vec<ChildDevice>, ApiError>> + Send;

    /// Fetch the current readings of one device.
    ///
    /// `Ok(None)` means the hub answered but had nothing for this device.
    fn get_sensor_data(
        &self,
        device_id: &str,
    ) -> impl Future<Output = Result<Option<Snapshot>, ApiError>> + Send;

    /// Optional capability: a clock stamped on every successful login.
    ///
    /// Resolved once when a coordinator is built. The default reports no
    /// such capability.
    fn auth_clock(&self) -> Option<AuthClock> {
        None
    }
}

impl<T: TapoApi> TapoApi for Arc<T> {
    fn get_all_child_devices(
        &self,
    ) -> impl Future<Output = Result<Vec<ChildDevice>, ApiError>> + Send {
        (**self).get_all_child_devices()
    }

    fn get_sensor_data(
        &self,
        device_id: &str,
    ) -> impl Future<Output = Result<Option<Snapshot>, ApiError>> + Send {
        (**self).get_sensor_data(device_id)
    }

    fn auth_clock(&self) -> Option<AuthClock> {
        (**self).auth_clock()
    }
}

/// Shared record of the last successful authentication.
///
/// Cloning shares the same underlying timestamp: the client writes, entities
/// read.
#[derive(Debug, Clone, Default)]
pub struct AuthClock(Arc<RwLock<Option<Timestamp>>>);

impl AuthClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful authentication at `ts`.
    pub fn record(&self, ts: Timestamp) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = Some(ts);
    }

    /// Record a successful authentication now.
    pub fn record_now(&self) {
        self.record(now());
    }

    #[must_use]
    pub fn last_successful_auth(&self) -> Option<Timestamp> {
        *self.0.read().unwrap_or_else(PoisonError::into_inner)
    }
}
