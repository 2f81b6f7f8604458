//! In-memory fakes of the ports, shared by unit tests.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tapohub_domain::device::ChildDevice;
use tapohub_domain::error::{ApiError, TapoError};
use tapohub_domain::id::{EntryId, UniqueId};
use tapohub_domain::sensor::{SensorValue, Snapshot};

use crate::ports::{AuthClock, ButtonFactory, EntitySink, HostEntity, TapoApi};

pub fn snapshot_of(pairs: &[(&str, SensorValue)]) -> Snapshot {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

/// Scripted answer to one `get_sensor_data` call.
pub enum Reply {
    Data(Snapshot),
    Missing,
    Error(ApiError),
    Hang,
}

#[derive(Default)]
pub struct FakeApi {
    devices: Vec<ChildDevice>,
    list_error: Mutex<Option<ApiError>>,
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    auth_clock: Option<AuthClock>,
}

impl FakeApi {
    pub fn with_devices(devices: Vec<ChildDevice>) -> Self {
        Self {
            devices,
            ..Self::default()
        }
    }

    pub fn with_auth_clock(mut self) -> Self {
        self.auth_clock = Some(AuthClock::new());
        self
    }

    pub fn failing_listing(self, err: ApiError) -> Self {
        *self.list_error.lock().unwrap() = Some(err);
        self
    }

    pub fn push(&self, device_id: &str, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .entry(device_id.to_string())
            .or_default()
            .push_back(reply);
    }
}

impl TapoApi for FakeApi {
    fn get_all_child_devices(
        &self,
    ) -> impl Future<Output = Result<Vec<ChildDevice>, ApiError>> + Send {
        let result = match self.list_error.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(self.devices.clone()),
        };
        async { result }
    }

    fn get_sensor_data(
        &self,
        device_id: &str,
    ) -> impl Future<Output = Result<Option<Snapshot>, ApiError>> + Send {
        let reply = self
            .replies
            .lock()
            .unwrap()
            .get_mut(device_id)
            .and_then(VecDeque::pop_front)
            .unwrap_or(Reply::Missing);
        async move {
            match reply {
                Reply::Data(snapshot) => Ok(Some(snapshot)),
                Reply::Missing => Ok(None),
                Reply::Error(err) => Err(err),
                Reply::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(None)
                }
            }
        }
    }

    fn auth_clock(&self) -> Option<AuthClock> {
        self.auth_clock.clone()
    }
}

/// Sink recording every batch it receives.
#[derive(Default)]
pub struct RecordingSink {
    pub batches: Mutex<Vec<Vec<Arc<dyn HostEntity>>>>,
}

impl RecordingSink {
    pub fn batch_count(&self) -> usize {
        self.batches.lock().unwrap().len()
    }

    pub fn entities(&self) -> Vec<Arc<dyn HostEntity>> {
        self.batches.lock().unwrap().iter().flatten().cloned().collect()
    }
}

impl EntitySink for RecordingSink {
    fn add_entities(&self, entities: Vec<Arc<dyn HostEntity>>) {
        self.batches.lock().unwrap().push(entities);
    }
}

pub struct StubButton {
    unique_id: UniqueId,
    name: String,
}

impl HostEntity for StubButton {
    fn unique_id(&self) -> &UniqueId {
        &self.unique_id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn native_value(&self) -> Option<SensorValue> {
        None
    }
}

/// Button factory producing inert entities, optionally failing.
#[derive(Default)]
pub struct StubButtons {
    pub fail: bool,
    /// Fail only for this device.
    pub fail_for: Option<&'static str>,
    pub created: AtomicUsize,
}

impl ButtonFactory for StubButtons {
    fn create_button(
        &self,
        entry_id: EntryId,
        device_id: &str,
        nickname: &str,
    ) -> impl Future<Output = Result<Arc<dyn HostEntity>, TapoError>> + Send {
        let result: Result<Arc<dyn HostEntity>, TapoError> = if self.fail || self.fail_for == Some(device_id) {
            Err(ApiError::Unauthorized.into())
        } else {
            self.created.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(StubButton {
                unique_id: UniqueId::compose(entry_id, device_id, "button"),
                name: format!("{nickname} Button"),
            }))
        };
        async { result }
    }
}
