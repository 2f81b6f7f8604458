//! Sensor entity: one host-visible reading per reported field.

use std::sync::Arc;

use tapohub_domain::id::{EntryId, UniqueId};
use tapohub_domain::sensor::{SensorField, SensorValue, StateClass};
use tapohub_domain::time::iso_or_never;

use crate::coordinator::SensorCoordinator;
use crate::ports::{Attributes, HostEntity, TapoApi};

/// Attribute holding the time of the coordinator's last successful poll.
pub const ATTR_LAST_SUCCESSFUL_UPDATE: &str = "last_successful_update";

/// Attribute holding the time of the client's last successful login.
pub const ATTR_LAST_SUCCESSFUL_AUTH: &str = "last_successful_auth";

/// Exposes one [`SensorField`] of a device.
///
/// Holds no value of its own: every read goes to the shared coordinator.
pub struct TapoSensor<A> {
    coordinator: Arc<SensorCoordinator<A>>,
    field: SensorField,
    unique_id: UniqueId,
    name: String,
}

impl<A: TapoApi> TapoSensor<A> {
    pub fn new(
        coordinator: Arc<SensorCoordinator<A>>,
        entry_id: EntryId,
        field: SensorField,
        nickname: &str,
    ) -> Self {
        let unique_id = UniqueId::compose(entry_id, coordinator.device_id(), field.key());
        Self {
            coordinator,
            field,
            unique_id,
            name: format!("{nickname} {}", field.label()),
        }
    }

    #[must_use]
    pub fn field(&self) -> SensorField {
        self.field
    }
}

impl<A: TapoApi> HostEntity for TapoSensor<A> {
    fn unique_id(&self) -> &UniqueId {
        &self.unique_id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn native_value(&self) -> Option<SensorValue> {
        self.coordinator.value(self.field)
    }

    fn unit(&self) -> Option<&str> {
        self.field.unit()
    }

    fn state_class(&self) -> Option<StateClass> {
        self.field.state_class()
    }

    fn extra_attributes(&self) -> Attributes {
        let mut attrs = Attributes::new();
        attrs.insert(
            ATTR_LAST_SUCCESSFUL_UPDATE.to_string(),
            iso_or_never(self.coordinator.last_successful_update()),
        );
        if let Some(clock) = self.coordinator.auth_clock() {
            attrs.insert(
                ATTR_LAST_SUCCESSFUL_AUTH.to_string(),
                iso_or_never(clock.last_successful_auth()),
            );
        }
        attrs
    }
}
