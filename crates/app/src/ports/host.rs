//! Host ports: the object model the adapter plugs into.
//!
//! The host owns scheduling and the entity registry. The adapter hands it
//! polling sources to drive and entities to register; nothing here knows how
//! the host stores or displays them.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tapohub_domain::error::TapoError;
use tapohub_domain::id::UniqueId;
use tapohub_domain::sensor::{SensorValue, StateClass};

/// Extra, diagnostic attributes reported next to an entity's value.
pub type Attributes = BTreeMap<String, String>;

/// A single host-visible reading.
///
/// Getters are synchronous and cheap: implementations read from state kept
/// fresh by a [`PollingSource`], never from the network.
pub trait HostEntity: Send + Sync {
    fn unique_id(&self) -> &UniqueId;

    fn name(&self) -> &str;

    /// Current value, or `None` when nothing is known.
    fn native_value(&self) -> Option<SensorValue>;

    fn unit(&self) -> Option<&str> {
        None
    }

    fn state_class(&self) -> Option<StateClass> {
        None
    }

    fn extra_attributes(&self) -> Attributes {
        Attributes::new()
    }
}

/// Host callback registering entities in bulk.
pub trait EntitySink: Send + Sync {
    fn add_entities(&self, entities: Vec<Arc<dyn HostEntity>>);
}

impl<T: EntitySink> EntitySink for Arc<T> {
    fn add_entities(&self, entities: Vec<Arc<dyn HostEntity>>) {
        (**self).add_entities(entities);
    }
}

/// Something the host refreshes on a fixed interval.
///
/// The source never schedules itself.
pub trait PollingSource: Send + Sync {
    fn name(&self) -> &str;

    fn update_interval(&self) -> Duration;

    /// Run one refresh cycle.
    fn refresh(&self) -> impl Future<Output = Result<(), TapoError>> + Send;
}
