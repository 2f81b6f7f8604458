//! In-process entity registry: the host side of [`EntitySink`].

use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;

use tapohub_domain::id::UniqueId;
use tapohub_domain::sensor::{SensorValue, StateClass};

use crate::ports::{Attributes, EntitySink, HostEntity};

/// Holds every registered entity, in registration order.
#[derive(Default)]
pub struct EntityRegistry {
    entities: RwLock<Vec<Arc<dyn HostEntity>>>,
}

impl EntityRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Look up an entity by its unique id.
    #[must_use]
    pub fn get(&self, unique_id: &str) -> Option<Arc<dyn HostEntity>> {
        self.read()
            .iter()
            .find(|entity| entity.unique_id() == unique_id)
            .cloned()
    }

    #[must_use]
    pub fn all(&self) -> Vec<Arc<dyn HostEntity>> {
        self.read().clone()
    }

    /// Read every entity's current state.
    #[must_use]
    pub fn states(&self) -> Vec<EntityStateView> {
        self.read()
            .iter()
            .map(|entity| EntityStateView::read(entity.as_ref()))
            .collect()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<Arc<dyn HostEntity>>> {
        self.entities.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EntitySink for EntityRegistry {
    fn add_entities(&self, entities: Vec<Arc<dyn HostEntity>>) {
        let mut store = self.entities.write().unwrap_or_else(PoisonError::into_inner);
        for entity in entities {
            if store.iter().any(|known| known.unique_id() == entity.unique_id()) {
                tracing::warn!(
                    unique_id = %entity.unique_id(),
                    "entity already registered, ignoring"
                );
                continue;
            }
            tracing::debug!(
                unique_id = %entity.unique_id(),
                name = entity.name(),
                "entity registered"
            );
            store.push(entity);
        }
    }
}

/// Point-in-time view of one entity, as the host would display it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityStateView {
    pub unique_id: UniqueId,
    pub name: String,
    pub value: Option<SensorValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_class: Option<StateClass>,
    #[serde(skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
}

impl EntityStateView {
    #[must_use]
    pub fn read(entity: &dyn HostEntity) -> Self {
        Self {
            unique_id: entity.unique_id().clone(),
            name: entity.name().to_string(),
            value: entity.native_value(),
            unit: entity.unit().map(str::to_string),
            state_class: entity.state_class(),
            attributes: entity.extra_attributes(),
        }
    }
}
