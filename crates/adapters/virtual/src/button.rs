//! Momentary button entity and the coordinator polling its presses.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use tapohub_app::ports::{Attributes, ButtonFactory, HostEntity, PollingSource};
use tapohub_domain::error::TapoError;
use tapohub_domain::id::{EntryId, UniqueId};
use tapohub_domain::sensor::SensorValue;
use tapohub_domain::time::{Timestamp, iso_or_never, now};

use crate::hub::{ButtonPress, SimulatedHub};

/// Presses are short-lived, so they are polled more often than readings.
pub const BUTTON_UPDATE_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Default)]
struct ButtonState {
    last_press: Option<ButtonPress>,
    last_success: Option<Timestamp>,
}

/// Polls the most recent press of one device's button.
pub struct ButtonCoordinator {
    hub: Arc<SimulatedHub>,
    device_id: String,
    name: String,
    interval: Duration,
    state: RwLock<ButtonState>,
}

impl ButtonCoordinator {
    #[must_use]
    pub fn new(hub: Arc<SimulatedHub>, device_id: &str, interval: Duration) -> Self {
        Self {
            hub,
            device_id: device_id.to_string(),
            name: format!("tapo_button_{device_id}"),
            interval,
            state: RwLock::new(ButtonState::default()),
        }
    }

    #[must_use]
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    #[must_use]
    pub fn last_press(&self) -> Option<ButtonPress> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .last_press
    }

    #[must_use]
    pub fn last_successful_update(&self) -> Option<Timestamp> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .last_success
    }
}

impl PollingSource for ButtonCoordinator {
    fn name(&self) -> &str {
        &self.name
    }

    fn update_interval(&self) -> Duration {
        self.interval
    }

    async fn refresh(&self) -> Result<(), TapoError> {
        let press = self.hub.last_press(&self.device_id);
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if press.is_some() && press != state.last_press {
            tracing::debug!(device_id = %self.device_id, "new button press");
        }
        state.last_press = press.or(state.last_press);
        state.last_success = Some(now());
        Ok(())
    }
}

/// Host entity reporting the kind of the last press.
pub struct ButtonEventSensor {
    coordinator: Arc<ButtonCoordinator>,
    unique_id: UniqueId,
    name: String,
}

impl ButtonEventSensor {
    #[must_use]
    pub fn new(coordinator: Arc<ButtonCoordinator>, entry_id: EntryId, nickname: &str) -> Self {
        let unique_id = UniqueId::compose(entry_id, coordinator.device_id(), "button");
        Self {
            coordinator,
            unique_id,
            name: format!("{nickname} Button"),
        }
    }
}

impl HostEntity for ButtonEventSensor {
    fn unique_id(&self) -> &UniqueId {
        &self.unique_id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn native_value(&self) -> Option<SensorValue> {
        self.coordinator
            .last_press()
            .map(|press| SensorValue::from(press.kind.as_str()))
    }

    fn extra_attributes(&self) -> Attributes {
        let mut attrs = Attributes::new();
        attrs.insert(
            "last_pressed".to_string(),
            iso_or_never(self.coordinator.last_press().map(|p| p.at)),
        );
        attrs.insert(
            "last_successful_update".to_string(),
            iso_or_never(self.coordinator.last_successful_update()),
        );
        attrs
    }
}

/// Builds [`ButtonEventSensor`]s backed by the simulated hub.
///
/// Keeps every coordinator it creates so the host can schedule them.
pub struct SimulatedButtonFactory {
    hub: Arc<SimulatedHub>,
    interval: Duration,
    coordinators: Mutex<Vec<Arc<ButtonCoordinator>>>,
}

impl SimulatedButtonFactory {
    #[must_use]
    pub fn new(hub: Arc<SimulatedHub>) -> Self {
        Self {
            hub,
            interval: BUTTON_UPDATE_INTERVAL,
            coordinators: Mutex::new(Vec::new()),
        }
    }

    /// Coordinators created so far, in creation order.
    #[must_use]
    pub fn coordinators(&self) -> Vec<Arc<ButtonCoordinator>> {
        self.coordinators
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ButtonFactory for SimulatedButtonFactory {
    fn create_button(
        &self,
        entry_id: EntryId,
        device_id: &str,
        nickname: &str,
    ) -> impl Future<Output = Result<Arc<dyn HostEntity>, TapoError>> + Send {
        let coordinator = Arc::new(ButtonCoordinator::new(
            Arc::clone(&self.hub),
            device_id,
            self.interval,
        ));
        self.coordinators
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::clone(&coordinator));
        let nickname = nickname.to_string();
        async move {
            coordinator.refresh().await?;
            let entity: Arc<dyn HostEntity> =
                Arc::new(ButtonEventSensor::new(coordinator, entry_id, &nickname));
            Ok(entity)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulatorConfig;
    use crate::hub::PressKind;

    const DEVICE: &str = "802E6B7A01";

    fn factory() -> (Arc<SimulatedHub>, SimulatedButtonFactory) {
        let hub = Arc::new(SimulatedHub::new(&SimulatorConfig::default()));
        let factory = SimulatedButtonFactory::new(Arc::clone(&hub));
        (hub, factory)
    }

    #[tokio::test]
    async fn should_build_button_entity_with_composite_identity() {
        let (_, factory) = factory();
        let entry: EntryId = "00000000-0000-0000-0000-000000000000".parse().unwrap();

        let entity = factory.create_button(entry, DEVICE, "Hallway").await.unwrap();

        assert_eq!(
            entity.unique_id(),
            &"00000000-0000-0000-0000-000000000000_802E6B7A01_button"
        );
        assert_eq!(entity.name(), "Hallway Button");
        assert_eq!(entity.native_value(), None);
        assert_eq!(factory.coordinators().len(), 1);
    }

    #[tokio::test]
    async fn should_report_last_press_after_refresh() {
        let (hub, factory) = factory();
        let entity = factory
            .create_button(EntryId::new(), DEVICE, "Hallway")
            .await
            .unwrap();

        hub.press(DEVICE, PressKind::DoubleClick);
        assert_eq!(entity.native_value(), None);

        factory.coordinators()[0].refresh().await.unwrap();
        assert_eq!(
            entity.native_value(),
            Some(SensorValue::from("double_click"))
        );
        let attrs = entity.extra_attributes();
        assert_ne!(attrs.get("last_pressed").map(String::as_str), Some("Never"));
    }

    #[tokio::test]
    async fn should_report_never_pressed() {
        let (_, factory) = factory();
        let entity = factory
            .create_button(EntryId::new(), DEVICE, "Hallway")
            .await
            .unwrap();

        let attrs = entity.extra_attributes();
        assert_eq!(attrs.get("last_pressed").map(String::as_str), Some("Never"));
        assert_ne!(
            attrs.get("last_successful_update").map(String::as_str),
            Some("Never")
        );
    }

    #[test]
    fn should_poll_buttons_every_five_seconds_by_default() {
        let (hub, _) = factory();
        let coordinator = ButtonCoordinator::new(hub, DEVICE, BUTTON_UPDATE_INTERVAL);
        assert_eq!(coordinator.update_interval(), Duration::from_secs(5));
        assert_eq!(coordinator.name(), "tapo_button_802E6B7A01");
    }
}
