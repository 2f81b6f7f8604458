//! Discovery and entity registration for one configured hub.

use std::collections::HashSet;
use std::sync::Arc;

use tapohub_domain::error::TapoError;
use tapohub_domain::id::EntryId;

use crate::coordinator::{CoordinatorConfig, SensorCoordinator};
use crate::ports::{ButtonFactory, EntitySink, HostEntity, Integration, SetupReport, TapoApi};
use crate::sensor_entity::TapoSensor;

/// The sensor-button integration of a single hub entry.
///
/// Owns one [`SensorCoordinator`] per discovered device once
/// [`setup`](Integration::setup) has run. The host is expected to schedule
/// them (see [`coordinators`](Self::coordinators)).
pub struct TapoIntegration<A, B> {
    api: A,
    entry_id: EntryId,
    buttons: B,
    config: CoordinatorConfig,
    coordinators: Vec<Arc<SensorCoordinator<A>>>,
}

impl<A, B> TapoIntegration<A, B>
where
    A: TapoApi + Clone + 'static,
    B: ButtonFactory,
{
    pub fn new(api: A, entry_id: EntryId, buttons: B) -> Self {
        Self {
            api,
            entry_id,
            buttons,
            config: CoordinatorConfig::default(),
            coordinators: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: CoordinatorConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn entry_id(&self) -> EntryId {
        self.entry_id
    }

    /// Coordinators created by the last setup, in discovery order.
    #[must_use]
    pub fn coordinators(&self) -> &[Arc<SensorCoordinator<A>>] {
        &self.coordinators
    }

    #[must_use]
    pub fn buttons(&self) -> &B {
        &self.buttons
    }

    /// Build the coordinator of one device and, when its first snapshot has
    /// data, the device's entities.
    #[tracing::instrument(skip(self, entities))]
    async fn setup_device(
        &self,
        device_id: &str,
        nickname: &str,
        entities: &mut Vec<Arc<dyn HostEntity>>,
    ) -> Result<Arc<SensorCoordinator<A>>, TapoError> {
        tracing::debug!("setting up sensors");
        let coordinator = Arc::new(SensorCoordinator::new(
            self.api.clone(),
            device_id,
            self.config,
        ));
        coordinator.first_refresh().await?;

        let snapshot = coordinator.data();
        tracing::debug!(fields = snapshot.len(), "first snapshot");
        if snapshot.is_empty() {
            return Ok(coordinator);
        }

        for field in snapshot.present_fields() {
            entities.push(Arc::new(TapoSensor::new(
                Arc::clone(&coordinator),
                self.entry_id,
                field,
                nickname,
            )));
        }
        let button = self
            .buttons
            .create_button(self.entry_id, device_id, nickname)
            .await?;
        entities.push(button);

        Ok(coordinator)
    }
}

impl<A, B> Integration for TapoIntegration<A, B>
where
    A: TapoApi + Clone + 'static,
    B: ButtonFactory,
{
    fn name(&self) -> &'static str {
        "tapo"
    }

    #[tracing::instrument(skip_all, fields(entry_id = %self.entry_id))]
    async fn setup(&mut self, sink: &impl EntitySink) -> Result<SetupReport, TapoError> {
        let devices = self.api.get_all_child_devices().await?;
        if devices.is_empty() {
            tracing::warn!("no child devices found");
            return Ok(SetupReport::default());
        }

        tracing::info!(count = devices.len(), "found child devices");

        let mut report = SetupReport {
            devices_found: devices.len(),
            ..SetupReport::default()
        };
        let mut seen = HashSet::new();
        let mut coordinators = Vec::new();
        let mut entities: Vec<Arc<dyn HostEntity>> = Vec::new();

        for device in &devices {
            let nickname = device.display_name();
            let Some(device_id) = device.device_id() else {
                tracing::warn!(nickname, "device without device_id, skipping");
                report.devices_skipped += 1;
                continue;
            };
            if !seen.insert(device_id) {
                tracing::warn!(device_id, nickname, "device listed twice, skipping");
                report.devices_skipped += 1;
                continue;
            }
            let coordinator = self.setup_device(device_id, nickname, &mut entities).await?;
            coordinators.push(coordinator);
        }

        report.coordinators = coordinators.len();
        report.entities = entities.len();
        tracing::info!(count = entities.len(), "setting up sensor entities");
        sink.add_entities(entities);
        self.coordinators = coordinators;

        Ok(report)
    }

    async fn teardown(&mut self) -> Result<(), TapoError> {
        let count = self.coordinators.len();
        self.coordinators.clear();
        tracing::info!(coordinators = count, "tapo integration stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::ports::PollingSource;
    use crate::testing::{FakeApi, RecordingSink, Reply, StubButtons, snapshot_of};
    use tapohub_domain::device::ChildDevice;
    use tapohub_domain::error::ApiError;
    use tapohub_domain::sensor::{SensorValue, Snapshot};

    fn device(id: &str, nickname: &str) -> ChildDevice {
        ChildDevice::builder().device_id(id).nickname(nickname).build()
    }

    fn integration(api: FakeApi) -> TapoIntegration<Arc<FakeApi>, StubButtons> {
        TapoIntegration::new(Arc::new(api), EntryId::new(), StubButtons::default())
    }

    fn full_snapshot() -> Snapshot {
        snapshot_of(&[
            ("battery_percentage", SensorValue::Int(100)),
            ("battery_low", SensorValue::Bool(false)),
            ("model", "S200B".into()),
            ("firmware_version", "1.12.0 Build 230512".into()),
            ("hardware_version", "1.0".into()),
            ("nickname", "Desk".into()),
            ("mac", "AA:BB:CC:DD:EE:FF".into()),
            ("device_id", "dev-1".into()),
            ("rssi", SensorValue::Int(-58)),
            ("signal_level", SensorValue::Int(3)),
            ("at_low_battery", SensorValue::Bool(false)),
        ])
    }

    #[tokio::test]
    async fn should_register_nothing_when_hub_has_no_devices() {
        let mut integration = integration(FakeApi::default());
        let sink = RecordingSink::default();

        let report = integration.setup(&sink).await.unwrap();

        assert_eq!(report, SetupReport::default());
        assert_eq!(sink.batch_count(), 0);
        assert!(integration.coordinators().is_empty());
    }

    #[tokio::test]
    async fn should_create_one_coordinator_per_device_with_id() {
        let api = FakeApi::with_devices(vec![
            device("a", "One"),
            ChildDevice::builder().nickname("No id").build(),
            device("b", "Two"),
            ChildDevice::builder().device_id("").build(),
        ]);
        let mut integration = integration(api);
        let sink = RecordingSink::default();

        let report = integration.setup(&sink).await.unwrap();

        assert_eq!(report.devices_found, 4);
        assert_eq!(report.devices_skipped, 2);
        assert_eq!(report.coordinators, 2);
        let ids: Vec<_> = integration
            .coordinators()
            .iter()
            .map(|c| c.device_id().to_string())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn should_create_entities_only_for_present_fields() {
        let api = FakeApi::with_devices(vec![device("dev-1", "Desk")]);
        api.push(
            "dev-1",
            Reply::Data(snapshot_of(&[
                ("battery_percentage", SensorValue::Int(87)),
                ("rssi", SensorValue::Int(-61)),
            ])),
        );
        let mut integration = integration(api);
        let sink = RecordingSink::default();

        let report = integration.setup(&sink).await.unwrap();

        assert_eq!(report.entities, 3);
        assert_eq!(sink.batch_count(), 1);
        let entities = sink.entities();
        assert_eq!(entities[0].name(), "Desk Battery");
        assert_eq!(entities[0].unit(), Some("%"));
        assert_eq!(entities[1].name(), "Desk Signal Strength (RSSI)");
        assert_eq!(entities[1].unit(), Some("dBm"));
        assert_eq!(entities[2].name(), "Desk Button");
        assert_eq!(integration.buttons().created.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn should_create_every_known_field_in_table_order() {
        let api = FakeApi::with_devices(vec![device("dev-1", "Desk")]);
        api.push("dev-1", Reply::Data(full_snapshot()));
        let mut integration = integration(api);
        let sink = RecordingSink::default();

        integration.setup(&sink).await.unwrap();

        let names: Vec<String> = sink
            .entities()
            .iter()
            .map(|e| e.name().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "Desk Battery",
                "Desk Battery Low",
                "Desk Model",
                "Desk Firmware Version",
                "Desk Hardware Version",
                "Desk Nickname",
                "Desk MAC Address",
                "Desk Device ID",
                "Desk Signal Strength (RSSI)",
                "Desk Signal Level",
                "Desk Low Battery Warning",
                "Desk Button",
            ]
        );
    }

    #[tokio::test]
    async fn should_skip_entities_when_first_snapshot_is_empty() {
        let api = FakeApi::with_devices(vec![device("dev-1", "Desk")]);
        api.push("dev-1", Reply::Missing);
        let mut integration = integration(api);
        let sink = RecordingSink::default();

        let report = integration.setup(&sink).await.unwrap();

        assert_eq!(report.coordinators, 1);
        assert_eq!(report.entities, 0);
        assert_eq!(sink.batch_count(), 1);
        assert!(sink.entities().is_empty());
    }

    #[tokio::test]
    async fn should_use_unknown_label_without_nickname() {
        let api = FakeApi::with_devices(vec![ChildDevice::builder().device_id("dev-1").build()]);
        api.push("dev-1", Reply::Data(snapshot_of(&[("model", "S200B".into())])));
        let mut integration = integration(api);
        let sink = RecordingSink::default();

        integration.setup(&sink).await.unwrap();

        assert_eq!(sink.entities()[0].name(), "Unknown Model");
    }

    #[tokio::test]
    async fn should_not_add_entities_for_fields_appearing_later() {
        let api = FakeApi::with_devices(vec![device("dev-1", "Desk")]);
        api.push("dev-1", Reply::Data(snapshot_of(&[("model", "S200B".into())])));
        api.push(
            "dev-1",
            Reply::Data(snapshot_of(&[
                ("model", "S200B".into()),
                ("rssi", SensorValue::Int(-50)),
            ])),
        );
        let mut integration = integration(api);
        let sink = RecordingSink::default();
        integration.setup(&sink).await.unwrap();

        integration.coordinators()[0].refresh().await.unwrap();

        assert_eq!(sink.entities().len(), 2);
        assert_eq!(sink.batch_count(), 1);
    }

    #[tokio::test]
    async fn should_fail_setup_when_listing_fails() {
        let api = FakeApi::default().failing_listing(ApiError::Unauthorized);
        let mut integration = integration(api);
        let sink = RecordingSink::default();

        let result = integration.setup(&sink).await;

        assert!(matches!(result, Err(TapoError::Api(ApiError::Unauthorized))));
        assert_eq!(sink.batch_count(), 0);
    }

    #[tokio::test]
    async fn should_fail_setup_when_button_cannot_be_built() {
        let api = FakeApi::with_devices(vec![device("dev-1", "Desk")]);
        api.push("dev-1", Reply::Data(snapshot_of(&[("model", "S200B".into())])));
        let mut integration = TapoIntegration::new(
            Arc::new(api),
            EntryId::new(),
            StubButtons {
                fail: true,
                ..StubButtons::default()
            },
        );
        let sink = RecordingSink::default();

        let result = integration.setup(&sink).await;

        assert!(result.is_err());
        assert_eq!(sink.batch_count(), 0);
    }

    #[tokio::test]
    async fn should_keep_no_coordinator_when_a_later_device_fails() {
        let api = FakeApi::with_devices(vec![device("a", "One"), device("b", "Two")]);
        api.push("a", Reply::Data(snapshot_of(&[("model", "S200B".into())])));
        api.push("b", Reply::Data(snapshot_of(&[("model", "S200B".into())])));
        let mut integration = TapoIntegration::new(
            Arc::new(api),
            EntryId::new(),
            StubButtons {
                fail_for: Some("b"),
                ..StubButtons::default()
            },
        );
        let sink = RecordingSink::default();

        let result = integration.setup(&sink).await;

        assert!(result.is_err());
        assert!(integration.coordinators().is_empty());
        assert_eq!(sink.batch_count(), 0);
    }

    #[tokio::test]
    async fn should_replace_coordinators_when_setup_runs_twice() {
        let api = FakeApi::with_devices(vec![device("dev-1", "Desk")]);
        let mut integration = integration(api);
        integration.setup(&RecordingSink::default()).await.unwrap();

        let report = integration.setup(&RecordingSink::default()).await.unwrap();

        assert_eq!(report.coordinators, 1);
        assert_eq!(integration.coordinators().len(), 1);
    }

    #[tokio::test]
    async fn should_skip_device_listed_twice() {
        let api = FakeApi::with_devices(vec![device("dev-1", "Desk"), device("dev-1", "Copy")]);
        api.push("dev-1", Reply::Data(snapshot_of(&[("model", "S200B".into())])));
        let mut integration = integration(api);
        let sink = RecordingSink::default();

        let report = integration.setup(&sink).await.unwrap();

        assert_eq!(report.devices_found, 2);
        assert_eq!(report.devices_skipped, 1);
        assert_eq!(report.coordinators, 1);
        assert_eq!(report.entities, sink.entities().len());
        assert_eq!(sink.entities()[0].name(), "Desk Model");
        assert_eq!(integration.buttons().created.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn should_release_coordinators_on_teardown() {
        let api = FakeApi::with_devices(vec![device("dev-1", "Desk")]);
        let mut integration = integration(api);
        integration.setup(&RecordingSink::default()).await.unwrap();
        assert_eq!(integration.coordinators().len(), 1);

        integration.teardown().await.unwrap();

        assert!(integration.coordinators().is_empty());
        assert_eq!(integration.name(), "tapo");
    }
}
