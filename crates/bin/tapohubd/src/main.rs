//! # tapohubd: tapohub daemon
//!
//! Composition root that wires the simulated hub, the sensor-button
//! integration and the entity registry together, then keeps every device
//! polled until interrupted.
//!
//! ## Responsibilities
//! - Parse configuration (env vars, config file)
//! - Initialise logging
//! - Build the hub client and the button factory (adapters)
//! - Run discovery and register the resulting entities
//! - Schedule every coordinator on its own interval
//! - Periodically log entity states and poll health
//! - Handle graceful shutdown (SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tapohub_adapter_virtual::{SimulatedButtonFactory, SimulatedHub};
use tapohub_app::coordinator::SensorCoordinator;
use tapohub_app::ports::Integration;
use tapohub_app::registry::EntityRegistry;
use tapohub_app::scheduler::PollScheduler;
use tapohub_app::setup::TapoIntegration;
use tokio::time::MissedTickBehavior;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

type HubCoordinator = SensorCoordinator<Arc<SimulatedHub>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;

    let filter = EnvFilter::try_new(&config.logging.filter).context("invalid log filter")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let entry_id = config.hub.entry_id.unwrap_or_default();
    tracing::info!(
        %entry_id,
        devices = config.simulator.devices.len(),
        "starting tapohubd"
    );

    // Adapters
    let hub = Arc::new(SimulatedHub::new(&config.simulator));
    let buttons = SimulatedButtonFactory::new(Arc::clone(&hub));

    // Discovery
    let registry = Arc::new(EntityRegistry::new());
    let mut integration =
        TapoIntegration::new(Arc::clone(&hub), entry_id, buttons).with_config(config.coordinator());
    let report = integration
        .setup(&*registry)
        .await
        .context("failed to set up the tapo integration")?;
    tracing::info!(
        found = report.devices_found,
        skipped = report.devices_skipped,
        coordinators = report.coordinators,
        entities = report.entities,
        "integration ready"
    );

    // Polling
    let mut scheduler = PollScheduler::new();
    for coordinator in integration.coordinators() {
        scheduler.schedule(Arc::clone(coordinator));
    }
    for coordinator in integration.buttons().coordinators() {
        scheduler.schedule(coordinator);
    }

    let status = tokio::spawn(report_status(
        Arc::clone(&registry),
        integration.coordinators().to_vec(),
        config.status_interval(),
    ));

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    tracing::info!("shutting down");

    status.abort();
    scheduler.shutdown();
    integration.teardown().await?;

    Ok(())
}

async fn report_status(
    registry: Arc<EntityRegistry>,
    coordinators: Vec<Arc<HubCoordinator>>,
    period: Duration,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        for state in registry.states() {
            match serde_json::to_string(&state) {
                Ok(json) => tracing::info!(unique_id = %state.unique_id, state = %json, "entity"),
                Err(err) => tracing::warn!(unique_id = %state.unique_id, error = %err, "cannot serialize entity state"),
            }
        }
        for coordinator in &coordinators {
            let health = coordinator.health();
            tracing::info!(
                device_id = coordinator.device_id(),
                polls = health.polls(),
                successes = health.successes,
                missing = health.missing,
                timeouts = health.timeouts,
                failures = health.failures,
                consecutive_failures = health.consecutive_failures,
                "poll health"
            );
        }
    }
}
