//! Integration port: lifecycle of one configured hub.
//!
//! An integration bridges a vendor hub into the host. It discovers devices on
//! setup, registers their entities through an [`EntitySink`], and hands its
//! polling sources to the host scheduler.

use std::future::Future;

use tapohub_domain::error::TapoError;

use super::host::EntitySink;

/// A pluggable device integration.
///
/// The binary crate calls the lifecycle methods in order:
///
/// 1. [`setup`](Self::setup): discover devices and register entities
/// 2. (the host schedules the integration's polling sources)
/// 3. [`teardown`](Self::teardown): release coordinators
pub trait Integration {
    /// Unique name identifying this integration (e.g. `"tapo"`).
    fn name(&self) -> &'static str;

    /// Discover devices, run first refreshes and register all entities with
    /// `sink` in one batch.
    fn setup(
        &mut self,
        sink: &impl EntitySink,
    ) -> impl Future<Output = Result<SetupReport, TapoError>> + Send;

    /// Called on graceful shutdown.
    fn teardown(&mut self) -> impl Future<Output = Result<(), TapoError>> + Send;
}

/// What a setup pass found and registered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetupReport {
    /// Child devices listed by the hub.
    pub devices_found: usize,
    /// Devices skipped because they carried no identifier.
    pub devices_skipped: usize,
    /// Coordinators created, one per device with an identifier.
    pub coordinators: usize,
    /// Entities handed to the sink, button entities included.
    pub entities: usize,
}
