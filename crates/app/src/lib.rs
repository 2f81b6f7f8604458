//! # tapohub-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** at the boundaries:
//!   - `TapoApi`: the vendor client (driven/outbound)
//!   - `HostEntity`, `EntitySink`, `PollingSource`: the host object model
//!   - `ButtonFactory`: builds the momentary button entity of a device
//!   - `Integration`: lifecycle of one configured hub
//! - Implement the use-cases:
//!   - `SensorCoordinator`: per-device polling with a never-fail policy
//!   - `TapoSensor`: one entity per reported field
//!   - `TapoIntegration`: discovery and entity registration
//! - Provide **in-process host infrastructure** that doesn't need IO
//!   (`EntityRegistry`, `PollScheduler`)
//!
//! ## Dependency rule
//! Depends on `tapohub-domain` only (plus `tokio` for timers and tasks).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod coordinator;
pub mod ports;
pub mod registry;
pub mod scheduler;
pub mod sensor_entity;
pub mod setup;

#[cfg(test)]
mod testing;
