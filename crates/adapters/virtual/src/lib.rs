//! # tapohub-adapter-virtual
//!
//! Simulated Tapo hub with S200B sensor buttons, for testing and
//! demonstration without hardware.
//!
//! ## Provided pieces
//!
//! | Type | Role |
//! |------|------|
//! | [`SimulatedHub`] | Implements `TapoApi`; serves configured devices and scripted failures |
//! | [`SimulatedButtonFactory`] | Implements `ButtonFactory`; builds button entities |
//! | [`ButtonCoordinator`] | Polls the last press of one button |
//! | [`ButtonEventSensor`] | Host entity reporting the last press kind |
//!
//! ## Dependency rule
//!
//! Depends on `tapohub-app` (port traits) and `tapohub-domain` only.

mod button;
mod config;
mod hub;

pub use button::{
    BUTTON_UPDATE_INTERVAL, ButtonCoordinator, ButtonEventSensor, SimulatedButtonFactory,
};
pub use config::{SimulatedDeviceConfig, SimulatorConfig};
pub use hub::{ButtonPress, FailureMode, PressKind, SimulatedHub};
