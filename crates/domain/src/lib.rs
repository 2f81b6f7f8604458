//! # tapohub-domain
//!
//! Pure domain model for the tapohub sensor-button adapter.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **child devices** as reported by the vendor hub
//! - Define the fixed set of **sensor fields** a button reports, with their
//!   display label, unit and state class
//! - Define **sensor values** and the **snapshot** produced by one poll
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod device;
pub mod sensor;
