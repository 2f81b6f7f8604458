//! Sensor readings: the fields a button reports and the snapshot of one poll.

mod field;
mod snapshot;
mod value;

pub use field::{SensorField, StateClass};
pub use snapshot::Snapshot;
pub use value::SensorValue;
