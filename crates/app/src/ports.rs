//! Port definitions: traits that adapters and the host implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod api;
pub mod button;
pub mod host;
pub mod integration;

pub use api::{AuthClock, TapoApi};
pub use button::ButtonFactory;
pub use host::{Attributes, EntitySink, HostEntity, PollingSource};
pub use integration::{Integration, SetupReport};
