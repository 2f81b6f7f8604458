//! Button port: builds the momentary-event entity of a device.

use std::future::Future;
use std::sync::Arc;

use tapohub_domain::error::TapoError;
use tapohub_domain::id::EntryId;

use super::host::HostEntity;

/// Builds the button entity that accompanies a device's sensor entities.
///
/// Implementations usually run their own polling source behind the entity
/// and perform its first refresh here, so a failure surfaces during setup.
pub trait ButtonFactory: Send + Sync {
    fn create_button(
        &self,
        entry_id: EntryId,
        device_id: &str,
        nickname: &str,
    ) -> impl Future<Output = Result<Arc<dyn HostEntity>, TapoError>> + Send;
}
