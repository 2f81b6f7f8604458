//! Snapshot: the full set of readings returned by one successful poll.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{SensorField, SensorValue};

/// Field name to scalar value, as reported by one poll.
///
/// Keys outside the known [`SensorField`] set are kept so nothing the hub
/// reports is silently lost, but they never produce entities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(BTreeMap<String, SensorValue>);

impl Snapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn get(&self, field: SensorField) -> Option<&SensorValue> {
        self.0.get(field.key())
    }

    #[must_use]
    pub fn get_key(&self, key: &str) -> Option<&SensorValue> {
        self.0.get(key)
    }

    #[must_use]
    pub fn contains(&self, field: SensorField) -> bool {
        self.0.contains_key(field.key())
    }

    /// Insert or replace a reading, returning the previous value.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<SensorValue>,
    ) -> Option<SensorValue> {
        self.0.insert(key.into(), value.into())
    }

    /// Known fields present in this snapshot, in [`SensorField::ALL`] order.
    pub fn present_fields(&self) -> impl Iterator<Item = SensorField> + '_ {
        SensorField::ALL
            .into_iter()
            .filter(|field| self.contains(*field))
    }
}

impl<K: Into<String>, V: Into<SensorValue>> FromIterator<(K, V)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
