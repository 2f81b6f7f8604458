//! Sensor coordinator: polls one device and caches its latest snapshot.
//!
//! A poll never fails: a missing answer, a timeout or any client error is
//! logged, counted in [`PollHealth`], and turned into an empty snapshot. An
//! empty poll leaves the cached snapshot in place, so entities keep showing
//! the last readings the device reported.

use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use serde::Serialize;

use tapohub_domain::error::{ApiError, TapoError};
use tapohub_domain::sensor::{SensorField, SensorValue, Snapshot};
use tapohub_domain::time::{Timestamp, now};

use crate::ports::{AuthClock, PollingSource, TapoApi};

/// Interval between two refreshes of the same device.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(60);

/// Upper bound on a single sensor fetch.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Consecutive failed polls after which a device is reported as struggling.
pub const FAILURE_STREAK_THRESHOLD: u64 = 5;

/// Timing knobs of a [`SensorCoordinator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorConfig {
    pub update_interval: Duration,
    pub request_timeout: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            update_interval: DEFAULT_UPDATE_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Poll counters kept per coordinator.
///
/// Polls never surface errors to the host, so this is where failures
/// remain visible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PollHealth {
    /// Polls that returned data (possibly an empty mapping).
    pub successes: u64,
    /// Polls where the hub answered without data for the device.
    pub missing: u64,
    pub timeouts: u64,
    pub failures: u64,
    /// Missing, timed-out or failed polls since the last success.
    pub consecutive_failures: u64,
    pub last_error: Option<String>,
}

impl PollHealth {
    /// Total number of polls attempted.
    #[must_use]
    pub fn polls(&self) -> u64 {
        self.successes + self.missing + self.timeouts + self.failures
    }
}

#[derive(Debug, Default)]
struct State {
    snapshot: Snapshot,
    last_success: Option<Timestamp>,
    health: PollHealth,
}

enum Outcome {
    Data(Snapshot),
    Missing,
    TimedOut(String),
    Failed(String),
}

/// Per-device polling driver.
pub struct SensorCoordinator<A> {
    api: A,
    device_id: String,
    name: String,
    config: CoordinatorConfig,
    auth_clock: Option<AuthClock>,
    state: RwLock<State>,
}

impl<A: TapoApi> SensorCoordinator<A> {
    /// Create a coordinator for `device_id`.
    ///
    /// The client's optional auth clock is resolved here, once.
    pub fn new(api: A, device_id: impl Into<String>, config: CoordinatorConfig) -> Self {
        let device_id = device_id.into();
        let auth_clock = api.auth_clock();
        Self {
            name: format!("tapo_{device_id}"),
            api,
            device_id,
            config,
            auth_clock,
            state: RwLock::new(State::default()),
        }
    }

    #[must_use]
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// The client's auth clock, when it declared one.
    #[must_use]
    pub fn auth_clock(&self) -> Option<&AuthClock> {
        self.auth_clock.as_ref()
    }

    /// Copy of the cached snapshot.
    #[must_use]
    pub fn data(&self) -> Snapshot {
        self.read_state(|state| state.snapshot.clone())
    }

    /// Current cached value of one field.
    #[must_use]
    pub fn value(&self, field: SensorField) -> Option<SensorValue> {
        self.read_state(|state| state.snapshot.get(field).cloned())
    }

    #[must_use]
    pub fn last_successful_update(&self) -> Option<Timestamp> {
        self.read_state(|state| state.last_success)
    }

    #[must_use]
    pub fn health(&self) -> PollHealth {
        self.read_state(|state| state.health.clone())
    }

    /// Fetch the device's readings once.
    ///
    /// Returns an empty snapshot when the hub has no data, the request times
    /// out, or the client fails. Never returns an error.
    #[tracing::instrument(skip(self), fields(device_id = %self.device_id))]
    pub async fn poll(&self) -> Snapshot {
        tracing::debug!("updating sensor data");
        let outcome = self.fetch().await;
        self.record(outcome)
    }

    /// Forced refresh run once during setup.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`PollingSource::refresh`] so that setup
    /// fails instead of registering a half-initialised device.
    pub async fn first_refresh(&self) -> Result<(), TapoError> {
        self.refresh().await
    }

    async fn fetch(&self) -> Outcome {
        let request = self.api.get_sensor_data(&self.device_id);
        match tokio::time::timeout(self.config.request_timeout, request).await {
            Ok(Ok(Some(snapshot))) => Outcome::Data(snapshot),
            Ok(Ok(None)) => Outcome::Missing,
            Ok(Err(err)) if err.is_timeout() => Outcome::TimedOut(err.to_string()),
            Ok(Err(err)) => {
                tracing::error!(
                    error = ?err,
                    "unexpected error updating sensor data"
                );
                Outcome::Failed(describe(&err))
            }
            Err(_) => {
                Outcome::TimedOut(ApiError::Timeout(self.config.request_timeout).to_string())
            }
        }
    }

    fn record(&self, outcome: Outcome) -> Snapshot {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let snapshot = match outcome {
            Outcome::Data(snapshot) => {
                tracing::debug!(
                    fields = snapshot.len(),
                    "sensor data retrieved"
                );
                state.last_success = Some(now());
                state.health.successes += 1;
                if state.health.consecutive_failures >= FAILURE_STREAK_THRESHOLD {
                    tracing::info!(
                            failed_polls = state.health.consecutive_failures,
                        "device recovered"
                    );
                }
                state.health.consecutive_failures = 0;
                snapshot
            }
            Outcome::Missing => {
                tracing::warn!("no sensor data returned, using empty snapshot");
                state.health.missing += 1;
                state.health.last_error = Some("no sensor data returned".to_string());
                Self::count_failure(&mut state.health);
                Snapshot::new()
            }
            Outcome::TimedOut(message) => {
                tracing::warn!(
                    error = %message,
                    "timeout while getting sensor data"
                );
                state.health.timeouts += 1;
                state.health.last_error = Some(message);
                Self::count_failure(&mut state.health);
                Snapshot::new()
            }
            Outcome::Failed(message) => {
                state.health.failures += 1;
                state.health.last_error = Some(message);
                Self::count_failure(&mut state.health);
                Snapshot::new()
            }
        };
        drop(state);
        snapshot
    }

    fn count_failure(health: &mut PollHealth) {
        health.consecutive_failures += 1;
        if health.consecutive_failures == FAILURE_STREAK_THRESHOLD {
            tracing::warn!(
                failed_polls = health.consecutive_failures,
                "device keeps failing, readings are stale"
            );
        }
    }

    fn read_state<T>(&self, f: impl FnOnce(&State) -> T) -> T {
        f(&self.state.read().unwrap_or_else(PoisonError::into_inner))
    }
}

impl<A: TapoApi> PollingSource for SensorCoordinator<A> {
    fn name(&self) -> &str {
        &self.name
    }

    fn update_interval(&self) -> Duration {
        self.config.update_interval
    }

    async fn refresh(&self) -> Result<(), TapoError> {
        let snapshot = self.poll().await;
        if !snapshot.is_empty() {
            self.state
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .snapshot = snapshot;
        }
        Ok(())
    }
}

/// Render an error with its whole source chain.
fn describe(err: &dyn std::error::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}
