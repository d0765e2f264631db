//! Application telemetry events and sinks.
//!
//! Sync flows report how many rows GitHub returned and how many actually
//! landed in the mirror. The two can diverge because upsert failures are not
//! surfaced to callers, so the telemetry stream is where that drift becomes
//! visible.

use serde::{Deserialize, Serialize};

/// A structured telemetry event emitted by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TelemetryEvent {
    /// Records the current database schema version after migrations apply.
    SchemaVersionRecorded {
        /// Diesel migration version string (e.g. `20260301000000`).
        schema_version: String,
    },
    /// A repository sync finished.
    RepositoriesSynced {
        /// Local user the sync ran for.
        user_id: String,
        /// Repositories GitHub returned.
        fetched: usize,
        /// Rows written to the mirror.
        persisted: usize,
    },
    /// A pull request sync finished.
    PullRequestsSynced {
        /// Local user the sync ran for.
        user_id: String,
        /// `owner/name` of the synced repository.
        repository: String,
        /// Pull requests GitHub returned.
        fetched: usize,
        /// Rows written to the mirror.
        persisted: usize,
    },
}

/// A sink that can record telemetry events.
pub trait TelemetrySink: Send + Sync {
    /// Records a telemetry event.
    fn record(&self, event: TelemetryEvent);
}

/// Telemetry sink that drops all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetrySink;

impl TelemetrySink for NoopTelemetrySink {
    fn record(&self, _event: TelemetryEvent) {}
}

/// Forwards telemetry events to `tracing` as JSON payloads on the
/// `pr_pilot::telemetry` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTelemetrySink;

impl TelemetrySink for TracingTelemetrySink {
    fn record(&self, event: TelemetryEvent) {
        let Ok(serialised) = serde_json::to_string(&event) else {
            return;
        };

        tracing::info!(target: "pr_pilot::telemetry", event = %serialised);
    }
}

/// Sinks for asserting on telemetry in tests.
#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    use std::sync::Mutex;

    use super::{TelemetryEvent, TelemetrySink};

    /// Keeps every recorded event in memory.
    #[derive(Debug, Default)]
    pub struct RecordingSink {
        events: Mutex<Vec<TelemetryEvent>>,
    }

    impl RecordingSink {
        /// Drains and returns the recorded events.
        pub fn take(&self) -> Vec<TelemetryEvent> {
            self.events
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .drain(..)
                .collect()
        }
    }

    impl TelemetrySink for RecordingSink {
        fn record(&self, event: TelemetryEvent) {
            self.events
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .push(event);
        }
    }
}
