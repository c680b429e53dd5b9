//! Check execution results and failure-streak bookkeeping

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::time::Duration;

/// Details and error message recorded for a check before its first
/// execution completes
pub(crate) const INITIAL_RESULT_MSG: &str = "didn't run yet";

/// Immutable snapshot of a check's latest execution outcome
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    /// Details reported by the last execution (opaque payload)
    pub details: Value,
    /// Failure message, present iff the last execution was unhealthy
    pub error: Option<String>,
    /// When this result was recorded
    pub timestamp: DateTime<Utc>,
    /// Wall-clock time the execution took
    #[serde(rename = "duration_ms", serialize_with = "serialize_duration_ms")]
    pub duration: Duration,
    /// Number of consecutive failing results ending at this one, 0 when healthy
    pub contiguous_failures: u32,
    /// Start of the current failure streak, `None` when healthy
    pub time_of_first_failure: Option<DateTime<Utc>>,
}

impl CheckResult {
    /// A result is healthy iff it carries no error
    #[inline]
    pub fn is_healthy(&self) -> bool {
        self.error.is_none()
    }

    /// Build the result for a fresh execution outcome, merging
    /// failure-streak state from the previous result for the same check.
    ///
    /// A healthy outcome resets the streak. An unhealthy outcome extends
    /// the previous streak when one was in progress, otherwise starts a
    /// new streak anchored at `timestamp`.
    pub(crate) fn merge(
        previous: Option<&CheckResult>,
        details: Value,
        error: Option<String>,
        duration: Duration,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let mut result = Self {
            details,
            error,
            timestamp,
            duration,
            contiguous_failures: 0,
            time_of_first_failure: None,
        };

        if !result.is_healthy() {
            match previous {
                Some(prev) if !prev.is_healthy() => {
                    result.contiguous_failures = prev.contiguous_failures + 1;
                    result.time_of_first_failure = prev.time_of_first_failure;
                }
                _ => {
                    result.contiguous_failures = 1;
                    result.time_of_first_failure = Some(timestamp);
                }
            }
        }

        result
    }
}

fn serialize_duration_ms<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u64(duration.as_millis() as u64)
}
