//! Lifecycle listener hooks
//!
//! Listeners are passive observers: they are invoked synchronously from
//! inside the issuing check's loop and feed nothing back into scheduling.
//! All hooks have no-op defaults, so implementors override only the
//! events they care about. A listener must not block or panic; doing so
//! stalls the loop of the check that raised the event, but never other
//! checks.

use std::collections::HashMap;

use super::result::CheckResult;

/// Observer of per-check lifecycle events
pub trait CheckListener: Send + Sync {
    /// A check was registered; `initial_result` is the result recorded
    /// before its first execution
    fn on_check_registered(&self, _name: &str, _initial_result: &CheckResult) {}

    /// A check execution is about to start
    fn on_check_started(&self, _name: &str) {}

    /// A check execution finished and its result was committed
    fn on_check_completed(&self, _name: &str, _result: &CheckResult) {}
}

/// Observer of aggregate result updates
pub trait HealthListener: Send + Sync {
    /// Invoked once per completed execution, after the per-check hooks,
    /// with a defensive copy of the full result map
    fn on_results_updated(&self, _results: &HashMap<String, CheckResult>) {}
}
