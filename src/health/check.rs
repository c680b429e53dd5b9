//! Boundary contracts for health checks
//!
//! A [`Check`] is a named, on-demand unit of work. The registry owns its
//! schedule; the check itself contains no scheduling logic.

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// A named probe executed by the registry on its own schedule.
///
/// The name is the stable identity of the probe and is used as the key of
/// the registry's result map; it must be non-empty and unique across
/// registrations. `execute` is never invoked concurrently with itself, but
/// may run concurrently with other checks.
#[async_trait]
pub trait Check: Send + Sync {
    /// Stable, non-empty identity of this check
    fn name(&self) -> &str;

    /// Run the probe once, returning a descriptive details payload on
    /// success, or a [`CheckFailure`] when unhealthy
    async fn execute(&self) -> std::result::Result<Value, CheckFailure>;
}

/// An unhealthy check outcome: a plain message plus an optional
/// descriptive payload
#[derive(Debug, Clone)]
pub struct CheckFailure {
    /// Human-readable failure message
    pub message: String,
    /// Details describing the failing outcome, `Value::Null` when none
    pub details: Value,
}

impl CheckFailure {
    /// Create a failure with a message and no details
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: Value::Null,
        }
    }

    /// Attach a details payload to this failure
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }
}

impl fmt::Display for CheckFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CheckFailure {}

type CheckFn =
    Box<dyn Fn() -> BoxFuture<'static, std::result::Result<Value, CheckFailure>> + Send + Sync>;

/// Adapter turning a plain async function into a [`Check`]
///
/// ```rust,no_run
/// use vitals::{CheckFailure, CustomCheck};
///
/// let check = CustomCheck::new("db-ping", || async {
///     Ok::<_, CheckFailure>(serde_json::json!({ "status": "ok" }))
/// });
/// ```
pub struct CustomCheck {
    name: String,
    run: CheckFn,
}

impl CustomCheck {
    /// Wrap an async function under the given check name
    pub fn new<F, Fut>(name: impl Into<String>, run: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<Value, CheckFailure>> + Send + 'static,
    {
        Self {
            name: name.into(),
            run: Box::new(move || Box::pin(run())),
        }
    }
}

#[async_trait]
impl Check for CustomCheck {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self) -> std::result::Result<Value, CheckFailure> {
        (self.run)().await
    }
}

impl fmt::Debug for CustomCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomCheck")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Per-registration scheduling parameters
#[derive(Clone)]
pub struct Config {
    /// The check to schedule
    pub check: Arc<dyn Check>,
    /// Time to wait before the first execution
    pub initial_delay: Duration,
    /// Interval between subsequent executions, must be greater than zero
    pub execution_period: Duration,
    /// Record the check as passing until its first real execution completes
    pub initially_passing: bool,
}

impl Config {
    /// Create a configuration with no initial delay and an initially
    /// failing result
    pub fn new(check: Arc<dyn Check>, execution_period: Duration) -> Self {
        Self {
            check,
            initial_delay: Duration::ZERO,
            execution_period,
            initially_passing: false,
        }
    }

    /// Delay the first execution by the given duration
    pub fn with_initial_delay(mut self, initial_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self
    }

    /// Report the check as healthy until its first execution completes
    pub fn initially_passing(mut self, passing: bool) -> Self {
        self.initially_passing = passing;
        self
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("check", &self.check.name())
            .field("initial_delay", &self.initial_delay)
            .field("execution_period", &self.execution_period)
            .field("initially_passing", &self.initially_passing)
            .finish()
    }
}
