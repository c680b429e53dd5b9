//! Health-check registration, scheduling, and result aggregation
//!
//! This module is the core of the crate: callers register named checks,
//! each check runs on its own schedule in its own task, and readers get a
//! consistent point-in-time snapshot of the latest result per check plus
//! an aggregate healthy/unhealthy verdict.

mod check;
mod listener;
mod registry;
mod result;
mod task;

#[cfg(test)]
mod tests;

// Re-export public types
pub use check::{Check, CheckFailure, Config, CustomCheck};
pub use listener::{CheckListener, HealthListener};
pub use registry::{Registry, RegistryBuilder};
pub use result::CheckResult;
