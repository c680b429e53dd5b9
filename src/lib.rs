//! # Vitals
//!
//! An embeddable, async runtime health-check registry. Register named
//! probes, run each on its own schedule, and read a consistent snapshot
//! of the latest results plus an aggregate healthy/unhealthy verdict:
//! the state you need behind a liveness or readiness endpoint.
//!
//! ## Design
//!
//! - **One loop per check**: every registered check executes in its own
//!   spawned task on an independent cadence. A check never overlaps with
//!   itself; a slow check delays only its own next tick.
//! - **One shared state**: the latest result per check lives in a single
//!   locked map; readers always see whole, atomically replaced results.
//! - **Failure streaks**: each result carries the count of consecutive
//!   failures ending at it and the timestamp the current streak began.
//! - **Failure is data**: a failing (or panicking) check produces an
//!   unhealthy result, never a scheduler fault; the loop keeps running.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use vitals::{CheckFailure, Config, CustomCheck, Registry};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = Registry::new();
//!
//!     let check = CustomCheck::new("upstream-reachable", || async {
//!         // probe something; return Err(CheckFailure::new(..)) when unhealthy
//!         Ok::<_, CheckFailure>(serde_json::json!({ "status": "ok" }))
//!     });
//!
//!     registry
//!         .register_check(
//!             Config::new(Arc::new(check), Duration::from_secs(30))
//!                 .with_initial_delay(Duration::from_secs(1)),
//!         )
//!         .await?;
//!
//!     let (results, healthy) = registry.results();
//!     println!("healthy={healthy}, {} checks", results.len());
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

pub mod error;
pub mod health;

// Re-export main types
pub use error::{HealthError, Result};
pub use health::{
    Check, CheckFailure, CheckListener, CheckResult, Config, CustomCheck, HealthListener, Registry,
    RegistryBuilder,
};
