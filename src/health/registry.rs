//! Core registry implementation
//!
//! The registry owns the map of latest results and the map of live check
//! tasks, both guarded by a single reader/writer lock. All registration,
//! deregistration, and read operations go through it; each registered
//! check runs in its own independently scheduled loop (see `task.rs`).

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::error::{HealthError, Result};

use super::check::Config;
use super::listener::{CheckListener, HealthListener};
use super::result::{CheckResult, INITIAL_RESULT_MSG};
use super::task::CheckTask;

/// Health-check registry and scheduler
///
/// Cheap to clone; clones share the same underlying state, so a clone can
/// be handed to an HTTP handler while another part of the service
/// registers and deregisters checks.
#[derive(Clone)]
pub struct Registry {
    pub(super) inner: Arc<RegistryInner>,
}

pub(super) struct RegistryInner {
    /// Consolidated registry state - single lock for both maps
    pub(super) state: RwLock<RegistryState>,
    pub(super) check_listeners: Vec<Arc<dyn CheckListener>>,
    pub(super) health_listeners: Vec<Arc<dyn HealthListener>>,
    /// Monotonic generation counter for task entries
    next_task_id: AtomicU64,
}

/// Latest results and live tasks, keyed by check name
///
/// Entries are inserted together at registration and removed together
/// when a task processes its stop request.
pub(super) struct RegistryState {
    pub(super) results: HashMap<String, CheckResult>,
    pub(super) tasks: HashMap<String, CheckTask>,
}

impl Registry {
    /// Create a registry with no listeners
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a registry builder for attaching lifecycle listeners
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Register a health check and start its execution loop.
    ///
    /// Records an initial result (healthy iff `initially_passing`, else
    /// failing with a sentinel message), notifies the registered-check
    /// hook, and spawns an independent loop that executes the check after
    /// `initial_delay` and then every `execution_period`. Returns
    /// immediately.
    ///
    /// Registering a name that is already present stops the prior task
    /// and replaces it.
    pub async fn register_check(&self, cfg: Config) -> Result<()> {
        let name = cfg.check.name().to_string();
        if name.is_empty() {
            return Err(HealthError::invalid_configuration(
                "check name must not be empty",
            ));
        }
        if cfg.execution_period.is_zero() {
            return Err(HealthError::invalid_configuration(format!(
                "check {name}: execution period must be greater than zero",
            )));
        }

        // checks are initially failing by default, but we allow overrides
        let initial_error = (!cfg.initially_passing).then(|| INITIAL_RESULT_MSG.to_string());

        let (stop_tx, stop_rx) = mpsc::channel(1);
        let task_id = self.inner.next_task_id.fetch_add(1, Ordering::Relaxed);
        let task = CheckTask {
            id: task_id,
            stop: stop_tx,
        };

        let (initial_result, superseded) = {
            let mut state = self.inner.state.write();
            let initial_result = CheckResult::merge(
                state.results.get(&name),
                INITIAL_RESULT_MSG.into(),
                initial_error,
                Duration::ZERO,
                chrono::Utc::now(),
            );
            state.results.insert(name.clone(), initial_result.clone());
            let superseded = state.tasks.insert(name.clone(), task);
            (initial_result, superseded)
        };

        if let Some(prior) = superseded {
            info!("check {} re-registered, stopping prior task", name);
            prior.signal_stop();
        }

        for listener in &self.inner.check_listeners {
            listener.on_check_registered(&name, &initial_result);
        }

        info!(
            "registered check {} (initial delay {:?}, period {:?})",
            name, cfg.initial_delay, cfg.execution_period
        );
        self.spawn_check_loop(cfg, stop_rx, task_id);
        Ok(())
    }

    /// Request that the named check stop; no-op if it is not registered.
    ///
    /// The stop request is non-blocking: map cleanup happens inside the
    /// task's own loop the next time it reaches a waiting state, so a
    /// check that is mid-execution completes that execution first. Once
    /// the request is processed, `results` no longer contains the name.
    pub fn deregister(&self, name: &str) {
        let state = self.inner.state.read();
        if let Some(task) = state.tasks.get(name) {
            debug!("deregistering check {}", name);
            task.signal_stop();
        }
    }

    /// Request that every currently registered check stop
    pub fn deregister_all(&self) {
        let state = self.inner.state.read();
        debug!("deregistering all {} checks", state.tasks.len());
        for task in state.tasks.values() {
            task.signal_stop();
        }
    }

    /// Snapshot the latest result of every registered check plus the
    /// aggregate health.
    ///
    /// The returned map is a full copy; subsequent executions never
    /// mutate it. The aggregate is true iff every result is healthy,
    /// vacuously true when no checks are registered.
    pub fn results(&self) -> (HashMap<String, CheckResult>, bool) {
        let results = self.inner.state.read().results.clone();
        let healthy = results.values().all(CheckResult::is_healthy);
        (results, healthy)
    }

    /// Aggregate health without materializing the result copy
    pub fn is_healthy(&self) -> bool {
        self.inner
            .state
            .read()
            .results
            .values()
            .all(CheckResult::is_healthy)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.read();
        f.debug_struct("Registry")
            .field("checks", &state.tasks.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Builder attaching optional lifecycle listeners to a [`Registry`]
#[derive(Default)]
pub struct RegistryBuilder {
    check_listeners: Vec<Arc<dyn CheckListener>>,
    health_listeners: Vec<Arc<dyn HealthListener>>,
}

impl RegistryBuilder {
    /// Attach an observer of per-check lifecycle events
    pub fn with_check_listener(mut self, listener: Arc<dyn CheckListener>) -> Self {
        self.check_listeners.push(listener);
        self
    }

    /// Attach an observer of aggregate result updates
    pub fn with_health_listener(mut self, listener: Arc<dyn HealthListener>) -> Self {
        self.health_listeners.push(listener);
        self
    }

    /// Build the registry
    pub fn build(self) -> Registry {
        Registry {
            inner: Arc::new(RegistryInner {
                state: RwLock::new(RegistryState {
                    results: HashMap::new(),
                    tasks: HashMap::new(),
                }),
                check_listeners: self.check_listeners,
                health_listeners: self.health_listeners,
                next_task_id: AtomicU64::new(1),
            }),
        }
    }
}
