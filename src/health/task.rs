//! Per-check execution tasks
//!
//! Each registered check gets one spawned loop: wait out the initial
//! delay, execute, then execute on every tick of a recurring timer. A
//! pending stop request wins over a pending timer; the loop that
//! processes the stop removes its own map entries, so the requester never
//! blocks or touches the write lock.

use futures::FutureExt;
use serde_json::Value;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use super::check::Config;
use super::registry::{Registry, RegistryInner};
use super::result::CheckResult;

/// Live execution state of one registered check
pub(super) struct CheckTask {
    /// Generation id; a loop may only commit results and clean up map
    /// entries while this id is still the one stored under its name
    pub(super) id: u64,
    /// Single-slot stop signal, consumed by the loop at its next wait
    pub(super) stop: mpsc::Sender<()>,
}

impl CheckTask {
    /// Request that this task stop. Non-blocking: if a stop request is
    /// already pending the extra request is dropped.
    pub(super) fn signal_stop(&self) {
        let _ = self.stop.try_send(());
    }
}

impl Registry {
    /// Spawn the recurring execution loop for a freshly registered check
    pub(super) fn spawn_check_loop(
        &self,
        cfg: Config,
        mut stop_rx: mpsc::Receiver<()>,
        task_id: u64,
    ) {
        let inner = Arc::clone(&self.inner);

        tokio::spawn(async move {
            let name = cfg.check.name().to_string();

            // Initial execution; a stop pending before the delay elapses wins
            tokio::select! {
                biased;
                _ = stop_rx.recv() => {
                    inner.remove_check(&name, task_id);
                    return;
                }
                _ = tokio::time::sleep(cfg.initial_delay) => {}
            }
            inner.run_check_once(&cfg, task_id).await;

            // Scheduled recurring execution
            let mut ticker = tokio::time::interval_at(
                tokio::time::Instant::now() + cfg.execution_period,
                cfg.execution_period,
            );
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    _ = stop_rx.recv() => {
                        inner.remove_check(&name, task_id);
                        return;
                    }
                    _ = ticker.tick() => {
                        inner.run_check_once(&cfg, task_id).await;
                    }
                }
            }
        });
    }
}

impl RegistryInner {
    /// Execute the check once, commit the merged result, and notify
    /// listeners. The loop is blocked for the full execution but holds no
    /// lock while the check runs.
    pub(super) async fn run_check_once(&self, cfg: &Config, task_id: u64) {
        let name = cfg.check.name();

        for listener in &self.check_listeners {
            listener.on_check_started(name);
        }

        debug!("executing check {}", name);
        let timestamp = chrono::Utc::now();
        let started = Instant::now();
        // A panicking check becomes a failing result, never a dead loop
        let outcome = AssertUnwindSafe(cfg.check.execute()).catch_unwind().await;
        let duration = started.elapsed();

        let (details, error) = match outcome {
            Ok(Ok(details)) => (details, None),
            Ok(Err(failure)) => (failure.details, Some(failure.message)),
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                warn!("check {} panicked: {}", name, message);
                (Value::Null, Some(format!("check panicked: {message}")))
            }
        };

        let committed = {
            let mut state = self.state.write();
            if state.tasks.get(name).is_some_and(|task| task.id == task_id) {
                let result =
                    CheckResult::merge(state.results.get(name), details, error, duration, timestamp);
                state.results.insert(name.to_string(), result.clone());
                Some(result)
            } else {
                // Superseded while executing; the replacement owns the entry now
                None
            }
        };

        let Some(result) = committed else { return };

        if !result.is_healthy() {
            debug!(
                "check {} failed ({} contiguous): {}",
                name,
                result.contiguous_failures,
                result.error.as_deref().unwrap_or_default()
            );
        }

        for listener in &self.check_listeners {
            listener.on_check_completed(name, &result);
        }
        self.report_results();
    }

    /// Notify aggregate listeners with a snapshot copied under a read
    /// hold released before any listener runs
    fn report_results(&self) {
        if self.health_listeners.is_empty() {
            return;
        }
        let snapshot = self.state.read().results.clone();
        for listener in &self.health_listeners {
            listener.on_results_updated(&snapshot);
        }
    }

    /// Remove this task's entries from both maps. Gated on the generation
    /// id so a superseded loop cannot clear its replacement's entries.
    pub(super) fn remove_check(&self, name: &str, task_id: u64) {
        let mut state = self.state.write();
        if state.tasks.get(name).is_some_and(|task| task.id == task_id) {
            state.tasks.remove(name);
            state.results.remove(name);
            debug!("stopped check {}", name);
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
