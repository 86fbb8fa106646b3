//! Backend liveness monitor.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, trace};

use promptguard_models::HealthState;

use crate::backend::Backend;

/// Handle to a running liveness poller.
///
/// The first probe is issued immediately, then one per interval regardless
/// of earlier outcomes. Probes are not queued: if one is still in flight when
/// the next tick fires both run, and whichever resolves last decides the
/// state.
pub struct HealthMonitor {
    state: watch::Receiver<HealthState>,
    shutdown: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl HealthMonitor {
    /// Starts polling. Must be called from within a tokio runtime.
    pub fn start(backend: Arc<dyn Backend>, poll_interval: Duration) -> Self {
        let (state_tx, state_rx) = watch::channel(HealthState::Checking);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let mut poller = HealthPoller {
            backend,
            poll_interval,
            state: Arc::new(state_tx),
            shutdown: shutdown_rx,
        };
        let handle = tokio::spawn(async move { poller.run().await });

        Self {
            state: state_rx,
            shutdown: shutdown_tx,
            handle: Some(handle),
        }
    }

    /// Current liveness state.
    pub fn state(&self) -> HealthState {
        *self.state.borrow()
    }

    /// Receiver notified on every state update.
    pub fn subscribe(&self) -> watch::Receiver<HealthState> {
        self.state.clone()
    }

    /// Cancels the timer and waits for the polling loop to exit.
    ///
    /// Probes already in flight finish but no longer publish.
    pub async fn stop(mut self) {
        let _ = self.shutdown.send(true);
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
        debug!("health monitor stopped");
    }
}

impl Drop for HealthMonitor {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = self.shutdown.send(true);
            handle.abort();
        }
    }
}

/// Background side of the monitor.
struct HealthPoller {
    backend: Arc<dyn Backend>,
    poll_interval: Duration,
    state: Arc<watch::Sender<HealthState>>,
    shutdown: watch::Receiver<bool>,
}

impl HealthPoller {
    /// Run the polling loop until shutdown signal.
    async fn run(&mut self) {
        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        debug!(
            poll_interval_ms = self.poll_interval.as_millis(),
            "starting health monitor"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.spawn_probe();
                }
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        debug!("health monitor received shutdown signal");
                        break;
                    }
                }
            }
        }
    }

    /// Issue one probe without waiting for it.
    fn spawn_probe(&self) {
        let backend = Arc::clone(&self.backend);
        let state = Arc::clone(&self.state);
        let shutdown = self.shutdown.clone();

        tokio::spawn(async move {
            let outcome = backend.probe().await;
            if *shutdown.borrow() {
                return;
            }

            if let Err(e) = &outcome {
                trace!(error = %e, "liveness probe failed");
            }

            let next = HealthState::from_probe(outcome.is_ok());
            let previous = state.send_replace(next);
            if previous != next {
                debug!(from = %previous, to = %next, "backend liveness changed");
            }
        });
    }
}
